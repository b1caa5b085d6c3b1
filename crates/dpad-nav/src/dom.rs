//! Port to the page the overlay is injected into.
//!
//! Everything the navigation layer knows about elements comes through [`Dom`]:
//! geometry and visibility, structure, the traits used for capability
//! classification, and the focus/activate/scroll primitives. Failures are
//! reported as [`EnvironmentError`] values and absorbed by the callers.

use dpad_nav_core::classify_capability;
use dpad_nav_core::Capability;
use dpad_nav_core::ElementTraits;
use dpad_nav_core::Rect;
use serde::Deserialize;
use serde::Serialize;

use crate::error::EnvironmentError;

/// Opaque handle to a page element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub trait Dom: Send + Sync {
    /// Bounding box at query time; never cached by callers.
    fn rect(&self, element: ElementId) -> Result<Rect, EnvironmentError>;

    /// Rendered, not hidden by the element or any ancestor, non-zero size.
    fn is_visible(&self, element: ElementId) -> bool;

    fn is_connected(&self, element: ElementId) -> bool;

    /// `None` once the element is gone.
    fn traits(&self, element: ElementId) -> Option<ElementTraits>;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    fn class_names(&self, element: ElementId) -> Vec<String>;

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// All descendants in document order, excluding `element` itself.
    fn descendants(&self, element: ElementId) -> Vec<ElementId>;

    /// Focusable elements in document order, inside `container` or, when
    /// `None`, anywhere in the page.
    fn focusable_within(&self, container: Option<ElementId>) -> Vec<ElementId>;

    /// Whether the element's owning document is the top-level document.
    ///
    /// Cross-origin frames answer with [`EnvironmentError::CrossOrigin`].
    fn owner_is_top_document(&self, element: ElementId) -> Result<bool, EnvironmentError>;

    /// What the page itself reports as focused.
    fn active_element(&self) -> Option<ElementId>;

    fn focus(&self, element: ElementId) -> Result<(), EnvironmentError>;

    /// Equivalent of a user click.
    fn activate(&self, element: ElementId) -> Result<(), EnvironmentError>;

    fn scroll_into_view(&self, element: ElementId) -> Result<(), EnvironmentError>;

    /// Sets (`Some`) or removes (`None`) an attribute.
    fn set_attribute(
        &self,
        element: ElementId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), EnvironmentError>;
}

pub fn capability_of<D: Dom + ?Sized>(dom: &D, element: ElementId) -> Capability {
    dom.traits(element)
        .map(|traits| classify_capability(&traits))
        .unwrap_or(Capability::None)
}

/// Strict descendant test: an element is not inside itself.
pub fn is_descendant_of<D: Dom + ?Sized>(dom: &D, element: ElementId, ancestor: ElementId) -> bool {
    let mut cursor = dom.parent(element);
    while let Some(node) = cursor {
        if node == ancestor {
            return true;
        }
        cursor = dom.parent(node);
    }
    false
}
