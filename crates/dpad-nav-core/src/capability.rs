//! Interactive-capability classification.
//!
//! The card state machine needs to know which elements a user can act on.
//! Rather than probing elements ad hoc, every element is reduced to a plain
//! [`ElementTraits`] description and classified into a closed tag set.

use serde::Deserialize;
use serde::Serialize;

/// What an element can do when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Anchor with a navigation target
    Link,
    /// Native button or button-typed input
    Button,
    /// Text input, select, textarea
    FormControl,
    /// Generic element with `role="button"`
    RoleButton,
    /// Anything else carrying a click handler
    Clickable,
    None,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Link => "link",
            Capability::Button => "button",
            Capability::FormControl => "formControl",
            Capability::RoleButton => "roleButton",
            Capability::Clickable => "clickable",
            Capability::None => "none",
        }
    }

    pub fn is_interactive(&self) -> bool {
        !matches!(self, Capability::None)
    }

    /// Whether a single "click" on this element performs its action.
    ///
    /// Form controls are interactive but need editing, so they are not
    /// treated as a card's primary action.
    pub fn is_activatable(&self) -> bool {
        matches!(
            self,
            Capability::Link | Capability::Button | Capability::RoleButton | Capability::Clickable
        )
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The facts about an element that decide its [`Capability`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementTraits {
    /// Lowercase tag name
    pub tag: String,
    pub href: Option<String>,
    pub role: Option<String>,
    /// `type` attribute for `<input>` / `<button>`
    pub input_type: Option<String>,
    pub disabled: bool,
    pub has_click_handler: bool,
}

impl ElementTraits {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    pub fn with_input_type(mut self, input_type: &str) -> Self {
        self.input_type = Some(input_type.to_ascii_lowercase());
        self
    }

    pub fn with_click_handler(mut self) -> Self {
        self.has_click_handler = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

const BUTTON_INPUT_TYPES: &[&str] = &["button", "submit", "reset", "image"];

fn is_native_control(tag: &str) -> bool {
    matches!(tag, "button" | "input" | "select" | "textarea")
}

pub fn classify_capability(traits: &ElementTraits) -> Capability {
    let tag = traits.tag.as_str();

    if traits.disabled && is_native_control(tag) {
        return Capability::None;
    }

    if tag == "a" && traits.href.as_deref().is_some_and(|h| !h.trim().is_empty()) {
        return Capability::Link;
    }

    if tag == "button" {
        return Capability::Button;
    }

    if tag == "input" {
        let input_type = traits.input_type.as_deref().unwrap_or("text");
        if input_type == "hidden" {
            return Capability::None;
        }
        if BUTTON_INPUT_TYPES.contains(&input_type) {
            return Capability::Button;
        }
        return Capability::FormControl;
    }

    if matches!(tag, "select" | "textarea") {
        return Capability::FormControl;
    }

    if traits
        .role
        .as_deref()
        .is_some_and(|r| r.trim().eq_ignore_ascii_case("button"))
    {
        return Capability::RoleButton;
    }

    if traits.has_click_handler {
        return Capability::Clickable;
    }

    Capability::None
}
