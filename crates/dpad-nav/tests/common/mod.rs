#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use dpad_nav::test_support::{grid_page, FakeDom, FakeNode};
use dpad_nav::{ElementId, FocusEvent, Navigator, Rect};

pub const CELL: f64 = 100.0;
pub const GAP: f64 = 20.0;

/// A page plus the navigator driving it.
pub struct TestPage {
    pub dom: Arc<FakeDom>,
    pub nav: Navigator<FakeDom>,
}

impl TestPage {
    pub fn new(dom: FakeDom) -> Self {
        let dom = Arc::new(dom);
        let nav = Navigator::new(Arc::clone(&dom));
        Self { dom, nav }
    }

    /// `cols` x `rows` grid of buttons in row-major order.
    pub fn grid(cols: usize, rows: usize) -> (Self, Vec<ElementId>) {
        let (dom, ids) = grid_page(cols, rows, CELL, GAP);
        (Self::new(dom), ids)
    }

    pub fn focus(&self, element: ElementId) {
        assert!(self.nav.focus().focus(element), "could not focus {element}");
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.nav.focus().current_focus()
    }
}

/// Card shell with one button per x offset, laid out in a row.
pub fn card_with_buttons(
    dom: &FakeDom,
    origin: (f64, f64),
    buttons: usize,
) -> (ElementId, Vec<ElementId>) {
    let (x, y) = origin;
    let width = 20.0 + buttons as f64 * 90.0;
    let card = dom.add(
        None,
        FakeNode::div(Rect::new(x, y, width, 120.0))
            .focusable()
            .attr("data-dpad-card", ""),
    );
    let children = (0..buttons)
        .map(|i| {
            let rect = Rect::new(x + 10.0 + i as f64 * 90.0, y + 10.0, 80.0, 40.0);
            dom.add(Some(card), FakeNode::button(rect))
        })
        .collect();
    (card, children)
}

/// Listener that appends every event it sees.
pub fn recording_listener() -> (
    Arc<Mutex<Vec<FocusEvent>>>,
    impl Fn(&FocusEvent) -> Result<(), String> + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let listener = move |event: &FocusEvent| {
        sink.lock().unwrap().push(*event);
        Ok(())
    };
    (seen, listener)
}
