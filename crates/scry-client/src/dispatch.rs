//! Element dispatch
//!
//! A registration table from kind tag to handler. Adding an element kind is
//! a registration, not an edit to a conditional chain; a kind with no
//! registration falls through to the table's fallback so one unknown
//! element never aborts its siblings.

use crate::pipeline::Emission;
use scry_core::{Element, UiState};
use std::collections::HashMap;
use tracing::warn;

/// User interaction forwarded to a handler
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Click/press on the element
    Activate,
    /// A new position for a continuous control
    SetValue(f64),
}

/// Type-specific interaction and view logic for one element kind
///
/// `V` is whatever the presentation layer renders into; this crate never
/// looks inside it.
pub trait ElementHandler<V> {
    /// The kind tag this handler serves; exact string match
    fn kind(&self) -> &'static str;

    /// Produce the visual representation for an element's current value
    fn view(&self, element: &Element) -> V;

    /// Turn user input on this element into an emission, if any
    ///
    /// The element passed in reflects the locally displayed value, so a
    /// toggle can derive "the new boolean" from what the user sees.
    fn on_input(&self, _element: &Element, _action: InputAction) -> Option<Emission> {
        None
    }
}

/// Registration table from kind tag to handler
pub struct Dispatch<V> {
    handlers: HashMap<&'static str, Box<dyn ElementHandler<V>>>,
    fallback: Box<dyn Fn(&Element) -> V>,
}

impl<V> Dispatch<V> {
    /// Create a table with the given fallback renderer
    ///
    /// The fallback receives every visible element whose kind has no
    /// registration; it should display a diagnostic containing the tag.
    pub fn new(fallback: impl Fn(&Element) -> V + 'static) -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Register a handler, replacing any previous one for the same kind
    pub fn register(&mut self, handler: impl ElementHandler<V> + 'static) {
        self.handlers.insert(handler.kind(), Box::new(handler));
    }

    /// Look up the handler for a kind tag
    pub fn handler(&self, kind: &str) -> Option<&dyn ElementHandler<V>> {
        self.handlers.get(kind).map(|h| h.as_ref())
    }

    /// Render one element through its handler or the fallback
    pub fn view(&self, element: &Element) -> V {
        match self.handler(element.kind()) {
            Some(handler) => handler.view(element),
            None => (self.fallback)(element),
        }
    }

    /// Render a full snapshot
    ///
    /// Visits each id in `order` whose element exists and has
    /// `visible == true`; everything else is skipped without aborting the
    /// walk.
    pub fn walk(&self, state: &UiState) -> Vec<V> {
        let mut views = Vec::with_capacity(state.len());

        for id in &state.order {
            let Some(element) = state.get(id) else {
                warn!(%id, "ordered id missing from registry");
                continue;
            };

            if !element.visible {
                continue;
            }

            views.push(self.view(element));
        }

        views
    }

    /// Route user input through the element's handler
    pub fn input(&self, element: &Element, action: InputAction) -> Option<Emission> {
        self.handler(element.kind())?.on_input(element, action)
    }
}
