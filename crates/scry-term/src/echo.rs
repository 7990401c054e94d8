//! Local input echo
//!
//! While the user drags a slider or flips a checkbox, the display follows
//! their input instantly even though the authoritative value only changes
//! when the server sends the next snapshot. The echo is an overlay on the
//! snapshot, never written back into it, and cleared whenever a new
//! snapshot arrives.

use scry_core::{ChangeValue, ElementId, UiState, Widget};
use std::collections::HashMap;

/// Overlay of locally-entered values awaiting server confirmation
#[derive(Debug, Default)]
pub struct LocalEcho {
    values: HashMap<ElementId, ChangeValue>,
}

impl LocalEcho {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value the user just entered for an element
    pub fn set(&mut self, id: ElementId, value: ChangeValue) {
        self.values.insert(id, value);
    }

    /// Forget everything; called when a fresh snapshot arrives
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of overlaid values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the overlay is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A copy of the snapshot with overlaid values applied
    ///
    /// Only value-bearing widgets take an overlay; a recorded value whose
    /// shape does not match its element is ignored.
    pub fn effective_state(&self, state: &UiState) -> UiState {
        let mut effective = state.clone();

        for (id, recorded) in &self.values {
            let Some(element) = effective.registry.get_mut(id) else {
                continue;
            };

            match (&mut element.widget, recorded) {
                (Widget::Slider { value, .. }, ChangeValue::Number(n)) => *value = *n,
                (Widget::Checkbox { value, .. }, ChangeValue::Bool(b)) => *value = *b,
                _ => {}
            }
        }

        effective
    }
}
