//! Mirrored UI state
//!
//! A `UiState` is one complete snapshot of everything the server wants shown.
//! The client holds exactly one at a time and replaces it wholesale on every
//! synchronization; there is no client-side merging or patching.

use crate::element::{Element, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete mirrored snapshot
///
/// `registry` maps element ids to elements; `order` defines render order.
/// An id in `registry` but absent from `order` is never rendered. An id in
/// `order` with no registry entry is skipped at dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    /// All elements in this snapshot, keyed by id
    pub registry: HashMap<ElementId, Element>,

    /// Render order; the only ids that can ever reach the screen
    pub order: Vec<ElementId>,
}

impl UiState {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element at the end of the render order
    pub fn with_element(mut self, element: Element) -> Self {
        self.order.push(element.id.clone());
        self.registry.insert(element.id.clone(), element);
        self
    }

    /// Look up an element by id
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.registry.get(id)
    }

    /// Whether the snapshot contains no renderable entries
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of entries in the render order
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Ids in `order` with no registry entry
    pub fn dangling_ids(&self) -> Vec<&ElementId> {
        self.order
            .iter()
            .filter(|id| !self.registry.contains_key(id))
            .collect()
    }

    /// Whether the element is present in the render order
    pub fn is_ordered(&self, id: &ElementId) -> bool {
        self.order.iter().any(|ordered| ordered == id)
    }
}
