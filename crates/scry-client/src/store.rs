//! Mirror store
//!
//! Holds the latest mirrored snapshot and the transient loading flag. The
//! store is owned exclusively by the engine loop, so replacement is atomic
//! by construction; observers receive `Arc` snapshots and can never see a
//! half-applied state.

use scry_core::UiState;
use std::sync::Arc;

/// The mirrored application state
#[derive(Debug, Default)]
pub struct MirrorStore {
    state: Arc<UiState>,
    loading: bool,
}

impl MirrorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mirrored state wholesale
    ///
    /// Nothing from the previous snapshot survives. Returns the new
    /// snapshot for fan-out to observers.
    pub fn apply_sync(&mut self, state: UiState) -> Arc<UiState> {
        self.state = Arc::new(state);
        Arc::clone(&self.state)
    }

    /// Set the transient loading indicator, independent of the snapshot
    pub fn apply_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// The latest snapshot
    pub fn state(&self) -> Arc<UiState> {
        Arc::clone(&self.state)
    }

    /// The transient loading indicator
    pub fn loading(&self) -> bool {
        self.loading
    }
}
