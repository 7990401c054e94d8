//! Scry Core - Mirrored UI element and state types
//!
//! Scry is a thin client for server-driven interfaces: the server owns all
//! application state and streams complete descriptions of what to display;
//! the client mirrors the latest snapshot and reports user input back.
//!
//! Named after scrying - observing a remote scene through a glass. The glass
//! adds nothing of its own; it only shows what the other side describes.
//!
//! # Core Philosophy
//!
//! ```text
//! Server → UiState snapshot → Scry client → Visual output
//!                                  │
//!                                  └─► Change events (user input)
//! ```
//!
//! The snapshot is canonical. The client never merges or patches: every
//! synchronization replaces the mirrored state wholesale, and the only
//! client-owned data is input that has not been flushed to the server yet.
//!
//! # Element Model
//!
//! Elements are described by a `kind` tag plus kind-specific fields. Kinds
//! unknown to this build decode into [`Widget::Unknown`] rather than failing
//! the whole snapshot, so a newer server can always talk to an older client.

pub mod element;
pub mod state;
pub mod value;

// Re-export commonly used types
pub use element::{Element, ElementError, ElementId, Widget};
pub use state::UiState;
pub use value::ChangeValue;
