//! Scry Term - Terminal presentation
//!
//! Renders mirrored snapshots as a line-per-element terminal view and maps
//! keyboard input onto element interactions. All synchronization behavior
//! lives in `scry-client`; this crate only decides what each element kind
//! looks like and which keys poke it.

pub mod app;
pub mod echo;
pub mod handlers;
pub mod screen;

// Re-export commonly used types
pub use app::{TermApp, TermConfig};
pub use echo::LocalEcho;
pub use handlers::{dispatch_table, Line};
pub use screen::{OutputError, TermScreen};
