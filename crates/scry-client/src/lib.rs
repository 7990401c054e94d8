//! Scry Client - State synchronization engine
//!
//! The engine that keeps a local mirror of server-owned UI state and turns
//! user interaction into outbound change events.
//!
//! # Architecture
//!
//! ```text
//!           ┌────────────────────────────── engine loop ─┐
//! Server ──►│ Transport ─► Codec ─► MirrorStore ─► event │──► Frontend
//!           │                                            │
//! Server ◄──│ Transport ◄─ Codec ◄─ ChangePipeline ◄─────│◄── Frontend input
//!           └────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on one cooperative event loop: inbound frames, frontend
//! input, and coalescing deadlines are multiplexed with `select!`, so the
//! mirrored state needs no locks and inbound messages apply strictly in
//! arrival order.
//!
//! The presentation layer stays outside this crate. It observes
//! [`ClientEvent`]s, renders snapshots through a [`dispatch::Dispatch`]
//! table, and feeds interaction back as [`ClientCommand`]s.

pub mod client;
pub mod dispatch;
pub mod handshake;
pub mod log;
pub mod pipeline;
pub mod store;
pub mod transport;

// Re-export commonly used types
pub use client::{
    ChangeRequest, ClientCommand, ClientConfig, ClientError, ClientEvent, MirrorClient,
    ReconnectPolicy, SessionEnd,
};
pub use dispatch::{Dispatch, ElementHandler, InputAction};
pub use handshake::Handshake;
pub use log::{LogEntry, MessageLog};
pub use pipeline::{Coalescer, EmitPolicy, Emission};
pub use store::MirrorStore;
pub use transport::{ReadyState, Transport, TransportError, TransportEvent};
