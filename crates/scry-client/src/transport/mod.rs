//! Transport abstraction
//!
//! One persistent bidirectional connection carrying text frames. The engine
//! is written against the [`Transport`] trait; [`ws::WsTransport`] is the
//! production implementation and [`memory::MemoryTransport`] backs tests.

pub mod memory;
pub mod ws;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::{MemoryPeer, MemoryTransport};
pub use ws::WsTransport;

/// Connection readiness
///
/// Transitions are driven by the underlying connection. A drop to `Closed`
/// is terminal for the session; whether a fresh connection is attempted is
/// the engine's reconnect policy, not the transport's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Connection attempt in flight
    Connecting,
    /// Frames can be sent and received
    Open,
    /// Close initiated, not yet complete
    Closing,
    /// Terminal; no further frames
    Closed,
}

/// Lifecycle and traffic events produced by a transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The connection reached `Open`. Observed exactly once per connection.
    Opened,
    /// One inbound text frame
    Message(String),
    /// The connection dropped to `Closed`, with the peer's reason if any
    Closed { reason: Option<String> },
}

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("transport is not open")]
    NotOpen,

    #[error("send failed: {0}")]
    SendFailed(String),
}

/// One persistent bidirectional text-frame connection
#[async_trait]
pub trait Transport: Send {
    /// Send one text frame. Fails if the connection is not `Open`.
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Next lifecycle or traffic event; `None` once the connection has
    /// closed and its `Closed` event was already delivered.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Current readiness
    fn ready_state(&self) -> ReadyState;
}
