//! In-memory transport for tests
//!
//! A [`MemoryTransport`] is driven by its paired [`MemoryPeer`]: the peer
//! scripts lifecycle events and inbound frames, and observes every frame the
//! engine sends.

use super::{ReadyState, Transport, TransportError, TransportEvent};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// In-memory transport half held by the engine
pub struct MemoryTransport {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    outbound: mpsc::UnboundedSender<String>,
    state: ReadyState,
}

/// Scripting half held by the test
pub struct MemoryPeer {
    events: mpsc::UnboundedSender<TransportEvent>,
    /// Frames the engine sent, in order
    pub outbound: mpsc::UnboundedReceiver<String>,
}

impl MemoryTransport {
    /// Create a connected transport/peer pair
    pub fn pair() -> (Self, MemoryPeer) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        (
            Self {
                events: event_rx,
                outbound: outbound_tx,
                state: ReadyState::Connecting,
            },
            MemoryPeer {
                events: event_tx,
                outbound: outbound_rx,
            },
        )
    }
}

impl MemoryPeer {
    /// Deliver the `Opened` lifecycle event
    pub fn open(&self) {
        let _ = self.events.send(TransportEvent::Opened);
    }

    /// Deliver one inbound text frame
    pub fn message(&self, text: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Message(text.into()));
    }

    /// Close the connection
    pub fn close(&self, reason: Option<String>) {
        let _ = self.events.send(TransportEvent::Closed { reason });
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        if self.state != ReadyState::Open {
            return Err(TransportError::NotOpen);
        }

        self.outbound
            .send(text)
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        if self.state == ReadyState::Closed {
            return None;
        }

        let event = self.events.recv().await;
        match &event {
            Some(TransportEvent::Opened) => self.state = ReadyState::Open,
            Some(TransportEvent::Closed { .. }) | None => self.state = ReadyState::Closed,
            Some(TransportEvent::Message(_)) => {}
        }
        event
    }

    fn ready_state(&self) -> ReadyState {
        self.state
    }
}
