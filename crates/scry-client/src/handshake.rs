//! Session handshake
//!
//! The greeting is sent exactly once per connection, on the first `Open`
//! observation. The guard is an explicit field scoped to one connection and
//! re-armed whenever a fresh connection is established, so a reconnect
//! greets again.

use scry_protocol::{Outbound, SessionId};

/// One-shot greeting guard for a single connection
#[derive(Debug, Clone)]
pub struct Handshake {
    session: SessionId,
    greeted: bool,
}

impl Handshake {
    /// Create a guard for the given session
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            greeted: false,
        }
    }

    /// The session this guard greets with
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Whether the greeting has been produced for the current connection
    pub fn greeted(&self) -> bool {
        self.greeted
    }

    /// Called on every `Open` observation; yields the greeting only once
    pub fn on_open(&mut self) -> Option<Outbound> {
        if self.greeted {
            return None;
        }

        self.greeted = true;
        Some(Outbound::Hello {
            session: self.session.clone(),
        })
    }

    /// Re-arm for a fresh connection
    pub fn reset(&mut self) {
        self.greeted = false;
    }
}
