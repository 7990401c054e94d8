//! Protocol messages
//!
//! Defines the message types exchanged between state servers and Scry
//! clients. Outbound messages are a closed set; inbound messages keep an
//! open tail for kinds introduced after this build.

use scry_core::{ChangeValue, ElementId, UiState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ephemeral session identifier
///
/// Established during the handshake; scoped to one connection and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a session id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Client → Server messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message")]
pub enum Outbound {
    /// Handshake greeting, sent exactly once per connection
    Hello { session: SessionId },

    /// A user-driven value change for one element
    Change { id: ElementId, value: ChangeValue },
}

impl Outbound {
    /// Convenience constructor for an activation change (button/image click)
    pub fn activate(id: impl Into<ElementId>) -> Self {
        Self::Change {
            id: id.into(),
            value: ChangeValue::ACTIVATE,
        }
    }

    /// The wire kind tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "Hello",
            Self::Change { .. } => "Change",
        }
    }
}

/// Server → Client messages
///
/// Not serde-derived as a closed enum on purpose: unrecognized kinds decode
/// into [`Inbound::Unknown`] instead of failing the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Full snapshot replacing all mirrored state
    StateSync { state: UiState },

    /// Transient busy indicator, independent of the snapshot
    Loading { loading: bool },

    /// A kind this build does not understand; recorded, never acted on
    Unknown { kind: String, message: Value },
}

impl Inbound {
    /// The wire kind tag
    pub fn kind(&self) -> &str {
        match self {
            Self::StateSync { .. } => "StateSync",
            Self::Loading { .. } => "Loading",
            Self::Unknown { kind, .. } => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_envelope_shape() {
        let msg = Outbound::Hello {
            session: SessionId::new("abc"),
        };

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["kind"], "Hello");
        assert_eq!(value["message"]["session"], "abc");
    }

    #[test]
    fn test_change_envelope_shape() {
        let msg = Outbound::Change {
            id: "s1".into(),
            value: ChangeValue::Number(7.0),
        };

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["kind"], "Change");
        assert_eq!(value["message"]["id"], "s1");
        assert_eq!(value["message"]["value"], 7.0);
    }

    #[test]
    fn test_activate_uses_sentinel() {
        let msg = Outbound::activate("b1");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["message"]["value"], -1.0);
    }
}
