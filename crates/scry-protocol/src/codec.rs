//! Message encoding/decoding
//!
//! One JSON envelope per frame: `{ "kind": <string>, "message": <object> }`.
//! Decoding is tolerant of unrecognized kinds and strict about everything
//! else.

use crate::messages::{Inbound, Outbound};
use scry_core::UiState;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("decoding failed: {0}")]
    Decode(String),
}

// The tolerant first pass: only the envelope shape, body left raw.
#[derive(Deserialize)]
struct RawEnvelope {
    kind: String,
    #[serde(default)]
    message: Value,
}

#[derive(Deserialize)]
struct StateSyncBody {
    state: UiState,
}

#[derive(Deserialize)]
struct LoadingBody {
    loading: bool,
}

/// Encode an outbound message to a text frame
pub fn encode_outbound(message: &Outbound) -> Result<String, CodecError> {
    serde_json::to_string(message).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a text frame into an inbound message
///
/// Unrecognized `kind` values succeed as [`Inbound::Unknown`]. Non-JSON
/// input, a missing envelope, or a recognized kind whose body violates its
/// schema all fail hard.
pub fn decode_inbound(text: &str) -> Result<Inbound, CodecError> {
    let envelope: RawEnvelope =
        serde_json::from_str(text).map_err(|e| CodecError::Decode(e.to_string()))?;

    match envelope.kind.as_str() {
        "StateSync" => {
            let body: StateSyncBody = serde_json::from_value(envelope.message)
                .map_err(|e| CodecError::Decode(format!("StateSync body: {e}")))?;
            Ok(Inbound::StateSync { state: body.state })
        }
        "Loading" => {
            let body: LoadingBody = serde_json::from_value(envelope.message)
                .map_err(|e| CodecError::Decode(format!("Loading body: {e}")))?;
            Ok(Inbound::Loading {
                loading: body.loading,
            })
        }
        _ => Ok(Inbound::Unknown {
            kind: envelope.kind.clone(),
            message: envelope.message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::SessionId;
    use scry_core::{ChangeValue, Widget};

    #[test]
    fn test_encode_hello() {
        let text = encode_outbound(&Outbound::Hello {
            session: SessionId::new("session"),
        })
        .unwrap();

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["kind"], "Hello");
        assert_eq!(value["message"]["session"], "session");
    }

    #[test]
    fn test_encode_change_bool() {
        let text = encode_outbound(&Outbound::Change {
            id: "c1".into(),
            value: ChangeValue::Bool(true),
        })
        .unwrap();

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["message"]["value"], true);
    }

    #[test]
    fn test_decode_state_sync() {
        let text = r##"{
            "kind": "StateSync",
            "message": { "state": {
                "registry": {
                    "s1": {"id":"s1","kind":"Slider","visible":true,"value":5.0,"min":0.0,"max":10.0},
                    "m1": {"id":"m1","kind":"Markdown","visible":false,"md":"# Title"}
                },
                "order": ["s1", "m1"]
            }}
        }"##;

        let inbound = decode_inbound(text).unwrap();
        match inbound {
            Inbound::StateSync { state } => {
                assert_eq!(state.order.len(), 2);
                let slider = state.get(&"s1".into()).unwrap();
                assert!(matches!(slider.widget, Widget::Slider { value, .. } if value == 5.0));
                assert!(!state.get(&"m1".into()).unwrap().visible);
            }
            other => panic!("expected StateSync, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_loading() {
        let inbound = decode_inbound(r#"{"kind":"Loading","message":{"loading":true}}"#).unwrap();
        assert_eq!(inbound, Inbound::Loading { loading: true });
    }

    #[test]
    fn test_unknown_kind_is_tolerated() {
        let inbound =
            decode_inbound(r#"{"kind":"Telemetry","message":{"fps":60}}"#).unwrap();

        match inbound {
            Inbound::Unknown { kind, message } => {
                assert_eq!(kind, "Telemetry");
                assert_eq!(message["fps"], 60);
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        assert!(matches!(
            decode_inbound("not json at all"),
            Err(CodecError::Decode(_))
        ));
        assert!(matches!(
            decode_inbound(r#"{"no_kind_here":1}"#),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn test_recognized_kind_with_bad_body_is_rejected() {
        let result = decode_inbound(r#"{"kind":"Loading","message":{"loading":"yes"}}"#);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_state_sync_with_invalid_element_is_rejected() {
        // Slider body missing its range fields violates the element schema
        let text = r#"{
            "kind": "StateSync",
            "message": { "state": {
                "registry": { "s1": {"id":"s1","kind":"Slider","visible":true,"value":5.0} },
                "order": ["s1"]
            }}
        }"#;
        assert!(matches!(decode_inbound(text), Err(CodecError::Decode(_))));
    }
}
