//! Scry Protocol - Client/Server wire format
//!
//! This crate defines the message protocol between a state server and the
//! Scry mirror client.
//!
//! # Architecture
//!
//! ```text
//! State Server                          Scry Client
//! ┌─────────────┐                      ┌─────────────┐
//! │             │   StateSync          │             │
//! │  owns all   │ ───────────────────► │  mirrors    │
//! │  app state  │                      │  snapshots  │
//! │             │   Loading            │             │
//! │             │ ───────────────────► │             │
//! │             │                      │             │
//! │             │   Hello / Change     │             │
//! │             │ ◄─────────────────── │  reports    │
//! │             │                      │  input      │
//! └─────────────┘                      └─────────────┘
//! ```
//!
//! Every frame is a UTF-8 JSON envelope `{ "kind": ..., "message": ... }`.
//! Inbound kinds beyond the ones this build understands are surfaced as
//! [`Inbound::Unknown`] so a newer server never breaks an older client;
//! anything non-JSON, or a recognized kind with a malformed body, is a hard
//! [`CodecError`].

pub mod codec;
pub mod messages;

// Re-export commonly used types
pub use codec::{decode_inbound, encode_outbound, CodecError};
pub use messages::{Inbound, Outbound, SessionId};
