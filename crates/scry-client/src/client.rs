//! The synchronization engine
//!
//! One cooperative loop per connection: inbound frames, frontend input, and
//! the earliest coalescing deadline are multiplexed with `select!`. Inbound
//! messages apply strictly in arrival order, and a snapshot fully supersedes
//! the previous one before any queued input is handled.

use crate::handshake::Handshake;
use crate::log::LogEntry;
use crate::pipeline::{Coalescer, EmitPolicy, Emission};
use crate::store::MirrorStore;
use crate::transport::{ReadyState, Transport, TransportError, TransportEvent, WsTransport};
use scry_core::{ElementId, UiState};
use scry_protocol::{decode_inbound, encode_outbound, CodecError, Inbound, Outbound, SessionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Whether and how to attempt a fresh connection after a drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// A drop ends the client
    Never,
    /// Retry with a fixed delay, up to `max_attempts` consecutive failures
    Fixed {
        delay: Duration,
        max_attempts: u32,
    },
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint
    pub endpoint: String,
    /// Session identifier used in the greeting
    pub session: SessionId,
    /// Quiescence window for coalesced emissions
    pub quiescence: Duration,
    /// Behavior after a connection drop
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:1337".to_string(),
            session: SessionId::new(Uuid::new_v4().to_string()),
            quiescence: Duration::from_millis(500),
            reconnect: ReconnectPolicy::Never,
        }
    }
}

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("protocol error: {0}")]
    Codec(#[from] CodecError),

    #[error("event channel closed")]
    ChannelClosed,
}

/// Events the engine publishes to the presentation layer
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Connection readiness changed
    Connection(ReadyState),
    /// A new snapshot replaced the mirrored state
    Synced(Arc<UiState>),
    /// The transient loading indicator changed
    Loading(bool),
    /// One inbound envelope was received; diagnostic history feed
    Logged(LogEntry),
    /// A decode or connect failure, surfaced as displayable state
    Fault(String),
}

/// One user-driven change handed to the engine
#[derive(Debug, Clone)]
pub struct ChangeRequest {
    pub id: ElementId,
    pub emission: Emission,
}

impl ChangeRequest {
    /// Pair an element id with the emission its handler produced
    pub fn new(id: ElementId, emission: Emission) -> Self {
        Self { id, emission }
    }
}

/// Requests the presentation layer can make of the engine
#[derive(Debug, Clone)]
pub enum ClientCommand {
    /// Emit a value change for one element
    Change(ChangeRequest),
    /// Send the greeting again, bypassing the handshake guard
    Greet,
}

impl From<ChangeRequest> for ClientCommand {
    fn from(request: ChangeRequest) -> Self {
        Self::Change(request)
    }
}

/// How a session ended
#[derive(Debug)]
pub struct SessionEnd {
    /// Close reason reported by the peer, if any
    pub reason: Option<String>,
    /// Emissions discarded because the transport was not open
    pub changes_dropped: u64,
}

/// The synchronization engine
///
/// Owns the mirrored state for the lifetime of each connection and bridges
/// the transport to the presentation layer through channels.
pub struct MirrorClient {
    config: ClientConfig,
    events: mpsc::Sender<ClientEvent>,
    commands: mpsc::Receiver<ClientCommand>,
}

impl MirrorClient {
    /// Create an engine publishing to `events` and driven by `commands`
    pub fn new(
        config: ClientConfig,
        events: mpsc::Sender<ClientEvent>,
        commands: mpsc::Receiver<ClientCommand>,
    ) -> Self {
        Self {
            config,
            events,
            commands,
        }
    }

    /// Connect and run until the connection ends and the reconnect policy
    /// declines to continue
    ///
    /// Each fresh connection re-arms the handshake guard, so a reconnect
    /// greets the server again. A decode failure is terminal regardless of
    /// policy.
    pub async fn run(mut self) -> Result<(), ClientError> {
        let mut handshake = Handshake::new(self.config.session.clone());
        let mut failures = 0u32;

        loop {
            handshake.reset();
            self.emit(ClientEvent::Connection(ReadyState::Connecting))
                .await?;

            let mut transport = match WsTransport::connect(&self.config.endpoint).await {
                Ok(transport) => {
                    failures = 0;
                    transport
                }
                Err(e) => {
                    self.emit(ClientEvent::Fault(e.to_string())).await?;
                    match self.config.reconnect {
                        ReconnectPolicy::Never => return Err(e.into()),
                        ReconnectPolicy::Fixed {
                            delay,
                            max_attempts,
                        } => {
                            failures += 1;
                            if failures >= max_attempts {
                                return Err(e.into());
                            }
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }
                }
            };

            let end = self.run_session(&mut transport, &mut handshake).await?;
            info!(reason = ?end.reason, dropped = end.changes_dropped, "session ended");

            match self.config.reconnect {
                ReconnectPolicy::Never => return Ok(()),
                ReconnectPolicy::Fixed { delay, .. } => {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Run one connection's session to completion
    ///
    /// Returns when the transport closes; decode failures surface a fault
    /// event and return the error.
    pub async fn run_session<T: Transport>(
        &mut self,
        transport: &mut T,
        handshake: &mut Handshake,
    ) -> Result<SessionEnd, ClientError> {
        let mut store = MirrorStore::new();
        let mut coalescer = Coalescer::new(self.config.quiescence);
        let mut dropped = 0u64;

        loop {
            let deadline = coalescer.next_deadline();

            tokio::select! {
                event = transport.next_event() => {
                    match event {
                        Some(TransportEvent::Opened) => {
                            self.emit(ClientEvent::Connection(ReadyState::Open)).await?;
                            if let Some(hello) = handshake.on_open() {
                                debug!(session = %handshake.session(), "greeting");
                                let text = encode_outbound(&hello)?;
                                transport.send(text).await?;
                            }
                        }
                        Some(TransportEvent::Message(text)) => {
                            match decode_inbound(&text) {
                                Ok(inbound) => {
                                    self.emit(ClientEvent::Logged(LogEntry::from_inbound(&inbound)))
                                        .await?;
                                    self.apply(inbound, &mut store, &mut coalescer).await?;
                                }
                                Err(e) => {
                                    self.emit(ClientEvent::Fault(e.to_string())).await?;
                                    return Err(e.into());
                                }
                            }
                        }
                        Some(TransportEvent::Closed { reason }) => {
                            self.emit(ClientEvent::Connection(ReadyState::Closed)).await?;
                            return Ok(SessionEnd {
                                reason,
                                changes_dropped: dropped,
                            });
                        }
                        None => {
                            self.emit(ClientEvent::Connection(ReadyState::Closed)).await?;
                            return Ok(SessionEnd {
                                reason: None,
                                changes_dropped: dropped,
                            });
                        }
                    }
                }

                Some(command) = self.commands.recv() => {
                    match command {
                        ClientCommand::Change(request) => match request.emission.policy {
                            EmitPolicy::Immediate => {
                                self.send_change(transport, request.id, request.emission, &mut dropped)
                                    .await?;
                            }
                            EmitPolicy::Coalesced => {
                                coalescer.stage(request.id, request.emission.value, Instant::now());
                            }
                        },
                        ClientCommand::Greet => {
                            debug!(session = %handshake.session(), "manual greeting");
                            let hello = Outbound::Hello {
                                session: handshake.session().clone(),
                            };
                            if transport.ready_state() == ReadyState::Open {
                                transport.send(encode_outbound(&hello)?).await?;
                            } else {
                                warn!("transport not open, greeting dropped");
                            }
                        }
                    }
                }

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    for (id, value) in coalescer.take_due(Instant::now()) {
                        self.send_change(
                            transport,
                            id,
                            Emission::immediate(value),
                            &mut dropped,
                        )
                        .await?;
                    }
                }
            }
        }
    }

    /// Apply one decoded inbound message
    async fn apply(
        &mut self,
        inbound: Inbound,
        store: &mut MirrorStore,
        coalescer: &mut Coalescer,
    ) -> Result<(), ClientError> {
        match inbound {
            Inbound::StateSync { state } => {
                for id in state.dangling_ids() {
                    warn!(%id, "order references unknown element");
                }

                let snapshot = store.apply_sync(state);
                // Buffered values for elements that just disappeared are
                // canceled, never emitted.
                coalescer.retain_present(&snapshot);
                self.emit(ClientEvent::Synced(snapshot)).await?;
            }
            Inbound::Loading { loading } => {
                store.apply_loading(loading);
                self.emit(ClientEvent::Loading(loading)).await?;
            }
            Inbound::Unknown { kind, .. } => {
                debug!(%kind, "ignoring unknown message kind");
            }
        }

        Ok(())
    }

    /// Send one change, dropping it if the transport is not open
    async fn send_change<T: Transport>(
        &mut self,
        transport: &mut T,
        id: ElementId,
        emission: Emission,
        dropped: &mut u64,
    ) -> Result<(), ClientError> {
        if transport.ready_state() != ReadyState::Open {
            *dropped += 1;
            warn!(%id, total = *dropped, "transport not open, change dropped");
            return Ok(());
        }

        let message = Outbound::Change {
            id,
            value: emission.value,
        };
        let text = encode_outbound(&message)?;

        if let Err(e) = transport.send(text).await {
            *dropped += 1;
            warn!(error = %e, total = *dropped, "send failed, change dropped");
        }

        Ok(())
    }

    async fn emit(&self, event: ClientEvent) -> Result<(), ClientError> {
        self.events
            .send(event)
            .await
            .map_err(|_| ClientError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MemoryPeer, MemoryTransport};
    use serde_json::Value;
    use tokio::task::JoinHandle;

    struct Harness {
        peer: MemoryPeer,
        events: mpsc::Receiver<ClientEvent>,
        commands: mpsc::Sender<ClientCommand>,
        engine: JoinHandle<Result<SessionEnd, ClientError>>,
    }

    impl Harness {
        async fn change(&self, id: &str, emission: Emission) {
            self.commands
                .send(ClientCommand::Change(ChangeRequest::new(id.into(), emission)))
                .await
                .unwrap();
        }
    }

    fn spawn_session(config: ClientConfig) -> Harness {
        let (transport, peer) = MemoryTransport::pair();
        let (event_tx, event_rx) = mpsc::channel(64);
        let (command_tx, command_rx) = mpsc::channel(64);

        let session = config.session.clone();
        let mut client = MirrorClient::new(config, event_tx, command_rx);
        let engine = tokio::spawn(async move {
            let mut transport = transport;
            let mut handshake = Handshake::new(session);
            client.run_session(&mut transport, &mut handshake).await
        });

        Harness {
            peer,
            events: event_rx,
            commands: command_tx,
            engine,
        }
    }

    fn parsed(frame: &str) -> Value {
        serde_json::from_str(frame).unwrap()
    }

    async fn next_outbound(harness: &mut Harness) -> Value {
        parsed(&harness.peer.outbound.recv().await.unwrap())
    }

    fn sync_frame(elements: &str, order: &str) -> String {
        format!(
            r#"{{"kind":"StateSync","message":{{"state":{{"registry":{{{elements}}},"order":[{order}]}}}}}}"#
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_hello_sent_once_per_connection() {
        let mut harness = spawn_session(ClientConfig {
            session: SessionId::new("session"),
            ..Default::default()
        });

        // Several open observations on the same connection
        harness.peer.open();
        harness.peer.open();

        let hello = next_outbound(&mut harness).await;
        assert_eq!(hello["kind"], "Hello");
        assert_eq!(hello["message"]["session"], "session");

        harness.peer.close(None);
        let end = harness.engine.await.unwrap().unwrap();
        assert_eq!(end.changes_dropped, 0);

        // No second greeting ever went out
        assert!(harness.peer.outbound.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_change_is_sent_synchronously() {
        let mut harness = spawn_session(ClientConfig::default());
        harness.peer.open();
        let _hello = next_outbound(&mut harness).await;

        harness.change("b1", Emission::activation()).await;

        let change = next_outbound(&mut harness).await;
        assert_eq!(change["kind"], "Change");
        assert_eq!(change["message"]["id"], "b1");
        assert_eq!(change["message"]["value"], -1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_slider_updates_coalesce_to_last_value() {
        let mut harness = spawn_session(ClientConfig::default());
        harness.peer.open();
        let _hello = next_outbound(&mut harness).await;

        for value in [5.0, 6.0, 7.0] {
            harness.change("s1", Emission::coalesced(value)).await;
        }

        // The quiescence window elapses with no further updates: exactly one
        // emission, carrying the last value.
        let change = next_outbound(&mut harness).await;
        assert_eq!(change["kind"], "Change");
        assert_eq!(change["message"]["id"], "s1");
        assert_eq!(change["message"]["value"], 7.0);

        tokio::task::yield_now().await;
        assert!(harness.peer.outbound.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_replaces_state_and_cancels_departed_pending() {
        let mut harness = spawn_session(ClientConfig::default());
        harness.peer.open();
        let _hello = next_outbound(&mut harness).await;

        let slider =
            r#""s1":{"id":"s1","kind":"Slider","visible":true,"value":1.0,"min":0.0,"max":9.0}"#;
        harness.peer.message(sync_frame(slider, r#""s1""#));

        // Wait until the snapshot is applied
        loop {
            match harness.events.recv().await.unwrap() {
                ClientEvent::Synced(state) => {
                    assert_eq!(state.len(), 1);
                    break;
                }
                _ => continue,
            }
        }

        // Stage a coalesced value, then remove the slider before the window
        harness.change("s1", Emission::coalesced(3.0)).await;
        // Let the engine buffer the change before the snapshot arrives
        tokio::task::yield_now().await;
        harness.peer.message(sync_frame("", ""));

        loop {
            match harness.events.recv().await.unwrap() {
                ClientEvent::Synced(state) => {
                    assert!(state.is_empty());
                    break;
                }
                _ => continue,
            }
        }

        harness.peer.close(None);
        harness.engine.await.unwrap().unwrap();

        // The buffered value was discarded, not flushed on the way out
        assert!(harness.peer.outbound.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_is_independent_of_snapshots() {
        let mut harness = spawn_session(ClientConfig::default());
        harness.peer.open();
        let _hello = next_outbound(&mut harness).await;

        harness
            .peer
            .message(r#"{"kind":"Loading","message":{"loading":true}}"#);
        harness.peer.message(sync_frame("", ""));
        harness
            .peer
            .message(r#"{"kind":"Loading","message":{"loading":false}}"#);

        let mut saw = Vec::new();
        while saw.len() < 4 {
            match harness.events.recv().await.unwrap() {
                ClientEvent::Connection(state) => saw.push(format!("conn:{state:?}")),
                ClientEvent::Loading(flag) => saw.push(format!("loading:{flag}")),
                ClientEvent::Synced(_) => saw.push("synced".to_string()),
                ClientEvent::Fault(_) => saw.push("fault".to_string()),
                ClientEvent::Logged(_) => continue,
            }
        }

        assert_eq!(
            saw,
            vec!["conn:Open", "loading:true", "synced", "loading:false"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_kind_is_ignored_not_fatal() {
        let mut harness = spawn_session(ClientConfig::default());
        harness.peer.open();
        let _hello = next_outbound(&mut harness).await;

        harness
            .peer
            .message(r#"{"kind":"Telemetry","message":{"fps":60}}"#);
        harness
            .peer
            .message(r#"{"kind":"Loading","message":{"loading":true}}"#);

        // The unknown kind is recorded for diagnostics, produces no fault,
        // and the session keeps going
        let mut logged_unknown = false;
        loop {
            match harness.events.recv().await.unwrap() {
                ClientEvent::Logged(entry) if entry.kind == "Telemetry" => {
                    logged_unknown = true;
                }
                ClientEvent::Loading(true) => break,
                ClientEvent::Fault(fault) => panic!("unexpected fault: {fault}"),
                _ => continue,
            }
        }
        assert!(logged_unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_greet_bypasses_the_guard() {
        let mut harness = spawn_session(ClientConfig {
            session: SessionId::new("session"),
            ..Default::default()
        });
        harness.peer.open();
        let _hello = next_outbound(&mut harness).await;

        harness.commands.send(ClientCommand::Greet).await.unwrap();

        let greeting = next_outbound(&mut harness).await;
        assert_eq!(greeting["kind"], "Hello");
        assert_eq!(greeting["message"]["session"], "session");
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_frame_is_a_hard_fault() {
        let mut harness = spawn_session(ClientConfig::default());
        harness.peer.open();
        let _hello = next_outbound(&mut harness).await;

        harness.peer.message("not json");

        let result = harness.engine.await.unwrap();
        assert!(matches!(result, Err(ClientError::Codec(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_while_closed_is_dropped() {
        let mut harness = spawn_session(ClientConfig::default());

        // Connection never opened; the engine still accepts the request
        harness.change("b1", Emission::activation()).await;

        // Give the engine a chance to process the request before closing
        tokio::task::yield_now().await;
        harness.peer.close(None);

        let end = harness.engine.await.unwrap().unwrap();
        assert_eq!(end.changes_dropped, 1);
        assert!(harness.peer.outbound.try_recv().is_err());
    }
}
