//! WebSocket transport
//!
//! tokio-tungstenite client carrying UTF-8 text frames. Pings are answered
//! internally; binary frames are not part of the protocol and are skipped.

use super::{ReadyState, Transport, TransportError, TransportEvent};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, warn};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport
pub struct WsTransport {
    stream: WsStream,
    state: ReadyState,
    opened_delivered: bool,
}

impl WsTransport {
    /// Connect to a WebSocket endpoint
    ///
    /// Resolves once the HTTP upgrade completes; the `Opened` event is then
    /// delivered on the first [`Transport::next_event`] call.
    pub async fn connect(endpoint: &str) -> Result<Self, TransportError> {
        let url = Url::parse(endpoint)
            .map_err(|e| TransportError::ConnectionFailed(format!("invalid url: {e}")))?;

        debug!(%url, "connecting");
        let (stream, response) = connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        debug!(status = %response.status(), "websocket upgrade complete");

        Ok(Self {
            stream,
            state: ReadyState::Connecting,
            opened_delivered: false,
        })
    }

    fn close_event(&mut self, reason: Option<String>) -> Option<TransportEvent> {
        self.state = ReadyState::Closed;
        Some(TransportEvent::Closed { reason })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        if self.state != ReadyState::Open {
            return Err(TransportError::NotOpen);
        }

        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        if self.state == ReadyState::Closed {
            return None;
        }

        if !self.opened_delivered {
            self.opened_delivered = true;
            self.state = ReadyState::Open;
            return Some(TransportEvent::Opened);
        }

        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Some(TransportEvent::Message(text));
                }
                Some(Ok(Message::Ping(payload))) => {
                    if let Err(e) = self.stream.send(Message::Pong(payload)).await {
                        warn!(error = %e, "pong failed");
                        return self.close_event(Some(e.to_string()));
                    }
                }
                Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Binary(_))) => {
                    // Not part of the protocol; skip rather than fail
                    debug!("ignoring binary frame");
                }
                Some(Ok(Message::Close(frame))) => {
                    self.state = ReadyState::Closing;
                    let reason = frame.map(|f| f.reason.to_string());
                    return self.close_event(reason);
                }
                Some(Ok(Message::Frame(_))) => {
                    debug!("ignoring raw frame");
                }
                Some(Err(e)) => {
                    return self.close_event(Some(e.to_string()));
                }
                None => {
                    return self.close_event(None);
                }
            }
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.state
    }
}
