//! Connect command

use scry_client::{ClientConfig, ClientError, MirrorClient, ReconnectPolicy};
use scry_protocol::SessionId;
use scry_term::{TermApp, TermConfig};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

pub async fn run(
    endpoint: String,
    session: Option<String>,
    quiescence_ms: u64,
    reconnect_secs: Option<u64>,
    max_attempts: u32,
    dump_state: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let reconnect = match reconnect_secs {
        Some(secs) => ReconnectPolicy::Fixed {
            delay: Duration::from_secs(secs),
            max_attempts,
        },
        None => ReconnectPolicy::Never,
    };

    let config = ClientConfig {
        endpoint,
        quiescence: Duration::from_millis(quiescence_ms),
        reconnect,
        ..Default::default()
    };
    let config = match session {
        Some(session) => ClientConfig {
            session: SessionId::new(session),
            ..config
        },
        None => config,
    };

    info!(endpoint = %config.endpoint, session = %config.session, "starting");

    let (event_tx, event_rx) = mpsc::channel(64);
    let (command_tx, command_rx) = mpsc::channel(64);

    let engine = tokio::spawn(MirrorClient::new(config, event_tx, command_rx).run());

    let app = TermApp::new(TermConfig {
        debug_dump: dump_state,
        ..Default::default()
    });
    app.run(event_rx, command_tx).await?;

    // The UI is gone; stop mirroring
    engine.abort();
    match engine.await {
        // Quitting the UI closes the event channel under the engine; expected
        Ok(Err(ClientError::ChannelClosed)) | Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "session failed"),
        Err(e) if e.is_cancelled() => {}
        Err(e) => error!(error = %e, "engine task failed"),
    }

    Ok(())
}
