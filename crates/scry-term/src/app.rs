//! Interactive terminal application
//!
//! Bridges the synchronization engine to the screen: engine events update
//! the displayed snapshot, keyboard events become element interactions.

use crate::echo::LocalEcho;
use crate::handlers::{dispatch_table, Line};
use crate::screen::{Frame, OutputError, TermScreen};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use scry_client::{
    ChangeRequest, ClientCommand, ClientEvent, Dispatch, InputAction, MessageLog, ReadyState,
};
use scry_core::{UiState, Widget};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// How many arrow-key steps span a slider's full range
const SLIDER_STEPS: f64 = 20.0;

/// Presentation configuration
///
/// Passed in at startup; there is no global toggle.
#[derive(Debug, Clone)]
pub struct TermConfig {
    /// Render the mirrored state and message history below the widgets
    pub debug_dump: bool,
    /// How many received envelopes the history keeps
    pub history_capacity: usize,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            debug_dump: false,
            history_capacity: 64,
        }
    }
}

/// The interactive terminal frontend
pub struct TermApp {
    config: TermConfig,
    dispatch: Dispatch<Line>,
    echo: LocalEcho,
    history: MessageLog,
    snapshot: Arc<UiState>,
    loading: bool,
    status: String,
    /// Ordinal among interactive lines, not a line index
    focus: usize,
}

impl TermApp {
    /// Create an app with the stock handler table
    pub fn new(config: TermConfig) -> Self {
        let history = MessageLog::new(config.history_capacity);
        Self {
            config,
            dispatch: dispatch_table(),
            echo: LocalEcho::new(),
            history,
            snapshot: Arc::new(UiState::new()),
            loading: false,
            status: "connecting".to_string(),
            focus: 0,
        }
    }

    /// Run until the user quits or the engine's event stream ends
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ClientEvent>,
        commands: mpsc::Sender<ClientCommand>,
    ) -> Result<(), OutputError> {
        let mut screen = TermScreen::new();
        screen.init()?;
        let mut keys = EventStream::new();

        loop {
            let effective = self.echo.effective_state(&self.snapshot);
            let lines = self.dispatch.walk(&effective);
            self.clamp_focus(&lines);

            let dump = self.config.debug_dump.then(|| self.debug_dump());
            screen.draw(&Frame {
                lines: &lines,
                focus: focused_line(&lines, self.focus),
                loading: self.loading,
                status: &self.status,
                dump: dump.as_deref(),
            })?;

            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => self.on_client_event(event),
                        None => break,
                    }
                }

                key = keys.next() => {
                    let Some(Ok(Event::Key(key))) = key else {
                        continue;
                    };
                    if !self.on_key(key, &lines, &effective, &commands).await {
                        break;
                    }
                }
            }
        }

        screen.cleanup()
    }

    fn on_client_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Synced(snapshot) => {
                // The snapshot is authoritative again; drop local echoes
                self.snapshot = snapshot;
                self.echo.clear();
            }
            ClientEvent::Loading(loading) => self.loading = loading,
            ClientEvent::Logged(entry) => self.history.push(entry),
            ClientEvent::Connection(state) => {
                self.status = match state {
                    ReadyState::Connecting => "connecting".to_string(),
                    ReadyState::Open => "connected".to_string(),
                    ReadyState::Closing => "closing".to_string(),
                    ReadyState::Closed => "disconnected".to_string(),
                };
            }
            ClientEvent::Fault(fault) => {
                self.status = format!("fault: {fault}");
            }
        }
    }

    /// Handle one key; returns false to quit
    async fn on_key(
        &mut self,
        key: KeyEvent,
        lines: &[Line],
        effective: &UiState,
        commands: &mpsc::Sender<ClientCommand>,
    ) -> bool {
        if key.kind == KeyEventKind::Release {
            return true;
        }

        let interactive = lines.iter().filter(|l| l.interactive).count();

        match key.code {
            KeyCode::Char('q') => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return false;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.focus = self.focus.checked_sub(1).unwrap_or(0);
            }
            KeyCode::Down | KeyCode::Tab => {
                if interactive > 0 && self.focus + 1 < interactive {
                    self.focus += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.interact(lines, effective, InputAction::Activate, commands)
                    .await;
            }
            KeyCode::Left => {
                if let Some(action) = self.slider_step(lines, effective, -1.0) {
                    self.interact(lines, effective, action, commands).await;
                }
            }
            KeyCode::Right => {
                if let Some(action) = self.slider_step(lines, effective, 1.0) {
                    self.interact(lines, effective, action, commands).await;
                }
            }
            KeyCode::Char('g') => {
                let _ = commands.send(ClientCommand::Greet).await;
            }
            _ => {}
        }

        true
    }

    /// Route an action through the focused element's handler
    async fn interact(
        &mut self,
        lines: &[Line],
        effective: &UiState,
        action: InputAction,
        commands: &mpsc::Sender<ClientCommand>,
    ) {
        let Some(row) = focused_line(lines, self.focus) else {
            return;
        };
        let id = lines[row].id.clone();
        let Some(element) = effective.get(&id) else {
            return;
        };

        let Some(emission) = self.dispatch.input(element, action) else {
            return;
        };

        debug!(%id, value = %emission.value, "interaction");
        self.echo.set(id.clone(), emission.value);
        let _ = commands
            .send(ClientCommand::Change(ChangeRequest::new(id, emission)))
            .await;
    }

    /// Arrow-key step for the focused slider, if the focus is on one
    fn slider_step(
        &self,
        lines: &[Line],
        effective: &UiState,
        direction: f64,
    ) -> Option<InputAction> {
        let row = focused_line(lines, self.focus)?;
        let element = effective.get(&lines[row].id)?;

        let Widget::Slider { value, min, max } = &element.widget else {
            return None;
        };

        let step = (max - min) / SLIDER_STEPS;
        Some(InputAction::SetValue(value + direction * step))
    }

    /// Mirrored state plus recent message history, as overlay text
    fn debug_dump(&self) -> String {
        let state = serde_json::to_string_pretty(&*self.snapshot).unwrap_or_default();
        let history: String = self
            .history
            .entries()
            .map(|entry| format!("\n{} {}", entry.kind, entry.summary))
            .collect();

        format!("{state}\n--- received ---{history}")
    }

    fn clamp_focus(&mut self, lines: &[Line]) {
        let interactive = lines.iter().filter(|l| l.interactive).count();
        if interactive == 0 {
            self.focus = 0;
        } else if self.focus >= interactive {
            self.focus = interactive - 1;
        }
    }
}

/// Map an interactive ordinal to its index among all lines
fn focused_line(lines: &[Line], focus: usize) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.interactive)
        .map(|(index, _)| index)
        .nth(focus)
}
