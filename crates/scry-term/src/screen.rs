//! Terminal screen handling
//!
//! Owns raw mode and the alternate screen, and redraws the full view on
//! every change. The view is small (one line per element plus chrome), so
//! no diffing is needed.

use crate::handlers::Line;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use thiserror::Error;

/// Terminal output errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Everything one redraw needs
pub struct Frame<'a> {
    /// Rendered element lines, in order
    pub lines: &'a [Line],
    /// Index into `lines` of the focused element, if any
    pub focus: Option<usize>,
    /// Transient server-busy indicator
    pub loading: bool,
    /// Connection/fault status line
    pub status: &'a str,
    /// Optional mirrored-state dump shown below the widgets
    pub dump: Option<&'a str>,
}

/// Terminal screen owner
pub struct TermScreen {
    alternate_screen: bool,
    cursor_hidden: bool,
    raw_mode: bool,
}

impl TermScreen {
    /// Create an uninitialized screen
    pub fn new() -> Self {
        Self {
            alternate_screen: false,
            cursor_hidden: false,
            raw_mode: false,
        }
    }

    /// Initialize the terminal for rendering
    pub fn init(&mut self) -> Result<(), OutputError> {
        let mut stdout = io::stdout();

        execute!(stdout, EnterAlternateScreen)?;
        self.alternate_screen = true;

        execute!(stdout, Hide)?;
        self.cursor_hidden = true;

        terminal::enable_raw_mode()?;
        self.raw_mode = true;

        execute!(stdout, Clear(ClearType::All))?;
        Ok(())
    }

    /// Restore the terminal
    pub fn cleanup(&mut self) -> Result<(), OutputError> {
        let mut stdout = io::stdout();

        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
            self.raw_mode = false;
        }

        if self.cursor_hidden {
            execute!(stdout, Show)?;
            self.cursor_hidden = false;
        }

        if self.alternate_screen {
            execute!(stdout, LeaveAlternateScreen)?;
            self.alternate_screen = false;
        }

        Ok(())
    }

    /// Redraw the whole view
    pub fn draw(&mut self, frame: &Frame<'_>) -> Result<(), OutputError> {
        let mut stdout = io::stdout();

        queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

        let header = if frame.loading { "⟳ loading…" } else { "" };
        queue!(
            stdout,
            SetForegroundColor(Color::DarkGrey),
            Print(format!("{:<20} {}", header, frame.status)),
            ResetColor
        )?;

        for (row, line) in frame.lines.iter().enumerate() {
            queue!(stdout, MoveTo(0, row as u16 + 2))?;

            if frame.focus == Some(row) {
                queue!(
                    stdout,
                    SetForegroundColor(Color::Cyan),
                    Print(format!("▶ {}", line.text)),
                    ResetColor
                )?;
            } else {
                queue!(stdout, Print(format!("  {}", line.text)))?;
            }
        }

        if let Some(dump) = frame.dump {
            let base = frame.lines.len() as u16 + 3;
            for (offset, text) in dump.lines().enumerate() {
                queue!(
                    stdout,
                    MoveTo(0, base + offset as u16),
                    SetForegroundColor(Color::DarkGrey),
                    Print(text),
                    ResetColor
                )?;
            }
        }

        stdout.flush()?;
        Ok(())
    }
}

impl Default for TermScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TermScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
