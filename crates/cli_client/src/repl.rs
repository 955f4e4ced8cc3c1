//! Interactive loops: raw key events or line-buffered stdin

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::{Event, EventStream};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use futures::StreamExt;
use kaliterm_core::{ConnectionState, OutputLine, SessionEvent, SessionHandle};
use std::io::{IsTerminal, Stdout, Write};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::keys::{map_key, KeyAction};
use crate::render;

/// Output still in flight is printed for this long after stdin ends
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Prompt line plus everything printed above it
struct Screen<'a> {
    path: &'a str,
    input: String,
    suggestions: Vec<String>,
    waiting: bool,
    out: Stdout,
}

impl<'a> Screen<'a> {
    fn new(path: &'a str) -> Self {
        Self {
            path,
            input: String::new(),
            suggestions: Vec::new(),
            waiting: false,
            out: std::io::stdout(),
        }
    }

    fn redraw(&mut self) -> Result<()> {
        queue!(
            self.out,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(render::prompt(self.path, &self.input))
        )?;
        let mut hint = render::suggestion_hint(&self.suggestions).unwrap_or_default();
        if self.waiting {
            hint.push_str(&render::waiting_hint());
        }
        if !hint.is_empty() {
            queue!(self.out, cursor::SavePosition, Print(hint), cursor::RestorePosition)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn print_line(&mut self, line: &OutputLine) -> Result<()> {
        queue!(
            self.out,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(render::styled_line(line, "\r\n")),
            Print("\r\n")
        )?;
        self.redraw()
    }

    fn clear(&mut self) -> Result<()> {
        queue!(self.out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        self.redraw()
    }

    fn finish(&mut self) -> Result<()> {
        queue!(self.out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Key-by-key editing; the terminal must already be in raw mode
pub async fn run_raw(
    handle: &SessionHandle,
    mut events: broadcast::Receiver<SessionEvent>,
    path: &str,
) -> Result<()> {
    let mut keys = EventStream::new();
    let mut state = handle.watch_state();
    let mut screen = Screen::new(path);
    screen.redraw()?;

    loop {
        tokio::select! {
            key = keys.next() => {
                let Some(key) = key else { break };
                let Event::Key(key) = key? else { continue };
                let Some(action) = map_key(key) else { continue };

                match action {
                    KeyAction::Exit => break,
                    KeyAction::Submit => {
                        let line = std::mem::take(&mut screen.input);
                        screen.suggestions.clear();
                        handle.submit(line).await?;
                    }
                    KeyAction::RecallPrevious => screen.input = handle.recall_previous().await?,
                    KeyAction::RecallNext => screen.input = handle.recall_next().await?,
                    KeyAction::AcceptSuggestion => {
                        if handle.accept_suggestion(0).await? {
                            screen.input = handle.view().await?.input;
                            screen.suggestions.clear();
                        }
                    }
                    KeyAction::Insert(c) => {
                        screen.input.push(c);
                        handle.set_input(screen.input.clone()).await?;
                    }
                    KeyAction::Backspace => {
                        screen.input.pop();
                        handle.set_input(screen.input.clone()).await?;
                    }
                }
                screen.redraw()?;
            }
            event = events.recv() => match event {
                Ok(SessionEvent::Line(line)) => screen.print_line(&line)?,
                Ok(SessionEvent::ClearScreen) => screen.clear()?,
                Err(RecvError::Lagged(n)) => warn!("Missed {} output events", n),
                Err(RecvError::Closed) => break,
            },
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let (suggestions, waiting) = {
                    let view = state.borrow_and_update();
                    (view.suggestions.clone(), view.is_processing())
                };
                if suggestions != screen.suggestions || waiting != screen.waiting {
                    screen.suggestions = suggestions;
                    screen.waiting = waiting;
                    screen.redraw()?;
                }
            }
        }
    }

    screen.finish()
}

/// Whole lines from stdin, for pipes and dumb terminals
pub async fn run_lines(handle: &SessionHandle, mut events: broadcast::Receiver<SessionEvent>) -> Result<()> {
    let colored = std::io::stdout().is_terminal();
    let mut stdout = std::io::stdout();

    // Piped commands would only meet "Not connected" before the first open
    let mut state = handle.watch_state();
    let _ = state
        .wait_for(|view| matches!(view.connection, ConnectionState::Open | ConnectionState::Closed))
        .await;

    let (line_tx, mut line_rx) = mpsc::channel::<String>(32);
    tokio::task::spawn_blocking(move || {
        use std::io::BufRead;

        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            line = line_rx.recv() => match line {
                Some(line) => handle.submit(line).await?,
                None => {
                    debug!("stdin closed");
                    break;
                }
            },
            event = events.recv() => {
                if !print_event(&mut stdout, event, colored)? {
                    return Ok(());
                }
            }
        }
    }

    let grace = tokio::time::sleep(DRAIN_GRACE);
    tokio::pin!(grace);
    loop {
        tokio::select! {
            _ = &mut grace => break,
            event = events.recv() => {
                if !print_event(&mut stdout, event, colored)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns false once the event stream has ended
fn print_event(
    stdout: &mut Stdout,
    event: std::result::Result<SessionEvent, RecvError>,
    colored: bool,
) -> Result<bool> {
    match event {
        Ok(SessionEvent::Line(line)) => {
            let text = if colored {
                render::styled_line(&line, "\n")
            } else {
                render::format_line(&line)
            };
            writeln!(stdout, "{}", text)?;
            stdout.flush()?;
        }
        Ok(SessionEvent::ClearScreen) if colored => {
            queue!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
            stdout.flush()?;
        }
        Ok(SessionEvent::ClearScreen) => {}
        Err(RecvError::Lagged(n)) => warn!("Missed {} output events", n),
        Err(RecvError::Closed) => return Ok(false),
    }
    Ok(true)
}
