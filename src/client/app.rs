//! Terminal application loop
//!
//! Owns the session and the connection. Stdin is read on its own thread and
//! forwarded through a channel so the loop keeps firing presentation timers
//! while the user is not typing.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use tracing::{debug, info};

use crate::core::io_traits::{Clock, ServerConnection};
use crate::core::session::{GameSession, IntentError, SessionEvent};

use super::terminal::{render_hand_rankings, render_table, Command, HELP};

/// Loop tick while idle
const TICK: Duration = Duration::from_millis(10);

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<S: ServerConnection, C: Clock> {
    session: GameSession,
    server: S,
    clock: C,
    /// Name used when a command does not carry one
    default_name: String,
    /// Message for the bottom line, cleared on the next command
    notice: Option<String>,
}

impl<S: ServerConnection, C: Clock> App<S, C> {
    pub fn new(server: S, clock: C, default_name: String) -> Self {
        Self {
            session: GameSession::new(),
            server,
            clock,
            default_name,
            notice: None,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Process server events and timers; true when the screen needs a redraw
    pub fn tick(&mut self) -> bool {
        let events = self.session.update(&mut self.server, self.clock.now());
        for event in &events {
            if let SessionEvent::ConnectionChanged(status) = event {
                debug!(status = ?status, "[APP] Connection status");
            }
        }
        !events.is_empty()
    }

    /// Run one typed command against the session
    pub fn handle_command(&mut self, command: Command) -> Flow {
        self.notice = None;
        self.session.clear_error();

        let result: Result<(), IntentError> = match command {
            Command::Create { name } => {
                let name = name.unwrap_or_else(|| self.default_name.clone());
                self.session.create_room(&mut self.server, &name)
            }
            Command::Join { code, name } => {
                let name = name.unwrap_or_else(|| self.default_name.clone());
                self.session.join_room(&mut self.server, &code, &name)
            }
            Command::Keep(index) => self.session.toggle_keep(&self.server, index),
            Command::Roll => self.session.roll(&self.server),
            Command::End => self.session.end_turn(&self.server),
            Command::NewGame => self.session.new_game(&self.server),
            Command::Leave => {
                self.session.disconnect(&mut self.server);
                Ok(())
            }
            Command::Info => {
                self.notice = Some(render_hand_rankings());
                Ok(())
            }
            Command::Help => {
                self.notice = Some(HELP.to_string());
                Ok(())
            }
            Command::Quit => {
                self.session.disconnect(&mut self.server);
                return Flow::Quit;
            }
        };

        if let Err(e) = result {
            debug!(error = %e, "[APP] Intent rejected");
            self.notice = Some(e.to_string());
        }
        Flow::Continue
    }

    /// Handle one raw input line
    pub fn handle_line(&mut self, line: &str) -> Flow {
        match line.parse::<Command>() {
            Ok(command) => self.handle_command(command),
            Err(e) => {
                self.notice = Some(e.to_string());
                Flow::Continue
            }
        }
    }

    pub fn render(&self) -> String {
        let mut screen = render_table(&self.session, self.server.status());
        if let Some(notice) = &self.notice {
            screen.push('\n');
            screen.push_str(notice);
        }
        screen
    }

    /// Drive the loop until the user quits or stdin closes
    pub fn run(mut self) -> io::Result<()> {
        let input = spawn_stdin_reader();
        let mut out = io::stdout();
        draw(&mut out, &self.render())?;

        loop {
            let mut dirty = false;
            match input.recv_timeout(TICK) {
                Ok(line) => {
                    if self.handle_line(&line) == Flow::Quit {
                        break;
                    }
                    dirty = true;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("[APP] Input closed");
                    self.session.disconnect(&mut self.server);
                    break;
                }
            }

            dirty |= self.tick();
            if dirty {
                draw(&mut out, &self.render())?;
            }
        }
        Ok(())
    }
}

fn draw(out: &mut impl Write, screen: &str) -> io::Result<()> {
    // Clear and home
    write!(out, "\x1b[2J\x1b[H{}\n> ", screen)?;
    out.flush()
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = bounded::<String>(16);
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}
