//! Game session - the single actor tying reconciliation and presentation
//!
//! GameSession consumes server events strictly in arrival order, reconciles
//! each snapshot against its baseline, feeds new announcements to the
//! presentation sequencer, and fires due timers. It also guards outgoing
//! intents with the view model. It is platform-independent and tested with
//! mocks.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::constants::FALLBACK_ERROR_MESSAGE;
use crate::core::format::normalize_room_code;
use crate::core::io_traits::{ConnectionStatus, IntentSender, ServerConnection, ServerEvent};
use crate::core::protocol::{ClientMessage, PlayerState, RoomSnapshot};
use crate::core::reconciler::{Reconciler, Reconciliation};
use crate::core::sequencer::{Overlay, PresentationSequencer};
use crate::core::timer::TimerQueue;
use crate::core::view_model::{reroll_mask, toggled_keep, TurnView};

// =============================================================================
// SESSION EVENTS
// =============================================================================

/// Events emitted by GameSession for UI updates and logging
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Connection status changed
    ConnectionChanged(ConnectionStatus),
    /// Seated in a room; reconciliation started a fresh epoch
    RoomJoined { room_id: String, player_index: usize },
    /// A new snapshot replaced the previous one
    SnapshotApplied,
    /// The action log restarted; queued announcements were dropped
    RoundReset { baseline: i64 },
    /// New announcements were appended to the queue
    AnnouncementsQueued(usize),
    /// The visible overlay changed (`None` = hidden)
    OverlayChanged(Option<Overlay>),
    /// Server error occurred
    ServerError(String),
}

/// Rejected user intent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("Enter your name.")]
    MissingName,
    #[error("Enter your name and the room code.")]
    MissingRoomCode,
    #[error("You are not in a room.")]
    NoRoom,
    #[error("It is not your turn.")]
    NotYourTurn,
    #[error("No rolls left this turn.")]
    NoRollsLeft,
    #[error("The match is over.")]
    MatchOver,
    #[error("There is no die number {0}.")]
    NoSuchDie(usize),
}

// =============================================================================
// ROOM CONTEXT
// =============================================================================

/// Room we are seated in and its latest snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct RoomContext {
    pub room_id: String,
    pub player_index: usize,
    pub snapshot: RoomSnapshot,
}

impl RoomContext {
    pub fn me(&self) -> Option<&PlayerState> {
        self.snapshot.player(self.player_index)
    }

    pub fn view(&self) -> TurnView {
        TurnView::derive(&self.snapshot, self.player_index)
    }
}

// =============================================================================
// GAME SESSION
// =============================================================================

pub struct GameSession {
    room: Option<RoomContext>,
    reconciler: Reconciler,
    sequencer: PresentationSequencer,
    timers: TimerQueue,
    /// Overlay last reported to the front-end
    shown: Option<Overlay>,
    /// Last error to surface to the user
    error: Option<String>,
    /// A create/join request is waiting for the server
    connecting: bool,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            room: None,
            reconciler: Reconciler::default(),
            sequencer: PresentationSequencer::new(),
            timers: TimerQueue::new(),
            shown: None,
            error: None,
            connecting: false,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn room(&self) -> Option<&RoomContext> {
        self.room.as_ref()
    }

    pub fn snapshot(&self) -> Option<&RoomSnapshot> {
        self.room.as_ref().map(|r| &r.snapshot)
    }

    pub fn view(&self) -> Option<TurnView> {
        self.room.as_ref().map(RoomContext::view)
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.sequencer.overlay()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    pub fn baseline(&self) -> i64 {
        self.reconciler.baseline()
    }

    /// Announcements waiting or on screen
    pub fn queued(&self) -> usize {
        self.sequencer.queued()
    }

    pub fn epoch(&self) -> u64 {
        self.sequencer.epoch()
    }

    /// When the next timer fires, for the driver's sleep
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // -------------------------------------------------------------------------
    // Event processing
    // -------------------------------------------------------------------------

    /// Process every pending server event, then fire the timers due at `now`
    ///
    /// Returns the events that occurred, in order, for the front-end.
    pub fn update<S: ServerConnection>(
        &mut self,
        server: &mut S,
        now: Instant,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        while let Some(event) = server.poll_event() {
            self.handle_server_event(event, now, &mut events);
        }

        self.fire_due_timers(now, &mut events);
        events
    }

    fn handle_server_event(
        &mut self,
        event: ServerEvent,
        now: Instant,
        events: &mut Vec<SessionEvent>,
    ) {
        match event {
            ServerEvent::StatusChanged(status) => {
                if matches!(
                    status,
                    ConnectionStatus::Disconnected | ConnectionStatus::Error
                ) {
                    self.connecting = false;
                }
                events.push(SessionEvent::ConnectionChanged(status));
            }
            ServerEvent::RoomJoined {
                room_id,
                player_index,
                room,
            } => {
                let baseline = room.last_action_id.unwrap_or(0);
                info!(
                    room = %room_id,
                    player_index,
                    baseline,
                    "[SESSION] Joined room"
                );
                // Joining is always a fresh epoch, never a continuation
                self.reconciler.rebase(baseline);
                self.sequencer.reset();
                self.room = Some(RoomContext {
                    room_id: room_id.clone(),
                    player_index,
                    snapshot: room,
                });
                self.error = None;
                self.connecting = false;
                events.push(SessionEvent::RoomJoined {
                    room_id,
                    player_index,
                });
                self.note_overlay(events);
            }
            ServerEvent::StateUpdate(snapshot) => {
                let Some(room) = self.room.as_mut() else {
                    warn!(room = %snapshot.id, "[SESSION] State update outside a room, ignoring");
                    return;
                };

                let outcome = self.reconciler.reconcile(&snapshot);
                room.snapshot = snapshot;
                events.push(SessionEvent::SnapshotApplied);

                match outcome {
                    Reconciliation::Reset { baseline } => {
                        info!(baseline, "[SESSION] Round restarted, dropping announcements");
                        self.sequencer.reset();
                        events.push(SessionEvent::RoundReset { baseline });
                    }
                    Reconciliation::Advanced { items } if !items.is_empty() => {
                        let count = items.len();
                        debug!(
                            count,
                            baseline = self.reconciler.baseline(),
                            "[SESSION] New actions"
                        );
                        if let Some(request) = self.sequencer.enqueue(items) {
                            self.timers.schedule(now, request);
                        }
                        events.push(SessionEvent::AnnouncementsQueued(count));
                    }
                    Reconciliation::Advanced { .. } => {}
                }
                self.note_overlay(events);
            }
            ServerEvent::Error(message) => {
                let message = if message.trim().is_empty() {
                    FALLBACK_ERROR_MESSAGE.to_string()
                } else {
                    message
                };
                warn!(message = %message, "[SESSION] Server error");
                self.error = Some(message.clone());
                self.connecting = false;
                events.push(SessionEvent::ServerError(message));
            }
        }
    }

    fn fire_due_timers(&mut self, now: Instant, events: &mut Vec<SessionEvent>) {
        // A fired timer may arm the next phase, which can itself be due already
        loop {
            let due = self.timers.pop_due(now);
            if due.is_empty() {
                break;
            }
            for (deadline, ticket) in due {
                if let Some(request) = self.sequencer.on_timer(ticket) {
                    self.timers.schedule(deadline, request);
                }
                self.note_overlay(events);
            }
        }
    }

    fn note_overlay(&mut self, events: &mut Vec<SessionEvent>) {
        let current = self.sequencer.overlay();
        if current != self.shown.as_ref() {
            self.shown = current.cloned();
            events.push(SessionEvent::OverlayChanged(self.shown.clone()));
        }
    }

    // -------------------------------------------------------------------------
    // Intents
    // -------------------------------------------------------------------------

    pub fn create_room<S: IntentSender>(
        &mut self,
        server: &mut S,
        name: &str,
    ) -> Result<(), IntentError> {
        let name = name.trim();
        if name.is_empty() {
            return self.reject(IntentError::MissingName);
        }
        self.begin_connecting(server);
        server.send(ClientMessage::CreateRoom {
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn join_room<S: IntentSender>(
        &mut self,
        server: &mut S,
        room_code: &str,
        name: &str,
    ) -> Result<(), IntentError> {
        let name = name.trim();
        let room_id = normalize_room_code(room_code);
        if name.is_empty() || room_id.is_empty() {
            return self.reject(IntentError::MissingRoomCode);
        }
        self.begin_connecting(server);
        server.send(ClientMessage::JoinRoom {
            room_id,
            name: name.to_string(),
        });
        Ok(())
    }

    /// Ask the server to flip die `index`; local dice stay untouched until the next snapshot
    pub fn toggle_keep<S: IntentSender>(
        &self,
        server: &S,
        index: usize,
    ) -> Result<(), IntentError> {
        let room = self.room.as_ref().ok_or(IntentError::NoRoom)?;
        if !room.view().can_toggle_keep {
            return Err(IntentError::NotYourTurn);
        }
        let me = room.me().ok_or(IntentError::NotYourTurn)?;
        let keep = toggled_keep(me, index).ok_or(IntentError::NoSuchDie(index))?;
        server.send(ClientMessage::SetKeep { keep });
        Ok(())
    }

    pub fn roll<S: IntentSender>(&self, server: &S) -> Result<(), IntentError> {
        let room = self.room.as_ref().ok_or(IntentError::NoRoom)?;
        let view = room.view();
        if !view.can_roll {
            return Err(if !view.is_my_turn || room.me().is_none() {
                IntentError::NotYourTurn
            } else if room.snapshot.match_winner.is_some() {
                IntentError::MatchOver
            } else {
                IntentError::NoRollsLeft
            });
        }
        let me = room.me().ok_or(IntentError::NotYourTurn)?;
        server.send(ClientMessage::RollDice {
            reroll_dice: reroll_mask(me),
        });
        Ok(())
    }

    pub fn end_turn<S: IntentSender>(&self, server: &S) -> Result<(), IntentError> {
        let room = self.room.as_ref().ok_or(IntentError::NoRoom)?;
        let view = room.view();
        if !view.can_end_turn {
            return Err(if view.is_my_turn {
                IntentError::MatchOver
            } else {
                IntentError::NotYourTurn
            });
        }
        server.send(ClientMessage::EndTurn {});
        Ok(())
    }

    pub fn new_game<S: IntentSender>(&self, server: &S) -> Result<(), IntentError> {
        if self.room.is_none() {
            return Err(IntentError::NoRoom);
        }
        server.send(ClientMessage::NewGame {});
        Ok(())
    }

    /// Release the channel and tear down room, baseline, and queue
    pub fn disconnect<S: IntentSender>(&mut self, server: &mut S) {
        server.disconnect();
        self.room = None;
        self.reconciler = Reconciler::default();
        self.sequencer.reset();
        self.timers.clear();
        self.shown = None;
        self.connecting = false;
        info!("[SESSION] Disconnected, room state dropped");
    }

    fn begin_connecting<S: IntentSender>(&mut self, server: &mut S) {
        self.connecting = true;
        if !server.is_connected() && server.status() != ConnectionStatus::Connecting {
            server.connect();
        }
    }

    fn reject(&mut self, error: IntentError) -> Result<(), IntentError> {
        self.error = Some(error.to_string());
        Err(error)
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
