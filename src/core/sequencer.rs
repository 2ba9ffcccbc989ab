//! Presentation sequencer - shows queued announcements strictly one at a time
//!
//! ```text
//! roll:  Idle -> RollAnimating (1200ms) -> RollAnnouncing (2500ms) -> Idle
//! turn:  Idle -> TurnAnnouncing (2000ms) -> Idle
//! ```
//!
//! The head of the queue is in flight while the machine is not `Idle`; it is
//! popped only when its last phase completes. Every timer is stamped with the
//! epoch it was armed under, and `reset` bumps the epoch so that timers from a
//! superseded narrative do nothing when they eventually fire.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::announcement::{AnnouncementItem, AnnouncementKind};
use super::constants::{ROLL_ANIMATION, ROLL_ANNOUNCEMENT, TURN_ANNOUNCEMENT};
use super::protocol::Dice;
use super::timer::{TimerRequest, TimerTicket};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationPhase {
    Idle,
    RollAnimating,
    RollAnnouncing,
    TurnAnnouncing,
}

/// What the front-end must currently display
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Generic dice-rolling animation
    Rolling,
    Announcement {
        message: String,
        dice: Option<Dice>,
    },
}

// =============================================================================
// SEQUENCER
// =============================================================================

#[derive(Debug)]
pub struct PresentationSequencer {
    queue: VecDeque<AnnouncementItem>,
    phase: PresentationPhase,
    overlay: Option<Overlay>,
    epoch: u64,
    next_seq: u64,
    /// Only this ticket may advance the machine
    armed: Option<TimerTicket>,
}

impl PresentationSequencer {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            phase: PresentationPhase::Idle,
            overlay: None,
            epoch: 0,
            next_seq: 0,
            armed: None,
        }
    }

    pub fn phase(&self) -> PresentationPhase {
        self.phase
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Item currently on screen
    pub fn in_flight(&self) -> Option<&AnnouncementItem> {
        if self.phase == PresentationPhase::Idle {
            None
        } else {
            self.queue.front()
        }
    }

    /// Items queued, including the one in flight
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == PresentationPhase::Idle
    }

    /// Append items and start presenting if nothing is in flight
    pub fn enqueue<I>(&mut self, items: I) -> Option<TimerRequest>
    where
        I: IntoIterator<Item = AnnouncementItem>,
    {
        self.queue.extend(items);
        self.start_next()
    }

    /// Drop everything and invalidate all outstanding timers
    pub fn reset(&mut self) {
        self.queue.clear();
        self.phase = PresentationPhase::Idle;
        self.overlay = None;
        self.armed = None;
        self.epoch += 1;
        debug!(epoch = self.epoch, "[SEQ] Reset");
    }

    /// Advance the machine for a fired timer; stale tickets are ignored
    pub fn on_timer(&mut self, ticket: TimerTicket) -> Option<TimerRequest> {
        if ticket.epoch != self.epoch {
            trace!(
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "[SEQ] Ignoring timer from previous epoch"
            );
            return None;
        }
        if self.armed != Some(ticket) {
            trace!(seq = ticket.seq, "[SEQ] Ignoring timer that is not armed");
            return None;
        }
        self.armed = None;

        match self.phase {
            PresentationPhase::RollAnimating => {
                let (message, dice) = match self.queue.front() {
                    Some(item) => (item.message.clone(), item.dice),
                    None => return self.finish_current(),
                };
                self.phase = PresentationPhase::RollAnnouncing;
                self.overlay = Some(Overlay::Announcement { message, dice });
                Some(self.arm(ROLL_ANNOUNCEMENT))
            }
            PresentationPhase::RollAnnouncing | PresentationPhase::TurnAnnouncing => {
                self.finish_current()
            }
            PresentationPhase::Idle => None,
        }
    }

    fn finish_current(&mut self) -> Option<TimerRequest> {
        if let Some(done) = self.queue.pop_front() {
            debug!(id = done.id, "[SEQ] Announcement finished");
        }
        self.phase = PresentationPhase::Idle;
        self.overlay = None;
        self.start_next()
    }

    fn start_next(&mut self) -> Option<TimerRequest> {
        if self.phase != PresentationPhase::Idle {
            return None;
        }
        let head = self.queue.front()?;
        debug!(id = head.id, kind = ?head.kind, "[SEQ] Presenting");

        match head.kind {
            AnnouncementKind::Roll => {
                self.phase = PresentationPhase::RollAnimating;
                self.overlay = Some(Overlay::Rolling);
                Some(self.arm(ROLL_ANIMATION))
            }
            AnnouncementKind::Turn => {
                self.phase = PresentationPhase::TurnAnnouncing;
                self.overlay = Some(Overlay::Announcement {
                    message: head.message.clone(),
                    dice: None,
                });
                Some(self.arm(TURN_ANNOUNCEMENT))
            }
        }
    }

    fn arm(&mut self, delay: std::time::Duration) -> TimerRequest {
        self.next_seq += 1;
        let ticket = TimerTicket {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.armed = Some(ticket);
        TimerRequest { ticket, delay }
    }
}

impl Default for PresentationSequencer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
