//! Cooperative timers for the presentation sequencer
//!
//! Timers are never cancelled. Each one carries the ticket it was armed with
//! and the sequencer decides, when it fires, whether it still applies.

use std::time::{Duration, Instant};

/// Identity of an armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket {
    /// Presentation epoch at scheduling time
    pub epoch: u64,
    /// Per-sequencer counter, distinguishes timers within one epoch
    pub seq: u64,
}

/// Ask the driver to fire `ticket` after `delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub ticket: TimerTicket,
    pub delay: Duration,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<(Instant, TimerTicket)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `request` relative to `from`
    pub fn schedule(&mut self, from: Instant, request: TimerRequest) {
        self.pending.push((from + request.delay, request.ticket));
    }

    /// Remove and return every timer due at `now` with its deadline, earliest first
    pub fn pop_due(&mut self, now: Instant) -> Vec<(Instant, TimerTicket)> {
        let mut due: Vec<(Instant, TimerTicket)> = Vec::new();
        self.pending.retain(|&(deadline, ticket)| {
            if deadline <= now {
                due.push((deadline, ticket));
                false
            } else {
                true
            }
        });
        // Stable: equal deadlines keep scheduling order
        due.sort_by_key(|&(deadline, _)| deadline);
        due
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|&(deadline, _)| deadline).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(seq: u64, ms: u64) -> TimerRequest {
        TimerRequest {
            ticket: TimerTicket { epoch: 0, seq },
            delay: Duration::from_millis(ms),
        }
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(start, request(1, 1200));

        assert!(timers.pop_due(start + Duration::from_millis(1199)).is_empty());
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_due_timers_in_deadline_order() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(start, request(1, 2500));
        timers.schedule(start, request(2, 1200));
        timers.schedule(start, request(3, 5000));

        let due = timers.pop_due(start + Duration::from_millis(3000));
        assert_eq!(due.iter().map(|(_, t)| t.seq).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(due[0].0, start + Duration::from_millis(1200));
        assert_eq!(timers.len(), 1);
        assert_eq!(
            timers.next_deadline(),
            Some(start + Duration::from_millis(5000))
        );
    }

    #[test]
    fn test_clear_drops_everything() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(start, request(1, 10));
        timers.clear();
        assert!(timers.is_empty());
        assert!(timers.next_deadline().is_none());
    }
}
