//! State reconciler - turns snapshots into new announcements exactly once
//!
//! The reconciler keeps a single baseline: the highest action id already
//! consumed. Each snapshot either lowers `lastActionId` below the baseline
//! (a round or match restart) or carries zero or more actions newer than it.

use tracing::debug;

use super::announcement::AnnouncementItem;
use super::protocol::RoomSnapshot;

/// Outcome of reconciling one snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// The action log restarted; everything queued belongs to a dead narrative
    Reset { baseline: i64 },
    /// Actions newer than the previous baseline, ascending by id (may be empty)
    Advanced { items: Vec<AnnouncementItem> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciler {
    baseline: i64,
}

impl Reconciler {
    pub fn new(baseline: i64) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> i64 {
        self.baseline
    }

    /// Start a fresh epoch (room joined): nothing older than `baseline` is replayed
    pub fn rebase(&mut self, baseline: i64) {
        self.baseline = baseline;
    }

    pub fn reconcile(&mut self, snapshot: &RoomSnapshot) -> Reconciliation {
        if let Some(last_action_id) = snapshot.last_action_id {
            if last_action_id < self.baseline {
                debug!(
                    previous = self.baseline,
                    baseline = last_action_id,
                    "[RECONCILE] Action log reset"
                );
                self.baseline = last_action_id;
                return Reconciliation::Reset {
                    baseline: last_action_id,
                };
            }
        }

        let mut fresh: Vec<_> = snapshot
            .last_actions
            .iter()
            .filter(|action| action.id > self.baseline)
            .collect();
        // Sender order is not trusted
        fresh.sort_by_key(|action| action.id);
        fresh.dedup_by_key(|action| action.id);

        if let Some(first) = fresh.first() {
            if first.id > self.baseline + 1 {
                debug!(
                    baseline = self.baseline,
                    first = first.id,
                    "[RECONCILE] Possible gap in action log"
                );
            }
        }
        if let Some(last) = fresh.last() {
            self.baseline = last.id;
        }

        Reconciliation::Advanced {
            items: fresh.into_iter().map(AnnouncementItem::from).collect(),
        }
    }
}
