//! Announcement items derived from the server's action log

use super::constants::TURN_MARKER;
use super::protocol::{Action, Dice};

/// Presentation flavor of an announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementKind {
    /// Plain message, no dice
    Turn,
    /// Rolling animation followed by the result (with dice when present)
    Roll,
}

impl AnnouncementKind {
    pub fn classify(message: &str) -> Self {
        if message.starts_with(TURN_MARKER) {
            AnnouncementKind::Turn
        } else {
            AnnouncementKind::Roll
        }
    }
}

/// A server action waiting in the presentation queue
#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementItem {
    pub id: i64,
    pub message: String,
    pub kind: AnnouncementKind,
    /// Dice to show with the result; always `None` for turn items
    pub dice: Option<Dice>,
}

impl From<&Action> for AnnouncementItem {
    fn from(action: &Action) -> Self {
        let kind = AnnouncementKind::classify(&action.message);
        let dice = match kind {
            AnnouncementKind::Turn => None,
            AnnouncementKind::Roll => action.dice,
        };
        Self {
            id: action.id,
            message: action.message.clone(),
            kind,
            dice,
        }
    }
}
