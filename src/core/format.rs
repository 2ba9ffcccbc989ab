//! Formatting utilities for room data display.

use super::protocol::{Dice, RoomSnapshot};

/// Room codes are free-form but always travel upper-cased
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Format dice as space-separated faces: `3 3 3 5 5`
pub fn format_dice(dice: &Dice) -> String {
    dice.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format the score line: `Ana 1 - 0 Luis`
pub fn format_score(room: &RoomSnapshot) -> String {
    let name = |index: usize, fallback: &str| {
        room.player(index)
            .map(|p| p.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    };
    format!(
        "{} {} - {} {}",
        name(0, "P1"),
        room.score(0),
        room.score(1),
        name(1, "P2")
    )
}

/// Format the objective as `Name (description)`, or `-` when none
pub fn format_objective(room: &RoomSnapshot) -> String {
    match &room.objective {
        Some(objective) if objective.description.is_empty() => objective.name.clone(),
        Some(objective) => format!("{} ({})", objective.name, objective.description),
        None => "-".to_string(),
    }
}
