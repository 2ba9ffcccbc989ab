//! Turn/action view model
//!
//! Pure derivation of what the local player may do from the latest snapshot.
//! Nothing here mutates state; toggling a die only computes the mask to send.

use super::constants::{DICE_COUNT, MAX_ROLLS};
use super::protocol::{DiceMask, PlayerState, RoomSnapshot};

/// Status line shown under the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnHint {
    MatchOver { winner: String },
    RollToStart,
    RerollOrEnd,
    EndOnly,
    OpponentsTurn,
}

impl std::fmt::Display for TurnHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnHint::MatchOver { winner } => write!(f, "Match finished: {}", winner),
            TurnHint::RollToStart => write!(f, "Your turn: roll the dice to start."),
            TurnHint::RerollOrEnd => write!(
                f,
                "End your turn or select the dice you want to roll again."
            ),
            TurnHint::EndOnly => write!(f, "You can end your turn."),
            TurnHint::OpponentsTurn => write!(f, "Opponent's turn. Wait for your move."),
        }
    }
}

/// Affordances for the local player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnView {
    pub is_my_turn: bool,
    pub can_roll: bool,
    pub can_toggle_keep: bool,
    pub can_end_turn: bool,
    pub roll_label: &'static str,
    pub hint: TurnHint,
}

impl TurnView {
    pub fn derive(snapshot: &RoomSnapshot, local_index: usize) -> Self {
        let is_my_turn = snapshot.current_player == local_index;
        let me = snapshot.player(local_index);
        let rolls = me.map(|p| p.rolls).unwrap_or(0);
        let match_over = snapshot.match_winner.is_some();

        let can_roll = is_my_turn && me.is_some() && rolls < MAX_ROLLS && !match_over;
        let can_toggle_keep = is_my_turn && me.is_some();
        let can_end_turn = is_my_turn && !match_over;

        let roll_label = if rolls == 0 { "Roll dice" } else { "Roll again" };

        let hint = if let Some(winner) = &snapshot.match_winner {
            TurnHint::MatchOver {
                winner: winner.clone(),
            }
        } else if !is_my_turn {
            TurnHint::OpponentsTurn
        } else if rolls == 0 {
            TurnHint::RollToStart
        } else if rolls < MAX_ROLLS {
            TurnHint::RerollOrEnd
        } else {
            TurnHint::EndOnly
        };

        Self {
            is_my_turn,
            can_roll,
            can_toggle_keep,
            can_end_turn,
            roll_label,
            hint,
        }
    }
}

/// Dice to reroll: everything on the first roll, the selected dice afterwards
pub fn reroll_mask(player: &PlayerState) -> DiceMask {
    if player.rolls == 0 {
        [true; DICE_COUNT]
    } else {
        player.keep
    }
}

/// Mask to send after toggling die `index`; `None` for an out-of-range index
pub fn toggled_keep(player: &PlayerState, index: usize) -> Option<DiceMask> {
    if index >= DICE_COUNT {
        return None;
    }
    let mut keep = player.keep;
    keep[index] = !keep[index];
    Some(keep)
}

/// Name of the player whose turn it is, if seated
pub fn turn_player_name(snapshot: &RoomSnapshot) -> Option<&str> {
    snapshot.current().map(|p| p.name.as_str())
}
