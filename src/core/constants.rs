//! Game and presentation constants
//!
//! Timings of the announcement overlays, dice shape, and the textual marker
//! the server uses for turn announcements.

use std::time::Duration;

use crate::core::protocol::Dice;

// =============================================================================
// DICE
// =============================================================================

/// Dice per hand
pub const DICE_COUNT: usize = 5;

/// Rolls allowed per turn
pub const MAX_ROLLS: u8 = 2;

/// Seats at a table
pub const SEATS: usize = 2;

/// Dice shown for a seat nobody has taken yet
pub const EMPTY_DICE: Dice = [1; DICE_COUNT];

/// Hand ranks from best to worst, with an example hand for each
pub const HAND_RANKINGS: [(&str, Dice); 7] = [
    ("Cinco iguales", [4, 4, 4, 4, 4]),
    ("Cuatro iguales", [6, 6, 6, 6, 2]),
    ("Full House", [3, 3, 3, 5, 5]),
    ("Trío", [2, 2, 2, 5, 6]),
    ("Doble par", [1, 1, 4, 4, 6]),
    ("Un par", [5, 5, 2, 3, 6]),
    ("Carta alta", [1, 3, 4, 5, 6]),
];

// =============================================================================
// ANNOUNCEMENTS
// =============================================================================

/// Messages starting with this prefix announce a turn change
pub const TURN_MARKER: &str = "Turno de ";

/// How long the generic "rolling" overlay stays up before the result
pub const ROLL_ANIMATION: Duration = Duration::from_millis(1200);

/// How long a roll result stays on screen
pub const ROLL_ANNOUNCEMENT: Duration = Duration::from_millis(2500);

/// How long a turn announcement stays on screen
pub const TURN_ANNOUNCEMENT: Duration = Duration::from_millis(2000);

// =============================================================================
// DEFAULT ENDPOINTS (local development)
// =============================================================================

pub const DEFAULT_SOCKET_URL: &str = "http://localhost:5000";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Shown when the server sends an error event without text
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred.";
