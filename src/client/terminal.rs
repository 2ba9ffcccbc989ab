//! Text front-end: command parsing and table rendering
//!
//! Rendering is pure (`&GameSession` in, `String` out) so it can be tested
//! without a terminal.

use std::borrow::Cow;

use crate::core::constants::{DICE_COUNT, EMPTY_DICE, HAND_RANKINGS, MAX_ROLLS, SEATS};
use crate::core::format::{format_dice, format_objective, format_score};
use crate::core::io_traits::ConnectionStatus;
use crate::core::protocol::PlayerState;
use crate::core::sequencer::Overlay;
use crate::core::session::GameSession;
use crate::core::view_model::turn_player_name;

// =============================================================================
// COMMANDS
// =============================================================================

/// A line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { name: Option<String> },
    Join { code: String, name: Option<String> },
    /// Toggle keep on a die, 0-based
    Keep(usize),
    Roll,
    End,
    NewGame,
    Leave,
    /// Show the hand rankings
    Info,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    BadDie(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "Type a command (help for the list)."),
            ParseError::Unknown(cmd) => write!(f, "Unknown command '{}'. Type help.", cmd),
            ParseError::MissingArgument(what) => write!(f, "Missing {}.", what),
            ParseError::BadDie(arg) => write!(f, "'{}' is not a die number (1-5).", arg),
        }
    }
}

/// Join the remaining words, `None` when there are none
fn rest(words: &[&str]) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

impl std::str::FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((head, args)) = words.split_first() else {
            return Err(ParseError::Empty);
        };

        match head.to_ascii_lowercase().as_str() {
            "create" | "c" => Ok(Command::Create { name: rest(args) }),
            "join" | "j" => {
                let (code, name) = args
                    .split_first()
                    .ok_or(ParseError::MissingArgument("room code"))?;
                Ok(Command::Join {
                    code: code.to_string(),
                    name: rest(name),
                })
            }
            "keep" | "k" => {
                let arg = args.first().ok_or(ParseError::MissingArgument("die number"))?;
                match arg.parse::<usize>() {
                    // Users count dice from 1
                    Ok(n) if n >= 1 => Ok(Command::Keep(n - 1)),
                    _ => Err(ParseError::BadDie(arg.to_string())),
                }
            }
            "roll" | "r" => Ok(Command::Roll),
            "end" | "e" => Ok(Command::End),
            "new" | "n" => Ok(Command::NewGame),
            "leave" => Ok(Command::Leave),
            "info" | "i" => Ok(Command::Info),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

pub const HELP: &str = "\
commands:
  create [name]       create a room
  join <code> [name]  join a room
  roll                roll (first roll rerolls everything)
  keep <1-5>          toggle a die for the next reroll
  end                 end your turn
  new                 start a new match
  leave               disconnect from the room
  info                show the hand rankings
  quit                exit";

// =============================================================================
// RENDERING
// =============================================================================

pub fn render_status(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Disconnected => "offline",
        ConnectionStatus::Connecting => "connecting",
        ConnectionStatus::Connected => "online",
        ConnectionStatus::Error => "error",
    }
}

/// Hand hierarchy, best first, with an example for each rank
pub fn render_hand_rankings() -> String {
    let mut lines = vec!["Hand rankings (best first):".to_string()];
    for (rank, (name, example)) in HAND_RANKINGS.iter().enumerate() {
        lines.push(format!("  {}. {:<15} {}", rank + 1, name, format_dice(example)));
    }
    lines.join("\n")
}

/// Stand-in for a seat the opponent has not taken yet
fn empty_seat(index: usize) -> PlayerState {
    PlayerState {
        id: String::new(),
        name: format!("Jugador {}", index + 1),
        dice: EMPTY_DICE,
        keep: [false; DICE_COUNT],
        rolls: 0,
        evaluation: None,
    }
}

/// Overlay line shown above the table
pub fn render_overlay(overlay: &Overlay) -> String {
    match overlay {
        Overlay::Rolling => ">> Rolling the dice...".to_string(),
        Overlay::Announcement {
            message,
            dice: Some(dice),
        } => format!(">> {}  [{}]", message, format_dice(dice)),
        Overlay::Announcement { message, dice: None } => format!(">> {}", message),
    }
}

/// Full screen: room header, both seats, affordances, error line
pub fn render_table(session: &GameSession, status: ConnectionStatus) -> String {
    let mut lines = Vec::new();

    let Some(room) = session.room() else {
        lines.push(format!("Dice Poker ({})", render_status(status)));
        if session.is_connecting() {
            lines.push("Connecting...".to_string());
        } else {
            lines.push("Create a room or join one with its code.".to_string());
        }
        if let Some(error) = session.error() {
            lines.push(format!("! {}", error));
        }
        return lines.join("\n");
    };

    let snapshot = &room.snapshot;
    lines.push(format!(
        "Room {}  |  Round {}  |  {}  ({})",
        room.room_id,
        snapshot.round,
        format_score(snapshot),
        render_status(status)
    ));
    lines.push(format!("Objective: {}", format_objective(snapshot)));

    if let Some(overlay) = session.overlay() {
        lines.push(render_overlay(overlay));
    }

    for index in 0..SEATS.max(snapshot.players.len()) {
        let player = match snapshot.players.get(index) {
            Some(player) => Cow::Borrowed(player),
            None => Cow::Owned(empty_seat(index)),
        };
        let marker = if index == snapshot.current_player { '*' } else { ' ' };
        let you = if index == room.player_index { " (you)" } else { "" };
        let kept = player
            .keep
            .iter()
            .map(|&k| if k { "^" } else { "." })
            .collect::<Vec<_>>()
            .join(" ");
        let evaluation = player
            .evaluation
            .as_ref()
            .map(|e| e.name.as_str())
            .unwrap_or("-");
        lines.push(format!(
            "{} {}{}: {}  [{}]  rolls {}/{}",
            marker,
            player.name,
            you,
            format_dice(&player.dice),
            evaluation,
            player.rolls,
            MAX_ROLLS
        ));
        lines.push(format!(
            "  {}{}",
            " ".repeat(player.name.chars().count() + you.len() + 2),
            kept
        ));
    }

    if let Some(name) = snapshot.round_winner.as_deref() {
        lines.push(format!("Round winner: {}", name));
    }

    let view = room.view();
    if let Some(name) = turn_player_name(snapshot) {
        lines.push(format!("Turn: {}", name));
    }
    lines.push(view.hint.to_string());
    if view.can_roll {
        lines.push(format!("[roll] {}", view.roll_label));
    }

    if let Some(error) = session.error() {
        lines.push(format!("! {}", error));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io_traits::mocks::{MockClock, MockServerConnection};
    use crate::core::io_traits::Clock;
    use crate::core::protocol::RoomSnapshot;

    const ROOM_JSON: &str = r#"{
        "id": "ABCD",
        "players": [
            {"id": "p1", "name": "Ana", "dice": [3,3,3,5,5], "keep": [false,false,false,true,true], "rolls": 1,
             "evaluation": {"name": "Full House", "value": 5}},
            {"id": "p2", "name": "Luis", "dice": [1,2,3,4,6], "keep": [false,false,false,false,false], "rolls": 0}
        ],
        "currentPlayer": 0,
        "round": 2,
        "scores": [1, 0],
        "lastActionId": 4
    }"#;

    fn seated_session() -> GameSession {
        let mut server = MockServerConnection::new();
        let clock = MockClock::new();
        let room: RoomSnapshot = serde_json::from_str(ROOM_JSON).unwrap();
        let mut session = GameSession::new();
        server.queue_joined("ABCD", 0, room);
        session.update(&mut server, clock.now());
        session
    }

    // -------------------------------------------------------------------------
    // Parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("roll".parse::<Command>(), Ok(Command::Roll));
        assert_eq!(" R ".parse::<Command>(), Ok(Command::Roll));
        assert_eq!("end".parse::<Command>(), Ok(Command::End));
        assert_eq!("new".parse::<Command>(), Ok(Command::NewGame));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
        assert_eq!("info".parse::<Command>(), Ok(Command::Info));
        assert_eq!("I".parse::<Command>(), Ok(Command::Info));
    }

    #[test]
    fn test_parse_keep_is_one_based() {
        assert_eq!("keep 1".parse::<Command>(), Ok(Command::Keep(0)));
        assert_eq!("k 5".parse::<Command>(), Ok(Command::Keep(4)));
        assert_eq!(
            "keep 0".parse::<Command>(),
            Err(ParseError::BadDie("0".to_string()))
        );
        assert_eq!(
            "keep".parse::<Command>(),
            Err(ParseError::MissingArgument("die number"))
        );
    }

    #[test]
    fn test_parse_join_with_name() {
        assert_eq!(
            "join abcd Ana Maria".parse::<Command>(),
            Ok(Command::Join {
                code: "abcd".to_string(),
                name: Some("Ana Maria".to_string())
            })
        );
        assert_eq!(
            "join".parse::<Command>(),
            Err(ParseError::MissingArgument("room code"))
        );
    }

    #[test]
    fn test_parse_create_optional_name() {
        assert_eq!("create".parse::<Command>(), Ok(Command::Create { name: None }));
        assert_eq!(
            "create Luis".parse::<Command>(),
            Ok(Command::Create {
                name: Some("Luis".to_string())
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(ParseError::Empty));
        assert_eq!(
            "dance".parse::<Command>(),
            Err(ParseError::Unknown("dance".to_string()))
        );
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    #[test]
    fn test_render_overlay_variants() {
        assert_eq!(render_overlay(&Overlay::Rolling), ">> Rolling the dice...");
        assert_eq!(
            render_overlay(&Overlay::Announcement {
                message: "Turno de Ana".to_string(),
                dice: None
            }),
            ">> Turno de Ana"
        );
        assert_eq!(
            render_overlay(&Overlay::Announcement {
                message: "Ana obtuvo Trío".to_string(),
                dice: Some([2, 2, 2, 5, 6])
            }),
            ">> Ana obtuvo Trío  [2 2 2 5 6]"
        );
    }

    #[test]
    fn test_render_lobby() {
        let session = GameSession::new();
        let screen = render_table(&session, ConnectionStatus::Disconnected);
        assert!(screen.starts_with("Dice Poker (offline)"));
        assert!(screen.contains("Create a room"));
    }

    #[test]
    fn test_render_seated_table() {
        let session = seated_session();
        let screen = render_table(&session, ConnectionStatus::Connected);

        assert!(screen.contains("Room ABCD  |  Round 2  |  Ana 1 - 0 Luis  (online)"));
        assert!(screen.contains("Objective: -"));
        assert!(screen.contains("* Ana (you): 3 3 3 5 5  [Full House]  rolls 1/2"));
        assert!(screen.contains("  Luis: 1 2 3 4 6  [-]  rolls 0/2"));
        assert!(screen.contains(". . . ^ ^"));
        assert!(screen.contains("Turn: Ana"));
        assert!(screen.contains("[roll] Roll again"));
    }

    #[test]
    fn test_render_missing_opponent_as_placeholder() {
        let mut server = MockServerConnection::new();
        let clock = MockClock::new();
        let room: RoomSnapshot = serde_json::from_str(
            r#"{
                "id": "WXYZ",
                "players": [
                    {"id": "p1", "name": "Ana", "dice": [2,4,6,1,3], "keep": [false,false,false,false,false]}
                ],
                "currentPlayer": 0
            }"#,
        )
        .unwrap();
        let mut session = GameSession::new();
        server.queue_joined("WXYZ", 0, room);
        session.update(&mut server, clock.now());

        let screen = render_table(&session, ConnectionStatus::Connected);
        assert!(screen.contains("* Ana (you): 2 4 6 1 3  [-]  rolls 0/2"));
        assert!(screen.contains("  Jugador 2: 1 1 1 1 1  [-]  rolls 0/2"));
    }

    #[test]
    fn test_render_hand_rankings() {
        let text = render_hand_rankings();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 8);
        assert_eq!(lines[1], "  1. Cinco iguales   4 4 4 4 4");
        assert!(lines[3].contains("3. Full House") && lines[3].ends_with("3 3 3 5 5"));
        assert!(lines[7].contains("7. Carta alta") && lines[7].ends_with("1 3 4 5 6"));
    }
}
