//! WebSocket protocol types
//!
//! This module contains the JSON message types exchanged with the game
//! server. Every frame is an object `{"event": <name>, "data": <payload>}`.
//! These types are transport-independent and can be tested without a socket.

use serde::{Deserialize, Serialize};

use super::constants::DICE_COUNT;

// =============================================================================
// DATA TYPES
// =============================================================================

/// Face values of the five dice, each in 1..=6
pub type Dice = [u8; DICE_COUNT];

/// One flag per die (keep mask or reroll mask)
pub type DiceMask = [bool; DICE_COUNT];

/// Hand evaluation computed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub name: String,
    #[serde(default)]
    pub value: f64,
}

/// A seated player as reported in a room snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: String,
    pub name: String,
    pub dice: Dice,
    pub keep: DiceMask,
    /// Rolls used this turn (0..=2)
    #[serde(default)]
    pub rolls: u8,
    #[serde(default)]
    pub evaluation: Option<Evaluation>,
}

/// Round objective granting a bonus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub bonus: i64,
    #[serde(default)]
    pub description: String,
}

/// Entry of the trailing action log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: i64,
    pub message: String,
    /// Only present for roll results
    #[serde(default)]
    pub dice: Option<Dice>,
}

fn default_round() -> u32 {
    1
}

/// Full authoritative room state, replaced wholesale on every update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: String,
    #[serde(default)]
    pub players: Vec<PlayerState>,
    #[serde(default)]
    pub current_player: usize,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub round_winner: Option<String>,
    #[serde(default)]
    pub match_winner: Option<String>,
    #[serde(default = "default_round")]
    pub round: u32,
    #[serde(default)]
    pub scores: Vec<u32>,
    #[serde(default)]
    pub objective: Option<Objective>,
    #[serde(default)]
    pub last_actions: Vec<Action>,
    /// Absent on older servers; reset detection is skipped in that case
    #[serde(default)]
    pub last_action_id: Option<i64>,
}

impl RoomSnapshot {
    pub fn player(&self, index: usize) -> Option<&PlayerState> {
        self.players.get(index)
    }

    /// Player whose turn it is
    pub fn current(&self) -> Option<&PlayerState> {
        self.players.get(self.current_player)
    }

    pub fn score(&self, index: usize) -> u32 {
        self.scores.get(index).copied().unwrap_or(0)
    }
}

// =============================================================================
// CLIENT MESSAGES (client → server)
// =============================================================================

/// Intents sent to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        name: String,
    },
    SetKeep {
        keep: DiceMask,
    },
    #[serde(rename_all = "camelCase")]
    RollDice {
        reroll_dice: DiceMask,
    },
    EndTurn {},
    NewGame {},
}

impl ClientMessage {
    /// Wire event name, for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::CreateRoom { .. } => "create_room",
            ClientMessage::JoinRoom { .. } => "join_room",
            ClientMessage::SetKeep { .. } => "set_keep",
            ClientMessage::RollDice { .. } => "roll_dice",
            ClientMessage::EndTurn {} => "end_turn",
            ClientMessage::NewGame {} => "new_game",
        }
    }
}

// =============================================================================
// SERVER MESSAGES (server → client)
// =============================================================================

/// `state_update` payload: either `{room: ...}` or the snapshot itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateUpdatePayload {
    Wrapped { room: RoomSnapshot },
    Bare(RoomSnapshot),
}

impl StateUpdatePayload {
    pub fn into_snapshot(self) -> RoomSnapshot {
        match self {
            StateUpdatePayload::Wrapped { room } => room,
            StateUpdatePayload::Bare(room) => room,
        }
    }
}

/// Events pushed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    RoomJoined {
        room_id: String,
        player_index: usize,
        room: RoomSnapshot,
    },
    StateUpdate(StateUpdatePayload),
    ErrorMessage {
        #[serde(default)]
        message: String,
    },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT_JSON: &str = r#"{
        "id": "ABCD",
        "players": [
            {"id": "p1", "name": "Ana", "dice": [3,3,3,5,5], "keep": [false,false,false,true,true], "rolls": 1,
             "evaluation": {"name": "Full House", "value": 5}},
            {"id": "p2", "name": "Luis", "dice": [1,1,1,1,1], "keep": [false,false,false,false,false], "rolls": 0,
             "evaluation": null}
        ],
        "currentPlayer": 0,
        "winner": null,
        "roundWinner": null,
        "matchWinner": null,
        "round": 2,
        "scores": [1, 0],
        "objective": {"id": "pairs", "name": "Parejas", "target": "pair", "bonus": 1, "description": "Bonus por pareja"},
        "lastActions": [
            {"id": 6, "message": "Turno de Ana"},
            {"id": 7, "message": "Ana obtuvo Full House", "dice": [3,3,3,5,5]}
        ],
        "lastActionId": 7
    }"#;

    // -------------------------------------------------------------------------
    // Snapshot tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_snapshot_deserialize_full() {
        let room: RoomSnapshot = serde_json::from_str(SNAPSHOT_JSON).unwrap();
        assert_eq!(room.id, "ABCD");
        assert_eq!(room.players.len(), 2);
        assert_eq!(room.players[0].dice, [3, 3, 3, 5, 5]);
        assert_eq!(room.players[0].keep, [false, false, false, true, true]);
        assert_eq!(room.players[0].rolls, 1);
        assert_eq!(
            room.players[0].evaluation.as_ref().map(|e| e.name.as_str()),
            Some("Full House")
        );
        assert!(room.players[1].evaluation.is_none());
        assert_eq!(room.round, 2);
        assert_eq!(room.score(0), 1);
        assert_eq!(room.score(5), 0);
        assert_eq!(room.objective.as_ref().unwrap().name, "Parejas");
        assert_eq!(room.last_action_id, Some(7));
        assert_eq!(room.last_actions[0].dice, None);
        assert_eq!(room.last_actions[1].dice, Some([3, 3, 3, 5, 5]));
        assert_eq!(room.current().unwrap().name, "Ana");
    }

    #[test]
    fn test_snapshot_deserialize_minimal() {
        let room: RoomSnapshot = serde_json::from_str(r#"{"id": "XYZ"}"#).unwrap();
        assert!(room.players.is_empty());
        assert_eq!(room.round, 1); // default
        assert!(room.last_actions.is_empty());
        assert_eq!(room.last_action_id, None);
        assert!(room.current().is_none());
    }

    #[test]
    fn test_player_rejects_wrong_dice_count() {
        let json = r#"{"id": "p1", "name": "Ana", "dice": [1,2,3], "keep": [false,false,false,false,false]}"#;
        assert!(serde_json::from_str::<PlayerState>(json).is_err());
    }

    // -------------------------------------------------------------------------
    // ClientMessage tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_create_room_serialize() {
        let msg = ClientMessage::CreateRoom {
            name: "Ana".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"event":"create_room","data":{"name":"Ana"}}"#);
    }

    #[test]
    fn test_join_room_serialize_camel_case() {
        let msg = ClientMessage::JoinRoom {
            room_id: "ABCD".to_string(),
            name: "Luis".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""event":"join_room""#));
        assert!(json.contains(r#""roomId":"ABCD""#));
        assert!(json.contains(r#""name":"Luis""#));
    }

    #[test]
    fn test_roll_dice_serialize() {
        let msg = ClientMessage::RollDice {
            reroll_dice: [true, false, true, false, false],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""rerollDice":[true,false,true,false,false]"#));
    }

    #[test]
    fn test_set_keep_serialize() {
        let msg = ClientMessage::SetKeep {
            keep: [false, false, false, true, true],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"event":"set_keep","data":{"keep":[false,false,false,true,true]}}"#
        );
    }

    #[test]
    fn test_empty_intents_serialize() {
        let json = serde_json::to_string(&ClientMessage::EndTurn {}).unwrap();
        assert_eq!(json, r#"{"event":"end_turn","data":{}}"#);
        let json = serde_json::to_string(&ClientMessage::NewGame {}).unwrap();
        assert_eq!(json, r#"{"event":"new_game","data":{}}"#);
    }

    #[test]
    fn test_event_names_match_wire() {
        let messages = vec![
            ClientMessage::CreateRoom {
                name: "a".to_string(),
            },
            ClientMessage::JoinRoom {
                room_id: "R".to_string(),
                name: "a".to_string(),
            },
            ClientMessage::SetKeep { keep: [false; 5] },
            ClientMessage::RollDice {
                reroll_dice: [true; 5],
            },
            ClientMessage::EndTurn {},
            ClientMessage::NewGame {},
        ];
        for msg in messages {
            let value = serde_json::to_value(&msg).unwrap();
            assert_eq!(value["event"], msg.event_name());
        }
    }

    // -------------------------------------------------------------------------
    // ServerMessage tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_room_joined_deserialize() {
        let json = format!(
            r#"{{"event": "room_joined", "data": {{"roomId": "ABCD", "playerIndex": 1, "room": {}}}}}"#,
            SNAPSHOT_JSON
        );
        let msg: ServerMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ServerMessage::RoomJoined {
                room_id,
                player_index,
                room,
            } => {
                assert_eq!(room_id, "ABCD");
                assert_eq!(player_index, 1);
                assert_eq!(room.last_action_id, Some(7));
            }
            _ => panic!("Expected RoomJoined"),
        }
    }

    #[test]
    fn test_state_update_wrapped() {
        let json = format!(
            r#"{{"event": "state_update", "data": {{"room": {}}}}}"#,
            SNAPSHOT_JSON
        );
        let msg: ServerMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ServerMessage::StateUpdate(payload) => {
                assert_eq!(payload.into_snapshot().id, "ABCD");
            }
            _ => panic!("Expected StateUpdate"),
        }
    }

    #[test]
    fn test_state_update_bare_snapshot() {
        let json = format!(r#"{{"event": "state_update", "data": {}}}"#, SNAPSHOT_JSON);
        let msg: ServerMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ServerMessage::StateUpdate(payload) => {
                let room = payload.into_snapshot();
                assert_eq!(room.id, "ABCD");
                assert_eq!(room.last_actions.len(), 2);
            }
            _ => panic!("Expected StateUpdate"),
        }
    }

    #[test]
    fn test_error_message_deserialize() {
        let json = r#"{"event": "error_message", "data": {"message": "Sala llena"}}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ServerMessage::ErrorMessage {
                message: "Sala llena".to_string()
            }
        );
    }

    #[test]
    fn test_error_message_without_text() {
        let json = r#"{"event": "error_message", "data": {}}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ServerMessage::ErrorMessage {
                message: String::new()
            }
        );
    }

    #[test]
    fn test_unknown_event_rejected() {
        let json = r#"{"event": "chat", "data": {"text": "hola"}}"#;
        assert!(serde_json::from_str::<ServerMessage>(json).is_err());
    }
}
