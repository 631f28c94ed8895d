use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{Guess, LeaderboardEntry, LetterState, PlayerId, PlayerProfile, RoomCode, RoomInfo, RoundInfo};

// Wire format: {"event": "<kebab-case name>", "data": {...}}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom(JoinRoomRequest),
    LeaveRoom(LeaveRoomRequest),
    StartGame(AdminRequest),
    MakeGuess(GuessRequest),
    NextRound(AdminRequest),
    EndGame(AdminRequest),
    ForceEndRound(AdminRequest),
    /// Keep-alive from clients that cannot answer pings; never answered.
    Heartbeat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    #[serde(default)]
    pub room_code: RoomCode,
    #[serde(default)]
    pub player: Option<PlayerProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomRequest {
    #[serde(default)]
    pub room_code: RoomCode,
    #[serde(default)]
    pub player_id: PlayerId,
}

/// Payload of the admin-only actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdminRequest {
    #[serde(default)]
    pub room_code: RoomCode,
    #[serde(default)]
    pub student_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    #[serde(default)]
    pub room_code: RoomCode,
    #[serde(default)]
    pub player_id: PlayerId,
    #[serde(default)]
    pub guess: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    RoomJoined(RoomInfo),
    PlayerJoined {
        player: PlayerProfile,
    },
    PlayerLeft {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "playerName")]
        player_name: String,
    },
    GameStarted {
        #[serde(rename = "gameInfo")]
        game_info: RoundInfo,
    },
    GuessResult {
        guess: String,
        result: Vec<LetterState>,
        #[serde(rename = "isCorrect")]
        is_correct: bool,
        points: i32,
    },
    CorrectGuess {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "playerName")]
        player_name: String,
        points: i32,
    },
    LeaderboardUpdate(Vec<LeaderboardEntry>),
    RevealWord {
        word: String,
    },
    RoundComplete,
    RoundStarted {
        #[serde(rename = "roundInfo")]
        round_info: RoundInfo,
    },
    GameFinished {
        leaderboard: Vec<LeaderboardEntry>,
    },
    RoundTimeout {
        message: String,
    },
    Error {
        message: String,
    },
    RoomLeft {
        success: bool,
    },
}

/// Outcome of one accepted guess, as returned by the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GuessOutcome {
    pub guess: Guess,
    pub points: i32,
    pub should_end_round: bool,
}

impl GuessOutcome {
    pub fn is_correct(&self) -> bool {
        self.guess.is_correct
    }
}
