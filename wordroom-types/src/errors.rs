use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Coarse error categories. Every `RoomError` belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    StateConflict,
    LengthMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum RoomError {
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
    #[error("Room {code} not found")]
    RoomNotFound { code: String },
    #[error("Player {player_id} not found")]
    PlayerNotFound { player_id: String },
    #[error("Student {student_id} not found")]
    StudentNotFound { student_id: String },
    #[error("Only admins can {action}")]
    Forbidden { action: String },
    #[error("Game is not active")]
    RoomNotPlaying,
    #[error("Game has already started")]
    GameAlreadyStarted,
    #[error("You already guessed correctly this round")]
    AlreadyGuessedCorrectly,
    #[error("Round time is up")]
    RoundExpired,
    #[error("Round is already over")]
    RoundAlreadyClosed,
    #[error("You have not joined room {room_code} as {player_id}")]
    NotJoined { room_code: String, player_id: String },
    #[error("Guess must be {expected} letters long, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl RoomError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoomError::InvalidRequest { .. } => ErrorKind::Validation,
            RoomError::RoomNotFound { .. }
            | RoomError::PlayerNotFound { .. }
            | RoomError::StudentNotFound { .. } => ErrorKind::NotFound,
            RoomError::Forbidden { .. } | RoomError::NotJoined { .. } => ErrorKind::Forbidden,
            RoomError::RoomNotPlaying
            | RoomError::GameAlreadyStarted
            | RoomError::AlreadyGuessedCorrectly
            | RoomError::RoundExpired
            | RoomError::RoundAlreadyClosed => ErrorKind::StateConflict,
            RoomError::LengthMismatch { .. } => ErrorKind::LengthMismatch,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        RoomError::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn room_not_found(code: &str) -> Self {
        RoomError::RoomNotFound {
            code: code.to_string(),
        }
    }
}
