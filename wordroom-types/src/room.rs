use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::Student;

pub type RoomCode = String;
pub type PlayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,  // Created, players joining
    Playing,  // Rounds in progress
    Finished, // Ended by an admin, terminal
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LetterState {
    Correct,   // Right letter, right position
    Misplaced, // Letter is in the word elsewhere
    Wrong,     // Letter not in the word (or all occurrences used up)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Word {
    pub word: String,
    pub hint: String,
}

impl Word {
    pub fn new(word: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            hint: hint.into(),
        }
    }

    /// Number of letters, counted in chars so umlauts count once.
    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    /// Same hint, word replaced by `?` per letter.
    pub fn masked(&self) -> Self {
        Self {
            word: "?".repeat(self.len()),
            hint: self.hint.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Guess {
    pub text: String,
    pub result: Vec<LetterState>,
    pub timestamp: String, // ISO 8601 string
    pub is_correct: bool,
}

impl Guess {
    /// Letter feedback kept, letters themselves hidden.
    pub fn redacted(&self) -> Self {
        Self {
            text: "?".repeat(self.text.chars().count()),
            ..self.clone()
        }
    }
}

/// What a participant sends about themselves when joining a room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    #[serde(default)]
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<Student> for PlayerProfile {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            name: student.name,
            is_admin: student.is_admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_admin: bool,
    pub connected: bool,
    pub guesses: Vec<Guess>,
    pub last_guess_time: Option<String>,
    pub has_guessed_correctly: bool,
}

impl Player {
    pub fn new(profile: PlayerProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            is_admin: profile.is_admin,
            connected: true,
            guesses: Vec::new(),
            last_guess_time: None,
            has_guessed_correctly: false,
        }
    }

    /// Forget this round's guesses; score lives on the room.
    pub fn reset_round(&mut self) {
        self.guesses.clear();
        self.last_guess_time = None;
        self.has_guessed_correctly = false;
    }

    /// Copy of this player with every guess redacted.
    pub fn redacted(&self) -> Self {
        Self {
            guesses: self.guesses.iter().map(Guess::redacted).collect(),
            ..self.clone()
        }
    }

    pub fn profile(&self) -> PlayerProfile {
        PlayerProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// Room state as shown to participants. The secret is masked while a round is live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub code: RoomCode,
    pub creator_id: PlayerId,
    pub status: RoomStatus,
    pub players: Vec<Player>,
    pub current_round: u32,
    pub total_rounds: Option<u32>, // None means rounds continue until an admin ends the game
    pub current_word: Option<Word>,
    pub scores: HashMap<PlayerId, i32>,
    pub start_time: Option<String>,
    pub round_start_time: Option<String>,
    pub round_end_time: Option<String>,
    pub correct_guessers: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub code: RoomCode,
    pub creator_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: PlayerId,
    pub name: String,
    pub score: i32,
    pub has_guessed_correctly: bool,
}

/// Announced at the start of every round. Never carries the word itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoundInfo {
    pub current_round: u32,
    pub total_rounds: Option<u32>,
    pub word_length: usize,
    pub hint: String,
}
