#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Mutex;
use wordroom_core::{Room, Vocabulary, WordSource};
use wordroom_types::{PlayerProfile, Word};

pub const ADMIN_ID: &str = "24310111046";

/// Hands out a fixed sequence of words, then repeats the last one.
pub struct ScriptedWords {
    words: Mutex<Vec<Word>>,
}

impl ScriptedWords {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        let words = entries
            .iter()
            .rev()
            .map(|(word, hint)| Word::new(*word, *hint))
            .collect();
        Self {
            words: Mutex::new(words),
        }
    }
}

impl WordSource for ScriptedWords {
    fn random_word(&self) -> Word {
        let mut words = self.words.lock().unwrap();
        if words.len() > 1 {
            words.pop().unwrap()
        } else {
            words[0].clone()
        }
    }
}

pub fn single_word(word: &str, hint: &str) -> Vocabulary {
    Vocabulary::from_word_list(&format!("{}|{}", word, hint)).unwrap()
}

pub fn create_test_profile(id: &str, name: &str) -> PlayerProfile {
    PlayerProfile {
        id: id.to_string(),
        name: name.to_string(),
        is_admin: false,
    }
}

pub fn create_test_room(now: DateTime<Utc>) -> Room {
    Room::new_at("QX7K2M", ADMIN_ID, now)
}

/// Room with `count` players joined, not yet started.
pub fn create_room_with_players(count: usize, now: DateTime<Utc>) -> Room {
    let mut room = create_test_room(now);
    for i in 0..count {
        room.add_player_at(create_test_profile(&format!("p{}", i + 1), &format!("Player{}", i + 1)), now);
    }
    room
}

pub fn seconds(secs: i64) -> TimeDelta {
    TimeDelta::seconds(secs)
}
