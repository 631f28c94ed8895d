use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use tracing::{debug, info};
use wordroom_types::{
    Guess, GuessOutcome, LeaderboardEntry, Player, PlayerId, PlayerProfile, RoomCode, RoomError,
    RoomInfo, RoomStatus, RoundInfo, Word,
};

use crate::{GuessEvaluator, ScoringEngine, WordSource};

pub const DEFAULT_ROUND_DURATION_SECONDS: i64 = 120;

/// One game session.
///
/// `Waiting` rooms have no word and round 0. `Playing` rooms always have a
/// word and a round window. `Finished` is terminal. Players are never
/// removed, only marked disconnected, so scores survive a rejoin.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    creator_id: PlayerId,
    status: RoomStatus,
    players: Vec<Player>,
    current_round: u32,
    total_rounds: Option<u32>,
    current_word: Option<Word>,
    scores: HashMap<PlayerId, i32>,
    start_time: Option<DateTime<Utc>>,
    round_start_time: Option<DateTime<Utc>>,
    round_end_time: Option<DateTime<Utc>>,
    correct_guessers: Vec<PlayerId>,
    round_closed: bool,
    round_duration: TimeDelta,
    last_activity: DateTime<Utc>,
}

impl Room {
    pub fn new(code: impl Into<RoomCode>, creator_id: impl Into<PlayerId>) -> Self {
        Self::new_at(code, creator_id, Utc::now())
    }

    pub fn new_at(
        code: impl Into<RoomCode>,
        creator_id: impl Into<PlayerId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            code: code.into(),
            creator_id: creator_id.into(),
            status: RoomStatus::Waiting,
            players: Vec::new(),
            current_round: 0,
            total_rounds: None,
            current_word: None,
            scores: HashMap::new(),
            start_time: None,
            round_start_time: None,
            round_end_time: None,
            correct_guessers: Vec::new(),
            round_closed: false,
            round_duration: TimeDelta::seconds(DEFAULT_ROUND_DURATION_SECONDS),
            last_activity: now,
        }
    }

    pub fn with_round_duration(mut self, round_duration: TimeDelta) -> Self {
        self.round_duration = round_duration;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn creator_id(&self) -> &str {
        &self.creator_id
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn score(&self, player_id: &str) -> Option<i32> {
        self.scores.get(player_id).copied()
    }

    pub fn correct_guessers(&self) -> &[PlayerId] {
        &self.correct_guessers
    }

    pub fn round_end_time(&self) -> Option<DateTime<Utc>> {
        self.round_end_time
    }

    pub fn round_duration(&self) -> TimeDelta {
        self.round_duration
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.connected).count()
    }

    /// The secret for the current round, for revealing once the round is over.
    pub fn reveal_word(&self) -> Option<&str> {
        self.current_word.as_ref().map(|w| w.word.as_str())
    }

    /// Join, or rejoin with the same id. Returns true on a rejoin.
    pub fn add_player(&mut self, profile: PlayerProfile) -> bool {
        self.add_player_at(profile, Utc::now())
    }

    pub fn add_player_at(&mut self, profile: PlayerProfile, now: DateTime<Utc>) -> bool {
        self.last_activity = now;

        if let Some(existing) = self.players.iter_mut().find(|p| p.id == profile.id) {
            if !profile.name.is_empty() {
                existing.name = profile.name;
            }
            existing.is_admin = profile.is_admin;
            existing.connected = true;

            // A rejoin within the same round keeps its solved state
            if existing.has_guessed_correctly && !self.correct_guessers.contains(&existing.id) {
                self.correct_guessers.push(existing.id.clone());
            }

            debug!("Player {} rejoined room {}", existing.id, self.code);
            return true;
        }

        self.scores.insert(profile.id.clone(), 0);
        debug!("Player {} joined room {}", profile.id, self.code);
        self.players.push(Player::new(profile));
        false
    }

    /// Mark a player disconnected. History and score are kept.
    pub fn remove_player(&mut self, player_id: &str) -> Option<&Player> {
        self.remove_player_at(player_id, Utc::now())
    }

    pub fn remove_player_at(&mut self, player_id: &str, now: DateTime<Utc>) -> Option<&Player> {
        self.last_activity = now;

        let index = self.players.iter().position(|p| p.id == player_id)?;
        self.players[index].connected = false;
        self.correct_guessers.retain(|id| id != player_id);

        debug!("Player {} left room {}", player_id, self.code);
        Some(&self.players[index])
    }

    pub fn start(&mut self, words: &dyn WordSource) -> Result<RoundInfo, RoomError> {
        self.start_at(words, Utc::now())
    }

    pub fn start_at(
        &mut self,
        words: &dyn WordSource,
        now: DateTime<Utc>,
    ) -> Result<RoundInfo, RoomError> {
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }

        self.status = RoomStatus::Playing;
        self.current_round = 1;
        self.start_time = Some(now);
        let round_info = self.begin_round(words, now);

        info!(
            "Room {} started with {} players",
            self.code,
            self.players.len()
        );
        Ok(round_info)
    }

    pub fn advance_round(&mut self, words: &dyn WordSource) -> Result<RoundInfo, RoomError> {
        self.advance_round_at(words, Utc::now())
    }

    /// Move to the next round. Rounds are unbounded; only an admin ends the game.
    pub fn advance_round_at(
        &mut self,
        words: &dyn WordSource,
        now: DateTime<Utc>,
    ) -> Result<RoundInfo, RoomError> {
        if self.status != RoomStatus::Playing {
            return Err(RoomError::RoomNotPlaying);
        }

        self.current_round += 1;
        let round_info = self.begin_round(words, now);

        info!("Room {} advanced to round {}", self.code, self.current_round);
        Ok(round_info)
    }

    fn begin_round(&mut self, words: &dyn WordSource, now: DateTime<Utc>) -> RoundInfo {
        let word = words.random_word();
        let round_info = RoundInfo {
            current_round: self.current_round,
            total_rounds: self.total_rounds,
            word_length: word.len(),
            hint: word.hint.clone(),
        };

        self.current_word = Some(word);
        self.round_start_time = Some(now);
        self.round_end_time = Some(now + self.round_duration);
        self.correct_guessers.clear();
        self.round_closed = false;
        self.last_activity = now;

        for player in &mut self.players {
            player.reset_round();
        }

        round_info
    }

    /// Round number, word length and hint of the live round.
    pub fn round_info(&self) -> Option<RoundInfo> {
        self.current_word.as_ref().map(|word| RoundInfo {
            current_round: self.current_round,
            total_rounds: self.total_rounds,
            word_length: word.len(),
            hint: word.hint.clone(),
        })
    }

    pub fn submit_guess(
        &mut self,
        player_id: &str,
        raw_guess: &str,
    ) -> Result<GuessOutcome, RoomError> {
        self.submit_guess_at(player_id, raw_guess, Utc::now())
    }

    pub fn submit_guess_at(
        &mut self,
        player_id: &str,
        raw_guess: &str,
        now: DateTime<Utc>,
    ) -> Result<GuessOutcome, RoomError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| RoomError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;

        let secret = match (&self.status, &self.current_word) {
            (RoomStatus::Playing, Some(word)) => word.word.clone(),
            _ => return Err(RoomError::RoomNotPlaying),
        };

        if self.players[index].has_guessed_correctly {
            return Err(RoomError::AlreadyGuessedCorrectly);
        }

        if self.round_closed || self.round_end_time.is_some_and(|end| now > end) {
            return Err(RoomError::RoundExpired);
        }

        let guess_text = raw_guess.trim().to_uppercase();
        let expected = secret.chars().count();
        let actual = guess_text.chars().count();
        if actual != expected {
            return Err(RoomError::LengthMismatch { expected, actual });
        }

        let result = GuessEvaluator::evaluate(&secret, &guess_text);
        let is_correct = guess_text == secret;
        let guess = Guess {
            text: guess_text,
            result,
            timestamp: now.to_rfc3339(),
            is_correct,
        };

        self.last_activity = now;
        let player = &mut self.players[index];
        player.guesses.push(guess.clone());
        player.last_guess_time = Some(now.to_rfc3339());

        if !is_correct {
            debug!(
                "Player {} guessed {} in room {}",
                player_id, guess.text, self.code
            );
            return Ok(GuessOutcome {
                guess,
                points: 0,
                should_end_round: false,
            });
        }

        player.has_guessed_correctly = true;
        let guess_count = player.guesses.len() as u32;
        let connected = player.connected;
        if connected && !self.correct_guessers.iter().any(|id| id == player_id) {
            self.correct_guessers.push(player_id.to_string());
        }

        let elapsed_seconds = self
            .round_start_time
            .map(|start| (now - start).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);
        let points = ScoringEngine::score(elapsed_seconds, guess_count);
        *self.scores.entry(player_id.to_string()).or_insert(0) += points;

        info!(
            "Player {} solved round {} in room {} for {} points",
            player_id, self.current_round, self.code, points
        );

        Ok(GuessOutcome {
            guess,
            points,
            should_end_round: self.should_end_round_at(now),
        })
    }

    pub fn should_end_round(&self) -> bool {
        self.should_end_round_at(Utc::now())
    }

    /// Time is up, or every connected player has solved the word.
    ///
    /// With nobody connected the round only ends on time.
    pub fn should_end_round_at(&self, now: DateTime<Utc>) -> bool {
        if self.round_closed || self.round_end_time.is_some_and(|end| now > end) {
            return true;
        }

        !self.correct_guessers.is_empty() && self.correct_guessers.len() == self.connected_count()
    }

    pub fn is_round_closed(&self) -> bool {
        self.round_closed
    }

    pub fn close_round(&mut self) -> Result<String, RoomError> {
        self.close_round_at(Utc::now())
    }

    /// Stop the live round early. Later guesses fail as expired until the
    /// next round starts. Returns the secret so it can be revealed, once.
    pub fn close_round_at(&mut self, now: DateTime<Utc>) -> Result<String, RoomError> {
        let secret = match (&self.status, &self.current_word) {
            (RoomStatus::Playing, Some(word)) => word.word.clone(),
            _ => return Err(RoomError::RoomNotPlaying),
        };
        if self.round_closed {
            return Err(RoomError::RoundAlreadyClosed);
        }

        self.round_closed = true;
        self.last_activity = now;
        if self.round_end_time.is_some_and(|end| now < end) {
            self.round_end_time = Some(now);
        }

        debug!("Round {} closed in room {}", self.current_round, self.code);
        Ok(secret)
    }

    /// Finish the game. Idempotent; no transition leaves `Finished`.
    pub fn end(&mut self) {
        self.end_at(Utc::now());
    }

    pub fn end_at(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
        if self.status != RoomStatus::Finished {
            self.status = RoomStatus::Finished;
            info!(
                "Room {} finished after {} rounds",
                self.code, self.current_round
            );
        }
    }

    /// Connected players by score, highest first. Ties keep join order.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .players
            .iter()
            .filter(|p| p.connected)
            .map(|p| LeaderboardEntry {
                id: p.id.clone(),
                name: p.name.clone(),
                score: self.scores.get(&p.id).copied().unwrap_or(0),
                has_guessed_correctly: p.has_guessed_correctly,
            })
            .collect();

        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries
    }

    /// Room state safe to show participants. While playing, the word and
    /// the letters of every guess are masked.
    pub fn public_info(&self) -> RoomInfo {
        let playing = self.status == RoomStatus::Playing;
        let current_word = match &self.current_word {
            Some(word) if playing => Some(word.masked()),
            word => word.clone(),
        };
        let players = if playing {
            self.players.iter().map(Player::redacted).collect()
        } else {
            self.players.clone()
        };

        RoomInfo {
            code: self.code.clone(),
            creator_id: self.creator_id.clone(),
            status: self.status,
            players,
            current_round: self.current_round,
            total_rounds: self.total_rounds,
            current_word,
            scores: self.scores.clone(),
            start_time: self.start_time.map(|t| t.to_rfc3339()),
            round_start_time: self.round_start_time.map(|t| t.to_rfc3339()),
            round_end_time: self.round_end_time.map(|t| t.to_rfc3339()),
            correct_guessers: self.correct_guessers.clone(),
        }
    }

    /// Rooms untouched for `idle_for` can be reclaimed. Finished rooms go
    /// sooner, once `finished_grace` has passed since the game ended.
    pub fn is_reclaimable(
        &self,
        idle_for: TimeDelta,
        finished_grace: TimeDelta,
        now: DateTime<Utc>,
    ) -> bool {
        let idle = now - self.last_activity;
        idle > idle_for || (self.status == RoomStatus::Finished && idle > finished_grace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vocabulary;
    use wordroom_types::LetterState;

    fn vocabulary(entry: &str) -> Vocabulary {
        Vocabulary::from_word_list(entry).unwrap()
    }

    fn profile(id: &str, name: &str) -> PlayerProfile {
        PlayerProfile {
            id: id.to_string(),
            name: name.to_string(),
            is_admin: false,
        }
    }

    fn playing_room(now: DateTime<Utc>) -> Room {
        let mut room = Room::new_at("K7PX2Q", "24310111046", now);
        room.add_player_at(profile("p1", "Mehmet"), now);
        room.add_player_at(profile("p2", "Ayşe"), now);
        room.start_at(&vocabulary("HALLO|Begrüßung"), now).unwrap();
        room
    }

    #[test]
    fn test_new_room_is_waiting() {
        let room = Room::new("K7PX2Q", "24310111046");
        assert_eq!(room.status(), RoomStatus::Waiting);
        assert_eq!(room.current_round(), 0);
        assert!(room.reveal_word().is_none());
        assert!(room.round_info().is_none());
        assert!(!room.should_end_round());
    }

    #[test]
    fn test_add_player_seeds_score() {
        let mut room = Room::new("K7PX2Q", "24310111046");
        let rejoined = room.add_player(profile("p1", "Mehmet"));

        assert!(!rejoined);
        assert_eq!(room.players().len(), 1);
        assert_eq!(room.score("p1"), Some(0));
        assert!(room.player("p1").unwrap().connected);
    }

    #[test]
    fn test_repeated_join_is_idempotent() {
        let mut room = Room::new("K7PX2Q", "24310111046");
        room.add_player(profile("p1", "Mehmet"));
        let rejoined = room.add_player(profile("p1", "Mehmet D."));

        assert!(rejoined);
        assert_eq!(room.players().len(), 1);
        assert_eq!(room.player("p1").unwrap().name, "Mehmet D.");
    }

    #[test]
    fn test_remove_unknown_player_is_noop() {
        let mut room = Room::new("K7PX2Q", "24310111046");
        room.add_player(profile("p1", "Mehmet"));
        assert!(room.remove_player("ghost").is_none());
        assert_eq!(room.connected_count(), 1);
    }

    #[test]
    fn test_start_sets_round_window() {
        let now = Utc::now();
        let room = playing_room(now);

        assert_eq!(room.status(), RoomStatus::Playing);
        assert_eq!(room.current_round(), 1);
        assert_eq!(room.reveal_word(), Some("HALLO"));
        assert_eq!(room.round_end_time(), Some(now + TimeDelta::seconds(120)));

        let info = room.round_info().unwrap();
        assert_eq!(info.word_length, 5);
        assert_eq!(info.hint, "Begrüßung");
        assert_eq!(info.total_rounds, None);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let now = Utc::now();
        let mut room = playing_room(now);
        let result = room.start_at(&vocabulary("DANKE|Höflich"), now);
        assert_eq!(result.unwrap_err(), RoomError::GameAlreadyStarted);
        assert_eq!(room.reveal_word(), Some("HALLO"));
    }

    #[test]
    fn test_guess_error_order() {
        let now = Utc::now();
        let mut waiting = Room::new_at("K7PX2Q", "24310111046", now);
        waiting.add_player_at(profile("p1", "Mehmet"), now);

        assert!(matches!(
            waiting.submit_guess_at("ghost", "HALLO", now),
            Err(RoomError::PlayerNotFound { .. })
        ));
        assert_eq!(
            waiting.submit_guess_at("p1", "HALLO", now).unwrap_err(),
            RoomError::RoomNotPlaying
        );

        let mut room = playing_room(now);
        // Expired beats length mismatch
        let late = now + TimeDelta::seconds(121);
        assert_eq!(
            room.submit_guess_at("p1", "HI", late).unwrap_err(),
            RoomError::RoundExpired
        );
        assert_eq!(
            room.submit_guess_at("p1", "HI", now).unwrap_err(),
            RoomError::LengthMismatch {
                expected: 5,
                actual: 2
            }
        );

        room.submit_guess_at("p1", "hallo", now).unwrap();
        // Already solved beats expiry
        assert_eq!(
            room.submit_guess_at("p1", "HALLO", late).unwrap_err(),
            RoomError::AlreadyGuessedCorrectly
        );
    }

    #[test]
    fn test_guess_is_normalized_and_recorded() {
        let now = Utc::now();
        let mut room = playing_room(now);

        let outcome = room.submit_guess_at("p1", "  hlola ", now).unwrap();
        assert!(!outcome.is_correct());
        assert_eq!(outcome.points, 0);
        assert_eq!(outcome.guess.text, "HLOLA");
        assert_eq!(
            outcome.guess.result,
            vec![
                LetterState::Correct,
                LetterState::Misplaced,
                LetterState::Misplaced,
                LetterState::Correct,
                LetterState::Misplaced,
            ]
        );

        let player = room.player("p1").unwrap();
        assert_eq!(player.guesses.len(), 1);
        assert!(player.last_guess_time.is_some());
        assert_eq!(room.score("p1"), Some(0));
    }

    #[test]
    fn test_correct_guess_scores() {
        let now = Utc::now();
        let mut room = playing_room(now);

        room.submit_guess_at("p1", "HOLLA", now + TimeDelta::seconds(3))
            .unwrap();
        let outcome = room
            .submit_guess_at("p1", "HALLO", now + TimeDelta::seconds(15))
            .unwrap();

        // 100 + 25 (speed) + 33 (second guess)
        assert!(outcome.is_correct());
        assert_eq!(outcome.points, 158);
        assert!(!outcome.should_end_round);
        assert_eq!(room.score("p1"), Some(158));
        assert_eq!(room.correct_guessers(), ["p1".to_string()]);
        assert!(room.player("p1").unwrap().has_guessed_correctly);
    }

    #[test]
    fn test_round_ends_when_all_connected_solved() {
        let now = Utc::now();
        let mut room = playing_room(now);

        assert!(!room.should_end_round_at(now));
        room.submit_guess_at("p1", "HALLO", now).unwrap();
        assert!(!room.should_end_round_at(now));

        let outcome = room.submit_guess_at("p2", "HALLO", now).unwrap();
        assert!(outcome.should_end_round);
        assert!(room.should_end_round_at(now));
    }

    #[test]
    fn test_round_ends_on_timeout() {
        let now = Utc::now();
        let room = playing_room(now);

        assert!(!room.should_end_round_at(now + TimeDelta::seconds(120)));
        assert!(room.should_end_round_at(now + TimeDelta::seconds(121)));
    }

    #[test]
    fn test_round_without_connected_players_only_times_out() {
        let now = Utc::now();
        let mut room = playing_room(now);
        room.remove_player_at("p1", now);
        room.remove_player_at("p2", now);

        assert_eq!(room.connected_count(), 0);
        assert!(!room.should_end_round_at(now + TimeDelta::seconds(60)));
        assert!(room.should_end_round_at(now + TimeDelta::seconds(121)));
    }

    #[test]
    fn test_disconnected_solver_does_not_count() {
        let now = Utc::now();
        let mut room = playing_room(now);

        room.submit_guess_at("p1", "HALLO", now).unwrap();
        room.remove_player_at("p1", now);

        // p2 is the only connected player and has not solved it yet
        assert!(room.correct_guessers().is_empty());
        assert!(!room.should_end_round_at(now));

        room.add_player_at(profile("p1", "Mehmet"), now);
        assert_eq!(room.correct_guessers(), ["p1".to_string()]);
        assert!(room.player("p1").unwrap().connected);
    }

    #[test]
    fn test_advance_round_resets_round_state() {
        let now = Utc::now();
        let mut room = playing_room(now);
        room.submit_guess_at("p1", "HALLO", now).unwrap();
        let earned = room.score("p1").unwrap();

        let later = now + TimeDelta::seconds(130);
        let info = room
            .advance_round_at(&vocabulary("KINO|Filme"), later)
            .unwrap();

        assert_eq!(info.current_round, 2);
        assert_eq!(info.word_length, 4);
        assert_eq!(room.reveal_word(), Some("KINO"));
        assert!(room.correct_guessers().is_empty());
        assert!(!room.player("p1").unwrap().has_guessed_correctly);
        assert!(room.player("p1").unwrap().guesses.is_empty());
        assert_eq!(room.score("p1"), Some(earned));
        assert!(!room.should_end_round_at(later));
    }

    #[test]
    fn test_rounds_are_unbounded() {
        let now = Utc::now();
        let mut room = playing_room(now);
        let words = vocabulary("HAUS|Wohnen");

        for expected in 2..=50 {
            let info = room.advance_round_at(&words, now).unwrap();
            assert_eq!(info.current_round, expected);
            assert_eq!(info.total_rounds, None);
        }
        assert_eq!(room.status(), RoomStatus::Playing);
    }

    #[test]
    fn test_advance_requires_playing() {
        let mut room = Room::new("K7PX2Q", "24310111046");
        assert_eq!(
            room.advance_round(&vocabulary("HAUS|Wohnen")).unwrap_err(),
            RoomError::RoomNotPlaying
        );
    }

    #[test]
    fn test_end_is_terminal_and_idempotent() {
        let now = Utc::now();
        let mut room = playing_room(now);
        room.end_at(now);
        room.end_at(now);

        assert_eq!(room.status(), RoomStatus::Finished);
        assert_eq!(
            room.submit_guess_at("p1", "HALLO", now).unwrap_err(),
            RoomError::RoomNotPlaying
        );
        assert_eq!(
            room.start_at(&vocabulary("HAUS|Wohnen"), now).unwrap_err(),
            RoomError::GameAlreadyStarted
        );
        assert_eq!(
            room.advance_round_at(&vocabulary("HAUS|Wohnen"), now)
                .unwrap_err(),
            RoomError::RoomNotPlaying
        );
    }

    #[test]
    fn test_leaderboard_sorted_and_filtered() {
        let now = Utc::now();
        let mut room = playing_room(now);
        room.add_player_at(profile("p3", "Fatma"), now);

        room.submit_guess_at("p2", "HALLO", now).unwrap();
        room.submit_guess_at("p3", "HALLO", now + TimeDelta::seconds(40))
            .unwrap();
        room.remove_player_at("p1", now);

        let leaderboard = room.leaderboard();
        let ids: Vec<&str> = leaderboard.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p3"]);
        assert_eq!(leaderboard[0].score, 200);
        assert_eq!(leaderboard[1].score, 150);
        assert!(leaderboard.iter().all(|e| e.has_guessed_correctly));
    }

    #[test]
    fn test_leaderboard_ties_keep_join_order() {
        let mut room = Room::new("K7PX2Q", "24310111046");
        room.add_player(profile("p1", "Mehmet"));
        room.add_player(profile("p2", "Ayşe"));
        room.add_player(profile("p3", "Fatma"));

        let ids: Vec<String> = room.leaderboard().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_public_info_masks_word_while_playing() {
        let now = Utc::now();
        let mut room = playing_room(now);

        let info = room.public_info();
        let word = info.current_word.unwrap();
        assert_eq!(word.word, "?????");
        assert_eq!(word.hint, "Begrüßung");
        assert_eq!(info.status, RoomStatus::Playing);
        assert!(info.round_end_time.is_some());

        room.end_at(now);
        let info = room.public_info();
        assert_eq!(info.current_word.unwrap().word, "HALLO");
    }

    #[test]
    fn test_public_info_waiting() {
        let room = Room::new("K7PX2Q", "24310111046");
        let info = room.public_info();
        assert_eq!(info.status, RoomStatus::Waiting);
        assert_eq!(info.current_round, 0);
        assert!(info.current_word.is_none());
        assert!(info.start_time.is_none());
    }

    #[test]
    fn test_reclaimable() {
        let now = Utc::now();
        let mut room = Room::new_at("K7PX2Q", "24310111046", now);
        let idle = TimeDelta::minutes(120);
        let grace = TimeDelta::minutes(10);

        assert!(!room.is_reclaimable(idle, grace, now + TimeDelta::minutes(60)));
        assert!(room.is_reclaimable(idle, grace, now + TimeDelta::minutes(121)));

        room.end_at(now);
        assert!(!room.is_reclaimable(idle, grace, now));
        assert!(!room.is_reclaimable(idle, grace, now + TimeDelta::minutes(9)));
        assert!(room.is_reclaimable(idle, grace, now + TimeDelta::minutes(11)));
    }

    #[test]
    fn test_close_round_rejects_late_guesses() {
        let now = Utc::now();
        let mut room = playing_room(now);
        room.submit_guess_at("p1", "HALLO", now).unwrap();

        let later = now + TimeDelta::seconds(10);
        assert_eq!(room.close_round_at(later).unwrap(), "HALLO");
        assert!(room.is_round_closed());
        assert!(room.should_end_round_at(later));
        assert_eq!(room.round_end_time(), Some(later));
        assert_eq!(
            room.submit_guess_at("p2", "HALLO", later).unwrap_err(),
            RoomError::RoundExpired
        );

        room.advance_round_at(&vocabulary("KINO|Filme"), later)
            .unwrap();
        assert!(!room.is_round_closed());
        assert!(room.submit_guess_at("p2", "KINO", later).unwrap().is_correct());
    }

    #[test]
    fn test_close_round_only_once() {
        let now = Utc::now();
        let mut room = playing_room(now);

        assert_eq!(room.close_round_at(now).unwrap(), "HALLO");
        assert_eq!(
            room.close_round_at(now + TimeDelta::seconds(1)).unwrap_err(),
            RoomError::RoundAlreadyClosed
        );

        room.advance_round_at(&vocabulary("KINO|Filme"), now).unwrap();
        assert_eq!(room.close_round_at(now).unwrap(), "KINO");
    }

    #[test]
    fn test_close_round_requires_playing() {
        let mut room = Room::new("K7PX2Q", "24310111046");
        assert_eq!(room.close_round().unwrap_err(), RoomError::RoomNotPlaying);
    }

    #[test]
    fn test_custom_round_duration() {
        let now = Utc::now();
        let mut room = Room::new_at("K7PX2Q", "24310111046", now)
            .with_round_duration(TimeDelta::seconds(30));
        room.add_player_at(profile("p1", "Mehmet"), now);
        room.start_at(&vocabulary("HALLO|Begrüßung"), now).unwrap();

        assert_eq!(room.round_end_time(), Some(now + TimeDelta::seconds(30)));
        assert!(room.should_end_round_at(now + TimeDelta::seconds(31)));
    }
}
