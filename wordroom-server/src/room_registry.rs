use chrono::{TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use wordroom_core::{DEFAULT_ROUND_DURATION_SECONDS, Room, WordSource};
use wordroom_types::{
    GuessOutcome, LeaderboardEntry, PlayerProfile, RoomCode, RoomError, RoomInfo, RoomSummary,
    RoundInfo,
};

pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LENGTH: usize = 6;

type CodeGenerator = Box<dyn Fn() -> RoomCode + Send + Sync>;

/// Six characters from an alphabet without look-alikes (no 0/O, 1/I/L).
pub fn generate_room_code() -> RoomCode {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Owns every live room.
///
/// Map references are only held long enough to clone a room's `Arc` out, so
/// nothing keeps a shard locked across an `.await`. Each room has its own
/// lock; all mutation of a room happens while holding it.
pub struct RoomRegistry {
    rooms: DashMap<RoomCode, Arc<Mutex<Room>>>,
    words: Arc<dyn WordSource>,
    round_duration: Duration,
    code_generator: CodeGenerator,
}

impl RoomRegistry {
    pub fn new(words: Arc<dyn WordSource>) -> Self {
        Self {
            rooms: DashMap::new(),
            words,
            round_duration: Duration::from_secs(DEFAULT_ROUND_DURATION_SECONDS as u64),
            code_generator: Box::new(generate_room_code),
        }
    }

    pub fn with_round_duration(mut self, round_duration: Duration) -> Self {
        self.round_duration = round_duration;
        self
    }

    pub fn with_code_generator(
        mut self,
        generator: impl Fn() -> RoomCode + Send + Sync + 'static,
    ) -> Self {
        self.code_generator = Box::new(generator);
        self
    }

    pub fn words(&self) -> &dyn WordSource {
        self.words.as_ref()
    }

    pub fn round_duration(&self) -> Duration {
        self.round_duration
    }

    pub fn create(&self, creator_id: &str) -> RoomSummary {
        let round_duration = TimeDelta::from_std(self.round_duration)
            .unwrap_or_else(|_| TimeDelta::seconds(DEFAULT_ROUND_DURATION_SECONDS));

        loop {
            let code = (self.code_generator)();
            match self.rooms.entry(code.clone()) {
                Entry::Occupied(_) => {
                    debug!("Room code {} already in use, regenerating", code);
                }
                Entry::Vacant(vacant) => {
                    let room = Room::new(code.clone(), creator_id).with_round_duration(round_duration);
                    vacant.insert(Arc::new(Mutex::new(room)));
                    info!("Created room {} for {}", code, creator_id);
                    return RoomSummary {
                        code,
                        creator_id: creator_id.to_string(),
                    };
                }
            }
        }
    }

    fn room(&self, code: &str) -> Result<Arc<Mutex<Room>>, RoomError> {
        self.rooms
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RoomError::room_not_found(code))
    }

    /// Enter a room's critical section. Callers can await while holding the
    /// guard, so notifications go out in the order the room changed.
    pub async fn lock(&self, code: &str) -> Result<OwnedMutexGuard<Room>, RoomError> {
        let room = self.room(code)?;
        Ok(room.lock_owned().await)
    }

    pub async fn with_room<T>(
        &self,
        code: &str,
        f: impl FnOnce(&mut Room) -> T,
    ) -> Result<T, RoomError> {
        let mut room = self.lock(code).await?;
        Ok(f(&mut *room))
    }

    pub async fn get(&self, code: &str) -> Result<RoomInfo, RoomError> {
        self.with_room(code, |room| room.public_info()).await
    }

    pub async fn leaderboard(&self, code: &str) -> Result<Vec<LeaderboardEntry>, RoomError> {
        self.with_room(code, |room| room.leaderboard()).await
    }

    pub async fn add_player(&self, code: &str, profile: PlayerProfile) -> Result<bool, RoomError> {
        self.with_room(code, |room| room.add_player(profile)).await
    }

    pub async fn remove_player(
        &self,
        code: &str,
        player_id: &str,
    ) -> Result<Option<PlayerProfile>, RoomError> {
        self.with_room(code, |room| room.remove_player(player_id).map(|p| p.profile()))
            .await
    }

    pub async fn start(&self, code: &str) -> Result<RoundInfo, RoomError> {
        self.with_room(code, |room| room.start(self.words.as_ref()))
            .await?
    }

    pub async fn submit_guess(
        &self,
        code: &str,
        player_id: &str,
        guess: &str,
    ) -> Result<GuessOutcome, RoomError> {
        self.with_room(code, |room| room.submit_guess(player_id, guess))
            .await?
    }

    pub async fn advance_round(&self, code: &str) -> Result<RoundInfo, RoomError> {
        self.with_room(code, |room| room.advance_round(self.words.as_ref()))
            .await?
    }

    pub async fn end(&self, code: &str) -> Result<Vec<LeaderboardEntry>, RoomError> {
        self.with_room(code, |room| {
            room.end();
            room.leaderboard()
        })
        .await
    }

    /// Close the live round, returning the secret.
    pub async fn force_end_round(&self, code: &str) -> Result<String, RoomError> {
        self.with_room(code, |room| room.close_round()).await?
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Drop rooms idle for longer than `idle_for`, and finished rooms once
    /// `finished_grace` has passed. Returns the codes removed so their timers
    /// can be cancelled.
    pub async fn reclaim_idle(&self, idle_for: Duration, finished_grace: Duration) -> Vec<RoomCode> {
        let idle_for = TimeDelta::from_std(idle_for).unwrap_or(TimeDelta::MAX);
        let finished_grace = TimeDelta::from_std(finished_grace).unwrap_or(TimeDelta::MAX);
        let candidates: Vec<(RoomCode, Arc<Mutex<Room>>)> = self
            .rooms
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut reclaimed = Vec::new();
        for (code, room) in candidates {
            let reclaimable = room
                .lock()
                .await
                .is_reclaimable(idle_for, finished_grace, Utc::now());
            if reclaimable
                && self
                    .rooms
                    .remove_if(&code, |_, current| Arc::ptr_eq(current, &room))
                    .is_some()
            {
                info!("Reclaimed idle room {}", code);
                reclaimed.push(code);
            }
        }

        reclaimed
    }
}
