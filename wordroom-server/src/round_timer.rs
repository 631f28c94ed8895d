use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use wordroom_types::RoomCode;

#[derive(Debug)]
struct ArmedTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// At most one pending round-end action per room.
///
/// Knows nothing about rooms or transport; the action decides what "time is
/// up" means. Every arm gets a new generation. The action receives it and
/// should call [`RoundTimers::complete`] from inside the room's critical
/// section: if it returns false, the timer was cancelled or superseded while
/// the action was waiting and it must do nothing.
#[derive(Debug, Clone, Default)]
pub struct RoundTimers {
    timers: Arc<DashMap<RoomCode, ArmedTimer>>,
    next_generation: Arc<AtomicU64>,
}

impl RoundTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending timer for `code` and schedule `action` after `delay`.
    pub fn arm<F, Fut>(&self, code: &str, delay: Duration, action: F) -> u64
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;

        // The entry holds the shard lock until the new handle is in place
        let entry = self.timers.entry(code.to_string());
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action(generation).await;
        });
        let timer = ArmedTimer { generation, handle };

        match entry {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.insert(timer);
                previous.handle.abort();
                debug!("Re-armed round timer for room {}", code);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(timer);
                debug!("Armed round timer for room {}", code);
            }
        }

        generation
    }

    /// Consume the timer if `generation` is still the live one.
    pub fn complete(&self, code: &str, generation: u64) -> bool {
        self.timers
            .remove_if(code, |_, timer| timer.generation == generation)
            .is_some()
    }

    pub fn cancel(&self, code: &str) -> bool {
        match self.timers.remove(code) {
            Some((_, timer)) => {
                timer.handle.abort();
                debug!("Cancelled round timer for room {}", code);
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self, code: &str) -> bool {
        self.timers.contains_key(code)
    }

    pub fn armed_count(&self) -> usize {
        self.timers.len()
    }
}
