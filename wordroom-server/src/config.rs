use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub round_duration_seconds: u64,
    pub room_idle_timeout_minutes: u64,
    pub finished_room_grace_minutes: u64,
    pub connection_timeout_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

impl Config {
    /// Read settings from the environment. Missing or malformed values fall
    /// back to their defaults.
    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::defaults();
        let setting = |key: &str, default: u64| parse_or(&lookup, key, default);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            round_duration_seconds: setting("ROUND_DURATION_SECONDS", defaults.round_duration_seconds),
            room_idle_timeout_minutes: setting(
                "ROOM_IDLE_TIMEOUT_MINUTES",
                defaults.room_idle_timeout_minutes,
            ),
            finished_room_grace_minutes: setting(
                "FINISHED_ROOM_GRACE_MINUTES",
                defaults.finished_room_grace_minutes,
            ),
            connection_timeout_seconds: setting(
                "CONNECTION_TIMEOUT_SECONDS",
                defaults.connection_timeout_seconds,
            ),
            cleanup_interval_seconds: setting(
                "CLEANUP_INTERVAL_SECONDS",
                defaults.cleanup_interval_seconds,
            ),
        }
    }

    fn defaults() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            round_duration_seconds: 120,
            room_idle_timeout_minutes: 120,
            finished_room_grace_minutes: 10,
            connection_timeout_seconds: 300,
            cleanup_interval_seconds: 30,
        }
    }

    pub fn round_duration(&self) -> Duration {
        Duration::from_secs(self.round_duration_seconds)
    }

    pub fn room_idle_timeout(&self) -> Duration {
        minutes(self.room_idle_timeout_minutes)
    }

    /// How long a finished room stays readable before it is reclaimed.
    pub fn finished_room_grace(&self) -> Duration {
        minutes(self.finished_room_grace_minutes)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_seconds)
    }

    /// Never zero; `tokio::time::interval` rejects a zero period.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn minutes(minutes: u64) -> Duration {
    Duration::from_secs(minutes.saturating_mul(60))
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} '{}', using the default", key, raw);
            default
        }),
    }
}
