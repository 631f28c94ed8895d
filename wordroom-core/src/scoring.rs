pub struct ScoringEngine;

impl ScoringEngine {
    pub const BASE_POINTS: i32 = 100;
    pub const MIN_POINTS: i32 = 10;
    pub const SPEED_BONUS: f64 = 50.0;
    pub const SPEED_WINDOW_SECONDS: f64 = 30.0;
    pub const GUESS_BONUS: f64 = 50.0;
    pub const GUESS_BONUS_LIMIT: u32 = 3;

    /// Points for solving a word after `elapsed_seconds` on the `guess_count`-th try.
    ///
    /// 100 base, up to 50 for solving inside the first 30 seconds, up to 50 for
    /// solving within three guesses. Each bonus is rounded half-up on its own.
    pub fn score(elapsed_seconds: f64, guess_count: u32) -> i32 {
        let elapsed = if elapsed_seconds.is_finite() {
            elapsed_seconds.max(0.0)
        } else if elapsed_seconds == f64::INFINITY {
            f64::INFINITY
        } else {
            0.0
        };
        let guess_count = guess_count.max(1);

        let mut points = Self::BASE_POINTS;

        if elapsed < Self::SPEED_WINDOW_SECONDS {
            points += Self::round_half_up(
                Self::SPEED_BONUS * (1.0 - elapsed / Self::SPEED_WINDOW_SECONDS),
            );
        }

        if guess_count <= Self::GUESS_BONUS_LIMIT {
            let extra_guesses = (guess_count - 1) as f64;
            points += Self::round_half_up(
                Self::GUESS_BONUS * (1.0 - extra_guesses / Self::GUESS_BONUS_LIMIT as f64),
            );
        }

        points.max(Self::MIN_POINTS)
    }

    fn round_half_up(value: f64) -> i32 {
        (value + 0.5).floor() as i32
    }
}
