use std::time::Duration;
use tokio::time::Instant;

/// Token bucket for one connection's inbound messages.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tokens: u32,
    max_tokens: u32,
    refill_interval: Duration,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        // Burst of 20, then one message every 250ms
        Self::new_with_limits(20, Duration::from_millis(250))
    }

    pub fn new_with_limits(max_tokens: u32, refill_interval: Duration) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_interval,
            last_refill: Instant::now(),
        }
    }

    pub fn check_rate_limit(&mut self) -> bool {
        self.refill_tokens();

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn refill_tokens(&mut self) {
        let interval = self.refill_interval.as_millis().max(1);
        let elapsed = self.last_refill.elapsed().as_millis();
        let tokens_to_add = elapsed / interval;

        if tokens_to_add > 0 {
            let tokens_to_add = u32::try_from(tokens_to_add).unwrap_or(u32::MAX);
            self.tokens = self.tokens.saturating_add(tokens_to_add).min(self.max_tokens);
            // Keep the remainder so partial intervals are not lost
            self.last_refill += self.refill_interval * tokens_to_add.min(self.max_tokens);
            if self.tokens == self.max_tokens {
                self.last_refill = Instant::now();
            }
        }
    }

    pub fn remaining_tokens(&mut self) -> u32 {
        self.refill_tokens();
        self.tokens
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_reject() {
        let mut limiter = RateLimiter::new_with_limits(3, Duration::from_secs(1));

        assert!(limiter.check_rate_limit());
        assert!(limiter.check_rate_limit());
        assert!(limiter.check_rate_limit());
        assert!(!limiter.check_rate_limit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refills_over_time() {
        let mut limiter = RateLimiter::new_with_limits(2, Duration::from_millis(500));
        limiter.check_rate_limit();
        limiter.check_rate_limit();
        assert_eq!(limiter.remaining_tokens(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(limiter.remaining_tokens(), 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(limiter.remaining_tokens(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(limiter.remaining_tokens(), 2);
    }
}
