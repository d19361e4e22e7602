use std::time::Duration;
use tokio::time::sleep;

/// Spaces out consecutive requests by a fixed delay
pub struct RateLimiter {
    delay: Duration,
    request_count: usize,
}

impl RateLimiter {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            request_count: 0,
        }
    }

    pub async fn wait(&mut self) {
        if self.should_wait() {
            sleep(self.delay).await;
        }
        self.request_count += 1;
    }

    pub fn request_count(&self) -> usize {
        self.request_count
    }

    fn should_wait(&self) -> bool {
        self.request_count > 0 && !self.delay.is_zero()
    }
}

/// Exponential backoff before retry number `attempt` (1-based):
/// `factor * 2^(attempt - 1)` seconds
pub fn backoff_delay(factor: f64, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16) as i32;
    Duration::from_secs_f64((factor * 2f64.powi(exponent)).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_doubles() {
        assert_eq!(backoff_delay(0.8, 1), Duration::from_millis(800));
        assert_eq!(backoff_delay(0.8, 2), Duration::from_millis(1600));
        assert_eq!(backoff_delay(0.8, 3), Duration::from_millis(3200));
        assert_eq!(backoff_delay(0.0, 4), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_first_request_does_not_wait() {
        let mut limiter = RateLimiter::new(0);
        limiter.wait().await;
        limiter.wait().await;
        assert_eq!(limiter.request_count(), 2);
    }
}
