use std::time::Duration;
use tokio::time::sleep;

/// Doubling delay for login retries; never gives up. Each login attempt
/// sequence starts from a new instance.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay_ms: u64,
    max_delay_ms: u64,
    current_attempt: u32,
}

impl ExponentialBackoff {
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        Self {
            initial_delay_ms: initial_ms,
            max_delay_ms: max_ms,
            current_attempt: 0,
        }
    }

    /// Delay the next `sleep` will wait
    pub fn next_delay(&self) -> Duration {
        let factor = 2_u64.saturating_pow(self.current_attempt);
        let delay = std::cmp::min(self.initial_delay_ms.saturating_mul(factor), self.max_delay_ms);
        Duration::from_millis(delay)
    }

    pub async fn sleep(&mut self) {
        let delay = self.next_delay();

        log::warn!(
            "⏳ Retry attempt {} in {}ms",
            self.current_attempt + 1,
            delay.as_millis()
        );

        sleep(delay).await;
        self.current_attempt = self.current_attempt.saturating_add(1);
    }

    pub fn attempts(&self) -> u32 {
        self.current_attempt
    }
}
