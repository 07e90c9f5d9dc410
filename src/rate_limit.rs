use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Counts failed attempts per key inside a fixed window. Used to slow down
/// password guessing against a single account.
pub struct AttemptLimiter {
    /// key -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_attempts: u32,
    window: Duration,
}

impl AttemptLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_attempts,
            window,
        }
    }

    /// Five failures per email within 15 minutes.
    pub fn for_login() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }

    /// Returns the seconds until the key may try again once the limit is hit.
    /// Does not count as an attempt; call `record_failure()` for that.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let Some(entry) = self.entries.get(&key.to_lowercase()) else {
            return Ok(());
        };

        let (count, start) = *entry.value();
        let elapsed = start.elapsed();
        if elapsed > self.window || count < self.max_attempts {
            return Ok(());
        }

        Err(self.window.saturating_sub(elapsed).as_secs())
    }

    pub fn record_failure(&self, key: &str) {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget a key after a successful attempt.
    pub fn reset(&self, key: &str) {
        self.entries.remove(&key.to_lowercase());
    }

    /// Drop entries whose window has closed.
    pub fn cleanup(&self) {
        let window = self.window;
        self.entries.retain(|_, (_, start)| start.elapsed() <= window);
    }
}
