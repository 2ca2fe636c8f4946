use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use std::time::{Duration, Instant};

const RESET_AFTER_SECS: u64 = 300;

/// Exponential backoff that starts over once it has been quiet for a while.
pub struct ResettableBackoff {
    backoff: ExponentialBackoff,
    builder: ExponentialBuilder,
    last_used: Instant,
}

impl Default for ResettableBackoff {
    /// Creates backoff policy tuned for restarting Kubernetes watches.
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60))
    }
}

impl ResettableBackoff {
    /// Creates new [`ResettableBackoff`] instance with the given delay bounds.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        let builder = ExponentialBuilder::default()
            .with_min_delay(min_delay)
            .with_max_delay(max_delay)
            .with_factor(2.0)
            .without_max_times()
            .with_jitter();

        Self {
            backoff: builder.build(),
            builder,
            last_used: Instant::now(),
        }
    }

    /// Gets next backoff duration.\
    /// **Note** that the policy is reset first if it was not used for the last few minutes.
    pub fn next_backoff(&mut self) -> Duration {
        if self.last_used.elapsed().as_secs() > RESET_AFTER_SECS {
            self.reset();
        }

        self.last_used = Instant::now();
        self.backoff.next().unwrap_or(Duration::from_secs(RESET_AFTER_SECS))
    }

    /// Resets backoff.
    pub fn reset(&mut self) {
        self.last_used = Instant::now();
        self.backoff = self.builder.build();
    }
}
