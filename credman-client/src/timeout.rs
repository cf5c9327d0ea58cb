use std::time::Duration;

/// Bounds applied to the `timeout` hint of public key requests.
///
/// The hint is in milliseconds and may be absent. The container clamps it into
/// `[min, max]` and uses `default` when the relying party gave none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    /// Shortest ceremony the container allows.
    pub min: Duration,
    /// Longest ceremony the container allows.
    pub max: Duration,
    /// Used when the request carries no timeout.
    pub default: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(15),
            max: Duration::from_secs(600),
            default: Duration::from_secs(300),
        }
    }
}

impl TimeoutPolicy {
    /// The timeout to apply to a request carrying `hint` milliseconds.
    pub fn effective(&self, hint: Option<u32>) -> Duration {
        let requested = hint.map_or(self.default, |ms| Duration::from_millis(ms.into()));
        // `clamp` panics when min > max
        requested.max(self.min).min(self.max)
    }
}
