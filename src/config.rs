use std::time::Duration;

/// Tunables for a [`TickClock`](crate::TickClock).
///
/// The single knob is `min_interval`: a repeating timer created with a
/// duration below this threshold has its repeat interval floored to zero, so
/// it fires on every subsequent tick once due. The first fire still honors
/// the requested duration.
#[derive(Clone)]
pub struct TickClockConfig {
    min_interval: Duration,
}

impl Default for TickClockConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(18),
        }
    }
}
impl TickClockConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get_min_interval(&self) -> Duration {
        self.min_interval
    }
    pub fn min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }
}
