/// Acceleration curve for a held undo/redo shortcut.
///
/// The delay eases in quadratically from `max_delay` down to `min_delay`,
/// which it reaches after `repeats_to_min` repeats and then stays at.
use std::time::Duration;

use nodegraph_config::KeyRepeatSettings;

const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(30);
const DEFAULT_REPEATS_TO_MIN: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatCurve {
    pub max_delay: Duration,
    pub min_delay: Duration,
    pub repeats_to_min: u32,
}

impl Default for RepeatCurve {
    fn default() -> Self {
        Self {
            max_delay: DEFAULT_MAX_DELAY,
            min_delay: DEFAULT_MIN_DELAY,
            repeats_to_min: DEFAULT_REPEATS_TO_MIN,
        }
    }
}

impl From<&KeyRepeatSettings> for RepeatCurve {
    fn from(settings: &KeyRepeatSettings) -> Self {
        Self {
            max_delay: Duration::from_millis(settings.max_delay_ms),
            min_delay: Duration::from_millis(settings.min_delay_ms),
            repeats_to_min: settings.repeats_to_min,
        }
    }
}

impl RepeatCurve {
    /// Delay to wait after the `repeat_count`-th consecutive repeat.
    ///
    /// `max - (max - min) / R² * min(count², R²)`
    pub fn delay(&self, repeat_count: u32) -> Duration {
        let r = u128::from(self.repeats_to_min.max(1));
        let n = u128::from(repeat_count).min(r);
        let span = self.max_delay.saturating_sub(self.min_delay).as_micros();
        let reduction = span * n * n / (r * r);
        let reduction = u64::try_from(reduction).unwrap_or(u64::MAX);
        self.max_delay
            .saturating_sub(Duration::from_micros(reduction))
            .max(self.min_delay.min(self.max_delay))
    }
}

/// [`RepeatCurve::delay`] on the default curve (500ms → 30ms over 12 repeats).
pub fn next_repeat_delay(repeat_count: u32) -> Duration {
    RepeatCurve::default().delay(repeat_count)
}
