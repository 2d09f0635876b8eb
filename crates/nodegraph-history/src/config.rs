/// Configuration for the history engine.
use std::time::Duration;

use nodegraph_config::AppConfig;

/// Maximum number of states kept on the undo stack.
pub const DEFAULT_MAX_UNDO_STEPS: usize = 100;

/// Maximum number of states kept on the redo stack.
pub const DEFAULT_MAX_REDO_STEPS: usize = 100;

/// Time window in milliseconds within which a new burst is folded
/// into the previous undo step.
pub const DEFAULT_MERGE_THRESHOLD_MS: u64 = 100;

/// Configuration for a [`HistoryEngine`](crate::HistoryEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Max states on the undo stack; oldest are evicted beyond this.
    pub max_undo_steps: usize,
    /// Max states on the redo stack; oldest are evicted beyond this.
    pub max_redo_steps: usize,
    /// Bursts starting closer than this to the last commit are merged.
    pub merge_threshold: Duration,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo_steps: DEFAULT_MAX_UNDO_STEPS,
            max_redo_steps: DEFAULT_MAX_REDO_STEPS,
            merge_threshold: Duration::from_millis(DEFAULT_MERGE_THRESHOLD_MS),
        }
    }
}

impl From<&AppConfig> for HistoryConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_undo_steps: config.max_undo_steps,
            max_redo_steps: config.max_redo_steps,
            merge_threshold: Duration::from_millis(config.merge_threshold_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HistoryConfig::default();
        assert_eq!(config.max_undo_steps, 100);
        assert_eq!(config.max_redo_steps, 100);
        assert_eq!(config.merge_threshold, Duration::from_millis(100));
    }

    #[test]
    fn test_from_app_config() {
        let app = AppConfig {
            max_undo_steps: 5,
            max_redo_steps: 3,
            merge_threshold_ms: 0,
            ..Default::default()
        };
        let config = HistoryConfig::from(&app);
        assert_eq!(config.max_undo_steps, 5);
        assert_eq!(config.max_redo_steps, 3);
        assert_eq!(config.merge_threshold, Duration::ZERO);
    }

    #[test]
    fn test_app_defaults_match_history_defaults() {
        assert_eq!(
            HistoryConfig::from(&AppConfig::default()),
            HistoryConfig::default()
        );
    }
}
