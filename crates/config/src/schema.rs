/// Config schema types (activity counter, metrics).
use std::collections::BTreeMap;

use {
    chrono::TimeDelta,
    serde::{Deserialize, Serialize},
};

/// Keyword used when the config does not set one.
pub const DEFAULT_TRIGGER_KEYWORD: &str = "#rank";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChatRankConfig {
    pub counter: CounterConfig,
    pub metrics: MetricsConfig,
}

/// Settings of the per-group activity counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CounterConfig {
    /// Substring that turns a message into a ranking query instead of
    /// recorded activity.
    pub trigger_keyword: String,
    /// Maximum number of senders listed per ranking.
    pub result_limit: usize,
    /// Width of the retention window, in hours. Used both for ranking and
    /// for trimming old messages.
    pub retention_hours: u32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            trigger_keyword: DEFAULT_TRIGGER_KEYWORD.into(),
            result_limit: 10,
            retention_hours: 24,
        }
    }
}

impl CounterConfig {
    /// Retention window as a duration.
    #[must_use]
    pub fn retention(&self) -> TimeDelta {
        TimeDelta::try_hours(i64::from(self.retention_hours)).unwrap_or(TimeDelta::MAX)
    }
}

/// Metrics export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder at startup.
    pub enabled: bool,
    /// Labels attached to every exported metric (e.g. `instance = "bot-1"`).
    pub labels: BTreeMap<String, String>,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = ChatRankConfig::default();
        assert_eq!(cfg.counter.trigger_keyword, "#rank");
        assert_eq!(cfg.counter.result_limit, 10);
        assert_eq!(cfg.counter.retention_hours, 24);
        assert!(!cfg.metrics.enabled);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: ChatRankConfig = toml::from_str(
            r#"
[counter]
trigger_keyword = "!top"
"#,
        )
        .unwrap();
        assert_eq!(cfg.counter.trigger_keyword, "!top");
        assert_eq!(cfg.counter.result_limit, 10);
        assert_eq!(cfg.counter.retention_hours, 24);
    }

    #[test]
    fn retention_in_hours() {
        let cfg = CounterConfig {
            retention_hours: 3,
            ..Default::default()
        };
        assert_eq!(cfg.retention(), TimeDelta::hours(3));
    }
}
