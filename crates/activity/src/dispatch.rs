use std::sync::{Mutex, MutexGuard};

use {
    chrono::{DateTime, TimeDelta, Utc},
    tracing::debug,
};

use chatrank_config::CounterConfig;

#[cfg(feature = "metrics")]
use chatrank_metrics::{activity as activity_metrics, counter, gauge, histogram};

use crate::{
    aggregate::aggregate,
    rank::{RankEntry, format_ranking, rank},
    registry::GroupRegistry,
};

/// Counter settings fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSettings {
    /// Substring that turns a message into a ranking query.
    pub trigger_keyword: String,
    /// Maximum number of ranked senders per reply.
    pub result_limit: usize,
    /// Window used for both ranking and trimming.
    pub retention: TimeDelta,
}

impl From<&CounterConfig> for CounterSettings {
    fn from(config: &CounterConfig) -> Self {
        Self {
            trigger_keyword: config.trigger_keyword.clone(),
            result_limit: config.result_limit,
            retention: config.retention(),
        }
    }
}

/// What an inbound text message turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The message was appended to its group's ledger.
    Recorded { weight: u64 },
    /// The message was a ranking query; the formatted ranking should be sent
    /// back to the group. May be empty when every record has expired.
    Reply(String),
    /// A ranking query for a group that has never recorded a message.
    Ignored,
}

/// Owns every group ledger behind a single lock and routes inbound text
/// messages to either the record or the query path.
///
/// The lock is held for the whole transition and released before any method
/// returns, so callers deliver replies without blocking ingestion.
#[derive(Debug)]
pub struct ActivityCounter {
    settings: CounterSettings,
    registry: Mutex<GroupRegistry>,
}

impl ActivityCounter {
    pub fn new(settings: CounterSettings) -> Self {
        Self {
            settings,
            registry: Mutex::new(GroupRegistry::new()),
        }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(CounterSettings::from(config))
    }

    pub fn settings(&self) -> &CounterSettings {
        &self.settings
    }

    /// Whether `text` is a ranking query rather than activity.
    ///
    /// Any occurrence of the keyword counts, even inside a longer word.
    pub fn is_query(&self, text: &str) -> bool {
        text.contains(self.settings.trigger_keyword.as_str())
    }

    /// Process one inbound text message received at `now`.
    pub fn handle_text(
        &self,
        group_id: &str,
        sender: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Dispatch {
        if self.is_query(text) {
            return match self.ranking(group_id, now) {
                Some(ranked) => Dispatch::Reply(format_ranking(&ranked)),
                None => {
                    debug!(group_id, sender, "ranking requested for unknown group");
                    Dispatch::Ignored
                },
            };
        }

        let mut registry = self.lock();
        let ledger = registry.resolve(group_id);
        let weight = ledger.append(sender, text, now);
        let trimmed = ledger.maybe_trim(self.settings.retention, now);
        debug!(group_id, sender, weight, evicted = ?trimmed, "recorded message");

        #[cfg(feature = "metrics")]
        {
            counter!(activity_metrics::MESSAGES_RECORDED_TOTAL).increment(1);
            counter!(activity_metrics::WEIGHT_TOTAL).increment(weight);
            if let Some(evicted) = trimmed {
                counter!(activity_metrics::TRIMS_TOTAL).increment(1);
                counter!(activity_metrics::RECORDS_EVICTED_TOTAL).increment(evicted as u64);
            }
            gauge!(activity_metrics::GROUPS_ACTIVE).set(registry.len() as f64);
        }

        Dispatch::Recorded { weight }
    }

    /// Current ranking of `group_id` at `now`. Empty for unknown groups.
    pub fn query(&self, group_id: &str, now: DateTime<Utc>) -> Vec<RankEntry> {
        self.ranking(group_id, now).unwrap_or_default()
    }

    /// Number of records currently held for `group_id`.
    pub fn ledger_len(&self, group_id: &str) -> usize {
        self.lock().find(group_id).map_or(0, |ledger| ledger.len())
    }

    /// Number of groups that have recorded at least one message.
    pub fn group_count(&self) -> usize {
        self.lock().len()
    }

    fn ranking(&self, group_id: &str, now: DateTime<Utc>) -> Option<Vec<RankEntry>> {
        let registry = self.lock();
        #[cfg(feature = "metrics")]
        let start = std::time::Instant::now();

        let ledger = registry.find(group_id)?;
        let sums = aggregate(ledger, self.settings.retention, now);
        let ranked = rank(sums, self.settings.result_limit);
        debug!(group_id, entries = ranked.len(), "computed ranking");

        #[cfg(feature = "metrics")]
        {
            counter!(activity_metrics::QUERIES_TOTAL).increment(1);
            histogram!(activity_metrics::QUERY_DURATION_SECONDS)
                .record(start.elapsed().as_secs_f64());
        }

        Some(ranked)
    }

    /// Lock the registry. A panic in another holder cannot leave a ledger
    /// half-written, so a poisoned lock is recovered.
    fn lock(&self) -> MutexGuard<'_, GroupRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn counter() -> ActivityCounter {
        ActivityCounter::new(CounterSettings {
            trigger_keyword: "#rank".into(),
            result_limit: 2,
            retention: TimeDelta::hours(1),
        })
    }

    #[test]
    fn settings_from_config() {
        let config = CounterConfig {
            trigger_keyword: "!top".into(),
            result_limit: 3,
            retention_hours: 6,
        };
        let counter = ActivityCounter::from_config(&config);
        assert_eq!(counter.settings().trigger_keyword, "!top");
        assert_eq!(counter.settings().result_limit, 3);
        assert_eq!(counter.settings().retention, TimeDelta::hours(6));
    }

    #[test]
    fn records_plain_text() {
        let counter = counter();
        assert_eq!(
            counter.handle_text("g1", "A", "hello", t0()),
            Dispatch::Recorded { weight: 5 }
        );
        assert_eq!(counter.ledger_len("g1"), 1);
        assert_eq!(counter.group_count(), 1);
    }

    #[test]
    fn keyword_anywhere_is_a_query_and_not_recorded() {
        let counter = counter();
        counter.handle_text("g1", "A", "hi", t0());
        let reply = counter.handle_text("g1", "B", "who is top? foo#ranking", t0());
        assert_eq!(reply, Dispatch::Reply("A: 2\n".into()));
        assert_eq!(counter.ledger_len("g1"), 1);
    }

    #[test]
    fn keyword_is_case_sensitive() {
        let counter = counter();
        assert!(counter.is_query("#rank please"));
        assert!(!counter.is_query("#RANK please"));
    }

    #[test]
    fn query_for_unknown_group_is_ignored() {
        let counter = counter();
        assert_eq!(
            counter.handle_text("nowhere", "A", "#rank", t0()),
            Dispatch::Ignored
        );
        assert_eq!(counter.group_count(), 0);
        assert!(counter.query("nowhere", t0()).is_empty());
    }

    #[test]
    fn expired_group_replies_empty() {
        let counter = counter();
        counter.handle_text("g1", "A", "hi", t0());
        let later = t0() + TimeDelta::minutes(61);
        assert_eq!(
            counter.handle_text("g1", "A", "#rank", later),
            Dispatch::Reply(String::new())
        );
    }

    #[test]
    fn query_is_idempotent() {
        let counter = counter();
        counter.handle_text("g1", "A", "hi", t0());
        counter.handle_text("g1", "B", "hi", t0());
        counter.handle_text("g1", "C", "hey", t0());
        let now = t0() + TimeDelta::minutes(1);
        let first = counter.handle_text("g1", "A", "#rank", now);
        let second = counter.handle_text("g1", "A", "#rank", now);
        assert_eq!(first, second);
        assert_eq!(first, Dispatch::Reply("C: 3\nA: 2\n".into()));
    }

    #[test]
    fn groups_are_independent() {
        let counter = counter();
        counter.handle_text("g1", "A", "hello", t0());
        counter.handle_text("g2", "B", "hi", t0());
        assert_eq!(
            counter.query("g2", t0()),
            vec![RankEntry {
                sender: "B".into(),
                total: 2,
            }]
        );
    }
}
