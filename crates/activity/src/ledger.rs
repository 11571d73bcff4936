use {
    chrono::{DateTime, TimeDelta, Utc},
    tracing::{debug, info},
};

use crate::record::MessageRecord;

/// Ledger size above which an append triggers a trim pass.
pub const TRIM_THRESHOLD: usize = 3000;

/// Ordered message history of one group.
///
/// Records are kept in insertion order. The ledger only shrinks through
/// [`GroupLedger::maybe_trim`].
#[derive(Debug, Clone)]
pub struct GroupLedger {
    group_id: String,
    records: Vec<MessageRecord>,
}

impl GroupLedger {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            records: Vec::new(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record a text message from `sender` at `now`. Returns its weight.
    pub fn append(&mut self, sender: &str, text: &str, now: DateTime<Utc>) -> u64 {
        let record = MessageRecord::new(sender, text, now);
        let weight = record.weight();
        self.records.push(record);
        weight
    }

    /// Drop every record outside the retention window once the ledger has
    /// grown past [`TRIM_THRESHOLD`].
    ///
    /// Returns `None` when the ledger is small enough to skip the pass, and
    /// otherwise the number of records evicted, which may be zero when every
    /// record is still inside the window.
    ///
    /// Every record's age is re-checked; arrival order says nothing about
    /// how many old records sit behind the newest one.
    pub fn maybe_trim(&mut self, retention: TimeDelta, now: DateTime<Utc>) -> Option<usize> {
        if self.records.len() <= TRIM_THRESHOLD {
            return None;
        }

        let before = self.records.len();
        self.records.retain(|r| r.is_within(retention, now));
        let evicted = before - self.records.len();
        let retained = self.records.len();

        if evicted > 0 {
            info!(group_id = %self.group_id, evicted, retained, "trimmed group ledger");
        } else {
            debug!(group_id = %self.group_id, retained, "trim pass found nothing to evict");
        }
        Some(evicted)
    }
}
