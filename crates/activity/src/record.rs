use chrono::{DateTime, TimeDelta, Utc};

/// Activity weight of a message: its number of Unicode code points.
#[must_use]
pub fn weight_of(text: &str) -> u64 {
    text.chars().count() as u64
}

/// One recorded text message. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    timestamp: DateTime<Utc>,
    sender: String,
    weight: u64,
}

impl MessageRecord {
    pub fn new(sender: impl Into<String>, text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            weight: weight_of(text),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Whether the record's age at `now` is strictly below `retention`.
    pub fn is_within(&self, retention: TimeDelta, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.timestamp) < retention
    }
}
