//! Metric name and label definitions.
//!
//! Centralizing these definitions keeps names consistent between the crates
//! that record them and the dashboards that read them.

/// Activity counter metrics (recording, ranking, trimming)
pub mod activity {
    /// Total number of text messages recorded as activity
    pub const MESSAGES_RECORDED_TOTAL: &str = "chatrank_activity_messages_recorded_total";
    /// Total weight (code points) recorded
    pub const WEIGHT_TOTAL: &str = "chatrank_activity_weight_total";
    /// Total number of ranking queries answered
    pub const QUERIES_TOTAL: &str = "chatrank_activity_queries_total";
    /// Ranking query duration in seconds, measured once the registry lock is held
    pub const QUERY_DURATION_SECONDS: &str = "chatrank_activity_query_duration_seconds";
    /// Trim passes over a group ledger, including passes that evicted nothing
    pub const TRIMS_TOTAL: &str = "chatrank_activity_trims_total";
    /// Total number of records evicted by trim passes
    pub const RECORDS_EVICTED_TOTAL: &str = "chatrank_activity_records_evicted_total";
    /// Number of groups with a ledger
    pub const GROUPS_ACTIVE: &str = "chatrank_activity_groups_active";
}

/// Channel plugin metrics
pub mod channels {
    /// Inbound messages ignored because they are not text
    pub const MESSAGES_IGNORED_TOTAL: &str = "chatrank_channel_messages_ignored_total";
    /// Ranking replies delivered to a group
    pub const REPLIES_SENT_TOTAL: &str = "chatrank_channel_replies_sent_total";
    /// Ranking replies the outbound failed to deliver
    pub const REPLY_ERRORS_TOTAL: &str = "chatrank_channel_reply_errors_total";
}

/// Common label keys used across metrics
pub mod labels {
    pub const KIND: &str = "kind";
}

/// Standard histogram buckets for different metric types
pub mod buckets {
    use once_cell::sync::Lazy;

    /// In-memory query duration buckets (in seconds)
    /// Covers 10µs to 100ms
    pub static QUERY_DURATION: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
        ]
    });
}
