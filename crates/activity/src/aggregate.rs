use {
    chrono::{DateTime, TimeDelta, Utc},
    std::collections::HashMap,
};

use crate::ledger::GroupLedger;

/// Sum the weight of each sender's records whose age at `now` is below
/// `retention`.
///
/// Every record in the ledger is considered, trimmed or not. Senders with no
/// record inside the window are absent from the result. The ledger is never
/// modified.
pub fn aggregate(
    ledger: &GroupLedger,
    retention: TimeDelta,
    now: DateTime<Utc>,
) -> HashMap<&str, u64> {
    let mut sums: HashMap<&str, u64> = HashMap::new();
    for record in ledger
        .records()
        .iter()
        .filter(|r| r.is_within(retention, now))
    {
        *sums.entry(record.sender()).or_default() += record.weight();
    }
    sums
}
