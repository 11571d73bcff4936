//! Per-group, time-windowed message activity counter.
//!
//! Text messages are appended to a per-group ledger with a weight equal to
//! their code-point count. A ranking query sums the weights of each sender's
//! messages inside the retention window and lists the top senders.
//!
//! Flow: inbound text → [`ActivityCounter::handle_text`] (one lock) →
//! registry resolves the group ledger → either append + trim, or
//! aggregate → rank → format.

pub mod aggregate;
pub mod dispatch;
pub mod ledger;
pub mod rank;
pub mod record;
pub mod registry;

pub use {
    aggregate::aggregate,
    dispatch::{ActivityCounter, CounterSettings, Dispatch},
    ledger::{GroupLedger, TRIM_THRESHOLD},
    rank::{RankEntry, format_ranking, rank},
    record::{MessageRecord, weight_of},
    registry::GroupRegistry,
};
