use {std::collections::HashMap, tracing::debug};

use crate::ledger::GroupLedger;

/// Lookup table from group id to its ledger.
///
/// Ledgers are created on first sight and never removed.
#[derive(Debug)]
pub struct GroupRegistry {
    ledgers: HashMap<String, GroupLedger>,
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            ledgers: HashMap::new(),
        }
    }

    /// Return the ledger for `group_id`, registering an empty one if the
    /// group has not been seen before.
    pub fn resolve(&mut self, group_id: &str) -> &mut GroupLedger {
        self.ledgers
            .entry(group_id.to_string())
            .or_insert_with_key(|id| {
                debug!(group_id = %id, "registering group ledger");
                GroupLedger::new(id.clone())
            })
    }

    /// Look up a ledger without creating it.
    pub fn find(&self, group_id: &str) -> Option<&GroupLedger> {
        self.ledgers.get(group_id)
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    pub fn group_ids(&self) -> Vec<&str> {
        self.ledgers.keys().map(|s| s.as_str()).collect()
    }
}
