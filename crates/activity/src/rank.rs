use std::{collections::HashMap, fmt};

/// One line of a ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub sender: String,
    pub total: u64,
}

impl fmt::Display for RankEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.total)
    }
}

/// Order senders by total, highest first, and keep the first `limit`.
///
/// Equal totals are ordered by sender name so the same sums always produce
/// the same ranking.
pub fn rank(sums: HashMap<&str, u64>, limit: usize) -> Vec<RankEntry> {
    if limit == 0 {
        return Vec::new();
    }

    let mut entries: Vec<(&str, u64)> = sums.into_iter().collect();
    entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(limit)
        .map(|(sender, total)| RankEntry {
            sender: sender.to_string(),
            total,
        })
        .collect()
}

/// Render a ranking as `"<sender>: <total>\n"` lines, in rank order.
pub fn format_ranking(ranked: &[RankEntry]) -> String {
    ranked.iter().map(|entry| format!("{entry}\n")).collect()
}
