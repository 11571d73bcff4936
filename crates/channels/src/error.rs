use std::error::Error as StdError;

/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed channel errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The outbound failed to post a reply to the group.
    #[error("failed to deliver reply to group {group_id}: {source}")]
    Delivery {
        group_id: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn delivery(group_id: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Delivery {
            group_id: group_id.into(),
            source: source.into(),
        }
    }
}
