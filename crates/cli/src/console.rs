//! Console host: replays a JSON-lines transcript through the activity plugin.
//!
//! Each input line is one message:
//!
//! ```json
//! {"group_id": "g1", "sender_name": "A", "text": "hi", "at": "2025-01-01T08:00:00Z"}
//! ```
//!
//! `kind` defaults to `text` and `at` to the wall clock. Rankings are printed
//! to stdout as `[<group_id>]` followed by the ranking lines.

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    serde::Deserialize,
    tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt},
    tracing::{debug, warn},
};

use {
    chatrank_activity::Dispatch,
    chatrank_channels::{ActivityPlugin, ChannelOutbound},
    chatrank_common::InboundMessage,
};

/// One line of a transcript.
#[derive(Debug, Deserialize)]
pub struct TranscriptLine {
    #[serde(flatten)]
    pub message: InboundMessage,
    /// Replay timestamp; wall clock when absent.
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

impl TranscriptLine {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// Writes rankings to stdout.
pub struct StdoutOutbound;

#[async_trait]
impl ChannelOutbound for StdoutOutbound {
    async fn send_text(&self, group_id: &str, text: &str) -> anyhow::Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("[{group_id}]\n{text}").as_bytes())
            .await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Counts of what a replay did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub recorded: usize,
    pub replies: usize,
    pub ignored: usize,
    pub malformed: usize,
    pub delivery_errors: usize,
}

/// Feed every line of `reader` to `plugin` until end of input.
///
/// Malformed lines and failed deliveries are logged and counted; only I/O
/// errors on the reader stop the replay.
pub async fn replay<R>(plugin: &ActivityPlugin, reader: R) -> anyhow::Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = ReplaySummary::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry = match TranscriptLine::parse(line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping malformed transcript line");
                summary.malformed += 1;
                continue;
            },
        };

        let now = entry.at.unwrap_or_else(Utc::now);
        match plugin.on_message_at(&entry.message, now).await {
            Ok(Dispatch::Recorded { .. }) => summary.recorded += 1,
            Ok(Dispatch::Reply(_)) => summary.replies += 1,
            Ok(Dispatch::Ignored) => summary.ignored += 1,
            Err(e) => {
                warn!(line = line_no, error = %e, "reply not delivered");
                summary.delivery_errors += 1;
            },
        }
    }

    debug!(lines = line_no, ?summary, "transcript finished");
    Ok(summary)
}
