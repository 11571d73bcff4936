use std::sync::Arc;

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    tracing::{debug, info, warn},
};

use {
    chatrank_activity::{ActivityCounter, Dispatch},
    chatrank_common::InboundMessage,
};

#[cfg(feature = "metrics")]
use chatrank_metrics::{channels as ch_metrics, counter, labels};

use crate::{Error, Result};

/// Send messages to a group chat.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    async fn send_text(&self, group_id: &str, text: &str) -> anyhow::Result<()>;
}

/// Connects a chat transport to an [`ActivityCounter`].
///
/// Text messages are recorded or answered; every other message kind is
/// ignored. Replies go out through the outbound after the counter has
/// released its lock.
pub struct ActivityPlugin {
    counter: Arc<ActivityCounter>,
    outbound: Arc<dyn ChannelOutbound>,
}

impl ActivityPlugin {
    pub fn new(counter: Arc<ActivityCounter>, outbound: Arc<dyn ChannelOutbound>) -> Self {
        Self { counter, outbound }
    }

    pub fn counter(&self) -> &Arc<ActivityCounter> {
        &self.counter
    }

    /// Handle a message that arrived just now.
    pub async fn on_message(&self, msg: &InboundMessage) -> Result<Dispatch> {
        self.on_message_at(msg, Utc::now()).await
    }

    /// Handle a message that arrived at `now`.
    ///
    /// A failed delivery is logged and returned; the ranking is not retried
    /// and nothing recorded is rolled back.
    pub async fn on_message_at(
        &self,
        msg: &InboundMessage,
        now: DateTime<Utc>,
    ) -> Result<Dispatch> {
        if !msg.kind.is_text() {
            debug!(group_id = %msg.group_id, kind = ?msg.kind, "ignoring non-text message");
            #[cfg(feature = "metrics")]
            counter!(
                ch_metrics::MESSAGES_IGNORED_TOTAL,
                labels::KIND => format!("{:?}", msg.kind)
            )
            .increment(1);
            return Ok(Dispatch::Ignored);
        }

        let dispatch = self
            .counter
            .handle_text(&msg.group_id, &msg.sender_name, &msg.text, now);

        let Dispatch::Reply(ref ranking) = dispatch else {
            return Ok(dispatch);
        };
        if ranking.is_empty() {
            debug!(group_id = %msg.group_id, "no activity inside the window, nothing to send");
            return Ok(dispatch);
        }

        if let Err(e) = self.outbound.send_text(&msg.group_id, ranking).await {
            warn!(group_id = %msg.group_id, error = %e, "failed to deliver ranking");
            #[cfg(feature = "metrics")]
            counter!(ch_metrics::REPLY_ERRORS_TOTAL).increment(1);
            return Err(Error::delivery(&msg.group_id, e));
        }

        info!(
            group_id = %msg.group_id,
            requested_by = %msg.sender_name,
            lines = ranking.lines().count(),
            "sent ranking"
        );
        #[cfg(feature = "metrics")]
        counter!(ch_metrics::REPLIES_SENT_TOTAL).increment(1);
        Ok(dispatch)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {
        super::*,
        chatrank_activity::CounterSettings,
        chatrank_common::MessageKind,
        chrono::TimeDelta,
    };

    #[derive(Default)]
    struct RecordingOutbound {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingOutbound {
        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChannelOutbound for RecordingOutbound {
        async fn send_text(&self, group_id: &str, text: &str) -> anyhow::Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((group_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    struct FailingOutbound;

    #[async_trait]
    impl ChannelOutbound for FailingOutbound {
        async fn send_text(&self, _group_id: &str, _text: &str) -> anyhow::Result<()> {
            anyhow::bail!("group muted the bot")
        }
    }

    fn counter() -> Arc<ActivityCounter> {
        Arc::new(ActivityCounter::new(CounterSettings {
            trigger_keyword: "#rank".into(),
            result_limit: 2,
            retention: TimeDelta::hours(1),
        }))
    }

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    #[tokio::test]
    async fn ranking_is_sent_to_the_asking_group() {
        let outbound = Arc::new(RecordingOutbound::default());
        let plugin = ActivityPlugin::new(counter(), outbound.clone());

        plugin
            .on_message_at(&InboundMessage::text("g1", "A", "hi"), t0())
            .await
            .unwrap();
        plugin
            .on_message_at(&InboundMessage::text("g1", "B", "hello"), t0())
            .await
            .unwrap();
        plugin
            .on_message_at(
                &InboundMessage::text("g1", "B", "!"),
                t0() + TimeDelta::minutes(10),
            )
            .await
            .unwrap();
        let dispatch = plugin
            .on_message_at(
                &InboundMessage::text("g1", "A", "#rank"),
                t0() + TimeDelta::minutes(20),
            )
            .await
            .unwrap();

        assert_eq!(dispatch, Dispatch::Reply("B: 6\nA: 2\n".into()));
        let expected = vec![("g1".to_string(), "B: 6\nA: 2\n".to_string())];
        assert_eq!(outbound.sent(), expected);
    }

    #[tokio::test]
    async fn non_text_messages_are_not_recorded() {
        let outbound = Arc::new(RecordingOutbound::default());
        let plugin = ActivityPlugin::new(counter(), outbound.clone());

        let image = InboundMessage::text("g1", "A", "").with_kind(MessageKind::Image);
        assert_eq!(
            plugin.on_message_at(&image, t0()).await.unwrap(),
            Dispatch::Ignored
        );
        let system = InboundMessage::text("g1", "A", "#rank").with_kind(MessageKind::System);
        assert_eq!(
            plugin.on_message_at(&system, t0()).await.unwrap(),
            Dispatch::Ignored
        );

        assert_eq!(plugin.counter().group_count(), 0);
        assert!(outbound.sent().is_empty());
    }

    #[tokio::test]
    async fn unknown_group_and_empty_ranking_send_nothing() {
        let outbound = Arc::new(RecordingOutbound::default());
        let plugin = ActivityPlugin::new(counter(), outbound.clone());

        let query = InboundMessage::text("g1", "A", "#rank");
        assert_eq!(
            plugin.on_message_at(&query, t0()).await.unwrap(),
            Dispatch::Ignored
        );

        plugin
            .on_message_at(&InboundMessage::text("g1", "A", "hi"), t0())
            .await
            .unwrap();
        assert_eq!(
            plugin
                .on_message_at(&query, t0() + TimeDelta::hours(2))
                .await
                .unwrap(),
            Dispatch::Reply(String::new())
        );
        assert!(outbound.sent().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_reported_and_not_fatal() {
        let plugin = ActivityPlugin::new(counter(), Arc::new(FailingOutbound));

        plugin
            .on_message_at(&InboundMessage::text("g1", "A", "hi"), t0())
            .await
            .unwrap();
        let err = plugin
            .on_message_at(&InboundMessage::text("g1", "A", "#rank"), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Delivery { ref group_id, .. } if group_id == "g1"));
        assert!(err.to_string().contains("group muted the bot"));

        // Later messages are still recorded.
        let dispatch = plugin
            .on_message_at(&InboundMessage::text("g1", "B", "hey"), t0())
            .await
            .unwrap();
        assert_eq!(dispatch, Dispatch::Recorded { weight: 3 });
        assert_eq!(plugin.counter().ledger_len("g1"), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deliveries_are_all_recorded() {
        let outbound = Arc::new(RecordingOutbound::default());
        let plugin = Arc::new(ActivityPlugin::new(counter(), outbound.clone()));

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let plugin = Arc::clone(&plugin);
                tokio::spawn(async move {
                    let msg = InboundMessage::text(format!("g{}", i % 4), format!("s{i}"), "ok");
                    plugin.on_message_at(&msg, t0()).await.unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let counter = plugin.counter();
        assert_eq!(counter.group_count(), 4);
        assert!((0..4).all(|g| counter.ledger_len(&format!("g{g}")) == 16));
        assert!(outbound.sent().is_empty());
    }
}
