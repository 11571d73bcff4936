use serde::{Deserialize, Serialize};

/// Classification of an inbound chat message, as reported by the transport.
///
/// Only [`MessageKind::Text`] carries activity; everything else is ignored by
/// the activity counter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Voice,
    Video,
    File,
    Sticker,
    /// Join/leave notices, recalls, and other platform events.
    System,
}

impl MessageKind {
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

/// A message delivered by a channel transport, already resolved to a group
/// and a sender display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundMessage {
    /// Opaque, stable identifier of the group chat.
    pub group_id: String,
    /// Sender display name. Not an identity: two people may share it.
    pub sender_name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kind: MessageKind,
}

impl InboundMessage {
    pub fn text(
        group_id: impl Into<String>,
        sender_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            sender_name: sender_name.into(),
            text: text.into(),
            kind: MessageKind::Text,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_defaults_to_text() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"group_id": "g1", "sender_name": "A", "text": "hi"}"#)
                .unwrap();
        assert_eq!(msg, InboundMessage::text("g1", "A", "hi"));
    }

    #[test]
    fn kind_uses_snake_case() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"group_id": "g1", "sender_name": "A", "kind": "sticker"}"#)
                .unwrap();
        assert_eq!(msg.kind, MessageKind::Sticker);
        assert!(msg.text.is_empty());
        assert!(!msg.kind.is_text());
    }
}
