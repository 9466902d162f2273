//! Inbound chat events.
//!
//! An [`InboundEvent`] is created by the transport for every received chat
//! message and discarded once dispatch for it has completed. It carries the
//! raw text, whether the message was addressed privately to the bot, and the
//! opaque identifiers needed to route a response.

use serde::{Deserialize, Serialize};

/// One received chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Raw message content.
    pub text: String,
    /// Whether the message was addressed privately to the bot.
    #[serde(default)]
    pub is_direct: bool,
    /// Opaque identifier of the sender.
    pub sender_id: String,
    /// Opaque identifier of the conversation (channel or private session).
    pub conversation_id: String,
}

impl InboundEvent {
    /// Creates an event posted to a shared channel.
    pub fn public(
        text: impl Into<String>,
        sender_id: impl Into<String>,
        conversation_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            is_direct: false,
            sender_id: sender_id.into(),
            conversation_id: conversation_id.into(),
        }
    }

    /// Creates an event addressed privately to the bot.
    ///
    /// Direct conversations are keyed by the sender.
    pub fn direct(text: impl Into<String>, sender_id: impl Into<String>) -> Self {
        let sender_id = sender_id.into();
        Self {
            text: text.into(),
            is_direct: true,
            conversation_id: sender_id.clone(),
            sender_id,
        }
    }

    /// Returns the context a response to this event should be routed with.
    pub fn reply_context(&self) -> ReplyContext {
        ReplyContext {
            sender_id: self.sender_id.clone(),
            conversation_id: self.conversation_id.clone(),
        }
    }
}

/// Routing information for an outbound response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplyContext {
    /// The sender that triggered the response.
    pub sender_id: String,
    /// The conversation the response is written to.
    pub conversation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_event_uses_sender_as_conversation() {
        let event = InboundEvent::direct("weather Seattle", "alice");
        assert!(event.is_direct);
        assert_eq!(event.conversation_id, "alice");
        assert_eq!(
            event.reply_context(),
            ReplyContext {
                sender_id: "alice".into(),
                conversation_id: "alice".into(),
            }
        );
    }

    #[test]
    fn test_event_deserializes_without_direct_flag() {
        let event: InboundEvent = serde_json::from_str(
            r##"{"text":"hi","sender_id":"bob","conversation_id":"#general"}"##,
        )
        .unwrap();
        assert!(!event.is_direct);
        assert_eq!(event.reply_context().conversation_id, "#general");
    }
}
