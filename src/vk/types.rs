use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::InboundMessage;

pub const EVENT_CONFIRMATION: &str = "confirmation";
pub const EVENT_MESSAGE_NEW: &str = "message_new";

/// An event as delivered by both the Callback API and Bots Long Poll.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub object: Value,
    pub group_id: Option<i64>,
    pub secret: Option<String>,
    pub event_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageNew {
    message: VkMessage,
}

#[derive(Debug, Deserialize)]
struct VkMessage {
    from_id: i64,
    peer_id: i64,
    #[serde(default)]
    text: String,
}

impl Event {
    /// The chat message carried by a `message_new` event sent by a user.
    pub fn inbound_message(&self) -> Option<InboundMessage> {
        if self.kind != EVENT_MESSAGE_NEW {
            return None;
        }
        let payload: MessageNew = serde_json::from_value(self.object.clone()).ok()?;
        let message = payload.message;
        // Negative ids belong to communities, including our own outgoing echoes.
        if message.from_id <= 0 {
            return None;
        }
        Some(InboundMessage {
            sender_id: message.from_id,
            peer_id: message.peer_id,
            text: message.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_user_message() {
        let event: Event = serde_json::from_value(json!({
            "type": "message_new",
            "group_id": 1,
            "event_id": "abc",
            "object": {
                "message": { "from_id": 100, "peer_id": 100, "text": "Начать", "id": 5 },
                "client_info": {}
            }
        }))
        .unwrap();
        assert_eq!(
            event.inbound_message(),
            Some(InboundMessage {
                sender_id: 100,
                peer_id: 100,
                text: "Начать".to_string(),
            })
        );
    }

    #[test]
    fn ignores_community_messages_and_other_events() {
        let from_group: Event = serde_json::from_value(json!({
            "type": "message_new",
            "object": { "message": { "from_id": -1, "peer_id": 100, "text": "hi" } }
        }))
        .unwrap();
        assert_eq!(from_group.inbound_message(), None);

        let reply: Event = serde_json::from_value(json!({
            "type": "message_reply",
            "object": { "from_id": 100, "peer_id": 100, "text": "hi" }
        }))
        .unwrap();
        assert_eq!(reply.inbound_message(), None);
    }
}
