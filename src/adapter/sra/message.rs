//! SRA v3 WebSocket message types (`orders` channel).

use serde::{Deserialize, Serialize};

use crate::domain::{ApiOrder, Subscription};

/// Subscription request sent to the relayer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeMessage<'a> {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub channel: &'static str,
    pub request_id: String,
    pub payload: &'a Subscription,
}

impl<'a> SubscribeMessage<'a> {
    pub fn new(payload: &'a Subscription) -> Self {
        Self {
            msg_type: "subscribe",
            channel: "orders",
            request_id: uuid::Uuid::new_v4().to_string(),
            payload,
        }
    }
}

/// Messages received from the relayer.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ChannelMessage {
    #[serde(rename = "update")]
    Update(UpdateMessage),

    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessage {
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub request_id: String,
    pub payload: Vec<ApiOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_message_shape() {
        let sub = Subscription::new("0xaa".into(), "0xbb".into());
        let json = serde_json::to_value(SubscribeMessage::new(&sub)).unwrap();

        assert_eq!(json["type"], "subscribe");
        assert_eq!(json["channel"], "orders");
        assert_eq!(json["payload"]["makerAssetData"], "0xaa");
        assert_eq!(json["payload"]["takerAssetData"], "0xbb");
        assert!(json["requestId"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[test]
    fn unknown_message_types_are_tolerated() {
        let msg: ChannelMessage =
            serde_json::from_str(r#"{"type": "heartbeat", "channel": "orders"}"#).unwrap();
        assert!(matches!(msg, ChannelMessage::Unknown));
    }

    #[test]
    fn parses_empty_update() {
        let msg: ChannelMessage = serde_json::from_str(
            r#"{"type": "update", "channel": "orders", "requestId": "abc", "payload": []}"#,
        )
        .unwrap();
        match msg {
            ChannelMessage::Update(update) => {
                assert_eq!(update.request_id, "abc");
                assert!(update.payload.is_empty());
            }
            ChannelMessage::Unknown => panic!("expected update"),
        }
    }
}
