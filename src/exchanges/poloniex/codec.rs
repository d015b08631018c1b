use crate::core::errors::ExchangeError;
use crate::core::kernel::WsCodec;
use crate::exchanges::poloniex::signer::ChannelAuth;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;

/// Channel ids with a fixed meaning on the push API
pub mod channels {
    pub const ACCOUNT_NOTIFICATIONS: u64 = 1000;
    pub const TICKER: u64 = 1002;
    pub const VOLUME_24H: u64 = 1003;
    pub const HEARTBEAT: u64 = 1010;
}

/// Outbound frames for the push API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCommand {
    Subscribe { channel: u64 },
    SubscribePrivate { channel: u64, auth: ChannelAuth },
    Unsubscribe { channel: u64 },
}

impl ChannelCommand {
    pub const fn channel(&self) -> u64 {
        match self {
            Self::Subscribe { channel }
            | Self::SubscribePrivate { channel, .. }
            | Self::Unsubscribe { channel } => *channel,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Subscribe { channel } => json!({
                "command": "subscribe",
                "channel": channel,
            }),
            Self::SubscribePrivate { channel, auth } => json!({
                "command": "subscribe",
                "channel": channel,
                "key": auth.key,
                "payload": auth.payload,
                "sign": auth.sign,
            }),
            Self::Unsubscribe { channel } => json!({
                "command": "unsubscribe",
                "channel": channel,
            }),
        }
    }
}

/// Decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum PoloniexMessage {
    Heartbeat,
    /// `[channel, 1]` acknowledgement
    Subscribed { channel: u64 },
    /// `[channel, sequence, data...]`; sequence is null on some channels
    Update {
        channel: u64,
        sequence: Option<u64>,
        data: Vec<Value>,
    },
    Error(String),
    Unknown(Value),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PoloniexCodec;

impl PoloniexCodec {
    pub fn new() -> Self {
        Self
    }

    fn decode_value(value: Value) -> PoloniexMessage {
        match value {
            Value::Array(items) => Self::decode_array(items),
            Value::Object(map) => match map.get("error").cloned() {
                Some(Value::String(message)) => PoloniexMessage::Error(message),
                Some(other) => PoloniexMessage::Error(other.to_string()),
                None => PoloniexMessage::Unknown(Value::Object(map)),
            },
            other => PoloniexMessage::Unknown(other),
        }
    }

    fn decode_array(items: Vec<Value>) -> PoloniexMessage {
        let Some(channel) = items.first().and_then(Value::as_u64) else {
            return PoloniexMessage::Unknown(Value::Array(items));
        };

        if channel == channels::HEARTBEAT && items.len() == 1 {
            return PoloniexMessage::Heartbeat;
        }

        if items.len() == 2 && items[1].as_u64() == Some(1) {
            return PoloniexMessage::Subscribed { channel };
        }

        let sequence = items.get(1).and_then(Value::as_u64);
        PoloniexMessage::Update {
            channel,
            sequence,
            data: items.into_iter().skip(2).collect(),
        }
    }
}

impl WsCodec for PoloniexCodec {
    type Command = ChannelCommand;
    type Message = PoloniexMessage;

    fn encode_command(&self, command: &ChannelCommand) -> Result<Message, ExchangeError> {
        Ok(Message::Text(command.to_json().to_string()))
    }

    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError> {
        let text = match message {
            Message::Text(text) => text,
            Message::Binary(data) => String::from_utf8(data).map_err(|e| {
                ExchangeError::DeserializationError(format!(
                    "Invalid UTF-8 in binary message: {}",
                    e
                ))
            })?,
            _ => return Ok(None),
        };

        if text.trim().is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            ExchangeError::DeserializationError(format!("Failed to parse JSON: {}", e))
        })?;

        Ok(Some(Self::decode_value(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> PoloniexMessage {
        PoloniexCodec::new()
            .decode_message(Message::Text(text.to_string()))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_encode_subscribe() {
        let codec = PoloniexCodec::new();
        let message = codec
            .encode_command(&ChannelCommand::Subscribe { channel: 1002 })
            .unwrap();

        if let Message::Text(text) = message {
            let value: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(value, json!({"command": "subscribe", "channel": 1002}));
        } else {
            panic!("Expected text message");
        }
    }

    #[test]
    fn test_encode_private_subscribe() {
        let command = ChannelCommand::SubscribePrivate {
            channel: channels::ACCOUNT_NOTIFICATIONS,
            auth: ChannelAuth {
                key: "my-key".to_string(),
                payload: "nonce=1".to_string(),
                sign: "abc".to_string(),
            },
        };
        let value = command.to_json();
        assert_eq!(value["command"], "subscribe");
        assert_eq!(value["channel"], 1000);
        assert_eq!(value["key"], "my-key");
        assert_eq!(value["payload"], "nonce=1");
        assert_eq!(value["sign"], "abc");
        assert_eq!(command.channel(), 1000);
    }

    #[test]
    fn test_decode_heartbeat_and_ack() {
        assert_eq!(decode("[1010]"), PoloniexMessage::Heartbeat);
        assert_eq!(
            decode("[1002,1]"),
            PoloniexMessage::Subscribed { channel: 1002 }
        );
    }

    #[test]
    fn test_decode_update() {
        let message = decode(r#"[1002,null,[149,"382.98901522","381.99755898"]]"#);
        match message {
            PoloniexMessage::Update {
                channel,
                sequence,
                data,
            } => {
                assert_eq!(channel, 1002);
                assert_eq!(sequence, None);
                assert_eq!(data.len(), 1);
                assert_eq!(data[0][0], 149);
            }
            other => panic!("Expected update, got {:?}", other),
        }

        let book = decode(r#"[148,654,[["o",1,"0.0215","1.5"]]]"#);
        assert!(matches!(
            book,
            PoloniexMessage::Update {
                channel: 148,
                sequence: Some(654),
                ..
            }
        ));
    }

    #[test]
    fn test_decode_error_and_unknown() {
        assert_eq!(
            decode(r#"{"error":"Permission denied."}"#),
            PoloniexMessage::Error("Permission denied.".to_string())
        );
        assert!(matches!(decode(r#"{"foo":1}"#), PoloniexMessage::Unknown(_)));
        assert!(matches!(decode(r#"["x"]"#), PoloniexMessage::Unknown(_)));
    }

    #[test]
    fn test_decode_ignores_control_and_rejects_garbage() {
        let codec = PoloniexCodec::new();
        assert!(codec
            .decode_message(Message::Ping(vec![1]))
            .unwrap()
            .is_none());
        assert!(matches!(
            codec.decode_message(Message::Text("not json".to_string())),
            Err(ExchangeError::DeserializationError(_))
        ));
    }
}
