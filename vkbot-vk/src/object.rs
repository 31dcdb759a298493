//! VK API objects the adapter reads: `message_new` payloads, groups, long poll server info.
//! Unknown fields are ignored; missing ones take their default.

use serde::{Deserialize, Deserializer, Serialize};

/// Payload of a `message_new` long poll update (API 5.103+).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageNewObject {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<serde_json::Value>,
}

/// Private or conversation message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: i64,
    pub date: i64,
    pub peer_id: i64,
    pub from_id: i64,
    pub text: String,
    pub conversation_message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<MessageAction>,
}

/// Service action of a conversation message (chat created, member invited, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageAction {
    /// Action tag, e.g. `chat_invite_user`.
    #[serde(rename = "type")]
    pub kind: String,
    pub member_id: i64,
    pub text: String,
    pub email: String,
    pub conversation_message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<ActionPhoto>,
}

/// Chat cover photo URLs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionPhoto {
    pub photo_50: String,
    pub photo_100: String,
    pub photo_200: String,
}

/// Community the access token belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub screen_name: String,
}

/// Result of `groups.getLongPollServer`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LongPollServer {
    pub server: String,
    pub key: String,
    #[serde(deserialize_with = "string_or_number")]
    pub ts: String,
}

/// Long poll `ts` is documented as a string but some servers send a number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_message_with_action() {
        let json = r#"{
            "message": {
                "id": 0,
                "date": 1700000000,
                "peer_id": 2000000001,
                "from_id": 12,
                "text": "",
                "conversation_message_id": 31,
                "action": {"type": "chat_invite_user", "member_id": 7},
                "attachments": []
            },
            "client_info": {"keyboard": true}
        }"#;
        let obj: MessageNewObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.message.peer_id, 2000000001);
        let action = obj.message.action.unwrap();
        assert_eq!(action.kind, "chat_invite_user");
        assert_eq!(action.member_id, 7);
        assert!(action.text.is_empty());
        assert!(action.photo.is_none());
    }

    #[test]
    fn test_decode_plain_message() {
        let json = r#"{"message": {"id": 5, "peer_id": 100, "from_id": 1, "text": "hello"}}"#;
        let obj: MessageNewObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.message.text, "hello");
        assert!(obj.message.action.is_none());
        assert!(obj.client_info.is_none());
    }

    #[test]
    fn test_long_poll_server_numeric_ts() {
        let server: LongPollServer =
            serde_json::from_str(r#"{"server": "https://lp.vk.com/wh1", "key": "k", "ts": 17}"#)
                .unwrap();
        assert_eq!(server.ts, "17");
    }
}
