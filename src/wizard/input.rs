use teloxide::types::{ChatId, Message, MessageOrigin};

use crate::platform::ChatInfo;

/// The shape of an inbound wizard message, decided once before any step runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputShape {
    /// Forwarded from a chat (channel post or anonymous group admin).
    Forwarded(ChatInfo),
    /// `@name`, stored without the `@`.
    Handle(String),
    /// Text starting with `-` that parses as a chat id.
    NumericId(ChatId),
    PlainText(String),
    Unrecognized,
}

impl InputShape {
    pub fn from_message(msg: &Message) -> Self {
        let forwarded = match msg.forward_origin() {
            Some(MessageOrigin::Channel { chat, .. }) => Some(ChatInfo::from(chat)),
            Some(MessageOrigin::Chat { sender_chat, .. }) => Some(ChatInfo::from(sender_chat)),
            _ => None,
        };

        Self::from_parts(forwarded, msg.text())
    }

    pub fn from_parts(forwarded: Option<ChatInfo>, text: Option<&str>) -> Self {
        if let Some(chat) = forwarded {
            return InputShape::Forwarded(chat);
        }

        let text = match text.map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return InputShape::Unrecognized,
        };

        if let Some(handle) = text.strip_prefix('@') {
            if is_valid_handle(handle) {
                return InputShape::Handle(handle.to_string());
            }
        } else if text.starts_with('-') {
            if let Ok(id) = text.parse::<i64>() {
                return InputShape::NumericId(ChatId(id));
            }
        }

        InputShape::PlainText(text.to_string())
    }
}

/// Public usernames: letters, digits and underscores.
pub fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty() && handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// What the user answered to the welcome message prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WelcomeInput {
    Skip,
    Text(String),
}

impl WelcomeInput {
    pub fn into_override(self) -> Option<String> {
        match self {
            WelcomeInput::Skip => None,
            WelcomeInput::Text(text) => Some(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ChatType;

    fn message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).unwrap()
    }

    fn private_chat() -> serde_json::Value {
        serde_json::json!({ "id": 7, "type": "private", "first_name": "Sam" })
    }

    #[test]
    fn handles_lose_their_at_sign() {
        assert_eq!(
            InputShape::from_parts(None, Some("@news_channel")),
            InputShape::Handle("news_channel".to_string())
        );
        assert_eq!(
            InputShape::from_parts(None, Some("  @news_channel \n")),
            InputShape::Handle("news_channel".to_string())
        );
    }

    #[test]
    fn malformed_handles_are_plain_text() {
        assert_eq!(
            InputShape::from_parts(None, Some("@")),
            InputShape::PlainText("@".to_string())
        );
        assert_eq!(
            InputShape::from_parts(None, Some("@two words")),
            InputShape::PlainText("@two words".to_string())
        );
    }

    #[test]
    fn negative_numbers_are_chat_ids() {
        assert_eq!(
            InputShape::from_parts(None, Some("-1001234567890")),
            InputShape::NumericId(ChatId(-1001234567890))
        );
        assert_eq!(
            InputShape::from_parts(None, Some("-notanumber")),
            InputShape::PlainText("-notanumber".to_string())
        );
        assert_eq!(
            InputShape::from_parts(None, Some("1234")),
            InputShape::PlainText("1234".to_string())
        );
    }

    #[test]
    fn missing_or_blank_text_is_unrecognized() {
        assert_eq!(InputShape::from_parts(None, None), InputShape::Unrecognized);
        assert_eq!(InputShape::from_parts(None, Some("   ")), InputShape::Unrecognized);
    }

    #[test]
    fn forward_wins_over_text() {
        let chat = ChatInfo {
            id: ChatId(-100123),
            kind: ChatType::Channel,
            username: None,
            title: Some("News".to_string()),
        };

        assert_eq!(
            InputShape::from_parts(Some(chat.clone()), Some("@other")),
            InputShape::Forwarded(chat)
        );
    }

    #[test]
    fn forwarded_channel_post_is_read_from_the_message() {
        let msg = message(serde_json::json!({
            "message_id": 10,
            "date": 1700000000,
            "chat": private_chat(),
            "from": { "id": 7, "is_bot": false, "first_name": "Sam" },
            "forward_origin": {
                "type": "channel",
                "date": 1690000000,
                "message_id": 55,
                "chat": {
                    "id": -100123,
                    "type": "channel",
                    "title": "News",
                    "username": "news_channel"
                }
            },
            "text": "hello subscribers"
        }));

        match InputShape::from_message(&msg) {
            InputShape::Forwarded(chat) => {
                assert_eq!(chat.id, ChatId(-100123));
                assert_eq!(chat.kind, ChatType::Channel);
                assert_eq!(chat.username.as_deref(), Some("news_channel"));
            }
            other => panic!("expected a forward, got {:?}", other),
        }
    }

    #[test]
    fn text_message_is_read_from_the_message() {
        let msg = message(serde_json::json!({
            "message_id": 11,
            "date": 1700000000,
            "chat": private_chat(),
            "from": { "id": 7, "is_bot": false, "first_name": "Sam" },
            "text": "@news_channel"
        }));

        assert_eq!(
            InputShape::from_message(&msg),
            InputShape::Handle("news_channel".to_string())
        );
    }

    #[test]
    fn skipping_the_welcome_message_leaves_no_override() {
        assert_eq!(WelcomeInput::Skip.into_override(), None);
        assert_eq!(
            WelcomeInput::Text("Hi!".to_string()).into_override(),
            Some("Hi!".to_string())
        );
    }
}
