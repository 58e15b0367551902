//! Conversation turns as shown to the user and as kept by the service.

use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Ai,
    User,
}

/// One turn of a coaching chat, cached under the chat namespace and sent
/// as `conversation_data` for writing analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub speaker: Speaker,
    pub text: String,
    /// Display time, if the turn was timestamped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            time: None,
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Ai,
            text: text.into(),
            time: None,
        }
    }

    pub fn at(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }
}

/// A message as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// `system`, `human` or `ai`
    pub role: String,
    pub content: String,
}

impl HistoryMessage {
    /// Converts to a chat turn; system prompts have no chat counterpart.
    pub fn to_chat_message(&self) -> Option<ChatMessage> {
        let speaker = match self.role.to_ascii_lowercase().as_str() {
            "human" | "user" => Speaker::User,
            "ai" => Speaker::Ai,
            _ => return None,
        };
        Some(ChatMessage {
            speaker,
            text: self.content.clone(),
            time: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_wire_format() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "user", "text": "hi"}));

        let timed: ChatMessage =
            serde_json::from_str(r#"{"type":"ai","text":"hello","time":"10:02"}"#).unwrap();
        assert_eq!(timed, ChatMessage::ai("hello").at("10:02"));
    }

    #[test]
    fn test_history_conversion_drops_system_prompt() {
        let history = [
            HistoryMessage { role: "system".into(), content: "mood: happy".into() },
            HistoryMessage { role: "ai".into(), content: "What happened?".into() },
            HistoryMessage { role: "human".into(), content: "I passed".into() },
        ];

        let turns: Vec<ChatMessage> = history.iter().filter_map(|m| m.to_chat_message()).collect();
        assert_eq!(
            turns,
            vec![ChatMessage::ai("What happened?"), ChatMessage::user("I passed")]
        );
    }
}
