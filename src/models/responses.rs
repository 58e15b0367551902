//! Response bodies returned by the coaching service.
//!
//! Unknown fields are ignored so the service can grow its payloads freely.

use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, HistoryMessage};

/// Why a session stopped accepting replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndedBy {
    User,
    Ai,
    MaxTurns,
}

/// Coach reply to `POST /start` and `POST /reply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReply {
    pub response: String,
    #[serde(default)]
    pub turns_left: u32,
    #[serde(default)]
    pub session_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_by: Option<EndedBy>,
}

/// Response to `GET /history/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
}

impl HistoryResponse {
    /// The user and coach turns, in order.
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        self.history
            .iter()
            .filter_map(HistoryMessage::to_chat_message)
            .collect()
    }
}

/// Response to `POST /end/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndSessionResponse {
    pub status: String,
    pub session_id: String,
}

/// A polished article, as returned by `POST /generate-article` and cached
/// under the article namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArticle {
    pub article: String,
    pub word_count: u32,
    /// ISO-8601 time the service generated the article
    pub generated_at: String,
}

/// One suggested fix to the user's writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Error category, e.g. `grammar`, `tense`, or `perfect` when nothing was wrong
    #[serde(rename = "type")]
    pub kind: String,
    pub original: String,
    pub suggestion: String,
    pub explanation: String,
}

/// Result of a writing analysis, cached under the analysis namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritingAnalysis {
    #[serde(default)]
    pub corrections: Vec<Correction>,
    #[serde(default)]
    pub total_errors: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_length: Option<u32>,
}

impl WritingAnalysis {
    /// True when every entry reports flawless writing.
    pub fn is_perfect(&self) -> bool {
        self.corrections.iter().all(|c| c.kind == "perfect")
    }
}

/// Response to `POST /analyze-writing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritingAnalysisResponse {
    #[serde(default)]
    pub status: String,
    pub analysis: WritingAnalysis,
    #[serde(default)]
    pub analyzed_at: String,
}

/// Response to `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_reply_ignores_null_error() {
        let reply: SessionReply = serde_json::from_value(json!({
            "response": "What happened?",
            "turns_left": 5,
            "session_active": true,
            "error": null
        }))
        .unwrap();

        assert_eq!(reply.turns_left, 5);
        assert!(reply.session_active);
        assert!(reply.ended_by.is_none());
    }

    #[test]
    fn test_session_reply_ended_by() {
        let reply: SessionReply = serde_json::from_value(json!({
            "response": "We've reached the maximum conversation turns.",
            "turns_left": 0,
            "session_active": false,
            "ended_by": "max_turns"
        }))
        .unwrap();

        assert_eq!(reply.ended_by, Some(EndedBy::MaxTurns));
    }

    #[test]
    fn test_analysis_response_parse() {
        let resp: WritingAnalysisResponse = serde_json::from_value(json!({
            "status": "success",
            "analysis": {
                "corrections": [{
                    "type": "grammar",
                    "original": "I goes to school",
                    "suggestion": "I go to school",
                    "explanation": "first person takes the base form"
                }],
                "total_errors": 1,
                "conversation_length": 4
            },
            "analyzed_at": "2024-05-01T10:00:00"
        }))
        .unwrap();

        assert_eq!(resp.analysis.total_errors, 1);
        assert_eq!(resp.analysis.corrections[0].kind, "grammar");
        assert!(!resp.analysis.is_perfect());
    }

    #[test]
    fn test_history_chat_messages() {
        let resp: HistoryResponse = serde_json::from_value(json!({
            "session_id": "s1",
            "history": [
                {"role": "system", "content": "mood: calm"},
                {"role": "ai", "content": "Hi"}
            ]
        }))
        .unwrap();

        assert_eq!(resp.chat_messages(), vec![ChatMessage::ai("Hi")]);
    }
}
