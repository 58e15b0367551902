//! Request bodies sent to the coaching service.

use serde::Serialize;

use crate::models::ChatMessage;

/// Body for `POST /start`.
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest {
    pub session_id: String,
    pub mood: String,
}

/// Body for `POST /reply`.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyRequest {
    pub session_id: String,
    pub user_input: String,
}

/// Body for `POST /generate-article`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateArticleRequest {
    pub session_id: String,
    pub mood: String,
}

/// Body for `POST /analyze-writing`: either raw turns or a session to
/// read the turns from.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalyzeWritingRequest {
    Conversation { conversation_data: Vec<ChatMessage> },
    Session { session_id: String },
}
