//! Request and response models for the coaching service API
//!
//! Wire types exchanged with the remote service, some of which double as
//! cached payloads in the TTL store.

pub mod conversation;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use conversation::{ChatMessage, HistoryMessage, Speaker};
pub use requests::{
    AnalyzeWritingRequest, GenerateArticleRequest, ReplyRequest, StartSessionRequest,
};
pub use responses::{
    Correction, EndSessionResponse, EndedBy, GeneratedArticle, HealthResponse, HistoryResponse,
    SessionReply, WritingAnalysis, WritingAnalysisResponse,
};
