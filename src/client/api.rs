//! Coaching service client.
//!
//! Every call resolves to the decoded success payload or a normalized
//! [`RequestError`].

use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::normalize::{decode, parse_body, status_error, transport_error, unwrap_payload};
use crate::client::{with_retry, RetryPolicy};
use crate::config::Config;
use crate::error::{RequestError, Result};
use crate::models::{
    AnalyzeWritingRequest, ChatMessage, EndSessionResponse, GenerateArticleRequest,
    GeneratedArticle, HealthResponse, HistoryResponse, ReplyRequest, SessionReply,
    StartSessionRequest, WritingAnalysisResponse,
};

/// Whether repeating an operation can duplicate its effect on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    /// Safe to repeat; the client's retry policy applies
    Idempotent,
    /// Attempted exactly once
    NonIdempotent,
}

// == Api Client ==
/// Client for the coaching service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl ApiClient {
    // == Constructor ==
    /// Creates a client for the service at `base_url`.
    ///
    /// Fails with a local error if the address does not parse or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(RequestError::local)?;
        if base_url.cannot_be_a_base() {
            return Err(RequestError::local(format!("{} cannot be a base URL", base_url)));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RequestError::local)?;

        Ok(Self {
            http,
            base_url,
            retry,
        })
    }

    /// Creates a client from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url, config.timeout(), config.retry_policy())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    // == Sessions ==
    /// Opens a coaching session for `session_id` in the given mood.
    pub async fn start_session(&self, session_id: &str, mood: &str) -> Result<SessionReply> {
        let body = StartSessionRequest {
            session_id: session_id.to_string(),
            mood: mood.to_string(),
        };
        self.call(Idempotency::NonIdempotent, Method::POST, &["start"], Some(&body))
            .await
    }

    /// Sends one user turn and returns the coach's reply.
    pub async fn send_message(&self, session_id: &str, user_input: &str) -> Result<SessionReply> {
        let body = ReplyRequest {
            session_id: session_id.to_string(),
            user_input: user_input.to_string(),
        };
        self.call(Idempotency::NonIdempotent, Method::POST, &["reply"], Some(&body))
            .await
    }

    pub async fn get_history(&self, session_id: &str) -> Result<HistoryResponse> {
        self.call::<(), _>(
            Idempotency::Idempotent,
            Method::GET,
            &["history", session_id],
            None,
        )
        .await
    }

    /// Ends the session; repeating this is harmless.
    pub async fn end_session(&self, session_id: &str) -> Result<EndSessionResponse> {
        self.call::<(), _>(
            Idempotency::Idempotent,
            Method::POST,
            &["end", session_id],
            None,
        )
        .await
    }

    // == Writing ==
    /// Turns the session's conversation into a polished article.
    pub async fn generate_article(&self, session_id: &str, mood: &str) -> Result<GeneratedArticle> {
        let body = GenerateArticleRequest {
            session_id: session_id.to_string(),
            mood: mood.to_string(),
        };
        self.call(
            Idempotency::Idempotent,
            Method::POST,
            &["generate-article"],
            Some(&body),
        )
        .await
    }

    /// Analyzes the user's writing in the given turns.
    pub async fn analyze_writing_with_data(
        &self,
        turns: &[ChatMessage],
    ) -> Result<WritingAnalysisResponse> {
        let body = AnalyzeWritingRequest::Conversation {
            conversation_data: turns.to_vec(),
        };
        self.analyze(&body).await
    }

    /// Analyzes the user's writing in a session's stored history.
    pub async fn analyze_writing_by_session(
        &self,
        session_id: &str,
    ) -> Result<WritingAnalysisResponse> {
        let body = AnalyzeWritingRequest::Session {
            session_id: session_id.to_string(),
        };
        self.analyze(&body).await
    }

    async fn analyze(&self, body: &AnalyzeWritingRequest) -> Result<WritingAnalysisResponse> {
        self.call(
            Idempotency::Idempotent,
            Method::POST,
            &["analyze-writing"],
            Some(body),
        )
        .await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.call::<(), _>(Idempotency::Idempotent, Method::GET, &["health"], None)
            .await
    }

    // == Dispatch ==
    /// Sends one request, retrying under the client's policy if the
    /// operation is idempotent.
    async fn call<B, T>(
        &self,
        idempotency: Idempotency,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(RequestError::local)?;

        let policy = match idempotency {
            Idempotency::Idempotent => self.retry,
            Idempotency::NonIdempotent => RetryPolicy::none(),
        };

        with_retry(policy, || self.send(method.clone(), url.clone(), body.as_ref())).await
    }

    /// One attempt: send, then normalize whatever came back.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T> {
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            debug!("Request failed before a response: {}", e);
            transport_error(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            // The status line arrived, so a broken body still leaves a server error.
            let body = match response.bytes().await {
                Ok(bytes) => parse_body(&bytes),
                Err(e) => {
                    debug!("Failed to read body of {} response: {}", status, e);
                    None
                }
            };
            return Err(status_error(status, body));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let payload = unwrap_payload(parse_body(&bytes).unwrap_or(Value::Null))?;
        decode(payload)
    }

    /// Appends path segments to the base address, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
