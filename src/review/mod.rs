pub mod types;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::LlmConfig;
use types::{ChatMessage, ChatRequest, ChatResponse};

/// Instruction placed in front of the diff. The model is asked to answer in Thai.
pub const REVIEW_INSTRUCTION: &str = "คุณเป็น Code Reviewer ที่เก่งที่สุด กรุณาตรวจสอบโค้ดด้านล่างนี้ (Diff) และแนะนำการปรับปรุง พร้อมทั้งชี้ช่องโหว่ความปลอดภัยหากมี ตอบเป็นภาษาไทย:";

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("GLM API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GLM API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed GLM response: {0}")]
    MalformedResponse(String),
}

/// Something that turns a diff into review text.
/// Implementations must be Send + Sync so the pipeline can hold them behind `&dyn`.
#[async_trait]
pub trait Reviewer: Send + Sync {
    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Ask for a review of `diff_text`. The caller guarantees it is non-empty.
    async fn request_review(&self, diff_text: &str) -> Result<String, ReviewError>;
}

/// Prompt sent as the single user message.
pub fn build_prompt(diff_text: &str) -> String {
    format!("{}\n\n{}", REVIEW_INSTRUCTION, diff_text)
}

/// Zhipu GLM chat-completion client.
pub struct GlmClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self, ReviewError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Reviewer for GlmClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, diff_text), fields(model = %self.model, diff_bytes = diff_text.len()))]
    async fn request_review(&self, diff_text: &str) -> Result<String, ReviewError> {
        let prompt = build_prompt(diff_text);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        debug!("sending review request to GLM");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ReviewError::Status { status, body });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ReviewError::MalformedResponse(format!("invalid JSON: {}", e)))?;
        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "GLM token usage"
            );
        }
        debug!(reply_model = parsed.model.as_deref().unwrap_or("unknown"), "received GLM response");

        parsed
            .first_content()
            .map_err(|missing| ReviewError::MalformedResponse(missing.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> GlmClient {
        GlmClient::new(&LlmConfig {
            endpoint: format!("{}/api/coding/paas/v4/chat/completions", server.url()),
            model: "glm-4.7".to_string(),
            api_key: "zk-test".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_prompt_puts_instruction_first() {
        let prompt = build_prompt("File: a.py\n+x\n\n");
        assert!(prompt.starts_with(REVIEW_INSTRUCTION));
        assert!(prompt.ends_with(":\n\nFile: a.py\n+x\n\n"));
    }

    #[tokio::test]
    async fn test_request_review_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/coding/paas/v4/chat/completions")
            .match_header("authorization", "Bearer zk-test")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "model": "glm-4.7",
                "messages": [{"role": "user", "content": build_prompt("File: a.py\n+y\n\n")}]
            })))
            .with_status(200)
            .with_body(
                r#"{
                    "model": "glm-4.7",
                    "choices": [
                        {"index": 0, "message": {"role": "assistant", "content": "first"}},
                        {"index": 1, "message": {"role": "assistant", "content": "second"}}
                    ],
                    "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
                }"#,
            )
            .create_async()
            .await;

        let review = client_for(&server)
            .request_review("File: a.py\n+y\n\n")
            .await
            .unwrap();
        assert_eq!(review, "first");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_choices_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/coding/paas/v4/chat/completions")
            .with_status(200)
            .with_body(r#"{"id": "abc", "created": 1}"#)
            .create_async()
            .await;

        let err = client_for(&server).request_review("diff").await.unwrap_err();
        assert!(matches!(err, ReviewError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/coding/paas/v4/chat/completions")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = client_for(&server).request_review("diff").await.unwrap_err();
        assert!(matches!(err, ReviewError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/coding/paas/v4/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "rate limited"}}"#)
            .create_async()
            .await;

        let err = client_for(&server).request_review("diff").await.unwrap_err();
        assert!(
            matches!(err, ReviewError::Status { status, .. } if status == StatusCode::TOO_MANY_REQUESTS)
        );
    }
}
