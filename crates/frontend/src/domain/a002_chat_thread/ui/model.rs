//! Chat Thread - Model (chat service client)

use async_trait::async_trait;
use contracts::domain::a002_chat_thread::service::{ChatRequest, ChatResponse, ChatService};
use contracts::shared::api_error::{ErrorFields, ServiceError};

use crate::shared::api_utils::post_json_with_auth;

/// HTTP client of the remote chat endpoint.
#[derive(Clone, Debug)]
pub struct ChatApi {
    url: String,
}

impl ChatApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait(?Send)]
impl ChatService for ChatApi {
    async fn ask(
        &self,
        request: &ChatRequest,
        credential: &str,
    ) -> Result<ChatResponse, ServiceError> {
        let text = post_json_with_auth(
            &self.url,
            request,
            credential,
            ErrorFields::DetailOnly,
            "Chat request failed",
        )
        .await?;
        serde_json::from_str(&text)
            .map_err(|e| ServiceError::Decode(format!("Failed to parse chat response: {}", e)))
    }
}
