//! The reqwest-backed [`ChatBackend`].
//!
//! One POST per call to `{base_url}/chat/completions` with a bearer token.
//! No request timeout is configured: a hung call blocks only its own
//! logical flow, and the caller decides how long it is willing to wait.

use super::wire;
use super::{ChatBackend, CompletionOptions, Message};
use crate::error::LensError;
use async_trait::async_trait;
use tracing::debug;

/// HTTP implementation of [`ChatBackend`] for chat-completions-style APIs.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a backend for the given base URL (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, LensError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LensError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn complete(
        &self,
        credential: &str,
        model: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, LensError> {
        let body = wire::ChatRequest {
            model,
            messages,
            stream: false,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: options
                .json_response
                .then(wire::ResponseFormat::json_object),
        };

        debug!("POST {} model={}", self.endpoint(), model);
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {credential}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| LensError::ProviderRequestFailed {
                model: model.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LensError::ProviderRequestFailed {
                model: model.to_string(),
                reason: format!("HTTP {}: {}", status.as_u16(), wire::error_message(&body)),
            });
        }

        let parsed: wire::ChatResponse =
            response
                .json()
                .await
                .map_err(|e| LensError::ProviderRequestFailed {
                    model: model.to_string(),
                    reason: format!("malformed response body: {e}"),
                })?;

        match wire::first_text(parsed) {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LensError::EmptyResponse {
                model: model.to_string(),
            }),
        }
    }
}
