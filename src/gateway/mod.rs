//! The AI gateway: domain requests → provider calls → normalized text.
//!
//! Everything that talks to a model goes through one seam, the
//! [`ChatBackend`] trait. Production code uses the reqwest-backed
//! [`HttpBackend`]; tests substitute a scripted implementation and never
//! open a socket. On top of the seam, [`Gateway`] adds the two behaviours
//! every operation shares: the credential is read fresh from the key store
//! at the start of each request, and a failed primary-model call is retried
//! exactly once against the fallback model before the error surfaces.

pub mod client;
pub mod http;
pub mod wire;

pub use client::Gateway;
pub use http::HttpBackend;

use crate::error::LensError;
use async_trait::async_trait;
use serde::Serialize;

// ── Request message types ────────────────────────────────────────────────

/// One message in a model request: a role plus either plain text or an
/// ordered list of typed parts (text, inline image, inline file).
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: MessageContent,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(parts),
        }
    }
}

/// String-or-parts content union, serialised exactly as the wire expects:
/// a JSON string, or an array of `{type, …}` objects.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A typed part of a multimodal user message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
    File { file: FilePayload },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// An inline image carried as a base64 data URI.
    pub fn image(data_uri: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: data_uri.into(),
            },
        }
    }

    /// An inline file (e.g. a PDF) carried as a base64 data URI.
    pub fn file(data_uri: impl Into<String>, mime_type: Option<String>, name: Option<String>) -> Self {
        ContentPart::File {
            file: FilePayload {
                url: data_uri.into(),
                mime_type,
                name,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilePayload {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ── Per-call tuning ──────────────────────────────────────────────────────

/// Optional per-call tuning passed through to the provider.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: Option<usize>,
    /// Ask the provider to emit a strict JSON object (formula extraction).
    pub json_response: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: None,
            json_response: false,
        }
    }
}

// ── The backend seam ─────────────────────────────────────────────────────

/// A chat-completions backend able to run one model call.
///
/// Implementations must return *normalized, non-empty* text: string-or-parts
/// response shapes are flattened, and a success status carrying only
/// whitespace is an [`LensError::EmptyResponse`], never `Ok`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(
        &self,
        credential: &str,
        model: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, LensError>;
}
