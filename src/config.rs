//! Configuration types for document analysis.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config between operations, log it, and diff two runs
//! to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::LensError;
use serde::{Deserialize, Serialize};

/// Configuration for paperlens operations.
///
/// Built via [`AnalysisConfig::builder()`] or [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use paperlens::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .text_model("gpt-4.1-nano")
///     .chunk_size(4000)
///     .chunk_overlap(200)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Base URL of the chat-completions-style endpoint. Default:
    /// `https://api.openai.com/v1`. Any OpenAI-compatible gateway works.
    pub base_url: String,

    /// Primary vision model (formula extraction, chart analysis).
    pub vision_model: String,

    /// Fallback vision model, tried once after the primary fails.
    pub vision_fallback: String,

    /// Primary text model (reading notes, document Q&A).
    pub text_model: String,

    /// Fallback text model, tried once after the primary fails.
    pub text_fallback: String,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Low temperature keeps the model faithful to the source document —
    /// notes and formula transcriptions should not be creative. Raise it
    /// only if you want chattier chart narratives.
    pub temperature: f32,

    /// Maximum tokens the model may generate per call. Default: 4096.
    ///
    /// A dense paper section can produce well over 2 000 note tokens.
    /// Setting this too low silently truncates output mid-sentence.
    pub max_tokens: usize,

    /// Target chunk size in characters for long documents. Default: 6000.
    ///
    /// Each chunk becomes one model call, so the value trades request count
    /// against per-request input size. 6 000 chars (~1 500 tokens) leaves
    /// generous headroom under every mainstream context window.
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters. Default: 300.
    ///
    /// The overlap region gives the model enough trailing context to finish
    /// a sentence or table that straddles a chunk boundary. Must be strictly
    /// smaller than `chunk_size`; validated by `build()`.
    pub chunk_overlap: usize,

    /// Character ceiling for the document text embedded in a chat turn.
    /// Default: 12 000. Text beyond the ceiling is cut and a truncation
    /// marker is appended so the model knows it saw a prefix.
    pub chat_context_chars: usize,

    /// Scale factor for preview page rasterisation. Default: 1.5.
    pub preview_scale: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            vision_model: "gpt-4.1-mini".to_string(),
            vision_fallback: "gpt-4.1-nano".to_string(),
            text_model: "gpt-4.1-mini".to_string(),
            text_fallback: "gpt-4.1-nano".to_string(),
            temperature: 0.2,
            max_tokens: 4096,
            chunk_size: 6000,
            chunk_overlap: 300,
            chat_context_chars: 12_000,
            preview_scale: 1.5,
        }
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.vision_model = model.into();
        self
    }

    pub fn vision_fallback(mut self, model: impl Into<String>) -> Self {
        self.config.vision_fallback = model.into();
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.config.text_model = model.into();
        self
    }

    pub fn text_fallback(mut self, model: impl Into<String>) -> Self {
        self.config.text_fallback = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn chunk_size(mut self, chars: usize) -> Self {
        self.config.chunk_size = chars;
        self
    }

    pub fn chunk_overlap(mut self, chars: usize) -> Self {
        self.config.chunk_overlap = chars;
        self
    }

    pub fn chat_context_chars(mut self, chars: usize) -> Self {
        self.config.chat_context_chars = chars;
        self
    }

    pub fn preview_scale(mut self, scale: f32) -> Self {
        self.config.preview_scale = scale.clamp(0.25, 4.0);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, LensError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(LensError::InvalidConfig("chunk_size must be ≥ 1".into()));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(LensError::InvalidConfig(format!(
                "chunk_overlap ({}) must be strictly smaller than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.chat_context_chars == 0 {
            return Err(LensError::InvalidConfig(
                "chat_context_chars must be ≥ 1".into(),
            ));
        }
        if c.base_url.is_empty() {
            return Err(LensError::InvalidConfig("base_url must not be empty".into()));
        }
        Ok(self.config)
    }
}
