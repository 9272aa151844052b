//! Error types for the paperlens library.
//!
//! Everything user-facing funnels through one enum, [`LensError`], so the CLI
//! (and any embedding application) can print a single human-readable message
//! per failure. The variants mirror the failure modes of the pipeline:
//!
//! * credential problems are surfaced before any network traffic;
//! * a model-call failure is reported with the model that ultimately failed
//!   (the *fallback* model, since the primary's failure was already absorbed
//!   by the retry step);
//! * strict-JSON operations (formula extraction) fail loudly rather than
//!   surfacing a half-parsed result.

use thiserror::Error;

/// All errors returned by the paperlens library.
#[derive(Debug, Error)]
pub enum LensError {
    // ── Credential errors ─────────────────────────────────────────────────
    /// No API key configured. Never retried.
    #[error("No API key configured.\nSet one with: paperlens key set <KEY>  (or the PAPERLENS_API_KEY env var)")]
    MissingCredential,

    // ── Model-call errors ─────────────────────────────────────────────────
    /// Network failure or non-2xx status from a model call. The gateway
    /// retries once against the fallback model before surfacing this.
    #[error("Model request failed ({model}): {reason}")]
    ProviderRequestFailed { model: String, reason: String },

    /// The provider returned success but no usable text.
    #[error("Model returned an empty response ({model})")]
    EmptyResponse { model: String },

    /// A response expected to be strict JSON could not be parsed or lacked
    /// the required fields. Fatal, not retried.
    #[error("AI returned an unexpected format: {detail}")]
    MalformedResult { detail: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// The PDF could not be opened or decoded.
    #[error("Could not read the PDF: {detail}\nTry re-exporting the file or using a smaller one.")]
    PdfParseError { detail: String },

    /// Chat was invoked with no extracted document text.
    #[error("No document text to chat against — load a PDF with a text layer first")]
    EmptyDocumentContext,

    /// Page preview rasterisation failed.
    #[error("Preview render failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    // ── Ambient errors ────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local persistence (key or history store) failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_the_fix() {
        let msg = LensError::MissingCredential.to_string();
        assert!(msg.contains("key set"), "got: {msg}");
    }

    #[test]
    fn provider_failure_display() {
        let e = LensError::ProviderRequestFailed {
            model: "gpt-4o-mini".into(),
            reason: "HTTP 503".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("gpt-4o-mini"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn malformed_result_display() {
        let e = LensError::MalformedResult {
            detail: "expected JSON object".into(),
        };
        assert!(e.to_string().contains("unexpected format"));
    }

    #[test]
    fn empty_document_display() {
        let msg = LensError::EmptyDocumentContext.to_string();
        assert!(msg.contains("document text"));
    }
}
