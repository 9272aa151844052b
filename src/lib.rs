//! # paperlens
//!
//! Read academic PDFs with AI: structured reading notes, formula extraction
//! from images, chart analysis, and follow-up Q&A against the paper's text —
//! with completed analyses cached in a local history.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ extract   read the embedded text layer, page markers kept
//!  ├─ chunk     overlapping windows sized to the model input budget
//!  ├─ gateway   chat-completions calls, primary model → fallback model
//!  ├─ polish    deterministic cleanup of model-produced markdown
//!  └─ history   completed analyses persisted locally, newest first
//!
//! image bytes ─ encode (base64 data URI) ─▶ gateway (vision model)
//! ```
//!
//! The preview renderer ([`preview::PagePreview`]) sits apart from this
//! flow: it rasterises pages to PNG on demand for display and feeds nothing
//! downstream.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paperlens::{AnalysisConfig, FileStore, Gateway};
//! use paperlens::pipeline::extract::extract_text_async;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileStore::open_default()?);
//!     let gateway = Gateway::new(AnalysisConfig::default(), store)?;
//!
//!     let bytes = std::fs::read("paper.pdf")?;
//!     let doc = extract_text_async(bytes).await?;
//!     let note = paperlens::generate_note(&gateway, &doc.text, Some("paper.pdf")).await?;
//!     println!("{note}");
//!     Ok(())
//! }
//! ```
//!
//! ## Design at a glance
//!
//! * **One seam to the model** — every operation goes through the
//!   [`gateway::ChatBackend`] trait; tests script it, production speaks
//!   HTTP. A failed primary-model call is retried exactly once against the
//!   configured fallback model.
//! * **Injected persistence** — the API credential and the history are read
//!   and written through [`store::KeyValueStore`]; swap in
//!   [`store::MemoryStore`] and nothing touches disk.
//! * **Strictly sequential chunking** — a long paper's note is generated
//!   one chunk at a time, in order, and any chunk failure aborts the whole
//!   note rather than persisting a partial one.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `paperlens` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! paperlens = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod history;
pub mod ops;
pub mod pipeline;
pub mod preview;
pub mod prompts;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use credential::CredentialStore;
pub use error::LensError;
pub use gateway::{ChatBackend, Gateway, HttpBackend};
pub use history::{ChatMessage, HistoryContent, HistoryItem, HistoryKind, HistoryStore, Role};
pub use ops::{analyze_chart, answer_question, extract_formula, generate_note, note_stream,
    ChunkNote, FormulaResult};
pub use pipeline::extract::ExtractedDocument;
pub use preview::PagePreview;
pub use store::{FileStore, KeyValueStore, MemoryStore};
