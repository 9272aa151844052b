//! Document pipeline stages.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets us swap an
//! implementation (e.g. the extraction backend) without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! PDF bytes ──▶ extract ──▶ chunk ──▶ (gateway) ──▶ polish
//!               (text layer) (windows)  (model)     (cleanup)
//!
//! image bytes ──▶ encode ──▶ (gateway)
//!                 (data URI)
//! ```
//!
//! 1. [`extract`] — read the embedded text layer with per-page markers;
//!    CPU-bound, runs under `spawn_blocking` from async callers
//! 2. [`chunk`]   — overlapping char windows sized to the model input budget
//! 3. [`encode`]  — wrap binary payloads as base64 data URIs for the
//!    multimodal request body
//! 4. [`polish`]  — deterministic cleanup of model-produced text quirks

pub mod chunk;
pub mod encode;
pub mod extract;
pub mod polish;
