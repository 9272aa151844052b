//! The four analysis operations, built on the gateway contract.
//!
//! | Operation | Model pair | Shape |
//! |-----------|-----------|-------|
//! | [`formula::extract_formula`] | vision | single call, strict JSON |
//! | [`note::generate_note`]      | text   | one call per chunk, sequential |
//! | [`chart::analyze_chart`]     | vision | single call, markdown |
//! | [`chat::answer_question`]    | text   | single call, markdown |
//!
//! Every operation shares the gateway behaviours (fresh credential read,
//! primary→fallback retry) and differs only in prompt, payload, and how the
//! response text is interpreted.

pub mod chart;
pub mod chat;
pub mod formula;
pub mod note;

pub use chart::analyze_chart;
pub use chat::answer_question;
pub use formula::{extract_formula, FormulaResult};
pub use note::{generate_note, note_stream, ChunkNote, NoteStream};
