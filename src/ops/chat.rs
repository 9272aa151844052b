//! Document Q&A: one chat turn grounded in the extracted paper text.
//!
//! The whole turn travels as a single user message: the document excerpt
//! (cut to the configured character ceiling, with a marker when cut), the
//! prior transcript rendered as alternating `user:`/`assistant:` lines, and
//! the new question. Embedding the transcript as text rather than as API
//! message history keeps the request shape identical regardless of how long
//! the conversation gets, and lets the document ceiling dominate sizing.

use crate::error::LensError;
use crate::gateway::{Gateway, Message};
use crate::history::{ChatMessage, Role};
use crate::pipeline::polish;
use crate::prompts::{CHAT_SYSTEM_PROMPT, TRUNCATION_MARKER};
use tracing::info;

/// Answer one question about a document.
///
/// Fails with [`LensError::EmptyDocumentContext`] — before any network
/// call — when `document_text` holds no usable text.
pub async fn answer_question(
    gateway: &Gateway,
    document_text: &str,
    transcript: &[ChatMessage],
    question: &str,
) -> Result<String, LensError> {
    if document_text.trim().is_empty() {
        return Err(LensError::EmptyDocumentContext);
    }

    let ceiling = gateway.config().chat_context_chars;
    let context = build_turn(document_text, transcript, question, ceiling);
    let messages = [Message::system(CHAT_SYSTEM_PROMPT), Message::user(context)];

    let raw = gateway.complete_text(&messages, &gateway.options()).await?;
    info!("chat turn answered ({} chars)", raw.len());
    Ok(polish::clean_markdown(&raw))
}

/// Assemble the single user message for a chat turn.
fn build_turn(
    document_text: &str,
    transcript: &[ChatMessage],
    question: &str,
    ceiling: usize,
) -> String {
    let excerpt: String = if document_text.chars().count() > ceiling {
        let cut: String = document_text.chars().take(ceiling).collect();
        format!("{cut}{TRUNCATION_MARKER}")
    } else {
        document_text.to_string()
    };

    let mut turn = format!("Document excerpt:\n\"\"\"\n{excerpt}\n\"\"\"\n\n");

    if !transcript.is_empty() {
        turn.push_str("Conversation so far:\n");
        for message in transcript {
            let speaker = match message.role {
                Role::User => "user",
                Role::Model => "assistant",
            };
            turn.push_str(&format!("{speaker}: {}\n", message.text));
        }
        turn.push('\n');
    }

    turn.push_str(&format!("Question: {question}"));
    turn
}
