//! Reading-note generation: extracted paper text → structured Markdown note.
//!
//! Long papers are chunked (see [`crate::pipeline::chunk`]) and each chunk
//! becomes one model call. Calls run **strictly sequentially in chunk
//! order** — chunk N+1 is not started until chunk N's note is in hand — so
//! the assembled note is deterministic and the upstream provider sees at
//! most one in-flight request. A failure on any chunk aborts the whole
//! operation; partial notes are never returned or persisted.
//!
//! Two entry points, mirroring the eager/streaming split elsewhere in the
//! crate: [`generate_note`] waits for the full note, [`note_stream`] yields
//! each chunk's note as it completes (progress bars, incremental display).

use crate::error::LensError;
use crate::gateway::{Gateway, Message};
use crate::pipeline::{chunk::chunk_text, polish};
use crate::prompts::{note_chunk_request, NOTE_HEADING, NOTE_SYSTEM_PROMPT};
use std::pin::Pin;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

/// The note for one chunk, as yielded by [`note_stream`].
#[derive(Debug, Clone)]
pub struct ChunkNote {
    /// 0-based chunk index.
    pub index: usize,
    /// Total number of chunks in this document.
    pub total: usize,
    /// Cleaned markdown for this chunk.
    pub markdown: String,
}

/// A boxed stream of per-chunk notes, in chunk order.
pub type NoteStream<'a> = Pin<Box<dyn Stream<Item = Result<ChunkNote, LensError>> + Send + 'a>>;

/// Generate a full reading note for extracted document text.
///
/// Returns the per-chunk notes concatenated in chunk order under a single
/// synthetic top-level heading.
pub async fn generate_note(
    gateway: &Gateway,
    text: &str,
    file_name: Option<&str>,
) -> Result<String, LensError> {
    let mut stream = note_stream(gateway, text);
    let mut parts = Vec::new();
    while let Some(chunk_note) = stream.next().await {
        parts.push(chunk_note?.markdown);
    }

    let heading = match file_name {
        Some(name) => format!("{NOTE_HEADING} — {name}"),
        None => NOTE_HEADING.to_string(),
    };
    info!("note assembled from {} chunk(s)", parts.len());
    Ok(format!("{}\n\n{}", heading, parts.join("\n")))
}

/// Stream per-chunk notes as they complete, strictly in chunk order.
///
/// The returned stream is lazy: chunk N+1's request is only issued after
/// chunk N's item has been yielded. Dropping the stream after a failed item
/// is how callers abort — no later chunk has been started.
pub fn note_stream<'a>(gateway: &'a Gateway, text: &str) -> NoteStream<'a> {
    let config = gateway.config();
    let chunks = chunk_text(text, config.chunk_size, config.chunk_overlap);
    let total = chunks.len();
    debug!("document split into {total} chunk(s)");

    Box::pin(
        tokio_stream::iter(chunks.into_iter().enumerate()).then(move |(index, chunk)| {
            async move {
                let messages = [
                    Message::system(NOTE_SYSTEM_PROMPT),
                    Message::user(note_chunk_request(index, total, &chunk)),
                ];
                let raw = gateway.complete_text(&messages, &gateway.options()).await?;
                debug!("chunk {}/{} noted ({} chars)", index + 1, total, raw.len());
                Ok(ChunkNote {
                    index,
                    total,
                    markdown: polish::clean_markdown(&raw),
                })
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::gateway::{ChatBackend, CompletionOptions};
    use crate::store::{KeyValueStore, MemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Echoes a numbered note per call and records prompt order.
    struct Echo {
        seen: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ChatBackend for Echo {
        async fn complete(
            &self,
            _credential: &str,
            _model: &str,
            messages: &[Message],
            _options: &CompletionOptions,
        ) -> Result<String, LensError> {
            let n = self.in_flight.fetch_add(1, Ordering::SeqCst);
            assert_eq!(n, 0, "chunk calls must never overlap");
            let user = match &messages[1].content {
                crate::gateway::MessageContent::Text(t) => t.clone(),
                other => panic!("expected text content, got {other:?}"),
            };
            let count = {
                let mut seen = self.seen.lock().unwrap();
                seen.push(user);
                seen.len()
            };
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("note {count}"))
        }
    }

    fn gateway(chunk_size: usize, overlap: usize) -> (Gateway, Arc<Echo>) {
        let store = Arc::new(MemoryStore::new());
        store.set("api_key", "sk").unwrap();
        let backend = Arc::new(Echo {
            seen: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        });
        let config = AnalysisConfig::builder()
            .chunk_size(chunk_size)
            .chunk_overlap(overlap)
            .build()
            .unwrap();
        (
            Gateway::with_backend(config, store, backend.clone()),
            backend,
        )
    }

    #[tokio::test]
    async fn chunks_are_processed_in_order() {
        let (gateway, backend) = gateway(40, 10);
        let text = "a".repeat(100);

        let note = generate_note(&gateway, &text, Some("paper.pdf")).await.unwrap();

        let seen = backend.seen.lock().unwrap();
        assert!(seen.len() > 1, "long text should chunk");
        for (i, prompt) in seen.iter().enumerate() {
            assert!(
                prompt.contains(&format!("Part {} of {}", i + 1, seen.len())),
                "prompt {i} out of order: {prompt}"
            );
        }
        assert!(note.starts_with("# Reading Notes — paper.pdf"));
        assert!(note.contains("note 1"));
    }

    #[tokio::test]
    async fn short_text_is_a_single_call() {
        let (gateway, backend) = gateway(500, 50);
        generate_note(&gateway, "short text", None).await.unwrap();
        assert_eq!(backend.seen.lock().unwrap().len(), 1);
    }
}
