//! The history store: persisted records of completed analyses.
//!
//! The whole history is one JSON blob under a single key, most-recent
//! first. Every mutation is load-entire-list → mutate → persist-entire-list;
//! with a single user and a single process that is all the coordination the
//! data needs, and last-write-wins is acceptable if two writers ever race.

use crate::error::LensError;
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const HISTORY_KEY: &str = "history";

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One immutable message in a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// What kind of analysis a history item records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Note,
    Chart,
    Chat,
}

/// The payload of a history item: markdown text for notes and chart
/// analyses, a full transcript for chats. Stored at full fidelity — no
/// truncation is applied when persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryContent {
    Text(String),
    Transcript(Vec<ChatMessage>),
}

/// One persisted record of a completed analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Unique id; re-inserting an existing id replaces the old entry.
    pub id: String,
    pub kind: HistoryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub content: HistoryContent,
    /// Short excerpt of the source document, for list display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_preview: Option<String>,
}

impl HistoryItem {
    fn new(kind: HistoryKind, file_name: Option<String>, content: HistoryContent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            file_name,
            timestamp: Utc::now(),
            content,
            source_preview: None,
        }
    }

    pub fn note(file_name: Option<String>, markdown: impl Into<String>) -> Self {
        Self::new(HistoryKind::Note, file_name, HistoryContent::Text(markdown.into()))
    }

    pub fn chart(file_name: Option<String>, markdown: impl Into<String>) -> Self {
        Self::new(HistoryKind::Chart, file_name, HistoryContent::Text(markdown.into()))
    }

    pub fn chat(file_name: Option<String>, transcript: Vec<ChatMessage>) -> Self {
        Self::new(HistoryKind::Chat, file_name, HistoryContent::Transcript(transcript))
    }

    pub fn with_source_preview(mut self, preview: impl Into<String>) -> Self {
        self.source_preview = Some(preview.into());
        self
    }
}

/// Append/list/delete access to the analysis history.
#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn load(&self) -> Result<Vec<HistoryItem>, LensError> {
        match self.store.get(HISTORY_KEY)? {
            None => Ok(Vec::new()),
            Some(blob) => serde_json::from_str(&blob)
                .map_err(|e| LensError::Store(format!("history blob is corrupt: {e}"))),
        }
    }

    fn persist(&self, items: &[HistoryItem]) -> Result<(), LensError> {
        let blob = serde_json::to_string(items)
            .map_err(|e| LensError::Store(format!("serialise history: {e}")))?;
        self.store.set(HISTORY_KEY, &blob)
    }

    /// Insert an item at the front of the list. If an item with the same id
    /// already exists it is removed first, so the re-inserted item moves to
    /// the most-recent position and each id appears exactly once.
    pub fn insert(&self, item: HistoryItem) -> Result<(), LensError> {
        let mut items = self.load()?;
        items.retain(|existing| existing.id != item.id);
        items.insert(0, item);
        self.persist(&items)?;
        debug!("history now holds {} items", items.len());
        Ok(())
    }

    /// All items, most-recent first.
    pub fn list(&self) -> Result<Vec<HistoryItem>, LensError> {
        self.load()
    }

    /// Look up a single item by id.
    pub fn get(&self, id: &str) -> Result<Option<HistoryItem>, LensError> {
        Ok(self.load()?.into_iter().find(|item| item.id == id))
    }

    /// Delete an item by id. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool, LensError> {
        let mut items = self.load()?;
        let before = items.len();
        items.retain(|item| item.id != id);
        let removed = items.len() < before;
        if removed {
            self.persist(&items)?;
        }
        Ok(removed)
    }

    /// Remove every item.
    pub fn clear(&self) -> Result<(), LensError> {
        self.store.remove(HISTORY_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store() -> HistoryStore {
        HistoryStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn newest_first() {
        let history = store();
        history.insert(HistoryItem::note(None, "first")).unwrap();
        history.insert(HistoryItem::note(None, "second")).unwrap();

        let items = history.list().unwrap();
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0].content, HistoryContent::Text(t) if t == "second"));
    }

    #[test]
    fn reinserting_an_id_replaces_and_moves_to_front() {
        let history = store();
        let mut a = HistoryItem::note(Some("a.pdf".into()), "old note");
        a.id = "fixed-id".into();
        history.insert(a).unwrap();
        history.insert(HistoryItem::chart(None, "chart")).unwrap();

        let mut a2 = HistoryItem::note(Some("a.pdf".into()), "new note");
        a2.id = "fixed-id".into();
        history.insert(a2).unwrap();

        let items = history.list().unwrap();
        assert_eq!(items.len(), 2, "one entry per id");
        assert_eq!(items[0].id, "fixed-id");
        assert!(matches!(&items[0].content, HistoryContent::Text(t) if t == "new note"));
    }

    #[test]
    fn delete_and_clear() {
        let history = store();
        let item = HistoryItem::note(None, "n");
        let id = item.id.clone();
        history.insert(item).unwrap();

        assert!(history.delete(&id).unwrap());
        assert!(!history.delete(&id).unwrap());

        history.insert(HistoryItem::note(None, "x")).unwrap();
        history.clear().unwrap();
        assert!(history.list().unwrap().is_empty());
    }

    #[test]
    fn transcript_roundtrips_through_json() {
        let history = store();
        let transcript = vec![ChatMessage::user("what is eq. 3?"), ChatMessage::model("it is…")];
        history
            .insert(HistoryItem::chat(Some("paper.pdf".into()), transcript))
            .unwrap();

        let items = history.list().unwrap();
        match &items[0].content {
            HistoryContent::Transcript(msgs) => {
                assert_eq!(msgs.len(), 2);
                assert_eq!(msgs[0].role, Role::User);
                assert_eq!(msgs[1].role, Role::Model);
            }
            other => panic!("expected transcript, got {other:?}"),
        }
    }
}
