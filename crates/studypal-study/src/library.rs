//! Saved library: notes and past-paper questions persisted through a
//! [`KeyValueStore`].
//!
//! Values are stored as JSON under the same keys the browser edition uses,
//! so exported data can be dropped into the data directory unchanged.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use studypal_core::{
    defaults, Error, KeyValueStore, PastPaperQuestion, Result, SavedNote, SavedPastPapers,
};

/// Maximum characters of a title derived from note content.
const DERIVED_TITLE_CHARS: usize = 60;

// =============================================================================
// STORES
// =============================================================================

/// In-process store, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Data directory from `STUDYPAL_DATA_DIR`, defaulting to `./.studypal`.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("STUDYPAL_DATA_DIR").unwrap_or_else(|_| defaults::DATA_DIR.to_string()),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::InvalidArgument(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        // Replace atomically: write a sibling temp file, then rename.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(key, path = %path.display(), bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// LIBRARY
// =============================================================================

/// Title from the first non-blank line of the content.
pub fn derive_title(content: &str) -> String {
    let line = content
        .lines()
        .map(|l| l.trim().trim_start_matches('#').trim())
        .find(|l| !l.is_empty())
        .unwrap_or("Untitled note");
    let mut title: String = line.chars().take(DERIVED_TITLE_CHARS).collect();
    if line.chars().count() > DERIVED_TITLE_CHARS {
        title.push('…');
    }
    title
}

/// Saved notes and past papers.
pub struct Library<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Library<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load a JSON value; missing or corrupt values read as the default.
    async fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key, error = %e, "Stored data is corrupt, treating as empty");
                Ok(T::default())
            }
        }
    }

    async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw).await
    }

    /// All saved notes, newest first.
    pub async fn notes(&self) -> Result<Vec<SavedNote>> {
        self.load(defaults::SAVED_NOTES_KEY).await
    }

    /// Save a note; a missing title is derived from the first line.
    #[instrument(skip(self, content), fields(subsystem = "study", component = "library", op = "save_note"))]
    pub async fn save_note(
        &self,
        title: Option<&str>,
        subject: Option<&str>,
        content: &str,
    ) -> Result<SavedNote> {
        if content.trim().is_empty() {
            return Err(Error::InvalidArgument("cannot save an empty note".to_string()));
        }
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| derive_title(content));
        let note = SavedNote::new(title, subject.map(str::to_string), content);

        let mut notes = self.notes().await?;
        notes.insert(0, note.clone());
        self.save(defaults::SAVED_NOTES_KEY, &notes).await?;
        info!(note_id = %note.id, note_count = notes.len(), "Note saved");
        Ok(note)
    }

    /// Look up a note by id.
    pub async fn note(&self, id: &str) -> Result<SavedNote> {
        self.notes()
            .await?
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("note {}", id)))
    }

    /// Delete a note by id.
    pub async fn delete_note(&self, id: &str) -> Result<()> {
        let mut notes = self.notes().await?;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(Error::NotFound(format!("note {}", id)));
        }
        self.save(defaults::SAVED_NOTES_KEY, &notes).await?;
        info!(note_id = id, "Note deleted");
        Ok(())
    }

    /// Saved past papers keyed by subject.
    pub async fn past_papers(&self) -> Result<SavedPastPapers> {
        self.load(defaults::SAVED_PAPERS_KEY).await
    }

    /// Append questions for a subject, skipping ones already saved with the
    /// same question text. Returns the number added.
    #[instrument(skip(self, items), fields(subsystem = "study", component = "library", op = "add_past_papers", item_count = items.len()))]
    pub async fn add_past_papers(&self, subject: &str, items: &[PastPaperQuestion]) -> Result<usize> {
        let mut papers = self.past_papers().await?;
        let existing = papers.entry(subject.to_string()).or_default();

        let mut added = 0;
        for item in items {
            if !existing.iter().any(|q| q.question == item.question) {
                existing.push(item.clone());
                added += 1;
            }
        }
        if added == 0 {
            debug!("No new past paper questions to save");
            return Ok(0);
        }
        self.save(defaults::SAVED_PAPERS_KEY, &papers).await?;
        info!(added, "Past paper questions saved");
        Ok(added)
    }

    /// Remove every saved past-paper question.
    pub async fn clear_past_papers(&self) -> Result<()> {
        self.store.remove(defaults::SAVED_PAPERS_KEY).await
    }
}
