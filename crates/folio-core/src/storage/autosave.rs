//! Debounced autosave.
//!
//! Every edit calls [`AutoSaveManager::mark_dirty`]. The host polls
//! [`AutoSaveManager::maybe_save`] (e.g. once per frame or timer tick); it
//! writes only after the document has stayed unchanged for the quiet period,
//! so a burst of edits produces one save.
//!
//! The session helpers save the undo stack next to the document, so a
//! reopened editor can still undo edits made before the restart.

use crate::config::EditorConfig;
use crate::document::ResumeConfig;
use crate::editor::Editor;
use crate::history::HistoryEntry;
use crate::storage::{Storage, StorageError, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Key under which the most recently saved document is mirrored.
pub const LAST_DOCUMENT_KEY: &str = "__last_document__";

/// Metadata key holding the id the mirrored document was saved under.
pub const LAST_DOCUMENT_ID_KEY: &str = "__last_document_id__";

/// Metadata key of the undo history saved for document `id`.
pub fn history_key(id: &str) -> String {
    format!("{}__history", id)
}

/// Saves a document once edits have settled.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    /// How long the document must stay unchanged before a save.
    quiet_period: Duration,
    /// Time of the most recent unsaved change.
    last_change: Option<Instant>,
    last_save: Option<Instant>,
    /// Id the document is saved under. Falls back to the document's own id.
    current_doc_id: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self::from_config(storage, &EditorConfig::default())
    }

    pub fn from_config(storage: Arc<S>, config: &EditorConfig) -> Self {
        Self {
            storage,
            quiet_period: config.autosave_quiet_period(),
            last_change: None,
            last_save: None,
            current_doc_id: None,
        }
    }

    pub fn set_quiet_period(&mut self, quiet_period: Duration) {
        self.quiet_period = quiet_period;
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Note an edit. Restarts the quiet period.
    pub fn mark_dirty(&mut self) {
        self.last_change = Some(Instant::now());
    }

    /// Whether there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.last_change.is_some()
    }

    /// When the document was last written, if ever.
    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    pub fn set_document_id(&mut self, id: Option<String>) {
        self.current_doc_id = id;
    }

    pub fn document_id(&self) -> Option<&str> {
        self.current_doc_id.as_deref()
    }

    /// True once there are unsaved changes and none has happened for the
    /// quiet period.
    pub fn should_save(&self) -> bool {
        self.last_change
            .is_some_and(|changed| changed.elapsed() >= self.quiet_period)
    }

    /// Save if the quiet period has elapsed since the last change.
    /// Returns true if a save was performed.
    pub async fn maybe_save(&mut self, document: &ResumeConfig) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }

        self.save(document).await?;
        Ok(true)
    }

    /// Id `document` is saved under.
    fn save_key(&self, document: &ResumeConfig) -> String {
        self.current_doc_id
            .clone()
            .unwrap_or_else(|| document.id.clone())
    }

    /// Save immediately, regardless of the quiet period.
    pub async fn save(&mut self, document: &ResumeConfig) -> StorageResult<()> {
        let doc_id = self.save_key(document);

        self.storage.save(&doc_id, document).await?;
        self.storage.save(LAST_DOCUMENT_KEY, document).await?;
        let pointer = serde_json::to_string(&doc_id)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.save_meta(LAST_DOCUMENT_ID_KEY, &pointer).await?;

        self.last_save = Some(Instant::now());
        self.last_change = None;
        log::info!("Saved document {}", doc_id);

        Ok(())
    }

    /// Load a document and make it the one being saved.
    pub async fn load(&mut self, id: &str) -> StorageResult<ResumeConfig> {
        let doc = self.storage.load(id).await?;
        self.current_doc_id = Some(id.to_string());
        self.last_change = None;
        self.last_save = Some(Instant::now());
        log::info!("Loaded document {}", id);
        Ok(doc)
    }

    /// Load the most recently saved document, if there is one, and keep
    /// saving it under the id it was last saved under.
    pub async fn load_last(&mut self) -> Option<ResumeConfig> {
        let doc = match self.storage.load(LAST_DOCUMENT_KEY).await {
            Ok(doc) => doc,
            Err(e) => {
                log::debug!("No last document to restore: {}", e);
                return None;
            }
        };

        let saved_as = match self.storage.load_meta(LAST_DOCUMENT_ID_KEY).await {
            Ok(Some(json)) => serde_json::from_str::<String>(&json)
                .map_err(|e| log::warn!("Ignoring unreadable last document id: {}", e))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to read last document id: {}", e);
                None
            }
        };

        let doc_id = saved_as.unwrap_or_else(|| doc.id.clone());
        log::info!("Restored last document {}", doc_id);
        self.current_doc_id = Some(doc_id);
        self.last_change = None;
        self.last_save = Some(Instant::now());
        Some(doc)
    }

    /// Persist the undo stack of the document saved under `id`.
    pub async fn save_history(&self, id: &str, past: &[HistoryEntry]) -> StorageResult<()> {
        let json =
            serde_json::to_string(past).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.save_meta(&history_key(id), &json).await
    }

    /// Undo stack saved for `id`, oldest first. Empty if none was saved.
    pub async fn load_history(&self, id: &str) -> StorageResult<Vec<HistoryEntry>> {
        match self.storage.load_meta(&history_key(id)).await? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| StorageError::Serialization(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Save the editor's document together with its undo stack.
    pub async fn save_session(&mut self, editor: &Editor) -> StorageResult<()> {
        self.save(editor.document()).await?;
        let doc_id = self.save_key(editor.document());
        self.save_history(&doc_id, editor.history().past()).await
    }

    /// Like [`maybe_save`](Self::maybe_save), but also writes the undo stack.
    pub async fn maybe_save_session(&mut self, editor: &Editor) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }

        self.save_session(editor).await?;
        Ok(true)
    }

    /// Reopen the most recently saved document with its undo stack.
    ///
    /// A history that fails to load is dropped; the document still opens.
    pub async fn load_last_session(&mut self, config: &EditorConfig) -> Option<Editor> {
        let doc = self.load_last().await?;
        let doc_id = self.save_key(&doc);
        let past = match self.load_history(&doc_id).await {
            Ok(past) => past,
            Err(e) => {
                log::warn!("Discarding undo history of {}: {}", doc_id, e);
                Vec::new()
            }
        };
        Some(Editor::with_history(doc, past, config))
    }

    /// Delete a document and its saved undo history.
    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await?;
        self.storage.delete_meta(&history_key(id)).await
    }

    /// Ids of saved documents, without the last-document mirror.
    pub async fn list_documents(&self) -> StorageResult<Vec<String>> {
        let mut docs = self.storage.list().await?;
        docs.retain(|id| id != LAST_DOCUMENT_KEY);
        Ok(docs)
    }

    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id).await
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// File storage in the platform data directory.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

/// Autosave into the default file storage.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_autosave_manager(
    config: &EditorConfig,
) -> StorageResult<AutoSaveManager<crate::storage::FileStorage>> {
    let storage = create_default_storage()?;
    Ok(AutoSaveManager::from_config(storage, config))
}
