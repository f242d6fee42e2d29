//! In-memory storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::ResumeConfig;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

fn lock_error<T>(e: PoisonError<T>) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

/// Documents held in a map, for tests and sessions that should not touch
/// disk.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, ResumeConfig>>,
    meta: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents, not counting metadata.
    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &ResumeConfig) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let document = document.clone();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.insert(id, document);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ResumeConfig>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            docs.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.contains_key(&id))
        })
    }

    fn save_meta(&self, key: &str, json: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let json = json.to_string();
        Box::pin(async move {
            let mut meta = self.meta.write().map_err(lock_error)?;
            meta.insert(key, json);
            Ok(())
        })
    }

    fn load_meta(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let key = key.to_string();
        Box::pin(async move {
            let meta = self.meta.read().map_err(lock_error)?;
            Ok(meta.get(&key).cloned())
        })
    }

    fn delete_meta(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut meta = self.meta.write().map_err(lock_error)?;
            meta.remove(&key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let doc = ResumeConfig::demo();

        block_on(storage.save("cv", &doc)).unwrap();
        let loaded = block_on(storage.load("cv")).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_saved_copy_is_detached() {
        let storage = MemoryStorage::new();
        let mut doc = ResumeConfig::demo();
        block_on(storage.save("cv", &doc)).unwrap();

        doc.name = "Changed".to_string();
        let loaded = block_on(storage.load("cv")).unwrap();
        assert_eq!(loaded.name, "Modern Developer");
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(id)) if id == "nonexistent"));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        let doc = ResumeConfig::new();

        assert!(!block_on(storage.exists("cv")).unwrap());
        block_on(storage.save("cv", &doc)).unwrap();
        assert!(block_on(storage.exists("cv")).unwrap());

        block_on(storage.delete("cv")).unwrap();
        assert!(!block_on(storage.exists("cv")).unwrap());
        block_on(storage.delete("cv")).unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        let doc = ResumeConfig::new();
        block_on(storage.save("doc1", &doc)).unwrap();
        block_on(storage.save("doc2", &doc)).unwrap();

        let mut list = block_on(storage.list()).unwrap();
        list.sort();
        assert_eq!(list, vec!["doc1".to_string(), "doc2".to_string()]);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_meta_is_separate_from_documents() {
        let storage = MemoryStorage::new();
        block_on(storage.save_meta("cv", r#"["a"]"#)).unwrap();

        assert_eq!(block_on(storage.load_meta("cv")).unwrap().as_deref(), Some(r#"["a"]"#));
        assert!(!block_on(storage.exists("cv")).unwrap());
        assert!(block_on(storage.list()).unwrap().is_empty());

        block_on(storage.delete_meta("cv")).unwrap();
        assert_eq!(block_on(storage.load_meta("cv")).unwrap(), None);
    }
}
