//! Document persistence.
//!
//! Backends store whole [`ResumeConfig`] documents keyed by id. The trait
//! returns boxed futures so a browser-backed store can be plugged in without
//! changing callers; the native backends complete immediately.
//!
//! Besides documents, a backend keeps small JSON blobs in a separate
//! namespace: the undo history of each document and the id the last
//! document was saved under.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(not(target_arch = "wasm32"))]
pub use autosave::{create_autosave_manager, create_default_storage};
pub use autosave::{AutoSaveManager, LAST_DOCUMENT_ID_KEY, LAST_DOCUMENT_KEY, history_key};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::ResumeConfig;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future returned by [`Storage`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A place documents can be saved to and loaded from.
pub trait Storage: Send + Sync {
    /// Save a document under `id`, replacing any previous version.
    fn save(&self, id: &str, document: &ResumeConfig) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a document. Fails with [`StorageError::NotFound`] if absent.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ResumeConfig>>;

    /// Delete a document. Deleting a missing document succeeds.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;

    /// Save auxiliary JSON (undo history, the last-document pointer) under
    /// `key`. Kept apart from documents and never returned by `list`.
    fn save_meta(&self, key: &str, json: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Load auxiliary JSON, or None if nothing is stored under `key`.
    fn load_meta(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Delete auxiliary JSON. Deleting a missing key succeeds.
    fn delete_meta(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// Drive a future to completion on the current thread.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
