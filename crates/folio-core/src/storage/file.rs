//! JSON files on disk, one per document.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::ResumeConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory holding auxiliary JSON.
const META_DIR: &str = "meta";

/// Encode an id as a file stem.
///
/// Lowercase ASCII letters, digits and `-` are kept; every other byte becomes
/// `_XX` (uppercase hex). The mapping is injective, so distinct ids never
/// share a file, and stems stay valid on case-insensitive filesystems.
fn encode_id(id: &str) -> String {
    let mut encoded = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("_{:02X}", byte));
        }
    }
    encoded
}

/// Inverse of [`encode_id`]. None if `stem` was not produced by it.
fn decode_id(stem: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(stem.len());
    let mut rest = stem.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        if byte == b'_' {
            let hex = tail.get(..2)?;
            let hex = std::str::from_utf8(hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(byte);
            rest = tail;
        }
    }
    let id = String::from_utf8(bytes).ok()?;
    (encode_id(&id) == stem).then_some(id)
}

/// Stores each document as `<encoded id>.json` in a directory, and
/// auxiliary JSON under `meta/`.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Use `base_path`, creating it if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Storage under the platform data directory.
    ///
    /// On Linux: `~/.local/share/folio/documents/`
    /// On macOS: `~/Library/Application Support/folio/documents/`
    /// On Windows: `%LOCALAPPDATA%\folio\documents\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        let path = base.join("folio").join("documents");
        log::info!("Using document storage at {}", path.display());
        Self::new(path)
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", encode_id(id)))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.base_path
            .join(META_DIR)
            .join(format!("{}.json", encode_id(key)))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

fn write_file(path: &Path, contents: &str) -> StorageResult<()> {
    fs::write(path, contents)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

fn remove_file(path: &Path) -> StorageResult<()> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
        })?;
    }
    Ok(())
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &ResumeConfig) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);
        let json = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()));

        Box::pin(async move {
            write_file(&path, &json?)?;
            log::debug!("Saved {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ResumeConfig>> {
        let path = self.document_path(id);
        let id = id.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }

            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;

            ResumeConfig::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);
        Box::pin(async move { remove_file(&path) })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut ids = Vec::new();
            for path in entries.flatten().map(|entry| entry.path()) {
                if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                match decode_id(stem) {
                    Some(id) => ids.push(id),
                    None => log::debug!("Skipping foreign file {}", path.display()),
                }
            }
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.document_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }

    fn save_meta(&self, key: &str, json: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.meta_path(key);
        let json = json.to_string();

        Box::pin(async move {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).map_err(|e| {
                    StorageError::Io(format!("Failed to create {}: {}", dir.display(), e))
                })?;
            }
            write_file(&path, &json)
        })
    }

    fn load_meta(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let path = self.meta_path(key);

        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }
            fs::read_to_string(&path).map(Some).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })
        })
    }

    fn delete_meta(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.meta_path(key);
        Box::pin(async move { remove_file(&path) })
    }
}
