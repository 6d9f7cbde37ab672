//! Blob Store
//!
//! Object storage for uploaded images and exports. Keys are `/`-separated
//! relative paths such as `youtubers/1700000000000_ab12cd.png`.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

/// Suffix of the sidecar file holding a blob's content type
const CONTENT_TYPE_SUFFIX: &str = ".content-type";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Invalid blob key: {0}")]
    InvalidKey(String),

    #[error("Blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BlobResult<T> = Result<T, BlobError>;

/// Stored object with its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Blob store interface
#[trait_variant::make(BlobStore: Send)]
pub trait LocalBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> BlobResult<()>;

    async fn get(&self, key: &str) -> BlobResult<Option<Blob>>;

    /// Keys starting with `prefix`, sorted
    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>>;

    async fn delete(&self, key: &str) -> BlobResult<()>;

    /// Liveness probe used by health checks
    async fn ping(&self) -> BlobResult<()>;
}

/// Reject keys that could escape the store root
pub fn validate_key(key: &str) -> BlobResult<()> {
    if key.is_empty() || key.starts_with('/') || key.ends_with(CONTENT_TYPE_SUFFIX) {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    let all_normal = Path::new(key)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !all_normal {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ============================================================================
// Filesystem implementation
// ============================================================================

/// Blob store rooted at a local directory
///
/// Each blob is a file; its content type lives in a sibling
/// `<name>.content-type` file.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> BlobResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn sidecar_for(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(CONTENT_TYPE_SUFFIX);
        PathBuf::from(name)
    }
}

fn not_found_is_none<T>(result: std::io::Result<T>) -> std::io::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> BlobResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        tokio::fs::write(Self::sidecar_for(&path), content_type.as_bytes()).await?;
        tracing::debug!(key = %key, size = bytes.len(), "Blob stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Option<Blob>> {
        let path = self.path_for(key)?;
        let Some(bytes) = not_found_is_none(tokio::fs::read(&path).await)? else {
            return Ok(None);
        };
        let content_type = not_found_is_none(
            tokio::fs::read_to_string(Self::sidecar_for(&path)).await,
        )?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Ok(Some(Blob {
            bytes,
            content_type,
        }))
    }

    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let Some(mut entries) = not_found_is_none(tokio::fs::read_dir(&dir).await)? else {
                continue;
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if !key.ends_with(CONTENT_TYPE_SUFFIX) && key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        let path = self.path_for(key)?;
        not_found_is_none(tokio::fs::remove_file(&path).await)?;
        not_found_is_none(tokio::fs::remove_file(Self::sidecar_for(&path)).await)?;
        Ok(())
    }

    async fn ping(&self) -> BlobResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// In-memory blob store for tests and database-less runs
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<String, Blob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> BlobResult<()> {
        validate_key(key)?;
        self.blobs.insert(
            key.to_string(),
            Blob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Option<Blob>> {
        validate_key(key)?;
        Ok(self.blobs.get(key).map(|b| b.value().clone()))
    }

    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .blobs
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        validate_key(key)?;
        self.blobs.remove(key);
        Ok(())
    }

    async fn ping(&self) -> BlobResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BlobError, BlobStore, FsBlobStore, MemoryBlobStore, validate_key};

    #[test]
    fn test_validate_key() {
        assert!(validate_key("youtubers/1_a.png").is_ok());
        assert!(validate_key("a.png").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("../secret").is_err());
        assert!(validate_key("a/../../b").is_err());
        assert!(validate_key("a.png.content-type").is_err());
    }

    #[tokio::test]
    async fn test_fs_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        store
            .put("videos/1_x.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        store
            .put("exports/export_1.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();

        let blob = store.get("videos/1_x.png").await.unwrap().unwrap();
        assert_eq!(blob.bytes, vec![1, 2, 3]);
        assert_eq!(blob.content_type, "image/png");

        assert_eq!(
            store.list("").await.unwrap(),
            vec!["exports/export_1.json", "videos/1_x.png"]
        );
        assert_eq!(store.list("videos/").await.unwrap(), vec!["videos/1_x.png"]);

        store.delete("videos/1_x.png").await.unwrap();
        assert!(store.get("videos/1_x.png").await.unwrap().is_none());
        // second delete is a no-op
        store.delete("videos/1_x.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_fs_store_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("not-yet"));
        assert!(store.list("").await.unwrap().is_empty());
        assert!(store.get("a.png").await.unwrap().is_none());
        store.ping().await.unwrap();
        assert!(dir.path().join("not-yet").is_dir());
    }

    #[tokio::test]
    async fn test_fs_store_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let err = store.put("../x.png", vec![0], "image/png").await;
        assert!(matches!(err, Err(BlobError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryBlobStore::new();
        store.put("b/2.gif", vec![2], "image/gif").await.unwrap();
        store.put("a/1.gif", vec![1], "image/gif").await.unwrap();

        assert_eq!(store.list("").await.unwrap(), vec!["a/1.gif", "b/2.gif"]);
        assert_eq!(
            store.get("a/1.gif").await.unwrap().unwrap().content_type,
            "image/gif"
        );

        store.delete("a/1.gif").await.unwrap();
        assert_eq!(store.list("a/").await.unwrap(), Vec::<String>::new());
    }
}
