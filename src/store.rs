use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// Error types for content store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("I/O error on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid UTF-8 in file: {0}")]
    InvalidUtf8(String),
}

/// Read-write access to named text content
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read the full content stored under `name`
    async fn read(&self, name: &str) -> Result<String, StoreError>;

    /// Replace the content stored under `name`
    async fn write(&self, name: &str, content: &str) -> Result<(), StoreError>;
}

/// BLAKE3 hash of content (hex-encoded)
pub fn checksum(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Content store backed by the local filesystem
///
/// Names are paths, resolved against `root` when one is set.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: Option<PathBuf>,
    atomic_writes: bool,
}

impl LocalFileStore {
    pub fn new() -> Self {
        Self {
            root: None,
            atomic_writes: true,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Write in place instead of through a temp file and rename
    pub fn with_atomic_writes(mut self, atomic_writes: bool) -> Self {
        self.atomic_writes = atomic_writes;
        self
    }

    fn resolve(&self, name: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(name),
            None => PathBuf::from(name),
        }
    }
}

impl Default for LocalFileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for LocalFileStore {
    async fn read(&self, name: &str) -> Result<String, StoreError> {
        let path = self.resolve(name);

        let bytes = fs::read(&path).await.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(path.display().to_string())
            } else {
                StoreError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })?;

        String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8(path.display().to_string()))
    }

    async fn write(&self, name: &str, content: &str) -> Result<(), StoreError> {
        let path = self.resolve(name);
        let result = if self.atomic_writes {
            atomic_write(&path, content.as_bytes()).await
        } else {
            fs::write(&path, content).await
        };

        result.map_err(|source| StoreError::Io {
            name: name.to_string(),
            source,
        })?;
        debug!(file = %path.display(), bytes = content.len(), "Wrote file");
        Ok(())
    }
}

/// Write to a temp file in the same directory, then rename over the target
async fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("file");
    let temp_path = parent.join(format!(".{}.tmp.{}", file_name, std::process::id()));

    fs::write(&temp_path, content).await?;

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }

    Ok(())
}

/// In-memory content store
///
/// Useful for tests and for embedding the engine without touching disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            files: RwLock::new(
                files
                    .into_iter()
                    .map(|(name, content)| (name.into(), content.into()))
                    .collect(),
            ),
            writes: AtomicUsize::new(0),
        }
    }

    /// Current content of `name`, if any
    pub async fn get(&self, name: &str) -> Option<String> {
        self.files.read().await.get(name).cloned()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn read(&self, name: &str) -> Result<String, StoreError> {
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn write(&self, name: &str, content: &str) -> Result<(), StoreError> {
        self.files
            .write()
            .await
            .insert(name.to_string(), content.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
