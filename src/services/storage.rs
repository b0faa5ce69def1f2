use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub struct FileMetadata {
    pub last_modified: DateTime<Utc>,
    pub size: u64,
    pub is_file: bool,
}

/// An opened stored file, ready to be streamed.
pub struct StoredObject {
    pub reader: Box<dyn AsyncRead + Unpin + Send>,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Writes the reader's bytes under `name`, returning the number of bytes stored.
    async fn put_stream<'a>(
        &self,
        name: &str,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> StorageResult<u64>;
    /// Opens a stored file. `name` may be a relative path below the storage root.
    async fn open(&self, name: &str) -> StorageResult<StoredObject>;
    async fn list(&self) -> StorageResult<Vec<String>>;
    async fn metadata(&self, name: &str) -> StorageResult<FileMetadata>;
    async fn delete(&self, name: &str) -> StorageResult<()>;
}

/// Stores uploads as plain files in a single local directory.
pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path for a top-level entry. Only a single normal component is accepted.
    fn entry_path(&self, name: &str) -> StorageResult<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(name)),
            _ => Err(StorageError::InvalidName(name.to_string())),
        }
    }

    /// Resolves a request path below the root, following symlinks, and
    /// refuses anything that ends up outside of it.
    async fn resolve_contained(&self, name: &str) -> StorageResult<PathBuf> {
        let relative = name.trim_start_matches('/');
        if relative.is_empty() || relative.contains('\0') || Path::new(relative).is_absolute() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let root = fs::canonicalize(&self.root)
            .await
            .map_err(|e| not_found_or_io(name, e))?;
        // Names that cannot be resolved, including ones the OS rejects, are absent.
        let candidate = match fs::canonicalize(root.join(relative)).await {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!("Cannot resolve {}: {}", name, e);
                return Err(StorageError::NotFound(name.to_string()));
            }
        };

        if candidate == root || !candidate.starts_with(&root) {
            tracing::warn!("Refusing path outside of storage root: {}", name);
            return Err(StorageError::NotFound(name.to_string()));
        }

        Ok(candidate)
    }
}

fn not_found_or_io(name: &str, e: std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::NotFound {
        StorageError::NotFound(name.to_string())
    } else {
        StorageError::Io(e)
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn put_stream<'a>(
        &self,
        name: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> StorageResult<u64> {
        let path = self.entry_path(name)?;

        let write = async {
            let mut file = fs::File::create(&path).await?;
            let written = tokio::io::copy(&mut reader, &mut file).await?;
            file.flush().await?;
            Ok::<u64, std::io::Error>(written)
        };

        match write.await {
            Ok(written) => Ok(written),
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&path).await {
                    if cleanup.kind() != ErrorKind::NotFound {
                        tracing::warn!("Failed to remove partial file {}: {}", name, cleanup);
                    }
                }
                Err(e.into())
            }
        }
    }

    async fn open(&self, name: &str) -> StorageResult<StoredObject> {
        let path = self.resolve_contained(name).await?;

        let meta = fs::metadata(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let file = fs::File::open(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))?;

        Ok(StoredObject {
            reader: Box::new(file),
            size: meta.len(),
            last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!("Skipping non UTF-8 entry: {:?}", raw),
            }
        }
        Ok(names)
    }

    async fn metadata(&self, name: &str) -> StorageResult<FileMetadata> {
        let path = self.entry_path(name)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))?;

        Ok(FileMetadata {
            last_modified: meta.modified()?.into(),
            size: meta.len(),
            is_file: meta.is_file(),
        })
    }

    async fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.entry_path(name)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))
    }
}
