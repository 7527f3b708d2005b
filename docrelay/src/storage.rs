//! Upload storage on the local filesystem.
//!
//! Incoming files are written under a generated name of the form
//! `file-<unix millis>-<random><extension>`. The client-supplied name only contributes its
//! extension, which must be on the configured allow-list; nothing is written for a rejected file.

use crate::types::UploadedFile;
use async_trait::async_trait;
use axum::body::Bytes;
use rand::prelude::RngExt;
use rand::rng;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

/// Attempts made to find a free name before giving up.
const MAX_NAME_ATTEMPTS: usize = 5;

#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("File type not supported: {extension:?}")]
    UnsupportedFileType { extension: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A file received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    /// Content type declared by the client, if any
    pub mime_type: Option<String>,
    pub content: Bytes,
}

/// Trait for upload storage backends
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Reject the name early, before any content has been read
    fn check_name(&self, original_name: &str) -> Result<String>;

    /// Persist the file and describe where it landed
    async fn store(&self, file: IncomingFile) -> Result<UploadedFile>;
}

/// Lower-cased extension of the last path component, including the dot.
///
/// Returns an empty string for names without one, including dotfiles such as `.env`.
pub fn extension_of(original_name: &str) -> String {
    // Browsers on Windows may send the full client path
    let base = original_name.rsplit(['/', '\\']).next().unwrap_or_default();
    Path::new(base)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// Extension as the client wrote it, used to build the stored name.
fn raw_extension_of(original_name: &str) -> String {
    let base = original_name.rsplit(['/', '\\']).next().unwrap_or_default();
    Path::new(base)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

async fn write_and_sync(handle: &mut fs::File, content: &[u8]) -> io::Result<()> {
    handle.write_all(content).await?;
    handle.sync_all().await
}

/// Remove a partially written upload so it is never served under `/uploads`.
async fn discard_on_error<T>(path: &Path, result: io::Result<T>) -> io::Result<T> {
    if result.is_err()
        && let Err(e) = fs::remove_file(path).await
    {
        warn!(path = %path.display(), error = %e, "Failed to remove partial upload");
    }
    result
}

fn generate_name(extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rng().random_range(0..1_000_000_000);
    format!("file-{millis}-{suffix}{extension}")
}

/// Local filesystem store - writes every upload into a single directory
pub struct LocalFileStore {
    base_path: PathBuf,
    allowed_extensions: Vec<String>,
}

impl LocalFileStore {
    pub fn new(base_path: PathBuf, allowed_extensions: Vec<String>) -> Self {
        Self {
            base_path,
            allowed_extensions,
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    fn check_name(&self, original_name: &str) -> Result<String> {
        let extension = extension_of(original_name);
        if self.allowed_extensions.iter().any(|allowed| *allowed == extension) {
            Ok(extension)
        } else {
            Err(StoreError::UnsupportedFileType { extension })
        }
    }

    #[instrument(skip_all, fields(original_name = %file.original_name, size = file.content.len()))]
    async fn store(&self, file: IncomingFile) -> Result<UploadedFile> {
        self.check_name(&file.original_name)?;

        fs::create_dir_all(&self.base_path).await?;

        let extension = raw_extension_of(&file.original_name);
        let mut attempts = 0;
        let (generated_name, storage_path, mut handle) = loop {
            attempts += 1;
            let name = generate_name(&extension);
            let path = self.base_path.join(&name);
            match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(handle) => break (name, path, handle),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && attempts < MAX_NAME_ATTEMPTS => {
                    debug!(name = %name, "Generated upload name already taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        };

        let written = write_and_sync(&mut handle, &file.content).await;
        drop(handle);
        discard_on_error(&storage_path, written).await?;

        let mime_type = file
            .mime_type
            .unwrap_or_else(|| mime_guess::from_path(&file.original_name).first_or_octet_stream().to_string());

        debug!(generated_name = %generated_name, "Stored upload");

        Ok(UploadedFile {
            generated_name,
            original_name: file.original_name,
            size_bytes: file.content.len() as u64,
            mime_type,
            storage_path,
        })
    }
}
