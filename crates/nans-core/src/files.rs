//! Loading and saving the edited file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::document::Document;

/// Errors from reading or writing the edited file.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },
}

/// Open `path` as a document. A missing file gives an empty document.
pub async fn load_document(path: &Path) -> Result<Document, FileError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let text = String::from_utf8(bytes).map_err(|_| FileError::Encoding {
                path: path.to_path_buf(),
            })?;
            info!(path = %path.display(), bytes = text.len(), "Opened file");
            Ok(Document::from_text(text))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "New file");
            Ok(Document::new())
        }
        Err(source) => Err(FileError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `text` to `path`, replacing its contents. Returns the byte count.
pub async fn save_text(path: &Path, text: &str) -> Result<usize, FileError> {
    tokio::fs::write(path, text)
        .await
        .map_err(|source| FileError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), bytes = text.len(), "Saved file");
    Ok(text.len())
}
