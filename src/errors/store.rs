use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Corrupt store {}{}: {reason}", .path.display(), .line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Corrupt {
        path: PathBuf,
        line: Option<u64>,
        reason: String,
    },

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl StoreError {
    // Any failure while reading a store file means the file cannot be trusted.
    pub fn corrupt(path: &Path, err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        let reason = match err.kind() {
            csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
            _ => err.to_string(),
        };
        StoreError::Corrupt {
            path: path.to_path_buf(),
            line,
            reason,
        }
    }

    pub fn missing_column(path: &Path, column: &str) -> Self {
        StoreError::Corrupt {
            path: path.to_path_buf(),
            line: Some(1),
            reason: format!("missing column '{}'", column),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
