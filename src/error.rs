use std::path::PathBuf;

use thiserror::Error;

/// Fatal error taxonomy for the mapper. Every variant renders as a single
/// line on stderr via `main`'s `eprintln!("[ERROR] {:?}", e)`.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("bad arguments: {0}")]
    BadArguments(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reference {path} is empty or malformed: {reason}")]
    EmptyOrMalformedReference { path: PathBuf, reason: String },

    #[error("reference {path} contains duplicate identifier {identifier:?}")]
    DuplicateIdentifier { path: PathBuf, identifier: String },

    #[error("sequence {identifier:?} in {path} has length {len}, shorter than k={k}")]
    SequenceTooShort {
        path: PathBuf,
        identifier: String,
        len: usize,
        k: usize,
    },
}

impl MapError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MapError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
