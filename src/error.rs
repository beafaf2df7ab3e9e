use std::path::PathBuf;

use thiserror::Error;

/// Failure to read one input file. Fatal for that file only.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: missing column {column:?}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
}

impl ReadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ReadError::NotFound { path }
        } else {
            ReadError::Io { path, source }
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ReadError::NotFound { .. })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("content question does not start with \"In\": {0}")]
    NotAPreamble(String),

    #[error("no preamble for {title:?} found in: {text}")]
    PreambleMismatch { text: String, title: String },
}

/// Read a whole file, mapping failures to [`ReadError`].
pub fn read_to_string(path: &std::path::Path) -> Result<String, ReadError> {
    std::fs::read_to_string(path).map_err(|e| ReadError::io(path, e))
}
