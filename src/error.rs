// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document has no root element")]
    NoRoot,

    #[error("cannot merge mismatched value shapes at key '{key}'")]
    ShapeMismatch { key: String },

    #[error("numeric overflow while merging")]
    Overflow,

    #[error("unsupported JSON value ({0}) in aggregation input")]
    UnsupportedJson(&'static str),

    #[error("unknown flavor '{0}'")]
    UnknownFlavor(String),

    #[error("interrupted by operator")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, StatsError>;

// Allow `?` on std::io::Error by converting to StatsError::Io with unknown path.
impl From<std::io::Error> for StatsError {
    fn from(source: std::io::Error) -> Self {
        StatsError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

impl StatsError {
    /// Attaches a concrete path to a bare I/O error.
    #[must_use]
    pub fn with_path(self, path: &std::path::Path) -> Self {
        match self {
            StatsError::Io { source, .. } => StatsError::Io {
                source,
                path: path.to_path_buf(),
            },
            other => other,
        }
    }

    /// Returns true for the only run-fatal condition: operator cancellation.
    #[must_use]
    pub fn is_interrupt(&self) -> bool {
        matches!(self, StatsError::Interrupted)
    }
}
