use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The dataset could not be parsed as a table, or lacks a required column.
    #[error("input format error: {0}")]
    InputFormat(String),

    #[error("no index found at {location}")]
    IndexNotFound { location: String },

    #[error("index at {location} is unreadable: {reason}")]
    IndexCorrupt { location: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index encoding error: {0}")]
    Encode(String),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;

impl RetrievalError {
    pub fn status_code(&self) -> u16 {
        match self {
            RetrievalError::InputFormat(_) => 400,
            RetrievalError::IndexNotFound { .. } | RetrievalError::IndexCorrupt { .. } => 404,
            _ => 500,
        }
    }

    /// True when there is no usable index to search, whether it was never
    /// built or the stored blob cannot be decoded.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RetrievalError::IndexNotFound { .. } | RetrievalError::IndexCorrupt { .. })
    }
}

impl From<csv::Error> for RetrievalError {
    fn from(e: csv::Error) -> Self {
        if !e.is_io_error() {
            return RetrievalError::InputFormat(e.to_string());
        }
        match e.into_kind() {
            csv::ErrorKind::Io(io) => RetrievalError::Io(io),
            other => RetrievalError::InputFormat(format!("{other:?}")),
        }
    }
}
