//! Error types shared by the store, the persistence slot and the session.

use std::path::PathBuf;

use thiserror::Error;

/// Reason a task input was rejected. Only the first failing rule is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title required")]
    TitleRequired,
    #[error("title too long")]
    TitleTooLong,
    #[error("description too long")]
    DescriptionTooLong,
}

/// Failure reading or writing the persistence slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stored tasks are unreadable: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("could not encode tasks: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("saved tasks could not be loaded, refusing to overwrite them")]
    NotLoaded,
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io { path: path.into(), source }
    }
}

/// Error returned by session operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not save tasks: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_rule() {
        assert_eq!(ValidationError::TitleRequired.to_string(), "title required");
        assert_eq!(ValidationError::TitleTooLong.to_string(), "title too long");
        assert_eq!(ValidationError::DescriptionTooLong.to_string(), "description too long");
    }

    #[test]
    fn session_error_wraps_validation_transparently() {
        let err: Error = ValidationError::TitleTooLong.into();
        assert_eq!(err.to_string(), "title too long");
    }
}
