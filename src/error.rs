// Error types for the maintenance store

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or a supplied value is out of range
    #[error("{0}")]
    Validation(String),

    #[error("Invalid date format '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("No record found with ID {0}")]
    NotFound(u64),

    /// An edit was requested without any field to change
    #[error("No changes provided.")]
    NoChanges,

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(Error::NotFound(7).to_string(), "No record found with ID 7");
        assert_eq!(Error::NoChanges.to_string(), "No changes provided.");
        assert_eq!(
            Error::InvalidDate("2024-13-01".to_string()).to_string(),
            "Invalid date format '2024-13-01'. Use YYYY-MM-DD"
        );
    }

    #[test]
    fn test_io_error_includes_path() {
        let err = Error::io(
            "/nowhere/out.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/nowhere/out.csv"));
        assert!(msg.contains("missing"));
    }
}
