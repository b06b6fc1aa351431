use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure while loading the roster. No partial dataset is produced.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed roster table: {0}")]
    Csv(#[from] csv::Error),

    #[error("roster is missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("failed to fetch roster: {0}")]
    Http(#[from] reqwest::Error),

    #[error("roster download from {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },
}

/// Uploaded applicant table was rejected. No allocation is attempted.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("applicant table is missing required column `{column}`")]
    MissingColumn { column: &'static str },

    #[error("applicant table has no rows with a positive applicant count")]
    NoValidRows,

    #[error("malformed applicant table: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound { path }
        } else {
            LoadError::Io { path, source }
        }
    }
}
