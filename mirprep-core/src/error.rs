use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed table: {0}")]
    Csv(#[from] csv::Error),

    #[error("unrecognized score orientation {0:?}, expected \"asc\" or \"desc\"")]
    Orientation(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PrepError {
    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> PrepError {
        PrepError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;
