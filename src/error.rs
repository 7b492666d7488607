use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything an aggregation run can fail with.
///
/// `MalformedRecord` is the only recoverable variant: strategies absorb it per
/// line and keep scanning. The rest abort the run with no partial result.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("source not found: {path}")]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl EngineError {
    /// True for per-record failures that only drop the offending line.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::MalformedRecord { .. })
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
