use thiserror::Error;

use crate::tle::fixed_width::ParseTleError;

#[derive(Error, Debug)]
pub enum TleError {
    #[error("Error during the TLE parsing: {0}")]
    Parse(#[from] ParseTleError),

    #[error("Malformed corpus block: {0}")]
    Format(String),

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to decode compressed stream {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("No files found in dataset folder: {0}")]
    EmptyCorpus(String),

    #[error("Index {index} out of range for dataset with {len} batches")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Invalid dataset parameter: {0}")]
    InvalidDatasetParameter(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid raw record payload: {0}")]
    RawRecord(#[from] serde_json::Error),
}

impl TleError {
    /// Wrap a line-level failure with the location it came from.
    pub(crate) fn format_at(path: &str, line: usize, reason: impl std::fmt::Display) -> Self {
        TleError::Format(format!("{path}:{line}: {reason}"))
    }
}

impl PartialEq for TleError {
    fn eq(&self, other: &Self) -> bool {
        use TleError::*;
        match (self, other) {
            (Parse(a), Parse(b)) => a == b,
            (Format(a), Format(b)) => a == b,
            (
                Decode {
                    path: pa,
                    reason: ra,
                },
                Decode {
                    path: pb,
                    reason: rb,
                },
            ) => pa == pb && ra == rb,
            (EmptyCorpus(a), EmptyCorpus(b)) => a == b,
            (IndexOutOfRange { index: ia, len: la }, IndexOutOfRange { index: ib, len: lb }) => {
                ia == ib && la == lb
            }
            (InvalidDatasetParameter(a), InvalidDatasetParameter(b)) => a == b,

            // not comparable: same variant is enough
            (Io(_), Io(_)) => true,
            (Csv(_), Csv(_)) => true,
            (ThreadPool(_), ThreadPool(_)) => true,
            (RawRecord(_), RawRecord(_)) => true,

            _ => false,
        }
    }
}
