use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that abort a whole benchmark
///
/// Anything that goes wrong inside a single counting variant is recorded in
/// the results instead, see [`Outcome`](crate::bench::Outcome).
///
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The sequence buffer could not be allocated
    #[error("failed to allocate memory for a sequence of {len} elements")]
    Allocation {
        /// Requested sequence length
        len: usize,

        /// Underlying allocator failure
        #[source]
        source: TryReserveError,
    },

    /// The worker pool backing the parallel lanes could not be started
    #[error("failed to start a pool of {lanes} worker lanes")]
    ThreadPool {
        /// Requested lane count
        lanes: usize,

        /// Underlying rayon failure
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    /// The sequential baseline did not produce a reference count
    #[error("sequential baseline failed, no reference count available: {message}")]
    BaselineFailed {
        /// Panic message of the baseline run
        message: String,
    },
}

/// A specialized `Result` type for benchmark setup and execution
pub type Result<T> = std::result::Result<T, Error>;
