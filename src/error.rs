//! Error types for the solver.
//!
//! Configuration and communication errors are fatal: the binary reports
//! them and exits. Infeasible tours are not errors, they are carried by the
//! cost sentinel (see [`crate::instance::INFEASIBLE`]).

use thiserror::Error;

/// Errors that can occur while configuring or running the solver.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Population size is odd; crossover produces children in pairs.
    #[error("population size ({size}) must be even")]
    OddPopulation {
        /// The invalid population size
        size: usize,
    },

    /// Population cannot be split into equal shards.
    #[error("population size ({size}) is not divisible by worker count ({workers})")]
    IndivisiblePopulation {
        /// The population size
        size: usize,
        /// The configured worker count
        workers: usize,
    },

    /// Any other invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A shard transfer failed or came back malformed.
    #[error("communication failure with worker {worker}: {reason}")]
    Communication {
        /// Worker id (1-based, the coordinator is 0)
        worker: usize,
        /// What went wrong
        reason: String,
    },

    /// The distance matrix input could not be parsed.
    #[error("malformed distance matrix: {0}")]
    MalformedMatrix(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to build local thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A specialized `Result` type for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;

impl SolverError {
    /// Returns `true` if the configuration was rejected before the run.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SolverError::OddPopulation { .. }
                | SolverError::IndivisiblePopulation { .. }
                | SolverError::InvalidConfig(_)
        )
    }

    /// Returns `true` if a coordinator/worker exchange failed.
    pub fn is_communication_error(&self) -> bool {
        matches!(self, SolverError::Communication { .. })
    }

    /// Returns `true` if reading or parsing input failed.
    pub fn is_input_error(&self) -> bool {
        matches!(self, SolverError::MalformedMatrix(_) | SolverError::Io(_))
    }

    pub(crate) fn communication(worker: usize, reason: impl Into<String>) -> Self {
        SolverError::Communication {
            worker,
            reason: reason.into(),
        }
    }
}
