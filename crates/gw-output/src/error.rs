use thiserror::Error;

/// Errors that can occur while tabulating or writing run statistics.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Sim(#[from] gw_sim::SimError),

    #[error(transparent)]
    Traffic(#[from] gw_traffic::TrafficError),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
