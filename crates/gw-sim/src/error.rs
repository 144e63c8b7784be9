use thiserror::Error;

use gw_grid::GridError;
use gw_network::NetworkError;
use gw_traffic::TrafficError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("cannot advance by {requested} s: exactly one period of {period} s is supported")]
    PartialPeriod { requested: u32, period: u32 },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Traffic(#[from] TrafficError),
}

pub type SimResult<T> = Result<T, SimError>;
