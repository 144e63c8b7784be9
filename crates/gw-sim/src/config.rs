//! Top-level simulation configuration.

use gw_core::SimClock;
use gw_network::TrafficConfig;

/// Configuration of one city run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CityConfig {
    /// Grid width in parcels.  Must be >= 3.
    pub width: u16,

    /// Grid height in parcels.  Must be >= 3.
    pub height: u16,

    /// Seconds per tick.  Default: 3,600 (1 simulated hour).
    pub period_secs: u32,

    /// Master RNG seed.  The same seed always produces identical runs.
    pub seed: u64,

    /// Physical constants of the traffic model.
    pub traffic: TrafficConfig,
}

impl CityConfig {
    /// A `width × height` city with default period, seed, and traffic model.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            period_secs: SimClock::DEFAULT_PERIOD_SECS,
            seed: 0,
            traffic: TrafficConfig::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_traffic(mut self, traffic: TrafficConfig) -> Self {
        self.traffic = traffic;
        self
    }
}
