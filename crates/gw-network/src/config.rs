//! Traffic model parameters.

/// Physical constants of the traffic model.
///
/// Typically loaded from a TOML/JSON file by the application crate and passed
/// to [`crate::build_graph`]; the defaults model ordinary urban driving.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficConfig {
    /// Length of one parcel edge in metres.  A segment covering `k`
    /// intermediate parcels is `(k + 1) * parcel_length_m` long.
    pub parcel_length_m: f64,

    /// Average vehicle length in metres.
    pub vehicle_length_m: f64,

    /// Minimum bumper-to-bumper gap in metres.  Together with the vehicle
    /// length this bounds how many drives a segment can hold.
    pub min_follow_gap_m: f64,

    /// Following headway in seconds — the car-following model's time gap.
    pub follow_secs: f64,

    /// Speed ceiling in metres per second applied to every segment.
    pub speed_ceiling_mps: f64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            parcel_length_m:   100.0,
            vehicle_length_m:  4.5,
            min_follow_gap_m:  2.0,
            follow_secs:       2.0,
            speed_ceiling_mps: 16.7, // ~60 km/h
        }
    }
}
