//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing count of simulated seconds held in a
//! `Timestamp`.  Second 0 of every run is a Monday at 00:00, so calendar
//! helpers (`hour_of_day`, `is_weekend`) are pure integer arithmetic — no
//! datetime library, no floating-point drift, O(1) comparisons.
//!
//! The tick clock (`SimClock`) advances in whole periods only.  The default
//! period is 3,600 s (1 simulated hour); everything downstream is agnostic to
//! the value, but a run never advances by a fraction of a period.

use std::fmt;

pub const SECS_PER_MINUTE: i64 = 60;
pub const SECS_PER_HOUR: i64 = 3_600;
pub const SECS_PER_DAY: i64 = 86_400;
pub const DAYS_PER_WEEK: i64 = 7;

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// An absolute simulated time, in seconds since the start of the run.
///
/// Stored as `i64`; at one-second resolution that outlasts any conceivable
/// run.  Day 0 is a Monday, hour 0 is midnight.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    /// The timestamp `secs` seconds after `self`.
    #[inline]
    pub fn offset(self, secs: i64) -> Timestamp {
        Timestamp(self.0 + secs)
    }

    /// Seconds elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }

    /// Whole days since the start of the run.
    #[inline]
    pub fn day_index(self) -> i64 {
        self.0.div_euclid(SECS_PER_DAY)
    }

    /// Hour of the day, `0..24`.
    #[inline]
    pub fn hour_of_day(self) -> u32 {
        (self.0.rem_euclid(SECS_PER_DAY) / SECS_PER_HOUR) as u32
    }

    /// Minute of the hour, `0..60`.
    #[inline]
    pub fn minute_of_hour(self) -> u32 {
        (self.0.rem_euclid(SECS_PER_HOUR) / SECS_PER_MINUTE) as u32
    }

    /// `true` on Saturdays and Sundays.  Day 0 is a Monday, so weekend days
    /// are those with `day_index % 7` of 5 or 6.
    #[inline]
    pub fn is_weekend(self) -> bool {
        self.day_index().rem_euclid(DAYS_PER_WEEK) >= 5
    }

    /// The timestamp of `hour:minute` on the same simulated day.
    pub fn at_time_of_day(self, hour: u32, minute: u32) -> Timestamp {
        Timestamp(
            self.day_index() * SECS_PER_DAY
                + hour as i64 * SECS_PER_HOUR
                + minute as i64 * SECS_PER_MINUTE,
        )
    }
}

impl std::ops::Add<i64> for Timestamp {
    type Output = Timestamp;
    #[inline]
    fn add(self, rhs: i64) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}

impl std::ops::Sub for Timestamp {
    type Output = i64;
    #[inline]
    fn sub(self, rhs: Timestamp) -> i64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "day {} {:02}:{:02}",
            self.day_index(),
            self.hour_of_day(),
            self.minute_of_hour()
        )
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The tick clock: current simulated time plus the fixed tick period.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// The current simulated time.  Advanced by whole periods only.
    pub now: Timestamp,
    /// How many simulated seconds one tick represents.  Default: 3,600.
    pub period_secs: u32,
}

impl SimClock {
    pub const DEFAULT_PERIOD_SECS: u32 = 3_600;

    /// A clock at time zero with the given tick period.
    pub fn new(period_secs: u32) -> Self {
        Self { now: Timestamp::ZERO, period_secs }
    }

    /// Advance the clock by exactly one period.
    #[inline]
    pub fn advance_period(&mut self) {
        self.now = self.now.offset(self.period_secs as i64);
    }

    /// The end of the planning window that begins at `now`.
    #[inline]
    pub fn window_end(&self) -> Timestamp {
        self.now.offset(self.period_secs as i64)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD_SECS)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (period {} s)", self.now, self.period_secs)
    }
}
