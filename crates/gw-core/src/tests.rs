//! Unit tests for gw-core.

use crate::{DriveId, LocationId, SimClock, SimRng, Timestamp};

// ── IDs ───────────────────────────────────────────────────────────────────────

mod ids {
    use super::*;

    #[test]
    fn invalid_sentinel_is_max() {
        assert_eq!(LocationId::INVALID.0, u32::MAX);
        assert_eq!(LocationId::default(), LocationId::INVALID);
    }

    #[test]
    fn index_round_trip() {
        let id = DriveId(7);
        assert_eq!(id.index(), 7);
        assert_eq!(DriveId::try_from(7usize).unwrap(), id);
    }

    #[test]
    fn ids_order_by_inner_value() {
        let mut v = vec![DriveId(3), DriveId(1), DriveId(2)];
        v.sort();
        assert_eq!(v, vec![DriveId(1), DriveId(2), DriveId(3)]);
    }
}

// ── Timestamp ─────────────────────────────────────────────────────────────────

mod time {
    use super::*;

    #[test]
    fn day_zero_is_monday_midnight() {
        let t = Timestamp::ZERO;
        assert_eq!(t.day_index(), 0);
        assert_eq!(t.hour_of_day(), 0);
        assert!(!t.is_weekend());
    }

    #[test]
    fn calendar_helpers() {
        // Day 2, 07:30.
        let t = Timestamp(2 * 86_400 + 7 * 3_600 + 30 * 60);
        assert_eq!(t.day_index(), 2);
        assert_eq!(t.hour_of_day(), 7);
        assert_eq!(t.minute_of_hour(), 30);
        assert_eq!(format!("{t}"), "day 2 07:30");
    }

    #[test]
    fn weekend_detection() {
        // Day 0 = Monday, so days 5 and 6 are Saturday and Sunday.
        assert!(Timestamp(5 * 86_400).is_weekend());
        assert!(Timestamp(6 * 86_400 + 12 * 3_600).is_weekend());
        assert!(!Timestamp(7 * 86_400).is_weekend()); // next Monday
    }

    #[test]
    fn at_time_of_day_stays_on_same_day() {
        let noon_day3 = Timestamp(3 * 86_400 + 12 * 3_600);
        let seven = noon_day3.at_time_of_day(7, 0);
        assert_eq!(seven.day_index(), 3);
        assert_eq!(seven.hour_of_day(), 7);
    }

    #[test]
    fn clock_advances_whole_periods() {
        let mut clock = SimClock::new(3_600);
        clock.advance_period();
        clock.advance_period();
        assert_eq!(clock.now, Timestamp(7_200));
        assert_eq!(clock.window_end(), Timestamp(10_800));
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

mod rng {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1_000_000u32), b.gen_range(0..1_000_000u32));
        }
    }

    #[test]
    fn same_seed_same_shuffle() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        let mut va: Vec<u32> = (0..32).collect();
        let mut vb: Vec<u32> = (0..32).collect();
        a.shuffle(&mut va);
        b.shuffle(&mut vb);
        assert_eq!(va, vb);
    }

    #[test]
    fn child_streams_diverge() {
        let mut root = SimRng::new(1);
        let mut c1 = root.child(1);
        let mut c2 = root.child(2);
        let s1: Vec<u32> = (0..8).map(|_| c1.gen_range(0..u32::MAX)).collect();
        let s2: Vec<u32> = (0..8).map(|_| c2.gen_range(0..u32::MAX)).collect();
        assert_ne!(s1, s2);
    }
}
