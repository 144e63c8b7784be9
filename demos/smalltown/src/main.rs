//! smalltown — the smallest complete gridway run.
//!
//! A 5×5 town: a cross of two roads, an isolated paved lot in the
//! northeast, and five named locations.  A few hundred commuters drive
//! between the northern apartments and the mall every weekday.
//!
//! Town plan (`B` built, `R` paved):
//!
//! ```text
//! B R . B .
//! . R . R B
//! . R . . .
//! R R R R R
//! B R . . B
//! ```

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use gw_output::{Tabulator, write_csv};
use gw_sim::{City, CityConfig};
use gw_trip::CommutePlanner;

// ── Constants ─────────────────────────────────────────────────────────────────

const COMMUTER_COUNT: usize = 200;
const SEED: u64 = 42;
const PERIOD_SECS: u32 = 3_600; // 1 tick = 1 hour
const SIM_DAYS: i64 = 7;
const OUTPUT_DIR: &str = "output";

fn main() -> Result<()> {
    let started = Instant::now();

    // ── Lay out the town ──────────────────────────────────────────────────
    let mut city = City::new(CityConfig::new(5, 5).with_seed(SEED))?;

    let mut roads: Vec<(u16, u16)> = (0..5).map(|x| (x, 1)).collect(); // east–west
    roads.extend((0..5).map(|y| (1, y))); // north–south
    roads.push((3, 3)); // the isolated lot
    city.pave_many(roads)?;

    let northview = city.make_location([(3, 4)], "Northview Apts")?;
    let east_lake = city.make_location([(4, 3)], "East Lake Mall")?;
    let southern_hills = city.make_location([(4, 0)], "Southern Hills Condos")?;
    let sw_mountain = city.make_location([(0, 0)], "Southwest Mountain Apts")?;
    let nw_heights = city.make_location([(0, 4)], "Northwest Heights Office Park")?;

    city.connect_location(northview, 3, 3)?;
    city.connect_location(east_lake, 3, 3)?;
    city.connect_location(southern_hills, 4, 1)?;
    city.connect_location(sw_mountain, 1, 0)?;
    city.connect_location(nw_heights, 1, 4)?;

    println!("{}", city.grid().render_map());
    println!(
        "graph: {} vertices, {} segments",
        city.graph().vertex_count(),
        city.graph().edge_count()
    );

    // ── Populate ──────────────────────────────────────────────────────────
    for _ in 0..COMMUTER_COUNT {
        city.add_resident(northview, Some(east_lake), Box::new(CommutePlanner::new()))?;
    }

    // ── Run ───────────────────────────────────────────────────────────────
    let mut tabulator = Tabulator::new();
    let ticks = SIM_DAYS * 86_400 / PERIOD_SECS as i64;
    for _ in 0..ticks {
        let report = city.advance(PERIOD_SECS)?;
        tabulator.record(&mut city)?;
        if report.released > 0 || report.dropped > 0 {
            println!(
                "{}: released {}, dropped {}, deferred {}",
                report.now, report.released, report.dropped, report.deferred
            );
        }
    }

    // ── Export ────────────────────────────────────────────────────────────
    let out = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(out)?;
    write_csv(&tabulator, out, "_smalltown")?;

    let finished: usize = tabulator.trip_counts().iter().map(|r| r.finished).sum();
    println!(
        "simulated {SIM_DAYS} days ({ticks} ticks) in {:.2?}: {} drives planned, {finished} finished",
        started.elapsed(),
        city.drives().len(),
    );
    if tabulator.has_imbalance() {
        println!("WARNING: population balance check failed — see balance_smalltown.csv");
    }
    println!("statistics written to {}/", OUTPUT_DIR);

    Ok(())
}
