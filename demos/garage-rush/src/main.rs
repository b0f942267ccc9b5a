//! garage-rush: a downtown where one garage draws most of the traffic.
//!
//! Cars pick whichever facility looks emptiest to the pathfinder.  Induced
//! demand makes the garage look full while the first wave is still on the
//! road, so later cars spread to the curbside lanes instead of queueing for a
//! spot that will be gone when they arrive.  Halfway through, the garage
//! multiplier is doubled through a configuration hot-reload.
//!
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=pk_sim=debug`).

mod town;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use pk_capacity::{EdgeSpecification, EffectiveCapacity, Projection, scaled_garage_capacity};
use pk_core::{FacilityId, Frame, ParkingConfig};
use pk_demand::DemandLedger;
use pk_output::{CsvWriter, DemandOutputObserver, OutputWriter};
use pk_sim::{CapacityOracle, CapacityTable, ParkingObserver, ParkingSim, ParkingSimBuilder, TickReport};

use town::{GARAGE, SLOT_LENGTH, Town};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:              u64 = 7;
const TICKS:             u64 = 3_000;
const FRAMES_PER_TICK:   u32 = 16;
const SNAPSHOT_INTERVAL: u32 = 50;
const SPAWN_CHANCE:      f64 = 0.6;
/// Drivers prefer the garage: it is next to the shops.
const GARAGE_PREFERENCE: f32 = 2.0;
const OUTPUT_DIR:        &str = "output/garage-rush";

/// Connection edge weights while the garage is open.
const OPEN_GARAGE_EDGE: EdgeSpecification = EdgeSpecification { max_speed: 8.3, density: 0.6 };

// ── Observer ──────────────────────────────────────────────────────────────────

/// Writes the CSV trace and tracks the garage connection edge the graph
/// builder would use.
struct RushObserver<W: OutputWriter> {
    inner:                 DemandOutputObserver<W>,
    garage_edge:           EdgeSpecification,
    discouraged_refreshes: usize,
}

impl<W: OutputWriter> RushObserver<W> {
    fn new(inner: DemandOutputObserver<W>) -> Self {
        Self { inner, garage_edge: OPEN_GARAGE_EDGE, discouraged_refreshes: 0 }
    }
}

impl<W: OutputWriter> ParkingObserver for RushObserver<W> {
    fn on_refresh(&mut self, frame: Frame, facility: FacilityId, projection: &Projection) {
        if let EffectiveCapacity::Garage(g) = projection.effective {
            self.garage_edge = OPEN_GARAGE_EDGE;
            if self.garage_edge.apply_garage_demand(&g) {
                self.discouraged_refreshes += 1;
                debug!(%frame, count = g.effective, capacity = g.capacity, "garage edge discouraged");
            }
        }
        self.inner.on_refresh(frame, facility, projection);
    }

    fn on_tick_end(&mut self, frame: Frame, report: &TickReport) {
        self.inner.on_tick_end(frame, report);
    }

    fn on_snapshot(&mut self, frame: Frame, ledger: &DemandLedger) {
        self.inner.on_snapshot(frame, ledger);
    }
}

// ── Target choice ─────────────────────────────────────────────────────────────

/// Free room as the pathfinder sees it, in vehicles.
fn room(projection: &Projection) -> f32 {
    match projection.effective {
        EffectiveCapacity::Roadside { free_space } => (free_space / SLOT_LENGTH).floor(),
        EffectiveCapacity::Garage(g) if g.is_full_with_demand() => 0.0,
        EffectiveCapacity::Garage(g) => g.capacity.saturating_sub(g.effective) as f32,
    }
}

fn looks_full<O: CapacityOracle>(sim: &ParkingSim<O>, facility: FacilityId) -> bool {
    match sim.effective_capacity(facility) {
        Ok(Some(p)) => room(&p) < 1.0,
        _ => false,
    }
}

fn pick_target<O: CapacityOracle>(sim: &ParkingSim<O>, rng: &mut SmallRng) -> Result<FacilityId> {
    let mut best = (GARAGE, f32::MIN);
    for facility in town::all_facilities() {
        let Some(p) = sim.effective_capacity(facility)? else {
            continue;
        };
        let weight = if facility == GARAGE { GARAGE_PREFERENCE } else { 1.0 };
        let score = room(&p) * weight + rng.gen_range(0.0..0.5);
        if score > best.1 {
            best = (facility, score);
        }
    }
    Ok(best.0)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Town and oracle.
    let mut town = Town::new();
    let mut table = CapacityTable::new();
    town.publish(&mut table);

    // 2. Sim.
    let mut sim = ParkingSimBuilder::new(ParkingConfig::default(), table)
        .facilities(town::facilities())
        .frames_per_tick(FRAMES_PER_TICK)
        .snapshot_interval(SNAPSHOT_INTERVAL)
        .build()?;
    info!(
        ticks = TICKS,
        frames_per_tick = FRAMES_PER_TICK,
        facilities = sim.facility_count(),
        "garage-rush starting"
    );

    // 3. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = RushObserver::new(DemandOutputObserver::new(writer));

    // 4. Run.
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut garage_capacity = scaled_garage_capacity(town::GARAGE_CAPACITY, sim.config().garage_spots_multiplier);
    let mut suppressed = 0usize;
    let mut refreshes = 0usize;

    let t0 = Instant::now();
    for tick in 0..TICKS {
        if tick == TICKS / 2 {
            let next = ParkingConfig { garage_spots_multiplier: 2, ..sim.config().clone() };
            sim.apply_config(next)?;
            garage_capacity = scaled_garage_capacity(town::GARAGE_CAPACITY, sim.config().garage_spots_multiplier);
            info!(%tick, garage_capacity, "garage expanded");
        }

        town.depart(tick);
        let events = town.drive(tick, garage_capacity, &mut rng);
        town.publish(&mut sim.oracle);

        if rng.gen_bool(SPAWN_CHANCE) {
            let target = pick_target(&sim, &mut rng)?;
            town.spawn(&mut rng, target);
        }
        town.mark_obsolete(|f| looks_full(&sim, f));

        let report = sim.step(&events, &mut town.paths, &mut obs);
        suppressed += report.suppressed;
        refreshes += report.refreshed.len();

        // Whatever the limiter let through, the vehicle acts on now.
        if report.horizon_checked {
            for i in town.obsolete() {
                let target = pick_target(&sim, &mut rng)?;
                town.reroute(i, target);
            }
        }
    }
    let elapsed = t0.elapsed();

    obs.inner.finish();
    if let Some(e) = obs.inner.take_error() {
        warn!(error = %e, "output error");
    }

    // 5. Summary.
    let stats = town.stats;
    info!(
        elapsed_ms = elapsed.as_millis() as u64,
        spawned = stats.spawned,
        parked = stats.parked,
        turned_away = stats.turned_away,
        rerouted = stats.rerouted,
        left = stats.left,
        "run complete"
    );
    info!(
        refreshes,
        suppressed,
        garage_discouraged = obs.discouraged_refreshes,
        live_records = sim.ledger.len(),
        "demand activity"
    );

    println!();
    println!("{:<10} {:<8} {:<10}", "Facility", "Demand", "Cooldown");
    println!("{}", "-".repeat(30));
    for facility in sim.ledger.facilities() {
        if let Some(record) = sim.ledger.get(facility) {
            println!("{:<10} {:<8} {:<10}", facility.0, record.demand, record.cooldown_start);
        }
    }
    println!();
    println!("Trace written to {OUTPUT_DIR}/");

    Ok(())
}
