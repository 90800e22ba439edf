//! Tick metrics for the scene loop.
//!
//! Provides structured logging and counters for monitoring simulation
//! throughput and colony health.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// How often the periodic summary line is emitted.
const LOG_EVERY_TICKS: u64 = 1000;

/// Metrics collector owned by a scene.
pub struct Metrics {
    tick_count: AtomicU64,
    entity_count: AtomicU64,
    food_count: AtomicU64,
    births: AtomicU64,
    deaths: AtomicU64,
    last_tick_micros: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            entity_count: AtomicU64::new(0),
            food_count: AtomicU64::new(0),
            births: AtomicU64::new(0),
            deaths: AtomicU64::new(0),
            last_tick_micros: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, entities: usize, food: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.entity_count.store(entities as u64, Ordering::Relaxed);
        self.food_count.store(food as u64, Ordering::Relaxed);
        self.last_tick_micros
            .store(duration.as_micros() as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick % LOG_EVERY_TICKS == 0 {
            tracing::info!(
                tick = tick,
                entities = entities,
                food = food,
                births = self.births.load(Ordering::Relaxed),
                deaths = self.deaths.load(Ordering::Relaxed),
                duration_us = duration.as_micros() as u64,
                elapsed_s = self.elapsed().as_secs_f64(),
                "Simulation tick"
            );
        }
    }

    pub fn record_births(&self, n: usize) {
        self.births.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_deaths(&self, n: usize) {
        self.deaths.fetch_add(n as u64, Ordering::Relaxed);
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn entity_count(&self) -> u64 {
        self.entity_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn food_count(&self) -> u64 {
        self.food_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn births(&self) -> u64 {
        self.births.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deaths(&self) -> u64 {
        self.deaths.load(Ordering::Relaxed)
    }

    /// Duration of the most recent tick.
    #[must_use]
    pub fn last_tick_duration(&self) -> Duration {
        Duration::from_micros(self.last_tick_micros.load(Ordering::Relaxed))
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honours `RUST_LOG`; falls back to `info`. Calling it twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_thread_names(true)
            .finish(),
    )
    .ok();
}
