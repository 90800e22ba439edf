pub mod shutdown;
pub mod state;
pub mod summary;

pub use shutdown::{ShutdownManager, StopReason};
pub use state::{App, ConfigSource, RunOptions};
pub use summary::RunSummary;

use anyhow::Result;
use chrono::Utc;
use std::time::{Duration, Instant};
use swarmhive_core::{SceneHandle, SceneRunner};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const STATUS_INTERVAL: Duration = Duration::from_secs(1);

fn log_status(handle: &SceneHandle) {
    let counts = handle.counts();
    tracing::info!(
        tick = handle.tick_count(),
        queens = counts.queens,
        workers = counts.workers,
        food = counts.food,
        "Status"
    );
    for (i, queen) in handle.queen_stats().iter().enumerate() {
        tracing::info!(
            "Queen {} workers: {} | energy: {:.1}",
            i + 1,
            queen.workers,
            queen.energy
        );
    }
}

impl App {
    /// Runs the scene headless until Ctrl+C, the tick limit or the time
    /// limit, then joins the loop thread and writes the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let shutdown = ShutdownManager::new(self.options.summary_path.clone());
        shutdown.listen_for_ctrl_c();

        let started_at = Utc::now();
        let fingerprint = self.config.fingerprint();
        tracing::info!(fingerprint = %fingerprint, "Starting simulation");

        let scene = self.build_scene()?;
        let runner = SceneRunner::start(scene, self.loop_settings())?;
        let handle = runner.handle();

        let deadline = self
            .options
            .seconds
            .map(|s| Instant::now() + Duration::from_secs(s));
        let mut last_status = Instant::now();

        let reason = loop {
            if !runner.is_running() || runner.is_finished() {
                break StopReason::LoopExited;
            }
            if shutdown.is_shutdown_requested() {
                break StopReason::Interrupted;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break StopReason::TimeLimit;
            }
            if last_status.elapsed() >= STATUS_INTERVAL {
                last_status = Instant::now();
                log_status(&handle);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        };

        runner.stop();
        let outcome = tokio::task::spawn_blocking(move || runner.join()).await??;
        tracing::info!(ticks = outcome.ticks, "Scene loop stopped");

        let summary = RunSummary::collect(&handle, started_at, fingerprint);
        shutdown.cleanup(reason, &summary).await?;
        Ok(summary)
    }
}
