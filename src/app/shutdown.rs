//! Ctrl+C handling and end-of-run cleanup for the headless driver.

use super::summary::RunSummary;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Why the driver stopped polling the scene loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    TimeLimit,
    LoopExited,
}

/// Tracks the stop request and owns the summary destination.
pub struct ShutdownManager {
    interrupted: Arc<AtomicBool>,
    summary_path: Option<PathBuf>,
}

impl ShutdownManager {
    pub fn new(summary_path: Option<PathBuf>) -> Self {
        Self {
            interrupted: Arc::new(AtomicBool::new(false)),
            summary_path,
        }
    }

    pub fn request_shutdown(&self) {
        if !self.interrupted.swap(true, Ordering::SeqCst) {
            tracing::info!("Shutdown requested");
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Sets the stop flag on the first Ctrl+C. Must be called inside a
    /// tokio runtime.
    pub fn listen_for_ctrl_c(&self) {
        let interrupted = Arc::clone(&self.interrupted);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received, stopping after the current tick");
                interrupted.store(true, Ordering::SeqCst);
            }
        });
    }

    pub fn summary_path(&self) -> Option<&Path> {
        self.summary_path.as_deref()
    }

    /// Logs the final state and writes the summary, if a path was given.
    pub async fn cleanup(&self, reason: StopReason, summary: &RunSummary) -> Result<()> {
        tracing::info!(
            ?reason,
            ticks = summary.ticks,
            queens = summary.counts.queens,
            workers = summary.counts.workers,
            "Run finished"
        );
        let Some(path) = self.summary_path() else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(summary)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing summary to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Run summary written");
        Ok(())
    }
}
