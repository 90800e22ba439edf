use chrono::{DateTime, Utc};
use serde::Serialize;
use swarmhive_core::registry::EntityCounts;
use swarmhive_core::SceneHandle;
use swarmhive_data::QueenStats;

/// Final state of a run, written as JSON on exit.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub ticks: u64,
    pub config_fingerprint: String,
    pub counts: EntityCounts,
    pub queens: Vec<QueenStats>,
    pub births: u64,
    pub deaths: u64,
}

impl RunSummary {
    pub fn empty(config_fingerprint: String) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            ticks: 0,
            config_fingerprint,
            counts: EntityCounts::default(),
            queens: Vec::new(),
            births: 0,
            deaths: 0,
        }
    }

    /// Reads the final figures from a scene whose loop has exited.
    pub fn collect(
        handle: &SceneHandle,
        started_at: DateTime<Utc>,
        config_fingerprint: String,
    ) -> Self {
        handle.with_scene(|scene| Self {
            started_at,
            finished_at: Utc::now(),
            ticks: scene.tick_count(),
            config_fingerprint,
            counts: scene.counts(),
            queens: scene.queen_stats(),
            births: scene.metrics().births(),
            deaths: scene.metrics().deaths(),
        })
    }
}
