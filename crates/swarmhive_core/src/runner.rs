//! Threaded frame clock around a [`Scene`].
//!
//! The loop owns its own OS thread. Front ends share the scene through an
//! `Arc<Mutex<Scene>>` and queue [`SceneCommand`]s, which the loop drains
//! only between ticks, so no interactive request ever lands mid-tick.

use crate::error::{Result, SimError};
use crate::registry::EntityCounts;
use crate::scene::{Scene, SceneCommand};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use swarmhive_data::{QueenStats, SceneSnapshot};

/// Frame rate and optional tick limit for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub fps: u32,
    pub max_ticks: Option<u64>,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            max_ticks: None,
        }
    }
}

impl LoopSettings {
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    #[must_use]
    pub fn limit_reached(&self, ticks: u64) -> bool {
        self.max_ticks.is_some_and(|max| ticks >= max)
    }
}

fn lock(scene: &Mutex<Scene>) -> MutexGuard<'_, Scene> {
    scene.lock().unwrap_or_else(|e| e.into_inner())
}

/// Cloneable access to a running scene.
#[derive(Clone)]
pub struct SceneHandle {
    scene: Arc<Mutex<Scene>>,
    commands: Sender<SceneCommand>,
}

impl SceneHandle {
    /// Queues a request for the next tick boundary. Returns `false` once the
    /// loop has exited.
    pub fn send(&self, command: SceneCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Runs `f` with the scene locked. Holding the lock stalls the loop.
    pub fn with_scene<T>(&self, f: impl FnOnce(&mut Scene) -> T) -> T {
        let mut scene = lock(&self.scene);
        f(&mut scene)
    }

    #[must_use]
    pub fn counts(&self) -> EntityCounts {
        self.with_scene(|s| s.counts())
    }

    #[must_use]
    pub fn queen_stats(&self) -> Vec<QueenStats> {
        self.with_scene(|s| s.queen_stats())
    }

    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        self.with_scene(|s| s.snapshot())
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.with_scene(|s| s.tick_count())
    }
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub ticks: u64,
}

pub struct SceneRunner {
    handle: SceneHandle,
    running: Arc<AtomicBool>,
    thread: JoinHandle<Result<u64>>,
}

impl SceneRunner {
    /// Moves the scene onto a new `scene-loop` thread and starts ticking.
    pub fn start(scene: Scene, settings: LoopSettings) -> Result<Self> {
        let scene = Arc::new(Mutex::new(scene));
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));

        let thread = {
            let scene = Arc::clone(&scene);
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("scene-loop".to_string())
                .spawn(move || {
                    let outcome = run_loop(&scene, &rx, &running, settings);
                    running.store(false, Ordering::SeqCst);
                    outcome
                })?
        };

        tracing::info!(fps = settings.fps, max_ticks = ?settings.max_ticks, "Scene loop started");
        Ok(Self {
            handle: SceneHandle {
                scene,
                commands: tx,
            },
            running,
            thread,
        })
    }

    #[must_use]
    pub fn handle(&self) -> SceneHandle {
        self.handle.clone()
    }

    /// Asks the loop to exit at the next tick boundary.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// True until the loop has been asked to stop or has stopped on its own.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Blocks until the loop thread has exited.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the run, or [`SimError::LoopPanicked`].
    pub fn join(self) -> Result<RunOutcome> {
        let result = self
            .thread
            .join()
            .map_err(|panic| SimError::LoopPanicked(panic_message(&*panic)))?;
        let ticks = result?;
        tracing::info!(ticks, "Scene loop joined");
        Ok(RunOutcome { ticks })
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn run_loop(
    scene: &Mutex<Scene>,
    commands: &Receiver<SceneCommand>,
    running: &AtomicBool,
    settings: LoopSettings,
) -> Result<u64> {
    let frame = settings.frame_duration();
    let mut ticks = 0;

    while running.load(Ordering::SeqCst) && !settings.limit_reached(ticks) {
        let started = Instant::now();
        {
            let mut scene = lock(scene);
            while let Ok(command) = commands.try_recv() {
                if let Err(e) = scene.apply(command) {
                    tracing::warn!(error = %e, "Rejected scene command");
                }
            }
            if let Err(e) = scene.tick() {
                tracing::error!(
                    error = %e,
                    tick = scene.tick_count(),
                    "Tick failed, aborting run"
                );
                return Err(e);
            }
        }
        ticks += 1;
        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
    Ok(ticks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    fn scene() -> Scene {
        Scene::new(SceneConfig {
            min_food_available: 2,
            start_obstacle_number: 0,
            seed: Some(3),
            ..Default::default()
        })
    }

    #[test]
    fn test_tick_limit_ends_run() {
        let settings = LoopSettings {
            fps: 240,
            max_ticks: Some(5),
        };
        let runner = SceneRunner::start(scene(), settings).unwrap();
        let handle = runner.handle();
        let outcome = runner.join().unwrap();
        assert_eq!(outcome.ticks, 5);
        assert_eq!(handle.tick_count(), 5);
    }

    #[test]
    fn test_commands_apply_between_ticks() {
        let settings = LoopSettings {
            fps: 240,
            max_ticks: None,
        };
        let runner = SceneRunner::start(scene(), settings).unwrap();
        let handle = runner.handle();
        assert!(handle.send(SceneCommand::SetPaused(true)));
        assert!(handle.send(SceneCommand::SpawnObstacle { x: 5.0, y: 5.0 }));
        while handle.counts().obstacles == 0 {
            thread::sleep(Duration::from_millis(2));
        }
        runner.stop();
        runner.join().unwrap();
        assert!(handle.with_scene(|s| s.is_paused()));
        assert!(!handle.send(SceneCommand::EndDrag));
    }

    #[test]
    fn test_frame_duration() {
        let settings = LoopSettings {
            fps: 50,
            max_ticks: None,
        };
        assert_eq!(settings.frame_duration(), Duration::from_millis(20));
        assert!(!settings.limit_reached(1_000_000));
    }
}
