use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use swarmhive_core::config::AppConfig;
use swarmhive_core::{LoopSettings, Scene};

/// Where the run configuration comes from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// A single `config.toml`; written with defaults when missing.
    Toml(PathBuf),
    /// The older pair of JSON documents, one for the scene and one for queens.
    LegacyJson { scene: PathBuf, queens: PathBuf },
}

/// Command-line overrides for a headless run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub ticks: Option<u64>,
    pub seconds: Option<u64>,
    pub fps: Option<u32>,
    pub summary_path: Option<PathBuf>,
}

pub struct App {
    pub config: AppConfig,
    pub options: RunOptions,
}

impl App {
    /// Loads and validates the configuration. Invalid files are rejected
    /// before any entity is created.
    pub fn load_config(source: &ConfigSource) -> Result<AppConfig> {
        match source {
            ConfigSource::Toml(path) => Self::load_toml(path),
            ConfigSource::LegacyJson { scene, queens } => {
                let scene_json = std::fs::read_to_string(scene)
                    .with_context(|| format!("reading {}", scene.display()))?;
                let queens_json = std::fs::read_to_string(queens)
                    .with_context(|| format!("reading {}", queens.display()))?;
                AppConfig::from_legacy_json(&scene_json, &queens_json)
                    .with_context(|| format!("invalid configuration in {}", queens.display()))
            }
        }
    }

    fn load_toml(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            let default = AppConfig::default();
            std::fs::write(path, default.to_toml()?)
                .with_context(|| format!("writing default config to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote default configuration");
            return Ok(default);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        AppConfig::from_toml(&content)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn new(source: &ConfigSource, options: RunOptions) -> Result<Self> {
        let config = Self::load_config(source)?;
        Ok(Self { config, options })
    }

    /// Builds the scene with its obstacles, initial food and every
    /// configured queen placed at random.
    pub fn build_scene(&self) -> Result<Scene> {
        let mut scene = Scene::new(self.config.scene.clone());
        for queen in &self.config.queens {
            scene.spawn_queen_at_random(queen)?;
        }
        tracing::info!(
            queens = self.config.queens.len(),
            workers = scene.counts().workers,
            "Scene ready"
        );
        Ok(scene)
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            fps: self.options.fps.unwrap_or(self.config.scene.target_fps),
            max_ticks: self.options.ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_toml_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = App::load_config(&ConfigSource::Toml(path.clone())).unwrap();
        assert!(path.exists());
        assert_eq!(config.queens.len(), 2);
        let reloaded = App::load_config(&ConfigSource::Toml(path)).unwrap();
        assert_eq!(config.fingerprint(), reloaded.fingerprint());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config.queens[0].worker_type.behavior = "LazyWorker".into();
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();
        assert!(App::load_config(&ConfigSource::Toml(path)).is_err());
    }

    #[test]
    fn test_cli_fps_overrides_config() {
        let app = App {
            config: AppConfig::default(),
            options: RunOptions {
                fps: Some(60),
                ticks: Some(5),
                ..RunOptions::default()
            },
        };
        let settings = app.loop_settings();
        assert_eq!(settings.fps, 60);
        assert_eq!(settings.max_ticks, Some(5));
    }
}
