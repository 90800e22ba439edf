//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file, plus a loader for the legacy pair of JSON files
//! (`scene_config.json` and `queen_config.json`).
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [scene]
//! background_color = [20, 20, 20]
//! screen_width = 1900
//! screen_height = 1200
//! min_food_available = 6
//! start_obstacle_number = 10
//! mean_food_energy = 230.0
//! mean_food_speed = 4.0
//! food_type_ratio = [1.0]
//!
//! [[queens]]
//! birth_energy_threshold = 300.0
//! energy = 300.0
//! max_energy = 1000.0
//! energy_reduction_rate = 0.2
//! speed = 8.0
//! color = [200, 0, 150]
//! start_worker_number = 300
//!
//! [queens.worker_type]
//! behavior = "AdvancedWorker"
//! mean_energy = 150.0
//! energy_range = 10.0
//! mean_speed = 20.0
//! speed_range = 0.0
//! shouting_radius = 70.0
//! ```

use serde::{Deserialize, Serialize};
use swarmhive_data::Color;

/// Behavior name of the global-information worker.
pub const SIMPLE_WORKER: &str = "SimpleWorker";
/// Behavior name of the auditory-relay worker.
pub const ADVANCED_WORKER: &str = "AdvancedWorker";

const MAX_FOOD_TYPES: usize = 3;
const RATIO_TOLERANCE: f64 = 0.01;

fn default_target_fps() -> u32 {
    30
}

/// Scene-level configuration: bounds, food supply and obstacles.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub background_color: Color,
    pub screen_width: u32,
    pub screen_height: u32,
    pub min_food_available: usize,
    pub start_obstacle_number: usize,
    pub mean_food_energy: f64,
    pub mean_food_speed: f64,
    /// Fractions per food type, summing to 1.
    pub food_type_ratio: Vec<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background_color: Color::new(20, 20, 20),
            screen_width: 1900,
            screen_height: 1200,
            min_food_available: 6,
            start_obstacle_number: 10,
            mean_food_energy: 230.0,
            mean_food_speed: 4.0,
            food_type_ratio: vec![1.0],
            seed: None,
            target_fps: default_target_fps(),
        }
    }
}

/// Describes the workers a queen raises.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkerTypeConfig {
    /// Either `"SimpleWorker"` or `"AdvancedWorker"`.
    pub behavior: String,
    pub mean_energy: f64,
    pub energy_range: f64,
    pub mean_speed: f64,
    pub speed_range: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shouting_radius: Option<f64>,
}

impl WorkerTypeConfig {
    #[must_use]
    pub fn simple(mean_energy: f64, energy_range: f64, mean_speed: f64, speed_range: f64) -> Self {
        Self {
            behavior: SIMPLE_WORKER.to_string(),
            mean_energy,
            energy_range,
            mean_speed,
            speed_range,
            shouting_radius: None,
        }
    }

    #[must_use]
    pub fn advanced(
        mean_energy: f64,
        energy_range: f64,
        mean_speed: f64,
        speed_range: f64,
        shouting_radius: f64,
    ) -> Self {
        Self {
            behavior: ADVANCED_WORKER.to_string(),
            mean_energy,
            energy_range,
            mean_speed,
            speed_range,
            shouting_radius: Some(shouting_radius),
        }
    }
}

/// One colony: the queen's energy economy and the workers she spawns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueenConfig {
    pub birth_energy_threshold: f64,
    pub energy: f64,
    pub max_energy: f64,
    pub energy_reduction_rate: f64,
    pub speed: f64,
    pub color: Color,
    pub start_worker_number: usize,
    pub worker_type: WorkerTypeConfig,
}

/// Legacy `queen_config.json` layout.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct QueenFile {
    queens: Vec<QueenConfig>,
}

/// Application configuration loaded from `config.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub scene: SceneConfig,
    #[serde(default)]
    pub queens: Vec<QueenConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            queens: vec![
                QueenConfig {
                    birth_energy_threshold: 300.0,
                    energy: 300.0,
                    max_energy: 1000.0,
                    energy_reduction_rate: 0.2,
                    speed: 8.0,
                    color: Color::new(200, 0, 150),
                    start_worker_number: 300,
                    worker_type: WorkerTypeConfig::advanced(150.0, 10.0, 20.0, 0.0, 70.0),
                },
                QueenConfig {
                    birth_energy_threshold: 300.0,
                    energy: 300.0,
                    max_energy: 1000.0,
                    energy_reduction_rate: 0.2,
                    speed: 8.0,
                    color: Color::new(200, 200, 150),
                    start_worker_number: 100,
                    worker_type: WorkerTypeConfig::simple(150.0, 10.0, 15.0, 5.0),
                },
            ],
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.mean_food_energy.is_finite() && self.mean_food_energy >= 0.0,
            "Invalid mean_food_energy value detected in scene config"
        );
        anyhow::ensure!(
            self.mean_food_speed.is_finite() && self.mean_food_speed >= 0.0,
            "Invalid mean_food_speed value detected in scene config"
        );
        anyhow::ensure!(
            !self.food_type_ratio.is_empty(),
            "food_type_ratio must list at least one food type"
        );
        anyhow::ensure!(
            self.food_type_ratio.len() <= MAX_FOOD_TYPES,
            "food_type_ratio supports at most {} food types",
            MAX_FOOD_TYPES
        );
        anyhow::ensure!(
            self.food_type_ratio.iter().all(|r| (0.0..=1.0).contains(r)),
            "Every food_type_ratio entry must be within [0.0, 1.0]"
        );
        let total: f64 = self.food_type_ratio.iter().sum();
        anyhow::ensure!(
            (total - 1.0).abs() <= RATIO_TOLERANCE,
            "food_type_ratio values must add up to 1.0 (got {total})"
        );
        anyhow::ensure!(self.target_fps > 0, "Target FPS must be positive");
        anyhow::ensure!(self.target_fps <= 240, "Target FPS too high (max 240)");
        Ok(())
    }
}

impl QueenConfig {
    pub fn validate(&self, index: usize) -> anyhow::Result<()> {
        let checks = [
            ("birth_energy_threshold", self.birth_energy_threshold),
            ("energy", self.energy),
            ("max_energy", self.max_energy),
            ("energy_reduction_rate", self.energy_reduction_rate),
            ("speed", self.speed),
            ("worker_type.mean_energy", self.worker_type.mean_energy),
            ("worker_type.energy_range", self.worker_type.energy_range),
            ("worker_type.mean_speed", self.worker_type.mean_speed),
            ("worker_type.speed_range", self.worker_type.speed_range),
        ];
        for (field, value) in checks {
            anyhow::ensure!(
                value.is_finite() && value >= 0.0,
                "Invalid {field} value detected for queen {index}"
            );
        }
        let worker = &self.worker_type;
        anyhow::ensure!(
            (worker.mean_energy + worker.energy_range).is_finite()
                && (worker.mean_speed + worker.speed_range).is_finite(),
            "worker_type ranges of queen {index} overflow"
        );

        match self.worker_type.behavior.as_str() {
            SIMPLE_WORKER => {}
            ADVANCED_WORKER => {
                let radius = self.worker_type.shouting_radius;
                anyhow::ensure!(
                    radius.is_some(),
                    "Cannot find field <shouting_radius> in worker_type config of queen {index}"
                );
                anyhow::ensure!(
                    radius.is_some_and(|r| r.is_finite() && r >= 0.0),
                    "Invalid shouting_radius detected for worker_type of queen {index}"
                );
            }
            other => anyhow::bail!(
                "Invalid worker_type behavior {other:?} for queen {index}; choose \"{SIMPLE_WORKER}\" or \"{ADVANCED_WORKER}\""
            ),
        }
        Ok(())
    }
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.scene.validate()?;
        for (index, queen) in self.queens.iter().enumerate() {
            queen.validate(index)?;
        }
        Ok(())
    }

    /// Parses and validates a `config.toml` document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates the legacy scene/queen JSON documents.
    pub fn from_legacy_json(scene_json: &str, queens_json: &str) -> anyhow::Result<Self> {
        let scene: SceneConfig = serde_json::from_str(scene_json)?;
        let queens: QueenFile = serde_json::from_str(queens_json)?;
        let config = Self {
            scene,
            queens: queens.queens,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.scene).as_bytes());
        for queen in &self.queens {
            hasher.update(format!("{queen:?}").as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queens.len(), 2);
    }

    #[test]
    fn test_ratio_sum_must_be_one() {
        let config = AppConfig {
            scene: SceneConfig {
                food_type_ratio: vec![0.5, 0.4],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ratio_within_tolerance() {
        let config = SceneConfig {
            food_type_ratio: vec![0.333, 0.333, 0.333],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_too_many_food_types() {
        let config = SceneConfig {
            food_type_ratio: vec![0.25, 0.25, 0.25, 0.25],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_behavior_rejected() {
        let mut config = AppConfig::default();
        config.queens[0].worker_type.behavior = "LazyWorker".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_advanced_requires_radius() {
        let mut config = AppConfig::default();
        config.queens[0].worker_type.shouting_radius = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("shouting_radius"));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut config = AppConfig::default();
        config.queens[1].energy_reduction_rate = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        for bad in [f64::INFINITY, f64::NAN] {
            let mut config = AppConfig::default();
            config.queens[1].worker_type.speed_range = bad;
            assert!(config.validate().is_err(), "speed_range {bad} accepted");

            let mut config = AppConfig::default();
            config.queens[0].worker_type.shouting_radius = Some(bad);
            assert!(config.validate().is_err(), "shouting_radius {bad} accepted");

            let mut config = AppConfig::default();
            config.scene.mean_food_energy = bad;
            assert!(config.validate().is_err(), "mean_food_energy {bad} accepted");
        }
    }

    #[test]
    fn test_overflowing_range_rejected() {
        let mut config = AppConfig::default();
        config.queens[1].worker_type.mean_energy = 1e308;
        config.queens[1].worker_type.energy_range = 1e308;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_field_fails_to_parse() {
        let text = r#"
            [scene]
            background_color = [20, 20, 20]
            screen_width = 1900
            screen_height = 1200
            min_food_available = 6
            start_obstacle_number = 10
            mean_food_energy = 230.0
            food_type_ratio = [1.0]
        "#;
        assert!(AppConfig::from_toml(text).is_err());
    }

    #[test]
    fn test_legacy_json_pair() {
        let scene = r#"{
            "background_color": [20, 20, 20],
            "screen_width": 1900,
            "screen_height": 1200,
            "min_food_available": 6,
            "start_obstacle_number": 10,
            "mean_food_speed": 4,
            "mean_food_energy": 230,
            "food_type_ratio": [0.5, 0.5]
        }"#;
        let queens = r#"{ "queens": [{
            "birth_energy_threshold": 300,
            "energy": 300,
            "max_energy": 1000,
            "energy_reduction_rate": 0.2,
            "speed": 8,
            "color": [200, 0, 150],
            "start_worker_number": 50,
            "worker_type": {
                "behavior": "SimpleWorker",
                "mean_energy": 150,
                "energy_range": 10,
                "mean_speed": 20,
                "speed_range": 0
            }
        }]}"#;
        let config = AppConfig::from_legacy_json(scene, queens).unwrap();
        assert_eq!(config.scene.food_type_ratio, vec![0.5, 0.5]);
        assert_eq!(config.queens[0].start_worker_number, 50);
        assert_eq!(config.scene.target_fps, 30);
    }

    #[test]
    fn test_color_channel_out_of_range_fails() {
        let scene = r#"{
            "background_color": [20, 300, 20],
            "screen_width": 100, "screen_height": 100,
            "min_food_available": 1, "start_obstacle_number": 0,
            "mean_food_speed": 4, "mean_food_energy": 230,
            "food_type_ratio": [1.0]
        }"#;
        assert!(AppConfig::from_legacy_json(scene, r#"{"queens": []}"#).is_err());
    }

    #[test]
    fn test_fingerprint_tracks_changes() {
        let a = AppConfig::default();
        let mut b = AppConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.queens[0].speed = 9.0;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
