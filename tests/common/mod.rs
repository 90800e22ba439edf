pub mod macros;

use swarmhive_lib::model::config::{AppConfig, QueenConfig, SceneConfig};
use swarmhive_lib::model::Scene;
use swarmhive_data::EntityId;

/// Builds scenes with no starting food or obstacles unless asked for.
#[allow(dead_code)]
pub struct SceneBuilder {
    config: SceneConfig,
    queens: Vec<(f64, f64, QueenConfig)>,
}

#[allow(dead_code)]
impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            config: SceneConfig {
                min_food_available: 0,
                start_obstacle_number: 0,
                seed: Some(7),
                ..SceneConfig::default()
            },
            queens: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SceneConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_queen(mut self, x: f64, y: f64, queen: QueenConfig) -> Self {
        self.queens.push((x, y, queen));
        self
    }

    pub fn build(self) -> (Scene, Vec<EntityId>) {
        let mut scene = Scene::new(self.config);
        let ids = self
            .queens
            .iter()
            .map(|(x, y, queen)| scene.spawn_queen(*x, *y, queen).expect("queen spawns"))
            .collect();
        (scene, ids)
    }
}

/// The default advanced colony, resized.
#[allow(dead_code)]
pub fn advanced_queen(workers: usize) -> QueenConfig {
    let mut queen = AppConfig::default().queens[0].clone();
    queen.start_worker_number = workers;
    queen
}

/// The default simple colony, resized.
#[allow(dead_code)]
pub fn simple_queen(workers: usize) -> QueenConfig {
    let mut queen = AppConfig::default().queens[1].clone();
    queen.start_worker_number = workers;
    queen
}

/// A queen that cannot breed and starves at one unit per tick.
#[allow(dead_code)]
pub fn starving_queen(energy: f64) -> QueenConfig {
    let mut queen = simple_queen(0);
    queen.energy = energy;
    queen.max_energy = energy;
    queen.birth_energy_threshold = energy * 10.0;
    queen.energy_reduction_rate = 1.0;
    queen
}
