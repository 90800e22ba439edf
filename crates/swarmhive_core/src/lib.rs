//! # Swarmhive Core
//!
//! The simulation engine for Swarmhive - colonies led by queens raise workers
//! that forage for food and carry it home, while obstacles block movement.
//!
//! This crate contains:
//! - Entity primitives (movement, collision, energy)
//! - Passive entities (food, obstacles)
//! - Two worker decision algorithms: a global-information baseline and a
//!   local auditory-relay swarm algorithm
//! - Queen energy economy, worker spawning and adjacency precomputation
//! - The shared entity registry and the threaded scene loop
//!
//! ## Example
//!
//! ```
//! use swarmhive_core::config::{AppConfig, SceneConfig};
//! use swarmhive_core::scene::Scene;
//!
//! let mut scene_config = SceneConfig::default();
//! scene_config.start_obstacle_number = 0;
//! scene_config.seed = Some(7);
//! let mut scene = Scene::new(scene_config);
//!
//! let queens = AppConfig::default().queens;
//! scene.spawn_queen(400.0, 300.0, &queens[1]).unwrap();
//! scene.tick().unwrap();
//!
//! let counts = scene.counts();
//! assert_eq!(counts.queens, 1);
//! ```

/// Configuration types and validation
pub mod config;
/// Entity primitives shared by every simulated object
pub mod entity;
/// Error types for the engine
pub mod error;
/// Drifting, bite-depletable food sources
pub mod food;
/// Tick metrics and structured logging setup
pub mod metrics;
/// Static collision geometry
pub mod obstacle;
/// Colony queens: energy economy, spawning, adjacency
pub mod queen;
/// The shared registry of all live entities
pub mod registry;
/// Threaded frame-clock runner around a scene
pub mod runner;
/// The scene: tick loop, food top-up, user interaction
pub mod scene;
/// Worker record and both decision algorithms
pub mod worker;

pub use entity::{Body, Bounds, Direction};
pub use error::{Result, SimError};
pub use metrics::{init_logging, Metrics};
pub use registry::{Entity, EntityCounts, EntityRegistry};
pub use runner::{LoopSettings, SceneHandle, SceneRunner};
pub use scene::{Scene, SceneCommand, TickReport};
pub use swarmhive_data::{Color, EntityId, EntityKind, EntitySnapshot, QueenStats, SceneSnapshot};
