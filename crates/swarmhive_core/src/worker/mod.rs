//! Workers: one flattened record, two decision algorithms.
//!
//! Every worker shares the same state (body, home queen, carried food).
//! [`Brain`] selects the per-tick decision function and holds the little
//! state that only one algorithm needs.

pub mod advanced;
pub mod simple;

use crate::config::{WorkerTypeConfig, ADVANCED_WORKER, SIMPLE_WORKER};
use crate::entity::{Body, Bounds, Direction};
use crate::error::{Result, SimError};
use crate::registry::EntityRegistry;
use rand::Rng;
use swarmhive_data::{Color, EntityId, EntityKind, EntitySnapshot};

pub use advanced::AuditoryMemory;

/// Energy every worker burns per tick.
pub const WORKER_ENERGY_REDUCTION_RATE: f64 = 0.1;
/// Movement jitter for both worker kinds.
pub const WORKER_JITTER: u32 = 5;
/// Render radius of a worker.
pub const WORKER_SIZE: f64 = 4.0;

/// Which algorithm a worker runs.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerBehavior {
    Simple,
    Advanced { shouting_radius: f64 },
}

impl WorkerBehavior {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            WorkerBehavior::Simple => SIMPLE_WORKER,
            WorkerBehavior::Advanced { .. } => ADVANCED_WORKER,
        }
    }
}

/// Spawn recipe a queen uses for every worker she raises.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerTemplate {
    pub behavior: WorkerBehavior,
    pub mean_energy: f64,
    pub energy_range: f64,
    pub mean_speed: f64,
    pub speed_range: f64,
}

impl TryFrom<&WorkerTypeConfig> for WorkerTemplate {
    type Error = SimError;

    fn try_from(config: &WorkerTypeConfig) -> Result<Self> {
        let behavior = match config.behavior.as_str() {
            SIMPLE_WORKER => WorkerBehavior::Simple,
            ADVANCED_WORKER => WorkerBehavior::Advanced {
                shouting_radius: config
                    .shouting_radius
                    .ok_or(SimError::MissingShoutingRadius)?,
            },
            other => return Err(SimError::UnknownWorkerBehavior(other.to_string())),
        };
        Ok(Self {
            behavior,
            mean_energy: config.mean_energy,
            energy_range: config.energy_range,
            mean_speed: config.mean_speed,
            speed_range: config.speed_range,
        })
    }
}

/// Uniform draw from `[mean - max(range, 1), mean + range]`. A window that
/// is not finite collapses to `mean`, or to 0 when `mean` itself is not.
fn draw_around<R: Rng + ?Sized>(rng: &mut R, mean: f64, range: f64) -> f64 {
    let lo = mean - range.max(1.0);
    let hi = mean + range;
    if !(lo.is_finite() && hi.is_finite()) {
        return if mean.is_finite() { mean } else { 0.0 };
    }
    if hi <= lo {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

impl WorkerTemplate {
    #[must_use]
    pub fn is_advanced(&self) -> bool {
        matches!(self.behavior, WorkerBehavior::Advanced { .. })
    }

    /// A fresh, queenless worker at `(x, y)`.
    pub fn instantiate<R: Rng + ?Sized>(&self, x: f64, y: f64, rng: &mut R) -> Worker {
        let energy = draw_around(rng, self.mean_energy, self.energy_range);
        let speed = draw_around(rng, self.mean_speed, self.speed_range);
        match self.behavior {
            WorkerBehavior::Simple => Worker::simple(x, y, energy, speed),
            WorkerBehavior::Advanced { shouting_radius } => {
                Worker::advanced(x, y, energy, speed, shouting_radius, rng)
            }
        }
    }
}

/// Algorithm-specific worker state.
#[derive(Debug, Clone, PartialEq)]
pub enum Brain {
    /// Global-information baseline: remembers which food it is heading for.
    Simple { target_food: Option<EntityId> },
    /// Local auditory relay.
    Advanced(AuditoryMemory),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Worker {
    pub id: EntityId,
    pub body: Body,
    /// Home colony. May name a queen that has already died until the
    /// worker's next step notices.
    pub queen: Option<EntityId>,
    pub carrying_food: bool,
    /// Color of the last food bitten.
    pub food_color: Option<Color>,
    pub energy_reduction_rate: f64,
    pub brain: Brain,
}

impl Worker {
    fn with_brain(x: f64, y: f64, energy: f64, speed: f64, brain: Brain) -> Self {
        let mut body = Body::new(x, y);
        body.energy = energy;
        body.speed = speed;
        body.color = Color::WORKER_DEFAULT;
        Self {
            id: EntityId::new(),
            body,
            queen: None,
            carrying_food: false,
            food_color: None,
            energy_reduction_rate: WORKER_ENERGY_REDUCTION_RATE,
            brain,
        }
    }

    /// Starts at rest; it picks a heading on its first step.
    #[must_use]
    pub fn simple(x: f64, y: f64, energy: f64, speed: f64) -> Self {
        Self::with_brain(x, y, energy, speed, Brain::Simple { target_food: None })
    }

    pub fn advanced<R: Rng + ?Sized>(
        x: f64,
        y: f64,
        energy: f64,
        speed: f64,
        shouting_radius: f64,
        rng: &mut R,
    ) -> Self {
        let mut worker = Self::with_brain(
            x,
            y,
            energy,
            speed,
            Brain::Advanced(AuditoryMemory::new(shouting_radius)),
        );
        worker.body.direction = Direction::random(rng);
        worker
    }

    #[must_use]
    pub fn behavior(&self) -> WorkerBehavior {
        match &self.brain {
            Brain::Simple { .. } => WorkerBehavior::Simple,
            Brain::Advanced(memory) => WorkerBehavior::Advanced {
                shouting_radius: memory.shouting_radius,
            },
        }
    }

    #[must_use]
    pub fn is_advanced(&self) -> bool {
        matches!(self.brain, Brain::Advanced(_))
    }

    #[must_use]
    pub fn memory(&self) -> Option<&AuditoryMemory> {
        match &self.brain {
            Brain::Advanced(memory) => Some(memory),
            Brain::Simple { .. } => None,
        }
    }

    pub fn memory_mut(&mut self) -> Option<&mut AuditoryMemory> {
        match &mut self.brain {
            Brain::Advanced(memory) => Some(memory),
            Brain::Simple { .. } => None,
        }
    }

    #[must_use]
    pub fn target_food(&self) -> Option<EntityId> {
        match self.brain {
            Brain::Simple { target_food } => target_food,
            Brain::Advanced(_) => None,
        }
    }

    /// Registers a worker within shouting range for this tick. Ignored by
    /// simple workers.
    pub fn hear(&mut self, other: EntityId) {
        if let Brain::Advanced(memory) = &mut self.brain {
            memory.adjacent.push(other);
        }
    }

    #[must_use]
    pub fn adjacent(&self) -> &[EntityId] {
        match &self.brain {
            Brain::Advanced(memory) => memory.adjacent.as_slice(),
            Brain::Simple { .. } => &[],
        }
    }

    /// Drops the home queen once she is no longer in the queen view.
    pub fn forget_dead_queen(&mut self, registry: &EntityRegistry) {
        if self.queen.is_some_and(|q| !registry.is_queen_alive(q)) {
            self.queen = None;
        }
    }

    /// True while the home queen resolves and is at or below her energy cap.
    #[must_use]
    pub fn queen_wants_food(&self, registry: &EntityRegistry) -> bool {
        self.queen
            .and_then(|q| registry.queen(q))
            .is_some_and(|queen| queen.body.energy <= queen.max_energy())
    }

    /// Nearest food over the whole scene; ties keep the earliest.
    #[must_use]
    pub fn closest_food(&self, registry: &EntityRegistry) -> Option<EntityId> {
        let mut best: Option<(EntityId, f64)> = None;
        for food in registry.foods() {
            let distance = self.body.distance_to(&food.body);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((food.id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn move_randomly<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.body.set_random_direction(rng);
    }

    pub fn turn_around(&mut self) {
        self.body.direction = self.body.direction.reversed();
    }

    /// One tick of behavior. Returns whether the worker is still alive.
    pub fn behave<R: Rng + ?Sized>(
        &mut self,
        registry: &mut EntityRegistry,
        bounds: Bounds,
        rng: &mut R,
    ) -> bool {
        match self.brain {
            Brain::Simple { .. } => simple::step(self, registry, bounds, rng),
            Brain::Advanced(_) => advanced::step(self, registry, bounds, rng),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: EntityKind::Worker,
            x: self.body.x,
            y: self.body.y,
            color: self.body.color,
            size: WORKER_SIZE,
            energy: self.body.energy,
            carried_food: if self.carrying_food {
                self.food_color
            } else {
                None
            },
        }
    }
}
