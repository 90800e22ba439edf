//! The scene: owns the registry, advances it one tick at a time and applies
//! interactive requests between ticks.

use crate::config::{QueenConfig, SceneConfig};
use crate::entity::Bounds;
use crate::error::{Result, SimError};
use crate::food::{Food, FoodTypeTable};
use crate::metrics::Metrics;
use crate::obstacle::{Obstacle, DEFAULT_OBSTACLE_SIZE};
use crate::queen::{Queen, INITIAL_SPAWN_RADIUS};
use crate::registry::{Entity, EntityCounts, EntityRegistry};
use crate::runner::LoopSettings;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use swarmhive_data::{EntityId, EntityKind, QueenStats, SceneSnapshot};

/// Food is topped up when a roll in `0..=100` is at most this.
pub const FOOD_SPAWN_ROLL: u32 = 8;
/// Half-width of the box searched around a click.
pub const CLICK_RADIUS: f64 = 40.0;

/// Requests a front end can queue for the loop thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    SpawnFood { x: f64, y: f64 },
    SpawnObstacle { x: f64, y: f64 },
    SpawnQueen { x: f64, y: f64, config: Box<QueenConfig> },
    Remove(EntityId),
    PrimaryClick { x: f64, y: f64 },
    SecondaryClick { x: f64, y: f64 },
    DragTo { x: f64, y: f64 },
    EndDrag,
    SetPaused(bool),
    TogglePause,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub died: usize,
    pub spawned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    id: EntityId,
    x: f64,
    y: f64,
}

pub struct Scene {
    config: SceneConfig,
    bounds: Bounds,
    food_types: FoodTypeTable,
    registry: EntityRegistry,
    rng: ChaCha8Rng,
    tick: u64,
    paused: bool,
    drag: Option<Drag>,
    metrics: Metrics,
}

impl Scene {
    /// Builds a scene seeded with the configured starting food and
    /// obstacles.
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut scene = Self {
            bounds: Bounds::new(
                f64::from(config.screen_width),
                f64::from(config.screen_height),
            ),
            food_types: FoodTypeTable::new(&config.food_type_ratio),
            registry: EntityRegistry::new(),
            rng,
            tick: 0,
            paused: false,
            drag: None,
            metrics: Metrics::new(),
            config,
        };
        scene.spawn_random_food(scene.config.min_food_available);
        scene.spawn_random_obstacles(scene.config.start_obstacle_number);
        tracing::info!(
            width = scene.bounds.width,
            height = scene.bounds.height,
            food = scene.config.min_food_available,
            obstacles = scene.config.start_obstacle_number,
            "Scene created"
        );
        scene
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Read access to the live registry.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    /// Registered entities per category. Food eaten down to nothing awaits
    /// removal on its own turn and is not counted.
    #[must_use]
    pub fn counts(&self) -> EntityCounts {
        let eaten = self
            .registry
            .foods()
            .filter(|food| !food.body.is_alive())
            .count();
        let mut counts = self.registry.counts();
        counts.food -= eaten;
        counts
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            tracing::info!(paused, "Simulation pause toggled");
        }
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    pub fn spawn_food(&mut self, x: f64, y: f64) -> EntityId {
        let food_type = self.food_types.pick(&mut self.rng);
        let food = Food::new(
            x,
            y,
            self.config.mean_food_energy,
            self.config.mean_food_speed,
            food_type,
            &mut self.rng,
        );
        self.registry.insert(food)
    }

    pub fn spawn_random_food(&mut self, count: usize) -> Vec<EntityId> {
        (0..count)
            .map(|_| {
                let (x, y) = self.bounds.random_point(&mut self.rng);
                self.spawn_food(x, y)
            })
            .collect()
    }

    pub fn spawn_obstacle(&mut self, x: f64, y: f64) -> EntityId {
        self.registry.insert(Obstacle::new(x, y, DEFAULT_OBSTACLE_SIZE))
    }

    pub fn spawn_random_obstacles(&mut self, count: usize) -> Vec<EntityId> {
        (0..count)
            .map(|_| {
                let (x, y) = self.bounds.random_point(&mut self.rng);
                self.spawn_obstacle(x, y)
            })
            .collect()
    }

    /// Places a queen and her starting workers, free of charge, within
    /// [`INITIAL_SPAWN_RADIUS`].
    ///
    /// # Errors
    ///
    /// Rejects a colony description that fails validation or names a worker
    /// type the engine cannot build. Nothing is inserted in that case.
    pub fn spawn_queen(&mut self, x: f64, y: f64, config: &QueenConfig) -> Result<EntityId> {
        let context = || format!("spawning queen at ({x:.0}, {y:.0})");
        config
            .validate(self.registry.queen_ids().len())
            .map_err(|e| SimError::invalid_config(format!("{e:#}")).with_context(context()))?;
        let queen =
            Queen::new(x, y, config, &mut self.rng).map_err(|e| e.with_context(context()))?;
        let id = self.registry.insert(queen);
        let bounds = self.bounds;
        let rng = &mut self.rng;
        self.registry.with_checked_out(id, |entity, registry| {
            if let Entity::Queen(queen) = entity {
                queen.spawn_workers(
                    registry,
                    config.start_worker_number,
                    bounds,
                    0.0,
                    INITIAL_SPAWN_RADIUS,
                    rng,
                );
            }
        })?;
        tracing::info!(
            queen = %id,
            x,
            y,
            workers = config.start_worker_number,
            behavior = %config.worker_type.behavior,
            "Queen spawned"
        );
        Ok(id)
    }

    /// Places a queen at a uniformly random point inside the bounds.
    pub fn spawn_queen_at_random(&mut self, config: &QueenConfig) -> Result<EntityId> {
        let x = self.rng.gen_range(0.0..=self.bounds.width);
        let y = self.rng.gen_range(0.0..=self.bounds.height);
        self.spawn_queen(x, y, config)
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.registry.remove(id);
        if let Some(entity) = &removed {
            tracing::info!(id = %id, kind = %entity.kind(), "Removing entity");
        }
        removed
    }

    /// First entity whose position lies within the click box, searching
    /// obstacles, then queens, then food.
    #[must_use]
    pub fn entity_at(&self, x: f64, y: f64) -> Option<EntityId> {
        let hit = |id: &&EntityId| {
            self.registry.get(**id).is_some_and(|e| {
                let body = e.body();
                (x - body.x).abs() <= CLICK_RADIUS && (y - body.y).abs() <= CLICK_RADIUS
            })
        };
        self.registry
            .obstacle_ids()
            .iter()
            .chain(self.registry.queen_ids())
            .chain(self.registry.food_ids())
            .find(hit)
            .copied()
    }

    /// Starts dragging the clicked entity, or drops food where nothing was
    /// hit.
    pub fn primary_click(&mut self, x: f64, y: f64) -> Option<EntityId> {
        match self.entity_at(x, y) {
            Some(id) => {
                tracing::info!(id = %id, "Dragging entity");
                self.drag = Some(Drag { id, x, y });
                Some(id)
            }
            None => {
                tracing::info!(x, y, "Spawning food");
                self.spawn_food(x, y);
                None
            }
        }
    }

    /// Removes a clicked obstacle, or places one.
    pub fn secondary_click(&mut self, x: f64, y: f64) {
        let clicked = self
            .entity_at(x, y)
            .filter(|id| self.registry.obstacle(*id).is_some());
        match clicked {
            Some(id) => {
                self.remove_entity(id);
            }
            None => {
                tracing::info!(x, y, "Spawning obstacle");
                self.spawn_obstacle(x, y);
            }
        }
    }

    /// Moves the drag target; takes effect on the next drag application.
    pub fn drag_to(&mut self, x: f64, y: f64) {
        if let Some(drag) = &mut self.drag {
            drag.x = x;
            drag.y = y;
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    #[must_use]
    pub fn dragged(&self) -> Option<EntityId> {
        self.drag.map(|d| d.id)
    }

    /// Pins the dragged entity to the pointer, ending the drag once the
    /// entity is gone or out of energy.
    fn apply_drag(&mut self) {
        let Some(drag) = self.drag else {
            return;
        };
        match self.registry.get_mut(drag.id) {
            Some(entity) if entity.body().energy > 0.0 => {
                entity.body_mut().set_position(drag.x, drag.y);
            }
            _ => self.drag = None,
        }
    }

    pub fn apply(&mut self, command: SceneCommand) -> Result<()> {
        match command {
            SceneCommand::SpawnFood { x, y } => {
                self.spawn_food(x, y);
            }
            SceneCommand::SpawnObstacle { x, y } => {
                self.spawn_obstacle(x, y);
            }
            SceneCommand::SpawnQueen { x, y, config } => {
                self.spawn_queen(x, y, &config)?;
            }
            SceneCommand::Remove(id) => {
                self.remove_entity(id);
            }
            SceneCommand::PrimaryClick { x, y } => {
                self.primary_click(x, y);
            }
            SceneCommand::SecondaryClick { x, y } => self.secondary_click(x, y),
            SceneCommand::DragTo { x, y } => self.drag_to(x, y),
            SceneCommand::EndDrag => self.end_drag(),
            SceneCommand::SetPaused(paused) => self.set_paused(paused),
            SceneCommand::TogglePause => self.toggle_pause(),
        }
        Ok(())
    }

    /// Advances the simulation by one tick.
    ///
    /// Every entity present at the start of the tick acts once, in
    /// registry order; entities born during the tick first act on the next
    /// one. An entity that reports death is excised before the next one
    /// acts.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole tick.
    pub fn tick(&mut self) -> Result<TickReport> {
        let started = Instant::now();
        let before = self.registry.len();
        let mut died = 0;

        if !self.paused {
            died = self.behave_all()?;
            self.spawn_periodic_food();
        }
        self.apply_drag();

        self.tick += 1;
        let spawned = (self.registry.len() + died).saturating_sub(before);
        self.metrics.record_births(spawned);
        self.metrics.record_deaths(died);
        self.metrics.record_tick(
            started.elapsed(),
            self.registry.len(),
            self.registry.food_ids().len(),
        );
        Ok(TickReport {
            tick: self.tick,
            died,
            spawned,
        })
    }

    fn behave_all(&mut self) -> Result<usize> {
        let order = self.registry.ids().to_vec();
        let bounds = self.bounds;
        let mut died = 0;

        for id in order {
            if !self.registry.contains(id) {
                continue;
            }
            let rng = &mut self.rng;
            let alive = self.registry.with_checked_out(id, |entity, registry| match entity {
                Entity::Food(food) => food.behave(registry, bounds, rng),
                Entity::Obstacle(_) => true,
                Entity::Worker(worker) => worker.behave(registry, bounds, rng),
                Entity::Queen(queen) => queen.behave(registry, bounds, rng),
            })?;
            if alive {
                continue;
            }
            if let Some(entity) = self.registry.remove(id) {
                died += 1;
                if let Entity::Queen(queen) = &entity {
                    tracing::info!(
                        queen = %queen.id,
                        workers = queen.worker_count(),
                        tick = self.tick,
                        "Queen died"
                    );
                }
            }
        }
        Ok(died)
    }

    fn spawn_periodic_food(&mut self) {
        if self.registry.food_ids().len() < self.config.min_food_available
            && self.rng.gen_range(0..=100) <= FOOD_SPAWN_ROLL
        {
            let (x, y) = self.bounds.random_point(&mut self.rng);
            self.spawn_food(x, y);
        }
    }

    /// Worker count and energy per queen, in queen order.
    #[must_use]
    pub fn queen_stats(&self) -> Vec<QueenStats> {
        self.registry.queens().map(Queen::stats).collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        let mut entities: Vec<_> = self
            .registry
            .iter()
            .filter(|entity| !matches!(entity, Entity::Food(food) if !food.body.is_alive()))
            .map(Entity::snapshot)
            .collect();
        // Draw order: workers under obstacles under food under queens.
        entities.sort_by_key(|e| match e.kind {
            EntityKind::Worker => 0,
            EntityKind::Obstacle => 1,
            EntityKind::Food => 2,
            EntityKind::Queen => 3,
        });
        SceneSnapshot {
            tick: self.tick,
            width: self.bounds.width,
            height: self.bounds.height,
            background: self.config.background_color,
            entities,
            queens: self.queen_stats(),
        }
    }

    /// Runs the frame clock on the calling thread until `running` clears or
    /// the tick limit is reached. Returns the number of ticks run.
    pub fn run_blocking(&mut self, settings: &LoopSettings, running: &AtomicBool) -> Result<u64> {
        let frame = settings.frame_duration();
        let mut ticks = 0;
        while running.load(Ordering::SeqCst) && !settings.limit_reached(ticks) {
            let started = Instant::now();
            self.tick()?;
            ticks += 1;
            if let Some(rest) = frame.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        Ok(ticks)
    }
}
