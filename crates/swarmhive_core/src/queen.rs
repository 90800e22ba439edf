//! Colony queens.
//!
//! A queen wanders slowly, turns surplus energy into workers and pays a
//! drain that grows with every unit of energy above her starting level.
//! Queens raising auditory workers also rebuild their colony's hearing
//! graph at the start of each of their steps.

use crate::config::QueenConfig;
use crate::entity::{random_int_between, Body, Bounds, Direction};
use crate::error::Result;
use crate::food::energy_size;
use crate::registry::EntityRegistry;
use crate::worker::{WorkerBehavior, WorkerTemplate};
use rand::Rng;
use swarmhive_data::{EntityId, EntityKind, EntitySnapshot, QueenStats};

/// A new wander heading is picked when a roll in `0..=1000` is at most this.
pub const WANDER_ROLL: u32 = 5;
/// Radius around the queen for workers born during play.
pub const BIRTH_SPAWN_RADIUS: f64 = 40.0;
/// Radius around the queen for her starting workers.
pub const INITIAL_SPAWN_RADIUS: f64 = 300.0;
/// Energy above the starting level per extra unit of drain.
pub const SURPLUS_DRAIN_DIVISOR: f64 = 1500.0;
/// Energy a queen pays for every worker born during play.
pub const WORKER_SPAWN_COST: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Queen {
    pub id: EntityId,
    pub body: Body,
    energy_reduction_rate: f64,
    birth_energy_threshold: f64,
    start_energy: f64,
    max_energy: f64,
    template: WorkerTemplate,
    workers: Vec<EntityId>,
}

impl Queen {
    /// Builds a queen from her colony description.
    ///
    /// # Errors
    ///
    /// Fails when the worker type names an unknown behavior or an auditory
    /// worker lacks a shouting radius.
    pub fn new<R: Rng + ?Sized>(
        x: f64,
        y: f64,
        config: &QueenConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let template = WorkerTemplate::try_from(&config.worker_type)?;
        let mut body = Body::new(x, y);
        body.direction = Direction::random(rng);
        body.speed = config.speed;
        body.energy = config.energy;
        body.color = config.color;
        Ok(Self {
            id: EntityId::new(),
            body,
            energy_reduction_rate: config.energy_reduction_rate,
            birth_energy_threshold: config.birth_energy_threshold,
            start_energy: config.energy,
            max_energy: config.max_energy,
            template,
            workers: Vec::new(),
        })
    }

    /// Advisory cap: workers stop delivering food above it.
    #[must_use]
    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }

    #[must_use]
    pub fn workers(&self) -> &[EntityId] {
        &self.workers
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn has_worker(&self, id: EntityId) -> bool {
        self.workers.contains(&id)
    }

    pub fn add_worker(&mut self, id: EntityId) {
        if !self.has_worker(id) {
            self.workers.push(id);
        }
    }

    pub fn remove_worker(&mut self, id: EntityId) -> bool {
        let before = self.workers.len();
        self.workers.retain(|w| *w != id);
        self.workers.len() != before
    }

    /// Base rate plus the surplus term.
    #[must_use]
    pub fn drain(&self) -> f64 {
        let surplus = ((self.body.energy - self.start_energy) / SURPLUS_DRAIN_DIVISOR).max(0.0);
        self.energy_reduction_rate + surplus
    }

    /// One tick of behavior. Returns whether the queen is still alive.
    pub fn behave<R: Rng + ?Sized>(
        &mut self,
        registry: &mut EntityRegistry,
        bounds: Bounds,
        rng: &mut R,
    ) -> bool {
        if self.template.is_advanced() {
            self.compute_adjacent_workers(registry);
        }

        if rng.gen_range(0..=1000) <= WANDER_ROLL {
            self.body.set_random_direction(rng);
        }
        self.body.perform_movement(registry.obstacles(), bounds, 0, rng);

        if self.body.energy > self.birth_energy_threshold {
            self.spawn_workers(
                registry,
                1,
                bounds,
                WORKER_SPAWN_COST,
                BIRTH_SPAWN_RADIUS,
                rng,
            );
        }

        let drain = self.drain();
        self.body.reduce_energy(drain);
        self.body.is_alive()
    }

    /// Raises `count` workers within `radius` of the queen, paying `cost`
    /// energy for each, and registers them in her roster and the registry.
    /// The window is centred on the queen's position clamped into `bounds`,
    /// so newborns always land inside the scene.
    pub fn spawn_workers<R: Rng + ?Sized>(
        &mut self,
        registry: &mut EntityRegistry,
        count: usize,
        bounds: Bounds,
        cost: f64,
        radius: f64,
        rng: &mut R,
    ) -> Vec<EntityId> {
        let (cx, cy) = bounds.clamp(self.body.x, self.body.y);
        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            let x = random_int_between(
                rng,
                (cx - radius).max(0.0),
                (cx + radius).min(bounds.width),
            );
            let y = random_int_between(
                rng,
                (cy - radius).max(0.0),
                (cy + radius).min(bounds.height),
            );

            let mut worker = self.template.instantiate(x, y, rng);
            worker.queen = Some(self.id);
            worker.body.color = self.body.color;
            let id = registry.insert(worker);
            self.workers.push(id);
            self.body.reduce_energy(cost);
            spawned.push(id);
        }
        if !spawned.is_empty() {
            tracing::debug!(
                queen = %self.id,
                behavior = self.template.behavior.name(),
                count = spawned.len(),
                energy = self.body.energy,
                "Workers born"
            );
        }
        spawned
    }

    /// Rebuilds the hearing graph of this colony.
    ///
    /// Returns the number of links made.
    pub fn compute_adjacent_workers(&self, registry: &mut EntityRegistry) -> usize {
        let mut listeners: Vec<Listener> = self
            .workers
            .iter()
            .filter_map(|id| registry.worker(*id))
            .filter_map(|worker| match worker.behavior() {
                WorkerBehavior::Advanced { shouting_radius } => Some(Listener {
                    id: worker.id,
                    x: worker.body.x,
                    y: worker.body.y,
                    radius: shouting_radius,
                }),
                WorkerBehavior::Simple => None,
            })
            .collect();

        let pairs = adjacency_pairs(&mut listeners);
        for (a, b) in &pairs {
            if let Some(worker) = registry.worker_mut(*a) {
                worker.hear(*b);
            }
            if let Some(worker) = registry.worker_mut(*b) {
                worker.hear(*a);
            }
        }
        pairs.len()
    }

    #[must_use]
    pub fn stats(&self) -> QueenStats {
        QueenStats {
            id: self.id,
            color: self.body.color,
            workers: self.workers.len(),
            energy: self.body.energy,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: EntityKind::Queen,
            x: self.body.x,
            y: self.body.y,
            color: self.body.color,
            size: energy_size(self.body.energy),
            energy: self.body.energy,
            carried_food: None,
        }
    }
}

/// Position and range of one worker for the adjacency sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Listener {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Sweep over listeners sorted by x.
///
/// Each listener scans rightward only while the x gap is within its own
/// radius, and links every candidate whose y gap is also within it. The
/// window is a box, not a circle, and uses the scanning listener's radius.
pub fn adjacency_pairs(listeners: &mut [Listener]) -> Vec<(EntityId, EntityId)> {
    listeners.sort_by(|a, b| a.x.total_cmp(&b.x));
    let mut pairs = Vec::new();
    for (i, w) in listeners.iter().enumerate() {
        for other in &listeners[i + 1..] {
            if other.x - w.x > w.radius {
                break;
            }
            if (other.y - w.y).abs() <= w.radius {
                pairs.push((w.id, other.id));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const BOUNDS: Bounds = Bounds::new(1900.0, 1200.0);

    fn config(index: usize) -> QueenConfig {
        AppConfig::default().queens[index].clone()
    }

    fn listener(x: f64, y: f64, radius: f64) -> Listener {
        Listener {
            id: EntityId::new(),
            x,
            y,
            radius,
        }
    }

    #[test]
    fn test_drain_grows_with_surplus() {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let mut queen = Queen::new(10.0, 10.0, &config(0), &mut rng).unwrap();
        assert!((queen.drain() - 0.2).abs() < 1e-12);
        queen.body.energy = 300.0 - 50.0;
        assert!((queen.drain() - 0.2).abs() < 1e-12);
        queen.body.energy = 300.0 + 1500.0;
        assert!((queen.drain() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_spawn_workers_clamped_and_charged() {
        let mut rng = ChaCha8Rng::seed_from_u64(32);
        let mut registry = EntityRegistry::new();
        let mut queen = Queen::new(0.0, 0.0, &config(1), &mut rng).unwrap();
        let ids = queen.spawn_workers(&mut registry, 20, BOUNDS, 3.0, 300.0, &mut rng);

        assert_eq!(ids.len(), 20);
        assert_eq!(queen.worker_count(), 20);
        assert_eq!(queen.body.energy, 300.0 - 60.0);
        for id in ids {
            let worker = registry.worker(id).unwrap();
            assert!(BOUNDS.contains(worker.body.x, worker.body.y));
            assert!(worker.body.x <= 300.0 && worker.body.y <= 300.0);
            assert_eq!(worker.queen, Some(queen.id));
            assert_eq!(worker.body.color, queen.body.color);
        }
    }

    #[test]
    fn test_births_above_threshold() {
        let mut rng = ChaCha8Rng::seed_from_u64(33);
        let mut registry = EntityRegistry::new();
        let mut queen = Queen::new(500.0, 500.0, &config(1), &mut rng).unwrap();
        queen.body.energy = 301.0;
        queen.behave(&mut registry, BOUNDS, &mut rng);
        assert_eq!(queen.worker_count(), 1);
        // 301 - 3 spawn cost, then the 0.2 base drain.
        assert!((queen.body.energy - 297.8).abs() < 1e-9);
    }

    #[test]
    fn test_both_colonies_pay_the_same_birth_cost() {
        let mut rng = ChaCha8Rng::seed_from_u64(36);
        for index in [0, 1] {
            let mut registry = EntityRegistry::new();
            let mut queen = Queen::new(500.0, 500.0, &config(index), &mut rng).unwrap();
            queen.body.energy = 400.0;
            queen.spawn_workers(&mut registry, 1, BOUNDS, WORKER_SPAWN_COST, 40.0, &mut rng);
            assert_eq!(queen.body.energy, 397.0);
        }
    }

    #[test]
    fn test_spawn_window_clamped_for_stray_queen() {
        let mut rng = ChaCha8Rng::seed_from_u64(37);
        let mut registry = EntityRegistry::new();
        let mut queen = Queen::new(-500.0, 5000.0, &config(1), &mut rng).unwrap();
        let ids = queen.spawn_workers(&mut registry, 30, BOUNDS, 0.0, 40.0, &mut rng);
        for id in ids {
            let body = &registry.worker(id).unwrap().body;
            assert!(BOUNDS.contains(body.x, body.y), "({}, {})", body.x, body.y);
            assert!(body.x <= 40.0 && body.y >= 1160.0);
        }
    }

    #[test]
    fn test_no_births_at_threshold() {
        let mut rng = ChaCha8Rng::seed_from_u64(34);
        let mut registry = EntityRegistry::new();
        let mut queen = Queen::new(500.0, 500.0, &config(1), &mut rng).unwrap();
        queen.behave(&mut registry, BOUNDS, &mut rng);
        assert_eq!(queen.worker_count(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_adjacency_window_breaks_on_x_gap() {
        let mut listeners = vec![
            listener(0.0, 0.0, 10.0),
            listener(5.0, 9.0, 10.0),
            listener(11.0, 0.0, 10.0),
            listener(30.0, 0.0, 10.0),
        ];
        let ids: Vec<_> = listeners.iter().map(|l| l.id).collect();
        let pairs = adjacency_pairs(&mut listeners);
        assert!(pairs.contains(&(ids[0], ids[1])));
        assert!(pairs.contains(&(ids[1], ids[2])));
        assert!(!pairs.contains(&(ids[0], ids[2])));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_adjacency_is_a_box() {
        // (7, 7) is about 9.9 away, outside a circle of radius 7 but inside the box.
        let mut listeners = vec![listener(0.0, 0.0, 7.0), listener(7.0, 7.0, 7.0)];
        assert_eq!(adjacency_pairs(&mut listeners).len(), 1);
    }

    #[test]
    fn test_adjacency_uses_left_radius() {
        let mut listeners = vec![listener(0.0, 0.0, 5.0), listener(8.0, 0.0, 50.0)];
        assert!(adjacency_pairs(&mut listeners).is_empty());
    }

    #[test]
    fn test_compute_adjacent_workers_is_symmetric() {
        let mut rng = ChaCha8Rng::seed_from_u64(35);
        let mut registry = EntityRegistry::new();
        let mut queen = Queen::new(500.0, 500.0, &config(0), &mut rng).unwrap();
        queen.spawn_workers(&mut registry, 40, BOUNDS, 0.0, 100.0, &mut rng);
        let links = queen.compute_adjacent_workers(&mut registry);
        assert!(links > 0);

        for id in queen.workers() {
            let worker = registry.worker(*id).unwrap();
            for other in worker.adjacent() {
                let back = registry.worker(*other).unwrap();
                assert!(back.adjacent().contains(id));
            }
        }
    }
}
