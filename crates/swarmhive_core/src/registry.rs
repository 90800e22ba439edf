//! The single shared registry of live entities.
//!
//! Entities are owned by one map keyed by [`EntityId`]. An ordered list of
//! all ids fixes the behavior order, and four category views (food, workers,
//! queens, obstacles) partition it. Every mutation below keeps that
//! partition intact.

use crate::entity::Body;
use crate::error::{Result, SimError};
use crate::food::Food;
use crate::obstacle::Obstacle;
use crate::queen::Queen;
use crate::worker::Worker;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use swarmhive_data::{EntityId, EntityKind, EntitySnapshot};

/// Closed set of simulated entity kinds.
#[derive(Debug, Clone)]
pub enum Entity {
    Food(Food),
    Obstacle(Obstacle),
    Worker(Worker),
    Queen(Queen),
}

impl Entity {
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Food(e) => e.id,
            Entity::Obstacle(e) => e.id,
            Entity::Worker(e) => e.id,
            Entity::Queen(e) => e.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Food(_) => EntityKind::Food,
            Entity::Obstacle(_) => EntityKind::Obstacle,
            Entity::Worker(_) => EntityKind::Worker,
            Entity::Queen(_) => EntityKind::Queen,
        }
    }

    #[must_use]
    pub fn body(&self) -> &Body {
        match self {
            Entity::Food(e) => &e.body,
            Entity::Obstacle(e) => &e.body,
            Entity::Worker(e) => &e.body,
            Entity::Queen(e) => &e.body,
        }
    }

    pub fn body_mut(&mut self) -> &mut Body {
        match self {
            Entity::Food(e) => &mut e.body,
            Entity::Obstacle(e) => &mut e.body,
            Entity::Worker(e) => &mut e.body,
            Entity::Queen(e) => &mut e.body,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        match self {
            Entity::Food(e) => e.snapshot(),
            Entity::Obstacle(e) => e.snapshot(),
            Entity::Worker(e) => e.snapshot(),
            Entity::Queen(e) => e.snapshot(),
        }
    }
}

impl From<Food> for Entity {
    fn from(food: Food) -> Self {
        Entity::Food(food)
    }
}

impl From<Obstacle> for Entity {
    fn from(obstacle: Obstacle) -> Self {
        Entity::Obstacle(obstacle)
    }
}

impl From<Worker> for Entity {
    fn from(worker: Worker) -> Self {
        Entity::Worker(worker)
    }
}

impl From<Queen> for Entity {
    fn from(queen: Queen) -> Self {
        Entity::Queen(queen)
    }
}

/// Population per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EntityCounts {
    pub queens: usize,
    pub workers: usize,
    pub food: usize,
    pub obstacles: usize,
}

impl EntityCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.queens + self.workers + self.food + self.obstacles
    }
}

#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, Entity>,
    order: Vec<EntityId>,
    food: Vec<EntityId>,
    workers: Vec<EntityId>,
    queens: Vec<EntityId>,
    obstacles: Vec<EntityId>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn view_mut(&mut self, kind: EntityKind) -> &mut Vec<EntityId> {
        match kind {
            EntityKind::Food => &mut self.food,
            EntityKind::Obstacle => &mut self.obstacles,
            EntityKind::Worker => &mut self.workers,
            EntityKind::Queen => &mut self.queens,
        }
    }

    /// Appends an entity to the combined view and its category view.
    pub fn insert(&mut self, entity: impl Into<Entity>) -> EntityId {
        let entity = entity.into();
        let id = entity.id();
        let kind = entity.kind();
        if self.entities.insert(id, entity).is_none() {
            self.order.push(id);
            self.view_mut(kind).push(id);
        }
        id
    }

    /// Excises an entity from every view.
    ///
    /// A worker is also detached from its queen's roster. A queen's workers
    /// keep their reference and notice the death on their own next step.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.order.retain(|e| *e != id);
        self.view_mut(entity.kind()).retain(|e| *e != id);

        if let Entity::Worker(worker) = &entity {
            if let Some(queen) = worker.queen.and_then(|q| self.queen_mut(q)) {
                queen.remove_worker(id);
            }
        }
        Some(entity)
    }

    /// Runs `f` with the entity lifted out of the map.
    ///
    /// The entity keeps its place in every view while checked out, but does
    /// not resolve through the lookup methods. This lets a behavior step
    /// mutate both itself and the rest of the registry.
    pub fn with_checked_out<T>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut Entity, &mut EntityRegistry) -> T,
    ) -> Result<T> {
        let mut entity = self
            .entities
            .remove(&id)
            .ok_or(SimError::EntityNotFound(id))?;
        let out = f(&mut entity, self);
        self.entities.insert(id, entity);
        Ok(out)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    #[must_use]
    pub fn food(&self, id: EntityId) -> Option<&Food> {
        match self.entities.get(&id) {
            Some(Entity::Food(food)) => Some(food),
            _ => None,
        }
    }

    pub fn food_mut(&mut self, id: EntityId) -> Option<&mut Food> {
        match self.entities.get_mut(&id) {
            Some(Entity::Food(food)) => Some(food),
            _ => None,
        }
    }

    #[must_use]
    pub fn obstacle(&self, id: EntityId) -> Option<&Obstacle> {
        match self.entities.get(&id) {
            Some(Entity::Obstacle(obstacle)) => Some(obstacle),
            _ => None,
        }
    }

    #[must_use]
    pub fn worker(&self, id: EntityId) -> Option<&Worker> {
        match self.entities.get(&id) {
            Some(Entity::Worker(worker)) => Some(worker),
            _ => None,
        }
    }

    pub fn worker_mut(&mut self, id: EntityId) -> Option<&mut Worker> {
        match self.entities.get_mut(&id) {
            Some(Entity::Worker(worker)) => Some(worker),
            _ => None,
        }
    }

    #[must_use]
    pub fn queen(&self, id: EntityId) -> Option<&Queen> {
        match self.entities.get(&id) {
            Some(Entity::Queen(queen)) => Some(queen),
            _ => None,
        }
    }

    pub fn queen_mut(&mut self, id: EntityId) -> Option<&mut Queen> {
        match self.entities.get_mut(&id) {
            Some(Entity::Queen(queen)) => Some(queen),
            _ => None,
        }
    }

    /// Queen liveness is membership in the queen view.
    #[must_use]
    pub fn is_queen_alive(&self, id: EntityId) -> bool {
        self.queens.contains(&id)
    }

    #[must_use]
    pub fn is_food_alive(&self, id: EntityId) -> bool {
        self.food(id).is_some()
    }

    /// Ids in behavior order.
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    #[must_use]
    pub fn food_ids(&self) -> &[EntityId] {
        &self.food
    }

    #[must_use]
    pub fn worker_ids(&self) -> &[EntityId] {
        &self.workers
    }

    #[must_use]
    pub fn queen_ids(&self) -> &[EntityId] {
        &self.queens
    }

    #[must_use]
    pub fn obstacle_ids(&self) -> &[EntityId] {
        &self.obstacles
    }

    /// Entities in behavior order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn foods(&self) -> impl Iterator<Item = &Food> {
        self.food.iter().filter_map(|id| self.food(*id))
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter().filter_map(|id| self.obstacle(*id))
    }

    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter().filter_map(|id| self.worker(*id))
    }

    pub fn queens(&self) -> impl Iterator<Item = &Queen> {
        self.queens.iter().filter_map(|id| self.queen(*id))
    }

    #[must_use]
    pub fn counts(&self) -> EntityCounts {
        EntityCounts {
            queens: self.queens.len(),
            workers: self.workers.len(),
            food: self.food.len(),
            obstacles: self.obstacles.len(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Moves a worker into another colony and recolors it.
    pub fn assign_worker(&mut self, worker_id: EntityId, queen_id: EntityId) -> Result<()> {
        let previous = self
            .worker(worker_id)
            .ok_or(SimError::EntityNotFound(worker_id))?
            .queen;
        if self.queen(queen_id).is_none() {
            return Err(SimError::EntityNotFound(queen_id));
        }

        if let Some(old) = previous.and_then(|q| self.queen_mut(q)) {
            old.remove_worker(worker_id);
        }
        let color = match self.queen_mut(queen_id) {
            Some(queen) => {
                queen.add_worker(worker_id);
                queen.body.color
            }
            None => return Err(SimError::EntityNotFound(queen_id)),
        };
        if let Some(worker) = self.worker_mut(worker_id) {
            worker.queen = Some(queen_id);
            worker.body.color = color;
        }
        Ok(())
    }

    /// Checks that the views partition the combined view and that every
    /// roster entry is a live worker.
    pub fn verify(&self) -> Result<()> {
        let unique: HashSet<_> = self.order.iter().collect();
        if unique.len() != self.order.len() {
            return Err(SimError::inconsistent("duplicate id in combined view"));
        }
        if self.entities.len() != self.order.len() {
            return Err(SimError::inconsistent(format!(
                "{} entities stored but {} ids listed",
                self.entities.len(),
                self.order.len()
            )));
        }

        let views = [
            (EntityKind::Food, &self.food),
            (EntityKind::Obstacle, &self.obstacles),
            (EntityKind::Worker, &self.workers),
            (EntityKind::Queen, &self.queens),
        ];
        let mut seen = HashSet::new();
        for (kind, view) in views {
            for id in view {
                if !seen.insert(*id) {
                    return Err(SimError::inconsistent(format!("{id} listed twice")));
                }
                match self.entities.get(id) {
                    Some(entity) if entity.kind() == kind => {}
                    Some(entity) => {
                        return Err(SimError::inconsistent(format!(
                            "{id} is a {} but listed as {kind}",
                            entity.kind()
                        )))
                    }
                    None => return Err(SimError::EntityNotFound(*id)),
                }
            }
        }
        if seen.len() != self.order.len() {
            return Err(SimError::inconsistent(
                "category views do not cover the combined view",
            ));
        }

        for queen in self.queens() {
            for worker in queen.workers() {
                if self.worker(*worker).is_none() {
                    return Err(SimError::inconsistent(format!(
                        "queen {} lists dead worker {worker}",
                        queen.id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueenConfig;
    use crate::entity::Bounds;
    use crate::worker::Worker;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn queen_config() -> QueenConfig {
        crate::config::AppConfig::default().queens[1].clone()
    }

    #[test]
    fn test_insert_and_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut registry = EntityRegistry::new();
        registry.insert(Food::new(1.0, 1.0, 100.0, 2.0, 0, &mut rng));
        registry.insert(Obstacle::new(50.0, 50.0, 100.0));
        registry.insert(Worker::simple(5.0, 5.0, 100.0, 3.0));

        let counts = registry.counts();
        assert_eq!(counts.food, 1);
        assert_eq!(counts.obstacles, 1);
        assert_eq!(counts.workers, 1);
        assert_eq!(counts.total(), registry.len());
        registry.verify().unwrap();
    }

    #[test]
    fn test_remove_worker_detaches_from_queen() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut registry = EntityRegistry::new();
        let queen = Queen::new(100.0, 100.0, &queen_config(), &mut rng).unwrap();
        let queen_id = registry.insert(queen);
        let spawned = registry
            .with_checked_out(queen_id, |entity, reg| match entity {
                Entity::Queen(q) => {
                    q.spawn_workers(reg, 3, Bounds::new(500.0, 500.0), 0.0, 40.0, &mut rng)
                }
                _ => Vec::new(),
            })
            .unwrap();
        assert_eq!(spawned.len(), 3);

        let removed = registry.remove(spawned[0]);
        assert!(matches!(removed, Some(Entity::Worker(_))));
        let queen = registry.queen(queen_id).unwrap();
        assert_eq!(queen.worker_count(), 2);
        assert!(!queen.workers().contains(&spawned[0]));
        registry.verify().unwrap();
    }

    #[test]
    fn test_removing_queen_leaves_workers_pointing_at_it() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut registry = EntityRegistry::new();
        let queen_id = registry.insert(Queen::new(100.0, 100.0, &queen_config(), &mut rng).unwrap());
        let worker_id = registry.insert(Worker::simple(5.0, 5.0, 100.0, 3.0));
        registry.assign_worker(worker_id, queen_id).unwrap();

        registry.remove(queen_id);
        assert!(!registry.is_queen_alive(queen_id));
        assert_eq!(registry.worker(worker_id).unwrap().queen, Some(queen_id));
        registry.verify().unwrap();
    }

    #[test]
    fn test_assign_worker_moves_between_rosters() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut registry = EntityRegistry::new();
        let first = registry.insert(Queen::new(10.0, 10.0, &queen_config(), &mut rng).unwrap());
        let second = registry.insert(Queen::new(90.0, 90.0, &queen_config(), &mut rng).unwrap());
        let worker = registry.insert(Worker::simple(5.0, 5.0, 100.0, 3.0));

        registry.assign_worker(worker, first).unwrap();
        registry.assign_worker(worker, second).unwrap();
        assert_eq!(registry.queen(first).unwrap().worker_count(), 0);
        assert_eq!(registry.queen(second).unwrap().workers(), &[worker]);
        assert_eq!(registry.worker(worker).unwrap().queen, Some(second));
    }

    #[test]
    fn test_checked_out_entity_does_not_resolve() {
        let mut registry = EntityRegistry::new();
        let id = registry.insert(Obstacle::new(0.0, 0.0, 10.0));
        let seen = registry
            .with_checked_out(id, |_, reg| reg.get(id).is_some())
            .unwrap();
        assert!(!seen);
        assert!(registry.get(id).is_some());
        assert!(registry.with_checked_out(EntityId::new(), |_, _| ()).is_err());
    }
}
