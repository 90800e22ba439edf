//! Global-information baseline.
//!
//! The worker sees every food item in the scene, walks to the nearest one,
//! bites it and carries the bite straight home.

use super::{Brain, Worker, WORKER_JITTER};
use crate::entity::Bounds;
use crate::registry::EntityRegistry;
use rand::Rng;
use swarmhive_data::EntityId;

pub(super) fn step<R: Rng + ?Sized>(
    worker: &mut Worker,
    registry: &mut EntityRegistry,
    bounds: Bounds,
    rng: &mut R,
) -> bool {
    worker.forget_dead_queen(registry);
    let mut target = worker.target_food();

    if worker.queen_wants_food(registry) {
        if !target.is_some_and(|id| registry.is_food_alive(id)) {
            target = worker.closest_food(registry);
        }
        let heading = if worker.carrying_food {
            worker
                .queen
                .and_then(|id| registry.queen(id))
                .map(|queen| worker.body.direction_to(&queen.body))
        } else {
            target
                .and_then(|id| registry.food(id))
                .map(|food| worker.body.direction_to(&food.body))
        };
        match heading {
            Some(direction) => worker.body.direction = direction,
            None => worker.move_randomly(rng),
        }
    } else {
        worker.move_randomly(rng);
    }

    worker
        .body
        .perform_movement(registry.obstacles(), bounds, WORKER_JITTER, rng);

    if worker.queen.is_some() {
        if worker.carrying_food {
            deliver(worker, registry, &mut target);
        } else {
            bite(worker, registry, &mut target);
        }
    }

    worker.brain = Brain::Simple {
        target_food: target,
    };
    worker.body.reduce_energy(worker.energy_reduction_rate);
    worker.body.is_alive()
}

fn bite(worker: &mut Worker, registry: &mut EntityRegistry, target: &mut Option<EntityId>) {
    let Some(food) = target.and_then(|id| registry.food_mut(id)) else {
        return;
    };
    if worker.body.touches(&food.body) {
        worker.carrying_food = food.body.reduce_energy(1.0);
        worker.food_color = Some(food.body.color);
        *target = None;
    }
}

fn deliver(worker: &mut Worker, registry: &mut EntityRegistry, target: &mut Option<EntityId>) {
    let Some(queen) = worker.queen.and_then(|id| registry.queen_mut(id)) else {
        return;
    };
    if worker.body.touches(&queen.body) {
        queen.body.increase_energy(1.0);
        worker.carrying_food = false;
        *target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::food::Food;
    use crate::queen::Queen;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const BOUNDS: Bounds = Bounds::new(1000.0, 1000.0);

    fn setup(rng: &mut ChaCha8Rng) -> (EntityRegistry, EntityId, EntityId) {
        let mut registry = EntityRegistry::new();
        let mut queen = Queen::new(100.0, 100.0, &AppConfig::default().queens[1], rng).unwrap();
        queen.body.speed = 0.0;
        let queen_id = registry.insert(queen);
        let mut worker = Worker::simple(500.0, 500.0, 100.0, 10.0);
        worker.queen = Some(queen_id);
        let worker_id = registry.insert(worker);
        (registry, queen_id, worker_id)
    }

    fn step_worker(registry: &mut EntityRegistry, id: EntityId, rng: &mut ChaCha8Rng) -> bool {
        registry
            .with_checked_out(id, |entity, reg| match entity {
                crate::registry::Entity::Worker(w) => w.behave(reg, BOUNDS, rng),
                _ => true,
            })
            .unwrap()
    }

    #[test]
    fn test_targets_nearest_food() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (mut registry, _, worker_id) = setup(&mut rng);
        let mut near = Food::new(600.0, 500.0, 100.0, 0.0, 0, &mut rng);
        near.body.speed = 0.0;
        let near_id = registry.insert(near);
        let mut far = Food::new(900.0, 900.0, 100.0, 0.0, 0, &mut rng);
        far.body.speed = 0.0;
        registry.insert(far);

        step_worker(&mut registry, worker_id, &mut rng);
        let worker = registry.worker(worker_id).unwrap();
        assert_eq!(worker.target_food(), Some(near_id));
        assert_eq!(worker.body.direction.dy, 0.0);
        assert!(worker.body.direction.dx > 0.99);
    }

    #[test]
    fn test_bites_and_clears_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let (mut registry, _, worker_id) = setup(&mut rng);
        let mut food = Food::new(505.0, 500.0, 100.0, 0.0, 2, &mut rng);
        food.body.speed = 0.0;
        let energy = food.body.energy;
        let food_id = registry.insert(food);

        step_worker(&mut registry, worker_id, &mut rng);
        let worker = registry.worker(worker_id).unwrap();
        assert!(worker.carrying_food);
        assert_eq!(worker.target_food(), None);
        assert_eq!(worker.food_color, Some(crate::food::color_for_type(2)));
        assert_eq!(registry.food(food_id).unwrap().body.energy, energy - 1.0);
    }

    #[test]
    fn test_delivers_to_queen() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let (mut registry, queen_id, worker_id) = setup(&mut rng);
        {
            let worker = registry.worker_mut(worker_id).unwrap();
            worker.body.set_position(110.0, 100.0);
            worker.carrying_food = true;
        }
        let before = registry.queen(queen_id).unwrap().body.energy;
        step_worker(&mut registry, worker_id, &mut rng);
        assert!(!registry.worker(worker_id).unwrap().carrying_food);
        assert_eq!(registry.queen(queen_id).unwrap().body.energy, before + 1.0);
    }

    #[test]
    fn test_wanders_while_queen_is_full() {
        let mut rng = ChaCha8Rng::seed_from_u64(16);
        let (mut registry, queen_id, worker_id) = setup(&mut rng);
        registry.queen_mut(queen_id).unwrap().body.energy = 1500.0;
        let mut food = Food::new(505.0, 500.0, 100.0, 0.0, 0, &mut rng);
        food.body.speed = 0.0;
        let energy = food.body.energy;
        let food_id = registry.insert(food);

        step_worker(&mut registry, worker_id, &mut rng);
        let worker = registry.worker(worker_id).unwrap();
        assert_eq!(worker.queen, Some(queen_id));
        assert_eq!(worker.target_food(), None);
        assert!(!worker.carrying_food);
        assert_eq!(registry.food(food_id).unwrap().body.energy, energy);
    }

    #[test]
    fn test_forgets_dead_queen_and_wanders() {
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let (mut registry, queen_id, worker_id) = setup(&mut rng);
        registry.remove(queen_id);
        step_worker(&mut registry, worker_id, &mut rng);
        assert_eq!(registry.worker(worker_id).unwrap().queen, None);
    }

    #[test]
    fn test_energy_drains_each_tick() {
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        let (mut registry, _, worker_id) = setup(&mut rng);
        step_worker(&mut registry, worker_id, &mut rng);
        let energy = registry.worker(worker_id).unwrap().body.energy;
        assert!((energy - 99.9).abs() < 1e-9);
    }
}
