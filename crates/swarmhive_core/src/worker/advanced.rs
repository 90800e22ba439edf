//! Local-information auditory relay.
//!
//! A worker knows nothing about the scene beyond what it touches. It keeps
//! two distance estimates, one to food and one to its queen, which grow by
//! its speed every tick. Touching food or the queen resets the matching
//! estimate to zero. Workers within shouting range "shout" their estimates.
//! A heard estimate costs the shouter's radius, and whenever it beats the
//! listener's own the listener adopts it and turns toward the shouter.
//! Routes to food and home thus emerge hop by hop.

use super::{Brain, Worker, WORKER_JITTER};
use crate::entity::{Body, Bounds};
use crate::registry::EntityRegistry;
use rand::Rng;
use swarmhive_data::EntityId;

/// Estimate a worker starts with before it has heard or seen anything.
pub const UNKNOWN_DISTANCE: f64 = 99999.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AuditoryMemory {
    pub shouting_radius: f64,
    /// Workers in range this tick. Filled by the queen, cleared after use.
    pub adjacent: Vec<EntityId>,
    pub food_distance: f64,
    pub queen_distance: f64,
}

impl AuditoryMemory {
    #[must_use]
    pub fn new(shouting_radius: f64) -> Self {
        Self {
            shouting_radius,
            adjacent: Vec::new(),
            food_distance: UNKNOWN_DISTANCE,
            queen_distance: UNKNOWN_DISTANCE,
        }
    }

    /// Estimates decay with every step taken since the last refresh.
    pub fn age(&mut self, speed: f64) {
        self.food_distance += speed;
        self.queen_distance += speed;
    }

    /// Food estimate as heard by a neighbour.
    #[must_use]
    pub fn shouted_food_distance(&self) -> f64 {
        self.food_distance + self.shouting_radius
    }

    /// Queen estimate as heard by a neighbour.
    #[must_use]
    pub fn shouted_queen_distance(&self) -> f64 {
        self.queen_distance + self.shouting_radius
    }

    /// Adopts every better estimate heard this tick and steers `body` at the
    /// neighbour with the best one for the current errand. Without a better
    /// estimate the heading is left alone.
    fn listen(&mut self, body: &mut Body, carrying_food: bool, registry: &EntityRegistry) {
        let mut food_sender = None;
        let mut queen_sender = None;

        for id in &self.adjacent {
            let Some(neighbour) = registry.worker(*id) else {
                continue;
            };
            let Some(heard) = neighbour.memory() else {
                continue;
            };
            let position = (neighbour.body.x, neighbour.body.y);

            let food = heard.shouted_food_distance();
            if food < self.food_distance {
                self.food_distance = food;
                food_sender = Some(position);
            }
            let queen = heard.shouted_queen_distance();
            if queen < self.queen_distance {
                self.queen_distance = queen;
                queen_sender = Some(position);
            }
        }

        let sender = if carrying_food { queen_sender } else { food_sender };
        if let Some((x, y)) = sender {
            body.direction = body.direction_to_point(x, y);
        }
    }
}

pub(super) fn step<R: Rng + ?Sized>(
    worker: &mut Worker,
    registry: &mut EntityRegistry,
    bounds: Bounds,
    rng: &mut R,
) -> bool {
    worker.forget_dead_queen(registry);
    let home = worker.queen;

    let Worker {
        body,
        carrying_food,
        food_color,
        energy_reduction_rate,
        brain,
        ..
    } = worker;
    let Brain::Advanced(memory) = brain else {
        return body.is_alive();
    };

    memory.age(body.speed);
    body.perform_movement(registry.obstacles(), bounds, WORKER_JITTER, rng);

    if registry.foods().any(|food| body.touches(&food.body)) {
        memory.food_distance = 0.0;
    }
    if home
        .and_then(|id| registry.queen(id))
        .is_some_and(|queen| body.touches(&queen.body))
    {
        memory.queen_distance = 0.0;
    }

    if *carrying_food {
        if let Some(queen) = home.and_then(|id| registry.queen_mut(id)) {
            if body.touches(&queen.body) {
                queen.body.increase_energy(1.0);
                *carrying_food = false;
                body.direction = body.direction.reversed();
            }
        }
    }

    if !*carrying_food {
        let touched = registry
            .foods()
            .find(|food| body.touches(&food.body))
            .map(|food| food.id);
        if let Some(food) = touched.and_then(|id| registry.food_mut(id)) {
            *carrying_food = food.body.reduce_energy(1.0);
            *food_color = Some(food.body.color);
            body.direction = body.direction.reversed();
        }
    }

    let queen_wants_food = home
        .and_then(|id| registry.queen(id))
        .is_some_and(|queen| queen.body.energy <= queen.max_energy());
    if queen_wants_food {
        memory.listen(body, *carrying_food, registry);
    } else {
        body.set_random_direction(rng);
    }

    memory.adjacent.clear();
    body.reduce_energy(*energy_reduction_rate);
    body.is_alive()
}
