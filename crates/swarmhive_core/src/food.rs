//! Drifting food sources that workers bite into.

use crate::entity::{Body, Bounds, Direction};
use crate::registry::EntityRegistry;
use rand::Rng;
use swarmhive_data::{Color, EntityId, EntityKind, EntitySnapshot};

/// Food color per type index; types past the palette render grey.
#[must_use]
pub fn color_for_type(food_type: usize) -> Color {
    match food_type {
        0 => Color::new(0, 150, 0),
        1 => Color::new(150, 0, 0),
        2 => Color::new(0, 0, 150),
        _ => Color::new(150, 150, 150),
    }
}

/// Render size of energy-bearing round entities.
#[must_use]
pub fn energy_size(energy: f64) -> f64 {
    (energy / 10.0).max(1.0)
}

/// Cumulative percentage thresholds for picking a food type.
///
/// `[0.2, 0.5, 0.3]` becomes `[20, 70, 100]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodTypeTable {
    thresholds: Vec<f64>,
}

impl FoodTypeTable {
    #[must_use]
    pub fn new(ratios: &[f64]) -> Self {
        let thresholds = ratios
            .iter()
            .scan(0.0, |acc, r| {
                *acc += r * 100.0;
                Some(*acc)
            })
            .collect();
        Self { thresholds }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Maps a roll in `0..=100` to a type; the last type absorbs rounding.
    #[must_use]
    pub fn type_for_roll(&self, roll: u32) -> usize {
        let last = self.thresholds.len().saturating_sub(1);
        self.thresholds
            .iter()
            .position(|&t| f64::from(roll) <= t)
            .unwrap_or(last)
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.type_for_roll(rng.gen_range(0..=100))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub id: EntityId,
    pub body: Body,
    food_type: usize,
}

impl Food {
    /// Energy and speed are drawn between half and double the means.
    pub fn new<R: Rng + ?Sized>(
        x: f64,
        y: f64,
        mean_energy: f64,
        mean_speed: f64,
        food_type: usize,
        rng: &mut R,
    ) -> Self {
        let mut body = Body::new(x, y);
        body.direction = Direction::random(rng);
        body.set_random_speed(rng, mean_speed / 2.0, mean_speed * 2.0);
        body.set_random_energy(rng, mean_energy / 2.0, mean_energy * 2.0);
        body.color = color_for_type(food_type);
        Self {
            id: EntityId::new(),
            body,
            food_type,
        }
    }

    #[must_use]
    pub fn food_type(&self) -> usize {
        self.food_type
    }

    #[must_use]
    pub fn size(&self) -> f64 {
        energy_size(self.body.energy)
    }

    /// Drifts without jitter. Returns whether the food still has energy.
    pub fn behave<R: Rng + ?Sized>(
        &mut self,
        registry: &EntityRegistry,
        bounds: Bounds,
        rng: &mut R,
    ) -> bool {
        self.body.perform_movement(registry.obstacles(), bounds, 0, rng);
        self.body.is_alive()
    }

    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: EntityKind::Food,
            x: self.body.x,
            y: self.body.y,
            color: self.body.color,
            size: self.size(),
            energy: self.body.energy,
            carried_food: None,
        }
    }
}
