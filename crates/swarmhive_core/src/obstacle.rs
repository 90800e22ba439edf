use crate::entity::Body;
use swarmhive_data::{Color, EntityId, EntityKind, EntitySnapshot};

/// Edge length of obstacles placed by the scene.
pub const DEFAULT_OBSTACLE_SIZE: f64 = 100.0;

/// Margin added around the drawn square for collision tests.
pub const COLLISION_MARGIN: f64 = 7.0;

/// A static square that blocks movement.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: EntityId,
    pub body: Body,
    size: f64,
    half_size: f64,
    collision_half_size: f64,
}

impl Obstacle {
    #[must_use]
    pub fn new(x: f64, y: f64, size: f64) -> Self {
        let mut body = Body::new(x, y);
        body.color = Color::OBSTACLE;
        body.energy = 1.0;
        let half_size = (size / 2.0).floor();
        Self {
            id: EntityId::new(),
            body,
            size,
            half_size,
            collision_half_size: half_size + COLLISION_MARGIN,
        }
    }

    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Half of the drawn edge.
    #[must_use]
    pub fn half_size(&self) -> f64 {
        self.half_size
    }

    /// Half-edge of the inflated collision box.
    #[must_use]
    pub fn collision_half_size(&self) -> f64 {
        self.collision_half_size
    }

    /// Strict containment in the inflated box; points on a face are outside.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let h = self.collision_half_size;
        x > self.body.x - h && x < self.body.x + h && y > self.body.y - h && y < self.body.y + h
    }

    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: EntityKind::Obstacle,
            x: self.body.x,
            y: self.body.y,
            color: self.body.color,
            size: self.size,
            energy: self.body.energy,
            carried_food: None,
        }
    }
}
