//! Position, energy and movement primitives shared by every simulated object.

use crate::obstacle::Obstacle;
use rand::Rng;
use serde::{Deserialize, Serialize};
use swarmhive_data::Color;

/// Distance at which two entities count as touching.
pub const TOUCH_DISTANCE: f64 = 40.0;

/// Energy every entity starts with unless its constructor overrides it.
pub const DEFAULT_ENERGY: f64 = 100.0;

/// Movement heading. Not renormalized: random headings have components in
/// `[-1, 1]` and their magnitude varies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Direction {
    pub dx: f64,
    pub dy: f64,
}

impl Direction {
    pub const ZERO: Direction = Direction { dx: 0.0, dy: 0.0 };

    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Uniform components in `[-1, 1]`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0))
    }

    /// The 180 degree turn.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

/// The playable area `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }

    #[must_use]
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (x.clamp(0.0, self.width), y.clamp(0.0, self.height))
    }

    /// A uniformly random integer point inside the bounds.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        (
            random_int_between(rng, 0.0, self.width),
            random_int_between(rng, 0.0, self.height),
        )
    }
}

/// Draws an integer from `[min, max]` after truncating both ends toward
/// zero. An inverted range collapses to `min`.
pub fn random_int_between<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let lo = min.trunc() as i64;
    let hi = max.trunc() as i64;
    if hi <= lo {
        return lo as f64;
    }
    rng.gen_range(lo..=hi) as f64
}

/// `rand(0..=jitter) * rand(-1..=1)`: a random offset of random sign.
fn jitter_offset<R: Rng + ?Sized>(rng: &mut R, jitter: u32) -> f64 {
    if jitter == 0 {
        return 0.0;
    }
    let magnitude = rng.gen_range(0..=jitter) as f64;
    let sign = rng.gen_range(-1i32..=1) as f64;
    magnitude * sign
}

/// Kinematic and energetic state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub direction: Direction,
    pub speed: f64,
    pub energy: f64,
    pub color: Color,
}

impl Body {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            direction: Direction::ZERO,
            speed: 0.0,
            energy: DEFAULT_ENERGY,
            color: Color::WHITE,
        }
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_random_direction<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.direction = Direction::random(rng);
    }

    pub fn set_random_speed<R: Rng + ?Sized>(&mut self, rng: &mut R, min: f64, max: f64) {
        self.speed = random_int_between(rng, min, max);
    }

    pub fn set_random_energy<R: Rng + ?Sized>(&mut self, rng: &mut R, min: f64, max: f64) {
        self.energy = random_int_between(rng, min, max);
    }

    /// Takes `amount` from the energy pool, never going below zero.
    ///
    /// Returns `false` without touching the pool when the entity was already
    /// dead.
    pub fn reduce_energy(&mut self, amount: f64) -> bool {
        if self.energy <= 0.0 {
            return false;
        }
        self.energy = (self.energy - amount).max(0.0);
        true
    }

    /// Unbounded; caps are the caller's business.
    pub fn increase_energy(&mut self, amount: f64) {
        self.energy += amount;
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }

    #[must_use]
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }

    #[must_use]
    pub fn distance_to(&self, other: &Body) -> f64 {
        self.distance_to_point(other.x, other.y)
    }

    /// Unit vector toward `(x, y)`, or zero when already there.
    #[must_use]
    pub fn direction_to_point(&self, x: f64, y: f64) -> Direction {
        let dx = x - self.x;
        let dy = y - self.y;
        let length = dx.hypot(dy);
        if length == 0.0 {
            return Direction::ZERO;
        }
        Direction::new(dx / length, dy / length)
    }

    #[must_use]
    pub fn direction_to(&self, other: &Body) -> Direction {
        self.direction_to_point(other.x, other.y)
    }

    #[must_use]
    pub fn touches(&self, other: &Body) -> bool {
        self.distance_to(other) <= TOUCH_DISTANCE
    }

    /// Advances one step along the heading.
    ///
    /// The proposed position is reflected off the scene edges and then pushed
    /// out of every obstacle whose inflated box contains it, in iteration
    /// order.
    pub fn perform_movement<'a, R, I>(
        &mut self,
        obstacles: I,
        bounds: Bounds,
        jitter: u32,
        rng: &mut R,
    ) where
        R: Rng + ?Sized,
        I: IntoIterator<Item = &'a Obstacle>,
    {
        let mut new_x = self.x + self.direction.dx * self.speed + jitter_offset(rng, jitter);
        let mut new_y = self.y + self.direction.dy * self.speed + jitter_offset(rng, jitter);

        if new_x < 0.0 || new_x > bounds.width {
            self.direction.dx = -self.direction.dx;
        }
        new_x = new_x.clamp(0.0, bounds.width);

        if new_y < 0.0 || new_y > bounds.height {
            self.direction.dy = -self.direction.dy;
        }
        new_y = new_y.clamp(0.0, bounds.height);

        for obstacle in obstacles {
            if !obstacle.contains_point(new_x, new_y) {
                continue;
            }
            let half = obstacle.collision_half_size();
            let ox = obstacle.body.x;
            let oy = obstacle.body.y;
            let top = (new_y - (oy - half)).abs();
            let right = (new_x - (ox + half)).abs();
            let bottom = (new_y - (oy + half)).abs();
            let left = (new_x - (ox - half)).abs();

            if top.min(bottom) < right.min(left) {
                self.direction.dy = -self.direction.dy;
                new_y = if top < bottom { oy - half } else { oy + half };
            } else {
                self.direction.dx = -self.direction.dx;
                new_x = if left < right { ox - half } else { ox + half };
            }
        }

        self.x = new_x;
        self.y = new_y;
    }
}
