//! Shape cast requests and results exchanged with the physics backend.

use bevy::prelude::*;

/// Information about a shapecast collision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance travelled along the cast direction before impact.
    pub distance: f32,
    /// Normal of the hit surface, pointing away from it.
    pub normal: Vec3,
    /// World position of the hit point.
    pub point: Vec3,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec3, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

/// A single box cast issued by a surface probe.
///
/// Everything is in world space. `direction` is not normalized: it is the
/// probe's local offset rotated by the character orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeCast {
    /// Index of the issuing probe. Probe 0 is the ground probe.
    pub probe: usize,
    /// Cast origin (the character position).
    pub origin: Vec3,
    /// Half-extents of the cast box.
    pub half_extents: Vec3,
    /// Cast direction.
    pub direction: Vec3,
    /// Orientation of the cast box.
    pub rotation: Quat,
    /// Maximum cast distance.
    pub max_distance: f32,
    /// Collision layers the cast may hit.
    pub layer_mask: u32,
}

impl ProbeCast {
    /// Unit cast direction, or `None` for a probe with a zero offset.
    ///
    /// Backends sweep along this so every probe reaches `max_distance`
    /// whatever the length of its offset.
    pub fn unit_direction(&self) -> Option<Vec3> {
        let direction = self.direction.normalize_or_zero();
        (direction != Vec3::ZERO).then_some(direction)
    }

    /// World position reached after travelling `distance` along the cast.
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction.normalize_or_zero() * distance
    }
}
