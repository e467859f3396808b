//! Movement intent.
//!
//! Intents carry what the controlling layer (player input, AI) wants this
//! tick: a world-space movement direction, whether jump is held, and the
//! control rotation the camera looks along. The motor systems only read it.

use bevy::prelude::*;

use crate::config::RotationSettings;

/// Desired movement for a character.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use character_motor::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_movement_input(Vec3::new(0.0, 0.0, -2.0));
/// assert!(intent.has_movement_input());
/// // Reads are clamped to unit length.
/// assert_eq!(intent.movement_input(), Vec3::NEG_Z);
///
/// // Dropping input keeps the last direction for deceleration.
/// intent.set_movement_input(Vec3::ZERO);
/// assert!(!intent.has_movement_input());
/// assert_eq!(intent.movement_input(), Vec3::NEG_Z);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct MovementIntent {
    movement_input: Vec3,
    last_movement_input: Vec3,
    has_movement_input: bool,
    jump: bool,
    /// Pitch (x) and yaw (y) in degrees.
    control_rotation: Vec2,
}

impl MovementIntent {
    /// Create an empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the world-space movement input for this tick.
    ///
    /// When input drops to zero the previous non-zero input is kept as the
    /// direction to decelerate along.
    pub fn set_movement_input(&mut self, movement_input: Vec3) {
        let has_movement_input = movement_input.length_squared() > 0.0;
        if self.has_movement_input && !has_movement_input {
            self.last_movement_input = self.movement_input;
        }
        self.movement_input = movement_input;
        self.has_movement_input = has_movement_input;
    }

    /// Whether there is movement input this tick.
    #[inline]
    pub fn has_movement_input(&self) -> bool {
        self.has_movement_input
    }

    /// The input set this tick, clamped to unit length. Zero without input.
    pub fn current_movement_input(&self) -> Vec3 {
        self.movement_input.clamp_length_max(1.0)
    }

    /// Movement direction: this tick's input, or the last non-zero input
    /// when there is none. Clamped to unit length.
    pub fn movement_input(&self) -> Vec3 {
        let input = if self.has_movement_input {
            self.movement_input
        } else {
            self.last_movement_input
        };
        input.clamp_length_max(1.0)
    }

    /// Set whether jump is held.
    pub fn set_jump(&mut self, jump: bool) {
        self.jump = jump;
    }

    /// Whether jump is held.
    #[inline]
    pub fn jump(&self) -> bool {
        self.jump
    }

    /// Control rotation as (pitch, yaw) in degrees.
    #[inline]
    pub fn control_rotation(&self) -> Vec2 {
        self.control_rotation
    }

    /// Control yaw in degrees.
    #[inline]
    pub fn control_yaw(&self) -> f32 {
        self.control_rotation.y
    }

    /// Set the control rotation. Pitch is clamped to the configured range,
    /// yaw is wrapped into `[0, 360)`.
    pub fn set_control_rotation(&mut self, rotation: Vec2, settings: &RotationSettings) {
        let pitch = settings.clamp_pitch(rotation.x);
        let yaw = rotation.y.rem_euclid(360.0);
        self.control_rotation = Vec2::new(pitch, yaw);
    }
}
