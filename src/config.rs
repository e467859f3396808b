//! Tuning components.
//!
//! Speeds are in meters/second, accelerations in meters/second², angles in
//! degrees and turn rates in degrees/second. All settings load from serde
//! with missing fields taking their defaults.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Horizontal movement and jump tuning.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct MovementSettings {
    /// Rate at which horizontal speed approaches its target while there is input.
    pub acceleration: f32,
    /// Rate at which horizontal speed approaches its target without input.
    pub deceleration: f32,
    /// Horizontal speed at full input magnitude.
    pub max_horizontal_speed: f32,
    /// Vertical speed granted by a jump.
    pub jump_speed: f32,
    /// Extra deceleration applied to a rising jump once jump is released.
    pub jump_abort_speed: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            acceleration: 25.0,
            deceleration: 25.0,
            max_horizontal_speed: 8.0,
            jump_speed: 10.0,
            jump_abort_speed: 10.0,
        }
    }
}

impl MovementSettings {
    /// Builder: set acceleration and deceleration.
    pub fn with_acceleration(mut self, acceleration: f32, deceleration: f32) -> Self {
        self.acceleration = acceleration;
        self.deceleration = deceleration;
        self
    }

    /// Builder: set max horizontal speed.
    pub fn with_max_horizontal_speed(mut self, speed: f32) -> Self {
        self.max_horizontal_speed = speed;
        self
    }

    /// Builder: set jump speed and jump abort speed.
    pub fn with_jump(mut self, jump_speed: f32, jump_abort_speed: f32) -> Self {
        self.jump_speed = jump_speed;
        self.jump_abort_speed = jump_abort_speed;
        self
    }
}

/// Vertical integration tuning.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct GravitySettings {
    /// Downward acceleration while airborne.
    pub gravity: f32,
    /// Constant downward speed while grounded, keeps ground contact stable.
    pub grounded_gravity: f32,
    /// Terminal fall speed (positive magnitude).
    pub max_fall_speed: f32,
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self {
            gravity: 20.0,
            grounded_gravity: 5.0,
            max_fall_speed: 40.0,
        }
    }
}

impl GravitySettings {
    /// Builder: set gravity.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set grounded gravity.
    pub fn with_grounded_gravity(mut self, grounded_gravity: f32) -> Self {
        self.grounded_gravity = grounded_gravity;
        self
    }

    /// Builder: set max fall speed.
    pub fn with_max_fall_speed(mut self, max_fall_speed: f32) -> Self {
        self.max_fall_speed = max_fall_speed;
        self
    }
}

/// How the character decides which way to face.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationBehavior {
    /// Turn toward the horizontal movement direction.
    #[default]
    OrientToMovement,
    /// Snap to the control yaw every tick.
    UseControlRotation,
}

/// Control rotation limits and turn rates.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct RotationSettings {
    /// Lowest allowed control pitch.
    pub min_pitch_angle: f32,
    /// Highest allowed control pitch.
    pub max_pitch_angle: f32,
    /// Facing mode.
    pub rotation_behavior: RotationBehavior,
    /// Turn rate at full horizontal speed.
    pub min_rotation_speed: f32,
    /// Turn rate when standing still.
    pub max_rotation_speed: f32,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            min_pitch_angle: -45.0,
            max_pitch_angle: 75.0,
            rotation_behavior: RotationBehavior::OrientToMovement,
            min_rotation_speed: 600.0,
            max_rotation_speed: 1200.0,
        }
    }
}

impl RotationSettings {
    /// Settings for a character that always faces the camera yaw.
    pub fn control_rotation() -> Self {
        Self {
            rotation_behavior: RotationBehavior::UseControlRotation,
            ..default()
        }
    }

    /// Builder: set pitch limits.
    pub fn with_pitch_limits(mut self, min: f32, max: f32) -> Self {
        self.min_pitch_angle = min;
        self.max_pitch_angle = max;
        self
    }

    /// Builder: set turn rates.
    pub fn with_rotation_speeds(mut self, min: f32, max: f32) -> Self {
        self.min_rotation_speed = min;
        self.max_rotation_speed = max;
        self
    }

    /// Clamp pitch into the configured range after reducing it modulo 360.
    pub fn clamp_pitch(&self, pitch: f32) -> f32 {
        (pitch % 360.0).clamp(self.min_pitch_angle, self.max_pitch_angle)
    }
}
