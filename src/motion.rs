//! Speed integration.
//!
//! Vertical and horizontal speed are scalars updated once per physics tick
//! according to the current [`SurfaceState`]. The resulting displacement is
//! `horizontal_speed * movement_direction + vertical_speed * up`.

use bevy::prelude::*;

use crate::config::{GravitySettings, MovementSettings};
use crate::detection::SurfaceState;
use crate::intent::MovementIntent;

/// Continuous motion state of a character.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct MotionState {
    /// Current horizontal speed, in `[0, max_horizontal_speed]`.
    pub horizontal_speed: f32,
    /// Horizontal speed the model is converging on.
    pub target_horizontal_speed: f32,
    /// Current vertical speed, positive up.
    pub vertical_speed: f32,
    /// Velocity requested by the last tick.
    pub velocity: Vec3,
}

impl MotionState {
    /// Horizontal part of the last requested velocity.
    pub fn horizontal_velocity(&self) -> Vec3 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z)
    }

    /// Vertical part of the last requested velocity.
    pub fn vertical_velocity(&self) -> Vec3 {
        Vec3::new(0.0, self.velocity.y, 0.0)
    }

    /// Velocity for this tick given the movement direction.
    pub fn velocity_along(&self, direction: Vec3) -> Vec3 {
        direction * self.horizontal_speed + Vec3::Y * self.vertical_speed
    }
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Integrate vertical speed for one tick.
///
/// - Grounded: pinned to `-grounded_gravity`, or `jump_speed` on jump.
/// - OnSurface: zero.
/// - Airborne: a released jump is cut short at `jump_abort_speed`; a jump
///   on the tick after walking off a ledge is granted; otherwise gravity
///   pulls toward `-max_fall_speed`.
pub fn update_vertical_speed(
    motion: &mut MotionState,
    surface_state: SurfaceState,
    just_left_edge: bool,
    jump: bool,
    movement: &MovementSettings,
    gravity: &GravitySettings,
    dt: f32,
) {
    let terminal = -gravity.max_fall_speed;
    match surface_state {
        SurfaceState::Grounded => {
            motion.vertical_speed = if jump {
                movement.jump_speed
            } else {
                -gravity.grounded_gravity
            };
        }
        SurfaceState::OnSurface => {
            motion.vertical_speed = 0.0;
        }
        SurfaceState::Airborne => {
            if !jump && motion.vertical_speed > 0.0 {
                motion.vertical_speed = move_towards(
                    motion.vertical_speed,
                    terminal,
                    movement.jump_abort_speed * dt,
                );
            } else if just_left_edge && jump && motion.vertical_speed <= 0.0 {
                debug!("late jump after leaving a ledge");
                motion.vertical_speed = movement.jump_speed;
                return;
            }
            motion.vertical_speed =
                move_towards(motion.vertical_speed, terminal, gravity.gravity * dt);
        }
    }
}

/// Integrate horizontal speed for one tick.
///
/// Only grounded characters change speed; in the air or against a wall the
/// speed is kept, limited to the current maximum.
pub fn update_horizontal_speed(
    motion: &mut MotionState,
    surface_state: SurfaceState,
    intent: &MovementIntent,
    movement: &MovementSettings,
    dt: f32,
) {
    if surface_state == SurfaceState::Grounded {
        let input = intent.current_movement_input();
        motion.target_horizontal_speed = input.length() * movement.max_horizontal_speed;
        let rate = if intent.has_movement_input() {
            movement.acceleration
        } else {
            movement.deceleration
        };
        motion.horizontal_speed =
            move_towards(motion.horizontal_speed, motion.target_horizontal_speed, rate * dt);
    }
    motion.horizontal_speed = motion
        .horizontal_speed
        .clamp(0.0, movement.max_horizontal_speed.max(0.0));
}
