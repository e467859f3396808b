//! Character facing.
//!
//! Bevy convention: a character faces its local −Z axis and yaw rotates
//! about +Y.

use bevy::prelude::*;

use crate::config::{RotationBehavior, RotationSettings};
use crate::motion::MotionState;

/// Turn rate in degrees/second for the current speed.
///
/// Standing still turns at `max_rotation_speed`, full speed at
/// `min_rotation_speed`. A zero target speed counts as standing still.
pub fn rotation_speed(settings: &RotationSettings, motion: &MotionState) -> f32 {
    let factor = if motion.target_horizontal_speed > 0.0 {
        (motion.horizontal_speed / motion.target_horizontal_speed).clamp(0.0, 1.0)
    } else {
        0.0
    };
    settings.max_rotation_speed + (settings.min_rotation_speed - settings.max_rotation_speed) * factor
}

/// Rotation that faces along the horizontal part of `direction`.
pub fn facing_rotation(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Rotation for a control yaw in degrees.
#[inline]
pub fn yaw_rotation(yaw_degrees: f32) -> Quat {
    Quat::from_rotation_y(yaw_degrees.to_radians())
}

/// Rotate `from` toward `to` by at most `max_radians`.
pub fn rotate_towards(from: Quat, to: Quat, max_radians: f32) -> Quat {
    // angle_between goes through acos, which is coarse near identical inputs.
    if from.dot(to).abs() >= 1.0 - 1e-6 {
        return to;
    }
    let angle = from.angle_between(to);
    if angle <= max_radians {
        to
    } else {
        from.slerp(to, max_radians / angle)
    }
}

/// New orientation after one tick.
///
/// `horizontal_movement` is the horizontal part of this tick's requested
/// velocity; `control_yaw` is in degrees.
pub fn orient(
    current: Quat,
    horizontal_movement: Vec3,
    control_yaw: f32,
    motion: &MotionState,
    settings: &RotationSettings,
    dt: f32,
) -> Quat {
    match settings.rotation_behavior {
        RotationBehavior::OrientToMovement => match facing_rotation(horizontal_movement) {
            Some(target) => {
                let speed = rotation_speed(settings, motion);
                rotate_towards(current, target, speed.to_radians() * dt)
            }
            None => current,
        },
        RotationBehavior::UseControlRotation => yaw_rotation(control_yaw),
    }
}
