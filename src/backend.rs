//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the character motor. The motor never writes positions
//! itself: every displacement goes through [`CharacterPhysicsBackend::move_character`],
//! which is expected to resolve collisions (a kinematic character controller,
//! a swept move, ...).
//!
//! World queries are not part of the trait. A backend adds its own sensor
//! system to [`CharacterMotorSet::Sensors`](crate::CharacterMotorSet::Sensors)
//! through [`plugin`](CharacterPhysicsBackend::plugin) and feeds the hits to
//! [`SurfaceProbes::cast`](crate::detection::SurfaceProbes::cast), which
//! keeps backends free to use whatever query context their engine needs.

use bevy::prelude::*;

/// Fixed timestep used when no `Time<Fixed>` resource is present.
pub const DEFAULT_FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Trait for physics backend implementations.
///
/// For an example implementation, see the `rapier` module's
/// `Rapier3dBackend` (feature `rapier3d`).
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend, including its sensor
    /// system.
    fn plugin() -> impl Plugin;

    /// Move the character by `displacement` (world space, already scaled by
    /// the timestep), resolving collisions.
    fn move_character(world: &mut World, entity: Entity, displacement: Vec3);

    /// Get the current position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec3;

    /// Get the current orientation of an entity.
    fn get_rotation(world: &World, entity: Entity) -> Quat;

    /// Set the orientation of an entity.
    fn set_rotation(world: &mut World, entity: Entity, rotation: Quat);

    /// Get the fixed timestep delta time, in seconds.
    fn get_fixed_timestep(world: &World) -> f32 {
        fixed_timestep(world.get_resource::<Time<Fixed>>())
    }
}

/// Seconds per physics tick, falling back to 60 Hz.
pub fn fixed_timestep(time: Option<&Time<Fixed>>) -> f32 {
    time.map(|t| t.timestep().as_secs_f32())
        .filter(|&dt| dt > 0.0)
        .unwrap_or(DEFAULT_FIXED_TIMESTEP)
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}

/// Backend that moves characters by writing their `Transform` directly and
/// never reports hits. Useful for tests and for characters whose surfaces
/// are supplied by hand.
pub struct TransformBackend;

impl CharacterPhysicsBackend for TransformBackend {
    fn plugin() -> impl Plugin {
        NoOpBackendPlugin
    }

    fn move_character(world: &mut World, entity: Entity, displacement: Vec3) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation += displacement;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .unwrap_or(Vec3::ZERO)
    }

    fn get_rotation(world: &World, entity: Entity) -> Quat {
        world
            .get::<Transform>(entity)
            .map(|t| t.rotation)
            .unwrap_or(Quat::IDENTITY)
    }

    fn set_rotation(world: &mut World, entity: Entity, rotation: Quat) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.rotation = rotation;
        }
    }
}
