//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.
//!
//! Characters are kinematic: the motor writes its displacement into
//! [`KinematicCharacterController::translation`] and Rapier resolves the
//! swept move during its own step. Surface probes are box shapecasts
//! against colliders whose collision-group memberships intersect the
//! probe set's `surface_layers`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::collision::{CollisionData, ProbeCast};
use crate::detection::SurfaceProbes;
use crate::CharacterMotorSet;

/// Rapier3D physics backend for the character motor.
pub struct Rapier3dBackend;

impl CharacterPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn move_character(world: &mut World, entity: Entity, displacement: Vec3) {
        if let Some(mut controller) = world.get_mut::<KinematicCharacterController>(entity) {
            // Accumulate in case several moves land before Rapier steps.
            let pending = controller.translation.unwrap_or(Vec3::ZERO);
            controller.translation = Some(pending + displacement);
        } else if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation += displacement;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .or_else(|| world.get::<GlobalTransform>(entity).map(|t| t.translation()))
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

/// Plugin that sets up Rapier3D-specific systems for the character motor.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            rapier_surface_probes.in_set(CharacterMotorSet::Sensors),
        );
    }
}

/// Components for a Rapier-driven character.
#[derive(Bundle)]
pub struct Rapier3dCharacterBundle {
    /// Kinematic body, moved by the character controller.
    pub rigid_body: RigidBody,
    /// Swept move primitive.
    pub controller: KinematicCharacterController,
    /// Character collider.
    pub collider: Collider,
}

impl Rapier3dCharacterBundle {
    /// Upright capsule of total `height` and `radius`.
    pub fn capsule(radius: f32, height: f32) -> Self {
        let half_segment = (height * 0.5 - radius).max(0.0);
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            controller: KinematicCharacterController::default(),
            collider: Collider::capsule_y(half_segment, radius),
        }
    }
}

/// Radius and total height of a collider, if it is a capsule or ball.
pub fn collider_dimensions(collider: &Collider) -> Option<Vec2> {
    if let Some(capsule) = collider.as_capsule() {
        let segment = capsule.segment();
        let half_height = (segment.a().y - segment.b().y).abs() / 2.0;
        Some(Vec2::new(capsule.radius(), (half_height + capsule.radius()) * 2.0))
    } else {
        collider
            .as_ball()
            .map(|ball| Vec2::new(ball.radius(), ball.radius() * 2.0))
    }
}

/// Cast every probe of every character through the Rapier query pipeline.
fn rapier_surface_probes(
    rapier_context: ReadRapierContext,
    mut q_characters: Query<(Entity, &GlobalTransform, &mut SurfaceProbes)>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, mut probes) in &mut q_characters {
        let (_, rotation, position) = transform.to_scale_rotation_translation();
        probes.cast(position, rotation, |cast| rapier_shapecast(&context, cast, entity));
    }
}

/// Perform one probe's box cast using RapierContext.
///
/// Rapier sweeps the shape along a velocity for `max_time_of_impact`, so the
/// direction must be unit length for the reach to equal the cast distance.
fn rapier_shapecast(
    context: &RapierContext,
    cast: &ProbeCast,
    exclude_entity: Entity,
) -> Option<CollisionData> {
    let direction = cast.unit_direction()?;
    let shape = Collider::cuboid(cast.half_extents.x, cast.half_extents.y, cast.half_extents.z);

    let filter = QueryFilter::default()
        .exclude_collider(exclude_entity)
        .exclude_rigid_body(exclude_entity)
        .exclude_sensors()
        .groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(cast.layer_mask),
        ));

    context
        .cast_shape(
            cast.origin,
            cast.rotation,
            direction,
            &shape,
            ShapeCastOptions {
                max_time_of_impact: cast.max_distance,
                stop_at_penetration: false,
                ..default()
            },
            filter,
        )
        .map(|(hit_entity, hit)| {
            let normal = hit.details.map(|d| d.normal1).unwrap_or(-direction);
            CollisionData::new(
                hit.time_of_impact,
                normal,
                cast.point_at(hit.time_of_impact),
                Some(hit_entity),
            )
        })
}
