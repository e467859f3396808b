//! Core motor systems.
//!
//! One physics tick runs, in order: hold polling, the backend's probe casts,
//! classification, speed integration, then move-and-rotate. Systems that
//! talk to the physics engine are generic over the backend.

use std::time::Duration;

use bevy::prelude::*;

use crate::backend::{fixed_timestep, CharacterPhysicsBackend};
use crate::config::{GravitySettings, MovementSettings, RotationSettings};
use crate::detection::{update_surface_state, SurfaceProbes, SurfaceSubstates};
use crate::intent::MovementIntent;
use crate::motion::{update_horizontal_speed, update_vertical_speed, MotionState};
use crate::orientation::orient;
use crate::state::{marker_flags, Airborne, Grounded, OnSurface};

/// Release surface registry holds whose condition is met.
pub fn poll_surface_holds(
    time: Option<Res<Time<Fixed>>>,
    mut q_substates: Query<&mut SurfaceSubstates>,
) {
    let delta = Duration::from_secs_f32(fixed_timestep(time.as_deref()));
    for mut substates in &mut q_substates {
        substates.poll_hold(delta, &());
    }
}

/// Classify the probe results written by the backend's sensor system.
pub fn classify_surfaces(
    mut q_characters: Query<(&mut SurfaceProbes, &mut SurfaceSubstates, &MotionState)>,
) {
    for (mut probes, mut substates, motion) in &mut q_characters {
        update_surface_state(&mut probes, &mut substates, motion.vertical_speed);
    }
}

/// Integrate vertical speed for the current surface state.
pub fn integrate_vertical_speed(
    time: Option<Res<Time<Fixed>>>,
    mut q_characters: Query<(
        &mut MotionState,
        &SurfaceProbes,
        &mut SurfaceSubstates,
        &MovementIntent,
        Option<&MovementSettings>,
        Option<&GravitySettings>,
    )>,
) {
    let dt = fixed_timestep(time.as_deref());
    for (mut motion, probes, mut substates, intent, movement, gravity) in &mut q_characters {
        substates.run_current(&mut ());
        update_vertical_speed(
            &mut motion,
            probes.surface_state(),
            probes.just_left_edge(),
            intent.jump(),
            &movement.copied().unwrap_or_default(),
            &gravity.copied().unwrap_or_default(),
            dt,
        );
    }
}

/// Integrate horizontal speed for the current surface state.
pub fn integrate_horizontal_speed(
    time: Option<Res<Time<Fixed>>>,
    mut q_characters: Query<(
        &mut MotionState,
        &SurfaceProbes,
        &MovementIntent,
        Option<&MovementSettings>,
    )>,
) {
    let dt = fixed_timestep(time.as_deref());
    for (mut motion, probes, intent, movement) in &mut q_characters {
        update_horizontal_speed(
            &mut motion,
            probes.surface_state(),
            intent,
            &movement.copied().unwrap_or_default(),
            dt,
        );
    }
}

/// Submit this tick's displacement to the backend and turn the character.
pub fn apply_motion<B: CharacterPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, MotionState, MovementIntent, RotationSettings)> = world
        .query::<(
            Entity,
            &MotionState,
            &MovementIntent,
            Option<&RotationSettings>,
        )>()
        .iter(world)
        .map(|(e, motion, intent, rotation)| (e, *motion, *intent, rotation.copied().unwrap_or_default()))
        .collect();

    let dt = B::get_fixed_timestep(world);

    for (entity, motion, intent, settings) in entities {
        let velocity = motion.velocity_along(intent.movement_input());
        B::move_character(world, entity, velocity * dt);

        if let Some(mut state) = world.get_mut::<MotionState>(entity) {
            state.velocity = velocity;
        }

        let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
        let current = B::get_rotation(world, entity);
        let rotation = orient(current, horizontal, intent.control_yaw(), &motion, &settings, dt);
        if rotation != current {
            B::set_rotation(world, entity, rotation);
        }
    }
}

/// Sync state marker components with the classification.
pub fn sync_state_markers(
    mut commands: Commands,
    q_characters: Query<(
        Entity,
        &SurfaceProbes,
        Has<Grounded>,
        Has<OnSurface>,
        Has<Airborne>,
    )>,
) {
    for (entity, probes, has_grounded, has_on_surface, has_airborne) in &q_characters {
        let (grounded, on_surface, airborne) = marker_flags(probes.surface_state());
        let mut entity_commands = commands.entity(entity);

        if grounded != has_grounded {
            if grounded {
                entity_commands.insert(Grounded);
            } else {
                entity_commands.remove::<Grounded>();
            }
        }
        if on_surface != has_on_surface {
            if on_surface {
                entity_commands.insert(OnSurface);
            } else {
                entity_commands.remove::<OnSurface>();
            }
        }
        if airborne != has_airborne {
            if airborne {
                entity_commands.insert(Airborne);
            } else {
                entity_commands.remove::<Airborne>();
            }
        }
    }
}
