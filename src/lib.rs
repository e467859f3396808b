//! # `character_motor`
//!
//! A kinematic 3D character motor with a physics backend abstraction.
//!
//! This crate moves a character each physics tick from a [`MovementIntent`](intent::MovementIntent):
//! - Classifies contact from a set of box shapecast probes (ground, side surface or air)
//! - Integrates vertical speed (gravity, jump, jump abort, coyote jump)
//! - Integrates horizontal speed (acceleration, deceleration, speed limit)
//! - Turns the character towards its movement or the control yaw
//! - Exposes named substate registries that gameplay code can lock and hold
//! - Abstracts the physics backend (Rapier3D included behind `rapier3d`)
//!
//! ## Architecture
//!
//! One tick runs the [`CharacterMotorSet`] sets in order:
//! 1. `Preparation` releases registry holds whose condition is met
//! 2. `Sensors` lets the backend cast every probe
//! 3. `Classification` derives the surface state and runs ledge substates
//! 4. `Integration` updates vertical then horizontal speed
//! 5. `Movement` submits the displacement to the backend and rotates
//! 6. `StateSync` mirrors the surface state onto marker components
//!
//! The optional [`PlayerControllerPlugin`](player::PlayerControllerPlugin)
//! runs once per frame and feeds the intent from abstract player input.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use character_motor::prelude::*;
//!
//! // Components for a humanoid character
//! let probes = SurfaceProbes::humanoid(0.4, 1.8);
//! let bundle = CharacterBundle::new(probes);
//! assert_eq!(bundle.motion.horizontal_speed, 0.0);
//!
//! // Spawned next to a transform and the backend's physics components
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod detection;
pub mod error;
pub mod intent;
pub mod motion;
pub mod orientation;
pub mod player;
pub mod state;
pub mod substate;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{CharacterPhysicsBackend, TransformBackend};
    pub use crate::collision::{CollisionData, ProbeCast};
    pub use crate::config::{
        GravitySettings, MovementSettings, RotationBehavior, RotationSettings,
    };
    pub use crate::detection::{
        surface_substates, SurfaceContact, SurfaceProbe, SurfaceProbes, SurfaceState,
        SurfaceSubstate, SurfaceSubstates,
    };
    pub use crate::error::{ProbeConfigError, SubstateError};
    pub use crate::intent::MovementIntent;
    pub use crate::motion::MotionState;
    pub use crate::player::{
        movement_substates, MovementSubstate, MovementSubstates, PlayerBundle, PlayerController,
        PlayerControllerPlugin, PlayerInput, SprintContext,
    };
    pub use crate::state::{Airborne, Grounded, OnSurface};
    pub use crate::substate::{HoldCondition, Substate, SubstateMachine};
    pub use crate::{CharacterBundle, CharacterMotorPlugin, CharacterMotorSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle};
}

/// Ordered phases of one physics tick, chained in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterMotorSet {
    /// Hold polling.
    Preparation,
    /// Backend probe casts.
    Sensors,
    /// Surface classification.
    Classification,
    /// Speed integration.
    Integration,
    /// Displacement and rotation.
    Movement,
    /// Marker components.
    StateSync,
}

/// Motor components of one character.
///
/// Spawn it next to a `Transform` and whatever the backend needs.
#[derive(Bundle)]
pub struct CharacterBundle {
    pub motion: motion::MotionState,
    pub intent: intent::MovementIntent,
    pub movement: config::MovementSettings,
    pub gravity: config::GravitySettings,
    pub rotation: config::RotationSettings,
    pub probes: detection::SurfaceProbes,
    pub surface_substates: detection::SurfaceSubstates,
}

impl CharacterBundle {
    /// Default tuning around the given probe set.
    pub fn new(probes: detection::SurfaceProbes) -> Self {
        Self {
            motion: default(),
            intent: default(),
            movement: default(),
            gravity: default(),
            rotation: default(),
            probes,
            surface_substates: detection::surface_substates(),
        }
    }

    /// Builder: replace the movement settings.
    pub fn with_movement(mut self, movement: config::MovementSettings) -> Self {
        self.movement = movement;
        self
    }

    /// Builder: replace the gravity settings.
    pub fn with_gravity(mut self, gravity: config::GravitySettings) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: replace the rotation settings.
    pub fn with_rotation(mut self, rotation: config::RotationSettings) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Main plugin for the character motor.
///
/// This plugin is generic over a physics backend `B` which moves characters
/// and casts their surface probes.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With the transform backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use character_motor::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(CharacterMotorPlugin::<TransformBackend>::default())
///     .run();
/// ```
pub struct CharacterMotorPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for CharacterMotorPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for CharacterMotorPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::MovementSettings>();
        app.register_type::<config::GravitySettings>();
        app.register_type::<config::RotationSettings>();
        app.register_type::<config::RotationBehavior>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<motion::MotionState>();
        app.register_type::<detection::SurfaceProbes>();
        app.register_type::<detection::SurfaceState>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::OnSurface>();
        app.register_type::<state::Airborne>();

        app.configure_sets(
            FixedUpdate,
            (
                CharacterMotorSet::Preparation,
                CharacterMotorSet::Sensors,
                CharacterMotorSet::Classification,
                CharacterMotorSet::Integration,
                CharacterMotorSet::Movement,
                CharacterMotorSet::StateSync,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (
                systems::poll_surface_holds.in_set(CharacterMotorSet::Preparation),
                systems::classify_surfaces.in_set(CharacterMotorSet::Classification),
                (
                    systems::integrate_vertical_speed,
                    systems::integrate_horizontal_speed,
                )
                    .chain()
                    .in_set(CharacterMotorSet::Integration),
                systems::apply_motion::<B>.in_set(CharacterMotorSet::Movement),
                systems::sync_state_markers.in_set(CharacterMotorSet::StateSync),
            ),
        );
    }
}
