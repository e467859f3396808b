//! Player controller layer.
//!
//! Runs once per frame, ahead of the physics ticks. It turns abstract player
//! input (however the game polls devices) into a [`MovementIntent`] and
//! selects higher-level movement behaviors such as sprinting through a
//! movement substate registry.

use std::time::Duration;

use bevy::prelude::*;

use crate::config::{MovementSettings, RotationSettings};
use crate::intent::MovementIntent;
use crate::orientation::yaw_rotation;
use crate::substate::{Substate, SubstateAction, SubstateMachine};

/// Raw per-frame player input, written by game code.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct PlayerInput {
    /// Stick/keys: x = right, y = forward. Magnitude above 1 is clamped.
    pub movement: Vec2,
    /// Look delta this frame: x = yaw, y = pitch.
    pub look: Vec2,
    /// Whether jump is held.
    pub jump: bool,
    /// Sprint axis; anything above zero sprints.
    pub sprint: f32,
}

/// Player tuning.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct PlayerController {
    /// Degrees of control rotation per unit of look input.
    pub control_rotation_sensitivity: f32,
    /// Max horizontal speed while not sprinting.
    pub walk_speed: f32,
    /// Max horizontal speed while sprinting.
    pub sprint_speed: f32,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self {
            control_rotation_sensitivity: 1.0,
            walk_speed: 8.0,
            sprint_speed: 16.0,
        }
    }
}

impl PlayerController {
    /// Builder: set look sensitivity.
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.control_rotation_sensitivity = sensitivity;
        self
    }

    /// Builder: set walk and sprint speeds.
    pub fn with_speeds(mut self, walk_speed: f32, sprint_speed: f32) -> Self {
        self.walk_speed = walk_speed;
        self.sprint_speed = sprint_speed;
        self
    }
}

/// Substates of the movement registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementSubstate {
    /// Walking.
    Void,
    /// Sprinting.
    Running,
}

impl Substate for MovementSubstate {
    const VOID: Self = MovementSubstate::Void;
}

/// What movement actions read and write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SprintContext {
    /// Whether sprint is held this frame.
    pub sprinting: bool,
    /// Speed limit when walking.
    pub walk_speed: f32,
    /// Speed limit when sprinting.
    pub sprint_speed: f32,
    /// Speed limit the motor will use.
    pub max_horizontal_speed: f32,
}

/// Movement registry of a player.
pub type MovementSubstates = SubstateMachine<MovementSubstate, SprintContext>;

fn walking(_: &mut MovementSubstates, _: &mut SprintContext) {}

fn running(substates: &mut MovementSubstates, ctx: &mut SprintContext) {
    if ctx.sprinting {
        ctx.max_horizontal_speed = ctx.sprint_speed;
    } else {
        ctx.max_horizontal_speed = ctx.walk_speed;
        substates.switch_to(MovementSubstate::Void);
        debug!("stopped running");
    }
}

/// Build the movement registry with its standard substates.
pub fn movement_substates() -> MovementSubstates {
    MovementSubstates::from_states([
        (
            MovementSubstate::Void,
            walking as SubstateAction<MovementSubstate, SprintContext>,
        ),
        (MovementSubstate::Running, running),
    ])
}

/// World-space movement input relative to the control yaw.
pub fn camera_relative_input(movement: Vec2, control_yaw: f32) -> Vec3 {
    let yaw = yaw_rotation(control_yaw);
    let forward = yaw * Vec3::NEG_Z;
    let right = yaw * Vec3::X;
    (forward * movement.y + right * movement.x).clamp_length_max(1.0)
}

/// Select the movement behavior for this frame.
pub fn select_movement_substate(
    substates: &mut MovementSubstates,
    input: &PlayerInput,
    controller: &PlayerController,
    movement: &mut MovementSettings,
) {
    let mut ctx = SprintContext {
        sprinting: input.sprint > 0.0,
        walk_speed: controller.walk_speed,
        sprint_speed: controller.sprint_speed,
        max_horizontal_speed: movement.max_horizontal_speed,
    };
    match substates.current() {
        MovementSubstate::Void => {
            if ctx.sprinting {
                debug!("started running");
                substates.run(MovementSubstate::Running, &mut ctx);
            }
        }
        MovementSubstate::Running => {
            substates.run(MovementSubstate::Running, &mut ctx);
        }
    }
    movement.max_horizontal_speed = ctx.max_horizontal_speed;
}

/// Update control rotation, movement intent and jump from player input.
pub fn update_player_intent(
    mut q_players: Query<(
        &PlayerInput,
        &PlayerController,
        &mut MovementIntent,
        Option<&RotationSettings>,
    )>,
) {
    for (input, controller, mut intent, rotation) in &mut q_players {
        let settings = rotation.copied().unwrap_or_default();
        let current = intent.control_rotation();
        let look = input.look * controller.control_rotation_sensitivity;
        // Look right turns clockwise seen from above; look up lowers pitch.
        let control = Vec2::new(current.x - look.y, current.y - look.x);
        intent.set_control_rotation(control, &settings);

        let movement = camera_relative_input(input.movement, intent.control_yaw());
        intent.set_movement_input(movement);
        intent.set_jump(input.jump);
    }
}

/// Poll movement holds and run behavior selection.
pub fn update_movement_substates(
    time: Option<Res<Time>>,
    mut q_players: Query<(
        &PlayerInput,
        &PlayerController,
        &mut MovementSubstates,
        &mut MovementSettings,
    )>,
) {
    let delta = time.map(|t| t.delta()).unwrap_or(Duration::ZERO);
    for (input, controller, mut substates, mut movement) in &mut q_players {
        let ctx = SprintContext {
            sprinting: input.sprint > 0.0,
            walk_speed: controller.walk_speed,
            sprint_speed: controller.sprint_speed,
            max_horizontal_speed: movement.max_horizontal_speed,
        };
        substates.poll_hold(delta, &ctx);
        select_movement_substate(&mut substates, input, controller, &mut movement);
    }
}

/// Player components, spawned next to a [`CharacterBundle`](crate::CharacterBundle).
#[derive(Bundle)]
pub struct PlayerBundle {
    pub input: PlayerInput,
    pub controller: PlayerController,
    pub movement_substates: MovementSubstates,
}

impl Default for PlayerBundle {
    fn default() -> Self {
        Self::new(PlayerController::default())
    }
}

impl PlayerBundle {
    /// Idle input and a fresh movement registry for `controller`.
    pub fn new(controller: PlayerController) -> Self {
        Self {
            input: PlayerInput::default(),
            controller,
            movement_substates: movement_substates(),
        }
    }
}

/// Per-frame player systems.
pub struct PlayerControllerPlugin;

impl Plugin for PlayerControllerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PlayerInput>();
        app.register_type::<PlayerController>();

        app.add_systems(
            Update,
            (update_player_intent, update_movement_substates).chain(),
        );
    }
}
