//! Integration tests for the character motor.
//!
//! These tests run the full fixed-step pipeline with a scripted backend whose
//! probe hits are set per test, so each tick's classification is known.
//! Schedules are run by hand to keep every tick deterministic.

use bevy::prelude::*;
use character_motor::prelude::*;

const DT: f32 = 0.1;

/// Per-probe normals reported by the scripted backend. A zero normal is a miss.
#[derive(Resource, Default)]
struct ScriptedSurfaces {
    normals: Vec<Vec3>,
    collider: Option<Entity>,
}

/// Backend that moves through the transform and reports scripted hits.
struct ScriptedBackend;

impl CharacterPhysicsBackend for ScriptedBackend {
    fn plugin() -> impl Plugin {
        ScriptedBackendPlugin
    }

    fn move_character(world: &mut World, entity: Entity, displacement: Vec3) {
        TransformBackend::move_character(world, entity, displacement);
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        TransformBackend::get_position(world, entity)
    }

    fn get_rotation(world: &World, entity: Entity) -> Quat {
        TransformBackend::get_rotation(world, entity)
    }

    fn set_rotation(world: &mut World, entity: Entity, rotation: Quat) {
        TransformBackend::set_rotation(world, entity, rotation);
    }
}

struct ScriptedBackendPlugin;

impl Plugin for ScriptedBackendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScriptedSurfaces>();
        app.add_systems(
            FixedUpdate,
            scripted_probes.in_set(CharacterMotorSet::Sensors),
        );
    }
}

fn scripted_probes(
    surfaces: Res<ScriptedSurfaces>,
    mut q_characters: Query<(&Transform, &mut SurfaceProbes)>,
) {
    for (transform, mut probes) in &mut q_characters {
        probes.cast(transform.translation, transform.rotation, |cast| {
            surfaces
                .normals
                .get(cast.probe)
                .copied()
                .filter(|normal| *normal != Vec3::ZERO)
                .map(|normal| CollisionData::new(0.05, normal, cast.origin, surfaces.collider))
        });
    }
}

/// Create a minimal test app with the motor and scripted backend.
fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(CharacterMotorPlugin::<ScriptedBackend>::default());
    app.insert_resource(Time::<Fixed>::from_seconds(DT as f64));
    app
}

/// Spawn a character with default tuning at the origin.
fn spawn_character(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            Transform::default(),
            CharacterBundle::new(SurfaceProbes::humanoid(0.4, 1.8)),
        ))
        .id()
}

fn set_surfaces(app: &mut App, normals: &[Vec3]) {
    app.world_mut().resource_mut::<ScriptedSurfaces>().normals = normals.to_vec();
}

fn ground(app: &mut App) {
    set_surfaces(app, &[Vec3::Y]);
}

fn void(app: &mut App) {
    set_surfaces(app, &[]);
}

/// Run one physics tick.
fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        tick(app);
    }
}

fn intent_mut(app: &mut App, entity: Entity) -> Mut<'_, MovementIntent> {
    app.world_mut()
        .get_mut::<MovementIntent>(entity)
        .expect("character has an intent")
}

fn motion(app: &App, entity: Entity) -> MotionState {
    *app.world().get::<MotionState>(entity).expect("character has motion")
}

fn probes(app: &App, entity: Entity) -> &SurfaceProbes {
    app.world()
        .get::<SurfaceProbes>(entity)
        .expect("character has probes")
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

mod classification {
    use super::*;

    #[test]
    fn ground_probe_hit_is_grounded() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);

        tick(&mut app);

        assert_eq!(probes(&app, character).surface_state(), SurfaceState::Grounded);
    }

    #[test]
    fn ground_beats_side_surfaces() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        set_surfaces(&mut app, &[Vec3::Y, Vec3::X, Vec3::NEG_X, Vec3::Z]);

        tick(&mut app);

        assert_eq!(probes(&app, character).surface_state(), SurfaceState::Grounded);
    }

    #[test]
    fn steep_side_hit_is_on_surface() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        set_surfaces(&mut app, &[Vec3::ZERO, Vec3::X]);

        tick(&mut app);

        assert_eq!(probes(&app, character).surface_state(), SurfaceState::OnSurface);
        assert_eq!(motion(&app, character).vertical_speed, 0.0);
    }

    #[test]
    fn shallow_side_hit_is_airborne() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        set_surfaces(&mut app, &[Vec3::ZERO, Vec3::new(0.5, 0.866, 0.0)]);

        tick(&mut app);

        assert_eq!(probes(&app, character).surface_state(), SurfaceState::Airborne);
    }

    #[test]
    fn contacts_roll_over() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        let first = app.world_mut().spawn_empty().id();
        let second = app.world_mut().spawn_empty().id();

        ground(&mut app);
        app.world_mut().resource_mut::<ScriptedSurfaces>().collider = Some(first);
        tick(&mut app);
        app.world_mut().resource_mut::<ScriptedSurfaces>().collider = Some(second);
        tick(&mut app);

        let probes = probes(&app, character);
        assert_eq!(probes.current_surface().map(|c| c.entity), Some(second));
        assert_eq!(probes.last_surface().map(|c| c.entity), Some(first));
    }
}

mod ledges {
    use super::*;

    #[test]
    fn just_left_edge_lasts_one_tick() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);
        tick(&mut app);

        void(&mut app);
        tick(&mut app);
        assert_eq!(probes(&app, character).surface_state(), SurfaceState::Airborne);
        assert!(probes(&app, character).just_left_edge());
        assert_eq!(
            app.world().get::<SurfaceSubstates>(character).map(|s| s.current()),
            Some(SurfaceSubstate::JustWalkedOffLedge)
        );

        tick(&mut app);
        assert!(!probes(&app, character).just_left_edge());
        assert_eq!(
            app.world().get::<SurfaceSubstates>(character).map(|s| s.current()),
            Some(SurfaceSubstate::Void)
        );
    }

    #[test]
    fn late_jump_after_ledge_is_granted() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);
        tick(&mut app);

        void(&mut app);
        intent_mut(&mut app, character).set_jump(true);
        tick(&mut app);

        let jump_speed = MovementSettings::default().jump_speed;
        assert!(approx(motion(&app, character).vertical_speed, jump_speed));
    }

    #[test]
    fn jump_two_ticks_after_ledge_is_refused() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);
        tick(&mut app);

        void(&mut app);
        run_ticks(&mut app, 2);
        let before = motion(&app, character).vertical_speed;

        intent_mut(&mut app, character).set_jump(true);
        tick(&mut app);

        let after = motion(&app, character).vertical_speed;
        assert!(after < before, "gravity keeps pulling: {before} -> {after}");
    }

    #[test]
    fn jumping_off_the_ground_is_not_a_ledge() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);
        intent_mut(&mut app, character).set_jump(true);
        tick(&mut app);
        assert!(approx(motion(&app, character).vertical_speed, 10.0));

        void(&mut app);
        tick(&mut app);
        assert!(!probes(&app, character).just_left_edge());
    }

    #[test]
    fn locked_registry_suppresses_ledge() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);
        tick(&mut app);

        app.world_mut()
            .get_mut::<SurfaceSubstates>(character)
            .expect("character has surface substates")
            .lock();
        void(&mut app);
        intent_mut(&mut app, character).set_jump(true);
        tick(&mut app);

        assert!(!probes(&app, character).just_left_edge());
        let gravity = GravitySettings::default();
        let expected = -gravity.grounded_gravity - gravity.gravity * DT;
        assert!(approx(motion(&app, character).vertical_speed, expected));
    }
}

mod movement {
    use super::*;

    #[test]
    fn grounded_character_accelerates() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);
        intent_mut(&mut app, character).set_movement_input(Vec3::NEG_Z);

        tick(&mut app);
        assert!(approx(motion(&app, character).horizontal_speed, 2.5));

        let transform = *app.world().get::<Transform>(character).expect("transform");
        assert!(approx(transform.translation.z, -0.25));
        assert!(approx(transform.translation.y, -0.5));

        run_ticks(&mut app, 5);
        assert!(approx(motion(&app, character).horizontal_speed, 8.0));
    }

    #[test]
    fn released_input_decelerates_along_last_direction() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);
        intent_mut(&mut app, character).set_movement_input(Vec3::X);
        run_ticks(&mut app, 4);

        intent_mut(&mut app, character).set_movement_input(Vec3::ZERO);
        tick(&mut app);

        let motion = motion(&app, character);
        assert!(approx(motion.horizontal_speed, 5.5));
        assert!(motion.velocity.x > 0.0);
    }

    #[test]
    fn airborne_speed_is_kept() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);
        intent_mut(&mut app, character).set_movement_input(Vec3::X);
        run_ticks(&mut app, 2);

        void(&mut app);
        intent_mut(&mut app, character).set_movement_input(Vec3::ZERO);
        run_ticks(&mut app, 3);

        assert!(approx(motion(&app, character).horizontal_speed, 5.0));
    }

    #[test]
    fn released_jump_is_cut_short() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);
        intent_mut(&mut app, character).set_jump(true);
        tick(&mut app);

        void(&mut app);
        intent_mut(&mut app, character).set_jump(false);
        tick(&mut app);

        // Abort then gravity: 10 - 10 * 0.1 - 20 * 0.1.
        assert!(approx(motion(&app, character).vertical_speed, 7.0));
    }
}

mod markers {
    use super::*;

    fn markers(app: &App, entity: Entity) -> (bool, bool, bool) {
        let world = app.world();
        (
            world.get::<Grounded>(entity).is_some(),
            world.get::<OnSurface>(entity).is_some(),
            world.get::<Airborne>(entity).is_some(),
        )
    }

    #[test]
    fn markers_follow_surface_state() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);

        ground(&mut app);
        tick(&mut app);
        assert_eq!(markers(&app, character), (true, false, false));

        set_surfaces(&mut app, &[Vec3::ZERO, Vec3::NEG_X]);
        tick(&mut app);
        assert_eq!(markers(&app, character), (false, true, false));

        void(&mut app);
        tick(&mut app);
        assert_eq!(markers(&app, character), (false, false, true));
    }
}

mod orientation {
    use super::*;

    fn forward(app: &App, entity: Entity) -> Vec3 {
        app.world()
            .get::<Transform>(entity)
            .map(|t| t.rotation * Vec3::NEG_Z)
            .unwrap_or(Vec3::ZERO)
    }

    #[test]
    fn turns_towards_movement() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);
        intent_mut(&mut app, character).set_movement_input(Vec3::X);

        tick(&mut app);

        assert!((forward(&app, character) - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn standing_still_keeps_facing() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        ground(&mut app);

        run_ticks(&mut app, 3);

        assert!((forward(&app, character) - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn control_rotation_drives_facing() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        let settings = RotationSettings::control_rotation();
        app.world_mut().entity_mut(character).insert(settings);
        ground(&mut app);
        intent_mut(&mut app, character).set_control_rotation(Vec2::new(0.0, 90.0), &settings);

        tick(&mut app);

        assert!((forward(&app, character) - Vec3::NEG_X).length() < 1e-4);
    }
}

mod player {
    use super::*;

    fn spawn_player(app: &mut App, input: PlayerInput) -> Entity {
        let character = spawn_character(app);
        app.world_mut().entity_mut(character).insert(PlayerBundle {
            input,
            ..default()
        });
        character
    }

    #[test]
    fn sprinting_player_exceeds_walk_speed() {
        let mut app = create_test_app();
        app.add_plugins(PlayerControllerPlugin);
        let character = spawn_player(
            &mut app,
            PlayerInput {
                movement: Vec2::Y,
                sprint: 1.0,
                ..default()
            },
        );
        ground(&mut app);

        app.world_mut().run_schedule(Update);
        run_ticks(&mut app, 10);

        assert!(approx(motion(&app, character).horizontal_speed, 16.0));
        assert_eq!(
            app.world().get::<MovementSubstates>(character).map(|s| s.current()),
            Some(MovementSubstate::Running)
        );
    }

    #[test]
    fn look_input_turns_movement() {
        let mut app = create_test_app();
        app.add_plugins(PlayerControllerPlugin);
        let character = spawn_player(
            &mut app,
            PlayerInput {
                movement: Vec2::Y,
                look: Vec2::new(-90.0, 0.0),
                ..default()
            },
        );

        app.world_mut().run_schedule(Update);

        let intent = *app.world().get::<MovementIntent>(character).expect("intent");
        assert!(approx(intent.control_yaw(), 90.0));
        assert!((intent.movement_input() - Vec3::NEG_X).length() < 1e-4);
    }
}
