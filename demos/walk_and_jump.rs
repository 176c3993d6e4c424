//! Walk and Jump Example
//!
//! A capsule character on a flat platform, driven by the locomotion
//! controller. There is no skinned animation here: a small procedural
//! "animation" system stands in for the animation engine and turns the
//! published `Speed` and `MovingTurn` parameters back into root motion.
//!
//! Controls:
//! - **WASD/Arrow Keys**: Move (camera-independent, W is world forward)
//! - **Space**: Jump

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use msg_root_motion_controller::prelude::*;

const PLAYER_RADIUS: f32 = 0.3;
const PLAYER_HALF_HEIGHT: f32 = 0.5;
/// Ground speed in m/s at `Speed == 1`.
const STRIDE_SPEED: f32 = 2.5;
/// Yaw rate in rad/s at `MovingTurn == 1`.
const TURN_SPEED: f32 = 6.0;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Walk and Jump - Root Motion Controller".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics runs in FixedUpdate, after the controller wrote the velocity
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        .add_plugins(LocomotionControllerPlugin::<Rapier3dBackend>::default())
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                handle_input.before(LocomotionSet::Locomotion),
                camera_follow,
                debug_state,
            ),
        )
        .add_systems(
            FixedUpdate,
            procedural_root_motion.before(LocomotionSet::RootMotion),
        )
        .run();
}

#[derive(Component)]
struct Player;

#[derive(Component)]
struct DebugText;

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 6.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Debug text
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        DebugText,
    ));

    // Ground platform, top face at y = 0
    commands.spawn((
        Transform::from_xyz(0.0, -0.5, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(20.0, 0.5, 20.0),
        Mesh3d(meshes.add(Cuboid::new(40.0, 1.0, 40.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.3, 0.3))),
    ));

    // A few steps to jump onto
    for (i, height) in [0.4_f32, 0.8, 1.2].into_iter().enumerate() {
        let x = 3.0 + i as f32 * 2.0;
        commands.spawn((
            Transform::from_xyz(x, height / 2.0, -4.0),
            RigidBody::Fixed,
            Collider::cuboid(1.0, height / 2.0, 1.0),
            Mesh3d(meshes.add(Cuboid::new(2.0, height, 2.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.45, 0.4, 0.35))),
        ));
    }

    // Player, feet at the origin of the transform
    let body = commands
        .spawn((
            Player,
            Transform::from_xyz(0.0, 0.0, 0.0),
            LocomotionController::new(),
            LocomotionConfig::player(),
            AnimatorParameters::default(),
            RootMotionDelta::default(),
            Rapier3dLocomotionBundle::new(),
            Visibility::default(),
        ))
        .id();

    // Collider and mesh sit above the feet
    let offset = Transform::from_xyz(0.0, PLAYER_HALF_HEIGHT + PLAYER_RADIUS, 0.0);
    commands.spawn((
        ChildOf(body),
        offset,
        Collider::capsule_y(PLAYER_HALF_HEIGHT, PLAYER_RADIUS),
        Mesh3d(meshes.add(Capsule3d::new(PLAYER_RADIUS, PLAYER_HALF_HEIGHT * 2.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.2, 0.6, 0.9))),
    ));
}

fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut MovementInput, With<Player>>,
) {
    for mut input in &mut query {
        let mut direction = Vec2::ZERO;
        if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
            direction.x -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
            direction.x += 1.0;
        }
        if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
            direction.y += 1.0;
        }
        if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
            direction.y -= 1.0;
        }

        input.set_direction(direction);
        input.set_jump_pressed(keyboard.pressed(KeyCode::Space));
    }
}

/// Stand-in for an animation engine with root motion enabled.
///
/// Walks forward proportionally to `Speed` and yaws with `MovingTurn`,
/// submitting one root motion sample per physics step.
fn procedural_root_motion(
    time: Res<Time>,
    mut query: Query<(&Transform, &AnimatorParameters, &LocomotionConfig, &mut RootMotionDelta)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (transform, params, config, mut root_motion) in &mut query {
        let speed = params.float(FloatParameter::Speed);
        let turn = params.float(FloatParameter::MovingTurn);

        // The controller scales the sample by dt * root_motion_velocity_scale
        let ground_velocity = *transform.forward() * speed * STRIDE_SPEED;
        let delta_position = ground_velocity / (dt * config.root_motion_velocity_scale);

        // Positive turn is to the right, a negative yaw in a right-handed frame
        let delta_rotation = Quat::from_rotation_y(-turn * TURN_SPEED * dt);

        root_motion.submit(delta_position, delta_rotation);
    }
}

fn camera_follow(
    player: Query<&Transform, With<Player>>,
    mut camera: Query<&mut Transform, (With<Camera3d>, Without<Player>)>,
) {
    let Ok(player) = player.single() else {
        return;
    };
    let Ok(mut camera) = camera.single_mut() else {
        return;
    };

    let target = player.translation + Vec3::new(0.0, 6.0, 10.0);
    camera.translation = camera.translation.lerp(target, 0.1);
    camera.look_at(player.translation, Vec3::Y);
}

fn debug_state(
    player: Query<(&LocomotionController, &Transform, Has<Grounded>, Has<Jumping>), With<Player>>,
    mut text: Query<&mut Text, With<DebugText>>,
) {
    let Ok((controller, transform, grounded, jumping)) = player.single() else {
        return;
    };
    let Ok(mut text) = text.single_mut() else {
        return;
    };

    text.0 = format!(
        "WALK AND JUMP\n\
         speed: {:.2}\n\
         turn: {:+.2}\n\
         grounded: {}\n\
         jumping: {}\n\
         position: ({:.2}, {:.2}, {:.2})",
        controller.movement_speed(),
        controller.body_turn(),
        grounded,
        jumping,
        transform.translation.x,
        transform.translation.y,
        transform.translation.z,
    );
}
