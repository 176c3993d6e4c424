//! Core controller systems.
//!
//! These systems drive [`LocomotionController`] from the Bevy schedules.
//! They are generic over the physics backend to allow different physics
//! engines to be used.

use bevy::prelude::*;

use crate::animation::{AnimatorParameters, RootMotionDelta};
use crate::backend::LocomotionPhysicsBackend;
use crate::config::LocomotionConfig;
use crate::controller::LocomotionController;
use crate::detection::GroundSensor;
use crate::error::{check_bindings, Bindings};
use crate::intent::MovementInput;
use crate::state::{Airborne, Grounded, Jumping, Moving};

/// Check the collaborators of newly added controllers.
///
/// A controller whose animation binding, physics body or configuration is
/// unusable is removed from its entity, so that character never starts.
pub fn verify_bindings<B: LocomotionPhysicsBackend>(
    mut commands: Commands,
    q_added: Query<
        (
            Entity,
            &LocomotionConfig,
            Has<AnimatorParameters>,
            Has<RootMotionDelta>,
            Has<B::BodyComponent>,
        ),
        Added<LocomotionController>,
    >,
) {
    for (entity, config, animator, root_motion, rigid_body) in &q_added {
        let bindings = Bindings {
            animator,
            root_motion,
            rigid_body,
        };
        if let Err(err) = check_bindings(entity, bindings, config) {
            error!("locomotion controller not started: {err}");
            commands.entity(entity).remove::<LocomotionController>();
        }
    }
}

/// Run the variable-step controller update for every character.
///
/// Reads this frame's input and ground sensor, writes the animation
/// parameters, and hands jump impulses to the physics backend.
pub fn update_locomotion<B: LocomotionPhysicsBackend>(world: &mut World) {
    let dt = world
        .get_resource::<Time>()
        .map(|t| t.delta_secs())
        .unwrap_or(0.0);

    let mut impulses: Vec<(Entity, Vec3)> = Vec::new();
    let mut query = world.query::<(
        Entity,
        &mut LocomotionController,
        &mut MovementInput,
        &Transform,
        &GroundSensor,
        &LocomotionConfig,
        &mut AnimatorParameters,
    )>();

    for (entity, mut controller, mut input, transform, sensor, config, mut animator) in
        query.iter_mut(world)
    {
        let polled = input.poll();
        if let Some(impulse) = controller.tick_variable(
            dt,
            polled,
            transform,
            sensor.hits(),
            config,
            &mut *animator,
        ) {
            impulses.push((entity, impulse));
        }
    }

    for (entity, impulse) in impulses {
        B::apply_impulse(world, entity, impulse);
    }
}

/// Apply the air assist translation for airborne, moving characters.
pub fn apply_air_assist(
    time: Res<Time>,
    mut q_controllers: Query<(&LocomotionController, &LocomotionConfig, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (controller, config, mut transform) in &mut q_controllers {
        // Only take the transform mutably when it will actually move
        if !controller.air_assist_active() {
            continue;
        }
        controller.tick_fixed(dt, &mut transform, config);
    }
}

/// Convert submitted root motion samples into body velocities.
///
/// Characters without a sample this step keep their velocity.
pub fn apply_root_motion<B: LocomotionPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let entities: Vec<Entity> = world
        .query_filtered::<Entity, With<LocomotionController>>()
        .iter(world)
        .collect();

    let mut query = world.query::<(
        &mut LocomotionController,
        &mut Transform,
        &LocomotionConfig,
        &mut RootMotionDelta,
    )>();

    let mut velocities: Vec<(Entity, Vec3)> = Vec::with_capacity(entities.len());
    for entity in entities {
        let current_velocity = B::get_velocity(world, entity);
        let Ok((mut controller, mut transform, config, mut mailbox)) = query.get_mut(world, entity)
        else {
            continue;
        };
        let Some(sample) = mailbox.take() else {
            continue;
        };
        let velocity =
            controller.on_pose_computed(sample, dt, current_velocity, &mut transform, config);
        velocities.push((entity, velocity));
    }

    for (entity, velocity) in velocities {
        B::set_velocity(world, entity, velocity);
    }
}

/// Sync state marker components based on controller state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &LocomotionController,
        Has<Grounded>,
        Has<Airborne>,
        Has<Jumping>,
        Has<Moving>,
    )>,
) {
    for (entity, controller, has_grounded, has_airborne, has_jumping, has_moving) in &q_controllers
    {
        // Sync Grounded/Airborne
        if controller.is_grounded() {
            if !has_grounded || has_airborne {
                commands.entity(entity).insert(Grounded).remove::<Airborne>();
            }
        } else if !has_airborne || has_grounded {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }

        // Sync Jumping
        if controller.is_jumping() && !has_jumping {
            commands.entity(entity).insert(Jumping);
        } else if !controller.is_jumping() && has_jumping {
            commands.entity(entity).remove::<Jumping>();
        }

        // Sync Moving
        if controller.is_moving() && !has_moving {
            commands.entity(entity).insert(Moving);
        } else if !controller.is_moving() && has_moving {
            commands.entity(entity).remove::<Moving>();
        }
    }
}
