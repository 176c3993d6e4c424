//! # `msg_root_motion_controller`
//!
//! A root-motion driven 3D character locomotion controller with physics
//! backend abstraction.
//!
//! This crate provides a character controller that:
//! - Smooths stick input into a movement speed and body-turn value for the
//!   animation graph
//! - Lets the animation's root motion drive horizontal velocity, while gravity
//!   and jumps keep ownership of vertical velocity
//! - Senses ground with a box overlap query beneath the character
//! - Runs a short timed jump state fired on the press of the jump button
//! - Adds a small amount of air steering while airborne
//! - Abstracts the physics backend for easy swapping (Rapier3D included)
//!
//! ## Architecture
//!
//! Each character carries a [`LocomotionController`](controller::LocomotionController)
//! with three entry points driven at two cadences:
//! 1. Every frame (`Update`) the ground sensor runs, then
//!    `tick_variable` updates ground/jump state, smooths input and publishes
//!    animation parameters.
//! 2. Every physics step (`FixedUpdate`) `tick_fixed` applies the air assist.
//! 3. Every physics step, after the animation engine submitted its root
//!    motion, `on_pose_computed` converts it into the body's velocity. This is
//!    the last velocity write before the physics engine integrates.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use msg_root_motion_controller::prelude::*;
//!
//! // Create the components for a player character
//! let controller = LocomotionController::new();
//! let config = LocomotionConfig::player();
//! let animator = AnimatorParameters::default();
//! let root_motion = RootMotionDelta::default();
//!
//! // These can be spawned together with a physics body
//! ```

use bevy::prelude::*;

pub mod animation;
pub mod backend;
pub mod config;
pub mod controller;
pub mod detection;
pub mod error;
pub mod intent;
pub mod jump;
pub mod math;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::animation::{
        AnimationParameterSink, AnimatorParameters, BoolParameter, FloatParameter,
        RootMotionDelta, RootMotionSample,
    };
    pub use crate::backend::LocomotionPhysicsBackend;
    pub use crate::config::LocomotionConfig;
    pub use crate::controller::LocomotionController;
    pub use crate::detection::{GroundProbe, GroundSensor};
    pub use crate::error::LocomotionError;
    pub use crate::intent::{LocomotionInput, MovementInput};
    pub use crate::state::{Airborne, Grounded, Jumping, Moving};
    pub use crate::{LocomotionControllerPlugin, LocomotionSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dLocomotionBundle};
}

/// System sets of the locomotion controller, in execution order per schedule.
///
/// - `PreUpdate`: [`Validation`](Self::Validation)
/// - `Update`: [`Sensors`](Self::Sensors) -> [`Locomotion`](Self::Locomotion)
///   -> [`StateSync`](Self::StateSync)
/// - `FixedUpdate`: [`AirAssist`](Self::AirAssist) -> [`RootMotion`](Self::RootMotion)
///
/// Animation systems that submit [`RootMotionDelta`](animation::RootMotionDelta)
/// samples must run before [`RootMotion`](Self::RootMotion), and the physics
/// step must run after it (for Rapier, `RapierPhysicsPlugin::in_fixed_schedule`).
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionSet {
    /// Checks collaborator bindings of newly added controllers.
    Validation,
    /// Backend ground overlap queries.
    Sensors,
    /// Variable-step controller update.
    Locomotion,
    /// Marker component sync.
    StateSync,
    /// Fixed-step air assist translation.
    AirAssist,
    /// Root motion to velocity conversion.
    RootMotion,
}

/// Main plugin for the locomotion controller.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (overlap queries, impulses, velocity writes).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_root_motion_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
///     .add_plugins(LocomotionControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct LocomotionControllerPlugin<B: backend::LocomotionPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::LocomotionPhysicsBackend> Default for LocomotionControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::LocomotionPhysicsBackend> Plugin for LocomotionControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<controller::LocomotionController>();
        app.register_type::<config::LocomotionConfig>();
        app.register_type::<intent::MovementInput>();
        app.register_type::<animation::AnimatorParameters>();
        app.register_type::<animation::RootMotionDelta>();
        app.register_type::<detection::GroundSensor>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::Jumping>();
        app.register_type::<state::Moving>();

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.configure_sets(
            Update,
            (
                LocomotionSet::Sensors,
                LocomotionSet::Locomotion,
                LocomotionSet::StateSync,
            )
                .chain(),
        );
        app.configure_sets(
            FixedUpdate,
            (LocomotionSet::AirAssist, LocomotionSet::RootMotion).chain(),
        );

        // Bindings are checked before the first fixed step can touch the body
        app.add_systems(
            PreUpdate,
            systems::verify_bindings::<B>.in_set(LocomotionSet::Validation),
        );

        app.add_systems(
            Update,
            (
                systems::update_locomotion::<B>.in_set(LocomotionSet::Locomotion),
                systems::sync_state_markers.in_set(LocomotionSet::StateSync),
            ),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::apply_air_assist.in_set(LocomotionSet::AirAssist),
                systems::apply_root_motion::<B>.in_set(LocomotionSet::RootMotion),
            ),
        );
    }
}
