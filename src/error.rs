//! Start-up failures of a locomotion controller.
//!
//! The controller has no per-tick error path: a rejected jump or an empty
//! ground query are ordinary state transitions. The only failures are missing
//! collaborators or unusable configuration, which are detected once when a
//! controller is added and prevent that character from starting.

use bevy::prelude::*;
use thiserror::Error;

/// Reasons a character's locomotion controller cannot start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocomotionError {
    /// No animation parameter table is attached to the character.
    #[error("entity {0} has no AnimatorParameters: the animation engine is not bound")]
    MissingAnimator(Entity),

    /// No root motion mailbox is attached to the character.
    #[error("entity {0} has no RootMotionDelta: root motion cannot be delivered")]
    MissingRootMotion(Entity),

    /// The physics backend found no rigid body on the character.
    #[error("entity {0} has no rigid body for the physics backend")]
    MissingRigidBody(Entity),

    /// A configuration value is negative, non-finite or otherwise unusable.
    #[error("invalid locomotion config: {field} = {value}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
}

/// Which collaborators are attached to a character.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bindings {
    pub animator: bool,
    pub root_motion: bool,
    pub rigid_body: bool,
}

/// Check that a character has every collaborator it needs and a usable
/// configuration.
///
/// Bindings are checked before the configuration, in the order the frame
/// uses them: animation, root motion, physics body.
pub fn check_bindings(
    entity: Entity,
    bindings: Bindings,
    config: &crate::config::LocomotionConfig,
) -> Result<(), LocomotionError> {
    if !bindings.animator {
        return Err(LocomotionError::MissingAnimator(entity));
    }
    if !bindings.root_motion {
        return Err(LocomotionError::MissingRootMotion(entity));
    }
    if !bindings.rigid_body {
        return Err(LocomotionError::MissingRigidBody(entity));
    }
    config.validate()
}
