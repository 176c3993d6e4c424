//! Animation engine boundary.
//!
//! The controller never talks to an animation graph directly. It writes a
//! small table of typed parameters through [`AnimationParameterSink`] and
//! receives one [`RootMotionSample`] per physics step through the
//! [`RootMotionDelta`] mailbox. Whatever drives the skeleton (Bevy's
//! `AnimationGraph`, a custom blend tree, a procedural gait) reads the table
//! and fills the mailbox.

use bevy::prelude::*;

/// Float parameters the controller drives.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatParameter {
    /// Current movement speed.
    Speed,
    /// Normalized body turn, roughly `[-1, 1]`.
    MovingTurn,
}

/// Boolean parameters the controller drives.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolParameter {
    /// Ground contact.
    Grounded,
    /// Jump state active.
    Jumping,
}

/// Receiver of controller-driven animation parameters.
pub trait AnimationParameterSink {
    /// Write a float parameter.
    fn set_float(&mut self, parameter: FloatParameter, value: f32);

    /// Write a boolean parameter.
    fn set_bool(&mut self, parameter: BoolParameter, value: bool);
}

/// Typed animation parameter table.
///
/// The controller rewrites every slot each variable-step tick. Animation
/// systems read it to drive blend weights and transitions.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct AnimatorParameters {
    /// `Speed` slot.
    pub speed: f32,
    /// `MovingTurn` slot.
    pub moving_turn: f32,
    /// `Grounded` slot.
    pub grounded: bool,
    /// `Jumping` slot.
    pub jumping: bool,
}

impl AnimatorParameters {
    /// Read a float slot.
    pub fn float(&self, parameter: FloatParameter) -> f32 {
        match parameter {
            FloatParameter::Speed => self.speed,
            FloatParameter::MovingTurn => self.moving_turn,
        }
    }

    /// Read a boolean slot.
    pub fn bool(&self, parameter: BoolParameter) -> bool {
        match parameter {
            BoolParameter::Grounded => self.grounded,
            BoolParameter::Jumping => self.jumping,
        }
    }
}

impl AnimationParameterSink for AnimatorParameters {
    fn set_float(&mut self, parameter: FloatParameter, value: f32) {
        match parameter {
            FloatParameter::Speed => self.speed = value,
            FloatParameter::MovingTurn => self.moving_turn = value,
        }
    }

    fn set_bool(&mut self, parameter: BoolParameter, value: bool) {
        match parameter {
            BoolParameter::Grounded => self.grounded = value,
            BoolParameter::Jumping => self.jumping = value,
        }
    }
}

/// Displacement and rotation the animation produced over one physics step.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct RootMotionSample {
    /// World-space displacement of the root since the previous physics step.
    pub delta_position: Vec3,
    /// Orientation change of the root since the previous physics step.
    pub delta_rotation: Quat,
}

impl Default for RootMotionSample {
    fn default() -> Self {
        Self {
            delta_position: Vec3::ZERO,
            delta_rotation: Quat::IDENTITY,
        }
    }
}

impl RootMotionSample {
    /// Create a sample.
    pub fn new(delta_position: Vec3, delta_rotation: Quat) -> Self {
        Self {
            delta_position,
            delta_rotation,
        }
    }

    /// A sample with translation only.
    pub fn translation(delta_position: Vec3) -> Self {
        Self {
            delta_position,
            ..default()
        }
    }
}

/// Mailbox for the animation engine's per-step root motion.
///
/// The animation engine calls [`submit`](Self::submit) after computing its
/// pose for a physics step. The root motion system takes the sample in the
/// same step. A step without a submitted sample leaves the body's velocity
/// untouched.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct RootMotionDelta {
    pending: Option<RootMotionSample>,
}

impl RootMotionDelta {
    /// Deliver this step's sample, replacing any sample not yet consumed.
    pub fn submit(&mut self, delta_position: Vec3, delta_rotation: Quat) {
        self.pending = Some(RootMotionSample::new(delta_position, delta_rotation));
    }

    /// Check if a sample is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the waiting sample, if any.
    pub fn take(&mut self) -> Option<RootMotionSample> {
        self.pending.take()
    }
}
