//! The locomotion controller.
//!
//! [`LocomotionController`] holds all per-character locomotion state and
//! exposes three entry points, one per cadence:
//!
//! - [`tick_variable`](LocomotionController::tick_variable): once per rendered
//!   frame. Expires the jump, classifies ground contact, publishes animation
//!   parameters, smooths input, blends the body turn and starts jumps.
//! - [`tick_fixed`](LocomotionController::tick_fixed): once per physics step.
//!   Applies the air assist translation.
//! - [`on_pose_computed`](LocomotionController::on_pose_computed): once per
//!   physics step, after the animation engine produced its root motion for
//!   the step. Converts root motion into the body's velocity.
//!
//! The driver must call `on_pose_computed` after every other writer of the
//! body's velocity in a step and before the physics engine integrates it.
//! The plugin enforces this with [`LocomotionSet`](crate::LocomotionSet).

use bevy::prelude::*;

use crate::animation::{AnimationParameterSink, BoolParameter, FloatParameter, RootMotionSample};
use crate::config::LocomotionConfig;
use crate::detection::GroundSensor;
use crate::intent::{LocomotionInput, MovementInput};
use crate::jump::JumpState;
use crate::math::{lerp_angle, move_towards, move_towards_vec3, signed_angle_degrees};

/// Per-character locomotion state.
///
/// Adding this component pulls in [`MovementInput`], [`GroundSensor`] and a
/// default [`LocomotionConfig`]. The animation binding
/// ([`AnimatorParameters`](crate::animation::AnimatorParameters) and
/// [`RootMotionDelta`](crate::animation::RootMotionDelta)) and the physics
/// body must be added by the host; the plugin refuses to start a controller
/// without them.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
#[require(MovementInput, GroundSensor, LocomotionConfig, Transform)]
pub struct LocomotionController {
    /// Smoothed world-space planar movement vector.
    movement_direction: Vec3,
    /// Smoothed movement speed.
    movement_speed: f32,
    /// Speed is above the moving threshold.
    is_moving: bool,
    /// Normalized body turn, positive toward the character's right.
    body_turn: f32,
    /// Ground contact, never true while jumping.
    is_grounded: bool,
    jump: JumpState,
    /// Last horizontal per-step root motion translation.
    root_motion_delta: Vec3,
    /// Controller time in seconds, advanced by `tick_variable`.
    clock: f64,
}

impl LocomotionController {
    /// Create an idle, airborne controller.
    pub fn new() -> Self {
        Self::default()
    }

    // === Observable State ===

    /// Smoothed world-space planar movement vector.
    pub fn movement_direction(&self) -> Vec3 {
        self.movement_direction
    }

    /// Smoothed movement speed.
    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    /// Check if the character is moving.
    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// Normalized body turn in roughly `[-1, 1]`.
    pub fn body_turn(&self) -> f32 {
        self.body_turn
    }

    /// Check if the character is on the ground.
    pub fn is_grounded(&self) -> bool {
        self.is_grounded
    }

    /// Check if a jump is in progress.
    pub fn is_jumping(&self) -> bool {
        self.jump.is_active()
    }

    /// Seconds until the current jump ends, if jumping.
    pub fn jump_time_remaining(&self) -> Option<f32> {
        self.jump.remaining(self.clock).map(|t| t as f32)
    }

    /// Horizontal root motion translation of the last physics step.
    pub fn root_motion_delta(&self) -> Vec3 {
        self.root_motion_delta
    }

    /// Controller time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.clock
    }

    // === Variable Step ===

    /// Run one variable-step frame.
    ///
    /// `ground_hits` is the hit count of this frame's ground overlap query.
    /// Returns the impulse to apply to the body when a jump starts this frame.
    pub fn tick_variable(
        &mut self,
        dt: f32,
        input: LocomotionInput,
        transform: &Transform,
        ground_hits: usize,
        config: &LocomotionConfig,
        animator: &mut impl AnimationParameterSink,
    ) -> Option<Vec3> {
        self.clock += f64::from(dt);
        if self.jump.expire(self.clock) {
            debug!("jump cooldown elapsed at t={:.3}", self.clock);
        }

        self.sense_ground(ground_hits);
        animator.set_bool(BoolParameter::Grounded, self.is_grounded);
        animator.set_bool(BoolParameter::Jumping, self.jump.is_active());

        let raw = input.planar_direction();
        self.smooth_input(dt, raw, config);
        animator.set_float(FloatParameter::Speed, self.movement_speed);

        self.blend_turn(dt, raw, transform, config);
        animator.set_float(FloatParameter::MovingTurn, self.body_turn);

        if input.jump_requested {
            self.try_jump(transform, config)
        } else {
            None
        }
    }

    /// Classify ground contact from an overlap hit count.
    fn sense_ground(&mut self, hits: usize) {
        self.is_grounded = hits > 0 && !self.jump.is_active();
    }

    /// Step the smoothed direction and speed toward the raw input.
    fn smooth_input(&mut self, dt: f32, raw: Vec3, config: &LocomotionConfig) {
        self.movement_direction =
            move_towards_vec3(self.movement_direction, raw, dt * config.direction_rate);
        self.movement_speed = move_towards(
            self.movement_speed,
            self.movement_direction.length() * config.speed_scale,
            dt * config.speed_rate,
        );
        self.is_moving = self.movement_speed > config.moving_threshold;
    }

    /// Blend the body turn toward the raw input heading, or back to neutral.
    fn blend_turn(&mut self, dt: f32, raw: Vec3, transform: &Transform, config: &LocomotionConfig) {
        self.body_turn = if self.is_moving {
            // Right-handed angles are positive to the left; the turn is positive to the right.
            let desired = -signed_angle_degrees(*transform.forward(), raw, *transform.up());
            lerp_angle(self.body_turn, desired / 180.0, dt * config.moving_turn_rate)
        } else {
            lerp_angle(self.body_turn, 0.0, dt * config.idle_turn_rate)
        };
    }

    /// Start a jump if idle and grounded.
    fn try_jump(&mut self, transform: &Transform, config: &LocomotionConfig) -> Option<Vec3> {
        if self.jump.is_active() || !self.is_grounded {
            return None;
        }
        if !self.jump.start(self.clock, config.jump_cooldown) {
            return None;
        }
        self.is_grounded = false;
        debug!(
            "jump started at t={:.3}, ends at t={:.3}",
            self.clock,
            self.clock + f64::from(config.jump_cooldown)
        );
        Some(*transform.up() * config.jump_impulse())
    }

    // === Fixed Step ===

    /// Check if the air assist applies this step (airborne and moving).
    #[inline]
    pub fn air_assist_active(&self) -> bool {
        !self.is_grounded && self.is_moving
    }

    /// Run one physics step of air assist.
    ///
    /// While airborne and moving, the transform is pushed down along its own
    /// up axis and drifted along its forward axis. Returns whether the
    /// transform was changed.
    pub fn tick_fixed(&self, dt: f32, transform: &mut Transform, config: &LocomotionConfig) -> bool {
        if !self.air_assist_active() {
            return false;
        }
        let sink = *transform.down() * config.air_sink_speed * dt;
        let drift = *transform.forward() * (config.air_influence / 2.0) * dt;
        transform.translation += sink + drift;
        true
    }

    /// Convert one physics step of root motion into a body velocity.
    ///
    /// The sample's vertical displacement is discarded: the vertical part of
    /// the returned velocity is always `current_velocity.y`. The sample's
    /// rotation is applied to `transform` directly.
    pub fn on_pose_computed(
        &mut self,
        sample: RootMotionSample,
        fixed_dt: f32,
        current_velocity: Vec3,
        transform: &mut Transform,
        config: &LocomotionConfig,
    ) -> Vec3 {
        let mut step = sample.delta_position * fixed_dt;
        step.y = 0.0;
        self.root_motion_delta = step;

        transform.rotate_local(sample.delta_rotation);

        step * config.root_motion_velocity_scale * config.root_motion_speed
            + Vec3::Y * current_velocity.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimatorParameters;

    const DT: f32 = 0.02;

    fn grounded_controller(config: &LocomotionConfig) -> (LocomotionController, AnimatorParameters) {
        let mut controller = LocomotionController::new();
        let mut params = AnimatorParameters::default();
        controller.tick_variable(DT, LocomotionInput::default(), &Transform::IDENTITY, 1, config, &mut params);
        assert!(controller.is_grounded());
        (controller, params)
    }

    // ==================== Ground Tests ====================

    #[test]
    fn new_controller_is_idle_and_airborne() {
        let controller = LocomotionController::new();
        assert!(!controller.is_grounded());
        assert!(!controller.is_jumping());
        assert!(!controller.is_moving());
        assert_eq!(controller.movement_speed(), 0.0);
        assert_eq!(controller.jump_time_remaining(), None);
    }

    #[test]
    fn ground_hits_make_grounded() {
        let config = LocomotionConfig::default();
        let (mut controller, mut params) = grounded_controller(&config);
        assert!(params.grounded);

        controller.tick_variable(DT, LocomotionInput::default(), &Transform::IDENTITY, 0, &config, &mut params);
        assert!(!controller.is_grounded());
        assert!(!params.grounded);
    }

    #[test]
    fn jumping_blocks_ground_detection() {
        let mut controller = LocomotionController::new();
        controller.jump.start(0.0, 10.0);
        controller.sense_ground(3);
        assert!(!controller.is_grounded());
    }

    // ==================== Smoothing Tests ====================

    #[test]
    fn smooth_input_steps_by_direction_rate() {
        let config = LocomotionConfig::default();
        let mut controller = LocomotionController::new();
        controller.smooth_input(DT, Vec3::X, &config);

        // 8 units/s * 0.02 s
        assert!((controller.movement_direction().x - 0.16).abs() < 1e-6);
        // Speed lags: one unit/s step toward 0.16 * 1.4
        assert!((controller.movement_speed() - 0.02).abs() < 1e-6);
        assert!(controller.is_moving());
    }

    #[test]
    fn smooth_input_speed_threshold() {
        let config = LocomotionConfig::default();
        let mut controller = LocomotionController::new();
        // 0.005 speed after one step is below the 0.01 threshold
        controller.smooth_input(0.005, Vec3::X, &config);
        assert!(!controller.is_moving());
    }

    // ==================== Turn Tests ====================

    #[test]
    fn blend_turn_positive_toward_right() {
        let config = LocomotionConfig::default();
        let mut controller = LocomotionController::new();
        controller.is_moving = true;

        controller.blend_turn(DT, Vec3::X, &Transform::IDENTITY, &config);
        // Target is 90 / 180 = 0.5, blended by 2 * 0.02
        assert!((controller.body_turn() - 0.5 * 0.04).abs() < 1e-5);

        controller.body_turn = 0.0;
        controller.blend_turn(DT, Vec3::NEG_X, &Transform::IDENTITY, &config);
        assert!(controller.body_turn() < 0.0);
    }

    #[test]
    fn blend_turn_idle_returns_to_neutral() {
        let config = LocomotionConfig::default();
        let mut controller = LocomotionController::new();
        controller.body_turn = 0.5;

        controller.blend_turn(DT, Vec3::ZERO, &Transform::IDENTITY, &config);
        // 0.5 - 0.5 * 8 * 0.02
        assert!((controller.body_turn() - 0.42).abs() < 1e-5);
    }

    #[test]
    fn blend_turn_zero_input_while_moving_targets_neutral() {
        let config = LocomotionConfig::default();
        let mut controller = LocomotionController::new();
        controller.is_moving = true;
        controller.body_turn = 0.5;

        controller.blend_turn(DT, Vec3::ZERO, &Transform::IDENTITY, &config);
        assert!((controller.body_turn() - (0.5 - 0.5 * 0.04)).abs() < 1e-5);
    }

    // ==================== Jump Tests ====================

    #[test]
    fn jump_from_ground_returns_impulse() {
        let config = LocomotionConfig::default().with_jump_force(2.0);
        let (mut controller, mut params) = grounded_controller(&config);

        let impulse = controller.tick_variable(DT, LocomotionInput::jump(), &Transform::IDENTITY, 1, &config, &mut params);

        assert_eq!(impulse, Some(Vec3::Y * 400.0));
        assert!(controller.is_jumping());
        assert!(!controller.is_grounded());
    }

    #[test]
    fn jump_while_airborne_is_ignored() {
        let config = LocomotionConfig::default();
        let mut controller = LocomotionController::new();
        let mut params = AnimatorParameters::default();

        let impulse = controller.tick_variable(DT, LocomotionInput::jump(), &Transform::IDENTITY, 0, &config, &mut params);

        assert!(impulse.is_none());
        assert!(!controller.is_jumping());
    }

    #[test]
    fn jump_impulse_follows_character_up() {
        let config = LocomotionConfig::default();
        let (mut controller, mut params) = grounded_controller(&config);
        let tilted = Transform::from_rotation(Quat::from_rotation_x(0.3));

        let impulse = controller
            .tick_variable(DT, LocomotionInput::jump(), &tilted, 1, &config, &mut params)
            .unwrap();

        assert!((impulse.normalize() - *tilted.up()).length() < 1e-5);
        assert!((impulse.length() - config.jump_impulse()).abs() < 1e-3);
    }

    #[test]
    fn jump_parameters_published_next_frame() {
        let config = LocomotionConfig::default();
        let (mut controller, mut params) = grounded_controller(&config);

        controller.tick_variable(DT, LocomotionInput::jump(), &Transform::IDENTITY, 1, &config, &mut params);
        // Parameters were written before the jump started this frame
        assert!(params.grounded);
        assert!(!params.jumping);

        controller.tick_variable(DT, LocomotionInput::default(), &Transform::IDENTITY, 1, &config, &mut params);
        assert!(!params.grounded);
        assert!(params.jumping);
    }

    // ==================== Air Assist Tests ====================

    #[test]
    fn air_assist_moves_down_and_forward() {
        let config = LocomotionConfig::default().with_air_influence(1.0);
        let mut controller = LocomotionController::new();
        controller.is_moving = true;
        let mut transform = Transform::IDENTITY;

        assert!(controller.tick_fixed(0.5, &mut transform, &config));
        // down: 1.0 * 0.5, forward (-Z): 1.0 / 2 * 0.5
        assert!((transform.translation - Vec3::new(0.0, -0.5, -0.25)).length() < 1e-5);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn air_assist_inactive_when_grounded_or_idle() {
        let config = LocomotionConfig::default();
        let mut transform = Transform::IDENTITY;

        let mut controller = LocomotionController::new();
        assert!(!controller.tick_fixed(DT, &mut transform, &config));

        controller.is_moving = true;
        controller.is_grounded = true;
        assert!(!controller.tick_fixed(DT, &mut transform, &config));
        assert_eq!(transform, Transform::IDENTITY);
    }

    // ==================== Root Motion Tests ====================

    #[test]
    fn root_motion_scales_horizontal_delta() {
        let config = LocomotionConfig::default().with_root_motion_speed(2.0);
        let mut controller = LocomotionController::new();
        let mut transform = Transform::IDENTITY;
        let sample = RootMotionSample::translation(Vec3::new(0.001, 0.0, -0.002));

        let velocity = controller.on_pose_computed(sample, DT, Vec3::ZERO, &mut transform, &config);

        let expected_step = Vec3::new(0.001, 0.0, -0.002) * DT;
        assert!((controller.root_motion_delta() - expected_step).length() < 1e-9);
        assert!((velocity - expected_step * 5000.0 * 2.0).length() < 1e-5);
    }

    #[test]
    fn root_motion_keeps_physics_vertical_velocity() {
        let config = LocomotionConfig::default();
        let mut controller = LocomotionController::new();
        let mut transform = Transform::IDENTITY;
        let sample = RootMotionSample::translation(Vec3::new(0.0, 5.0, 0.0));

        let velocity = controller.on_pose_computed(sample, DT, Vec3::new(3.0, -2.5, 1.0), &mut transform, &config);

        assert_eq!(velocity, Vec3::new(0.0, -2.5, 0.0));
        assert_eq!(controller.root_motion_delta().y, 0.0);
    }

    #[test]
    fn root_motion_applies_rotation_locally() {
        let config = LocomotionConfig::default();
        let mut controller = LocomotionController::new();
        let start = Quat::from_rotation_y(0.5);
        let mut transform = Transform::from_rotation(start);
        let delta = Quat::from_rotation_y(0.1);

        controller.on_pose_computed(RootMotionSample::new(Vec3::ZERO, delta), DT, Vec3::ZERO, &mut transform, &config);

        assert!(transform.rotation.angle_between(start * delta) < 1e-5);
    }
}
