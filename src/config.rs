//! Controller configuration component.
//!
//! Everything here is set when the character is spawned and is never mutated
//! by the controller itself.

use bevy::prelude::*;

use crate::error::LocomotionError;

/// Configuration parameters for the locomotion controller.
///
/// The first group of fields are the designer-facing knobs (root motion speed,
/// jump force, ground check shape, air influence). The second group are the
/// tuning constants of the smoothing, turn blending, jump and root motion
/// stages. Their defaults are tuned together and rarely need to
/// change, except `root_motion_velocity_scale` which must be calibrated
/// against the physics step rate and animation playback rate in use.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LocomotionConfig {
    // === Designer Settings ===
    /// Multiplier applied to the horizontal velocity derived from root motion.
    pub root_motion_speed: f32,

    /// Jump strength. The applied impulse is `jump_impulse_scale * jump_force`.
    pub jump_force: f32,

    /// Bitmask of collision layers that count as ground.
    pub ground_layers: u32,

    /// Half-width (x and z) of the ground check box.
    pub ground_check_radius: f32,

    /// Distance along the character's up axis from its origin to the center of
    /// the ground check box.
    pub ground_check_height_offset: f32,

    /// Half-height (y) of the ground check box.
    pub ground_check_size: f32,

    /// Forward drift speed while airborne is `air_influence / 2` units/second.
    pub air_influence: f32,

    // === Input Smoothing ===
    /// Max change per second of the smoothed movement direction.
    pub direction_rate: f32,

    /// Max change per second of the movement speed.
    pub speed_rate: f32,

    /// Movement speed reached with a unit-length input.
    pub speed_scale: f32,

    /// Speed above which the character counts as moving.
    pub moving_threshold: f32,

    // === Turn Blending ===
    /// Blend rate toward the desired turn while moving.
    pub moving_turn_rate: f32,

    /// Blend rate back to neutral while idle.
    pub idle_turn_rate: f32,

    // === Jump ===
    /// Scale between `jump_force` and the impulse handed to the physics engine.
    pub jump_impulse_scale: f32,

    /// Seconds the jump state lasts. Landing does not end it early.
    pub jump_cooldown: f32,

    // === Root Motion / Air ===
    /// Converts the per-step root motion translation into a velocity.
    pub root_motion_velocity_scale: f32,

    /// Extra downward translation per second applied while airborne and moving.
    pub air_sink_speed: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            // Designer settings
            root_motion_speed: 1.0,
            jump_force: 1.0,
            ground_layers: u32::MAX,
            ground_check_radius: 0.1,
            ground_check_height_offset: 0.1,
            ground_check_size: 0.5,
            air_influence: 0.5,

            // Input smoothing
            direction_rate: 8.0,
            speed_rate: 1.0,
            speed_scale: 1.4,
            moving_threshold: 0.01,

            // Turn blending
            moving_turn_rate: 2.0,
            idle_turn_rate: 8.0,

            // Jump
            jump_impulse_scale: 200.0,
            jump_cooldown: 0.3,

            // Root motion / air
            root_motion_velocity_scale: 5000.0,
            air_sink_speed: 1.0,
        }
    }
}

impl LocomotionConfig {
    /// Create a config optimized for responsive player control.
    pub fn player() -> Self {
        Self {
            jump_force: 1.5,
            air_influence: 1.0,
            ..default()
        }
    }

    /// Create a config with weak jumps and a lot of air drift.
    pub fn floaty() -> Self {
        Self {
            jump_force: 0.8,
            air_influence: 2.0,
            air_sink_speed: 0.25,
            ..default()
        }
    }

    /// Half extents of the ground check box.
    #[inline]
    pub fn ground_check_half_extents(&self) -> Vec3 {
        Vec3::new(
            self.ground_check_radius,
            self.ground_check_size,
            self.ground_check_radius,
        )
    }

    /// Magnitude of the impulse applied when a jump starts.
    #[inline]
    pub fn jump_impulse(&self) -> f32 {
        self.jump_impulse_scale * self.jump_force
    }

    /// Builder: set root motion speed multiplier.
    pub fn with_root_motion_speed(mut self, speed: f32) -> Self {
        self.root_motion_speed = speed;
        self
    }

    /// Builder: set jump force.
    pub fn with_jump_force(mut self, force: f32) -> Self {
        self.jump_force = force;
        self
    }

    /// Builder: set the ground layer mask.
    pub fn with_ground_layers(mut self, layers: u32) -> Self {
        self.ground_layers = layers;
        self
    }

    /// Builder: set the ground check box (half-width, height offset, half-height).
    pub fn with_ground_check(mut self, radius: f32, height_offset: f32, size: f32) -> Self {
        self.ground_check_radius = radius;
        self.ground_check_height_offset = height_offset;
        self.ground_check_size = size;
        self
    }

    /// Builder: set air influence.
    pub fn with_air_influence(mut self, influence: f32) -> Self {
        self.air_influence = influence;
        self
    }

    /// Builder: set the jump cooldown.
    pub fn with_jump_cooldown(mut self, seconds: f32) -> Self {
        self.jump_cooldown = seconds;
        self
    }

    /// Builder: set the root motion velocity calibration scale.
    pub fn with_root_motion_velocity_scale(mut self, scale: f32) -> Self {
        self.root_motion_velocity_scale = scale;
        self
    }

    /// Builder: set the terminal movement speed for unit input.
    pub fn with_speed_scale(mut self, scale: f32) -> Self {
        self.speed_scale = scale;
        self
    }

    /// Check that every tuning value is usable.
    ///
    /// All values must be finite and non-negative, and the jump cooldown must
    /// be positive.
    pub fn validate(&self) -> Result<(), LocomotionError> {
        let fields = [
            ("root_motion_speed", self.root_motion_speed),
            ("jump_force", self.jump_force),
            ("ground_check_radius", self.ground_check_radius),
            ("ground_check_height_offset", self.ground_check_height_offset),
            ("ground_check_size", self.ground_check_size),
            ("air_influence", self.air_influence),
            ("direction_rate", self.direction_rate),
            ("speed_rate", self.speed_rate),
            ("speed_scale", self.speed_scale),
            ("moving_threshold", self.moving_threshold),
            ("moving_turn_rate", self.moving_turn_rate),
            ("idle_turn_rate", self.idle_turn_rate),
            ("jump_impulse_scale", self.jump_impulse_scale),
            ("jump_cooldown", self.jump_cooldown),
            ("root_motion_velocity_scale", self.root_motion_velocity_scale),
            ("air_sink_speed", self.air_sink_speed),
        ];

        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(LocomotionError::InvalidConfig { field, value });
            }
        }

        if self.jump_cooldown == 0.0 {
            return Err(LocomotionError::InvalidConfig {
                field: "jump_cooldown",
                value: self.jump_cooldown,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = LocomotionConfig::default();
        assert_eq!(config.speed_scale, 1.4);
        assert_eq!(config.jump_cooldown, 0.3);
        assert_eq!(config.jump_impulse_scale, 200.0);
        assert_eq!(config.root_motion_velocity_scale, 5000.0);
        assert_eq!(config.ground_layers, u32::MAX);
    }

    #[test]
    fn config_default_is_valid() {
        assert!(LocomotionConfig::default().validate().is_ok());
        assert!(LocomotionConfig::player().validate().is_ok());
        assert!(LocomotionConfig::floaty().validate().is_ok());
    }

    #[test]
    fn config_ground_check_half_extents() {
        let config = LocomotionConfig::default().with_ground_check(0.2, 0.1, 0.4);
        assert_eq!(config.ground_check_half_extents(), Vec3::new(0.2, 0.4, 0.2));
    }

    #[test]
    fn config_jump_impulse() {
        let config = LocomotionConfig::default().with_jump_force(2.5);
        assert_eq!(config.jump_impulse(), 500.0);
    }

    #[test]
    fn config_rejects_negative_values() {
        let config = LocomotionConfig::default().with_air_influence(-1.0);
        match config.validate() {
            Err(LocomotionError::InvalidConfig { field, value }) => {
                assert_eq!(field, "air_influence");
                assert_eq!(value, -1.0);
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn config_rejects_non_finite_values() {
        let config = LocomotionConfig::default().with_root_motion_speed(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_zero_cooldown() {
        let config = LocomotionConfig::default().with_jump_cooldown(0.0);
        assert!(matches!(
            config.validate(),
            Err(LocomotionError::InvalidConfig {
                field: "jump_cooldown",
                ..
            })
        ));
    }
}
