//! Movement input component.
//!
//! The host writes raw device state into [`MovementInput`] every frame; the
//! controller polls it once per variable-step tick.

use bevy::prelude::*;

/// Raw directional and jump input for a character.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_root_motion_controller::prelude::*;
///
/// let mut input = MovementInput::new();
/// input.set_direction(Vec2::new(0.0, 1.0));
/// input.set_jump_pressed(true);
///
/// // First poll sees the press, the second one sees it held.
/// assert!(input.poll().jump_requested);
/// assert!(!input.poll().jump_requested);
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MovementInput {
    /// Stick direction, each axis in `[-1, 1]`. `y` points forward.
    pub direction: Vec2,
    /// Whether the jump button is currently held.
    ///
    /// Set this every frame from any source (keyboard, gamepad, touch, AI).
    /// Only the transition from released to pressed requests a jump.
    pub jump_pressed: bool,
    /// Previous poll's jump state (for edge detection).
    pub(crate) jump_pressed_prev: bool,
}

impl MovementInput {
    /// Create a new empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stick direction, clamping each axis to `[-1, 1]`.
    pub fn set_direction(&mut self, direction: Vec2) {
        self.direction = direction.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Set the jump button state.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.jump_pressed = pressed;
    }

    /// Clear directional input.
    pub fn clear(&mut self) {
        self.direction = Vec2::ZERO;
    }

    /// Check if there is directional input.
    pub fn has_direction(&self) -> bool {
        self.direction.length_squared() > 1e-6
    }

    /// Read this frame's input and advance the jump edge detector.
    pub fn poll(&mut self) -> LocomotionInput {
        let jump_requested = self.jump_pressed && !self.jump_pressed_prev;
        self.jump_pressed_prev = self.jump_pressed;
        LocomotionInput {
            direction: self.direction,
            jump_requested,
        }
    }
}

/// One tick's worth of input, with the jump edge already resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionInput {
    /// Stick direction, `y` forward.
    pub direction: Vec2,
    /// `true` only on the tick the jump button went down.
    pub jump_requested: bool,
}

impl LocomotionInput {
    /// Input with only a stick direction.
    pub fn moving(direction: Vec2) -> Self {
        Self {
            direction,
            jump_requested: false,
        }
    }

    /// Input with a jump press and no stick direction.
    pub fn jump() -> Self {
        Self {
            direction: Vec2::ZERO,
            jump_requested: true,
        }
    }

    /// Stick direction mapped onto the world ground plane.
    ///
    /// Stick `y` maps to world `-Z`, Bevy's forward axis.
    #[inline]
    pub fn planar_direction(&self) -> Vec3 {
        Vec3::new(self.direction.x, 0.0, -self.direction.y)
    }
}
