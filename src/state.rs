//! State marker components.
//!
//! These components mirror the current state of a locomotion controller so
//! other systems can filter on it with `With<..>` instead of reading the
//! controller. They are added and removed automatically at the end of each
//! variable-step frame.

use bevy::prelude::*;

/// Marker component indicating the character is grounded.
///
/// Mutually exclusive with both [`Airborne`] and [`Jumping`].
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_root_motion_controller::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn count_grounded(q: Query<(), With<Grounded>>) -> usize {
///     q.iter().count()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is not grounded.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component present while the jump state is active.
///
/// Present for the full jump cooldown, even after landing.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Jumping;

/// Marker component indicating the smoothed movement speed is above the
/// moving threshold.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Moving;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_default() {
        // Marker components, just verify they can be created
        let _ = Grounded::default();
        let _ = Airborne::default();
        let _ = Jumping::default();
        let _ = Moving::default();
    }
}
