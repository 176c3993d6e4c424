//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement to
//! work with the locomotion controller. This allows swapping physics engines
//! (Rapier3D, Avian, a custom integrator) without touching the controller.

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// The backend provides velocity reads and writes, impulses and the fixed
/// timestep. Ground sensing is provided by the backend's plugin: it must add
/// a system in [`LocomotionSet::Sensors`](crate::LocomotionSet::Sensors) that
/// runs the overlap query described by
/// [`GroundProbe`](crate::detection::GroundProbe) and records the hit count in
/// each character's [`GroundSensor`](crate::detection::GroundSensor).
///
/// For an example implementation, see the `rapier` module's
/// `Rapier3dBackend`.
pub trait LocomotionPhysicsBackend: 'static + Send + Sync {
    /// Component whose presence marks an entity as having a rigid body.
    ///
    /// Checked once when a controller is added; a character without it does
    /// not start.
    type BodyComponent: Component;

    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Overwrite the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Apply an impulse to an entity.
    ///
    /// Impulse is an instantaneous change in momentum.
    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 64.0)
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
