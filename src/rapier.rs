//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::backend::LocomotionPhysicsBackend;
use crate::config::LocomotionConfig;
use crate::controller::LocomotionController;
use crate::detection::{GroundProbe, GroundSensor};
use crate::LocomotionSet;

/// Rapier3D physics backend for the locomotion controller.
///
/// This backend uses `bevy_rapier3d` for velocity manipulation and impulses.
/// Ground sensing is handled by a dedicated Rapier system that receives
/// `RapierContext` as a system parameter.
///
/// Run Rapier in the fixed schedule
/// (`RapierPhysicsPlugin::default().in_fixed_schedule()`) so the physics step
/// integrates the velocity written by root motion in the same fixed step.
pub struct Rapier3dBackend;

impl LocomotionPhysicsBackend for Rapier3dBackend {
    type BodyComponent = RigidBody;

    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3) {
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.impulse += impulse;
        } else if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            // Rapier divides by the body's mass when it consumes the impulse
            entity_mut.insert(ExternalImpulse {
                impulse,
                ..default()
            });
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the locomotion controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            rapier_ground_sensor.in_set(LocomotionSet::Sensors),
        );
    }
}

/// Convert a layer bitmask into a Rapier query filter group.
fn ground_collision_groups(layers: u32) -> CollisionGroups {
    CollisionGroups::new(Group::ALL, Group::from_bits_truncate(layers))
}

/// Count the colliders overlapping a ground probe.
///
/// The querying body and sensor colliders are ignored.
fn rapier_overlap_count(context: &RapierContext, probe: &GroundProbe, exclude_entity: Entity) -> usize {
    let shape = Collider::cuboid(probe.half_extents.x, probe.half_extents.y, probe.half_extents.z);

    let filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_sensors()
        .groups(ground_collision_groups(probe.layers));

    let mut hits = 0;
    context.intersections_with_shape(probe.center, probe.rotation, &shape, filter, |_| {
        hits += 1;
        true
    });
    hits
}

/// Rapier-specific ground sensor system using a box overlap query.
///
/// The box is placed `ground_check_height_offset` above the character's
/// origin along its up axis and rotated with the character. Only colliders
/// whose collision group memberships intersect `ground_layers` are counted.
fn rapier_ground_sensor(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<
        (Entity, &Transform, &LocomotionConfig, &mut GroundSensor),
        With<LocomotionController>,
    >,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, config, mut sensor) in &mut q_controllers {
        let probe = GroundProbe::from_transform(transform, config);
        sensor.record(rapier_overlap_count(&context, &probe, entity));
    }
}

/// Bundle for creating a character with Rapier3D physics.
///
/// This bundle provides the Rapier3D components a locomotion controller
/// entity needs: a dynamic rigid body, velocity tracking for root motion, an
/// external impulse for jumps, and axis locking.
///
/// Rotation is locked by default because root motion rotates the transform
/// directly; the physics engine only owns translation.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_root_motion_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 1.0, 0.0),
///         // Controller and animation binding
///         LocomotionController::new(),
///         LocomotionConfig::player(),
///         AnimatorParameters::default(),
///         RootMotionDelta::default(),
///         // Physics bundle
///         Rapier3dLocomotionBundle::new(),
///         Collider::capsule_y(0.5, 0.3),
///     ));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `velocity`: Zero velocity
/// - `external_impulse`: Zero impulse (used for jump impulses)
/// - `locked_axes`: [`LockedAxes::ROTATION_LOCKED`]
/// - `damping`: Linear 0.0, Angular 1.0 (root motion owns horizontal speed)
#[derive(Bundle)]
pub struct Rapier3dLocomotionBundle {
    /// The rigid body type. Should typically be [`RigidBody::Dynamic`] for characters.
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity. Overwritten by root motion each physics step.
    pub velocity: Velocity,
    /// Accumulated impulses applied this frame. Used for jumps.
    pub external_impulse: ExternalImpulse,
    /// Which axes are locked.
    pub locked_axes: LockedAxes,
    /// Damping coefficients for velocity reduction.
    pub damping: Damping,
}

impl Default for Rapier3dLocomotionBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dLocomotionBundle {
    /// Create a new character bundle with rotation locked.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_impulse: ExternalImpulse::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 1.0,
            },
        }
    }

    /// Set the rigid body type for the character.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // A character that senses ground but is never pushed by collisions
    /// let bundle = Rapier3dLocomotionBundle::new()
    ///     .with_body(RigidBody::KinematicPositionBased);
    /// ```
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set the damping coefficients for velocity reduction.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }

    /// Set which axes should be locked for the rigid body.
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(TransformPlugin);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app
    }

    #[test]
    fn ground_collision_groups_filter_on_layers() {
        let groups = ground_collision_groups(0b0101);
        assert_eq!(groups.memberships, Group::ALL);
        assert_eq!(groups.filters, Group::GROUP_1 | Group::GROUP_3);
    }

    #[test]
    fn rapier_backend_velocity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                RigidBody::Dynamic,
                Velocity::linear(Vec3::new(5.0, 3.0, -1.0)),
                GravityScale(0.0),
            ))
            .id();

        app.update();

        let vel = Rapier3dBackend::get_velocity(app.world(), entity);
        assert!((vel - Vec3::new(5.0, 3.0, -1.0)).length() < 0.01);

        Rapier3dBackend::set_velocity(app.world_mut(), entity, Vec3::new(10.0, 0.0, 0.0));

        let vel = Rapier3dBackend::get_velocity(app.world(), entity);
        assert!((vel - Vec3::new(10.0, 0.0, 0.0)).length() < 0.01);
    }

    #[test]
    fn rapier_backend_impulse_accumulates() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((Transform::default(), Rapier3dLocomotionBundle::new()))
            .id();

        Rapier3dBackend::apply_impulse(app.world_mut(), entity, Vec3::Y * 100.0);
        Rapier3dBackend::apply_impulse(app.world_mut(), entity, Vec3::Y * 50.0);

        let impulse = app.world().get::<ExternalImpulse>(entity).unwrap();
        assert_eq!(impulse.impulse, Vec3::Y * 150.0);
    }

    #[test]
    fn rapier_backend_impulse_inserted_when_missing() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((Transform::default(), RigidBody::Dynamic, Velocity::default()))
            .id();

        Rapier3dBackend::apply_impulse(app.world_mut(), entity, Vec3::Y * 200.0);

        // Velocity is left to Rapier, which scales the impulse by mass
        assert_eq!(Rapier3dBackend::get_velocity(app.world(), entity), Vec3::ZERO);
        let impulse = app.world().get::<ExternalImpulse>(entity).unwrap();
        assert_eq!(impulse.impulse, Vec3::Y * 200.0);
    }

    #[test]
    fn rapier_backend_impulse_respects_mass() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                RigidBody::Dynamic,
                Velocity::default(),
                Collider::ball(0.5),
                ColliderMassProperties::Mass(50.0),
                GravityScale(0.0),
            ))
            .id();

        app.update();
        Rapier3dBackend::apply_impulse(app.world_mut(), entity, Vec3::Y * 200.0);
        app.update();

        // 200 N·s on a 50 kg body is 4 m/s, not 200 m/s
        let vel = Rapier3dBackend::get_velocity(app.world(), entity);
        assert!((vel.y - 4.0).abs() < 0.1, "velocity after impulse: {vel:?}");
    }

    #[test]
    fn rapier_locomotion_bundle_creates_valid_entity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                Rapier3dLocomotionBundle::new(),
                Collider::capsule_y(0.5, 0.3),
            ))
            .id();

        app.update();

        assert!(app.world().get::<RigidBody>(entity).is_some());
        assert!(app.world().get::<Velocity>(entity).is_some());
        assert!(app.world().get::<ExternalImpulse>(entity).is_some());
        assert_eq!(
            app.world().get::<LockedAxes>(entity).copied(),
            Some(LockedAxes::ROTATION_LOCKED)
        );
    }
}
