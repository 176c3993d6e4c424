//! Ground detection structures.
//!
//! The physics backend runs a box overlap query described by [`GroundProbe`]
//! once per frame and stores the hit count in [`GroundSensor`]. The controller
//! turns that count into its grounded state.

use bevy::prelude::*;

use crate::config::LocomotionConfig;

/// Box overlap query used to sense ground beneath a character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbe {
    /// Box center in world space.
    pub center: Vec3,
    /// Box half extents in the box's local frame.
    pub half_extents: Vec3,
    /// Box orientation (the character's orientation).
    pub rotation: Quat,
    /// Collision layers that count as ground.
    pub layers: u32,
}

impl GroundProbe {
    /// Build the probe for a character at `transform`.
    ///
    /// The box sits `ground_check_height_offset` above the character's origin
    /// along its own up axis and shares its rotation.
    pub fn from_transform(transform: &Transform, config: &LocomotionConfig) -> Self {
        Self {
            center: transform.translation + *transform.up() * config.ground_check_height_offset,
            half_extents: config.ground_check_half_extents(),
            rotation: transform.rotation,
            layers: config.ground_layers,
        }
    }

    /// Check whether a collider on `memberships` layers passes the layer filter.
    #[inline]
    pub fn accepts(&self, memberships: u32) -> bool {
        self.layers & memberships != 0
    }
}

/// Result of the most recent ground overlap query.
///
/// Written by the physics backend's sensor system, read by the controller.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct GroundSensor {
    hits: usize,
}

impl GroundSensor {
    /// Sensor reporting `hits` overlapping ground colliders.
    pub fn with_hits(hits: usize) -> Self {
        Self { hits }
    }

    /// Store the hit count of a new query.
    pub fn record(&mut self, hits: usize) {
        self.hits = hits;
    }

    /// Number of ground colliders overlapping the probe.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Check if any ground collider overlaps the probe.
    pub fn touching_ground(&self) -> bool {
        self.hits > 0
    }
}
