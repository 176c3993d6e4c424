//! Scalar and vector stepping helpers used by the locomotion controller.
//!
//! All stepping functions are clamped: they never move past their target,
//! which is what keeps the smoothed input and speed free of overshoot.

use bevy::prelude::*;

/// Vectors shorter than this are treated as zero when measuring angles.
const ANGLE_EPSILON: f32 = 1e-15;

/// Move `current` toward `target` by at most `max_delta`.
///
/// Returns `target` exactly once it is within reach.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Move `current` toward `target` along the straight line between them,
/// covering at most `max_delta` distance.
#[inline]
pub fn move_towards_vec3(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let diff = target - current;
    let distance_sq = diff.length_squared();
    if distance_sq == 0.0 || (max_delta >= 0.0 && distance_sq <= max_delta * max_delta) {
        return target;
    }
    current + diff / distance_sq.sqrt() * max_delta
}

/// Wrap `value` into `[0, length)`.
#[inline]
pub fn repeat(value: f32, length: f32) -> f32 {
    (value - (value / length).floor() * length).clamp(0.0, length)
}

/// Interpolate between two angles in degrees along the shortest arc.
///
/// `t` is clamped to `[0, 1]`.
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let mut delta = repeat(to - from, 360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    from + delta * t.clamp(0.0, 1.0)
}

/// Unsigned angle between two vectors in degrees, `0` if either is zero.
pub fn angle_degrees(from: Vec3, to: Vec3) -> f32 {
    let denominator = (from.length_squared() * to.length_squared()).sqrt();
    if denominator < ANGLE_EPSILON {
        return 0.0;
    }
    let cos = (from.dot(to) / denominator).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Signed angle in degrees from `from` to `to`, measured counter-clockwise
/// around `axis` (right-handed). Range is `[-180, 180]`.
pub fn signed_angle_degrees(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let unsigned = angle_degrees(from, to);
    let sign = if axis.dot(from.cross(to)) < 0.0 { -1.0 } else { 1.0 };
    unsigned * sign
}
