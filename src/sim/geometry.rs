//! Geometry primitives for the normalized playfield
//!
//! Both axes run over [0, 1]; y grows downward.

use glam::Vec2;

use crate::consts::{FIELD_MAX, FIELD_MIN};

/// Two circles overlap iff the distance between centers is below `radius`
/// (the already-summed and scaled collision radius)
#[inline]
pub fn collides(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance(b) < radius
}

/// Clamp a coordinate to the playfield
#[inline]
pub fn clamp_to_field(v: f32) -> f32 {
    v.clamp(FIELD_MIN, FIELD_MAX)
}

#[inline]
pub fn in_field(v: f32) -> bool {
    (FIELD_MIN..=FIELD_MAX).contains(&v)
}
