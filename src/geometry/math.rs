//! Vector helpers on top of `glam::Vec3`.
//!
//! glam covers add/scale/distance/lerp directly; the functions here add the
//! guarded variants the simulation needs so that degenerate input never
//! produces NaN.

use glam::Vec3;

/// Lengths below this are treated as zero (cm).
pub const GEOMETRY_EPSILON: f32 = 1e-6;

/// Normalize `v`, returning `None` for (near) zero-length vectors.
pub fn safe_normalize(v: Vec3) -> Option<Vec3> {
    let len = v.length();
    if len > GEOMETRY_EPSILON && len.is_finite() {
        Some(v / len)
    } else {
        None
    }
}

/// Normalize `v`, falling back to `fallback` for degenerate input.
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    safe_normalize(v).unwrap_or(fallback)
}

/// Per-axis clamp of `v` into the box `[min, max]`.
pub fn clamp_to_box(v: Vec3, min: Vec3, max: Vec3) -> Vec3 {
    v.clamp(min, max)
}

/// Linear interpolation between `a` and `b`, with `t` clamped to [0, 1].
pub fn lerp_clamped(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a.lerp(b, t.clamp(0.0, 1.0))
}

/// Replace non-finite components with the matching component of `fallback`.
pub fn finite_or(v: Vec3, fallback: Vec3) -> Vec3 {
    Vec3::new(
        if v.x.is_finite() { v.x } else { fallback.x },
        if v.y.is_finite() { v.y } else { fallback.y },
        if v.z.is_finite() { v.z } else { fallback.z },
    )
}

/// Closest point to `p` on the segment `a`–`b`.
///
/// The projection parameter is measured along the segment in world units and
/// clamped to `[0, segment_length]`. Returns `None` for zero-length segments.
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Option<Vec3> {
    let ab = b - a;
    let segment_length = ab.length();
    if segment_length < GEOMETRY_EPSILON {
        return None;
    }
    let dir = ab / segment_length;
    let t = (p - a).dot(dir).clamp(0.0, segment_length);
    Some(a + dir * t)
}
