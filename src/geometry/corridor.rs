//! Nasal corridor volume.
//!
//! The corridor is an axis-aligned box in front of the nostril plane:
//! x spans the width and y the height, both centred on the pivot axis, and z
//! runs from the nostril (0) to the maximum insertion length.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Rectangular working volume of the instruments (cm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    /// Full lateral extent (cm)
    pub width_cm: f32,
    /// Full vertical extent (cm)
    pub height_cm: f32,
    /// Maximum insertion length from the nostril to the sella (cm)
    pub length_cm: f32,
}

impl Default for Corridor {
    fn default() -> Self {
        Self {
            width_cm: 4.0,
            height_cm: 4.0,
            length_cm: 10.0,
        }
    }
}

impl Corridor {
    /// Lower corner of the box.
    pub fn min(&self) -> Vec3 {
        Vec3::new(-self.width_cm.abs() * 0.5, -self.height_cm.abs() * 0.5, 0.0)
    }

    /// Upper corner of the box.
    pub fn max(&self) -> Vec3 {
        Vec3::new(
            self.width_cm.abs() * 0.5,
            self.height_cm.abs() * 0.5,
            self.length_cm.abs(),
        )
    }

    /// Clamp a point into the corridor, axis by axis.
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        super::clamp_to_box(p, self.min(), self.max())
    }

    /// Whether `p` lies inside the corridor (boundary inclusive).
    pub fn contains(&self, p: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        p.cmpge(min).all() && p.cmple(max).all()
    }

    /// Insertion depth of a point as a percentage of the corridor length.
    ///
    /// A zero-length corridor reports 0 rather than dividing by zero.
    pub fn depth_percent(&self, p: Vec3) -> f32 {
        let max_depth = self.length_cm.abs();
        if max_depth <= f32::EPSILON {
            return 0.0;
        }
        (p.z / max_depth * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_per_axis() {
        let corridor = Corridor::default();
        let p = corridor.clamp(Vec3::new(5.0, -0.5, 20.0));
        assert_eq!(p, Vec3::new(2.0, -0.5, 10.0));
        assert!(corridor.contains(p));
    }

    #[test]
    fn test_depth_percent() {
        let corridor = Corridor::default();
        assert!((corridor.depth_percent(Vec3::new(0.0, 0.0, 6.5)) - 65.0).abs() < 1e-4);
        assert_eq!(corridor.depth_percent(Vec3::new(0.0, 0.0, -1.0)), 0.0);
        assert_eq!(corridor.depth_percent(Vec3::new(0.0, 0.0, 11.0)), 100.0);
    }

    #[test]
    fn test_zero_length_corridor() {
        let corridor = Corridor {
            length_cm: 0.0,
            ..Default::default()
        };
        assert_eq!(corridor.depth_percent(Vec3::new(0.0, 0.0, 3.0)), 0.0);
    }
}
