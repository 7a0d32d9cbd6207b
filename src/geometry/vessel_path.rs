//! Internal carotid artery centre-line geometry.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which side of the sella a structure lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign of the x coordinate for this side.
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Ordered polyline approximating one ICA (cm, corridor coordinates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselPath {
    pub side: Side,
    pub points: Vec<Vec3>,
}

impl VesselPath {
    pub fn new(side: Side, points: Vec<Vec3>) -> Self {
        Self { side, points }
    }

    /// Cavernous ICA running lateral to the sella, curving up into the siphon.
    pub fn default_for(side: Side) -> Self {
        let s = side.sign();
        let points = [
            (2.30, -1.60, 7.20),
            (2.40, -0.80, 8.00),
            (2.45, 0.00, 8.60),
            (2.35, 0.80, 8.90),
            (2.10, 1.40, 8.60),
        ]
        .iter()
        .map(|&(x, y, z)| Vec3::new(s * x, y, z))
        .collect();
        Self::new(side, points)
    }

    /// Consecutive point pairs of the polyline.
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Total centre-line length (cm).
    pub fn length_cm(&self) -> f32 {
        self.segments().map(|(a, b)| a.distance(b)).sum()
    }
}
