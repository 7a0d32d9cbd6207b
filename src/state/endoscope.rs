//! Instrument state: tracked hand input, tool selection and the endoscope pose.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{finite_or, safe_normalize};

/// Normalized hand sample from the external tracker, one per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandPose {
    /// Palm position, each axis in [-1, 1]
    pub position: Vec3,
    /// Wrist roll (degrees)
    pub wrist_rotation_deg: f32,
    /// Thumb-index pinch strength in [0, 1]
    pub pinch_strength: f32,
}

impl Default for HandPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -1.0),
            wrist_rotation_deg: 0.0,
            pinch_strength: 0.0,
        }
    }
}

impl HandPose {
    pub fn new(position: Vec3, wrist_rotation_deg: f32, pinch_strength: f32) -> Self {
        Self {
            position,
            wrist_rotation_deg,
            pinch_strength,
        }
    }

    /// Clamp every field into range; non-finite values fall back to `previous`.
    pub fn sanitized(&self, previous: &HandPose) -> HandPose {
        let position = finite_or(self.position, previous.position).clamp(Vec3::NEG_ONE, Vec3::ONE);
        let wrist_rotation_deg = if self.wrist_rotation_deg.is_finite() {
            self.wrist_rotation_deg
        } else {
            previous.wrist_rotation_deg
        };
        let pinch_strength = if self.pinch_strength.is_finite() {
            self.pinch_strength.clamp(0.0, 1.0)
        } else {
            previous.pinch_strength
        };
        HandPose {
            position,
            wrist_rotation_deg,
            pinch_strength,
        }
    }

    /// Whether the grip exceeds `threshold`.
    pub fn is_pinching(&self, threshold: f32) -> bool {
        self.pinch_strength > threshold
    }
}

/// Wall-removal technique implied by the active instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Technique {
    /// Gentle dissection that peels the wall off the ICA
    Peeling,
    /// Aggressive en-bloc removal of the wall
    Resection,
}

/// Instruments the trainee can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolType {
    /// Endoscope alone, no working instrument
    #[default]
    Endoscope,
    /// Micro-Doppler probe for ICA localization
    Doppler,
    /// Blunt dissector (peeling technique)
    Dissector,
    /// Ring curette (resection technique)
    Curette,
    /// Suction cannula, clears blood from the field
    Suction,
}

impl ToolType {
    pub fn name(self) -> &'static str {
        match self {
            ToolType::Endoscope => "endoscope",
            ToolType::Doppler => "doppler",
            ToolType::Dissector => "dissector",
            ToolType::Curette => "curette",
            ToolType::Suction => "suction",
        }
    }

    pub fn technique(self) -> Option<Technique> {
        match self {
            ToolType::Dissector => Some(Technique::Peeling),
            ToolType::Curette => Some(Technique::Resection),
            _ => None,
        }
    }

    /// Tools that can remove medial wall tissue.
    pub fn is_wall_capable(self) -> bool {
        self.technique().is_some()
    }
}

/// Standard endoscope lens angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScopeAngle {
    #[default]
    Zero,
    Thirty,
    FortyFive,
    Seventy,
}

impl ScopeAngle {
    /// Snap a wrist rotation onto the nearest lens angle.
    ///
    /// The rotation is taken modulo 90 and bucketed at 15/37/57 degrees.
    pub fn from_wrist_rotation(rotation_deg: f32) -> Self {
        let r = if rotation_deg.is_finite() {
            rotation_deg.rem_euclid(90.0)
        } else {
            0.0
        };
        if r < 15.0 {
            ScopeAngle::Zero
        } else if r < 37.0 {
            ScopeAngle::Thirty
        } else if r < 57.0 {
            ScopeAngle::FortyFive
        } else {
            ScopeAngle::Seventy
        }
    }

    pub fn degrees(self) -> f32 {
        match self {
            ScopeAngle::Zero => 0.0,
            ScopeAngle::Thirty => 30.0,
            ScopeAngle::FortyFive => 45.0,
            ScopeAngle::Seventy => 70.0,
        }
    }

    pub fn is_angled(self) -> bool {
        self != ScopeAngle::Zero
    }
}

/// Pose of one instrument after kinematics and collision resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndoscopeState {
    /// Distal tip position (cm)
    pub tip_position: Vec3,
    /// Proximal handle position (cm), outside the nostril
    pub handle_position: Vec3,
    /// Insertion depth as percentage of the corridor length (0-100)
    pub insertion_depth: f32,
    /// Lens angle
    pub current_angle: ScopeAngle,
    /// Continuous roll (degrees)
    pub rotation_deg: f32,
    pub is_colliding: bool,
    /// Name of the structure in contact, if any
    pub colliding_structure: Option<String>,
}

impl Default for EndoscopeState {
    fn default() -> Self {
        Self {
            tip_position: Vec3::ZERO,
            handle_position: Vec3::ZERO,
            insertion_depth: 0.0,
            current_angle: ScopeAngle::Zero,
            rotation_deg: 0.0,
            is_colliding: false,
            colliding_structure: None,
        }
    }
}

/// Instantaneous tip movement between two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ToolVector {
    /// Unit direction of motion, zero when stationary
    pub direction: Vec3,
    /// Distance moved this tick (cm)
    pub magnitude_cm: f32,
    /// Vertical (y) component of the direction in [-1, 1]
    pub vertical: f32,
}

impl ToolVector {
    /// Movement from `previous` to `current`. A zero delta yields a zero vector.
    pub fn from_positions(previous: Vec3, current: Vec3) -> Self {
        let delta = current - previous;
        match safe_normalize(delta) {
            Some(direction) => Self {
                direction,
                magnitude_cm: delta.length(),
                vertical: direction.y,
            },
            None => Self::default(),
        }
    }
}
