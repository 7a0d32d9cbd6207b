//! Parameter structures for the surgical simulation.
//!
//! Geometry is in corridor coordinates (cm). Rates that apply "per
//! interaction" are applied once per tick in which the tool touches the wall.

use std::path::Path;

use glam::Vec3;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::geometry::Corridor;

/// Read a parameter group from JSON, falling back to defaults.
fn load_json_or_default<T, P>(path: P, label: &str) -> T
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    match std::fs::read_to_string(path.as_ref()) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(params) => {
                log::info!("Loaded {} parameters from {:?}", label, path.as_ref());
                params
            }
            Err(e) => {
                log::warn!("Failed to parse {} parameters: {}, using defaults", label, e);
                T::default()
            }
        },
        Err(_) => {
            log::info!("{} parameters file not found, using defaults", label);
            T::default()
        }
    }
}

/// Top-level parameters container
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Parameters {
    /// Instrument lever model and corridor
    pub kinematics: KinematicsParameters,
    /// ICA proximity bands and Doppler signal
    pub vessel: VesselParameters,
    /// Medial wall resection and bleeding
    pub wall: WallParameters,
    /// Coaching rule thresholds
    pub rules: RuleParameters,
    /// Score weights and deductions
    pub scoring: ScoringParameters,
}

impl Parameters {
    /// Load parameters from `data/parameters`, or use defaults if files don't exist
    pub fn load_or_default() -> Self {
        Self::load_from_dir("data/parameters")
    }

    /// Load parameters from specific directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            kinematics: KinematicsParameters::load_or_default(dir.join("kinematics.json")),
            vessel: VesselParameters::load_or_default(dir.join("vessel.json")),
            wall: WallParameters::load_or_default(dir.join("wall.json")),
            rules: RuleParameters::load_or_default(dir.join("rules.json")),
            scoring: ScoringParameters::load_or_default(dir.join("scoring.json")),
        }
    }
}

/// Fulcrum kinematics of the instruments.
///
/// The hand position is mapped to a handle offset from the pivot, then
/// mirrored and amplified through the pivot by `leverage_ratio`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicsParameters {
    /// Tip travel per unit handle travel (> 1)
    pub leverage_ratio: f32,
    /// Moving-average window over handle samples
    pub smoothing_window: usize,
    /// Handle travel (cm) for a full [-1, 1] hand sweep on x/y, and for the
    /// full [-1, 1] insertion sweep on z
    pub handle_scale_cm: Vec3,
    /// Nostril pivot for the single-instrument configuration
    pub pivot_cm: Vec3,
    /// Left nostril pivot (bimanual)
    pub left_pivot_cm: Vec3,
    /// Right nostril pivot (bimanual)
    pub right_pivot_cm: Vec3,
    /// Working volume the tips are clamped into
    pub corridor: Corridor,
}

impl KinematicsParameters {
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "kinematics")
    }
}

impl Default for KinematicsParameters {
    fn default() -> Self {
        Self {
            leverage_ratio: 2.5,
            smoothing_window: 5,
            // 0.8 cm lateral handle travel -> 2.0 cm at the tip; 4 cm insertion -> 10 cm
            handle_scale_cm: Vec3::new(0.8, 0.8, 4.0),
            pivot_cm: Vec3::ZERO,
            left_pivot_cm: Vec3::new(-0.4, 0.0, 0.0),
            right_pivot_cm: Vec3::new(0.4, 0.0, 0.0),
            corridor: Corridor::default(),
        }
    }
}

/// ICA proximity classification and Doppler signal shaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselParameters {
    /// Physical ICA radius subtracted from centre-line distance (cm)
    pub vessel_radius_cm: f32,
    /// Below this distance: critical (cm)
    pub danger_radius_cm: f32,
    /// Below this distance: warning (cm)
    pub warning_radius_cm: f32,
    /// Below this distance: caution; at or above: safe (cm)
    pub safe_radius_cm: f32,
    /// Distance at which the Doppler signal vanishes (cm)
    pub doppler_max_range_cm: f32,
    /// Insertion depth (%) at which Doppler use counts as ICA localization
    pub doppler_min_depth_percent: f32,
    pub heart_rate_bpm: f32,
    /// Fraction of the signal modulated by the pulse (0 = steady)
    pub pulse_modulation_depth: f32,
    /// Minimum modulated strength that produces sound
    pub audio_threshold: f32,
    pub tone_base_hz: f32,
    /// Added to the base frequency at full strength
    pub tone_span_hz: f32,
}

impl VesselParameters {
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "vessel")
    }
}

impl Default for VesselParameters {
    fn default() -> Self {
        Self {
            vessel_radius_cm: 0.25,
            danger_radius_cm: 0.8,
            warning_radius_cm: 1.5,
            safe_radius_cm: 2.5,
            doppler_max_range_cm: 3.0,
            doppler_min_depth_percent: 60.0,
            heart_rate_bpm: 72.0,
            pulse_modulation_depth: 0.3,
            audio_threshold: 0.05,
            tone_base_hz: 300.0,
            tone_span_hz: 900.0,
        }
    }
}

/// Per-instrument effect of one wall interaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToolWallProfile {
    /// Integrity removed per interaction (> 0)
    pub removal_rate: f32,
    /// Probability that an interaction bleeds
    pub bleed_chance: f32,
    /// Blood level added by a bleed
    pub bleed_amount: f32,
}

/// Medial wall geometry and resection behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallParameters {
    pub left_center_cm: Vec3,
    pub right_center_cm: Vec3,
    /// Lateral reach of each wall around its centre (cm)
    pub interaction_radius_cm: f32,
    /// Offset above the wall centre where the superior zone starts (cm)
    pub superior_threshold_cm: f32,
    /// Offset below the wall centre where the inferior zone starts (cm, negative)
    pub inferior_threshold_cm: f32,
    /// Minimum insertion depth (%) for the wall to be reachable
    pub min_depth_percent: f32,
    /// Pinch strength above which the instrument is gripped
    pub pinch_threshold: f32,
    /// Dissector (peeling)
    pub peeling: ToolWallProfile,
    /// Curette (resection)
    pub resection: ToolWallProfile,
    /// Blood cleared per second of active suction
    pub suction_rate_per_sec: f32,
}

impl WallParameters {
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "wall")
    }
}

impl Default for WallParameters {
    fn default() -> Self {
        Self {
            left_center_cm: Vec3::new(-1.2, 0.0, 8.5),
            right_center_cm: Vec3::new(1.2, 0.0, 8.5),
            interaction_radius_cm: 0.5,
            superior_threshold_cm: 0.33,
            inferior_threshold_cm: -0.33,
            min_depth_percent: 70.0,
            pinch_threshold: 0.5,
            peeling: ToolWallProfile {
                removal_rate: 0.015,
                bleed_chance: 0.02,
                bleed_amount: 1.0,
            },
            resection: ToolWallProfile {
                removal_rate: 0.04,
                bleed_chance: 0.15,
                bleed_amount: 3.0,
            },
            suction_rate_per_sec: 25.0,
        }
    }
}

/// Thresholds for the coaching rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleParameters {
    /// Blood level above which the field is considered obscured
    pub blood_visibility_threshold: f32,
    /// Vertical tool-vector component below which dissection is heading inferiorly
    pub downward_vertical_threshold: f32,
    /// Ignore tool vectors shorter than this (cm per tick)
    pub min_vector_magnitude_cm: f32,
    /// Minimum simulated time between rule evaluations in a session (s)
    pub evaluation_interval_sec: f64,
}

impl RuleParameters {
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "rules")
    }
}

impl Default for RuleParameters {
    fn default() -> Self {
        Self {
            blood_visibility_threshold: 60.0,
            downward_vertical_threshold: -0.7,
            min_vector_magnitude_cm: 0.01,
            evaluation_interval_sec: 3.0,
        }
    }
}

/// Score composition. Weights are in score points out of 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringParameters {
    pub objective_weight: f32,
    pub extent_weight: f32,
    pub time_weight: f32,
    pub technique_bonus: f32,

    pub critical_penalty: f32,
    pub major_penalty: f32,
    pub minor_penalty: f32,
    /// Upper bound on the total complication penalty
    pub penalty_cap: f32,

    /// Technique deduction per mucosal contact above the level allowance
    pub excess_contact_deduction: f32,
    pub blood_in_field_deduction: f32,
    pub missed_doppler_deduction: f32,
    /// Blood level above which the blood-in-field metric latches
    pub blood_in_field_threshold: f32,

    /// Running resection score lost per complication, by severity
    pub critical_extent_loss: f32,
    pub major_extent_loss: f32,
    pub minor_extent_loss: f32,
}

impl ScoringParameters {
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path, "scoring")
    }
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self {
            objective_weight: 30.0,
            extent_weight: 30.0,
            time_weight: 20.0,
            technique_bonus: 20.0,

            critical_penalty: 10.0,
            major_penalty: 5.0,
            minor_penalty: 2.0,
            penalty_cap: 20.0,

            excess_contact_deduction: 2.0,
            blood_in_field_deduction: 5.0,
            missed_doppler_deduction: 10.0,
            blood_in_field_threshold: 30.0,

            critical_extent_loss: 30.0,
            major_extent_loss: 15.0,
            minor_extent_loss: 5.0,
        }
    }
}
