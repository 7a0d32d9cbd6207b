//! Surgical phase derivation.
//!
//! The phase is never stored as a transition history. It is recomputed from
//! the current depth, Doppler usage and wall state every tick, so adjacent
//! phases may alternate across a tick boundary when a value sits on a
//! threshold.

use serde::{Deserialize, Serialize};

use crate::state::MedialWallState;

/// Depth below which the scope is still in the nasal approach (%).
pub const APPROACH_DEPTH_PERCENT: f32 = 60.0;
/// Depth at which the sella floor is reached (%).
pub const SELLA_DEPTH_PERCENT: f32 = 80.0;
/// Minimum depth for dural incision (%).
pub const INCISION_DEPTH_PERCENT: f32 = 70.0;
/// Both walls above this integrity count as intact.
pub const INTACT_WALL_INTEGRITY: f32 = 0.9;
/// Resection extent at which closure begins (%).
pub const CLOSURE_EXTENT_PERCENT: f32 = 90.0;

/// Stage of the procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SurgicalStep {
    #[default]
    Approach,
    Doppler,
    Incision,
    Resection,
    /// Reported only; never derived from motion
    Hemostasis,
    Closure,
}

impl SurgicalStep {
    pub fn as_str(self) -> &'static str {
        match self {
            SurgicalStep::Approach => "approach",
            SurgicalStep::Doppler => "doppler",
            SurgicalStep::Incision => "incision",
            SurgicalStep::Resection => "resection",
            SurgicalStep::Hemostasis => "hemostasis",
            SurgicalStep::Closure => "closure",
        }
    }
}

/// Derive the phase; predicates are checked in order and the first match wins.
///
/// 1. depth < 60 → Approach
/// 2. 60 ≤ depth < 80 without Doppler → Doppler
/// 3. Doppler used, depth ≥ 70, both walls > 0.9 → Incision
/// 4. extent defined and < 100 → Resection
/// 5. extent ≥ 90 → Closure
/// 6. otherwise → Approach
pub fn derive_phase(
    depth_percent: f32,
    doppler_used: bool,
    wall: &MedialWallState,
    resection_extent: Option<f32>,
) -> SurgicalStep {
    if depth_percent < APPROACH_DEPTH_PERCENT {
        return SurgicalStep::Approach;
    }
    if depth_percent < SELLA_DEPTH_PERCENT && !doppler_used {
        return SurgicalStep::Doppler;
    }
    if doppler_used && depth_percent >= INCISION_DEPTH_PERCENT && wall.is_intact(INTACT_WALL_INTEGRITY) {
        return SurgicalStep::Incision;
    }
    match resection_extent {
        Some(extent) if extent < 100.0 => SurgicalStep::Resection,
        Some(extent) if extent >= CLOSURE_EXTENT_PERCENT => SurgicalStep::Closure,
        _ => SurgicalStep::Approach,
    }
}
