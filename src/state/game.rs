//! Top-level simulation state.

use serde::{Deserialize, Serialize};

use super::{
    Complication, ComplicationKind, DopplerState, EndoscopeState, HandPose, LevelState,
    MedialWallState, ToolType, ToolVector, TumorScenario,
};
use crate::physics::DangerLevel;
use crate::surgery::SurgicalStep;

/// Everything the simulation knows about the procedure at one tick.
///
/// Owned by the simulation loop; presentation layers read clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Ticks processed since the level started
    pub tick: u64,
    /// Simulated time since the level started (s)
    pub elapsed_sec: f64,

    // === Instruments ===
    /// Endoscope pose (primary hand)
    pub endoscope: EndoscopeState,
    /// Working instrument pose in bimanual mode (second hand)
    pub instrument: Option<EndoscopeState>,
    pub active_tool: ToolType,
    /// Last sanitized primary hand sample
    pub hand: HandPose,
    /// Last sanitized second hand sample (bimanual mode)
    pub tool_hand: Option<HandPose>,
    /// Grip on the working instrument above threshold
    pub pinch_active: bool,
    /// Working tip movement since the previous tick
    pub tool_vector: ToolVector,

    // === Safety ===
    /// Distance from the working tip to the nearest ICA wall (cm)
    pub nearest_vessel_distance_cm: f32,
    pub danger_level: DangerLevel,
    pub doppler: DopplerState,

    // === Procedure ===
    pub wall: MedialWallState,
    /// Blood obscuring the field (0-100)
    pub blood_level: f32,
    pub step: SurgicalStep,
    pub scenario: TumorScenario,
    pub level: LevelState,
    /// Append-only for the session
    pub complications: Vec<Complication>,
    /// Estimated tumor removal (%), independent of the score
    pub extent_of_resection: f32,

    // === Edge detection for episodic events ===
    pub(crate) in_mucosal_contact: bool,
    pub(crate) in_critical_contact: bool,
    pub(crate) in_ica_contact: bool,
}

impl GameState {
    pub fn new(scenario: TumorScenario, level: LevelState) -> Self {
        Self {
            tick: 0,
            elapsed_sec: 0.0,
            endoscope: EndoscopeState::default(),
            instrument: None,
            active_tool: ToolType::default(),
            hand: HandPose::default(),
            tool_hand: None,
            pinch_active: false,
            tool_vector: ToolVector::default(),
            nearest_vessel_distance_cm: f32::MAX,
            danger_level: DangerLevel::Safe,
            doppler: DopplerState::default(),
            wall: MedialWallState::default(),
            blood_level: 0.0,
            step: SurgicalStep::Approach,
            scenario,
            level,
            complications: Vec::new(),
            extent_of_resection: 0.0,
            in_mucosal_contact: false,
            in_critical_contact: false,
            in_ica_contact: false,
        }
    }

    /// Tip that interacts with tissue: the working instrument in bimanual
    /// mode, otherwise the endoscope itself.
    pub fn working_tip(&self) -> &EndoscopeState {
        self.instrument.as_ref().unwrap_or(&self.endoscope)
    }

    pub fn is_bimanual(&self) -> bool {
        self.instrument.is_some()
    }

    pub fn has_complication(&self, kind: ComplicationKind) -> bool {
        self.complications.iter().any(|c| c.kind == kind)
    }

    /// Mark all unmanaged complications of `kind` as managed.
    pub fn manage_complications(&mut self, kind: ComplicationKind) -> usize {
        let mut count = 0;
        for c in self.complications.iter_mut().filter(|c| c.kind == kind && !c.managed) {
            c.managed = true;
            count += 1;
        }
        count
    }
}
