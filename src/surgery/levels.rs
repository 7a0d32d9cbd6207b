//! Built-in training levels.

use serde::{Deserialize, Serialize};

use crate::state::{LevelObjective, LevelState, ObjectiveKind};

/// Static description of a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub level_id: u32,
    pub name: String,
    pub objectives: Vec<LevelObjective>,
    /// Expert completion time used for time efficiency (s)
    pub target_time_sec: f64,
    /// Doppler localization is mandatory before the wall is touched
    pub requires_doppler: bool,
    /// Mucosal contacts tolerated before technique deductions
    pub allowed_mucosal_contacts: u32,
}

impl LevelDefinition {
    /// Level 1: navigate the nasal corridor to the sella.
    pub fn nasal_navigation() -> Self {
        Self {
            level_id: 1,
            name: "Nasal Navigation".to_string(),
            objectives: vec![
                LevelObjective::new("reach_sella", "Advance the scope to the sella floor", ObjectiveKind::ReachDepth, 80.0),
                LevelObjective::new("use_angled_scope", "Inspect with an angled lens", ObjectiveKind::UseAngledScope, 1.0),
                LevelObjective::new("change_scope_angle", "Switch lens angle twice", ObjectiveKind::ScopeAngleChanges, 2.0),
            ],
            target_time_sec: 120.0,
            requires_doppler: false,
            allowed_mucosal_contacts: 3,
        }
    }

    /// Level 2: Doppler localization and medial wall resection.
    pub fn medial_wall() -> Self {
        Self {
            level_id: 2,
            name: "Medial Wall Resection".to_string(),
            objectives: vec![
                LevelObjective::new("localize_ica", "Localize both ICAs with the Doppler", ObjectiveKind::LocalizeIca, 1.0),
                LevelObjective::new("reach_sella", "Reach the sella", ObjectiveKind::ReachDepth, 80.0),
                LevelObjective::new("resect_medial_wall", "Resect the medial wall", ObjectiveKind::ResectMedialWall, 30.0),
            ],
            target_time_sec: 300.0,
            requires_doppler: true,
            allowed_mucosal_contacts: 5,
        }
    }

    pub fn all() -> Vec<LevelDefinition> {
        vec![Self::nasal_navigation(), Self::medial_wall()]
    }

    pub fn by_id(level_id: u32) -> Option<LevelDefinition> {
        Self::all().into_iter().find(|l| l.level_id == level_id)
    }

    /// Fresh progress state for this level.
    pub fn into_state(self) -> LevelState {
        LevelState::new(self.level_id, &self.name, self.objectives)
    }

    pub fn to_state(&self) -> LevelState {
        self.clone().into_state()
    }
}

impl Default for LevelDefinition {
    fn default() -> Self {
        Self::medial_wall()
    }
}
