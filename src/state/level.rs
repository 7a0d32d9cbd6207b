//! Level progress: objectives, metrics and complications.

use serde::{Deserialize, Serialize};

/// Quantity an objective measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveKind {
    /// Maximum insertion depth reached (%)
    ReachDepth,
    /// An angled lens was used at least once (0/1)
    UseAngledScope,
    /// Number of lens angle changes
    ScopeAngleChanges,
    /// Doppler probe used at the sella (0/1)
    LocalizeIca,
    /// Medial wall removed (%)
    ResectMedialWall,
}

/// One goal of a level with partial progress for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelObjective {
    pub id: String,
    pub description: String,
    pub kind: ObjectiveKind,
    pub target_value: f32,
    pub current_value: f32,
    /// Latches once the target is reached
    pub completed: bool,
}

impl LevelObjective {
    pub fn new(id: &str, description: &str, kind: ObjectiveKind, target_value: f32) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            kind,
            target_value,
            current_value: 0.0,
            completed: false,
        }
    }

    /// Update the measured value; completion is sticky.
    pub fn set_value(&mut self, value: f32) {
        if !value.is_finite() {
            return;
        }
        self.current_value = value;
        if value >= self.target_value {
            self.completed = true;
        }
    }

    /// Progress toward the target in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.completed || self.target_value <= 0.0 {
            return if self.completed { 1.0 } else { 0.0 };
        }
        (self.current_value / self.target_value).clamp(0.0, 1.0)
    }
}

/// Technique metrics accumulated over the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LevelMetrics {
    /// Distinct contact episodes with nasal mucosa
    pub mucosal_contacts: u32,
    /// Blood has obscured the field at some point
    pub blood_in_field: bool,
    pub scope_angle_changes: u32,
    pub doppler_used: bool,
    /// Deepest insertion reached (%)
    pub max_depth: f32,
    pub angled_scope_used: bool,
}

/// Progress of the active level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelState {
    pub level_id: u32,
    pub name: String,
    pub objectives: Vec<LevelObjective>,
    pub metrics: LevelMetrics,
    pub is_complete: bool,
    /// Latest computed score (0-100)
    pub score: u8,
}

impl LevelState {
    pub fn new(level_id: u32, name: &str, objectives: Vec<LevelObjective>) -> Self {
        Self {
            level_id,
            name: name.to_string(),
            objectives,
            metrics: LevelMetrics::default(),
            is_complete: false,
            score: 0,
        }
    }

    pub fn objective(&self, id: &str) -> Option<&LevelObjective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    /// Set an objective's measured value by id.
    ///
    /// Unknown ids are ignored; returns whether an objective was updated.
    pub fn set_objective_value(&mut self, id: &str, value: f32) -> bool {
        match self.objectives.iter_mut().find(|o| o.id == id) {
            Some(objective) => {
                objective.set_value(value);
                self.refresh_completion();
                true
            }
            None => {
                log::debug!("Ignoring progress for unknown objective '{}'", id);
                false
            }
        }
    }

    pub fn completed_count(&self) -> usize {
        self.objectives.iter().filter(|o| o.completed).count()
    }

    /// Completed objectives over total; 0 for a level without objectives.
    pub fn completion_ratio(&self) -> f32 {
        if self.objectives.is_empty() {
            return 0.0;
        }
        self.completed_count() as f32 / self.objectives.len() as f32
    }

    pub(crate) fn refresh_completion(&mut self) {
        self.is_complete = !self.objectives.is_empty() && self.objectives.iter().all(|o| o.completed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        }
    }
}

/// Intraoperative adverse events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplicationKind {
    /// Cutting instrument reached the carotid wall
    IcaInjury,
    /// Contact with an optic nerve or other critical structure
    CriticalStructureContact,
    /// Blood level saturated the field
    UncontrolledBleeding,
    /// Repeated mucosal contact beyond the level allowance
    MucosalTrauma,
}

impl ComplicationKind {
    pub fn id(self) -> &'static str {
        match self {
            ComplicationKind::IcaInjury => "ica_injury",
            ComplicationKind::CriticalStructureContact => "critical_structure_contact",
            ComplicationKind::UncontrolledBleeding => "uncontrolled_bleeding",
            ComplicationKind::MucosalTrauma => "mucosal_trauma",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            ComplicationKind::IcaInjury => Severity::Critical,
            ComplicationKind::CriticalStructureContact => Severity::Major,
            ComplicationKind::UncontrolledBleeding => Severity::Major,
            ComplicationKind::MucosalTrauma => Severity::Minor,
        }
    }
}

/// A recorded complication. Never removed during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complication {
    pub kind: ComplicationKind,
    pub severity: Severity,
    pub managed: bool,
    /// Simulated time of occurrence (s)
    pub time_sec: f64,
    /// Structure involved, when applicable
    pub structure: Option<String>,
}

impl Complication {
    pub fn new(kind: ComplicationKind, time_sec: f64) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            managed: false,
            time_sec,
            structure: None,
        }
    }

    pub fn with_structure(mut self, structure: &str) -> Self {
        self.structure = Some(structure.to_string());
        self
    }
}
