//! Objectives, score and outcome estimates.
//!
//! Score composition (points out of 100, each term floored at 0):
//! ```text
//! score = 30 * objectives_completed / objectives
//!       + 30 * extent / 100
//!       + 20 * min(1, target_time / elapsed)
//!       - min(20, 10 * critical + 5 * major + 2 * minor)
//!       + (20 - technique deductions)
//! ```
//! clamped to [0, 100].
//!
//! Extent of resection is a separate estimate: a running score starting at
//! 100, reduced per complication by severity, scaled by the completed
//! objective fraction.

use serde::{Deserialize, Serialize};

use super::levels::LevelDefinition;
use crate::config::ScoringParameters;
use crate::geometry::Side;
use crate::state::{
    Complication, EndoscopeState, KnospGrade, LevelMetrics, LevelState, MedialWallState,
    ObjectiveKind, ScopeAngle, Severity, TumorScenario, TumorType,
};

/// A side counts as resected once its integrity falls to this value.
pub const WALL_RESECTED_INTEGRITY: f32 = 0.5;

/// Per-term view of a computed score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScoreBreakdown {
    pub objective_points: f32,
    pub extent_points: f32,
    pub time_points: f32,
    /// Subtracted from the total
    pub complication_penalty: f32,
    pub technique_points: f32,
    pub total: u8,
}

/// Observations from one tick that feed the level metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickObservation {
    pub previous_angle: ScopeAngle,
    pub angle: ScopeAngle,
    /// A new mucosal contact episode started this tick
    pub mucosal_contact_started: bool,
    /// Doppler probe active at sellar depth
    pub doppler_localized: bool,
    pub blood_level: f32,
}

/// Comparison of one trainee metric with an expert reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub metric: String,
    pub value: f64,
    pub expert_value: f64,
    pub lower_is_better: bool,
}

impl Benchmark {
    pub fn meets_expert(&self) -> bool {
        if self.lower_is_better {
            self.value <= self.expert_value
        } else {
            self.value >= self.expert_value
        }
    }
}

/// Expert mucosal contacts per level.
pub const EXPERT_MUCOSAL_CONTACTS: u32 = 1;
/// Expert extent of resection (%).
pub const EXPERT_EXTENT_PERCENT: f64 = 90.0;

/// Level scoring bound to one level definition.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    params: ScoringParameters,
    level: LevelDefinition,
}

impl ScoringEngine {
    pub fn new(params: ScoringParameters, level: LevelDefinition) -> Self {
        Self { params, level }
    }

    pub fn params(&self) -> &ScoringParameters {
        &self.params
    }

    pub fn level(&self) -> &LevelDefinition {
        &self.level
    }

    /// Fold one tick's observations into the level metrics.
    pub fn observe(&self, metrics: &mut LevelMetrics, observation: &TickObservation) {
        if observation.angle != observation.previous_angle {
            metrics.scope_angle_changes += 1;
        }
        if observation.mucosal_contact_started {
            metrics.mucosal_contacts += 1;
        }
        if observation.doppler_localized {
            metrics.doppler_used = true;
        }
        if observation.blood_level > self.params.blood_in_field_threshold {
            metrics.blood_in_field = true;
        }
    }

    /// Mucosal contacts beyond the level allowance.
    pub fn excess_contacts(&self, metrics: &LevelMetrics) -> u32 {
        metrics.mucosal_contacts.saturating_sub(self.level.allowed_mucosal_contacts)
    }

    /// Refresh metrics and objective progress from the current pose.
    pub fn update_objectives(
        &self,
        level: &LevelState,
        endoscope: &EndoscopeState,
        wall: &MedialWallState,
    ) -> LevelState {
        let mut next = level.clone();
        if endoscope.insertion_depth.is_finite() {
            next.metrics.max_depth = next.metrics.max_depth.max(endoscope.insertion_depth);
        }
        next.metrics.angled_scope_used |= endoscope.current_angle.is_angled();

        let metrics = next.metrics.clone();
        for objective in next.objectives.iter_mut() {
            let value = match objective.kind {
                ObjectiveKind::ReachDepth => metrics.max_depth,
                ObjectiveKind::UseAngledScope => flag(metrics.angled_scope_used),
                ObjectiveKind::ScopeAngleChanges => metrics.scope_angle_changes as f32,
                ObjectiveKind::LocalizeIca => flag(metrics.doppler_used),
                ObjectiveKind::ResectMedialWall => wall.resection_percent(),
            };
            objective.set_value(value);
        }
        next.refresh_completion();
        next
    }

    /// Time efficiency in [0, 1]; zero or invalid elapsed time counts as instant.
    pub fn time_efficiency(&self, elapsed_sec: f64) -> f32 {
        if !(elapsed_sec > 0.0) {
            return 1.0;
        }
        (self.level.target_time_sec / elapsed_sec).clamp(0.0, 1.0) as f32
    }

    pub fn complication_penalty(&self, complications: &[Complication]) -> f32 {
        let raw: f32 = complications
            .iter()
            .map(|c| match c.severity {
                Severity::Critical => self.params.critical_penalty,
                Severity::Major => self.params.major_penalty,
                Severity::Minor => self.params.minor_penalty,
            })
            .sum();
        raw.clamp(0.0, self.params.penalty_cap.max(0.0))
    }

    pub fn technique_points(&self, metrics: &LevelMetrics) -> f32 {
        let mut deductions = self.excess_contacts(metrics) as f32 * self.params.excess_contact_deduction;
        if metrics.blood_in_field {
            deductions += self.params.blood_in_field_deduction;
        }
        if self.level.requires_doppler && !metrics.doppler_used {
            deductions += self.params.missed_doppler_deduction;
        }
        (self.params.technique_bonus - deductions).max(0.0)
    }

    pub fn breakdown(
        &self,
        level: &LevelState,
        extent_of_resection: f32,
        complications: &[Complication],
        elapsed_sec: f64,
    ) -> ScoreBreakdown {
        let extent_ratio = if extent_of_resection.is_finite() {
            (extent_of_resection / 100.0).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let objective_points = (self.params.objective_weight * level.completion_ratio()).max(0.0);
        let extent_points = (self.params.extent_weight * extent_ratio).max(0.0);
        let time_points = (self.params.time_weight * self.time_efficiency(elapsed_sec)).max(0.0);
        let complication_penalty = self.complication_penalty(complications);
        let technique_points = self.technique_points(&level.metrics);

        let raw = objective_points + extent_points + time_points - complication_penalty + technique_points;
        let total = if raw.is_finite() { raw.round().clamp(0.0, 100.0) as u8 } else { 0 };

        ScoreBreakdown {
            objective_points,
            extent_points,
            time_points,
            complication_penalty,
            technique_points,
            total,
        }
    }

    /// Final score in [0, 100].
    pub fn compute_score(
        &self,
        level: &LevelState,
        extent_of_resection: f32,
        complications: &[Complication],
        elapsed_sec: f64,
    ) -> u8 {
        self.breakdown(level, extent_of_resection, complications, elapsed_sec).total
    }

    /// Running resection score reduced by complications, scaled by progress.
    pub fn extent_of_resection(&self, level: &LevelState, complications: &[Complication]) -> f32 {
        let loss: f32 = complications
            .iter()
            .map(|c| match c.severity {
                Severity::Critical => self.params.critical_extent_loss,
                Severity::Major => self.params.major_extent_loss,
                Severity::Minor => self.params.minor_extent_loss,
            })
            .sum();
        let running = (100.0 - loss).clamp(0.0, 100.0);
        (running * level.completion_ratio()).clamp(0.0, 100.0)
    }

    /// Trainee metrics against expert references.
    pub fn benchmarks(&self, level: &LevelState, extent_of_resection: f32, elapsed_sec: f64) -> Vec<Benchmark> {
        vec![
            Benchmark {
                metric: "time_sec".to_string(),
                value: elapsed_sec,
                expert_value: self.level.target_time_sec,
                lower_is_better: true,
            },
            Benchmark {
                metric: "mucosal_contacts".to_string(),
                value: level.metrics.mucosal_contacts as f64,
                expert_value: EXPERT_MUCOSAL_CONTACTS as f64,
                lower_is_better: true,
            },
            Benchmark {
                metric: "extent_of_resection".to_string(),
                value: extent_of_resection as f64,
                expert_value: EXPERT_EXTENT_PERCENT,
                lower_is_better: false,
            },
        ]
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Whether either medial wall has been substantially removed.
pub fn wall_resected(wall: &MedialWallState) -> bool {
    wall.integrity(Side::Left) <= WALL_RESECTED_INTEGRITY || wall.integrity(Side::Right) <= WALL_RESECTED_INTEGRITY
}

/// Estimated probability of endocrine remission (functioning adenomas) or
/// durable control (non-functioning).
///
/// Baseline falls with Knosp grade and is scaled by extent of resection.
/// Resecting the medial wall helps functioning adenomas most, since residual
/// cells in the wall keep hormone levels up.
pub fn remission_prediction(scenario: &TumorScenario, extent_of_resection: f32, wall: &MedialWallState) -> f32 {
    let baseline = match scenario.knosp_grade {
        KnospGrade::Grade0 => 0.90,
        KnospGrade::Grade1 => 0.85,
        KnospGrade::Grade2 => 0.75,
        KnospGrade::Grade3A => 0.55,
        KnospGrade::Grade3B => 0.35,
        KnospGrade::Grade4 => 0.15,
    };
    let extent = if extent_of_resection.is_finite() {
        (extent_of_resection / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let wall_bonus = match (scenario.tumor_type, wall_resected(wall)) {
        (TumorType::Functioning, true) => 0.15,
        (TumorType::Functioning, false) if scenario.knosp_grade.is_invasive() => -0.10,
        (TumorType::NonFunctioning, true) => 0.02,
        _ => 0.0,
    };
    (baseline * (0.5 + 0.5 * extent) + wall_bonus).clamp(0.0, 1.0)
}
