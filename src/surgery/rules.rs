//! Safety and strategy rules.
//!
//! Rules are checked in a fixed order and the first match is returned, so at
//! most one coaching trigger is produced per evaluation. The engine keeps no
//! state: rate limiting and "fire once" bookkeeping belong to the session.
//!
//! Order:
//! 1. `doppler_dogma` - incision phase without prior Doppler use
//! 2. `ica_contact` - working tip on the vessel wall
//! 3. `inferior_trajectory` - steep downward motion while resecting
//! 4. strategy fit (once per session) - technique vs tumor type
//! 5. `blood_field` - field obscured by blood
//! 6. `ica_proximity` - working tip in the warning band
//! 7. `doppler_reminder` - at the sella without the probe

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::coaching::fallback_message;
use super::SurgicalStep;
use crate::config::RuleParameters;
use crate::physics::DangerLevel;
use crate::state::{GameState, Technique, ToolType, ToolVector, TumorScenario, TumorType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleSeverity {
    Info,
    Success,
    Warning,
    Critical,
}

impl RuleSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleSeverity::Info => "info",
            RuleSeverity::Success => "success",
            RuleSeverity::Warning => "warning",
            RuleSeverity::Critical => "critical",
        }
    }
}

/// Coaching trigger emitted by a matching rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub message: String,
    pub severity: RuleSeverity,
}

impl RuleResult {
    /// Result carrying the canned message for `rule_id`.
    pub fn new(rule_id: &str, severity: RuleSeverity) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            message: fallback_message(rule_id).to_string(),
            severity,
        }
    }
}

/// Read-only view of the state the rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleSnapshot {
    pub step: SurgicalStep,
    pub depth_percent: f32,
    pub doppler_used: bool,
    pub active_tool: ToolType,
    pub technique: Option<Technique>,
    pub tool_vector: ToolVector,
    pub blood_level: f32,
    pub nearest_vessel_distance_cm: f32,
    pub danger_level: DangerLevel,
}

impl RuleSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            step: state.step,
            depth_percent: state.working_tip().insertion_depth,
            doppler_used: state.level.metrics.doppler_used,
            active_tool: state.active_tool,
            technique: state.wall.technique,
            tool_vector: state.tool_vector,
            blood_level: state.blood_level,
            nearest_vessel_distance_cm: state.nearest_vessel_distance_cm,
            danger_level: state.danger_level,
        }
    }
}

/// Rules that should only trigger once per session.
pub const ONCE_RULES: [&str; 4] = [
    "fa_resection_congruent",
    "fa_peeling_mismatch",
    "nfa_peeling_congruent",
    "nfa_resection_mismatch",
];

/// Ordered rule list over a [`RuleSnapshot`].
#[derive(Debug, Clone)]
pub struct RuleEngine {
    params: RuleParameters,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RuleParameters::default())
    }
}

impl RuleEngine {
    pub fn new(params: RuleParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RuleParameters {
        &self.params
    }

    /// First matching rule, treating every rule as eligible.
    pub fn evaluate(&self, snapshot: &RuleSnapshot, scenario: Option<&TumorScenario>) -> Option<RuleResult> {
        self.evaluate_with_history(snapshot, scenario, &HashSet::new())
    }

    /// First matching rule, skipping once-only rules whose ids are in `fired`.
    pub fn evaluate_with_history(
        &self,
        snapshot: &RuleSnapshot,
        scenario: Option<&TumorScenario>,
        fired: &HashSet<String>,
    ) -> Option<RuleResult> {
        if snapshot.step == SurgicalStep::Incision && !snapshot.doppler_used {
            return Some(RuleResult::new("doppler_dogma", RuleSeverity::Critical));
        }

        if snapshot.nearest_vessel_distance_cm <= 0.0 {
            return Some(RuleResult::new("ica_contact", RuleSeverity::Critical));
        }

        if snapshot.step == SurgicalStep::Resection
            && snapshot.tool_vector.magnitude_cm >= self.params.min_vector_magnitude_cm
            && snapshot.tool_vector.vertical < self.params.downward_vertical_threshold
        {
            return Some(RuleResult::new("inferior_trajectory", RuleSeverity::Warning));
        }

        if let Some(result) = self.strategy_fit(snapshot, scenario) {
            if !fired.contains(&result.rule_id) {
                return Some(result);
            }
        }

        if snapshot.blood_level > self.params.blood_visibility_threshold {
            return Some(RuleResult::new("blood_field", RuleSeverity::Critical));
        }

        if snapshot.danger_level >= DangerLevel::Warning {
            return Some(RuleResult::new("ica_proximity", RuleSeverity::Warning));
        }

        if snapshot.step == SurgicalStep::Doppler && snapshot.active_tool != ToolType::Doppler {
            return Some(RuleResult::new("doppler_reminder", RuleSeverity::Info));
        }

        None
    }

    /// Congruence of the technique in use with the tumor type.
    fn strategy_fit(&self, snapshot: &RuleSnapshot, scenario: Option<&TumorScenario>) -> Option<RuleResult> {
        if snapshot.step != SurgicalStep::Resection {
            return None;
        }
        let scenario = scenario?;
        let technique = snapshot.technique?;
        let result = match (scenario.tumor_type, technique) {
            (TumorType::Functioning, Technique::Resection) => {
                RuleResult::new("fa_resection_congruent", RuleSeverity::Success)
            }
            (TumorType::Functioning, Technique::Peeling) => {
                RuleResult::new("fa_peeling_mismatch", RuleSeverity::Warning)
            }
            (TumorType::NonFunctioning, Technique::Peeling) => {
                RuleResult::new("nfa_peeling_congruent", RuleSeverity::Info)
            }
            (TumorType::NonFunctioning, Technique::Resection) => {
                RuleResult::new("nfa_resection_mismatch", RuleSeverity::Warning)
            }
        };
        Some(result)
    }

    /// Whether `rule_id` belongs to the once-per-session group.
    pub fn is_once_rule(rule_id: &str) -> bool {
        ONCE_RULES.contains(&rule_id)
    }
}
