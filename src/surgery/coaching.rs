//! Coaching contract.
//!
//! The simulation only emits structured triggers. Natural-language coaching
//! is produced by an external provider which may answer late or not at all,
//! so every trigger has a canned message that can be shown instead.

use serde::{Deserialize, Serialize};

use super::rules::RuleResult;
use super::SurgicalStep;
use crate::physics::DangerLevel;
use crate::state::{GameState, ToolType, TumorType};

pub const DOPPLER_DOGMA: &str =
    "Stop. Localize both carotids with the Doppler before opening the dura.";
pub const ICA_CONTACT: &str = "Instrument is on the carotid. Withdraw immediately.";
pub const INFERIOR_TRAJECTORY: &str =
    "You are dissecting downward toward the carotid siphon. Redirect superiorly.";
pub const FA_RESECTION_CONGRUENT: &str =
    "Good choice. Resecting the medial wall improves remission odds in functioning adenomas.";
pub const FA_PEELING_MISMATCH: &str =
    "Peeling may leave tumor cells in the wall. Functioning adenomas usually warrant resection.";
pub const NFA_PEELING_CONGRUENT: &str =
    "Peeling is appropriate here. Decompression is the goal for a non-functioning adenoma.";
pub const NFA_RESECTION_MISMATCH: &str =
    "Aggressive resection adds carotid risk with little benefit for a non-functioning adenoma.";
pub const BLOOD_FIELD: &str = "The field is obscured. Use suction before continuing.";
pub const ICA_PROXIMITY: &str = "Carotid is close. Slow down and confirm with the Doppler.";
pub const DOPPLER_REMINDER: &str = "You are at the sella. Select the Doppler probe to map the carotids.";
pub const GENERIC: &str = "Check your position and proceed carefully.";

/// Canned text for a rule id; unknown ids get a generic message.
pub fn fallback_message(rule_id: &str) -> &'static str {
    match rule_id {
        "doppler_dogma" => DOPPLER_DOGMA,
        "ica_contact" => ICA_CONTACT,
        "inferior_trajectory" => INFERIOR_TRAJECTORY,
        "fa_resection_congruent" => FA_RESECTION_CONGRUENT,
        "fa_peeling_mismatch" => FA_PEELING_MISMATCH,
        "nfa_peeling_congruent" => NFA_PEELING_CONGRUENT,
        "nfa_resection_mismatch" => NFA_RESECTION_MISMATCH,
        "blood_field" => BLOOD_FIELD,
        "ica_proximity" => ICA_PROXIMITY,
        "doppler_reminder" => DOPPLER_REMINDER,
        _ => GENERIC,
    }
}

/// Procedure summary sent along with a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingContext {
    pub step: SurgicalStep,
    pub depth_percent: f32,
    pub active_tool: ToolType,
    pub blood_level: f32,
    pub nearest_vessel_distance_cm: f32,
    pub danger_level: DangerLevel,
    pub tumor_type: TumorType,
    pub scenario_name: String,
    pub elapsed_sec: f64,
}

impl CoachingContext {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            step: state.step,
            depth_percent: state.working_tip().insertion_depth,
            active_tool: state.active_tool,
            blood_level: state.blood_level,
            nearest_vessel_distance_cm: state.nearest_vessel_distance_cm,
            danger_level: state.danger_level,
            tumor_type: state.scenario.tumor_type,
            scenario_name: state.scenario.name.clone(),
            elapsed_sec: state.elapsed_sec,
        }
    }
}

/// Trigger handed to an external coach, tagged with the session epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingRequest {
    pub epoch: u64,
    pub trigger: RuleResult,
    pub context: CoachingContext,
}

/// Coach answer; merged only if its epoch is still current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingResponse {
    pub epoch: u64,
    pub rule_id: String,
    pub message: String,
}

/// External coaching collaborator.
pub trait CoachingProvider {
    /// Produce advice for a trigger. `None` means no answer; the caller
    /// keeps the canned message.
    fn coach(&mut self, request: &CoachingRequest) -> Option<CoachingResponse>;
}

/// Offline coach that answers with the canned messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackCoach;

impl CoachingProvider for FallbackCoach {
    fn coach(&mut self, request: &CoachingRequest) -> Option<CoachingResponse> {
        Some(CoachingResponse {
            epoch: request.epoch,
            rule_id: request.trigger.rule_id.clone(),
            message: fallback_message(&request.trigger.rule_id).to_string(),
        })
    }
}
