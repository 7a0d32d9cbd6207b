//! Procedure logic layered on the physical models.
//!
//! This module implements:
//! - Stateless phase derivation from depth, Doppler use and wall state
//! - Ordered safety and strategy rules producing coaching triggers
//! - Level definitions, objectives, score and outcome estimates
//! - The coaching contract with canned fallback messages

pub mod coaching;
pub mod levels;
pub mod phase;
pub mod rules;
pub mod scoring;

pub use coaching::{
    fallback_message, CoachingContext, CoachingProvider, CoachingRequest, CoachingResponse,
    FallbackCoach,
};
pub use levels::LevelDefinition;
pub use phase::{derive_phase, SurgicalStep};
pub use rules::{RuleEngine, RuleResult, RuleSeverity, RuleSnapshot};
pub use scoring::{
    remission_prediction, wall_resected, Benchmark, ScoreBreakdown, ScoringEngine, TickObservation,
};
