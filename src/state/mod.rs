//! State management for the surgical simulation.
//!
//! Value types describing the instruments, the medial wall, the Doppler
//! probe, the tumor scenario and level progress, composed into [`GameState`].

mod doppler;
mod endoscope;
mod game;
mod level;
mod scenario;
mod wall;

pub use doppler::{DopplerState, DopplerTone};
pub use endoscope::{EndoscopeState, HandPose, ScopeAngle, Technique, ToolType, ToolVector};
pub use game::GameState;
pub use level::{
    Complication, ComplicationKind, LevelMetrics, LevelObjective, LevelState, ObjectiveKind,
    Severity,
};
pub use scenario::{HormoneSubtype, KnospGrade, SizeClass, SurgicalGoal, TumorScenario, TumorType};
pub use wall::{MedialWallState, WallInteractionZone, WallZone};
