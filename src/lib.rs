//! Endonasal Simulator - procedural simulation of endoscopic pituitary surgery
//!
//! This library turns tracked hand motion into instrument poses inside the
//! nasal corridor and derives the surgical phase, safety coaching,
//! complications and score for skills training.

pub mod config;
pub mod export;
pub mod geometry;
pub mod physics;
pub mod simulation;
pub mod state;
pub mod surgery;
pub mod tracking;

pub use config::Parameters;
pub use physics::{DangerLevel, EndoscopeKinematics};
pub use simulation::{SimulationEngine, SimulationSession, TickInput};
pub use state::{GameState, HandPose, ToolType, TumorScenario};
pub use surgery::{LevelDefinition, SurgicalStep};
