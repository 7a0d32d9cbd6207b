//! JSON summary of a finished or interrupted session.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::geometry::Side;
use crate::simulation::{CoachingMessage, SimulationSession};
use crate::state::{Complication, LevelObjective, TumorScenario};
use crate::surgery::{remission_prediction, Benchmark, ScoreBreakdown, SurgicalStep};

/// Session summary export structure
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Export timestamp
    pub exported_at: String,
    /// Export version for compatibility
    pub version: &'static str,
    pub level: String,
    pub scenario: TumorScenario,
    pub seed: u64,
    pub epoch: u64,
    pub ticks: u64,
    pub elapsed_sec: f64,
    pub final_step: SurgicalStep,
    pub score: ScoreBreakdown,
    pub extent_of_resection: f32,
    pub remission_probability: f32,
    pub left_wall_integrity: f32,
    pub right_wall_integrity: f32,
    pub blood_level: f32,
    pub objectives: Vec<LevelObjective>,
    pub complications: Vec<Complication>,
    pub benchmarks: Vec<Benchmark>,
    pub messages: Vec<CoachingMessage>,
}

impl SessionSummary {
    pub fn from_session(session: &SimulationSession) -> Self {
        let state = session.state();
        let scoring = session.engine().scoring();
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            level: state.level.name.clone(),
            scenario: state.scenario.clone(),
            seed: session.engine().seed(),
            epoch: session.epoch(),
            ticks: state.tick,
            elapsed_sec: state.elapsed_sec,
            final_step: state.step,
            score: scoring.breakdown(
                &state.level,
                state.extent_of_resection,
                &state.complications,
                state.elapsed_sec,
            ),
            extent_of_resection: state.extent_of_resection,
            remission_probability: remission_prediction(&state.scenario, state.extent_of_resection, &state.wall),
            left_wall_integrity: state.wall.integrity(Side::Left),
            right_wall_integrity: state.wall.integrity(Side::Right),
            blood_level: state.blood_level,
            objectives: state.level.objectives.clone(),
            complications: state.complications.clone(),
            benchmarks: scoring.benchmarks(&state.level, state.extent_of_resection, state.elapsed_sec),
            messages: session.messages().to_vec(),
        }
    }
}

/// Export a session summary into `dir`.
///
/// Creates the directory if it doesn't exist.
/// Filename is auto-generated with timestamp: `session_YYYYMMDD_HHMMSS.json`
///
/// Returns the path to the saved JSON file.
pub fn export_session_json<P: AsRef<Path>>(session: &SimulationSession, dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let filename = format!("session_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);
    export_session_json_to(session, &path)?;
    Ok(path)
}

/// Export a session summary to a specific file
pub fn export_session_json_to(session: &SimulationSession, path: &Path) -> Result<()> {
    let summary = SessionSummary::from_session(session);
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &summary)?;

    log::info!("JSON session summary exported: {}", path.display());
    Ok(())
}
