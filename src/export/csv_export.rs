//! CSV time-series export of simulation ticks.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::geometry::Side;
use crate::state::GameState;

/// One row of the tick time series
#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub tick: u64,
    /// Simulation time (seconds)
    pub time_sec: f64,
    pub step: &'static str,
    pub tool: &'static str,
    /// Working tip position (cm)
    pub tip_x_cm: f32,
    pub tip_y_cm: f32,
    pub tip_z_cm: f32,
    /// Insertion depth (%)
    pub depth_percent: f32,
    pub scope_angle_deg: f32,
    pub colliding: bool,
    /// Distance to the nearest ICA wall (cm)
    pub vessel_distance_cm: f32,
    pub danger: &'static str,
    pub doppler_signal: f32,
    pub left_wall_integrity: f32,
    pub right_wall_integrity: f32,
    /// Blood in the field (0-100)
    pub blood_level: f32,
    pub complications: usize,
    pub extent_of_resection: f32,
    pub score: u8,
}

impl From<&GameState> for TickRecord {
    fn from(state: &GameState) -> Self {
        let tip = state.working_tip();
        Self {
            tick: state.tick,
            time_sec: state.elapsed_sec,
            step: state.step.as_str(),
            tool: state.active_tool.name(),
            tip_x_cm: tip.tip_position.x,
            tip_y_cm: tip.tip_position.y,
            tip_z_cm: tip.tip_position.z,
            depth_percent: tip.insertion_depth,
            scope_angle_deg: state.endoscope.current_angle.degrees(),
            colliding: tip.is_colliding,
            vessel_distance_cm: state.nearest_vessel_distance_cm,
            danger: state.danger_level.as_str(),
            doppler_signal: state.doppler.signal_strength,
            left_wall_integrity: state.wall.integrity(Side::Left),
            right_wall_integrity: state.wall.integrity(Side::Right),
            blood_level: state.blood_level,
            complications: state.complications.len(),
            extent_of_resection: state.extent_of_resection,
            score: state.level.score,
        }
    }
}

/// CSV exporter for tick time series
pub struct CsvExporter {
    writer: csv::Writer<File>,
    /// Sample interval in seconds
    sample_interval_sec: f64,
    last_sample_time: f64,
    path: PathBuf,
}

impl CsvExporter {
    /// Create an exporter writing `ticks_<timestamp>.csv` into `dir`.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new<P: AsRef<Path>>(dir: P, sample_interval_sec: f64) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("ticks_{}.csv", timestamp));

        let file = File::create(&path)?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self {
            writer,
            sample_interval_sec,
            last_sample_time: -sample_interval_sec, // Ensure first sample is recorded
            path,
        })
    }

    /// Record a sample if the interval has elapsed
    pub fn maybe_record(&mut self, state: &GameState) -> Result<bool> {
        if state.elapsed_sec - self.last_sample_time >= self.sample_interval_sec {
            self.record(state)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Record a sample regardless of interval
    pub fn record(&mut self, state: &GameState) -> Result<()> {
        self.writer.serialize(TickRecord::from(state))?;
        self.last_sample_time = state.elapsed_sec;
        Ok(())
    }

    /// Finish writing and return the output path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        log::info!("CSV export completed: {}", self.path.display());
        Ok(self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TumorScenario;
    use crate::surgery::LevelDefinition;

    #[test]
    fn test_interval_sampling() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = CsvExporter::new(dir.path(), 0.5).unwrap();
        let mut state = GameState::new(TumorScenario::default(), LevelDefinition::medial_wall().to_state());

        let mut written = 0;
        for i in 0..60 {
            state.tick = i;
            state.elapsed_sec = i as f64 / 60.0;
            if exporter.maybe_record(&state).unwrap() {
                written += 1;
            }
        }
        assert_eq!(written, 2, "Samples at 0.0 s and 0.5 s");

        let path = exporter.finish().unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "tick");
        assert!(headers.iter().any(|h| h == "blood_level"));
        assert_eq!(reader.records().count(), 2);
    }
}
