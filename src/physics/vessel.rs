//! ICA proximity and Doppler signal model.
//!
//! The distance from a point to each internal carotid artery is measured to
//! the closest point on its centre-line polyline, minus the vessel radius.
//! That distance drives both the discrete danger bands used by the safety
//! rules and the continuous micro-Doppler signal.
//!
//! Doppler strength:
//! ```text
//! s = clamp(1 - d / d_max, 0, 1)
//! signal = s * (1 - m + m * pulse(t))
//! ```
//! where `pulse(t)` is a raised cosine at the heart rate and `m` the
//! modulation depth.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::VesselParameters;
use crate::geometry::{closest_point_on_segment, Side, VesselPath};
use crate::state::{DopplerState, DopplerTone};

/// Discrete proximity classification, ordered from safest to most dangerous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum DangerLevel {
    #[default]
    Safe,
    Caution,
    Warning,
    Critical,
}

impl DangerLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            DangerLevel::Safe => "safe",
            DangerLevel::Caution => "caution",
            DangerLevel::Warning => "warning",
            DangerLevel::Critical => "critical",
        }
    }
}

/// Nearest ICA to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VesselProximity {
    /// Distance to the vessel wall (cm, >= 0)
    pub distance_cm: f32,
    pub side: Side,
    /// Closest point on the centre-line
    pub nearest_point: Vec3,
}

/// Distance queries against the left and right ICA centre-lines.
#[derive(Debug, Clone)]
pub struct VesselProximityModel {
    paths: Vec<VesselPath>,
    params: VesselParameters,
}

impl VesselProximityModel {
    pub fn new(params: VesselParameters, left: VesselPath, right: VesselPath) -> Self {
        Self {
            paths: vec![left, right],
            params,
        }
    }

    /// Model with the built-in cavernous ICA geometry.
    pub fn with_default_paths(params: VesselParameters) -> Self {
        Self::new(
            params,
            VesselPath::default_for(Side::Left),
            VesselPath::default_for(Side::Right),
        )
    }

    pub fn params(&self) -> &VesselParameters {
        &self.params
    }

    pub fn paths(&self) -> &[VesselPath] {
        &self.paths
    }

    /// Closest ICA to `position`.
    ///
    /// Zero-length segments are skipped; a single-point path measures to its
    /// point. Returns `None` only if no path has usable geometry.
    pub fn nearest_distance(&self, position: Vec3) -> Option<VesselProximity> {
        let mut best: Option<(f32, Side, Vec3)> = None;

        for path in &self.paths {
            // A single-point path has no segments
            let single = (path.points.len() == 1).then(|| path.points[0]);
            let candidates = single.into_iter().chain(
                path.segments()
                    .filter_map(|(a, b)| closest_point_on_segment(position, a, b)),
            );

            for point in candidates {
                let d = position.distance(point);
                if best.map_or(true, |(best_d, _, _)| d < best_d) {
                    best = Some((d, path.side, point));
                }
            }
        }

        best.map(|(d, side, nearest_point)| VesselProximity {
            distance_cm: (d - self.params.vessel_radius_cm).max(0.0),
            side,
            nearest_point,
        })
    }

    /// Classify a vessel-wall distance into non-overlapping bands.
    pub fn danger_level(&self, distance_cm: f32) -> DangerLevel {
        if distance_cm < self.params.danger_radius_cm {
            DangerLevel::Critical
        } else if distance_cm < self.params.warning_radius_cm {
            DangerLevel::Warning
        } else if distance_cm < self.params.safe_radius_cm {
            DangerLevel::Caution
        } else {
            DangerLevel::Safe
        }
    }

    /// Unmodulated Doppler strength for a vessel-wall distance.
    pub fn signal_strength(&self, distance_cm: f32) -> f32 {
        let range = self.params.doppler_max_range_cm;
        if range <= 0.0 || !distance_cm.is_finite() {
            return 0.0;
        }
        (1.0 - distance_cm / range).clamp(0.0, 1.0)
    }

    /// Raised-cosine pulse in [0, 1] at the configured heart rate.
    pub fn heartbeat_pulse(&self, time_sec: f64) -> f32 {
        let beats_per_sec = (self.params.heart_rate_bpm / 60.0) as f64;
        let phase = (time_sec * beats_per_sec).rem_euclid(1.0) as f32;
        0.5 * (1.0 + (TAU * phase).cos())
    }

    /// Doppler strength amplitude-modulated by the heartbeat.
    pub fn modulated_signal(&self, distance_cm: f32, time_sec: f64) -> f32 {
        let depth = self.params.pulse_modulation_depth.clamp(0.0, 1.0);
        let envelope = 1.0 - depth + depth * self.heartbeat_pulse(time_sec);
        (self.signal_strength(distance_cm) * envelope).clamp(0.0, 1.0)
    }

    /// Fresh probe reading at `position`.
    pub fn doppler_reading(&self, position: Vec3, time_sec: f64) -> DopplerState {
        match self.nearest_distance(position) {
            Some(proximity) => {
                let signal_strength = self.modulated_signal(proximity.distance_cm, time_sec);
                DopplerState {
                    is_active: true,
                    signal_strength,
                    nearest_ica_distance_cm: proximity.distance_cm,
                    nearest_side: Some(proximity.side),
                    audio_playing: signal_strength > self.params.audio_threshold,
                }
            }
            None => DopplerState {
                is_active: true,
                ..DopplerState::default()
            },
        }
    }

    /// Audio target for a Doppler reading; silent when not playing.
    pub fn tone(&self, doppler: &DopplerState) -> DopplerTone {
        if !(doppler.is_active && doppler.audio_playing) {
            return DopplerTone {
                intensity: 0.0,
                frequency_hz: self.params.tone_base_hz,
            };
        }
        DopplerTone {
            intensity: doppler.signal_strength,
            frequency_hz: self.params.tone_base_hz + self.params.tone_span_hz * doppler.signal_strength,
        }
    }
}
