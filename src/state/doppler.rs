//! Doppler probe state.

use serde::{Deserialize, Serialize};

use crate::geometry::Side;

/// Doppler probe readout. Frozen at its last value while the probe is not
/// the active instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DopplerState {
    pub is_active: bool,
    /// Heartbeat-modulated signal strength in [0, 1]
    pub signal_strength: f32,
    /// Distance from the probe tip to the nearest ICA wall (cm, >= 0)
    pub nearest_ica_distance_cm: f32,
    /// Side of the nearest ICA
    pub nearest_side: Option<Side>,
    /// Signal strength exceeds the audible threshold
    pub audio_playing: bool,
}

impl Default for DopplerState {
    fn default() -> Self {
        Self {
            is_active: false,
            signal_strength: 0.0,
            nearest_ica_distance_cm: f32::MAX,
            nearest_side: None,
            audio_playing: false,
        }
    }
}

/// Target for the external audio synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DopplerTone {
    /// Output gain in [0, 1]
    pub intensity: f32,
    /// Carrier frequency (Hz)
    pub frequency_hz: f32,
}
