//! Hand tracking input.
//!
//! Real hand landmarks come from an external webcam tracker implementing
//! [`HandTrack`]. [`ScriptedHandTrack`] replays waypoints instead, with
//! optional Gaussian jitter to mimic tracker noise, for headless runs,
//! tests and benchmarks.

use glam::Vec3;
use rand::prelude::*;
use rand_distr::Normal;

use crate::state::{HandPose, ToolType};

/// Source of per-tick hand poses.
pub trait HandTrack {
    /// Next sample, or `None` when the source is exhausted.
    fn next_pose(&mut self) -> Option<HandPose>;
}

/// Target pose reached by linear interpolation over `ticks` samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub hand: HandPose,
    pub ticks: u32,
    /// Instrument selected when the segment starts
    pub tool: Option<ToolType>,
}

impl Waypoint {
    pub fn new(position: Vec3, ticks: u32) -> Self {
        Self {
            hand: HandPose::new(position, 0.0, 0.0),
            ticks,
            tool: None,
        }
    }

    pub fn wrist(mut self, rotation_deg: f32) -> Self {
        self.hand.wrist_rotation_deg = rotation_deg;
        self
    }

    pub fn pinch(mut self, strength: f32) -> Self {
        self.hand.pinch_strength = strength;
        self
    }

    pub fn tool(mut self, tool: ToolType) -> Self {
        self.tool = Some(tool);
        self
    }
}

/// One scripted sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptSample {
    pub hand: HandPose,
    /// Tool selection event issued with this sample
    pub tool_change: Option<ToolType>,
}

/// Replays a list of waypoints.
///
/// Position is interpolated linearly from the previous target; wrist
/// rotation and pinch switch to the new target immediately.
#[derive(Debug, Clone)]
pub struct ScriptedHandTrack {
    waypoints: Vec<Waypoint>,
    index: usize,
    step_in_segment: u32,
    start: HandPose,
    jitter: Option<Normal<f32>>,
    rng: StdRng,
}

impl ScriptedHandTrack {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self {
            waypoints,
            index: 0,
            step_in_segment: 0,
            start: HandPose::default(),
            jitter: None,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Add zero-mean Gaussian noise with standard deviation `sigma` (hand
    /// units) to every position sample.
    pub fn with_jitter(mut self, sigma: f32, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.jitter = match Normal::new(0.0, sigma) {
            Ok(normal) if sigma > 0.0 => Some(normal),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Ignoring jitter sigma {}: {}", sigma, e);
                None
            }
        };
        self
    }

    /// Total number of samples in the script.
    pub fn len(&self) -> usize {
        self.waypoints.iter().map(|w| w.ticks.max(1) as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn next_sample(&mut self) -> Option<ScriptSample> {
        let waypoint = *self.waypoints.get(self.index)?;
        let ticks = waypoint.ticks.max(1);
        let tool_change = if self.step_in_segment == 0 { waypoint.tool } else { None };

        self.step_in_segment += 1;
        let t = self.step_in_segment as f32 / ticks as f32;
        let mut hand = waypoint.hand;
        hand.position = self.start.position.lerp(waypoint.hand.position, t);

        if self.step_in_segment >= ticks {
            self.start = waypoint.hand;
            self.index += 1;
            self.step_in_segment = 0;
        }

        if let Some(normal) = self.jitter {
            let noise = Vec3::new(
                self.rng.sample(normal),
                self.rng.sample(normal),
                self.rng.sample(normal),
            );
            hand.position += noise;
        }

        Some(ScriptSample { hand, tool_change })
    }

    /// Single-pivot script for the medial wall level: navigate with an
    /// angled lens, localize the carotids, resect the left medial wall and
    /// clear the field.
    pub fn medial_wall_procedure() -> Self {
        // Hand coordinates for tip (x, y, z) cm: (-x / 2, -y / 2, z / 5 - 1)
        let left_superior = Vec3::new(0.6, -0.25, 0.7);
        let left_middle = Vec3::new(0.6, 0.0, 0.7);
        let left_inferior = Vec3::new(0.6, 0.25, 0.7);
        Self::new(vec![
            Waypoint::new(Vec3::new(0.0, 0.0, -0.2), 60),
            Waypoint::new(Vec3::new(0.0, 0.0, 0.0), 30).wrist(30.0),
            Waypoint::new(Vec3::new(0.0, 0.0, 0.0), 30),
            Waypoint::new(Vec3::new(0.0, 0.0, 0.3), 60),
            Waypoint::new(Vec3::new(0.0, 0.0, 0.5), 60).tool(ToolType::Doppler),
            Waypoint::new(left_superior, 60).tool(ToolType::Curette),
            Waypoint::new(left_superior, 90).pinch(1.0),
            Waypoint::new(left_middle, 90).pinch(1.0),
            Waypoint::new(left_inferior, 90).pinch(1.0),
            Waypoint::new(Vec3::new(0.0, 0.0, 0.5), 120).pinch(1.0).tool(ToolType::Suction),
        ])
    }
}

impl HandTrack for ScriptedHandTrack {
    fn next_pose(&mut self) -> Option<HandPose> {
        self.next_sample().map(|s| s.hand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolates_to_target() {
        let mut track = ScriptedHandTrack::new(vec![Waypoint::new(Vec3::new(0.0, 0.0, 1.0), 4)]);
        let poses: Vec<HandPose> = std::iter::from_fn(|| track.next_pose()).collect();
        assert_eq!(poses.len(), 4);
        // Starts from the default pose at z = -1
        assert!((poses[0].position.z - -0.5).abs() < 1e-6);
        assert!((poses[3].position.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_tool_change_on_first_sample_only() {
        let mut track = ScriptedHandTrack::new(vec![
            Waypoint::new(Vec3::ZERO, 2),
            Waypoint::new(Vec3::ZERO, 3).tool(ToolType::Doppler),
        ]);
        let changes: Vec<Option<ToolType>> = std::iter::from_fn(|| track.next_sample())
            .map(|s| s.tool_change)
            .collect();
        assert_eq!(changes, vec![None, None, Some(ToolType::Doppler), None, None]);
    }

    #[test]
    fn test_jitter_is_seeded() {
        let script = || {
            ScriptedHandTrack::new(vec![Waypoint::new(Vec3::ZERO, 20)]).with_jitter(0.01, 5)
        };
        let a: Vec<HandPose> = std::iter::from_fn({
            let mut t = script();
            move || t.next_pose()
        })
        .collect();
        let b: Vec<HandPose> = std::iter::from_fn({
            let mut t = script();
            move || t.next_pose()
        })
        .collect();
        assert_eq!(a, b);
        let clean = ScriptedHandTrack::new(vec![Waypoint::new(Vec3::ZERO, 20)]).next_pose().unwrap();
        assert_ne!(a[0], clean, "Jitter should perturb the pose");
    }

    #[test]
    fn test_invalid_jitter_disabled() {
        let mut track = ScriptedHandTrack::new(vec![Waypoint::new(Vec3::ZERO, 1)]).with_jitter(-1.0, 0);
        assert_eq!(track.next_pose().unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_procedure_length() {
        let track = ScriptedHandTrack::medial_wall_procedure();
        assert_eq!(track.len(), 690);
        assert!(!track.is_empty());
    }
}
