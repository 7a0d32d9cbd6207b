//! Fulcrum (lever) kinematics of rigid endonasal instruments.
//!
//! A rigid instrument passing through the nostril pivots about it, so the tip
//! moves opposite to the handle and by a larger amount:
//!
//! ```text
//! tip = pivot + (-L) * (handle - pivot),   L > 1
//! ```
//!
//! Handle samples are smoothed with a simple moving average before the lever
//! is applied, and the resulting tip is clamped into the nasal corridor.
//! In the bimanual configuration each instrument has its own pivot (left and
//! right nostril), smoothing window and lever.

use std::collections::VecDeque;

use glam::Vec3;

use crate::config::KinematicsParameters;
use crate::geometry::{safe_normalize, Corridor};
use crate::state::{EndoscopeState, HandPose, ScopeAngle};

/// Moving average over the most recent samples.
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    window: usize,
    samples: VecDeque<Vec3>,
}

impl SmoothingWindow {
    /// Create a window over `window` samples (at least one).
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            samples: VecDeque::with_capacity(window),
        }
    }

    /// Add a sample and return the current average.
    pub fn push(&mut self, sample: Vec3) -> Vec3 {
        self.samples.push_back(sample);
        if self.samples.len() > self.window {
            self.samples.pop_front();
        }
        self.average()
    }

    pub fn average(&self) -> Vec3 {
        if self.samples.is_empty() {
            return Vec3::ZERO;
        }
        self.samples.iter().copied().sum::<Vec3>() / self.samples.len() as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

/// One rigid instrument pivoting about a nostril.
#[derive(Debug, Clone)]
pub struct LeverArm {
    pub pivot: Vec3,
    pub leverage_ratio: f32,
    /// Handle travel for a full hand sweep (cm)
    pub handle_scale_cm: Vec3,
    smoothing: SmoothingWindow,
    last_hand: HandPose,
}

impl LeverArm {
    pub fn new(pivot: Vec3, leverage_ratio: f32, handle_scale_cm: Vec3, window: usize) -> Self {
        let leverage_ratio = if leverage_ratio.is_finite() && leverage_ratio > 1.0 {
            leverage_ratio
        } else {
            log::warn!(
                "Leverage ratio {} does not amplify motion, clamping to 1.0",
                leverage_ratio
            );
            1.0
        };
        Self {
            pivot,
            leverage_ratio,
            handle_scale_cm,
            smoothing: SmoothingWindow::new(window),
            last_hand: HandPose::default(),
        }
    }

    /// Handle position for a hand sample.
    ///
    /// x/y map symmetrically around the pivot; z maps the [-1, 1] insertion
    /// sweep onto [0, scale.z] of handle travel behind the nostril.
    pub fn handle_from_hand(&self, hand: &HandPose) -> Vec3 {
        let p = hand.position;
        let s = self.handle_scale_cm;
        self.pivot + Vec3::new(p.x * s.x, p.y * s.y, -(p.z + 1.0) * 0.5 * s.z)
    }

    /// Tip position for a (smoothed) handle position.
    pub fn tip_from_handle(&self, handle: Vec3) -> Vec3 {
        self.pivot + (handle - self.pivot) * -self.leverage_ratio
    }

    /// Feed a hand sample; returns `(smoothed_handle, unclamped_tip)`.
    pub fn update(&mut self, hand: &HandPose) -> (Vec3, Vec3) {
        let hand = hand.sanitized(&self.last_hand);
        self.last_hand = hand;
        let handle = self.smoothing.push(self.handle_from_hand(&hand));
        (handle, self.tip_from_handle(handle))
    }

    /// Last sanitized hand sample.
    pub fn last_hand(&self) -> &HandPose {
        &self.last_hand
    }

    pub fn reset(&mut self) {
        self.smoothing.reset();
        self.last_hand = HandPose::default();
    }
}

/// Endoscope and working instrument in the bimanual configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BimanualPose {
    pub endoscope: EndoscopeState,
    pub instrument: EndoscopeState,
}

/// Converts tracked hand poses into instrument tip poses.
///
/// Holds only its own smoothing history; publishing the returned state is
/// the caller's job.
#[derive(Debug, Clone)]
pub struct EndoscopeKinematics {
    endoscope: LeverArm,
    instrument: Option<LeverArm>,
    corridor: Corridor,
}

impl EndoscopeKinematics {
    /// Single instrument through the central pivot.
    pub fn new(params: &KinematicsParameters) -> Self {
        Self {
            endoscope: Self::arm(params, params.pivot_cm),
            instrument: None,
            corridor: params.corridor,
        }
    }

    /// Endoscope through the right nostril, working instrument through the left.
    pub fn bimanual(params: &KinematicsParameters) -> Self {
        Self {
            endoscope: Self::arm(params, params.right_pivot_cm),
            instrument: Some(Self::arm(params, params.left_pivot_cm)),
            corridor: params.corridor,
        }
    }

    fn arm(params: &KinematicsParameters, pivot: Vec3) -> LeverArm {
        LeverArm::new(
            pivot,
            params.leverage_ratio,
            params.handle_scale_cm,
            params.smoothing_window,
        )
    }

    pub fn corridor(&self) -> &Corridor {
        &self.corridor
    }

    pub fn is_bimanual(&self) -> bool {
        self.instrument.is_some()
    }

    pub fn endoscope_arm(&self) -> &LeverArm {
        &self.endoscope
    }

    pub fn instrument_arm(&self) -> Option<&LeverArm> {
        self.instrument.as_ref()
    }

    /// Advance the endoscope by one hand sample.
    pub fn update(&mut self, hand: &HandPose, wrist_rotation_deg: f32) -> EndoscopeState {
        let (handle, tip) = self.endoscope.update(hand);
        let rotation_deg = if wrist_rotation_deg.is_finite() {
            wrist_rotation_deg
        } else {
            self.endoscope.last_hand().wrist_rotation_deg
        };
        self.build_state(handle, tip, rotation_deg)
    }

    /// Advance the working instrument. `None` in the single-pivot configuration.
    pub fn update_instrument(&mut self, hand: &HandPose) -> Option<EndoscopeState> {
        let arm = self.instrument.as_mut()?;
        let (handle, tip) = arm.update(hand);
        let rotation_deg = arm.last_hand().wrist_rotation_deg;
        Some(self.build_state(handle, tip, rotation_deg))
    }

    /// Advance both instruments; in the single-pivot configuration the
    /// instrument mirrors the endoscope.
    pub fn update_bimanual(&mut self, scope_hand: &HandPose, tool_hand: &HandPose) -> BimanualPose {
        let endoscope = self.update(scope_hand, scope_hand.wrist_rotation_deg);
        let instrument = self
            .update_instrument(tool_hand)
            .unwrap_or_else(|| endoscope.clone());
        BimanualPose {
            endoscope,
            instrument,
        }
    }

    fn build_state(&self, handle: Vec3, tip: Vec3, rotation_deg: f32) -> EndoscopeState {
        let tip_position = self.corridor.clamp(tip);
        EndoscopeState {
            tip_position,
            handle_position: handle,
            insertion_depth: self.corridor.depth_percent(tip_position),
            current_angle: ScopeAngle::from_wrist_rotation(rotation_deg),
            rotation_deg,
            is_colliding: false,
            colliding_structure: None,
        }
    }

    /// Push a tip back out of a structure along the contact normal, then
    /// re-clamp into the corridor and refresh the depth.
    pub fn resolve_penetration(&self, state: &mut EndoscopeState, normal: Vec3, penetration_cm: f32) {
        if !(penetration_cm.is_finite() && penetration_cm > 0.0) {
            return;
        }
        let Some(normal) = safe_normalize(normal) else {
            return;
        };
        state.tip_position = self.corridor.clamp(state.tip_position + normal * penetration_cm);
        state.insertion_depth = self.corridor.depth_percent(state.tip_position);
    }

    pub fn reset(&mut self) {
        self.endoscope.reset();
        if let Some(arm) = self.instrument.as_mut() {
            arm.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(x: f32, y: f32, z: f32) -> HandPose {
        HandPose::new(Vec3::new(x, y, z), 0.0, 0.0)
    }

    #[test]
    fn test_smoothing_window_average() {
        let mut window = SmoothingWindow::new(5);
        for i in 1..=5 {
            window.push(Vec3::splat(i as f32));
        }
        assert!((window.average() - Vec3::splat(3.0)).length() < 1e-6);

        // Oldest sample drops out
        let avg = window.push(Vec3::splat(6.0));
        assert!((avg - Vec3::splat(4.0)).length() < 1e-6);
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn test_smoothing_window_zero_size() {
        let mut window = SmoothingWindow::new(0);
        assert_eq!(window.push(Vec3::ONE), Vec3::ONE);
        assert_eq!(window.push(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_lever_inverts_and_amplifies() {
        let arm = LeverArm::new(Vec3::ZERO, 2.5, Vec3::ONE, 1);
        let tip = arm.tip_from_handle(Vec3::new(0.4, -0.2, -1.0));
        assert!((tip - Vec3::new(-1.0, 0.5, 2.5)).length() < 1e-6);
    }

    #[test]
    fn test_lever_about_offset_pivot() {
        let pivot = Vec3::new(0.4, 0.0, 0.0);
        let arm = LeverArm::new(pivot, 3.0, Vec3::ONE, 1);
        let handle = pivot + Vec3::new(0.1, 0.0, -1.0);
        let tip = arm.tip_from_handle(handle);
        assert!((tip - (pivot + Vec3::new(-0.3, 0.0, 3.0))).length() < 1e-5);
    }

    #[test]
    fn test_non_amplifying_leverage_clamped() {
        let arm = LeverArm::new(Vec3::ZERO, 0.5, Vec3::ONE, 1);
        assert_eq!(arm.leverage_ratio, 1.0);
    }

    #[test]
    fn test_full_insertion_reaches_corridor_end() {
        let params = KinematicsParameters::default();
        let mut kinematics = EndoscopeKinematics::new(&params);
        let mut state = EndoscopeState::default();
        for _ in 0..params.smoothing_window {
            state = kinematics.update(&hand(0.0, 0.0, 1.0), 0.0);
        }
        assert!((state.tip_position.z - 10.0).abs() < 1e-4);
        assert!((state.insertion_depth - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_depth_from_tip() {
        let params = KinematicsParameters::default();
        let mut kinematics = EndoscopeKinematics::new(&params);
        let mut state = EndoscopeState::default();
        // z = 0.3 -> handle z = -2.6 -> tip z = 6.5 -> 65 %
        for _ in 0..params.smoothing_window {
            state = kinematics.update(&hand(0.0, 0.0, 0.3), 0.0);
        }
        assert!((state.insertion_depth - 65.0).abs() < 1e-3, "depth {}", state.insertion_depth);
    }

    #[test]
    fn test_smoothing_lags_step_input() {
        let params = KinematicsParameters::default();
        let mut kinematics = EndoscopeKinematics::new(&params);
        kinematics.update(&hand(0.0, 0.0, -1.0), 0.0);
        let state = kinematics.update(&hand(0.0, 0.0, 1.0), 0.0);
        // Average of the two handle samples: tip halfway in
        assert!((state.tip_position.z - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_tip_clamped_into_corridor() {
        let params = KinematicsParameters {
            leverage_ratio: 10.0,
            ..Default::default()
        };
        let mut kinematics = EndoscopeKinematics::new(&params);
        let state = kinematics.update(&hand(1.0, -1.0, 1.0), 0.0);
        assert!(params.corridor.contains(state.tip_position));
        assert_eq!(state.tip_position.x, -2.0);
        assert_eq!(state.tip_position.y, 2.0);
    }

    #[test]
    fn test_angle_snapping_through_update() {
        let params = KinematicsParameters::default();
        let mut kinematics = EndoscopeKinematics::new(&params);
        let state = kinematics.update(&hand(0.0, 0.0, 0.0), 40.0);
        assert_eq!(state.current_angle, ScopeAngle::FortyFive);
        assert_eq!(state.rotation_deg, 40.0);
    }

    #[test]
    fn test_bimanual_pivots_independent() {
        let params = KinematicsParameters::default();
        let mut kinematics = EndoscopeKinematics::bimanual(&params);
        let centred = hand(0.0, 0.0, 0.0);
        let pose = kinematics.update_bimanual(&centred, &centred);

        // Same hand input, different pivots: tips separated by the pivot offset
        assert!((pose.endoscope.tip_position.x - params.right_pivot_cm.x).abs() < 1e-5);
        assert!((pose.instrument.tip_position.x - params.left_pivot_cm.x).abs() < 1e-5);

        // Moving only the tool hand leaves the endoscope alone
        let moved = kinematics.update_bimanual(&centred, &hand(0.5, 0.0, 0.0));
        assert!((moved.endoscope.tip_position - pose.endoscope.tip_position).length() < 1e-6);
        assert!(moved.instrument.tip_position.x < pose.instrument.tip_position.x);
    }

    #[test]
    fn test_single_pivot_has_no_instrument() {
        let mut kinematics = EndoscopeKinematics::new(&KinematicsParameters::default());
        assert!(kinematics.update_instrument(&HandPose::default()).is_none());
    }

    #[test]
    fn test_nan_hand_reuses_previous_sample() {
        let params = KinematicsParameters {
            smoothing_window: 1,
            ..Default::default()
        };
        let mut kinematics = EndoscopeKinematics::new(&params);
        let good = kinematics.update(&hand(0.2, 0.1, 0.0), 0.0);
        let bad = kinematics.update(&hand(f32::NAN, f32::NAN, f32::NAN), f32::NAN);
        assert!((good.tip_position - bad.tip_position).length() < 1e-6);
        assert!(bad.rotation_deg.is_finite());
    }

    #[test]
    fn test_resolve_penetration() {
        let kinematics = EndoscopeKinematics::new(&KinematicsParameters::default());
        let mut state = EndoscopeState {
            tip_position: Vec3::new(0.0, 0.0, 5.0),
            ..Default::default()
        };
        kinematics.resolve_penetration(&mut state, Vec3::new(0.0, 0.0, -2.0), 0.5);
        assert!((state.tip_position.z - 4.5).abs() < 1e-6);
        assert!((state.insertion_depth - 45.0).abs() < 1e-4);

        // Degenerate normal is ignored
        kinematics.resolve_penetration(&mut state, Vec3::ZERO, 1.0);
        assert!((state.tip_position.z - 4.5).abs() < 1e-6);
    }
}
