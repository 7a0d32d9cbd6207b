//! Per-tick simulation pipeline.
//!
//! One call to [`SimulationEngine::tick`] advances a [`GameState`] by one
//! hand-pose sample:
//! 1. Hand pose → instrument poses (lever kinematics, smoothing, clamping)
//! 2. Collision against the anatomy catalogue, one push-back step
//! 3. ICA proximity, danger band, Doppler reading
//! 4. Wall resection and bleeding, gated on the phase of the previous tick
//! 5. Suction
//! 6. Complications (rising edge, one per episode)
//! 7. Level metrics, phase, objectives, extent of resection and score
//!
//! All writes to the state happen here; rules and coaching are evaluated by
//! the session on top of the result.

use glam::Vec3;

use crate::config::Parameters;
use crate::geometry::{AnatomicalStructure, AnatomyCatalogue};
use crate::physics::{
    CollisionEngine, EndoscopeKinematics, VesselProximityModel, WallContact, WallInteraction,
    WallResectionGrid, MAX_BLOOD_LEVEL,
};
use crate::state::{
    Complication, ComplicationKind, EndoscopeState, GameState, HandPose, ToolType, ToolVector,
    TumorScenario,
};
use crate::surgery::{derive_phase, LevelDefinition, ScoringEngine, SurgicalStep, TickObservation};

/// Default simulation rate (Hz).
pub const TICK_RATE_HZ: f64 = 60.0;

/// One tracked sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Primary hand, drives the endoscope
    pub hand: HandPose,
    /// Second hand, drives the working instrument in bimanual mode
    pub tool_hand: Option<HandPose>,
    /// Simulated time covered by this tick (s)
    pub dt_sec: f64,
}

impl TickInput {
    pub fn new(hand: HandPose) -> Self {
        Self {
            hand,
            tool_hand: None,
            dt_sec: 1.0 / TICK_RATE_HZ,
        }
    }

    pub fn bimanual(hand: HandPose, tool_hand: HandPose) -> Self {
        Self {
            tool_hand: Some(tool_hand),
            ..Self::new(hand)
        }
    }

    pub fn with_dt(mut self, dt_sec: f64) -> Self {
        self.dt_sec = dt_sec;
        self
    }
}

/// What happened during one tick, for logging and export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    /// Phase before the tick, when it changed
    pub previous_step: Option<SurgicalStep>,
    /// Id of the structure the working tip hit
    pub collision: Option<String>,
    pub wall_interaction: Option<WallInteraction>,
    /// Blood cleared by suction
    pub suction_removed: f32,
    pub new_complications: Vec<Complication>,
    /// All objectives completed on this tick
    pub level_completed: bool,
}

/// Physical models and scoring for one level.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    params: Parameters,
    kinematics: EndoscopeKinematics,
    collision: CollisionEngine,
    anatomy: AnatomyCatalogue,
    vessels: VesselProximityModel,
    wall: WallResectionGrid,
    scoring: ScoringEngine,
}

impl SimulationEngine {
    /// Single-pivot engine with the built-in anatomy.
    pub fn new(params: Parameters, level: LevelDefinition, seed: u64) -> Self {
        let kinematics = EndoscopeKinematics::new(&params.kinematics);
        Self::assemble(params, level, seed, kinematics)
    }

    /// Dual-pivot engine: endoscope right, working instrument left.
    pub fn bimanual(params: Parameters, level: LevelDefinition, seed: u64) -> Self {
        let kinematics = EndoscopeKinematics::bimanual(&params.kinematics);
        Self::assemble(params, level, seed, kinematics)
    }

    fn assemble(params: Parameters, level: LevelDefinition, seed: u64, kinematics: EndoscopeKinematics) -> Self {
        Self {
            vessels: VesselProximityModel::with_default_paths(params.vessel.clone()),
            wall: WallResectionGrid::new(params.wall.clone(), seed),
            scoring: ScoringEngine::new(params.scoring.clone(), level),
            collision: CollisionEngine::new(),
            anatomy: AnatomyCatalogue::default(),
            kinematics,
            params,
        }
    }

    /// Replace the anatomy catalogue.
    pub fn with_anatomy(mut self, anatomy: AnatomyCatalogue) -> Self {
        self.anatomy = anatomy;
        self
    }

    /// Replace the ICA geometry.
    pub fn with_vessels(mut self, vessels: VesselProximityModel) -> Self {
        self.vessels = vessels;
        self
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn anatomy(&self) -> &AnatomyCatalogue {
        &self.anatomy
    }

    pub fn vessels(&self) -> &VesselProximityModel {
        &self.vessels
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    pub fn level(&self) -> &LevelDefinition {
        self.scoring.level()
    }

    pub fn is_bimanual(&self) -> bool {
        self.kinematics.is_bimanual()
    }

    pub fn seed(&self) -> u64 {
        self.wall.seed()
    }

    /// Initial state for a scenario on this engine's level.
    pub fn new_game(&self, scenario: TumorScenario) -> GameState {
        let mut state = GameState::new(scenario, self.scoring.level().to_state());
        if self.is_bimanual() {
            state.instrument = Some(EndoscopeState::default());
            state.tool_hand = Some(HandPose::default());
        }
        state
    }

    /// Clear smoothing history and restart the bleed sequence.
    pub fn reset(&mut self, seed: u64) {
        self.kinematics.reset();
        self.wall.reseed(seed);
    }

    /// Switch the active instrument.
    pub fn select_tool(&self, state: &mut GameState, tool: ToolType) {
        if state.active_tool == tool {
            return;
        }
        log::info!("Tool: {} -> {}", state.active_tool.name(), tool.name());
        if state.active_tool == ToolType::Doppler {
            state.doppler.is_active = false;
            state.doppler.audio_playing = false;
        }
        state.active_tool = tool;
    }

    /// Clone-and-advance entry point for replay and property tests.
    pub fn advance(&mut self, previous: &GameState, input: &TickInput) -> (GameState, TickReport) {
        let mut next = previous.clone();
        let report = self.tick(&mut next, input);
        (next, report)
    }

    /// Advance `state` by one sample.
    pub fn tick(&mut self, state: &mut GameState, input: &TickInput) -> TickReport {
        let mut report = TickReport::default();
        let dt_sec = if input.dt_sec.is_finite() && input.dt_sec > 0.0 { input.dt_sec } else { 0.0 };
        state.tick += 1;
        state.elapsed_sec += dt_sec;

        let previous_tip = state.working_tip().tip_position;
        let previous_angle = state.endoscope.current_angle;
        let previous_step = state.step;

        // === Kinematics ===
        let (mut endoscope, mut instrument) = if self.kinematics.is_bimanual() {
            let tool_hand = input
                .tool_hand
                .or(state.tool_hand)
                .unwrap_or_default();
            let pose = self.kinematics.update_bimanual(&input.hand, &tool_hand);
            (pose.endoscope, Some(pose.instrument))
        } else {
            (self.kinematics.update(&input.hand, input.hand.wrist_rotation_deg), None)
        };
        state.hand = *self.kinematics.endoscope_arm().last_hand();
        state.tool_hand = self.kinematics.instrument_arm().map(|arm| *arm.last_hand());

        // === Collision ===
        let scope_hit = self.collide(&mut endoscope);
        let tool_hit = instrument.as_mut().and_then(|tip| self.collide(tip));
        let hits: Vec<&AnatomicalStructure> = scope_hit.iter().chain(tool_hit.iter()).copied().collect();
        report.collision = tool_hit.or(scope_hit).map(|s| s.id.clone());

        let mucosal_contact = hits.iter().any(|s| s.is_mucosa());
        let mucosal_contact_started = mucosal_contact && !state.in_mucosal_contact;
        state.in_mucosal_contact = mucosal_contact;

        let critical_hit = hits.iter().find(|s| s.is_critical).map(|s| s.name.clone());
        let critical_started = critical_hit.is_some() && !state.in_critical_contact;
        state.in_critical_contact = critical_hit.is_some();

        state.endoscope = endoscope;
        state.instrument = instrument;
        let working = state.working_tip().clone();

        // === Vessel proximity and Doppler ===
        match self.vessels.nearest_distance(working.tip_position) {
            Some(proximity) => {
                state.nearest_vessel_distance_cm = proximity.distance_cm;
                state.danger_level = self.vessels.danger_level(proximity.distance_cm);
            }
            None => {
                state.nearest_vessel_distance_cm = f32::MAX;
                state.danger_level = self.vessels.danger_level(f32::MAX);
            }
        }

        let doppler_active = state.active_tool == ToolType::Doppler;
        if doppler_active {
            state.doppler = self.vessels.doppler_reading(working.tip_position, state.elapsed_sec);
        } else {
            state.doppler.is_active = false;
            state.doppler.audio_playing = false;
        }
        let doppler_localized =
            doppler_active && working.insertion_depth >= self.params.vessel.doppler_min_depth_percent;

        // === Wall and bleeding ===
        let grip = state.tool_hand.unwrap_or(state.hand);
        state.pinch_active = grip.is_pinching(self.params.wall.pinch_threshold);

        let contact = WallContact {
            position: working.tip_position,
            tool: state.active_tool,
            pinch_active: state.pinch_active,
            step: previous_step,
            depth_percent: working.insertion_depth,
        };
        report.wall_interaction = self.wall.interact(&mut state.wall, &mut state.blood_level, &contact);

        if state.active_tool == ToolType::Suction && state.pinch_active {
            report.suction_removed = self.wall.apply_suction(&mut state.blood_level, dt_sec as f32);
        }

        // === Complications ===
        let time_sec = state.elapsed_sec;
        let ica_contact =
            state.active_tool.is_wall_capable() && state.pinch_active && state.nearest_vessel_distance_cm <= 0.0;
        if ica_contact && !state.in_ica_contact {
            Self::raise(state, &mut report, Complication::new(ComplicationKind::IcaInjury, time_sec));
        }
        state.in_ica_contact = ica_contact;

        if critical_started {
            if let Some(name) = critical_hit {
                let complication =
                    Complication::new(ComplicationKind::CriticalStructureContact, time_sec).with_structure(&name);
                Self::raise(state, &mut report, complication);
            }
        }

        let bleeding_open = state
            .complications
            .iter()
            .any(|c| c.kind == ComplicationKind::UncontrolledBleeding && !c.managed);
        if state.blood_level >= MAX_BLOOD_LEVEL && !bleeding_open {
            Self::raise(state, &mut report, Complication::new(ComplicationKind::UncontrolledBleeding, time_sec));
        } else if bleeding_open && state.blood_level < self.params.rules.blood_visibility_threshold {
            let managed = state.manage_complications(ComplicationKind::UncontrolledBleeding);
            log::info!("Bleeding controlled ({} episode(s))", managed);
        }

        // === Metrics and tool vector ===
        state.tool_vector = ToolVector::from_positions(previous_tip, working.tip_position);

        let observation = TickObservation {
            previous_angle,
            angle: state.endoscope.current_angle,
            mucosal_contact_started,
            doppler_localized,
            blood_level: state.blood_level,
        };
        self.scoring.observe(&mut state.level.metrics, &observation);

        if mucosal_contact_started && self.scoring.excess_contacts(&state.level.metrics) > 0 {
            Self::raise(state, &mut report, Complication::new(ComplicationKind::MucosalTrauma, time_sec));
        }

        // === Phase ===
        state.step = derive_phase(
            state.endoscope.insertion_depth,
            state.level.metrics.doppler_used,
            &state.wall,
            state.wall.resection_extent(),
        );
        if state.step != previous_step {
            log::info!("Phase: {} -> {}", previous_step.as_str(), state.step.as_str());
            report.previous_step = Some(previous_step);
        }

        // === Objectives and score ===
        let was_complete = state.level.is_complete;
        state.level = self.scoring.update_objectives(&state.level, &state.endoscope, &state.wall);
        if state.level.is_complete && !was_complete {
            log::info!("Level '{}' complete at {:.1} s", state.level.name, state.elapsed_sec);
            report.level_completed = true;
        }

        state.extent_of_resection = self.scoring.extent_of_resection(&state.level, &state.complications);
        state.level.score = self.scoring.compute_score(
            &state.level,
            state.extent_of_resection,
            &state.complications,
            state.elapsed_sec,
        );

        report
    }

    /// Check one tip, push it out of the first structure hit and mark the contact.
    fn collide(&self, tip: &mut EndoscopeState) -> Option<&AnatomicalStructure> {
        let result = self.collision.check(tip.tip_position, self.anatomy.structures());
        let structure = result.structure?;
        self.kinematics
            .resolve_penetration(tip, result.normal, result.penetration_depth_cm);
        tip.is_colliding = true;
        tip.colliding_structure = Some(structure.name.clone());
        log::debug!(
            "Contact with {} ({:.2} cm penetration)",
            structure.name,
            result.penetration_depth_cm
        );
        Some(structure)
    }

    fn raise(state: &mut GameState, report: &mut TickReport, complication: Complication) {
        log::warn!(
            "Complication: {} ({}) at {:.1} s",
            complication.kind.id(),
            complication.severity.as_str(),
            complication.time_sec
        );
        report.new_complications.push(complication.clone());
        state.complications.push(complication);
    }

    /// Position the working tip would need for a hand pose, ignoring smoothing.
    pub fn preview_tip(&self, hand: &HandPose) -> Vec3 {
        let arm = self
            .kinematics
            .instrument_arm()
            .unwrap_or_else(|| self.kinematics.endoscope_arm());
        self.kinematics
            .corridor()
            .clamp(arm.tip_from_handle(arm.handle_from_hand(hand)))
    }
}
