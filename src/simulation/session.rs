//! Training session: engine, state and coaching bookkeeping.
//!
//! The session owns everything that outlives a single tick but is not part
//! of the physical state:
//! - the epoch, bumped on every reset so late coaching answers can be dropped
//! - the set of rule ids already fired, for once-per-session rules
//! - the rule trigger rate limiter, in simulated time; a critical trigger
//!   that differs from the last one is never held back
//! - the coaching message log

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::engine::{SimulationEngine, TickInput, TickReport};
use crate::config::Parameters;
use crate::state::{GameState, ToolType, TumorScenario};
use crate::surgery::{
    CoachingContext, CoachingProvider, CoachingRequest, CoachingResponse, LevelDefinition,
    RuleEngine, RuleResult, RuleSeverity, RuleSnapshot,
};

/// Origin of a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSource {
    /// Canned text from a rule trigger
    Rule,
    /// Answer from an external coach
    Coach,
}

/// Entry in the coaching log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingMessage {
    pub epoch: u64,
    pub rule_id: String,
    pub message: String,
    pub severity: Option<RuleSeverity>,
    pub source: MessageSource,
    /// Simulated time when logged (s)
    pub time_sec: f64,
}

/// Result of one session tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTick {
    pub report: TickReport,
    /// Rule trigger emitted on this tick, if one matched and was not rate limited
    pub trigger: Option<RuleResult>,
}

#[derive(Debug, Clone)]
pub struct SimulationSession {
    engine: SimulationEngine,
    rules: RuleEngine,
    state: GameState,
    seed: u64,
    epoch: u64,
    fired_rules: HashSet<String>,
    last_trigger: Option<(f64, String)>,
    messages: Vec<CoachingMessage>,
}

impl SimulationSession {
    pub fn new(engine: SimulationEngine, scenario: TumorScenario) -> Self {
        let rules = RuleEngine::new(engine.params().rules.clone());
        let state = engine.new_game(scenario);
        let seed = engine.seed();
        log::info!(
            "Session started: level '{}', scenario '{}', seed {}",
            engine.level().name,
            state.scenario.name,
            seed
        );
        Self {
            engine,
            rules,
            state,
            seed,
            epoch: 0,
            fired_rules: HashSet::new(),
            last_trigger: None,
            messages: Vec::new(),
        }
    }

    /// Single-pivot session with the given parameters.
    pub fn with_level(params: Parameters, level: LevelDefinition, scenario: TumorScenario, seed: u64) -> Self {
        Self::new(SimulationEngine::new(params, level, seed), scenario)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn messages(&self) -> &[CoachingMessage] {
        &self.messages
    }

    pub fn fired_rules(&self) -> &HashSet<String> {
        &self.fired_rules
    }

    pub fn select_tool(&mut self, tool: ToolType) {
        self.engine.select_tool(&mut self.state, tool);
    }

    /// Advance the simulation and evaluate the rules.
    ///
    /// Rules are evaluated every tick, but a trigger is only emitted once
    /// `evaluation_interval_sec` has passed since the last one. Critical
    /// triggers skip the wait unless they repeat the previous rule.
    pub fn tick(&mut self, input: &TickInput) -> SessionTick {
        let report = self.engine.tick(&mut self.state, input);
        let trigger = self.evaluate_rules();
        SessionTick { report, trigger }
    }

    fn trigger_allowed(&self, result: &RuleResult) -> bool {
        match &self.last_trigger {
            None => true,
            Some((last_sec, last_rule)) => {
                let elapsed = self.state.elapsed_sec - last_sec;
                elapsed >= self.rules.params().evaluation_interval_sec
                    || (result.severity == RuleSeverity::Critical && *last_rule != result.rule_id)
            }
        }
    }

    fn evaluate_rules(&mut self) -> Option<RuleResult> {
        let snapshot = RuleSnapshot::from_state(&self.state);
        let result = self
            .rules
            .evaluate_with_history(&snapshot, Some(&self.state.scenario), &self.fired_rules)?;

        // Held back triggers leave once-rules eligible
        if !self.trigger_allowed(&result) {
            return None;
        }

        log::info!("Rule {} ({}): {}", result.rule_id, result.severity.as_str(), result.message);
        self.last_trigger = Some((self.state.elapsed_sec, result.rule_id.clone()));
        self.fired_rules.insert(result.rule_id.clone());
        self.messages.push(CoachingMessage {
            epoch: self.epoch,
            rule_id: result.rule_id.clone(),
            message: result.message.clone(),
            severity: Some(result.severity),
            source: MessageSource::Rule,
            time_sec: self.state.elapsed_sec,
        });
        Some(result)
    }

    /// Restart the level, optionally with a different scenario.
    ///
    /// Coaching answers requested before the reset are discarded on merge.
    pub fn reset(&mut self, scenario: Option<TumorScenario>) {
        let scenario = scenario.unwrap_or_else(|| self.state.scenario.clone());
        self.epoch += 1;
        self.engine.reset(self.seed);
        self.state = self.engine.new_game(scenario);
        self.fired_rules.clear();
        self.last_trigger = None;
        self.messages.clear();
        log::info!("Session reset (epoch {}), scenario '{}'", self.epoch, self.state.scenario.name);
    }

    /// Package a trigger for an external coach.
    pub fn coaching_request(&self, trigger: &RuleResult) -> CoachingRequest {
        CoachingRequest {
            epoch: self.epoch,
            trigger: trigger.clone(),
            context: CoachingContext::from_state(&self.state),
        }
    }

    /// Log a coach answer unless it belongs to an earlier epoch.
    pub fn merge_coaching_response(&mut self, response: CoachingResponse) -> bool {
        if response.epoch != self.epoch {
            log::debug!(
                "Discarding stale coaching for {} (epoch {} != {})",
                response.rule_id,
                response.epoch,
                self.epoch
            );
            return false;
        }
        self.messages.push(CoachingMessage {
            epoch: response.epoch,
            rule_id: response.rule_id,
            message: response.message,
            severity: None,
            source: MessageSource::Coach,
            time_sec: self.state.elapsed_sec,
        });
        true
    }

    /// Ask `provider` about `trigger` and merge the answer. Returns whether a
    /// message was added.
    pub fn request_coaching<C: CoachingProvider + ?Sized>(&mut self, provider: &mut C, trigger: &RuleResult) -> bool {
        let request = self.coaching_request(trigger);
        match provider.coach(&request) {
            Some(response) => self.merge_coaching_response(response),
            None => false,
        }
    }
}
