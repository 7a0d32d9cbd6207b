//! Medial wall integrity state.
//!
//! Each side of the sella carries three vertical zones whose integrity starts
//! at 1.0 (intact) and only ever decreases toward 0.0 (removed). The per-side
//! aggregate is kept equal to the mean of its zones after every mutation,
//! so mutation goes through [`MedialWallState::erode`].

use serde::{Deserialize, Serialize};

use super::endoscope::{Technique, ToolType};
use crate::geometry::Side;

/// Vertical band of the medial wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallZone {
    Superior,
    Middle,
    Inferior,
}

impl WallZone {
    pub const ALL: [WallZone; 3] = [WallZone::Superior, WallZone::Middle, WallZone::Inferior];

    pub fn as_str(self) -> &'static str {
        match self {
            WallZone::Superior => "superior",
            WallZone::Middle => "middle",
            WallZone::Inferior => "inferior",
        }
    }
}

/// Integrity of the three zones on one side, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallInteractionZone {
    pub superior: f32,
    pub middle: f32,
    pub inferior: f32,
}

impl Default for WallInteractionZone {
    fn default() -> Self {
        Self {
            superior: 1.0,
            middle: 1.0,
            inferior: 1.0,
        }
    }
}

impl WallInteractionZone {
    pub fn get(&self, zone: WallZone) -> f32 {
        match zone {
            WallZone::Superior => self.superior,
            WallZone::Middle => self.middle,
            WallZone::Inferior => self.inferior,
        }
    }

    fn get_mut(&mut self, zone: WallZone) -> &mut f32 {
        match zone {
            WallZone::Superior => &mut self.superior,
            WallZone::Middle => &mut self.middle,
            WallZone::Inferior => &mut self.inferior,
        }
    }

    pub fn mean(&self) -> f32 {
        (self.superior + self.middle + self.inferior) / 3.0
    }
}

/// Integrity of both medial walls plus the history the rule engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedialWallState {
    left_zones: WallInteractionZone,
    right_zones: WallInteractionZone,
    left_integrity: f32,
    right_integrity: f32,
    /// Technique of the most recent interaction
    pub technique: Option<Technique>,
    /// Instrument of the most recent interaction
    pub last_tool_used: Option<ToolType>,
    /// Number of successful tool-wall interactions
    pub interaction_count: u32,
}

impl Default for MedialWallState {
    fn default() -> Self {
        Self {
            left_zones: WallInteractionZone::default(),
            right_zones: WallInteractionZone::default(),
            left_integrity: 1.0,
            right_integrity: 1.0,
            technique: None,
            last_tool_used: None,
            interaction_count: 0,
        }
    }
}

impl MedialWallState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zones(&self, side: Side) -> &WallInteractionZone {
        match side {
            Side::Left => &self.left_zones,
            Side::Right => &self.right_zones,
        }
    }

    /// Aggregate integrity of one side (mean of its zones).
    pub fn integrity(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.left_integrity,
            Side::Right => self.right_integrity,
        }
    }

    pub fn zone_integrity(&self, side: Side, zone: WallZone) -> f32 {
        self.zones(side).get(zone)
    }

    /// Remove up to `amount` integrity from one zone.
    ///
    /// Non-positive or non-finite amounts are ignored. Returns the integrity
    /// actually removed (less than `amount` when the zone bottoms out).
    pub fn erode(&mut self, side: Side, zone: WallZone, amount: f32) -> f32 {
        if !(amount.is_finite() && amount > 0.0) {
            return 0.0;
        }
        let (zones, aggregate) = match side {
            Side::Left => (&mut self.left_zones, &mut self.left_integrity),
            Side::Right => (&mut self.right_zones, &mut self.right_integrity),
        };
        let value = zones.get_mut(zone);
        let before = *value;
        *value = (before - amount).max(0.0);
        let removed = before - *value;
        *aggregate = zones.mean();
        removed
    }

    /// Record the instrument used for the latest interaction.
    pub fn record_interaction(&mut self, tool: ToolType) {
        self.technique = tool.technique().or(self.technique);
        self.last_tool_used = Some(tool);
        self.interaction_count = self.interaction_count.saturating_add(1);
    }

    /// Fraction of the total medial wall removed, as a percentage.
    pub fn resection_percent(&self) -> f32 {
        let remaining = (self.left_integrity + self.right_integrity) / 2.0;
        ((1.0 - remaining) * 100.0).clamp(0.0, 100.0)
    }

    /// Resection extent once work on the wall has started, otherwise `None`.
    pub fn resection_extent(&self) -> Option<f32> {
        (self.interaction_count > 0).then(|| self.resection_percent())
    }

    /// Both walls still essentially intact.
    pub fn is_intact(&self, threshold: f32) -> bool {
        self.left_integrity > threshold && self.right_integrity > threshold
    }
}
