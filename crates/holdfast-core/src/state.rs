//! Territory snapshot: the visible state published after each tick.

use serde::{Deserialize, Serialize};

use crate::components::PointId;
use crate::enums::*;
use crate::events::PointEvent;
use crate::types::{Position, SimTime};

/// Everything a presentation layer needs to draw one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationSnapshot {
    pub point: PointId,
    pub name: String,
    pub position: Position,
    pub state: CaptureState,
    pub progress: f64,
    /// Faction whose flag is on the pole (or going up/down it).
    pub active_faction: Option<FactionId>,
    pub animate: bool,
    pub flag_stage: FlagStage,
    pub flag_asset: String,
}

/// Lock status of a key point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPointView {
    pub point: PointId,
    pub owner: Option<FactionId>,
    pub locked: bool,
    pub has_captured_once: bool,
}

/// Complete territory state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerritorySnapshot {
    pub time: SimTime,
    pub paused: bool,
    /// One entry per unlocked point.
    pub presentation: Vec<PresentationSnapshot>,
    pub key_points: Vec<KeyPointView>,
    /// Events raised during this tick, in causal order.
    pub events: Vec<PointEvent>,
}

impl TerritorySnapshot {
    pub fn point(&self, id: PointId) -> Option<&PresentationSnapshot> {
        self.presentation.iter().find(|view| view.point == id)
    }

    pub fn key_point(&self, id: PointId) -> Option<&KeyPointView> {
        self.key_points.iter().find(|view| view.point == id)
    }
}
