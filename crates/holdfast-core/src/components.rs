//! ECS components for hecs entities.
//!
//! Components are plain data. Capture logic lives in `holdfast-capture`,
//! cross-point logic in the simulation systems.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Position;

/// Eligible-actor count per faction present at a point this tick.
pub type FactionCounts = BTreeMap<FactionId, u32>;

/// Set of factions allowed to interact with a point.
pub type FactionSet = BTreeSet<FactionId>;

/// Stable identifier of a capture point, assigned in creation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PointId(pub u32);

/// Display name of a point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointName(pub String);

/// A territorial control point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturePoint {
    /// Influence radius around the point.
    pub radius: f64,
    /// Seconds of uncontested dominant presence to fully raise or lower a flag.
    pub capture_time: f64,
    /// Seconds an empty contested zone waits before collapsing to its stable state.
    pub reset_time: f64,
    /// Factions eligible to interact with this point.
    pub allowed: FactionSet,
    /// Current holder. `None` while neutral.
    pub owning_faction: Option<FactionId>,
    /// Faction mid-transition. `Some` exactly while contested.
    pub capturing_faction: Option<FactionId>,
    /// Owner whose flag stood when the current (or last) lowering began.
    #[serde(default)]
    pub original_owner: Option<FactionId>,
    pub state: CaptureState,
    /// Fraction of the flag raised (0.0 to 1.0).
    /// Lowering an enemy flag: 1.0 -> 0.0. Raising a new flag: 0.0 -> 1.0.
    pub progress: f64,
    /// Seconds the zone has been empty while contested.
    pub reset_accumulator: f64,
    /// Cosmetic: animate the flag once fully raised.
    pub animate: bool,
}

impl CapturePoint {
    /// Create a point in its initial stable state: Owned at full progress if
    /// seeded with an owner, otherwise Neutral.
    pub fn new(
        radius: f64,
        capture_time: f64,
        reset_time: f64,
        allowed: FactionSet,
        owner: Option<FactionId>,
    ) -> Self {
        let (state, progress) = match owner {
            Some(_) => (CaptureState::Owned, 1.0),
            None => (CaptureState::Neutral, 0.0),
        };
        Self {
            radius,
            capture_time,
            reset_time,
            allowed,
            owning_faction: owner,
            capturing_faction: None,
            original_owner: None,
            state,
            progress,
            reset_accumulator: 0.0,
            animate: true,
        }
    }
}

/// Key point overlay: contestable only once its owner has lost every secondary point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KeyPoint {
    pub is_locked: bool,
    /// Set by the first successful capture; suppresses repeat victory notices.
    pub has_captured_once: bool,
}

/// Marks a point as secondary. Secondary ownership gates key point locks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SecondaryPoint;

/// Faction memberships of an actor. An actor counts once for each faction it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionMember {
    pub factions: Vec<FactionId>,
}

/// Marks an entity as a mobile actor that can stand on points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Actor;

/// Random-walk leash for demo actors: they drift around `home` at `speed`
/// without leaving `radius`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Wander {
    pub home: Position,
    pub radius: f64,
    pub speed: f64,
}
