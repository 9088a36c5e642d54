//! Events emitted by the simulation for presentation and announcement layers.

use serde::{Deserialize, Serialize};

use crate::components::PointId;
use crate::enums::FactionId;

/// Notable territorial changes, emitted at most once per occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PointEvent {
    /// A flag was fully raised.
    PointCaptured {
        point: PointId,
        faction: FactionId,
        /// Owner that lost the point on the way, if it was taken from someone.
        previous_owner: Option<FactionId>,
    },
    /// An owner's flag was lowered to the ground.
    FlagLowered {
        point: PointId,
        previous_owner: FactionId,
        by: FactionId,
    },
    /// A key point became contestable because its owner lost every secondary point.
    KeyPointUnlocked {
        point: PointId,
        attacker: FactionId,
        defeated: FactionId,
    },
    /// A key point fell for the first time.
    DecisiveVictory {
        point: PointId,
        attacker: FactionId,
        defeated: FactionId,
    },
}

impl PointEvent {
    pub fn point(&self) -> PointId {
        match self {
            PointEvent::PointCaptured { point, .. }
            | PointEvent::FlagLowered { point, .. }
            | PointEvent::KeyPointUnlocked { point, .. }
            | PointEvent::DecisiveVictory { point, .. } => *point,
        }
    }

    /// Default English announcement text.
    pub fn announcement(&self) -> String {
        match self {
            PointEvent::PointCaptured { faction, .. } => {
                format!("Point captured by {faction}!")
            }
            PointEvent::FlagLowered { previous_owner, .. } => {
                format!("The {previous_owner} flag has been lowered!")
            }
            PointEvent::KeyPointUnlocked {
                attacker, defeated, ..
            } => {
                format!("{defeated} has lost its last outpost. {attacker} can now assault its stronghold!")
            }
            PointEvent::DecisiveVictory {
                attacker, defeated, ..
            } => {
                format!("Decisive victory! {attacker} has taken the stronghold of {defeated}!")
            }
        }
    }
}
