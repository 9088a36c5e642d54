//! Enumeration types used throughout the simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A faction that can hold territory.
///
/// The declaration order is the canonical total order: when two factions
/// tie for presence at a point, the one declared first wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FactionId {
    #[serde(rename = "NCR")]
    Ncr,
    BrotherhoodMidwest,
    CaesarLegion,
    Tribal,
}

impl FactionId {
    /// Every faction, in canonical order.
    pub const ALL: [FactionId; 4] = [
        FactionId::Ncr,
        FactionId::BrotherhoodMidwest,
        FactionId::CaesarLegion,
        FactionId::Tribal,
    ];

    /// Stable identifier used in configuration files and on the wire.
    pub fn id(self) -> &'static str {
        match self {
            FactionId::Ncr => "NCR",
            FactionId::BrotherhoodMidwest => "BrotherhoodMidwest",
            FactionId::CaesarLegion => "CaesarLegion",
            FactionId::Tribal => "Tribal",
        }
    }

    /// Human-readable name for announcements.
    pub fn display_name(self) -> &'static str {
        match self {
            FactionId::Ncr => "NCR",
            FactionId::BrotherhoodMidwest => "Brotherhood of Steel",
            FactionId::CaesarLegion => "Caesar's Legion",
            FactionId::Tribal => "Tribe",
        }
    }

    /// Flag asset this faction's flag is drawn with.
    pub fn flag_asset(self) -> &'static str {
        match self {
            FactionId::Ncr => "flags/ncr",
            FactionId::BrotherhoodMidwest => "flags/bos",
            FactionId::CaesarLegion => "flags/legion",
            FactionId::Tribal => "flags/tribe",
        }
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Capture state of a point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureState {
    /// Nobody holds the point and nobody is raising a flag.
    #[default]
    Neutral,
    /// Flag fully raised by the owning faction.
    Owned,
    /// A faction is raising its flag from empty.
    ContestedRaising,
    /// An enemy faction is lowering the owner's flag.
    ContestedLowering,
}

impl CaptureState {
    /// Neutral and Owned are stable: no active transition, no reset timer.
    pub fn is_stable(self) -> bool {
        matches!(self, CaptureState::Neutral | CaptureState::Owned)
    }

    pub fn is_contested(self) -> bool {
        !self.is_stable()
    }
}

/// How far up the pole a flag is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagStage {
    #[default]
    Empty,
    Bottom,
    Middle,
    Top,
}

/// Role a point plays in the lock hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    /// Plain contestable point.
    #[default]
    Ordinary,
    /// Locked while its owner still holds a secondary point.
    Key,
    /// Ownership of these gates the owner's key point.
    Secondary,
}
