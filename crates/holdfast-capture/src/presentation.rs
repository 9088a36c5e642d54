//! What a renderer should show for a point.
//!
//! Read-only helpers; they never modify the point.

use holdfast_core::components::CapturePoint;
use holdfast_core::constants::*;
use holdfast_core::enums::{CaptureState, FactionId, FlagStage};

/// Faction whose flag is on the pole.
///
/// While lowering this is the owner whose flag is coming down, not the attacker.
pub fn active_faction(point: &CapturePoint) -> Option<FactionId> {
    match point.state {
        CaptureState::Neutral => None,
        CaptureState::Owned | CaptureState::ContestedLowering => point.owning_faction,
        CaptureState::ContestedRaising => point.capturing_faction,
    }
}

/// Map state and progress to one of the four drawable flag heights.
pub fn flag_stage(state: CaptureState, progress: f64) -> FlagStage {
    match state {
        CaptureState::Neutral => FlagStage::Empty,
        CaptureState::Owned => FlagStage::Top,
        CaptureState::ContestedRaising => {
            if progress <= FLAG_STAGE_EMPTY_MAX {
                FlagStage::Empty
            } else if progress < FLAG_STAGE_MIDDLE_MIN {
                FlagStage::Bottom
            } else if progress < FLAG_STAGE_TOP_MIN {
                FlagStage::Middle
            } else {
                FlagStage::Top
            }
        }
        CaptureState::ContestedLowering => {
            if progress >= FLAG_STAGE_TOP_MIN {
                FlagStage::Top
            } else if progress >= FLAG_STAGE_MIDDLE_MIN {
                FlagStage::Middle
            } else if progress > FLAG_STAGE_EMPTY_MAX {
                FlagStage::Bottom
            } else {
                FlagStage::Empty
            }
        }
    }
}

/// Asset to draw on the pole: the active faction's flag, or the bare flagpole.
pub fn flag_asset(point: &CapturePoint) -> &'static str {
    active_faction(point)
        .map(FactionId::flag_asset)
        .unwrap_or(EMPTY_FLAGPOLE_ASSET)
}
