//! Capture point finite state machine.
//!
//! Pure functions over a single `CapturePoint`. The caller supplies the
//! per-faction presence counts for this tick and the tick length; nothing
//! here reads other points or the ECS.

use holdfast_core::components::{CapturePoint, FactionCounts};
use holdfast_core::enums::{CaptureState, FactionId};

/// Slack applied when comparing accumulated progress and timers against
/// their thresholds, so that `capture_time / dt` ticks always complete.
pub const PROGRESS_EPSILON: f64 = 1e-9;

/// A flag reached the top of the pole this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Captured {
    pub faction: FactionId,
    /// Owner whose flag was lowered on the way, if any.
    pub previous_owner: Option<FactionId>,
}

/// An owner's flag reached the ground this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lowered {
    pub previous_owner: FactionId,
    pub by: FactionId,
}

/// Result of advancing one point by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepOutcome {
    pub captured: Option<Captured>,
    pub lowered: Option<Lowered>,
    /// The point fell back to its last stable state this step.
    pub reset: bool,
}

/// Advance `point` by `dt` seconds given this tick's presence counts.
///
/// Counts for factions outside the point's allowed set, and zero counts,
/// are ignored.
pub fn step(point: &mut CapturePoint, counts: &FactionCounts, dt: f64) -> StepOutcome {
    let mut present: FactionCounts = counts
        .iter()
        .filter(|(faction, count)| **count > 0 && point.allowed.contains(faction))
        .map(|(faction, count)| (*faction, *count))
        .collect();

    // Any defender on the point blocks every attacker outright.
    if let Some(owner) = point.owning_faction {
        if present.remove(&owner).is_some() && !present.is_empty() {
            reset(point);
            return StepOutcome {
                reset: true,
                ..StepOutcome::default()
            };
        }
    }

    let Some(dominant) = dominant_faction(&present) else {
        return handle_empty_zone(point, dt);
    };

    point.reset_accumulator = 0.0;

    let outcome = match point.state {
        CaptureState::Neutral => {
            point.state = CaptureState::ContestedRaising;
            point.capturing_faction = Some(dominant);
            raise(point, dominant, dt)
        }
        CaptureState::Owned => match point.owning_faction {
            Some(owner) if owner != dominant => {
                point.state = CaptureState::ContestedLowering;
                point.capturing_faction = Some(dominant);
                point.original_owner = Some(owner);
                lower(point, dominant, dt)
            }
            _ => StepOutcome::default(),
        },
        CaptureState::ContestedLowering => {
            if point.capturing_faction == Some(dominant) {
                lower(point, dominant, dt)
            } else {
                reset(point);
                StepOutcome {
                    reset: true,
                    ..StepOutcome::default()
                }
            }
        }
        CaptureState::ContestedRaising => {
            if point.capturing_faction == Some(dominant) {
                raise(point, dominant, dt)
            } else {
                reset(point);
                StepOutcome {
                    reset: true,
                    ..StepOutcome::default()
                }
            }
        }
    };

    point.progress = point.progress.clamp(0.0, 1.0);
    outcome
}

/// Restore the point to its last stable state: Owned at full progress if it
/// still has an owner, otherwise Neutral at zero.
pub fn reset(point: &mut CapturePoint) {
    match point.owning_faction {
        Some(_) => {
            point.state = CaptureState::Owned;
            point.progress = 1.0;
        }
        None => {
            point.state = CaptureState::Neutral;
            point.progress = 0.0;
        }
    }
    point.capturing_faction = None;
    point.reset_accumulator = 0.0;
}

/// The faction with the highest non-zero count. Ties go to the faction that
/// sorts first. `None` when nobody is present.
pub fn dominant_faction(counts: &FactionCounts) -> Option<FactionId> {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .fold(None, |best: Option<(FactionId, u32)>, (faction, count)| match best {
            // Iteration is in faction order; only a strictly higher count displaces the best.
            Some((_, best_count)) if best_count >= *count => best,
            _ => Some((*faction, *count)),
        })
        .map(|(faction, _)| faction)
}

/// Nobody decisive is on the point. Contested points drift back to their
/// stable state after `reset_time` seconds; stable points never accrue.
fn handle_empty_zone(point: &mut CapturePoint, dt: f64) -> StepOutcome {
    if point.state.is_stable() {
        return StepOutcome::default();
    }

    point.reset_accumulator += dt;
    if point.reset_accumulator + PROGRESS_EPSILON >= point.reset_time {
        reset(point);
        return StepOutcome {
            reset: true,
            ..StepOutcome::default()
        };
    }
    StepOutcome::default()
}

fn raise(point: &mut CapturePoint, faction: FactionId, dt: f64) -> StepOutcome {
    point.progress += dt / point.capture_time;

    if point.progress + PROGRESS_EPSILON >= 1.0 {
        // An owner retaking its own point after a timed-out lowering lost nothing.
        let previous_owner = point.original_owner.take().filter(|owner| *owner != faction);
        point.owning_faction = Some(faction);
        point.state = CaptureState::Owned;
        point.progress = 1.0;
        point.capturing_faction = None;
        return StepOutcome {
            captured: Some(Captured {
                faction,
                previous_owner,
            }),
            ..StepOutcome::default()
        };
    }
    StepOutcome::default()
}

fn lower(point: &mut CapturePoint, attacker: FactionId, dt: f64) -> StepOutcome {
    point.progress -= dt / point.capture_time;

    if point.progress - PROGRESS_EPSILON <= 0.0 {
        point.progress = 0.0;
        // Same attacker starts raising its own flag straight away.
        point.state = CaptureState::ContestedRaising;
        let lowered = point.owning_faction.take().map(|previous_owner| Lowered {
            previous_owner,
            by: attacker,
        });
        return StepOutcome {
            lowered,
            ..StepOutcome::default()
        };
    }
    StepOutcome::default()
}
