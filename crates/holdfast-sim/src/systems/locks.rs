//! Lock coordinator: keeps each key point locked while its owner still
//! holds a secondary point.
//!
//! Runs before any point advances, against an `OwnershipCensus` taken
//! once per tick, so every lock decision sees the same world.

use std::collections::BTreeMap;

use hecs::World;
use log::{info, warn};

use holdfast_capture::fsm;
use holdfast_core::components::{CapturePoint, KeyPoint, PointId, SecondaryPoint};
use holdfast_core::enums::FactionId;
use holdfast_core::events::PointEvent;

use crate::ledger::SecondaryLossLedger;
use crate::systems::capture::CaptureRecord;

/// Who owns what at the start of a tick. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipCensus {
    secondary: BTreeMap<FactionId, u32>,
    points: BTreeMap<FactionId, u32>,
}

impl OwnershipCensus {
    pub fn build(world: &World) -> Self {
        let mut census = OwnershipCensus::default();
        for (_entity, (point, secondary)) in world
            .query::<(&CapturePoint, Option<&SecondaryPoint>)>()
            .iter()
        {
            let Some(owner) = point.owning_faction else {
                continue;
            };
            *census.points.entry(owner).or_insert(0) += 1;
            if secondary.is_some() {
                *census.secondary.entry(owner).or_insert(0) += 1;
            }
        }
        census
    }

    /// Secondary points currently held by `faction`.
    pub fn secondary_count(&self, faction: FactionId) -> u32 {
        self.secondary.get(&faction).copied().unwrap_or(0)
    }

    /// The only faction other than `excluded` holding any point, if exactly one does.
    pub fn sole_other_owner(&self, excluded: FactionId) -> Option<FactionId> {
        let mut others = self
            .points
            .iter()
            .filter(|(faction, count)| **faction != excluded && **count > 0)
            .map(|(faction, _)| *faction);
        match (others.next(), others.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}

/// Lock or unlock every key point that has never been captured.
///
/// Unlocking emits `KeyPointUnlocked` when the attacker can be named; the
/// unlock happens either way. Re-locking a point mid-contest drops it back
/// to its owner's full flag.
pub fn run(
    world: &mut World,
    census: &OwnershipCensus,
    ledger: &SecondaryLossLedger,
    events: &mut Vec<PointEvent>,
) {
    for (_entity, (id, point, key)) in
        world.query_mut::<(&PointId, &mut CapturePoint, &mut KeyPoint)>()
    {
        if key.has_captured_once {
            continue;
        }
        let Some(owner) = point.owning_faction else {
            continue;
        };

        let secondaries = census.secondary_count(owner);
        if key.is_locked && secondaries == 0 {
            key.is_locked = false;
            let attacker = ledger
                .attacker_against(owner)
                .or_else(|| census.sole_other_owner(owner));
            match attacker {
                Some(attacker) => {
                    info!(
                        "key point {} unlocked: {} lost its last secondary point to {}",
                        id.0,
                        owner.id(),
                        attacker.id()
                    );
                    events.push(PointEvent::KeyPointUnlocked {
                        point: *id,
                        attacker,
                        defeated: owner,
                    });
                }
                None => warn!(
                    "key point {} unlocked but no attacker could be attributed for {}",
                    id.0,
                    owner.id()
                ),
            }
        } else if !key.is_locked && secondaries > 0 {
            key.is_locked = true;
            if point.state.is_contested() {
                fsm::reset(point);
            }
            info!("key point {} re-locked for {}", id.0, owner.id());
        }
    }
}

/// Fold this tick's capture results into lock bookkeeping: attribute lost
/// secondary points, and open a key point for good on its first capture.
pub fn record_outcomes(
    world: &mut World,
    records: &[CaptureRecord],
    ledger: &mut SecondaryLossLedger,
    events: &mut Vec<PointEvent>,
) {
    for record in records {
        if let Some(lowered) = record.outcome.lowered {
            if world.get::<&SecondaryPoint>(record.entity).is_ok() {
                ledger.record(lowered.previous_owner, lowered.by);
            }
        }

        let Some(captured) = record.outcome.captured else {
            continue;
        };
        let Ok(mut key) = world.get::<&mut KeyPoint>(record.entity) else {
            continue;
        };
        if key.has_captured_once {
            continue;
        }
        key.has_captured_once = true;
        key.is_locked = false;

        match captured.previous_owner {
            Some(defeated) if defeated != captured.faction => {
                info!(
                    "decisive victory at key point {}: {} defeated {}",
                    record.point.0,
                    captured.faction.id(),
                    defeated.id()
                );
                events.push(PointEvent::DecisiveVictory {
                    point: record.point,
                    attacker: captured.faction,
                    defeated,
                });
            }
            _ => warn!(
                "key point {} taken by {} with no defeated faction on record",
                record.point.0,
                captured.faction.id()
            ),
        }
    }
}
