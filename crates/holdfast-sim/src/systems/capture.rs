//! Capture system: samples presence at every unlocked point and advances
//! its state machine by one tick.
//!
//! Calls the capture FSM from holdfast-capture, then turns finished
//! captures and lowerings into events.

use hecs::World;
use log::{debug, info};

use holdfast_capture::fsm::{self, StepOutcome};
use holdfast_core::components::{CapturePoint, FactionCounts, FactionSet, KeyPoint, PointId};
use holdfast_core::events::PointEvent;
use holdfast_core::types::Position;

use crate::presence::{PresenceProbe, PresenceSampler};

/// A point whose step did something worth reporting.
#[derive(Debug, Clone, Copy)]
pub struct CaptureRecord {
    pub entity: hecs::Entity,
    pub point: PointId,
    pub outcome: StepOutcome,
}

/// Run the capture system. Locked key points are skipped entirely.
pub fn run(
    world: &mut World,
    sampler: &mut dyn PresenceSampler,
    dt: f64,
    events: &mut Vec<PointEvent>,
) -> Vec<CaptureRecord> {
    // Sample every point before any of them moves.
    let mut inputs: Vec<(hecs::Entity, PointId, Position, f64, FactionSet)> = world
        .query::<(&PointId, &Position, &CapturePoint, Option<&KeyPoint>)>()
        .iter()
        .filter(|(_, (_, _, _, key))| !key.is_some_and(|key| key.is_locked))
        .map(|(entity, (id, pos, point, _))| {
            (entity, *id, *pos, point.radius, point.allowed.clone())
        })
        .collect();
    inputs.sort_by_key(|(_, id, ..)| *id);

    let sampled: Vec<(hecs::Entity, PointId, FactionCounts)> = inputs
        .iter()
        .map(|(entity, id, position, radius, allowed)| {
            let probe = PresenceProbe {
                point: *id,
                position: *position,
                radius: *radius,
                allowed,
            };
            (*entity, *id, sampler.sample(world, &probe))
        })
        .collect();

    // Apply updates
    let mut records = Vec::new();
    for (entity, id, counts) in sampled {
        let Ok(mut point) = world.get::<&mut CapturePoint>(entity) else {
            continue;
        };
        let before = point.state;
        let outcome = fsm::step(&mut point, &counts, dt);
        if before != point.state {
            debug!("point {}: {:?} -> {:?}", id.0, before, point.state);
        }

        if let Some(lowered) = outcome.lowered {
            info!(
                "point {}: {} flag lowered by {}",
                id.0,
                lowered.previous_owner.id(),
                lowered.by.id()
            );
            events.push(PointEvent::FlagLowered {
                point: id,
                previous_owner: lowered.previous_owner,
                by: lowered.by,
            });
        }
        if let Some(captured) = outcome.captured {
            info!("point {}: captured by {}", id.0, captured.faction.id());
            events.push(PointEvent::PointCaptured {
                point: id,
                faction: captured.faction,
                previous_owner: captured.previous_owner,
            });
        }

        if outcome != StepOutcome::default() {
            records.push(CaptureRecord {
                entity,
                point: id,
                outcome,
            });
        }
    }
    records
}
