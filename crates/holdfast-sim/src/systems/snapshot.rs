//! Snapshot system: queries the ECS world and builds a `TerritorySnapshot`.
//!
//! This system is read-only. It never modifies the world.

use hecs::World;

use holdfast_capture::presentation::{active_faction, flag_asset, flag_stage};
use holdfast_core::components::*;
use holdfast_core::events::PointEvent;
use holdfast_core::state::*;
use holdfast_core::types::{Position, SimTime};

/// Build a complete snapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    paused: bool,
    events: Vec<PointEvent>,
) -> TerritorySnapshot {
    TerritorySnapshot {
        time: *time,
        paused,
        presentation: build_presentation(world),
        key_points: build_key_points(world),
        events,
    }
}

/// One presentation entry per unlocked point, in point order.
fn build_presentation(world: &World) -> Vec<PresentationSnapshot> {
    let mut views: Vec<PresentationSnapshot> = world
        .query::<(&PointId, &PointName, &Position, &CapturePoint, Option<&KeyPoint>)>()
        .iter()
        .filter(|(_, (_, _, _, _, key))| !key.is_some_and(|key| key.is_locked))
        .map(|(_, (id, name, pos, point, _))| PresentationSnapshot {
            point: *id,
            name: name.0.clone(),
            position: *pos,
            state: point.state,
            progress: point.progress,
            active_faction: active_faction(point),
            animate: point.animate,
            flag_stage: flag_stage(point.state, point.progress),
            flag_asset: flag_asset(point).to_string(),
        })
        .collect();
    views.sort_by_key(|view| view.point);
    views
}

fn build_key_points(world: &World) -> Vec<KeyPointView> {
    let mut views: Vec<KeyPointView> = world
        .query::<(&PointId, &CapturePoint, &KeyPoint)>()
        .iter()
        .map(|(_, (id, point, key))| KeyPointView {
            point: *id,
            owner: point.owning_faction,
            locked: key.is_locked,
            has_captured_once: key.has_captured_once,
        })
        .collect();
    views.sort_by_key(|view| view.point);
    views
}
