//! Faction presence sampling.
//!
//! The capture systems never look for actors themselves; they ask a
//! `PresenceSampler` how many actors of each faction stand inside a
//! point's radius. The engine drops counts for factions the point does
//! not allow, so samplers may over-report.

use std::collections::BTreeMap;

use hecs::World;

use holdfast_core::components::{Actor, FactionCounts, FactionMember, FactionSet, PointId};
use holdfast_core::enums::FactionId;
use holdfast_core::types::Position;

/// What a sampler is asked about one point.
#[derive(Debug, Clone, Copy)]
pub struct PresenceProbe<'a> {
    pub point: PointId,
    pub position: Position,
    pub radius: f64,
    pub allowed: &'a FactionSet,
}

pub trait PresenceSampler {
    /// Count actors per faction currently inside the probe's radius.
    fn sample(&mut self, world: &World, probe: &PresenceProbe<'_>) -> FactionCounts;
}

/// Counts `Actor` entities in the world. An actor in several factions
/// counts once for each of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActorPresence;

impl PresenceSampler for ActorPresence {
    fn sample(&mut self, world: &World, probe: &PresenceProbe<'_>) -> FactionCounts {
        let mut counts = FactionCounts::new();
        for (_entity, (_actor, pos, member)) in
            world.query::<(&Actor, &Position, &FactionMember)>().iter()
        {
            if !probe.position.within(pos, probe.radius) {
                continue;
            }
            for faction in &member.factions {
                if probe.allowed.contains(faction) {
                    *counts.entry(*faction).or_insert(0) += 1;
                }
            }
        }
        counts
    }
}

/// Fixed per-point counts, set from outside. Points without an entry are empty.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPresence {
    counts: BTreeMap<PointId, FactionCounts>,
}

impl ScriptedPresence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, point: PointId, faction: FactionId, count: u32) {
        self.counts.entry(point).or_default().insert(faction, count);
    }

    /// Replace everything present at `point`.
    pub fn set_all(&mut self, point: PointId, entries: &[(FactionId, u32)]) {
        self.counts.insert(point, entries.iter().copied().collect());
    }

    pub fn clear(&mut self, point: PointId) {
        self.counts.remove(&point);
    }
}

impl PresenceSampler for ScriptedPresence {
    fn sample(&mut self, _world: &World, probe: &PresenceProbe<'_>) -> FactionCounts {
        self.counts.get(&probe.point).cloned().unwrap_or_default()
    }
}
