//! Attribution of secondary point losses.
//!
//! Stored in `SimulationEngine`, NOT as ECS components. Records who
//! actually took each faction's secondary points so that a key point
//! unlock names the real attacker instead of guessing after the fact.

use std::collections::BTreeMap;

use holdfast_core::enums::FactionId;

#[derive(Debug, Clone, Default)]
pub struct SecondaryLossLedger {
    /// Defeated faction -> faction that lowered its most recently lost secondary point.
    last_taken_by: BTreeMap<FactionId, FactionId>,
}

impl SecondaryLossLedger {
    pub fn record(&mut self, defeated: FactionId, attacker: FactionId) {
        self.last_taken_by.insert(defeated, attacker);
    }

    pub fn attacker_against(&self, defeated: FactionId) -> Option<FactionId> {
        self.last_taken_by.get(&defeated).copied()
    }
}
