//! Commands sent to the simulation from a driver or operator.
//!
//! Commands are queued and applied at the next tick boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    /// Stop advancing points and time.
    Pause,
    /// Resume after a pause.
    Resume,
    /// Real-time speed multiplier (1.0 = normal). Does not change the tick interval.
    SetTimeScale { scale: f64 },
}
