//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are plain functions over `&mut World` (or `&World` when
//! read-only). Point state lives in components; cross-tick bookkeeping
//! lives in the engine and is passed in explicitly.

pub mod capture;
pub mod locks;
pub mod snapshot;
pub mod wander;
