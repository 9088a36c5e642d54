//! Capture logic for HOLDFAST.
//!
//! Implements the per-point capture state machine and the derivation of
//! what a presentation layer should draw for a point.

pub mod fsm;
pub mod presentation;

pub use holdfast_core as core;
