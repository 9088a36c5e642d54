//! Wander system: random walk for demo actors on a leash around their home.
//!
//! Not part of the capture pass. Drivers that want moving actors call it
//! between ticks; the engine itself never moves anyone.

use std::f64::consts::TAU;

use glam::DVec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use holdfast_core::components::{Actor, Wander};
use holdfast_core::types::Position;

/// Move every wandering actor one random step of `speed * dt`, pulling it
/// back onto its leash if the step would leave it.
pub fn run(world: &mut World, rng: &mut ChaCha8Rng, dt: f64) {
    for (_entity, (_actor, pos, wander)) in world.query_mut::<(&Actor, &mut Position, &Wander)>() {
        let heading: f64 = rng.gen_range(0.0..TAU);
        let step = DVec2::from_angle(heading) * wander.speed * dt;
        let home = DVec2::from(wander.home);
        let offset = DVec2::from(*pos) + step - home;
        *pos = Position::from(home + offset.clamp_length_max(wander.radius));
    }
}
