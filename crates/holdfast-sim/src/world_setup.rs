//! Entity spawn factories for setting up the simulation world.
//!
//! Creates capture points (with their key/secondary overlays) and demo
//! actors with the appropriate component bundles.

use hecs::{EntityBuilder, World};

use holdfast_core::components::*;
use holdfast_core::enums::PointKind;

use crate::scenario::{ActorConfig, PointConfig};

/// Spawn a capture point. The config must already be validated.
///
/// Key points seeded with an owner start locked; a neutral key point has
/// nobody for the lock to protect and starts open.
pub fn spawn_point(world: &mut World, id: PointId, config: &PointConfig) -> hecs::Entity {
    let mut point = CapturePoint::new(
        config.radius,
        config.capture_time,
        config.reset_time,
        config.allowed.iter().copied().collect(),
        config.owner,
    );
    point.animate = config.animate;

    let mut builder = EntityBuilder::new();
    builder.add(id);
    builder.add(PointName(config.name.clone()));
    builder.add(config.position);
    builder.add(point);
    match config.kind {
        PointKind::Ordinary => {}
        PointKind::Key => {
            builder.add(KeyPoint {
                is_locked: config.owner.is_some(),
                has_captured_once: false,
            });
        }
        PointKind::Secondary => {
            builder.add(SecondaryPoint);
        }
    }
    world.spawn(builder.build())
}

/// Spawn an actor that counts toward presence at any point it stands on.
pub fn spawn_actor(world: &mut World, config: &ActorConfig) -> hecs::Entity {
    let member = FactionMember {
        factions: config.factions.clone(),
    };
    if config.wander_radius > 0.0 {
        world.spawn((
            Actor,
            config.position,
            member,
            Wander {
                home: config.position,
                radius: config.wander_radius,
                speed: config.speed,
            },
        ))
    } else {
        world.spawn((Actor, config.position, member))
    }
}
