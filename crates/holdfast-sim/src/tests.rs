//! Tests for the tick scheduler, lock coordinator, presence sampling and scenarios.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use holdfast_core::commands::SimCommand;
use holdfast_core::components::{FactionSet, PointId};
use holdfast_core::enums::*;
use holdfast_core::events::PointEvent;
use holdfast_core::state::TerritorySnapshot;
use holdfast_core::types::Position;

use crate::engine::{SimConfig, SimulationEngine};
use crate::presence::{ActorPresence, PresenceProbe, PresenceSampler, ScriptedPresence};
use crate::scenario::{ActorConfig, PointConfig, Scenario, ScenarioError};

const A: FactionId = FactionId::Ncr;
const B: FactionId = FactionId::CaesarLegion;
const C: FactionId = FactionId::Tribal;

fn engine() -> SimulationEngine {
    SimulationEngine::new(SimConfig::default())
}

fn point(name: &str, owner: Option<FactionId>, kind: PointKind) -> PointConfig {
    let mut config = PointConfig::new(name, Position::default(), &[A, B, C]).kind(kind);
    config.owner = owner;
    config
}

/// Run `ticks` ticks, returning every snapshot.
fn run(
    engine: &mut SimulationEngine,
    presence: &mut ScriptedPresence,
    ticks: usize,
) -> Vec<TerritorySnapshot> {
    (0..ticks).map(|_| engine.tick(presence)).collect()
}

fn events(snapshots: &[TerritorySnapshot]) -> Vec<PointEvent> {
    snapshots.iter().flat_map(|s| s.events.clone()).collect()
}

fn fortress(capture_time: f64) -> (SimulationEngine, PointId, PointId, PointId) {
    fortress_with(capture_time, capture_time)
}

/// Three-point hierarchy: key 0 and secondaries 1, 2, all held by A.
fn fortress_with(
    key_time: f64,
    capture_time: f64,
) -> (SimulationEngine, PointId, PointId, PointId) {
    let mut engine = engine();
    let key = engine
        .spawn_point(&point("Keep", Some(A), PointKind::Key).timings(key_time, 5.0))
        .unwrap();
    let west = engine
        .spawn_point(&point("West", Some(A), PointKind::Secondary).timings(capture_time, 5.0))
        .unwrap();
    let east = engine
        .spawn_point(&point("East", Some(A), PointKind::Secondary).timings(capture_time, 5.0))
        .unwrap();
    (engine, key, west, east)
}

// ---- Capture through the scheduler ----

#[test]
fn test_enemy_takes_owned_point() {
    let mut engine = engine();
    let id = engine
        .spawn_point(&point("Ridge", Some(A), PointKind::Ordinary))
        .unwrap();
    let mut presence = ScriptedPresence::new();
    presence.set(id, B, 1);

    let snaps = run(&mut engine, &mut presence, 180);
    assert_eq!(
        snaps[179].events,
        vec![PointEvent::FlagLowered {
            point: id,
            previous_owner: A,
            by: B
        }]
    );
    let view = snaps[179].point(id).unwrap();
    assert_eq!(view.state, CaptureState::ContestedRaising);
    assert_eq!(view.progress, 0.0);
    assert_eq!(view.active_faction, Some(B));

    let snaps = run(&mut engine, &mut presence, 180);
    assert!(snaps[..179].iter().all(|s| s.events.is_empty()));
    assert_eq!(
        snaps[179].events,
        vec![PointEvent::PointCaptured {
            point: id,
            faction: B,
            previous_owner: Some(A)
        }]
    );
    let captured = engine.point(id).unwrap();
    assert_eq!(captured.state, CaptureState::Owned);
    assert_eq!(captured.owning_faction, Some(B));
    assert_eq!(engine.time().tick, 360);
}

#[test]
fn test_interrupted_capture_times_out() {
    let mut engine = engine();
    let id = engine
        .spawn_point(&point("Well", None, PointKind::Ordinary))
        .unwrap();
    let mut presence = ScriptedPresence::new();

    presence.set(id, A, 1);
    run(&mut engine, &mut presence, 60);
    presence.clear(id);
    run(&mut engine, &mut presence, 10);
    assert!((engine.point(id).unwrap().reset_accumulator - 10.0).abs() < 1e-9);

    presence.set(id, A, 1);
    run(&mut engine, &mut presence, 20);
    let mid = engine.point(id).unwrap();
    assert_eq!(mid.reset_accumulator, 0.0);
    assert!((mid.progress - 80.0 / 180.0).abs() < 1e-9);

    presence.clear(id);
    let snaps = run(&mut engine, &mut presence, 40);
    assert_eq!(snaps[28].point(id).unwrap().state, CaptureState::ContestedRaising);
    assert_eq!(snaps[29].point(id).unwrap().state, CaptureState::Neutral);
    assert_eq!(engine.point(id).unwrap().progress, 0.0);
}

#[test]
fn test_disallowed_presence_filtered_by_engine() {
    let mut engine = engine();
    let id = engine
        .spawn_point(&PointConfig::new("Shack", Position::default(), &[A]))
        .unwrap();
    let mut presence = ScriptedPresence::new();
    presence.set(id, B, 50);
    run(&mut engine, &mut presence, 10);
    assert_eq!(engine.point(id).unwrap().state, CaptureState::Neutral);
}

#[test]
fn test_presentation_snapshot_fields() {
    let mut engine = engine();
    let id = engine
        .spawn_point(&point("Mast", Some(A), PointKind::Ordinary))
        .unwrap();
    let mut presence = ScriptedPresence::new();
    presence.set(id, B, 2);

    let snap = engine.tick(&mut presence);
    let view = snap.point(id).unwrap();
    assert_eq!(view.name, "Mast");
    assert_eq!(view.state, CaptureState::ContestedLowering);
    assert_eq!(view.active_faction, Some(A));
    assert_eq!(view.flag_stage, FlagStage::Top);
    assert_eq!(view.flag_asset, A.flag_asset());
    assert!(view.animate);
}

// ---- Key point locking ----

#[test]
fn test_locked_key_point_is_exempt() {
    let (mut engine, key, _, _) = fortress(10.0);
    let mut presence = ScriptedPresence::new();
    presence.set(key, B, 10);

    let snaps = run(&mut engine, &mut presence, 50);
    let keep = engine.point(key).unwrap();
    assert_eq!(keep.state, CaptureState::Owned);
    assert_eq!(keep.progress, 1.0);
    assert!(snaps.iter().all(|s| s.point(key).is_none()));
    assert!(snaps.iter().all(|s| s.key_point(key).unwrap().locked));
    assert!(events(&snaps).is_empty());
}

#[test]
fn test_losing_last_secondary_unlocks_key_then_decisive_victory() {
    let (mut engine, key, west, east) = fortress(10.0);
    let mut presence = ScriptedPresence::new();
    presence.set(west, B, 1);
    presence.set(east, C, 1);
    presence.set(key, B, 3);

    // West falls to B, East to C: both lowered on tick 10.
    let snaps = run(&mut engine, &mut presence, 10);
    assert!(snaps[9].key_point(key).unwrap().locked);

    // Next lock pass sees A without secondaries. East (C) was recorded last.
    let snap = engine.tick(&mut presence);
    assert!(!snap.key_point(key).unwrap().locked);
    let unlocked: Vec<_> = snap
        .events
        .iter()
        .filter(|e| matches!(e, PointEvent::KeyPointUnlocked { .. }))
        .cloned()
        .collect();
    assert_eq!(
        unlocked,
        vec![PointEvent::KeyPointUnlocked {
            point: key,
            attacker: C,
            defeated: A
        }]
    );
    // The key point advanced in the same tick it unlocked.
    assert_eq!(snap.point(key).unwrap().state, CaptureState::ContestedLowering);

    let snaps = run(&mut engine, &mut presence, 19);
    let all = events(&snaps);
    assert!(all.contains(&PointEvent::PointCaptured {
        point: key,
        faction: B,
        previous_owner: Some(A)
    }));
    assert!(all.contains(&PointEvent::DecisiveVictory {
        point: key,
        attacker: B,
        defeated: A
    }));
    let view = snaps.last().unwrap().key_point(key).unwrap();
    assert!(view.has_captured_once);
    assert!(!view.locked);
    assert_eq!(view.owner, Some(B));
}

#[test]
fn test_decisive_victory_fires_once() {
    let (mut engine, key, west, east) = fortress(5.0);
    let mut presence = ScriptedPresence::new();
    presence.set(west, B, 1);
    presence.set(east, B, 1);
    presence.set(key, B, 1);

    let mut all = events(&run(&mut engine, &mut presence, 30));
    assert_eq!(engine.point(key).unwrap().owning_faction, Some(B));

    // A retakes the keep, then B again.
    presence.set_all(key, &[(A, 1)]);
    all.extend(events(&run(&mut engine, &mut presence, 12)));
    assert_eq!(engine.point(key).unwrap().owning_faction, Some(A));
    presence.set_all(key, &[(B, 1)]);
    all.extend(events(&run(&mut engine, &mut presence, 12)));
    assert_eq!(engine.point(key).unwrap().owning_faction, Some(B));

    let victories = all
        .iter()
        .filter(|e| matches!(e, PointEvent::DecisiveVictory { .. }))
        .count();
    assert_eq!(victories, 1);
    let unlocks = all
        .iter()
        .filter(|e| matches!(e, PointEvent::KeyPointUnlocked { .. }))
        .count();
    assert_eq!(unlocks, 1);
    // Captured keys never lock again, even though B holds secondaries.
    assert!(!engine.key_point(key).unwrap().is_locked);
}

#[test]
fn test_regaining_secondary_relocks_and_resets_contest() {
    let (mut engine, key, west, east) = fortress_with(100.0, 10.0);
    let mut presence = ScriptedPresence::new();
    presence.set(west, B, 1);
    presence.set(east, B, 1);
    presence.set(key, B, 1);

    run(&mut engine, &mut presence, 14);
    let keep = engine.point(key).unwrap();
    assert_eq!(keep.state, CaptureState::ContestedLowering);

    // A drives B off West and raises its flag again.
    presence.set_all(west, &[(A, 1)]);
    let snaps = run(&mut engine, &mut presence, 11);
    assert_eq!(engine.point(west).unwrap().owning_faction, Some(A));
    assert!(snaps.last().unwrap().events.iter().any(|e| matches!(
        e,
        PointEvent::PointCaptured { faction: A, .. }
    )));

    // Next lock pass re-locks the keep and restores A's full flag.
    let snap = engine.tick(&mut presence);
    assert!(snap.key_point(key).unwrap().locked);
    let keep = engine.point(key).unwrap();
    assert_eq!(keep.state, CaptureState::Owned);
    assert_eq!(keep.progress, 1.0);
    assert!(keep.capturing_faction.is_none());
}

#[test]
fn test_unlock_attribution_falls_back_to_sole_rival() {
    let mut engine = engine();
    let key = engine
        .spawn_point(&point("Keep", Some(A), PointKind::Key))
        .unwrap();
    engine
        .spawn_point(&point("Farm", Some(B), PointKind::Ordinary))
        .unwrap();
    let mut presence = ScriptedPresence::new();

    let snap = engine.tick(&mut presence);
    assert_eq!(
        snap.events,
        vec![PointEvent::KeyPointUnlocked {
            point: key,
            attacker: B,
            defeated: A
        }]
    );
}

#[test]
fn test_unlock_without_attribution_skips_event() {
    let mut engine = engine();
    let key = engine
        .spawn_point(&point("Keep", Some(A), PointKind::Key))
        .unwrap();
    engine
        .spawn_point(&point("Farm", Some(B), PointKind::Ordinary))
        .unwrap();
    engine
        .spawn_point(&point("Mill", Some(C), PointKind::Ordinary))
        .unwrap();
    let mut presence = ScriptedPresence::new();

    let snap = engine.tick(&mut presence);
    assert!(snap.events.is_empty());
    assert!(!snap.key_point(key).unwrap().locked);
}

#[test]
fn test_neutral_key_point_starts_open() {
    let mut engine = engine();
    let key = engine
        .spawn_point(&point("Ruins", None, PointKind::Key).timings(5.0, 5.0))
        .unwrap();
    let mut presence = ScriptedPresence::new();
    presence.set(key, C, 1);

    let snaps = run(&mut engine, &mut presence, 5);
    assert!(!snaps[0].key_point(key).unwrap().locked);
    let all = events(&snaps);
    assert_eq!(
        all,
        vec![PointEvent::PointCaptured {
            point: key,
            faction: C,
            previous_owner: None
        }]
    );
    assert!(engine.key_point(key).unwrap().has_captured_once);
}

/// A key point owned by F is locked iff F held a secondary point when the
/// lock coordinator last ran, across random ownership churn.
#[test]
fn test_lock_invariant_under_random_secondary_churn() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut engine = engine();
    let keys: Vec<PointId> = [A, B]
        .iter()
        .map(|owner| {
            engine
                .spawn_point(&point("Keep", Some(*owner), PointKind::Key))
                .unwrap()
        })
        .collect();
    let secondaries: Vec<PointId> = (0..5)
        .map(|i| {
            let owner = if i % 2 == 0 { A } else { B };
            engine
                .spawn_point(&point("Post", Some(owner), PointKind::Secondary))
                .unwrap()
        })
        .collect();
    let mut presence = ScriptedPresence::new();

    for _ in 0..500 {
        for id in &secondaries {
            if rng.gen_bool(0.3) {
                let mut post = engine.point(*id).unwrap();
                let owner = match rng.gen_range(0..4) {
                    0 => None,
                    1 => Some(A),
                    2 => Some(B),
                    _ => Some(C),
                };
                post.owning_faction = owner;
                post.state = if owner.is_some() {
                    CaptureState::Owned
                } else {
                    CaptureState::Neutral
                };
                post.progress = if owner.is_some() { 1.0 } else { 0.0 };
                engine.set_point(*id, post);
            }
        }

        let held = |faction: FactionId| {
            secondaries
                .iter()
                .filter(|id| engine.point(**id).unwrap().owning_faction == Some(faction))
                .count()
        };
        let expected: Vec<bool> = keys
            .iter()
            .map(|key| {
                let owner = engine.point(*key).unwrap().owning_faction.unwrap();
                held(owner) > 0
            })
            .collect();

        let snap = engine.tick(&mut presence);
        for (key, locked) in keys.iter().zip(expected) {
            assert_eq!(snap.key_point(*key).unwrap().locked, locked);
        }
    }
}

// ---- Scheduler control ----

#[test]
fn test_pause_freezes_points_and_time() {
    let mut engine = engine();
    let id = engine
        .spawn_point(&point("Gate", None, PointKind::Ordinary))
        .unwrap();
    let mut presence = ScriptedPresence::new();
    presence.set(id, A, 1);

    run(&mut engine, &mut presence, 5);
    engine.queue_command(SimCommand::Pause);
    let snap = engine.tick(&mut presence);
    assert!(snap.paused);
    assert_eq!(snap.time.tick, 5);
    let frozen = engine.point(id).unwrap().progress;
    run(&mut engine, &mut presence, 10);
    assert_eq!(engine.point(id).unwrap().progress, frozen);

    engine.queue_command(SimCommand::Resume);
    let snap = engine.tick(&mut presence);
    assert!(!snap.paused);
    assert_eq!(snap.time.tick, 6);
    assert!(engine.point(id).unwrap().progress > frozen);
}

#[test]
fn test_time_scale_clamped() {
    let mut engine = engine();
    let mut presence = ScriptedPresence::new();
    engine.queue_commands([SimCommand::SetTimeScale { scale: 100.0 }]);
    engine.tick(&mut presence);
    assert_eq!(engine.time_scale(), 16.0);
    engine.queue_command(SimCommand::SetTimeScale { scale: -1.0 });
    engine.tick(&mut presence);
    assert_eq!(engine.time_scale(), 0.0);
}

#[test]
fn test_invalid_tick_interval_falls_back_to_default() {
    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let engine = SimulationEngine::new(SimConfig {
            tick_interval_secs: bad,
            ..Default::default()
        });
        assert_eq!(engine.tick_interval(), 1.0);
    }
}

#[test]
fn test_custom_tick_interval() {
    let mut engine = SimulationEngine::new(SimConfig {
        tick_interval_secs: 0.5,
        ..Default::default()
    });
    let id = engine
        .spawn_point(&point("Dune", None, PointKind::Ordinary).timings(10.0, 5.0))
        .unwrap();
    let mut presence = ScriptedPresence::new();
    presence.set(id, A, 1);

    let snaps = run(&mut engine, &mut presence, 20);
    assert!(snaps[18].events.is_empty());
    assert_eq!(snaps[19].events.len(), 1);
    assert!((engine.time().elapsed_secs - 10.0).abs() < 1e-9);
}

// ---- Presence ----

#[test]
fn test_actor_presence_counts_memberships_in_radius() {
    let mut engine = engine();
    let id = engine
        .spawn_point(&PointConfig::new("Camp", Position::new(10.0, 10.0), &[A, B]))
        .unwrap();
    let actor = |factions: &[FactionId], x: f64, y: f64| ActorConfig {
        factions: factions.to_vec(),
        position: Position::new(x, y),
        wander_radius: 0.0,
        speed: 0.0,
    };
    engine.spawn_actor(&actor(&[A], 10.0, 10.0));
    engine.spawn_actor(&actor(&[A, B], 14.0, 10.0));
    engine.spawn_actor(&actor(&[C], 10.0, 11.0));
    engine.spawn_actor(&actor(&[B], 30.0, 30.0));

    let allowed: FactionSet = [A, B].into_iter().collect();
    let probe = PresenceProbe {
        point: id,
        position: Position::new(10.0, 10.0),
        radius: 7.0,
        allowed: &allowed,
    };
    let counts = ActorPresence.sample(engine.world(), &probe);
    assert_eq!(counts.get(&A), Some(&2));
    assert_eq!(counts.get(&B), Some(&1));
    assert_eq!(counts.get(&C), None);
}

#[test]
fn test_wandering_actors_stay_on_leash() {
    let mut engine = engine();
    engine
        .spawn_point(&point("Pole", None, PointKind::Ordinary))
        .unwrap();
    let home = Position::new(5.0, -5.0);
    let entity = engine.spawn_actor(&ActorConfig {
        factions: vec![A],
        position: home,
        wander_radius: 3.0,
        speed: 2.0,
    });
    let mut moved = false;
    for _ in 0..200 {
        engine.move_actors();
        let pos = *engine.world().get::<&Position>(entity).unwrap();
        assert!(home.range_to(&pos) <= 3.0 + 1e-9);
        moved |= pos != home;
    }
    assert!(moved);
}

// ---- Scenarios ----

#[test]
fn test_frontline_demo_ends_in_decisive_victory() {
    let scenario = Scenario::frontline();
    let mut engine = SimulationEngine::from_scenario(&scenario).unwrap();
    let mut presence = ActorPresence;

    let mut all = Vec::new();
    for _ in 0..200 {
        engine.move_actors();
        all.extend(engine.tick(&mut presence).events);
    }

    let hoover = PointId(0);
    assert!(all.contains(&PointEvent::KeyPointUnlocked {
        point: hoover,
        attacker: B,
        defeated: A
    }));
    assert!(all.contains(&PointEvent::DecisiveVictory {
        point: hoover,
        attacker: B,
        defeated: A
    }));
    // The Legion stronghold stays locked behind Cottonwood Cove.
    assert!(engine.key_point(PointId(5)).unwrap().is_locked);
}

#[test]
fn test_determinism_same_seed() {
    let scenario = Scenario::frontline();
    let mut engine_a = SimulationEngine::from_scenario(&scenario).unwrap();
    let mut engine_b = SimulationEngine::from_scenario(&scenario).unwrap();

    for _ in 0..150 {
        engine_a.move_actors();
        engine_b.move_actors();
        let snap_a = engine_a.tick(&mut ActorPresence);
        let snap_b = engine_b.tick(&mut ActorPresence);
        assert_eq!(
            serde_json::to_string(&snap_a).unwrap(),
            serde_json::to_string(&snap_b).unwrap(),
            "Snapshots diverged with same seed"
        );
    }
}

#[test]
fn test_scenario_json_defaults() {
    let json = r#"{
        "points": [
            { "name": "Outpost", "position": { "x": 1.0, "y": 2.0 }, "allowed": ["NCR", "Tribal"] },
            { "name": "Fort", "position": { "x": 9.0, "y": 2.0 }, "allowed": ["NCR"],
              "owner": "NCR", "kind": "Key", "capture_time": 60.0 }
        ]
    }"#;
    let scenario = Scenario::from_json_str(json).unwrap();
    assert_eq!(scenario.tick_interval_secs, 1.0);
    assert_eq!(scenario.points[0].capture_time, 180.0);
    assert_eq!(scenario.points[0].reset_time, 30.0);
    assert_eq!(scenario.points[0].radius, 7.0);
    assert!(scenario.points[0].animate);
    assert_eq!(scenario.points[1].kind, PointKind::Key);

    // The fort has no outposts, so it opens on the first tick.
    let mut engine = SimulationEngine::from_scenario(&scenario).unwrap();
    let snap = engine.tick(&mut ScriptedPresence::new());
    assert_eq!(snap.presentation.len(), 2);
    assert_eq!(snap.key_points.len(), 1);
    assert!(!snap.key_points[0].locked);
}

#[test]
fn test_scenario_rejects_invalid_points() {
    let bad_time = Scenario {
        tick_interval_secs: 1.0,
        seed: 0,
        points: vec![point("Zero", None, PointKind::Ordinary).timings(0.0, 5.0)],
        actors: vec![],
    };
    assert!(matches!(
        bad_time.validate(),
        Err(ScenarioError::InvalidPoint { .. })
    ));

    let mut foreign_owner = PointConfig::new("Shack", Position::default(), &[A]);
    foreign_owner.owner = Some(B);
    assert!(matches!(
        foreign_owner.validate(),
        Err(ScenarioError::InvalidPoint { .. })
    ));

    let mut engine = engine();
    assert!(engine
        .spawn_point(&point("Neg", None, PointKind::Ordinary).timings(10.0, -1.0))
        .is_err());
    assert_eq!(engine.point_ids().count(), 0);
}

#[test]
fn test_scenario_rejects_bad_documents() {
    assert!(matches!(
        Scenario::from_json_str(r#"{ "points": [] }"#),
        Err(ScenarioError::EmptyScenario)
    ));
    assert!(matches!(
        Scenario::from_json_str("not json"),
        Err(ScenarioError::Parse(_))
    ));
    let unknown = r#"{ "points": [ { "name": "X", "position": { "x": 0, "y": 0 }, "allowed": ["Enclave"] } ] }"#;
    assert!(matches!(
        Scenario::from_json_str(unknown),
        Err(ScenarioError::Parse(_))
    ));
    let zero_tick = r#"{ "tick_interval_secs": 0, "points": [ { "name": "X", "position": { "x": 0, "y": 0 }, "allowed": ["NCR"] } ] }"#;
    assert!(matches!(
        Scenario::from_json_str(zero_tick),
        Err(ScenarioError::InvalidTickInterval(_))
    ));

    let mut endless = Scenario::frontline();
    endless.tick_interval_secs = f64::INFINITY;
    assert!(matches!(
        SimulationEngine::from_scenario(&endless),
        Err(ScenarioError::InvalidTickInterval(_))
    ));
}

#[test]
fn test_scenario_load_missing_file() {
    let err = Scenario::load(std::path::Path::new("/nonexistent/holdfast.json")).unwrap_err();
    assert!(matches!(err, ScenarioError::Io { .. }));
    assert!(err.to_string().contains("holdfast.json"));
}
