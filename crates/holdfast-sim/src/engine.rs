//! Simulation engine: the tick scheduler.
//!
//! `SimulationEngine` owns the hecs world, applies queued commands, runs
//! the lock coordinator and capture systems in a fixed order, and produces
//! `TerritorySnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::{BTreeMap, VecDeque};

use hecs::World;
use log::{debug, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use holdfast_core::commands::SimCommand;
use holdfast_core::components::{CapturePoint, KeyPoint, PointId};
use holdfast_core::constants::{DEFAULT_TICK_INTERVAL_SECS, MAX_TIME_SCALE};
use holdfast_core::events::PointEvent;
use holdfast_core::state::TerritorySnapshot;
use holdfast_core::types::SimTime;

use crate::ledger::SecondaryLossLedger;
use crate::presence::PresenceSampler;
use crate::scenario::{ActorConfig, PointConfig, Scenario, ScenarioError};
use crate::systems;
use crate::systems::locks::OwnershipCensus;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Simulated seconds per tick.
    pub tick_interval_secs: f64,
    /// RNG seed for demo actor movement. Same seed = same run.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            seed: 42,
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    tick_interval: f64,
    paused: bool,
    time_scale: f64,
    rng: ChaCha8Rng,
    points: BTreeMap<PointId, hecs::Entity>,
    command_queue: VecDeque<SimCommand>,
    events: Vec<PointEvent>,
    ledger: SecondaryLossLedger,
}

impl SimulationEngine {
    /// Create an empty engine with the given config. A tick interval that is
    /// not a positive finite number falls back to the default.
    pub fn new(config: SimConfig) -> Self {
        let requested = config.tick_interval_secs;
        let tick_interval = if requested.is_finite() && requested > 0.0 {
            requested
        } else {
            warn!("invalid tick interval {requested}, using {DEFAULT_TICK_INTERVAL_SECS}");
            DEFAULT_TICK_INTERVAL_SECS
        };
        Self {
            world: World::new(),
            time: SimTime::default(),
            tick_interval,
            paused: false,
            time_scale: 1.0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            points: BTreeMap::new(),
            command_queue: VecDeque::new(),
            events: Vec::new(),
            ledger: SecondaryLossLedger::default(),
        }
    }

    /// Validate a scenario and spawn all of its points and actors.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let mut engine = Self::new(SimConfig {
            tick_interval_secs: scenario.tick_interval_secs,
            seed: scenario.seed,
        });
        for point in &scenario.points {
            engine.spawn_point(point)?;
        }
        for actor in &scenario.actors {
            engine.spawn_actor(actor);
        }
        Ok(engine)
    }

    /// Create a point. Ids are handed out in creation order.
    pub fn spawn_point(&mut self, config: &PointConfig) -> Result<PointId, ScenarioError> {
        config.validate()?;
        let id = PointId(self.points.len() as u32);
        let entity = world_setup::spawn_point(&mut self.world, id, config);
        self.points.insert(id, entity);
        debug!("spawned point {} ({})", id.0, config.name);
        Ok(id)
    }

    pub fn spawn_actor(&mut self, config: &ActorConfig) -> hecs::Entity {
        world_setup::spawn_actor(&mut self.world, config)
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self, sampler: &mut dyn PresenceSampler) -> TerritorySnapshot {
        self.process_commands();

        if !self.paused {
            self.run_systems(sampler);
            self.time.advance(self.tick_interval);
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, self.paused, events)
    }

    /// Take one random step with every wandering actor. Call between ticks.
    pub fn move_actors(&mut self) {
        if !self.paused {
            systems::wander::run(&mut self.world, &mut self.rng, self.tick_interval);
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn tick_interval(&self) -> f64 {
        self.tick_interval
    }

    /// Get the current real-time speed multiplier.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Ids of every point, in creation order.
    pub fn point_ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.points.keys().copied()
    }

    /// Copy of a point's capture state.
    pub fn point(&self, id: PointId) -> Option<CapturePoint> {
        let entity = *self.points.get(&id)?;
        self.world
            .get::<&CapturePoint>(entity)
            .ok()
            .map(|point| (*point).clone())
    }

    /// Copy of a key point's lock state. `None` for other points.
    pub fn key_point(&self, id: PointId) -> Option<KeyPoint> {
        let entity = *self.points.get(&id)?;
        self.world.get::<&KeyPoint>(entity).ok().map(|key| *key)
    }

    /// Overwrite a point's capture state (for tests driving ownership directly).
    #[cfg(test)]
    pub fn set_point(&mut self, id: PointId, point: CapturePoint) {
        if let Some(entity) = self.points.get(&id) {
            if let Ok(mut current) = self.world.get::<&mut CapturePoint>(*entity) {
                *current = point;
            }
        }
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: SimCommand) {
        match command {
            SimCommand::Pause => self.paused = true,
            SimCommand::Resume => self.paused = false,
            SimCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, MAX_TIME_SCALE);
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, sampler: &mut dyn PresenceSampler) {
        // 1. Lock coordinator against one consistent ownership census
        let census = OwnershipCensus::build(&self.world);
        systems::locks::run(&mut self.world, &census, &self.ledger, &mut self.events);
        // 2. Sample presence and advance every unlocked point
        let records = systems::capture::run(
            &mut self.world,
            sampler,
            self.tick_interval,
            &mut self.events,
        );
        // 3. Loss attribution and first-capture victories
        systems::locks::record_outcomes(
            &mut self.world,
            &records,
            &mut self.ledger,
            &mut self.events,
        );
    }
}
