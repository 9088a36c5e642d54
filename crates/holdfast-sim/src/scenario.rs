//! Scenario configuration: the points (and optional demo actors) a
//! simulation starts with.
//!
//! Scenarios are JSON documents. Every point is fully configured at
//! creation; nothing here can be changed once the engine is running.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use holdfast_core::constants::*;
use holdfast_core::enums::{FactionId, PointKind};
use holdfast_core::types::Position;

/// Errors raised while loading or validating a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tick interval must be a positive number, got {0}")]
    InvalidTickInterval(f64),
    #[error("point `{name}`: {reason}")]
    InvalidPoint { name: String, reason: String },
    #[error("actor #{index}: {reason}")]
    InvalidActor { index: usize, reason: String },
    #[error("scenario has no capture points")]
    EmptyScenario,
}

/// Creation parameters for one capture point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointConfig {
    pub name: String,
    pub position: Position,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default = "default_capture_time")]
    pub capture_time: f64,
    #[serde(default = "default_reset_time")]
    pub reset_time: f64,
    /// Factions that may interact with the point.
    pub allowed: Vec<FactionId>,
    /// Seed owner. The point starts Owned with a full flag when set.
    #[serde(default)]
    pub owner: Option<FactionId>,
    #[serde(default)]
    pub kind: PointKind,
    #[serde(default = "default_animate")]
    pub animate: bool,
}

/// A demo actor for `ActorPresence`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    pub factions: Vec<FactionId>,
    pub position: Position,
    /// Leash radius for random wandering. Zero keeps the actor still.
    #[serde(default)]
    pub wander_radius: f64,
    #[serde(default = "default_actor_speed")]
    pub speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: f64,
    #[serde(default)]
    pub seed: u64,
    pub points: Vec<PointConfig>,
    #[serde(default)]
    pub actors: Vec<ActorConfig>,
}

fn default_radius() -> f64 {
    DEFAULT_CAPTURE_RADIUS
}

fn default_capture_time() -> f64 {
    DEFAULT_CAPTURE_TIME_SECS
}

fn default_reset_time() -> f64 {
    DEFAULT_RESET_TIME_SECS
}

fn default_animate() -> bool {
    true
}

fn default_tick_interval() -> f64 {
    DEFAULT_TICK_INTERVAL_SECS
}

fn default_actor_speed() -> f64 {
    1.5
}

impl PointConfig {
    /// A point with default timings.
    pub fn new(name: impl Into<String>, position: Position, allowed: &[FactionId]) -> Self {
        Self {
            name: name.into(),
            position,
            radius: DEFAULT_CAPTURE_RADIUS,
            capture_time: DEFAULT_CAPTURE_TIME_SECS,
            reset_time: DEFAULT_RESET_TIME_SECS,
            allowed: allowed.to_vec(),
            owner: None,
            kind: PointKind::Ordinary,
            animate: true,
        }
    }

    pub fn owned_by(mut self, owner: FactionId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn kind(mut self, kind: PointKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn timings(mut self, capture_time: f64, reset_time: f64) -> Self {
        self.capture_time = capture_time;
        self.reset_time = reset_time;
        self
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let invalid = |reason: String| ScenarioError::InvalidPoint {
            name: self.name.clone(),
            reason,
        };

        if !(self.radius > 0.0) {
            return Err(invalid(format!("radius must be positive, got {}", self.radius)));
        }
        if !(self.capture_time > 0.0) {
            return Err(invalid(format!(
                "capture_time must be positive, got {}",
                self.capture_time
            )));
        }
        if !(self.reset_time >= 0.0) {
            return Err(invalid(format!(
                "reset_time must not be negative, got {}",
                self.reset_time
            )));
        }
        if self.allowed.is_empty() {
            return Err(invalid("no factions allowed".into()));
        }
        if let Some(owner) = self.owner {
            if !self.allowed.contains(&owner) {
                return Err(invalid(format!("owner {} is not an allowed faction", owner.id())));
            }
        }
        Ok(())
    }
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let json = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.tick_interval_secs.is_finite() && self.tick_interval_secs > 0.0) {
            return Err(ScenarioError::InvalidTickInterval(self.tick_interval_secs));
        }
        if self.points.is_empty() {
            return Err(ScenarioError::EmptyScenario);
        }
        for point in &self.points {
            point.validate()?;
        }
        for (index, actor) in self.actors.iter().enumerate() {
            if actor.factions.is_empty() {
                return Err(ScenarioError::InvalidActor {
                    index,
                    reason: "belongs to no faction".into(),
                });
            }
            if actor.wander_radius < 0.0 || actor.speed < 0.0 {
                return Err(ScenarioError::InvalidActor {
                    index,
                    reason: "wander_radius and speed must not be negative".into(),
                });
            }
        }
        Ok(())
    }

    /// Built-in demo: NCR and the Legion each hold a stronghold guarded by
    /// two outposts, with a neutral crossroads between them.
    ///
    /// A Legion warband sits on the NCR outposts, so the NCR stronghold
    /// unlocks once both fall.
    pub fn frontline() -> Self {
        let both = [FactionId::Ncr, FactionId::CaesarLegion];
        let ncr = FactionId::Ncr;
        let legion = FactionId::CaesarLegion;

        let points = vec![
            PointConfig::new("Hoover Dam", Position::new(0.0, 0.0), &both)
                .owned_by(ncr)
                .kind(PointKind::Key)
                .timings(60.0, 20.0),
            PointConfig::new("Camp McCarran", Position::new(40.0, 10.0), &both)
                .owned_by(ncr)
                .kind(PointKind::Secondary)
                .timings(30.0, 15.0),
            PointConfig::new("Camp Golf", Position::new(40.0, -10.0), &both)
                .owned_by(ncr)
                .kind(PointKind::Secondary)
                .timings(30.0, 15.0),
            PointConfig::new("Nipton Road", Position::new(80.0, 0.0), &both).timings(45.0, 15.0),
            PointConfig::new("Cottonwood Cove", Position::new(120.0, 10.0), &both)
                .owned_by(legion)
                .kind(PointKind::Secondary)
                .timings(30.0, 15.0),
            PointConfig::new("Legate's Camp", Position::new(160.0, 0.0), &both)
                .owned_by(legion)
                .kind(PointKind::Key)
                .timings(60.0, 20.0),
        ];

        let squad = |x: f64, y: f64| ActorConfig {
            factions: vec![legion],
            position: Position::new(x, y),
            wander_radius: 2.0,
            speed: default_actor_speed(),
        };
        let actors = vec![
            squad(40.0, 10.0),
            squad(40.5, 9.0),
            squad(40.0, -10.0),
            squad(0.0, 0.0),
            ActorConfig {
                factions: vec![ncr],
                position: Position::new(80.0, 0.0),
                wander_radius: 30.0,
                speed: 3.0,
            },
        ];

        Scenario {
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            seed: 42,
            points,
            actors,
        }
    }
}
