//! Simulation constants and tuning defaults.

/// Default scheduler interval in simulated seconds.
pub const DEFAULT_TICK_INTERVAL_SECS: f64 = 1.0;

// --- Capture points ---

/// Default influence radius of a capture point (map units).
pub const DEFAULT_CAPTURE_RADIUS: f64 = 7.0;

/// Default time to raise (or lower) a flag under uncontested presence (3 minutes).
pub const DEFAULT_CAPTURE_TIME_SECS: f64 = 180.0;

/// Default time an empty zone must stay empty before a contest collapses.
pub const DEFAULT_RESET_TIME_SECS: f64 = 30.0;

// --- Flag presentation ---

/// Progress at or below which a flag reads as not yet hoisted.
pub const FLAG_STAGE_EMPTY_MAX: f64 = 0.01;

/// Lower bound of the middle flag stage.
pub const FLAG_STAGE_MIDDLE_MIN: f64 = 0.33;

/// Lower bound of the top flag stage.
pub const FLAG_STAGE_TOP_MIN: f64 = 0.66;

/// Asset drawn when no faction flag is on the pole.
pub const EMPTY_FLAGPOLE_ASSET: &str = "flags/flagpole";

// --- Real-time driver ---

/// Upper bound for the real-time driver's time scale.
pub const MAX_TIME_SCALE: f64 = 16.0;
