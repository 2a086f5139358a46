//! Tunables for snapping, stability gating and contour closure.
//!
//! Defaults reproduce the reference tool's behaviour. Two independent
//! stability definitions exist and are kept apart on purpose: the cheap
//! cost-ratio hint computed during the single-target search
//! ([`FastHintConfig`]) and the analyzer's metric gate ([`StabilityConfig`]).

/// Default edge-snapping search radius in pixels.
pub const SNAP_RADIUS: usize = 9;
/// Candidates must reach this fraction of the window's strongest edge.
pub const SNAP_THRESHOLD_RATIO: f64 = 0.7;
/// Windows whose strongest edge is at or below this are treated as flat.
pub const SNAP_MIN_STRENGTH: f64 = 0.001;

/// Distance (pixels) from the first anchor at which the contour may close.
pub const CLOSE_DISTANCE: f64 = 15.0;

/// Analyzer gate: average edge cost per node must stay below this.
pub const MAX_AVG_COST: f64 = 1.8;
/// Analyzer gate: average absolute turn angle (radians) must stay below this.
pub const MAX_AVG_DIRECTION_CHANGE: f64 = 0.4;
/// Paths shorter than this (in nodes) are never evaluated for stability.
pub const MIN_PATH_LENGTH: usize = 50;
/// Consecutive stable evaluations before the tracker reports stable.
pub const REQUIRED_STABLE_FRAMES: u32 = 3;

/// Search-time hint: cumulative cost per node must stay below this.
pub const FAST_HINT_MAX_COST_RATIO: f64 = 1.6;
/// Search-time hint: path must be strictly longer than this (in nodes).
pub const FAST_HINT_MIN_LENGTH: usize = 50;

/// Edge snapping parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapConfig {
    pub radius: usize,
    pub threshold_ratio: f64,
    pub min_strength: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            radius: SNAP_RADIUS,
            threshold_ratio: SNAP_THRESHOLD_RATIO,
            min_strength: SNAP_MIN_STRENGTH,
        }
    }
}

/// Metric gate used by the stability analyzer and tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityConfig {
    pub max_avg_cost: f64,
    pub max_avg_direction_change: f64,
    pub min_path_length: usize,
    pub required_stable_frames: u32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            max_avg_cost: MAX_AVG_COST,
            max_avg_direction_change: MAX_AVG_DIRECTION_CHANGE,
            min_path_length: MIN_PATH_LENGTH,
            required_stable_frames: REQUIRED_STABLE_FRAMES,
        }
    }
}

/// Cheap stability proxy evaluated by the single-target search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastHintConfig {
    pub max_cost_ratio: f64,
    pub min_length: usize,
}

impl Default for FastHintConfig {
    fn default() -> Self {
        Self {
            max_cost_ratio: FAST_HINT_MAX_COST_RATIO,
            min_length: FAST_HINT_MIN_LENGTH,
        }
    }
}

impl FastHintConfig {
    /// `cost / length < max_cost_ratio` and `length > min_length`.
    pub fn accepts(&self, cost: f64, length: usize) -> bool {
        length > self.min_length && cost / (length as f64) < self.max_cost_ratio
    }
}

/// All live-wire tunables in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveWireConfig {
    pub snap: SnapConfig,
    pub stability: StabilityConfig,
    pub fast_hint: FastHintConfig,
    /// Maximum distance to the first anchor for the contour to be closable.
    pub close_distance: f64,
}

impl Default for LiveWireConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            stability: StabilityConfig::default(),
            fast_hint: FastHintConfig::default(),
            close_distance: CLOSE_DISTANCE,
        }
    }
}
