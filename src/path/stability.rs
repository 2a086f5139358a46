//! Path stability: quality metrics, the stable verdict, and hysteresis.
//!
//! A live path is a candidate for auto-confirmation when it is long enough,
//! runs along cheap edges, and does not wiggle:
//!
//! | Metric | Definition | Gate |
//! |--------|------------|------|
//! | length | node count | `>= min_path_length` (checked first) |
//! | avg cost | Σ link cost / node count | `< max_avg_cost` |
//! | avg direction change | mean absolute turn angle over interior nodes | `< max_avg_direction_change` |
//!
//! The tracker only reports stable after several consecutive stable
//! verdicts, and drops back to unstable on the first unstable one.

use std::f64::consts::PI;

use crate::config::StabilityConfig;
use crate::geom::Point;
use crate::graph::PixelGraph;

/// Summary of one path's quality.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StabilityMetrics {
    pub avg_cost: f64,
    /// Radians in [0, π]; 0 for paths with fewer than 3 nodes.
    pub avg_direction_change: f64,
    pub length: usize,
}

/// Stateless metric computation and verdict.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StabilityAnalyzer {
    config: StabilityConfig,
}

impl StabilityAnalyzer {
    pub fn new(config: StabilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Compute metrics for a node sequence.
    ///
    /// Link costs are looked up in `graph`; a pair of nodes that are not
    /// neighbours contributes nothing to the cost sum.
    pub fn metrics(&self, graph: &PixelGraph, path: &[Point]) -> StabilityMetrics {
        let length = path.len();
        if length == 0 {
            return StabilityMetrics::default();
        }

        let mut total_cost = 0.0;
        let mut total_turn = 0.0;
        for i in 1..length {
            let (prev, curr) = (path[i - 1], path[i]);
            total_cost += graph.link_cost(prev, curr).unwrap_or(0.0);

            if i > 1 {
                total_turn += turn_angle(path[i - 2], prev, curr);
            }
        }

        StabilityMetrics {
            avg_cost: total_cost / length as f64,
            avg_direction_change: if length > 2 {
                total_turn / (length - 2) as f64
            } else {
                0.0
            },
            length,
        }
    }

    /// Long enough to be judged at all.
    pub fn is_valid(&self, path: &[Point]) -> bool {
        path.len() >= self.config.min_path_length
    }

    /// Metric gate alone, ignoring length.
    pub fn passes(&self, metrics: &StabilityMetrics) -> bool {
        metrics.avg_cost < self.config.max_avg_cost
            && metrics.avg_direction_change < self.config.max_avg_direction_change
    }

    /// Valid and passing the metric gate.
    pub fn is_stable(&self, graph: &PixelGraph, path: &[Point]) -> bool {
        self.is_valid(path) && self.passes(&self.metrics(graph, path))
    }
}

/// Absolute change of heading at `b`, in [0, π].
fn turn_angle(a: Point, b: Point, c: Point) -> f64 {
    let incoming = ((b.y - a.y) as f64).atan2((b.x - a.x) as f64);
    let outgoing = ((c.y - b.y) as f64).atan2((c.x - b.x) as f64);
    let diff = (outgoing - incoming).abs();
    if diff > PI {
        2.0 * PI - diff
    } else {
        diff
    }
}

/// Hysteresis state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Unstable,
    /// `k` consecutive stable verdicts, not yet enough.
    Accumulating(u32),
    Stable,
}

/// Requires several consecutive stable verdicts before reporting stable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StabilityTracker {
    analyzer: StabilityAnalyzer,
    consecutive: u32,
    stable: bool,
    last_metrics: Option<StabilityMetrics>,
}

impl StabilityTracker {
    pub fn new(config: StabilityConfig) -> Self {
        Self {
            analyzer: StabilityAnalyzer::new(config),
            ..Self::default()
        }
    }

    pub fn analyzer(&self) -> &StabilityAnalyzer {
        &self.analyzer
    }

    /// Evaluate one live path and return the tracker's verdict.
    ///
    /// Paths below the minimum length reset the tracker without being
    /// analysed.
    pub fn update(&mut self, graph: &PixelGraph, path: &[Point]) -> bool {
        if !self.analyzer.is_valid(path) {
            self.reset();
            return false;
        }

        let metrics = self.analyzer.metrics(graph, path);
        let currently_stable = self.analyzer.passes(&metrics);
        log::debug!(
            "path length {}, avg cost {:.4}, avg direction {:.4}, stable: {}",
            metrics.length,
            metrics.avg_cost,
            metrics.avg_direction_change,
            currently_stable
        );
        self.last_metrics = Some(metrics);

        if currently_stable {
            self.consecutive = self.consecutive.saturating_add(1);
            if self.consecutive >= self.analyzer.config().required_stable_frames {
                self.stable = true;
            }
        } else {
            self.consecutive = 0;
            self.stable = false;
        }
        self.stable
    }

    /// Force the unstable state with a zero counter.
    pub fn reset(&mut self) {
        self.consecutive = 0;
        self.stable = false;
        self.last_metrics = None;
    }

    pub fn is_stable(&self) -> bool {
        self.stable
    }

    pub fn state(&self) -> TrackerState {
        if self.stable {
            TrackerState::Stable
        } else if self.consecutive > 0 {
            TrackerState::Accumulating(self.consecutive)
        } else {
            TrackerState::Unstable
        }
    }

    /// Metrics of the most recent valid path since the last reset.
    pub fn last_metrics(&self) -> Option<&StabilityMetrics> {
        self.last_metrics.as_ref()
    }
}
