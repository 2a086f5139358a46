//! Minimum-cost path search over the pixel graph and path-quality gating.
//!
//! - **dijkstra**: single-source shortest-path tree (all destinations) and an
//!   early-exit single-target search used for the live wire
//! - **stability**: path metrics, the stable/unstable verdict and the
//!   hysteresis tracker that turns verdicts into auto-confirmation

pub mod dijkstra;
pub mod stability;

pub use dijkstra::{shortest_path_to, shortest_path_tree, PathInfo, ShortestPathTree, TargetPath};
pub use stability::{StabilityAnalyzer, StabilityMetrics, StabilityTracker, TrackerState};
