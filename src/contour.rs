//! Anchor state machine that turns live paths into a closed contour.
//!
//! ## States
//!
//! - **NoAnchor**: nothing placed yet; the next click sets the first anchor.
//! - **Tracing**: every pointer move snaps the cursor, runs a single-target
//!   search from the last confirmed anchor and feeds the path to the
//!   stability tracker. A stable path is confirmed automatically and the
//!   anchor advances to the snapped point.
//! - **Closable**: the cursor is within the close distance of the first
//!   anchor and at least one segment exists; the next click routes to the
//!   first anchor, closes the contour and hands the segments back.
//!
//! Out-of-bounds input and unreachable targets are ignored, never errors.

use crate::config::LiveWireConfig;
use crate::geom::Point;
use crate::graph::PixelGraph;
use crate::path::dijkstra::shortest_path_to_with;
use crate::path::stability::StabilityTracker;
use crate::snap::EdgeSnapper;

/// Where the manager is in the tracing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorState {
    NoAnchor,
    Tracing,
    Closable,
}

/// Confirmed segments and the anchors they hang from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    segments: Vec<Vec<Point>>,
    first_point: Option<Point>,
    last_confirmed: Option<Point>,
}

impl Contour {
    /// Confirmed segments in tracing order; each starts where the previous
    /// one ended.
    pub fn segments(&self) -> &[Vec<Point>] {
        &self.segments
    }

    pub fn first_point(&self) -> Option<Point> {
        self.first_point
    }

    pub fn last_confirmed(&self) -> Option<Point> {
        self.last_confirmed
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// What a pointer move produced, for the caller to render.
#[derive(Debug, Clone, PartialEq)]
pub struct LivePreview {
    /// Live path from the last confirmed anchor to the snapped point.
    pub path: Vec<Point>,
    pub cost: f64,
    pub snapped: Point,
    /// Tracker verdict after this evaluation.
    pub stable: bool,
    /// Search-time cost-ratio hint.
    pub fast_stable_hint: bool,
    /// Path reached the minimum length for stability analysis.
    pub meets_min_length: bool,
    /// The live path was appended as a segment by this move.
    pub auto_confirmed: bool,
    pub closable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// No anchor has been placed.
    NoAnchor,
    /// The pointer is outside the image.
    OutOfBounds,
    /// No path exists to the snapped point.
    Unreachable { snapped: Point },
    Preview(LivePreview),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Out of bounds, or nothing to confirm.
    Ignored,
    /// First anchor placed.
    Started(Point),
    /// A segment was appended.
    Confirmed { segment: Vec<Point> },
    Unreachable,
    /// The contour closed on the first anchor; the manager has been reset.
    Closed(Vec<Vec<Point>>),
}

/// Owns the contour being traced and drives its transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourManager {
    config: LiveWireConfig,
    snapper: EdgeSnapper,
    tracker: StabilityTracker,
    contour: Contour,
    snapped: Option<Point>,
    closable: bool,
}

impl Default for ContourManager {
    fn default() -> Self {
        Self::new(LiveWireConfig::default())
    }
}

impl ContourManager {
    pub fn new(config: LiveWireConfig) -> Self {
        Self {
            config,
            snapper: EdgeSnapper::new(config.snap),
            tracker: StabilityTracker::new(config.stability),
            contour: Contour::default(),
            snapped: None,
            closable: false,
        }
    }

    pub fn config(&self) -> &LiveWireConfig {
        &self.config
    }

    pub fn state(&self) -> AnchorState {
        if self.contour.last_confirmed.is_none() {
            AnchorState::NoAnchor
        } else if self.closable {
            AnchorState::Closable
        } else {
            AnchorState::Tracing
        }
    }

    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    pub fn segments(&self) -> &[Vec<Point>] {
        self.contour.segments()
    }

    /// Snapped point of the latest pointer move.
    pub fn snapped_point(&self) -> Option<Point> {
        self.snapped
    }

    pub fn is_stable(&self) -> bool {
        self.tracker.is_stable()
    }

    pub fn tracker(&self) -> &StabilityTracker {
        &self.tracker
    }

    /// Handle a pointer move at image coordinate `raw`.
    pub fn pointer_move(&mut self, graph: &PixelGraph, raw: Point) -> MoveOutcome {
        let Some(anchor) = self.contour.last_confirmed else {
            return MoveOutcome::NoAnchor;
        };
        let Some(snapped) = self.snapper.snap(raw, graph.field()) else {
            return MoveOutcome::OutOfBounds;
        };
        self.snapped = Some(snapped);

        let Some(live) = shortest_path_to_with(graph, anchor, snapped, &self.config.fast_hint)
        else {
            return MoveOutcome::Unreachable { snapped };
        };

        let meets_min_length = self.tracker.analyzer().is_valid(&live.path.nodes);
        let stable = self.tracker.update(graph, &live.path.nodes);
        let auto_confirmed = stable && live.path.len() > 1;
        if auto_confirmed {
            log::info!(
                "auto-confirmed segment of {} nodes ending at ({}, {})",
                live.path.len(),
                snapped.x,
                snapped.y
            );
            self.confirm(live.path.nodes.clone(), snapped);
        }

        self.closable = self.can_close_at(snapped);

        MoveOutcome::Preview(LivePreview {
            path: live.path.nodes,
            cost: live.path.cost,
            snapped,
            stable,
            fast_stable_hint: live.fast_stable_hint,
            meets_min_length,
            auto_confirmed,
            closable: self.closable,
        })
    }

    /// Handle a click at image coordinate `raw`.
    pub fn click(&mut self, graph: &PixelGraph, raw: Point) -> ClickOutcome {
        if !graph.contains(raw) {
            return ClickOutcome::Ignored;
        }

        let Some(anchor) = self.contour.last_confirmed else {
            self.contour.first_point = Some(raw);
            self.contour.last_confirmed = Some(raw);
            self.tracker.reset();
            log::info!("first anchor set at ({}, {})", raw.x, raw.y);
            return ClickOutcome::Started(raw);
        };

        let closing = self.closable;
        if closing && self.contour.first_point == Some(anchor) {
            // An auto-confirmed segment already ended on the first anchor.
            return self.close();
        }
        let target = if closing {
            match self.contour.first_point {
                Some(first) => first,
                None => return ClickOutcome::Ignored,
            }
        } else {
            match self.snapper.snap(raw, graph.field()) {
                Some(p) if p != anchor => p,
                _ => return ClickOutcome::Ignored,
            }
        };

        let Some(found) = shortest_path_to_with(graph, anchor, target, &self.config.fast_hint)
        else {
            log::debug!("click target ({}, {}) unreachable", target.x, target.y);
            return ClickOutcome::Unreachable;
        };

        let segment = found.path.nodes;
        self.confirm(segment.clone(), target);

        if closing {
            self.close()
        } else {
            log::info!(
                "segment of {} nodes confirmed at ({}, {})",
                segment.len(),
                target.x,
                target.y
            );
            ClickOutcome::Confirmed { segment }
        }
    }

    /// Remove the last confirmed segment.
    ///
    /// The anchor moves back to the removed segment's start. Undoing the
    /// last segment, or undoing when only the first anchor is placed,
    /// returns to [`AnchorState::NoAnchor`]. Returns false when there was
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.contour.segments.pop() {
            Some(removed) => {
                if self.contour.segments.is_empty() {
                    self.reset();
                } else {
                    self.contour.last_confirmed = removed.first().copied();
                    self.tracker.reset();
                    self.snapped = None;
                    self.closable = false;
                }
                log::info!("undo: {} segments remain", self.contour.segments.len());
                true
            }
            None if self.contour.last_confirmed.is_some() => {
                self.reset();
                log::info!("undo: first anchor removed");
                true
            }
            None => false,
        }
    }

    /// Drop all segments and anchors.
    pub fn reset(&mut self) {
        self.contour = Contour::default();
        self.tracker.reset();
        self.snapped = None;
        self.closable = false;
    }

    fn confirm(&mut self, segment: Vec<Point>, end: Point) {
        self.contour.segments.push(segment);
        self.contour.last_confirmed = Some(end);
        self.tracker.reset();
    }

    fn close(&mut self) -> ClickOutcome {
        let segments = std::mem::take(&mut self.contour.segments);
        log::info!("contour closed with {} segments", segments.len());
        self.reset();
        ClickOutcome::Closed(segments)
    }

    fn can_close_at(&self, p: Point) -> bool {
        match self.contour.first_point {
            Some(first) => {
                !self.contour.segments.is_empty() && p.distance(first) <= self.config.close_distance
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_field::CostField;

    fn uniform(width: usize, height: usize, cost: f64) -> PixelGraph {
        PixelGraph::new(CostField::uniform(width, height, cost).unwrap())
    }

    fn place(manager: &mut ContourManager, graph: &PixelGraph, x: i32, y: i32) -> ClickOutcome {
        manager.pointer_move(graph, Point::new(x, y));
        manager.click(graph, Point::new(x, y))
    }

    #[test]
    fn test_first_click_starts_tracing() {
        let graph = uniform(10, 10, 1.0);
        let mut manager = ContourManager::default();
        assert_eq!(manager.state(), AnchorState::NoAnchor);
        assert_eq!(
            manager.pointer_move(&graph, Point::new(3, 3)),
            MoveOutcome::NoAnchor
        );
        assert_eq!(
            manager.click(&graph, Point::new(3, 3)),
            ClickOutcome::Started(Point::new(3, 3))
        );
        assert_eq!(manager.state(), AnchorState::Tracing);
        assert_eq!(manager.contour().first_point(), Some(Point::new(3, 3)));
        assert_eq!(manager.contour().last_confirmed(), Some(Point::new(3, 3)));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let graph = uniform(10, 10, 1.0);
        let mut manager = ContourManager::default();
        assert_eq!(manager.click(&graph, Point::new(-1, 3)), ClickOutcome::Ignored);
        manager.click(&graph, Point::new(1, 1));
        assert_eq!(
            manager.pointer_move(&graph, Point::new(10, 3)),
            MoveOutcome::OutOfBounds
        );
        assert_eq!(manager.click(&graph, Point::new(3, 30)), ClickOutcome::Ignored);
        assert!(manager.segments().is_empty());
    }

    #[test]
    fn test_move_previews_live_path() {
        let graph = uniform(20, 20, 1.0);
        let mut manager = ContourManager::default();
        manager.click(&graph, Point::new(2, 2));
        let MoveOutcome::Preview(preview) = manager.pointer_move(&graph, Point::new(9, 2)) else {
            panic!("expected preview");
        };
        assert_eq!(preview.snapped, Point::new(9, 2));
        assert_eq!(preview.path.first(), Some(&Point::new(2, 2)));
        assert_eq!(preview.path.last(), Some(&Point::new(9, 2)));
        assert!(!preview.meets_min_length);
        assert!(!preview.stable);
        assert!(!preview.auto_confirmed);
        assert!(manager.segments().is_empty());
    }

    #[test]
    fn test_click_confirms_segment() {
        let graph = uniform(20, 20, 1.0);
        let mut manager = ContourManager::default();
        manager.click(&graph, Point::new(2, 2));
        let outcome = place(&mut manager, &graph, 12, 2);
        let ClickOutcome::Confirmed { segment } = outcome else {
            panic!("expected confirmation");
        };
        assert_eq!(segment.len(), 11);
        assert_eq!(manager.contour().last_confirmed(), Some(Point::new(12, 2)));
        // Clicking the anchor itself adds nothing.
        assert_eq!(manager.click(&graph, Point::new(12, 2)), ClickOutcome::Ignored);
        assert_eq!(manager.segments().len(), 1);
    }

    #[test]
    fn test_auto_confirm_after_three_stable_moves() {
        // Cheap row at y = 2 with a unique minimum under the cursor, so the
        // snap lands on the cursor and the live path runs along the row.
        let (w, h) = (120, 5);
        let mut values = vec![1.0; w * h];
        for x in 0..w {
            values[2 * w + x] = 0.5;
        }
        values[2 * w + 70] = 0.45;
        let graph = PixelGraph::new(CostField::from_values(w, h, values).unwrap());
        let mut manager = ContourManager::default();
        manager.click(&graph, Point::new(0, 2));

        for expected_stable in [false, false, true] {
            let MoveOutcome::Preview(p) = manager.pointer_move(&graph, Point::new(70, 2)) else {
                panic!("expected preview");
            };
            assert!(p.meets_min_length);
            assert!(p.fast_stable_hint);
            assert_eq!(p.stable, expected_stable);
            assert_eq!(p.auto_confirmed, expected_stable);
        }
        assert_eq!(manager.segments().len(), 1);
        assert_eq!(manager.segments()[0].len(), 71);
        assert_eq!(manager.contour().last_confirmed(), Some(Point::new(70, 2)));
        assert!(!manager.is_stable());
    }

    #[test]
    fn test_close_after_auto_confirm_onto_first_anchor() {
        let (w, h) = (120, 5);
        let mut values = vec![1.0; w * h];
        for x in 0..w {
            values[2 * w + x] = 0.5;
        }
        values[2 * w + 5] = 0.45;
        values[2 * w + 70] = 0.45;
        let graph = PixelGraph::new(CostField::from_values(w, h, values).unwrap());
        let mut manager = ContourManager::default();
        manager.click(&graph, Point::new(5, 2));

        for target in [Point::new(70, 2), Point::new(5, 2)] {
            for _ in 0..3 {
                manager.pointer_move(&graph, target);
            }
        }
        assert_eq!(manager.segments().len(), 2);
        assert_eq!(manager.contour().last_confirmed(), Some(Point::new(5, 2)));
        assert_eq!(manager.state(), AnchorState::Closable);

        let ClickOutcome::Closed(segments) = manager.click(&graph, Point::new(5, 2)) else {
            panic!("expected closure");
        };
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.len() > 1));
        assert_eq!(segments[1].last(), Some(&Point::new(5, 2)));
        assert_eq!(manager.state(), AnchorState::NoAnchor);
    }

    #[test]
    fn test_undo_restores_previous_anchor() {
        let graph = uniform(20, 20, 1.0);
        let mut manager = ContourManager::default();
        manager.click(&graph, Point::new(2, 2));
        place(&mut manager, &graph, 17, 2);
        place(&mut manager, &graph, 17, 17);
        assert!(manager.undo());
        assert_eq!(manager.segments().len(), 1);
        assert_eq!(manager.contour().last_confirmed(), Some(Point::new(17, 2)));
        assert_eq!(manager.state(), AnchorState::Tracing);
    }

    #[test]
    fn test_undo_all_matches_fresh_state() {
        let graph = uniform(20, 20, 1.0);
        let fresh = ContourManager::default();
        let mut manager = ContourManager::default();
        manager.click(&graph, Point::new(2, 2));
        for &(x, y) in &[(17, 2), (17, 17), (2, 18)] {
            place(&mut manager, &graph, x, y);
        }
        assert_eq!(manager.segments().len(), 3);
        for _ in 0..3 {
            assert!(manager.undo());
        }
        assert_eq!(manager.state(), AnchorState::NoAnchor);
        assert!(manager.segments().is_empty());
        assert_eq!(manager, fresh);
        assert!(!manager.undo());
    }

    #[test]
    fn test_undo_first_anchor() {
        let graph = uniform(10, 10, 1.0);
        let mut manager = ContourManager::default();
        manager.click(&graph, Point::new(2, 2));
        assert!(manager.undo());
        assert_eq!(manager.state(), AnchorState::NoAnchor);
    }

    #[test]
    fn test_closure() {
        let graph = uniform(20, 20, 1.0);
        let mut manager = ContourManager::default();
        manager.click(&graph, Point::new(2, 2));

        place(&mut manager, &graph, 17, 2);
        assert_eq!(manager.state(), AnchorState::Tracing);
        place(&mut manager, &graph, 17, 17);
        place(&mut manager, &graph, 2, 18);
        assert_eq!(manager.state(), AnchorState::Tracing);

        let MoveOutcome::Preview(p) = manager.pointer_move(&graph, Point::new(2, 6)) else {
            panic!("expected preview");
        };
        assert!(p.closable);
        assert_eq!(manager.state(), AnchorState::Closable);

        let ClickOutcome::Closed(segments) = manager.click(&graph, Point::new(2, 6)) else {
            panic!("expected closure");
        };
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].first(), Some(&Point::new(2, 2)));
        assert_eq!(segments.last().and_then(|s| s.last()), Some(&Point::new(2, 2)));
        for pair in segments.windows(2) {
            assert_eq!(pair[0].last(), pair[1].first());
        }
        assert_eq!(manager.state(), AnchorState::NoAnchor);
        assert!(manager.segments().is_empty());
    }

    #[test]
    fn test_not_closable_without_segment() {
        let graph = uniform(20, 20, 1.0);
        let mut manager = ContourManager::default();
        manager.click(&graph, Point::new(2, 2));
        let MoveOutcome::Preview(p) = manager.pointer_move(&graph, Point::new(5, 5)) else {
            panic!("expected preview");
        };
        assert!(!p.closable);
        assert_eq!(manager.state(), AnchorState::Tracing);
    }

    #[test]
    fn test_reset() {
        let graph = uniform(20, 20, 1.0);
        let mut manager = ContourManager::default();
        manager.click(&graph, Point::new(2, 2));
        place(&mut manager, &graph, 10, 2);
        manager.reset();
        assert_eq!(manager, ContourManager::default());
    }
}
