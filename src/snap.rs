//! Edge snapping: move a query point onto the strongest nearby edge.
//!
//! The search window is the `(2r + 1)²` square around the query point,
//! clipped to the field. Edge strength is `1 - cost`. Candidates must reach
//! an adaptive threshold (a fixed fraction of the window's strongest edge);
//! the lowest-cost candidate wins, ties going to the first one in row-major
//! scan order (`dy` outer, `dx` inner, both from `-r`).

use crate::config::SnapConfig;
use crate::cost_field::CostField;
use crate::geom::Point;

/// Windowed edge snapper.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeSnapper {
    config: SnapConfig,
}

impl EdgeSnapper {
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    pub fn with_radius(radius: usize) -> Self {
        Self::new(SnapConfig {
            radius,
            ..SnapConfig::default()
        })
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Snap `center` to the best edge pixel in its window.
    ///
    /// Returns `None` only when `center` lies outside the field. A window
    /// without usable edge signal returns `center` unchanged.
    pub fn snap(&self, center: Point, field: &CostField) -> Option<Point> {
        if !field.contains(center) {
            return None;
        }
        let window = Window::new(center, self.config.radius, field);

        let max_strength = window
            .pixels()
            .map(|(_, cost)| 1.0 - cost)
            .fold(0.0f64, f64::max);
        if max_strength <= self.config.min_strength {
            return Some(center);
        }

        let threshold = max_strength * self.config.threshold_ratio;
        let best = lowest_cost(window.pixels().filter(|&(_, cost)| 1.0 - cost >= threshold))
            .or_else(|| lowest_cost(window.pixels()));

        if let Some(p) = best {
            log::debug!("snapped ({}, {}) -> ({}, {})", center.x, center.y, p.x, p.y);
        }
        best
    }
}

/// Snap with the default ratios and an explicit radius.
pub fn snap_to_edge(center: Point, radius: usize, field: &CostField) -> Option<Point> {
    EdgeSnapper::with_radius(radius).snap(center, field)
}

/// First pixel with the strictly lowest cost.
fn lowest_cost(pixels: impl Iterator<Item = (Point, f64)>) -> Option<Point> {
    let mut best: Option<(Point, f64)> = None;
    for (p, cost) in pixels {
        if best.map_or(true, |(_, b)| cost < b) {
            best = Some((p, cost));
        }
    }
    best.map(|(p, _)| p)
}

/// Square window around a point, clipped to the field.
struct Window<'a> {
    x_range: (i32, i32),
    y_range: (i32, i32),
    field: &'a CostField,
}

impl<'a> Window<'a> {
    fn new(center: Point, radius: usize, field: &'a CostField) -> Self {
        let r = radius.min(i32::MAX as usize) as i64;
        // Inclusive range of in-bounds coordinates within `r` of `c`.
        let clip = |c: i32, len: usize| {
            let lo = (c as i64 - r).max(0);
            let hi = (c as i64 + r).min(len as i64 - 1);
            (lo as i32, hi as i32)
        };
        Self {
            x_range: clip(center.x, field.width()),
            y_range: clip(center.y, field.height()),
            field,
        }
    }

    /// In-bounds pixels and their costs, row-major from the top-left corner.
    fn pixels(&self) -> impl Iterator<Item = (Point, f64)> + '_ {
        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        (y0..=y1).flat_map(move |y| {
            (x0..=x1).filter_map(move |x| {
                let p = Point::new(x, y);
                self.field.get(p).map(|cost| (p, cost))
            })
        })
    }
}
