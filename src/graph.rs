//! Implicit 8-connected pixel graph over a cost field.
//!
//! Every pixel is a node, addressed by its flattened index `y * width + x`.
//! Neighbour lists are not stored: a link's cost is a pure function of the
//! two endpoint costs, `cost(a) + cost(b)`, so it is recomputed whenever a
//! search asks for it. Both directions of a link therefore always carry the
//! same weight, and the graph needs no memory beyond the field itself.
//!
//! Diagonal steps are scaled by `√2` at traversal time ([`Neighbor::step_cost`]),
//! never in the stored link cost.

use std::f64::consts::SQRT_2;

use ndarray::ArrayView3;

use crate::cost_field::CostField;
use crate::error::Result;
use crate::geom::Point;

/// Moore neighbourhood offsets (8-connected, clockwise from right).
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),   // 0: right
    (1, 1),   // 1: down-right
    (0, 1),   // 2: down
    (-1, 1),  // 3: down-left
    (-1, 0),  // 4: left
    (-1, -1), // 5: up-left
    (0, -1),  // 6: up
    (1, -1),  // 7: up-right
];

/// One outgoing link of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub point: Point,
    pub index: usize,
    /// `cost(a) + cost(b)`, unscaled.
    pub link_cost: f64,
    pub diagonal: bool,
}

impl Neighbor {
    /// Contribution of this step to a cumulative path cost.
    #[inline]
    pub fn step_cost(&self) -> f64 {
        if self.diagonal {
            self.link_cost * SQRT_2
        } else {
            self.link_cost
        }
    }
}

/// A node with its materialised neighbour list.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelNode {
    pub point: Point,
    pub neighbors: Vec<Neighbor>,
}

/// Read-only weighted grid graph owning its cost field.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGraph {
    field: CostField,
}

impl PixelGraph {
    pub fn new(field: CostField) -> Self {
        Self { field }
    }

    /// Build the cost field of `image` and wrap it.
    pub fn from_image(image: ArrayView3<u8>) -> Result<Self> {
        CostField::from_image(image).map(Self::new)
    }

    #[inline]
    pub fn field(&self) -> &CostField {
        &self.field
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.field.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.field.height()
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.field.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.field.contains(p)
    }

    /// Flattened index of `p`, or `None` when out of bounds.
    #[inline]
    pub fn index_of(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some(p.y as usize * self.width() + p.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn point_at(&self, index: usize) -> Point {
        let w = self.width();
        Point::new((index % w) as i32, (index / w) as i32)
    }

    /// Node cost at a flattened index.
    #[inline]
    fn cost_at(&self, index: usize) -> f64 {
        let w = self.width();
        self.field.at(index % w, index / w)
    }

    /// In-bounds neighbours of the node at `index`, with their link costs.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = Neighbor> + '_ {
        let origin = self.point_at(index);
        let own_cost = self.cost_at(index);
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let point = Point::new(origin.x + dx, origin.y + dy);
            let n_index = self.index_of(point)?;
            Some(Neighbor {
                point,
                index: n_index,
                link_cost: own_cost + self.cost_at(n_index),
                diagonal: dx != 0 && dy != 0,
            })
        })
    }

    /// Materialise the node at `p` with its full neighbour list.
    pub fn node(&self, p: Point) -> Option<PixelNode> {
        let index = self.index_of(p)?;
        Some(PixelNode {
            point: p,
            neighbors: self.neighbors(index).collect(),
        })
    }

    /// Link cost between two 8-adjacent pixels; `None` if either is out of
    /// bounds or they are not neighbours.
    pub fn link_cost(&self, a: Point, b: Point) -> Option<f64> {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        if dx > 1 || dy > 1 || (dx == 0 && dy == 0) {
            return None;
        }
        Some(self.field.get(a)? + self.field.get(b)?)
    }
}
