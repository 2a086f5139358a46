//! Dijkstra search over [`PixelGraph`].
//!
//! Both modes share one relaxation rule:
//! `new = cost(current) + link_cost * (√2 if diagonal else 1)`.
//! The priority queue is never updated in place; an improved node is pushed
//! again and stale entries are dropped by the visited check when popped.
//! Equal-cost entries pop in ascending node index order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::FastHintConfig;
use crate::geom::Point;
use crate::graph::PixelGraph;

const NO_PARENT: usize = usize::MAX;

/// Cumulative cost and node sequence of one path, seed first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathInfo {
    pub cost: f64,
    pub nodes: Vec<Point>,
}

impl PathInfo {
    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.nodes.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.nodes.last().copied()
    }
}

/// Result of a single-target search.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPath {
    pub path: PathInfo,
    /// Cheap stability proxy: `cost / length` and `length` against
    /// [`FastHintConfig`]. Independent of the analyzer's verdict.
    pub fast_stable_hint: bool,
}

/// All-destinations result: cumulative cost and predecessor per node.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPathTree {
    seed: Point,
    width: usize,
    costs: Vec<f64>,
    parents: Vec<usize>,
}

impl ShortestPathTree {
    pub fn seed(&self) -> Point {
        self.seed
    }

    fn index_of(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x as usize >= self.width {
            return None;
        }
        let index = p.y as usize * self.width + p.x as usize;
        (index < self.costs.len()).then_some(index)
    }

    fn point_at(&self, index: usize) -> Point {
        Point::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Minimum cumulative cost from the seed, `None` if out of bounds or
    /// unreachable.
    pub fn cost_to(&self, p: Point) -> Option<f64> {
        let cost = self.costs[self.index_of(p)?];
        cost.is_finite().then_some(cost)
    }

    /// Minimum-cost path from the seed to `p`.
    pub fn path_to(&self, p: Point) -> Option<PathInfo> {
        let index = self.index_of(p)?;
        let cost = self.costs[index];
        if !cost.is_finite() {
            return None;
        }
        Some(PathInfo {
            cost,
            nodes: walk_parents(&self.parents, index, |i| self.point_at(i)),
        })
    }

    /// Number of nodes with a finite cost (including the seed).
    pub fn reachable_count(&self) -> usize {
        self.costs.iter().filter(|c| c.is_finite()).count()
    }
}

/// Mode A: shortest paths from `seed` to every node.
///
/// Returns `None` when the seed is outside the graph.
pub fn shortest_path_tree(graph: &PixelGraph, seed: Point) -> Option<ShortestPathTree> {
    let seed_index = graph.index_of(seed)?;
    let mut search = Search::new(graph, seed_index);
    while let Some(index) = search.pop_settled() {
        search.relax(index);
    }
    log::debug!(
        "shortest path tree from ({}, {}): {} pops over {} nodes",
        seed.x,
        seed.y,
        search.pops,
        graph.len()
    );

    Some(ShortestPathTree {
        seed,
        width: graph.width(),
        costs: search.costs,
        parents: search.parents,
    })
}

/// Mode B with the default fast-hint thresholds.
pub fn shortest_path_to(graph: &PixelGraph, seed: Point, target: Point) -> Option<TargetPath> {
    shortest_path_to_with(graph, seed, target, &FastHintConfig::default())
}

/// Mode B: shortest path from `seed` to `target`, stopping as soon as the
/// target is settled.
///
/// Returns `None` when either endpoint is outside the graph or the target is
/// unreachable. `seed == target` yields a single-node path of cost 0.
pub fn shortest_path_to_with(
    graph: &PixelGraph,
    seed: Point,
    target: Point,
    hint: &FastHintConfig,
) -> Option<TargetPath> {
    let seed_index = graph.index_of(seed)?;
    let target_index = graph.index_of(target)?;

    let mut search = Search::new(graph, seed_index);
    let mut found = false;
    while let Some(index) = search.pop_settled() {
        if index == target_index {
            found = true;
            break;
        }
        search.relax(index);
    }
    if !found {
        log::debug!(
            "target ({}, {}) unreachable from ({}, {})",
            target.x,
            target.y,
            seed.x,
            seed.y
        );
        return None;
    }

    let cost = search.costs[target_index];
    let nodes = walk_parents(&search.parents, target_index, |i| graph.point_at(i));
    let fast_stable_hint = hint.accepts(cost, nodes.len());
    log::debug!(
        "path ({}, {}) -> ({}, {}): {} nodes, cost {:.3}, {} pops",
        seed.x,
        seed.y,
        target.x,
        target.y,
        nodes.len(),
        cost,
        search.pops
    );

    Some(TargetPath {
        path: PathInfo { cost, nodes },
        fast_stable_hint,
    })
}

/// Follow predecessors from `index` back to the seed; returns seed-first order.
fn walk_parents(parents: &[usize], index: usize, point_at: impl Fn(usize) -> Point) -> Vec<Point> {
    let mut nodes = Vec::new();
    let mut current = index;
    loop {
        nodes.push(point_at(current));
        let parent = parents[current];
        if parent == NO_PARENT {
            break;
        }
        current = parent;
    }
    nodes.reverse();
    nodes
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct QueueEntry {
    cost: f64,
    index: usize,
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // Reversed so BinaryHeap pops the cheapest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Per-query Dijkstra state.
struct Search<'g> {
    graph: &'g PixelGraph,
    costs: Vec<f64>,
    parents: Vec<usize>,
    visited: Vec<bool>,
    queue: BinaryHeap<QueueEntry>,
    pops: usize,
}

impl<'g> Search<'g> {
    fn new(graph: &'g PixelGraph, seed: usize) -> Self {
        let n = graph.len();
        let mut costs = vec![f64::INFINITY; n];
        costs[seed] = 0.0;
        let mut queue = BinaryHeap::new();
        queue.push(QueueEntry {
            cost: 0.0,
            index: seed,
        });
        Self {
            graph,
            costs,
            parents: vec![NO_PARENT; n],
            visited: vec![false; n],
            queue,
            pops: 0,
        }
    }

    /// Pop the cheapest unvisited node and mark it visited.
    fn pop_settled(&mut self) -> Option<usize> {
        while let Some(entry) = self.queue.pop() {
            self.pops += 1;
            if self.visited[entry.index] {
                continue;
            }
            self.visited[entry.index] = true;
            return Some(entry.index);
        }
        None
    }

    fn relax(&mut self, index: usize) {
        let current = self.costs[index];
        for neighbor in self.graph.neighbors(index) {
            if self.visited[neighbor.index] {
                continue;
            }
            let new_cost = current + neighbor.step_cost();
            if new_cost < self.costs[neighbor.index] {
                self.costs[neighbor.index] = new_cost;
                self.parents[neighbor.index] = index;
                self.queue.push(QueueEntry {
                    cost: new_cost,
                    index: neighbor.index,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_field::CostField;
    use std::f64::consts::SQRT_2;

    fn uniform_graph(width: usize, height: usize, cost: f64) -> PixelGraph {
        PixelGraph::new(CostField::uniform(width, height, cost).unwrap())
    }

    /// Deterministic pseudo-random field in [0, 1].
    fn noisy_graph(width: usize, height: usize) -> PixelGraph {
        let mut state = 0x2545_f491u32;
        let values = (0..width * height)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state % 1000) as f64 / 999.0
            })
            .collect();
        PixelGraph::new(CostField::from_values(width, height, values).unwrap())
    }

    #[test]
    fn test_self_path() {
        let graph = uniform_graph(5, 5, 0.5);
        let found = shortest_path_to(&graph, Point::new(2, 3), Point::new(2, 3)).unwrap();
        assert_eq!(found.path.nodes, vec![Point::new(2, 3)]);
        assert_eq!(found.path.cost, 0.0);
        assert!(!found.fast_stable_hint);
    }

    #[test]
    fn test_axis_step_cost() {
        let graph = uniform_graph(3, 3, 0.5);
        let found = shortest_path_to(&graph, Point::new(0, 1), Point::new(1, 1)).unwrap();
        assert_eq!(found.path.nodes, vec![Point::new(0, 1), Point::new(1, 1)]);
        assert!((found.path.cost - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_step_cost() {
        let graph = uniform_graph(3, 3, 0.5);
        let found = shortest_path_to(&graph, Point::new(0, 0), Point::new(2, 2)).unwrap();
        assert_eq!(
            found.path.nodes,
            vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)]
        );
        assert!((found.path.cost - 2.0 * SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_follows_cheap_valley() {
        // Expensive field with a cheap row at y = 2.
        let (w, h) = (12, 5);
        let mut values = vec![1.0; w * h];
        for x in 0..w {
            values[2 * w + x] = 0.0;
        }
        let graph = PixelGraph::new(CostField::from_values(w, h, values).unwrap());
        let found = shortest_path_to(&graph, Point::new(0, 2), Point::new(11, 2)).unwrap();
        assert_eq!(found.path.len(), 12);
        assert!(found.path.nodes.iter().all(|p| p.y == 2));
        assert_eq!(found.path.cost, 0.0);
    }

    #[test]
    fn test_out_of_bounds_endpoints() {
        let graph = uniform_graph(4, 4, 0.5);
        assert!(shortest_path_to(&graph, Point::new(-1, 0), Point::new(1, 1)).is_none());
        assert!(shortest_path_to(&graph, Point::new(0, 0), Point::new(4, 1)).is_none());
        assert!(shortest_path_tree(&graph, Point::new(0, 9)).is_none());
    }

    #[test]
    fn test_tree_matches_target_search() {
        let graph = noisy_graph(9, 7);
        let seed = Point::new(1, 2);
        let tree = shortest_path_tree(&graph, seed).unwrap();
        assert_eq!(tree.seed(), seed);
        assert_eq!(tree.reachable_count(), graph.len());
        for index in 0..graph.len() {
            let target = graph.point_at(index);
            let direct = shortest_path_to(&graph, seed, target).unwrap();
            let via_tree = tree.path_to(target).unwrap();
            assert!((direct.path.cost - via_tree.cost).abs() < 1e-9);
            assert_eq!(via_tree.first(), Some(seed));
            assert_eq!(via_tree.last(), Some(target));
        }
    }

    #[test]
    fn test_cumulative_cost_monotonic() {
        let graph = noisy_graph(10, 10);
        let tree = shortest_path_tree(&graph, Point::new(0, 0)).unwrap();
        let path = tree.path_to(Point::new(9, 8)).unwrap();
        let costs: Vec<f64> = path
            .nodes
            .iter()
            .map(|&p| tree.cost_to(p).unwrap())
            .collect();
        assert_eq!(costs[0], 0.0);
        assert!(costs.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*costs.last().unwrap(), path.cost);
    }

    #[test]
    fn test_path_cost_equals_step_sum() {
        let graph = noisy_graph(8, 8);
        let found = shortest_path_to(&graph, Point::new(0, 7), Point::new(7, 0)).unwrap();
        let mut total = 0.0;
        for pair in found.path.nodes.windows(2) {
            let link = graph.link_cost(pair[0], pair[1]).unwrap();
            total += if pair[0].is_diagonal_to(pair[1]) {
                link * SQRT_2
            } else {
                link
            };
        }
        assert!((total - found.path.cost).abs() < 1e-9);
    }

    #[test]
    fn test_fast_hint_on_long_cheap_path() {
        // Costs 0.5 everywhere: each axis step adds 1.0, so cost/len < 1.6.
        let graph = uniform_graph(60, 3, 0.5);
        let found = shortest_path_to(&graph, Point::new(0, 1), Point::new(55, 1)).unwrap();
        assert_eq!(found.path.len(), 56);
        assert!(found.fast_stable_hint);

        let short = shortest_path_to(&graph, Point::new(0, 1), Point::new(40, 1)).unwrap();
        assert!(!short.fast_stable_hint);
    }

    #[test]
    fn test_fast_hint_rejects_expensive_path() {
        let graph = uniform_graph(60, 3, 1.0);
        let found = shortest_path_to(&graph, Point::new(0, 1), Point::new(55, 1)).unwrap();
        assert!(!found.fast_stable_hint);
    }

    #[test]
    fn test_queue_entry_order() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry { cost: 2.0, index: 0 });
        heap.push(QueueEntry { cost: 1.0, index: 5 });
        heap.push(QueueEntry { cost: 1.0, index: 3 });
        assert_eq!(heap.pop().map(|e| e.index), Some(3));
        assert_eq!(heap.pop().map(|e| e.index), Some(5));
        assert_eq!(heap.pop().map(|e| e.index), Some(0));
    }
}
