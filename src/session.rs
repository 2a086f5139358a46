//! One interactive tracing session over a loaded image.
//!
//! [`LiveWireSession`] owns the pixel graph of the current image and the
//! contour manager, and is the entry point the bindings drive. Events are
//! processed strictly in arrival order; a burst of pointer moves can be
//! collapsed to the latest one with [`coalesce_moves`] before processing.

use ndarray::ArrayView3;

use crate::config::LiveWireConfig;
use crate::contour::{AnchorState, ClickOutcome, ContourManager, MoveOutcome};
use crate::cost_field::CostField;
use crate::error::Result;
use crate::geom::Point;
use crate::graph::PixelGraph;
use crate::selection::mask::{FloodFillExtractor, MaskExtractor, MaskResult};

/// Input event from the host UI, in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Move(Point),
    Click(Point),
    Undo,
    Reset,
}

/// Result of one processed [`PointerEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Moved(MoveOutcome),
    Clicked(ClickOutcome),
    /// Whether anything was undone.
    Undone(bool),
    Reset,
}

/// Collapse each run of consecutive moves to its last move.
///
/// Clicks, undo and reset act as barriers, so the relative order of every
/// other event is preserved.
pub fn coalesce_moves<I>(events: I) -> Vec<PointerEvent>
where
    I: IntoIterator<Item = PointerEvent>,
{
    let mut out: Vec<PointerEvent> = Vec::new();
    for event in events {
        if let (PointerEvent::Move(_), Some(PointerEvent::Move(_))) = (event, out.last()) {
            out.pop();
        }
        out.push(event);
    }
    out
}

/// Graph of the loaded image plus the contour being traced on it.
#[derive(Debug, Clone)]
pub struct LiveWireSession {
    graph: PixelGraph,
    manager: ContourManager,
}

impl LiveWireSession {
    /// Start a session on `image` (height, width, channels).
    pub fn new(image: ArrayView3<u8>, config: LiveWireConfig) -> Result<Self> {
        let graph = PixelGraph::from_image(image)?;
        log::info!("image loaded: {}x{}", graph.width(), graph.height());
        Ok(Self::from_graph(graph, config))
    }

    /// Start a session on a precomputed cost field.
    pub fn from_cost_field(field: CostField, config: LiveWireConfig) -> Self {
        Self::from_graph(PixelGraph::new(field), config)
    }

    fn from_graph(graph: PixelGraph, config: LiveWireConfig) -> Self {
        Self {
            graph,
            manager: ContourManager::new(config),
        }
    }

    /// Replace the image. The contour is discarded.
    ///
    /// On error the previous image and contour are kept.
    pub fn load_image(&mut self, image: ArrayView3<u8>) -> Result<()> {
        let graph = PixelGraph::from_image(image)?;
        log::info!("image loaded: {}x{}", graph.width(), graph.height());
        self.graph = graph;
        self.manager.reset();
        Ok(())
    }

    pub fn pointer_move(&mut self, p: Point) -> MoveOutcome {
        self.manager.pointer_move(&self.graph, p)
    }

    pub fn click(&mut self, p: Point) -> ClickOutcome {
        self.manager.click(&self.graph, p)
    }

    pub fn undo(&mut self) -> bool {
        self.manager.undo()
    }

    pub fn reset(&mut self) {
        log::info!("session reset");
        self.manager.reset();
    }

    pub fn handle(&mut self, event: PointerEvent) -> EventOutcome {
        match event {
            PointerEvent::Move(p) => EventOutcome::Moved(self.pointer_move(p)),
            PointerEvent::Click(p) => EventOutcome::Clicked(self.click(p)),
            PointerEvent::Undo => EventOutcome::Undone(self.undo()),
            PointerEvent::Reset => {
                self.reset();
                EventOutcome::Reset
            }
        }
    }

    /// Process a batch of events after coalescing consecutive moves.
    pub fn handle_events<I>(&mut self, events: I) -> Vec<EventOutcome>
    where
        I: IntoIterator<Item = PointerEvent>,
    {
        coalesce_moves(events)
            .into_iter()
            .map(|event| self.handle(event))
            .collect()
    }

    pub fn state(&self) -> AnchorState {
        self.manager.state()
    }

    pub fn is_stable(&self) -> bool {
        self.manager.is_stable()
    }

    pub fn cost_field(&self) -> &CostField {
        self.graph.field()
    }

    pub fn graph(&self) -> &PixelGraph {
        &self.graph
    }

    pub fn manager(&self) -> &ContourManager {
        &self.manager
    }

    pub fn width(&self) -> usize {
        self.graph.width()
    }

    pub fn height(&self) -> usize {
        self.graph.height()
    }

    /// Selection mask enclosed by a closed contour, via flood fill.
    pub fn extract_mask(&self, segments: &[Vec<Point>]) -> MaskResult {
        self.extract_mask_with(segments, &FloodFillExtractor)
    }

    pub fn extract_mask_with(
        &self,
        segments: &[Vec<Point>],
        extractor: &dyn MaskExtractor,
    ) -> MaskResult {
        extractor.extract(segments, self.graph.width(), self.graph.height())
    }
}
