//! Live-wire (intelligent scissors) boundary tracing.
//!
//! The user clicks anchor points near an object boundary; between the last
//! anchor and the cursor the engine computes the minimum-cost path over an
//! edge-derived cost field, snaps the cursor to nearby strong edges, and
//! auto-confirms segments once the live path has been stable for several
//! consecutive evaluations. Closing the contour hands the segments to a mask
//! extractor.
//!
//! ## Image Format
//! Images are `(height, width, channels)` u8 arrays:
//! - **Grayscale**: (height, width, 1) - used as-is
//! - **RGB**: (height, width, 3) - gradients summed over the colour channels
//! - **RGBA**: (height, width, 4) - alpha ignored
//!
//! ## Pipeline
//! `CostField` -> `PixelGraph` -> `EdgeSnapper` + Dijkstra -> `StabilityTracker`
//! -> `ContourManager` -> `MaskExtractor`. [`session::LiveWireSession`] wires
//! them together for one loaded image.

pub mod config;
pub mod contour;
pub mod cost_field;
pub mod error;
pub mod geom;
pub mod graph;
pub mod path;
pub mod preview;
pub mod selection;
pub mod session;
pub mod snap;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::LiveWireConfig;
pub use contour::{AnchorState, ClickOutcome, ContourManager, LivePreview, MoveOutcome};
pub use cost_field::CostField;
pub use error::{LiveWireError, Result};
pub use geom::Point;
pub use graph::PixelGraph;
pub use path::{shortest_path_to, shortest_path_tree, PathInfo, ShortestPathTree, TargetPath};
pub use selection::mask::{FloodFillExtractor, MaskExtractor, MaskResult};
pub use session::{EventOutcome, LiveWireSession, PointerEvent};
pub use snap::{snap_to_edge, EdgeSnapper};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use ndarray::Array2;
    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;
    use pyo3::types::PyDict;

    use crate::config::{LiveWireConfig, SNAP_RADIUS};
    use crate::contour::{AnchorState, ClickOutcome, MoveOutcome};
    use crate::cost_field::CostField;
    use crate::error::LiveWireError;
    use crate::geom::Point;
    use crate::selection::mask::apply_mask_rgba;
    use crate::session::LiveWireSession;

    fn to_py_err(err: LiveWireError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    fn to_tuples(points: &[Point]) -> Vec<(i32, i32)> {
        points.iter().map(|&p| p.into()).collect()
    }

    fn from_tuples(segments: Vec<Vec<(i32, i32)>>) -> Vec<Vec<Point>> {
        segments
            .into_iter()
            .map(|s| s.into_iter().map(Point::from).collect())
            .collect()
    }

    // ========================================================================
    // Cost Field & Snapping
    // ========================================================================

    /// Compute the edge cost field of an image.
    ///
    /// Accepts (H, W, 1), (H, W, 3) or (H, W, 4) u8 arrays. Returns an
    /// (H, W) float64 array with values in [0, 1]; low cost = strong edge.
    #[pyfunction]
    pub fn cost_field<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let field = CostField::from_image(image.as_array()).map_err(to_py_err)?;
        Ok(field.into_array().into_pyarray(py))
    }

    /// Snap (x, y) to the strongest nearby edge of an (H, W) cost array.
    ///
    /// Returns None when the point lies outside the array.
    #[pyfunction]
    #[pyo3(signature = (cost, x, y, radius = SNAP_RADIUS))]
    pub fn snap_to_edge(
        cost: PyReadonlyArray2<'_, f64>,
        x: i32,
        y: i32,
        radius: usize,
    ) -> PyResult<Option<(i32, i32)>> {
        let view = cost.as_array();
        let (height, width) = view.dim();
        let field = CostField::from_values(width, height, view.iter().copied().collect())
            .map_err(to_py_err)?;
        Ok(crate::snap::snap_to_edge(Point::new(x, y), radius, &field).map(Into::into))
    }

    /// Cut out the selected region of an image as RGBA.
    #[pyfunction]
    pub fn apply_mask<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        mask: PyReadonlyArray2<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let mask: Vec<u8> = mask.as_array().iter().copied().collect();
        apply_mask_rgba(image.as_array(), &mask)
            .map(|out| out.into_pyarray(py))
            .ok_or_else(|| PyValueError::new_err("mask size does not match image"))
    }

    // ========================================================================
    // Interactive Session
    // ========================================================================

    /// Live-wire tracing session over one image.
    ///
    /// `pointer_move` and `click` return dicts with a `status` key plus the
    /// data the UI needs to draw the live path or the confirmed segments.
    #[pyclass(name = "LiveWireSession")]
    pub struct PyLiveWireSession {
        inner: LiveWireSession,
    }

    #[pymethods]
    impl PyLiveWireSession {
        #[new]
        pub fn new(image: PyReadonlyArray3<'_, u8>) -> PyResult<Self> {
            let inner = LiveWireSession::new(image.as_array(), LiveWireConfig::default())
                .map_err(to_py_err)?;
            Ok(Self { inner })
        }

        /// Replace the image and discard the contour.
        pub fn load_image(&mut self, image: PyReadonlyArray3<'_, u8>) -> PyResult<()> {
            self.inner.load_image(image.as_array()).map_err(to_py_err)
        }

        pub fn pointer_move<'py>(
            &mut self,
            py: Python<'py>,
            x: i32,
            y: i32,
        ) -> PyResult<Bound<'py, PyDict>> {
            let dict = PyDict::new(py);
            match self.inner.pointer_move(Point::new(x, y)) {
                MoveOutcome::NoAnchor => dict.set_item("status", "no_anchor")?,
                MoveOutcome::OutOfBounds => dict.set_item("status", "out_of_bounds")?,
                MoveOutcome::Unreachable { snapped } => {
                    dict.set_item("status", "unreachable")?;
                    dict.set_item("snapped", <(i32, i32)>::from(snapped))?;
                }
                MoveOutcome::Preview(preview) => {
                    dict.set_item("status", "preview")?;
                    dict.set_item("path", to_tuples(&preview.path))?;
                    dict.set_item("cost", preview.cost)?;
                    dict.set_item("snapped", <(i32, i32)>::from(preview.snapped))?;
                    dict.set_item("stable", preview.stable)?;
                    dict.set_item("fast_stable_hint", preview.fast_stable_hint)?;
                    dict.set_item("meets_min_length", preview.meets_min_length)?;
                    dict.set_item("auto_confirmed", preview.auto_confirmed)?;
                    dict.set_item("closable", preview.closable)?;
                }
            }
            Ok(dict)
        }

        pub fn click<'py>(
            &mut self,
            py: Python<'py>,
            x: i32,
            y: i32,
        ) -> PyResult<Bound<'py, PyDict>> {
            let dict = PyDict::new(py);
            match self.inner.click(Point::new(x, y)) {
                ClickOutcome::Ignored => dict.set_item("status", "ignored")?,
                ClickOutcome::Unreachable => dict.set_item("status", "unreachable")?,
                ClickOutcome::Started(p) => {
                    dict.set_item("status", "started")?;
                    dict.set_item("anchor", <(i32, i32)>::from(p))?;
                }
                ClickOutcome::Confirmed { segment } => {
                    dict.set_item("status", "confirmed")?;
                    dict.set_item("segment", to_tuples(&segment))?;
                }
                ClickOutcome::Closed(segments) => {
                    dict.set_item("status", "closed")?;
                    let segments: Vec<_> = segments.iter().map(|s| to_tuples(s)).collect();
                    dict.set_item("segments", segments)?;
                }
            }
            Ok(dict)
        }

        pub fn undo(&mut self) -> bool {
            self.inner.undo()
        }

        pub fn reset(&mut self) {
            self.inner.reset();
        }

        /// One of "no_anchor", "tracing", "closable".
        pub fn state(&self) -> &'static str {
            match self.inner.state() {
                AnchorState::NoAnchor => "no_anchor",
                AnchorState::Tracing => "tracing",
                AnchorState::Closable => "closable",
            }
        }

        pub fn is_stable(&self) -> bool {
            self.inner.is_stable()
        }

        /// Confirmed segments of the contour in progress.
        pub fn segments(&self) -> Vec<Vec<(i32, i32)>> {
            self.inner
                .manager()
                .segments()
                .iter()
                .map(|s| to_tuples(s))
                .collect()
        }

        pub fn cost_field<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
            self.inner.cost_field().as_array().clone().into_pyarray(py)
        }

        /// (H, W) u8 mask (255 = selected) of the region a closed contour encloses.
        pub fn extract_mask<'py>(
            &self,
            py: Python<'py>,
            segments: Vec<Vec<(i32, i32)>>,
        ) -> PyResult<Bound<'py, PyArray2<u8>>> {
            let result = self.inner.extract_mask(&from_tuples(segments));
            let shape = (self.inner.height(), self.inner.width());
            let mask = Array2::from_shape_vec(shape, result.mask)
                .map_err(|e| PyValueError::new_err(e.to_string()))?;
            Ok(mask.into_pyarray(py))
        }
    }

    /// Live-wire Rust extension module
    #[pymodule]
    pub fn livewire_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(cost_field, m)?)?;
        m.add_function(wrap_pyfunction!(snap_to_edge, m)?)?;
        m.add_function(wrap_pyfunction!(apply_mask, m)?)?;
        m.add_class::<PyLiveWireSession>()?;
        Ok(())
    }
}
