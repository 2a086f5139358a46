//! WebAssembly exports for live-wire tracing.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images come in
//! as flat RGBA bytes; points and paths go out as flat `Vec<i32>`:
//!
//! - **path**: `[x0, y0, x1, y1, ...]`
//! - **contour**: `[num_segments, len1, x, y, ..., len2, x, y, ...]` where
//!   `len` counts points, not integers

use ndarray::{Array3, ArrayView3};
use wasm_bindgen::prelude::*;

use crate::config::LiveWireConfig;
use crate::contour::{AnchorState, ClickOutcome, MoveOutcome};
use crate::cost_field::CostField;
use crate::error::LiveWireError;
use crate::geom::Point;
use crate::session::LiveWireSession;

fn to_js_err(err: LiveWireError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn rgba_view(data: &[u8], width: usize, height: usize) -> Result<ArrayView3<'_, u8>, JsValue> {
    ArrayView3::from_shape((height, width, 4), data).map_err(|_| {
        to_js_err(LiveWireError::SizeMismatch {
            expected: width * height * 4,
            actual: data.len(),
        })
    })
}

fn flatten_path(points: &[Point]) -> Vec<i32> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

fn flatten_contour(segments: &[Vec<Point>]) -> Vec<i32> {
    let mut flat = vec![segments.len() as i32];
    for segment in segments {
        flat.push(segment.len() as i32);
        flat.extend(flatten_path(segment));
    }
    flat
}

/// Inverse of the contour layout; truncated input yields the complete
/// segments read so far.
fn unflatten_contour(flat: &[i32]) -> Vec<Vec<Point>> {
    let mut segments = Vec::new();
    let Some((&count, mut rest)) = flat.split_first() else {
        return segments;
    };
    for _ in 0..count.max(0) {
        let Some((&len, tail)) = rest.split_first() else {
            break;
        };
        let n = len.max(0) as usize * 2;
        if tail.len() < n {
            break;
        }
        let segment = tail[..n]
            .chunks_exact(2)
            .map(|xy| Point::new(xy[0], xy[1]))
            .collect();
        segments.push(segment);
        rest = &tail[n..];
    }
    segments
}

// ============================================================================
// Cost Field
// ============================================================================

/// Compute the edge cost field of an RGBA image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// Row-major costs in [0, 1] (length = width * height)
#[wasm_bindgen]
pub fn cost_field_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<f64>, JsValue> {
    let field = CostField::from_image(rgba_view(data, width, height)?).map_err(to_js_err)?;
    Ok(field.into_array().into_raw_vec_and_offset().0)
}

/// Render the cost field of an RGBA image as opaque grayscale RGBA.
#[wasm_bindgen]
pub fn cost_preview_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    let field = CostField::from_image(rgba_view(data, width, height)?).map_err(to_js_err)?;
    let gray = crate::preview::cost_to_gray_u8(&field);
    let rgba = Array3::from_shape_fn((height, width, 4), |(y, x, c)| {
        if c == 3 {
            255
        } else {
            gray[[y, x, 0]]
        }
    });
    Ok(rgba.into_raw_vec_and_offset().0)
}

// ============================================================================
// Interactive Session
// ============================================================================

/// Live-wire session for JavaScript callers.
#[wasm_bindgen]
pub struct LiveWireWasm {
    session: LiveWireSession,
    closed: Vec<Vec<Point>>,
}

#[wasm_bindgen]
impl LiveWireWasm {
    #[wasm_bindgen(constructor)]
    pub fn new(data: &[u8], width: usize, height: usize) -> Result<LiveWireWasm, JsValue> {
        let session = LiveWireSession::new(rgba_view(data, width, height)?, LiveWireConfig::default())
            .map_err(to_js_err)?;
        Ok(Self {
            session,
            closed: Vec::new(),
        })
    }

    /// Replace the image and discard the contour.
    pub fn load_image(&mut self, data: &[u8], width: usize, height: usize) -> Result<(), JsValue> {
        self.session
            .load_image(rgba_view(data, width, height)?)
            .map_err(to_js_err)?;
        self.closed.clear();
        Ok(())
    }

    /// Live path to the snapped cursor as a flat path; empty when there is
    /// nothing to draw.
    pub fn pointer_move(&mut self, x: i32, y: i32) -> Vec<i32> {
        match self.session.pointer_move(Point::new(x, y)) {
            MoveOutcome::Preview(preview) => flatten_path(&preview.path),
            _ => Vec::new(),
        }
    }

    /// Click at (x, y). Returns true when the click closed the contour; the
    /// closed contour is then available from `closed_contour`.
    pub fn click(&mut self, x: i32, y: i32) -> bool {
        match self.session.click(Point::new(x, y)) {
            ClickOutcome::Closed(segments) => {
                self.closed = segments;
                true
            }
            _ => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.closed.clear();
    }

    /// 0 = no anchor, 1 = tracing, 2 = closable.
    pub fn state(&self) -> u8 {
        match self.session.state() {
            AnchorState::NoAnchor => 0,
            AnchorState::Tracing => 1,
            AnchorState::Closable => 2,
        }
    }

    pub fn is_stable(&self) -> bool {
        self.session.is_stable()
    }

    /// Snapped cursor `[x, y]`, or empty before the first move.
    pub fn snapped_point(&self) -> Vec<i32> {
        self.session
            .manager()
            .snapped_point()
            .map(|p| vec![p.x, p.y])
            .unwrap_or_default()
    }

    /// Confirmed segments of the contour in progress (contour layout).
    pub fn segments(&self) -> Vec<i32> {
        flatten_contour(self.session.manager().segments())
    }

    /// Most recently closed contour (contour layout).
    pub fn closed_contour(&self) -> Vec<i32> {
        flatten_contour(&self.closed)
    }

    /// Mask (255/0, length = width * height) enclosed by a contour given in
    /// the contour layout.
    pub fn extract_mask(&self, contour: &[i32]) -> Vec<u8> {
        self.session.extract_mask(&unflatten_contour(contour)).mask
    }

    /// RGBA cutout of `data` through `mask`; fully transparent outside.
    pub fn apply_mask(&self, data: &[u8], mask: &[u8]) -> Result<Vec<u8>, JsValue> {
        let image = rgba_view(data, self.session.width(), self.session.height())?;
        crate::selection::mask::apply_mask_rgba(image, mask)
            .map(|out| out.into_raw_vec_and_offset().0)
            .ok_or_else(|| JsValue::from_str("mask size does not match image"))
    }
}
