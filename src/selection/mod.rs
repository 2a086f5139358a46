//! Selection output for closed contours.
//!
//! - **mask**: the [`MaskExtractor`](mask::MaskExtractor) interface closed
//!   contours are handed to, the default flood-fill extractor, and RGBA
//!   cutout of the selected region

pub mod mask;

pub use mask::{apply_mask_rgba, contour_mask, FloodFillExtractor, MaskExtractor, MaskResult};
