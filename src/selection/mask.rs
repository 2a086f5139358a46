//! Mask extraction from a closed contour using flood fill.
//!
//! The confirmed segments are rasterised as a boundary, then a 4-connected
//! flood fill starts at the integer centroid of all boundary nodes and stops
//! at boundary pixels and the image border. Boundary pixels themselves are
//! not part of the selection.

use std::collections::VecDeque;

use ndarray::{Array3, ArrayView3};

use crate::geom::Point;

/// Mask extraction result with metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskResult {
    /// Selection mask, row-major (255 = selected, 0 = not selected)
    pub mask: Vec<u8>,
    /// Bounds of selected region
    pub bounds: Option<(usize, usize, usize, usize)>, // (x, y, width, height)
    /// Number of selected pixels
    pub pixel_count: usize,
}

impl MaskResult {
    fn empty(width: usize, height: usize) -> Self {
        Self {
            mask: vec![0u8; width * height],
            bounds: None,
            pixel_count: 0,
        }
    }
}

/// Consumer of closed contours that turns them into a selection mask.
pub trait MaskExtractor {
    fn extract(&self, segments: &[Vec<Point>], width: usize, height: usize) -> MaskResult;
}

/// Default extractor: centroid-seeded 4-connected flood fill.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloodFillExtractor;

impl MaskExtractor for FloodFillExtractor {
    fn extract(&self, segments: &[Vec<Point>], width: usize, height: usize) -> MaskResult {
        contour_mask(segments, width, height)
    }
}

/// Build the selection mask enclosed by `segments`.
///
/// # Arguments
/// * `segments` - Closed contour as an ordered list of node sequences
/// * `width` - Image width
/// * `height` - Image height
///
/// # Returns
/// An empty mask when there are no nodes or the centroid seed falls on the
/// boundary or outside the image.
pub fn contour_mask(segments: &[Vec<Point>], width: usize, height: usize) -> MaskResult {
    let mut result = MaskResult::empty(width, height);
    if width == 0 || height == 0 {
        return result;
    }

    let mut boundary = vec![false; width * height];
    let mut sum_x = 0i64;
    let mut sum_y = 0i64;
    let mut count = 0i64;
    for p in segments.iter().flatten() {
        sum_x += p.x as i64;
        sum_y += p.y as i64;
        count += 1;
        if let Some(idx) = index_of(*p, width, height) {
            boundary[idx] = true;
        }
    }
    if count == 0 {
        return result;
    }

    let seed = Point::new((sum_x / count) as i32, (sum_y / count) as i32);
    let Some(seed_idx) = index_of(seed, width, height) else {
        return result;
    };

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0;
    let mut max_y = 0;

    let mut queue = VecDeque::new();
    let mut visited = vec![false; width * height];
    queue.push_back(seed_idx);
    visited[seed_idx] = true;

    while let Some(idx) = queue.pop_front() {
        if boundary[idx] {
            continue;
        }
        let (x, y) = (idx % width, idx / width);
        result.mask[idx] = 255;
        result.pixel_count += 1;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        for (dx, dy) in &[(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
            if let Some(nidx) = index_of(Point::new(x as i32 + dx, y as i32 + dy), width, height) {
                if !visited[nidx] {
                    visited[nidx] = true;
                    queue.push_back(nidx);
                }
            }
        }
    }

    if result.pixel_count > 0 {
        result.bounds = Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1));
    }
    log::debug!(
        "contour mask: {} pixels selected from seed ({}, {})",
        result.pixel_count,
        seed.x,
        seed.y
    );
    result
}

/// Cut the masked region out of an image.
///
/// # Arguments
/// * `image` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `mask` - Row-major selection mask, `width * height` bytes
///
/// # Returns
/// RGBA image: selected pixels keep their colour (alpha from the source if
/// present, else 255); everything else is fully transparent. `None` when the
/// mask size does not match the image.
pub fn apply_mask_rgba(image: ArrayView3<u8>, mask: &[u8]) -> Option<Array3<u8>> {
    let (height, width, channels) = image.dim();
    if mask.len() != width * height || channels == 0 {
        return None;
    }
    let mut output = Array3::<u8>::zeros((height, width, 4));

    for y in 0..height {
        for x in 0..width {
            if mask[y * width + x] == 0 {
                continue;
            }
            for c in 0..3 {
                let src = if channels >= 3 { c } else { 0 };
                output[[y, x, c]] = image[[y, x, src]];
            }
            output[[y, x, 3]] = if channels == 4 { image[[y, x, 3]] } else { 255 };
        }
    }

    Some(output)
}

#[inline]
fn index_of(p: Point, width: usize, height: usize) -> Option<usize> {
    if p.x >= 0 && p.y >= 0 && (p.x as usize) < width && (p.y as usize) < height {
        Some(p.y as usize * width + p.x as usize)
    } else {
        None
    }
}
