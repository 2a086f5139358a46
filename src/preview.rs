//! Debug rendering of cost fields and traced paths.
//!
//! Output images use the (height, width, channels) layout accepted by
//! [`CostField::from_image`], so a rendered preview can be fed straight back
//! into the pipeline.

use ndarray::Array3;

use crate::cost_field::CostField;
use crate::geom::Point;

const PATH_COLOR: [u8; 3] = [255, 0, 0];
const START_COLOR: [u8; 3] = [0, 255, 0];
const END_COLOR: [u8; 3] = [0, 0, 255];

#[inline]
fn cost_to_u8(cost: f64) -> u8 {
    (cost * 255.0).clamp(0.0, 255.0) as u8
}

/// Cost field as a single-channel 8-bit image (`255 * cost`).
pub fn cost_to_gray_u8(field: &CostField) -> Array3<u8> {
    let (width, height) = (field.width(), field.height());
    Array3::from_shape_fn((height, width, 1), |(y, x, _)| cost_to_u8(field.at(x, y)))
}

/// Grayscale cost field with `path` drawn on top.
///
/// Path pixels are red, the first node gets a green 3x3 marker and the last
/// node a blue one. Markers are clipped at the image border and nodes outside
/// the field are skipped.
pub fn render_path_overlay(field: &CostField, path: &[Point]) -> Array3<u8> {
    let (width, height) = (field.width(), field.height());
    let mut output = Array3::from_shape_fn((height, width, 3), |(y, x, _)| {
        cost_to_u8(field.at(x, y))
    });

    let mut put = |p: Point, color: [u8; 3]| {
        if field.contains(p) {
            let (x, y) = (p.x as usize, p.y as usize);
            for c in 0..3 {
                output[[y, x, c]] = color[c];
            }
        }
    };

    for &p in path {
        put(p, PATH_COLOR);
    }

    let markers = [(path.first(), START_COLOR), (path.last(), END_COLOR)];
    for (node, color) in markers {
        let Some(&center) = node else { continue };
        for dy in -1..=1 {
            for dx in -1..=1 {
                put(Point::new(center.x + dx, center.y + dy), color);
            }
        }
    }

    output
}
