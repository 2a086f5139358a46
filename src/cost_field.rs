//! Per-pixel edge cost derived from Sobel gradients.
//!
//! ## Algorithm
//!
//! 1. For every pixel and every colour channel, apply the 3x3 Sobel kernels.
//!    Neighbours outside the image are skipped (no padding, no mirroring), so
//!    border pixels see a truncated kernel.
//! 2. Channel magnitude = `sqrt(gx² + gy²)`; pixel magnitude =
//!    `sqrt(Σ channel magnitude²)` over the colour channels.
//! 3. Normalise with `(v - min) / (max - min + 1e-8)` and invert, so strong
//!    edges cost close to 0 and flat regions cost close to 1.
//!
//! ## Supported Formats
//!
//! - **Grayscale**: (height, width, 1) - single channel used directly
//! - **RGB**: (height, width, 3)
//! - **RGBA**: (height, width, 4) - alpha is ignored
//!
//! Rows are processed in parallel with Rayon.

use ndarray::{Array2, ArrayView3};
use rayon::prelude::*;

use crate::error::{LiveWireError, Result};
use crate::geom::Point;

/// Guards the normalisation against a perfectly flat image.
pub const NORMALIZE_EPSILON: f64 = 1e-8;

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Immutable cost grid, one value in [0, 1] per pixel, indexed `[[y, x]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostField {
    values: Array2<f64>,
    width: usize,
    height: usize,
}

impl CostField {
    /// Build the cost field of an image.
    ///
    /// # Arguments
    /// * `image` - Image with 1, 3, or 4 channels (height, width, channels)
    ///
    /// # Errors
    /// Zero-sized images and 2-channel or >4-channel inputs are rejected.
    pub fn from_image(image: ArrayView3<u8>) -> Result<Self> {
        let (height, width, channels) = image.dim();
        if width == 0 || height == 0 {
            return Err(LiveWireError::EmptyImage { width, height });
        }
        let color_channels = match channels {
            1 => 1,
            3 | 4 => 3,
            n => return Err(LiveWireError::UnsupportedChannels(n)),
        };

        let mut magnitude = vec![0.0f64; width * height];
        magnitude
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    *out = gradient_magnitude(&image, x, y, color_channels);
                }
            });

        let (min, max) = magnitude
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min + NORMALIZE_EPSILON;
        magnitude
            .par_iter_mut()
            .for_each(|v| *v = 1.0 - (*v - min) / range);

        log::debug!(
            "cost field {}x{}: gradient magnitude range [{:.3}, {:.3}]",
            width,
            height,
            min,
            max
        );

        Self::from_vec_unchecked(width, height, magnitude)
    }

    /// Wrap precomputed costs (row-major, `y * width + x`).
    ///
    /// # Errors
    /// The buffer must hold exactly `width * height` finite values in [0, 1].
    pub fn from_values(width: usize, height: usize, values: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LiveWireError::EmptyImage { width, height });
        }
        if values.len() != width * height {
            return Err(LiveWireError::SizeMismatch {
                expected: width * height,
                actual: values.len(),
            });
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(LiveWireError::CostOutOfRange { index, value });
        }
        Self::from_vec_unchecked(width, height, values)
    }

    /// Field with the same cost everywhere. `cost` is clamped to [0, 1].
    pub fn uniform(width: usize, height: usize, cost: f64) -> Result<Self> {
        Self::from_values(width, height, vec![cost.clamp(0.0, 1.0); width * height])
    }

    fn from_vec_unchecked(width: usize, height: usize, values: Vec<f64>) -> Result<Self> {
        let actual = values.len();
        let values = Array2::from_shape_vec((height, width), values).map_err(|_| {
            LiveWireError::SizeMismatch {
                expected: width * height,
                actual,
            }
        })?;
        Ok(Self {
            values,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false; a field has at least one pixel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width && (p.y as usize) < self.height
    }

    /// Cost at `p`, or `None` outside the field.
    #[inline]
    pub fn get(&self, p: Point) -> Option<f64> {
        if self.contains(p) {
            Some(self.values[[p.y as usize, p.x as usize]])
        } else {
            None
        }
    }

    /// Cost at an in-bounds pixel. Panics when out of range.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f64 {
        self.values[[y, x]]
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_array(self) -> Array2<f64> {
        self.values
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Combined Sobel magnitude at (x, y) over the first `color_channels` channels.
#[inline]
fn gradient_magnitude(image: &ArrayView3<u8>, x: usize, y: usize, color_channels: usize) -> f64 {
    let (height, width, _) = image.dim();
    let mut gx = [0i32; 3];
    let mut gy = [0i32; 3];

    for ky in 0..3 {
        let sy = y as isize + ky as isize - 1;
        if sy < 0 || sy >= height as isize {
            continue;
        }
        for kx in 0..3 {
            let sx = x as isize + kx as isize - 1;
            if sx < 0 || sx >= width as isize {
                continue;
            }
            for c in 0..color_channels {
                let v = image[[sy as usize, sx as usize, c]] as i32;
                gx[c] += v * SOBEL_X[ky][kx];
                gy[c] += v * SOBEL_Y[ky][kx];
            }
        }
    }

    let mut sum_sq = 0.0f64;
    for c in 0..color_channels {
        let (gx, gy) = (gx[c] as f64, gy[c] as f64);
        // channel magnitude squared
        sum_sq += gx * gx + gy * gy;
    }
    sum_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn solid(width: usize, height: usize, value: u8) -> Array3<u8> {
        Array3::from_elem((height, width, 3), value)
    }

    /// Left half black, right half white.
    fn vertical_edge(width: usize, height: usize) -> Array3<u8> {
        let mut image = Array3::<u8>::zeros((height, width, 3));
        for y in 0..height {
            for x in width / 2..width {
                for c in 0..3 {
                    image[[y, x, c]] = 255;
                }
            }
        }
        image
    }

    #[test]
    fn test_values_in_unit_range() {
        let mut image = Array3::<u8>::zeros((7, 9, 4));
        for y in 0..7 {
            for x in 0..9 {
                image[[y, x, 0]] = (x * 29) as u8;
                image[[y, x, 1]] = (y * 37) as u8;
                image[[y, x, 2]] = ((x * y) % 256) as u8;
                image[[y, x, 3]] = 255;
            }
        }
        let field = CostField::from_image(image.view()).unwrap();
        assert!(field.as_array().iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(field.min().abs() < 1e-6);
        assert!((field.max() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_flat_image_interior_costs_one() {
        let field = CostField::from_image(solid(5, 4, 128).view()).unwrap();
        assert_eq!(field.width(), 5);
        assert_eq!(field.height(), 4);
        for y in 1..3 {
            for x in 1..4 {
                assert_eq!(field.at(x, y), 1.0);
            }
        }
    }

    #[test]
    fn test_border_pixels_use_truncated_kernel() {
        // Skipped neighbours are not zero-padded, so the truncated kernel
        // sees a gradient on the border of an otherwise flat image.
        let field = CostField::from_image(solid(4, 4, 200).view()).unwrap();
        assert!(field.get(Point::new(0, 0)).unwrap() < 0.5);
        assert_eq!(field.get(Point::new(1, 1)), Some(1.0));
    }

    #[test]
    fn test_single_pixel() {
        let field = CostField::from_image(solid(1, 1, 42).view()).unwrap();
        assert_eq!(field.get(Point::new(0, 0)), Some(1.0));
    }

    #[test]
    fn test_grayscale_matches_rgb_ordering() {
        let rgb = vertical_edge(8, 6);
        let gray = rgb.slice(ndarray::s![.., .., 0..1]).to_owned();
        let a = CostField::from_image(rgb.view()).unwrap();
        let b = CostField::from_image(gray.view()).unwrap();
        for (va, vb) in a.as_array().iter().zip(b.as_array().iter()) {
            assert!((va - vb).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        let empty = Array3::<u8>::zeros((0, 4, 3));
        assert_eq!(
            CostField::from_image(empty.view()),
            Err(LiveWireError::EmptyImage { width: 4, height: 0 })
        );
        let two = Array3::<u8>::zeros((2, 2, 2));
        assert_eq!(
            CostField::from_image(two.view()),
            Err(LiveWireError::UnsupportedChannels(2))
        );
    }

    #[test]
    fn test_from_values_validation() {
        assert!(CostField::from_values(2, 2, vec![0.0, 0.5, 1.0, 0.25]).is_ok());
        assert_eq!(
            CostField::from_values(2, 2, vec![0.0; 3]),
            Err(LiveWireError::SizeMismatch { expected: 4, actual: 3 })
        );
        assert_eq!(
            CostField::from_values(2, 1, vec![0.0, 1.5]),
            Err(LiveWireError::CostOutOfRange { index: 1, value: 1.5 })
        );
        assert!(CostField::from_values(1, 1, vec![f64::NAN]).is_err());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let field = CostField::uniform(3, 3, 0.5).unwrap();
        assert_eq!(field.get(Point::new(2, 2)), Some(0.5));
        assert_eq!(field.get(Point::new(-1, 0)), None);
        assert_eq!(field.get(Point::new(0, 3)), None);
    }
}
