//! Pixel tiling shape and the heuristic that infers it from pixel positions.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::neighbors::{find_neighbor_pixels, median_neighbor_count, min_pixel_separation};

/// Radius, in units of the minimum separation, within which pixels count as
/// nearest neighbors for classification.
pub const SHAPE_RADIUS_FACTOR: f64 = 1.05;

/// Median nearest-neighbor count at or above which a layout is hexagonal.
///
/// A square lattice has 4 nearest neighbors, a hexagonal one 6.
pub const HEXAGONAL_MIN_NEIGHBORS: f64 = 5.0;

/// Tiling shape of the pixels in a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelShape {
    Hexagonal,
    Rectangular,
}

impl PixelShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelShape::Hexagonal => "hexagonal",
            PixelShape::Rectangular => "rectangular",
        }
    }

    /// Area of one pixel whose centers are `separation` apart.
    ///
    /// Hexagons are taken flat-to-flat, giving `√3/2 · d²`.
    pub fn pixel_area(&self, separation: f64) -> f64 {
        match self {
            PixelShape::Hexagonal => 3.0_f64.sqrt() / 2.0 * separation * separation,
            PixelShape::Rectangular => separation * separation,
        }
    }
}

impl fmt::Display for PixelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelShape {
    type Err = GeometryError;

    /// Accepts anything starting with `hex` or `rect` (any case), and `square`.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if lower.starts_with("hex") {
            Ok(PixelShape::Hexagonal)
        } else if lower.starts_with("rect") || lower.starts_with("square") {
            Ok(PixelShape::Rectangular)
        } else {
            Err(GeometryError::UnknownPixelType(s.to_string()))
        }
    }
}

/// Infer the pixel shape from pixel centers.
///
/// Counts, for every pixel, the neighbors within [`SHAPE_RADIUS_FACTOR`] times the
/// minimum separation, and compares the median count with
/// [`HEXAGONAL_MIN_NEIGHBORS`]. Sparse or collinear layouts come out rectangular.
pub fn classify_pixel_shape(xs: &[f64], ys: &[f64]) -> Result<PixelShape> {
    let separation = min_pixel_separation(xs, ys)?;
    let neighbors = find_neighbor_pixels(xs, ys, SHAPE_RADIUS_FACTOR * separation)?;
    let median = median_neighbor_count(&neighbors);

    let shape = if median >= HEXAGONAL_MIN_NEIGHBORS {
        PixelShape::Hexagonal
    } else {
        PixelShape::Rectangular
    };
    debug!(
        "Classified {} pixels as {} (median nearest-neighbor count {})",
        xs.len(),
        shape,
        median
    );
    Ok(shape)
}
