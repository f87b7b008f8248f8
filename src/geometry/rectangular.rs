//! Regular rectangular pixel grids for tests and simulations.

use crate::error::{GeometryError, Result};
use crate::neighbors::linspace;
use crate::shape::PixelShape;
use crate::units::{Quantity, QuantityVec, Unit};

use super::{CameraGeometry, CameraGeometryConfig};

/// Camera id given to generated grids.
pub const RECTANGULAR_CAM_ID: &str = "Rectangular";

/// Parameters of a generated rectangular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangularGridConfig {
    /// Pixels along x.
    pub npix_x: usize,
    /// Pixels along y.
    pub npix_y: usize,
    /// Centers of the first and last column.
    pub range_x: (f64, f64),
    /// Centers of the first and last row.
    pub range_y: (f64, f64),
    /// Unit of the ranges.
    pub unit: Unit,
}

impl Default for RectangularGridConfig {
    fn default() -> Self {
        Self {
            npix_x: 40,
            npix_y: 40,
            range_x: (-0.5, 0.5),
            range_y: (-0.5, 0.5),
            unit: Unit::Meter,
        }
    }
}

/// Row-major flattened pixel centers (x varies fastest) of the configured grid.
pub fn rectangular_grid(config: &RectangularGridConfig) -> (Vec<f64>, Vec<f64>) {
    let bx = linspace(config.range_x.0, config.range_x.1, config.npix_x);
    let by = linspace(config.range_y.0, config.range_y.1, config.npix_y);
    let n = bx.len() * by.len();
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for &y in &by {
        for &x in &bx {
            xs.push(x);
            ys.push(y);
        }
    }
    (xs, ys)
}

impl CameraGeometry {
    /// Rectangular test camera with the given grid parameters.
    ///
    /// Pixel areas are the square of the x pitch.
    pub fn make_rectangular_with(config: &RectangularGridConfig) -> Result<Self> {
        if config.npix_x < 2 || config.npix_y < 1 {
            return Err(GeometryError::InvalidGridConfig(format!(
                "need at least 2×1 pixels, got {}×{}",
                config.npix_x, config.npix_y
            )));
        }
        let area_unit = config.unit.squared().ok_or_else(|| {
            GeometryError::InvalidGridConfig(format!(
                "'{}' is not a coordinate unit",
                config.unit
            ))
        })?;

        let (xs, ys) = rectangular_grid(config);
        let pitch = xs[1] - xs[0];
        let n = xs.len();

        Self::new(CameraGeometryConfig {
            cam_id: RECTANGULAR_CAM_ID.to_string(),
            pix_id: (0..n as i64).collect(),
            pix_x: QuantityVec::new(xs, config.unit),
            pix_y: QuantityVec::new(ys, config.unit),
            pix_area: Some(QuantityVec::filled(n, Quantity::new(pitch * pitch, area_unit))),
            neighbors: None,
            pix_type: PixelShape::Rectangular,
            pix_rotation: Quantity::degrees(0.0),
            cam_rotation: Quantity::degrees(0.0),
        })
    }
}
