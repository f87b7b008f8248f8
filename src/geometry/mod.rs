//! The camera geometry entity.
//!
//! `CameraGeometry` stores per-pixel ids, positions and areas together with the
//! pixel shape and orientation metadata. Derived structures (neighbor list,
//! neighbor matrix, spatial index) are computed on first access and cached
//! behind [`OnceLock`], so a geometry can be shared across threads and each
//! structure is computed at most once.
//!
//! Geometries are immutable: slicing and rotation produce new geometries.

mod codec;
pub mod rectangular;

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use nalgebra::{DMatrix, Rotation2, Vector2};
use tracing::{debug, info, warn};

use crate::error::{GeometryError, Result};
use crate::neighbors::{
    find_neighbor_pixels, median_neighbor_count, min_pixel_separation, NEIGHBOR_RADIUS_FACTOR,
};
use crate::pixel_index::PixelIndex;
use crate::registry::{BuiltinRegistry, CameraRegistry, KnownCamera, RawCameraSpec};
use crate::shape::{classify_pixel_shape, PixelShape};
use crate::units::{Dimension, Quantity, QuantityVec, Unit};

pub use codec::{TABLE_TYPE, TABLE_VERSION};
pub use rectangular::{rectangular_grid, RectangularGridConfig};

/// Everything needed to build a [`CameraGeometry`] directly.
#[derive(Debug, Clone)]
pub struct CameraGeometryConfig {
    pub cam_id: String,
    pub pix_id: Vec<i64>,
    pub pix_x: QuantityVec,
    pub pix_y: QuantityVec,
    /// `None` estimates the area from the minimum pixel separation.
    pub pix_area: Option<QuantityVec>,
    /// Precomputed neighbor lists (positional indices). `None` derives them on demand.
    pub neighbors: Option<Vec<Vec<usize>>>,
    pub pix_type: PixelShape,
    pub pix_rotation: Quantity,
    pub cam_rotation: Quantity,
}

/// Pixels to keep when slicing a geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelSelection {
    /// A contiguous block of positions, kept in source order.
    Range(Range<usize>),
    /// Explicit positions, kept in the given order.
    Indices(Vec<usize>),
}

impl PixelSelection {
    fn resolve(&self, len: usize) -> Result<Vec<usize>> {
        match self {
            PixelSelection::Range(range) => {
                if range.end > len {
                    return Err(GeometryError::IndexOutOfRange {
                        index: range.end - 1,
                        len,
                    });
                }
                Ok(range.clone().collect())
            }
            PixelSelection::Indices(indices) => {
                if let Some(&index) = indices.iter().find(|&&i| i >= len) {
                    return Err(GeometryError::IndexOutOfRange { index, len });
                }
                Ok(indices.clone())
            }
        }
    }
}

impl From<Range<usize>> for PixelSelection {
    fn from(range: Range<usize>) -> Self {
        PixelSelection::Range(range)
    }
}

impl From<Vec<usize>> for PixelSelection {
    fn from(indices: Vec<usize>) -> Self {
        PixelSelection::Indices(indices)
    }
}

impl From<&[usize]> for PixelSelection {
    fn from(indices: &[usize]) -> Self {
        PixelSelection::Indices(indices.to_vec())
    }
}

/// Pixel layout of a camera plus lazily derived adjacency structures.
#[derive(Debug, Clone)]
pub struct CameraGeometry {
    cam_id: String,
    pix_id: Vec<i64>,
    pix_x: QuantityVec,
    pix_y: QuantityVec,
    pix_area: QuantityVec,
    pix_type: PixelShape,
    pix_rotation: Quantity,
    cam_rotation: Quantity,
    neighbors: OnceLock<Vec<Vec<usize>>>,
    neighbor_matrix: OnceLock<DMatrix<bool>>,
    pixel_index: OnceLock<Option<(PixelIndex, f64)>>,
}

impl CameraGeometry {
    /// Build a geometry from explicit arrays, validating every invariant.
    pub fn new(config: CameraGeometryConfig) -> Result<Self> {
        let CameraGeometryConfig {
            cam_id,
            pix_id,
            pix_x,
            pix_y,
            pix_area,
            neighbors,
            pix_type,
            pix_rotation,
            cam_rotation,
        } = config;
        let n = pix_id.len();

        check_len("pix_x", n, pix_x.len())?;
        check_len("pix_y", n, pix_y.len())?;

        match pix_x.unit.dimension() {
            Dimension::Length | Dimension::Angle => {}
            _ => {
                return Err(GeometryError::IncompatibleUnits {
                    from: pix_x.unit.to_string(),
                    to: "a length or angle".to_string(),
                })
            }
        }
        let pix_y = if pix_y.unit == pix_x.unit {
            pix_y
        } else {
            pix_y.to(pix_x.unit)?
        };
        check_angle(&pix_rotation)?;
        check_angle(&cam_rotation)?;

        let mut seen = HashSet::with_capacity(n);
        for &id in &pix_id {
            if !seen.insert(id) {
                return Err(GeometryError::DuplicatePixelId(id));
            }
        }

        let area_unit = pix_x.unit.squared().ok_or_else(|| GeometryError::IncompatibleUnits {
            from: pix_x.unit.to_string(),
            to: "an area".to_string(),
        })?;
        let pix_area = match pix_area {
            Some(area) => {
                check_len("pix_area", n, area.len())?;
                if area.unit.dimension() != area_unit.dimension() {
                    return Err(GeometryError::IncompatibleUnits {
                        from: area.unit.to_string(),
                        to: area_unit.to_string(),
                    });
                }
                area
            }
            None => {
                let separation = min_pixel_separation(pix_x.values(), pix_y.values())?;
                QuantityVec::filled(n, Quantity::new(pix_type.pixel_area(separation), area_unit))
            }
        };

        let neighbor_cache = OnceLock::new();
        if let Some(neighbors) = neighbors {
            check_len("neighbors", n, neighbors.len())?;
            for (pixel, list) in neighbors.iter().enumerate() {
                if let Some(&neighbor) = list.iter().find(|&&j| j >= n) {
                    return Err(GeometryError::InvalidNeighbor {
                        pixel,
                        neighbor,
                        len: n,
                    });
                }
            }
            let _ = neighbor_cache.set(neighbors);
        }

        Ok(Self {
            cam_id,
            pix_id,
            pix_x,
            pix_y,
            pix_area,
            pix_type,
            pix_rotation,
            cam_rotation,
            neighbors: neighbor_cache,
            neighbor_matrix: OnceLock::new(),
            pixel_index: OnceLock::new(),
        })
    }

    /// Build a geometry from a registry entry, classifying the shape and
    /// estimating areas where the entry leaves them out.
    pub fn from_raw_spec(raw: RawCameraSpec) -> Result<Self> {
        let pix_type = match raw.pix_type {
            Some(shape) => shape,
            None => {
                let pix_y = raw.pix_y.to(raw.pix_x.unit)?;
                classify_pixel_shape(raw.pix_x.values(), pix_y.values())?
            }
        };
        let pix_id = raw
            .pix_id
            .unwrap_or_else(|| (0..raw.pix_x.len() as i64).collect());
        Self::new(CameraGeometryConfig {
            cam_id: raw.cam_id,
            pix_id,
            pix_x: raw.pix_x,
            pix_y: raw.pix_y,
            pix_area: raw.pix_area,
            neighbors: None,
            pix_type,
            pix_rotation: raw.pix_rotation.unwrap_or(Quantity::degrees(0.0)),
            cam_rotation: raw.cam_rotation.unwrap_or(Quantity::degrees(0.0)),
        })
    }

    /// Load one of the built-in cameras by name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::from_registry(&BuiltinRegistry, name)
    }

    /// Load a camera by name from any registry.
    pub fn from_registry(registry: &dyn CameraRegistry, name: &str) -> Result<Self> {
        let geom = Self::from_raw_spec(registry.lookup(name)?)?;
        info!(
            "Loaded camera geometry {} ({} {} pixels)",
            geom.cam_id,
            geom.len(),
            geom.pix_type
        );
        Ok(geom)
    }

    /// Names of all built-in cameras.
    pub fn get_known_camera_names() -> std::collections::BTreeSet<String> {
        BuiltinRegistry.names()
    }

    /// Build a geometry from bare pixel positions.
    ///
    /// The pixel shape is inferred from the positions. If the pixel count and
    /// the focal length match a known camera, its name and rotations are used;
    /// otherwise the camera is called `"unknown"`.
    pub fn guess(pix_x: QuantityVec, pix_y: QuantityVec, focal_length: Quantity) -> Result<Self> {
        let focal_m = focal_length.to(Unit::Meter)?.value;
        let pix_y = pix_y.to(pix_x.unit)?;
        let pix_type = classify_pixel_shape(pix_x.values(), pix_y.values())?;

        let known = KnownCamera::identify(pix_x.len(), focal_m);
        let (cam_id, pix_rotation, cam_rotation) = match known {
            Some(cam) => {
                if cam.pix_type != pix_type {
                    warn!(
                        "Layout matches {} by pixel count and focal length, but its pixels look {}",
                        cam.name, pix_type
                    );
                }
                (
                    cam.name.to_string(),
                    Quantity::degrees(cam.pix_rotation_deg),
                    Quantity::degrees(cam.cam_rotation_deg),
                )
            }
            None => (
                "unknown".to_string(),
                Quantity::degrees(0.0),
                Quantity::degrees(0.0),
            ),
        };
        debug!("Guessed camera {} ({}) for {} pixels", cam_id, pix_type, pix_x.len());

        Self::new(CameraGeometryConfig {
            cam_id,
            pix_id: (0..pix_x.len() as i64).collect(),
            pix_x,
            pix_y,
            pix_area: None,
            neighbors: None,
            pix_type,
            pix_rotation,
            cam_rotation,
        })
    }

    /// A 40×40 rectangular test camera spanning ±0.5 m.
    pub fn make_rectangular() -> Result<Self> {
        Self::make_rectangular_with(&RectangularGridConfig::default())
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn cam_id(&self) -> &str {
        &self.cam_id
    }

    pub fn pix_id(&self) -> &[i64] {
        &self.pix_id
    }

    pub fn pix_x(&self) -> &QuantityVec {
        &self.pix_x
    }

    pub fn pix_y(&self) -> &QuantityVec {
        &self.pix_y
    }

    pub fn pix_area(&self) -> &QuantityVec {
        &self.pix_area
    }

    pub fn pix_type(&self) -> PixelShape {
        self.pix_type
    }

    pub fn pix_rotation(&self) -> Quantity {
        self.pix_rotation
    }

    pub fn cam_rotation(&self) -> Quantity {
        self.cam_rotation
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pix_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pix_id.is_empty()
    }

    /// Minimum distance between two pixel centers, in the coordinate unit.
    pub fn min_pixel_separation(&self) -> Result<Quantity> {
        let d = min_pixel_separation(self.pix_x.values(), self.pix_y.values())?;
        Ok(Quantity::new(d, self.pix_x.unit))
    }

    // ── Derived structures ──────────────────────────────────────────────────

    /// Neighbor list: for each pixel, the positions of its adjacent pixels.
    ///
    /// Supplied lists are returned as given. Otherwise pixels closer than
    /// [`NEIGHBOR_RADIUS_FACTOR`] times the minimum separation are neighbors.
    pub fn neighbors(&self) -> &[Vec<usize>] {
        self.neighbors.get_or_init(|| self.compute_neighbors())
    }

    fn compute_neighbors(&self) -> Vec<Vec<usize>> {
        let xs = self.pix_x.values();
        let ys = self.pix_y.values();
        let result = min_pixel_separation(xs, ys)
            .and_then(|sep| find_neighbor_pixels(xs, ys, NEIGHBOR_RADIUS_FACTOR * sep));
        match result {
            Ok(neighbors) => {
                debug!(
                    "Computed neighbors for {}: median {} per pixel",
                    self.cam_id,
                    median_neighbor_count(&neighbors)
                );
                neighbors
            }
            Err(e) => {
                warn!("No neighbors for {}: {}", self.cam_id, e);
                vec![Vec::new(); self.len()]
            }
        }
    }

    /// Dense `N × N` adjacency matrix; `(i, j)` is set iff `j` neighbors `i`.
    pub fn neighbor_matrix(&self) -> &DMatrix<bool> {
        self.neighbor_matrix.get_or_init(|| {
            let n = self.len();
            let mut matrix = DMatrix::from_element(n, n, false);
            for (i, list) in self.neighbors().iter().enumerate() {
                for &j in list {
                    matrix[(i, j)] = true;
                }
            }
            matrix
        })
    }

    /// Number of neighbors of each pixel (row sums of the neighbor matrix).
    pub fn neighbor_counts(&self) -> Vec<usize> {
        self.neighbor_matrix()
            .row_iter()
            .map(|row| row.iter().filter(|&&set| set).count())
            .collect()
    }

    /// Pixels within `width` rings of the camera edge.
    ///
    /// The outermost ring is every pixel with fewer neighbors than the best
    /// connected pixel; each further ring adds the neighbors of the previous mask.
    pub fn border_pixel_mask(&self, width: usize) -> Vec<bool> {
        let n = self.len();
        if width == 0 || n == 0 {
            return vec![false; n];
        }
        let counts: Vec<usize> = self.neighbors().iter().map(Vec::len).collect();
        let max_count = counts.iter().copied().max().unwrap_or(0);
        let mut mask: Vec<bool> = counts.iter().map(|&c| c < max_count).collect();

        for _ in 1..width {
            let mut grown = mask.clone();
            for (i, list) in self.neighbors().iter().enumerate() {
                if mask[i] {
                    for &j in list {
                        grown[j] = true;
                    }
                }
            }
            mask = grown;
        }
        mask
    }

    /// Position of the pixel whose center is closest to `(x, y)`, if the point
    /// lies within one pixel separation of it.
    pub fn position_to_pix_index(&self, x: Quantity, y: Quantity) -> Result<Option<usize>> {
        let x = x.to(self.pix_x.unit)?.value;
        let y = y.to(self.pix_x.unit)?.value;
        let index = self.pixel_index.get_or_init(|| {
            let xs = self.pix_x.values();
            let ys = self.pix_y.values();
            min_pixel_separation(xs, ys)
                .ok()
                .map(|sep| (PixelIndex::new(xs, ys, sep), sep))
        });
        Ok(index
            .as_ref()
            .and_then(|(index, sep)| index.nearest_within(x, y, *sep)))
    }

    // ── Derived geometries ──────────────────────────────────────────────────

    /// New geometry holding the selected pixels.
    ///
    /// Neighbor information is not carried over; the result derives its own
    /// neighbors from the selected positions on first access.
    pub fn select<S: Into<PixelSelection>>(&self, selection: S) -> Result<Self> {
        let indices = selection.into().resolve(self.len())?;
        let mut taken = vec![false; self.len()];
        for &i in &indices {
            if std::mem::replace(&mut taken[i], true) {
                return Err(GeometryError::DuplicatePixelId(self.pix_id[i]));
            }
        }
        Ok(Self {
            cam_id: self.cam_id.clone(),
            pix_id: indices.iter().map(|&i| self.pix_id[i]).collect(),
            pix_x: self.pix_x.gather(&indices),
            pix_y: self.pix_y.gather(&indices),
            pix_area: self.pix_area.gather(&indices),
            pix_type: self.pix_type,
            pix_rotation: self.pix_rotation,
            cam_rotation: self.cam_rotation,
            neighbors: OnceLock::new(),
            neighbor_matrix: OnceLock::new(),
            pixel_index: OnceLock::new(),
        })
    }

    /// New geometry with pixel positions rotated counter-clockwise by `angle`
    /// about the camera center. Both rotation angles grow by `angle`.
    ///
    /// Rotation preserves distances, so already computed neighbors are kept.
    pub fn rotate(&self, angle: Quantity) -> Result<Self> {
        check_angle(&angle)?;
        let rotation = Rotation2::new(angle.to(Unit::Radian)?.value);
        let (xs, ys): (Vec<f64>, Vec<f64>) = self
            .pix_x
            .values()
            .iter()
            .zip(self.pix_y.values())
            .map(|(&x, &y)| {
                let p = rotation * Vector2::new(x, y);
                (p.x, p.y)
            })
            .unzip();

        let neighbors = OnceLock::new();
        if let Some(existing) = self.neighbors.get() {
            let _ = neighbors.set(existing.clone());
        }
        Ok(Self {
            cam_id: self.cam_id.clone(),
            pix_id: self.pix_id.clone(),
            pix_x: QuantityVec::new(xs, self.pix_x.unit),
            pix_y: QuantityVec::new(ys, self.pix_x.unit),
            pix_area: self.pix_area.clone(),
            pix_type: self.pix_type,
            pix_rotation: self.pix_rotation.checked_add(angle)?,
            cam_rotation: self.cam_rotation.checked_add(angle)?,
            neighbors,
            neighbor_matrix: OnceLock::new(),
            pixel_index: OnceLock::new(),
        })
    }
}

impl fmt::Display for CameraGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CameraGeometry(cam_id={}, pix_type={}, npix={}, cam_rot={})",
            self.cam_id,
            self.pix_type,
            self.len(),
            self.cam_rotation
        )
    }
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(GeometryError::LengthMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_angle(q: &Quantity) -> Result<()> {
    if q.unit.dimension() != Dimension::Angle {
        return Err(GeometryError::IncompatibleUnits {
            from: q.unit.to_string(),
            to: "an angle".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_pixel_config() -> CameraGeometryConfig {
        CameraGeometryConfig {
            cam_id: "TestCam".to_string(),
            pix_id: vec![0, 1, 2],
            pix_x: QuantityVec::new(vec![0.0, 1.0, 2.0], Unit::Degree),
            pix_y: QuantityVec::new(vec![0.0, 1.0, 2.0], Unit::Degree),
            pix_area: Some(QuantityVec::new(vec![1.0; 3], Unit::SquareDegree)),
            neighbors: Some(vec![vec![1], vec![0, 2], vec![1]]),
            pix_type: "rectangular".parse().unwrap(),
            pix_rotation: "0deg".parse().unwrap(),
            cam_rotation: "0deg".parse().unwrap(),
        }
    }

    #[test]
    fn test_precalculated_neighbors() {
        let geom = CameraGeometry::new(three_pixel_config()).unwrap();
        assert_eq!(geom.neighbors().len(), geom.pix_x().len());
        assert_eq!(geom.neighbors()[1], vec![0, 2]);
        let nmat = geom.neighbor_matrix();
        assert_eq!(nmat.shape(), (3, 3));
        assert!(nmat[(0, 1)] && nmat[(1, 0)] && nmat[(2, 1)]);
        assert!(!nmat[(0, 2)]);
    }

    #[test]
    fn test_length_mismatch() {
        let mut config = three_pixel_config();
        config.pix_y = QuantityVec::new(vec![0.0, 1.0], Unit::Degree);
        assert!(matches!(
            CameraGeometry::new(config),
            Err(GeometryError::LengthMismatch { field: "pix_y", .. })
        ));

        let mut config = three_pixel_config();
        config.pix_area = Some(QuantityVec::new(vec![1.0; 4], Unit::SquareDegree));
        assert!(matches!(
            CameraGeometry::new(config),
            Err(GeometryError::LengthMismatch { field: "pix_area", .. })
        ));

        let mut config = three_pixel_config();
        config.neighbors = Some(vec![vec![1]]);
        assert!(matches!(
            CameraGeometry::new(config),
            Err(GeometryError::LengthMismatch { field: "neighbors", .. })
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        let mut config = three_pixel_config();
        config.pix_id = vec![0, 1, 1];
        assert!(matches!(
            CameraGeometry::new(config),
            Err(GeometryError::DuplicatePixelId(1))
        ));

        let mut config = three_pixel_config();
        config.neighbors = Some(vec![vec![1], vec![0, 5], vec![1]]);
        assert!(matches!(
            CameraGeometry::new(config),
            Err(GeometryError::InvalidNeighbor { pixel: 1, neighbor: 5, .. })
        ));

        let mut config = three_pixel_config();
        config.pix_area = Some(QuantityVec::new(vec![1.0; 3], Unit::SquareMeter));
        assert!(matches!(
            CameraGeometry::new(config),
            Err(GeometryError::IncompatibleUnits { .. })
        ));

        let mut config = three_pixel_config();
        config.cam_rotation = Quantity::meters(1.0);
        assert!(CameraGeometry::new(config).is_err());
    }

    #[test]
    fn test_default_area() {
        let mut config = three_pixel_config();
        config.pix_area = None;
        config.pix_x = QuantityVec::new(vec![0.0, 2.0, 4.0], Unit::Meter);
        config.pix_y = QuantityVec::new(vec![0.0, 0.0, 0.0], Unit::Meter);
        let geom = CameraGeometry::new(config).unwrap();
        assert_eq!(geom.pix_area().unit, Unit::SquareMeter);
        assert_eq!(geom.pix_area().values(), &[4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_pix_y_converted_to_pix_x_unit() {
        let mut config = three_pixel_config();
        config.pix_x = QuantityVec::new(vec![0.0, 1.0, 2.0], Unit::Meter);
        config.pix_y = QuantityVec::new(vec![0.0, 100.0, 200.0], Unit::Centimeter);
        config.pix_area = None;
        let geom = CameraGeometry::new(config).unwrap();
        assert_eq!(geom.pix_y().unit, Unit::Meter);
        assert!((geom.pix_y().values()[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_select_range_and_indices() {
        let geom = CameraGeometry::make_rectangular().unwrap();
        let sliced = geom.select(10..20).unwrap();
        assert_eq!(sliced.len(), 10);
        assert_eq!(sliced.pix_id()[0], 10);

        let picked = geom.select(vec![7, 3, 5]).unwrap();
        assert_eq!(picked.pix_id(), &[7, 3, 5]);
        assert_eq!(picked.pix_x().values()[0], geom.pix_x().values()[7]);

        assert!(matches!(
            geom.select(vec![0, 5000]),
            Err(GeometryError::IndexOutOfRange { index: 5000, .. })
        ));
        assert!(geom.select(1590..1601).is_err());
        assert!(matches!(
            geom.select(vec![4, 9, 4]),
            Err(GeometryError::DuplicatePixelId(4))
        ));
    }

    #[test]
    fn test_select_recomputes_neighbors() {
        let geom = CameraGeometry::make_rectangular().unwrap();
        assert_eq!(geom.neighbors()[0], vec![1, 40]);

        // Second row only: pixels 40..80 form a line.
        let row = geom.select(40..80).unwrap();
        for (i, list) in row.neighbors().iter().enumerate() {
            assert!(list.iter().all(|&j| j < row.len()), "pixel {}", i);
        }
        assert_eq!(row.neighbors()[0], vec![1]);
        assert_eq!(row.neighbors()[5], vec![4, 6]);
    }

    #[test]
    fn test_border_pixel_mask() {
        let geom = CameraGeometry::make_rectangular().unwrap();
        let border = geom.border_pixel_mask(1);
        assert_eq!(border.iter().filter(|&&b| b).count(), 4 * 40 - 4);
        let border2 = geom.border_pixel_mask(2);
        assert_eq!(border2.iter().filter(|&&b| b).count(), 40 * 40 - 36 * 36);
        assert!(geom.border_pixel_mask(0).iter().all(|&b| !b));
    }

    #[test]
    fn test_position_to_pix_index() {
        let geom = CameraGeometry::make_rectangular().unwrap();
        let idx = geom
            .position_to_pix_index(Quantity::meters(-0.5), Quantity::meters(-0.5))
            .unwrap();
        assert_eq!(idx, Some(0));
        let idx = geom
            .position_to_pix_index(Quantity::new(50.0, Unit::Centimeter), Quantity::meters(0.5))
            .unwrap();
        assert_eq!(idx, Some(1599));
        let idx = geom
            .position_to_pix_index(Quantity::meters(3.0), Quantity::meters(0.0))
            .unwrap();
        assert_eq!(idx, None);
        assert!(geom
            .position_to_pix_index(Quantity::degrees(1.0), Quantity::meters(0.0))
            .is_err());
    }

    #[test]
    fn test_rotate() {
        let geom = CameraGeometry::from_name("LSTCam").unwrap();
        let rotated = geom.rotate(Quantity::degrees(90.0)).unwrap();
        // Pixel 1 sits at (pitch, 0) and moves to (0, pitch).
        assert!((rotated.pix_x().values()[1]).abs() < 1e-12);
        assert!((rotated.pix_y().values()[1] - 0.05).abs() < 1e-12);
        assert!((rotated.cam_rotation().value - (-10.893)).abs() < 1e-9);
        assert_eq!(rotated.pix_area(), geom.pix_area());
        assert!(geom.rotate(Quantity::meters(1.0)).is_err());
    }

    #[test]
    fn test_display() {
        let geom = CameraGeometry::make_rectangular().unwrap();
        let text = geom.to_string();
        assert!(text.contains("Rectangular"));
        assert!(text.contains("npix=1600"));
    }
}
