//! Built-in layouts for well-known Cherenkov telescope cameras.
//!
//! Each entry is synthesized from its pixel count, pixel shape and pixel pitch:
//! the camera is the set of `n_pixels` lattice points closest to the optical
//! axis, numbered by distance from the center and then by polar angle. This
//! reproduces pixel counts, pitch and tiling of the real instruments (not their
//! exact module outlines) and is fully deterministic.
//!
//! The same table doubles as the lookup used by
//! [`CameraGeometry::guess`](crate::CameraGeometry::guess) to name an anonymous
//! layout from its pixel count and focal length.

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use nalgebra::Vector2;
use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::shape::PixelShape;
use crate::units::{Quantity, QuantityVec, Unit};

use super::{CameraRegistry, RawCameraSpec};

/// Static description of a built-in camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownCamera {
    pub name: &'static str,
    /// Telescope class the camera is mounted on.
    pub telescope: &'static str,
    pub n_pixels: usize,
    pub pix_type: PixelShape,
    /// Center-to-center pixel distance in meters.
    pub pitch_m: f64,
    /// Equivalent focal length of the host telescope in meters.
    pub focal_length_m: f64,
    pub pix_rotation_deg: f64,
    pub cam_rotation_deg: f64,
}

pub const KNOWN_CAMERAS: &[KnownCamera] = &[
    KnownCamera {
        name: "LSTCam",
        telescope: "LST",
        n_pixels: 1855,
        pix_type: PixelShape::Hexagonal,
        pitch_m: 0.05,
        focal_length_m: 28.0,
        pix_rotation_deg: 0.0,
        cam_rotation_deg: -100.893,
    },
    KnownCamera {
        name: "NectarCam",
        telescope: "MST",
        n_pixels: 1855,
        pix_type: PixelShape::Hexagonal,
        pitch_m: 0.05,
        focal_length_m: 16.0,
        pix_rotation_deg: 0.0,
        cam_rotation_deg: -100.893,
    },
    KnownCamera {
        name: "FlashCam",
        telescope: "MST",
        n_pixels: 1764,
        pix_type: PixelShape::Hexagonal,
        pitch_m: 0.05,
        focal_length_m: 16.0,
        pix_rotation_deg: 30.0,
        cam_rotation_deg: 0.0,
    },
    KnownCamera {
        name: "HESS-I",
        telescope: "MST",
        n_pixels: 960,
        pix_type: PixelShape::Hexagonal,
        pitch_m: 0.042,
        focal_length_m: 15.0,
        pix_rotation_deg: 0.0,
        cam_rotation_deg: 0.0,
    },
    KnownCamera {
        name: "HESS-II",
        telescope: "LST",
        n_pixels: 2048,
        pix_type: PixelShape::Hexagonal,
        pitch_m: 0.042,
        focal_length_m: 36.0,
        pix_rotation_deg: 0.0,
        cam_rotation_deg: 0.0,
    },
    KnownCamera {
        name: "DigiCam",
        telescope: "SST",
        n_pixels: 1296,
        pix_type: PixelShape::Hexagonal,
        pitch_m: 0.0284,
        focal_length_m: 5.6,
        pix_rotation_deg: 30.0,
        cam_rotation_deg: 0.0,
    },
    KnownCamera {
        name: "ASTRICam",
        telescope: "SST",
        n_pixels: 2368,
        pix_type: PixelShape::Rectangular,
        pitch_m: 0.0071,
        focal_length_m: 2.15,
        pix_rotation_deg: 0.0,
        cam_rotation_deg: 0.0,
    },
    KnownCamera {
        name: "CHEC",
        telescope: "SST",
        n_pixels: 2048,
        pix_type: PixelShape::Rectangular,
        pitch_m: 0.0064,
        focal_length_m: 2.283,
        pix_rotation_deg: 0.0,
        cam_rotation_deg: 0.0,
    },
    KnownCamera {
        name: "SCTCam",
        telescope: "SCT",
        n_pixels: 11328,
        pix_type: PixelShape::Rectangular,
        pitch_m: 0.00662,
        focal_length_m: 5.586,
        pix_rotation_deg: 0.0,
        cam_rotation_deg: 0.0,
    },
];

impl KnownCamera {
    /// Find a built-in camera by exact name.
    pub fn by_name(name: &str) -> Option<&'static KnownCamera> {
        KNOWN_CAMERAS.iter().find(|cam| cam.name == name)
    }

    /// Identify a layout from its pixel count and focal length.
    ///
    /// Both must match a known camera; the focal length is compared after
    /// rounding to 0.1 m.
    pub fn identify(n_pixels: usize, focal_length_m: f64) -> Option<&'static KnownCamera> {
        let rounded = (focal_length_m * 10.0).round();
        KNOWN_CAMERAS.iter().find(|cam| {
            cam.n_pixels == n_pixels && (cam.focal_length_m * 10.0).round() == rounded
        })
    }

    /// Pixel centers in meters.
    pub fn pixel_positions(&self) -> (Vec<f64>, Vec<f64>) {
        let points = match self.pix_type {
            PixelShape::Hexagonal => hexagonal_lattice(self.n_pixels, self.pitch_m),
            PixelShape::Rectangular => square_lattice(self.n_pixels, self.pitch_m),
        };
        points.into_iter().map(|p| (p.x, p.y)).unzip()
    }

    /// Full raw layout of this camera.
    pub fn raw_spec(&self) -> RawCameraSpec {
        let (xs, ys) = self.pixel_positions();
        let area = self.pix_type.pixel_area(self.pitch_m);
        RawCameraSpec {
            cam_id: self.name.to_string(),
            pix_id: None,
            pix_x: QuantityVec::new(xs, Unit::Meter),
            pix_y: QuantityVec::new(ys, Unit::Meter),
            pix_area: Some(QuantityVec::filled(
                self.n_pixels,
                Quantity::new(area, Unit::SquareMeter),
            )),
            pix_type: Some(self.pix_type),
            pix_rotation: Some(Quantity::degrees(self.pix_rotation_deg)),
            cam_rotation: Some(Quantity::degrees(self.cam_rotation_deg)),
        }
    }
}

// ── Lattice synthesis ───────────────────────────────────────────────────────

/// The `n` points of a lattice closest to the origin.
///
/// `norm` is the exact squared length in integer lattice coordinates, so ties
/// are detected exactly and broken by polar angle.
fn closest_lattice_points<N, P>(n: usize, norm: N, position: P) -> Vec<Vector2<f64>>
where
    N: Fn(i64, i64) -> i64,
    P: Fn(i64, i64) -> Vector2<f64>,
{
    // Generous bound: the n-point disc fits well inside this square for both lattices.
    let half = (n as f64).sqrt().ceil() as i64 + 2;
    let mut points: Vec<(i64, f64, Vector2<f64>)> =
        Vec::with_capacity(((2 * half + 1) * (2 * half + 1)) as usize);
    for a in -half..=half {
        for b in -half..=half {
            let p = position(a, b);
            let mut angle = p.y.atan2(p.x);
            if angle < 0.0 {
                angle += TAU;
            }
            points.push((norm(a, b), angle, p));
        }
    }
    points.sort_by(|l, r| l.0.cmp(&r.0).then(l.1.total_cmp(&r.1)));
    points.truncate(n);
    points.into_iter().map(|(_, _, p)| p).collect()
}

fn hexagonal_lattice(n: usize, pitch: f64) -> Vec<Vector2<f64>> {
    let row_height = 3.0_f64.sqrt() / 2.0;
    closest_lattice_points(
        n,
        |a, b| a * a + a * b + b * b,
        |a, b| Vector2::new(pitch * (a as f64 + b as f64 / 2.0), pitch * row_height * b as f64),
    )
}

fn square_lattice(n: usize, pitch: f64) -> Vec<Vector2<f64>> {
    closest_lattice_points(
        n,
        |a, b| a * a + b * b,
        |a, b| Vector2::new(pitch * a as f64, pitch * b as f64),
    )
}

// ── Registry ────────────────────────────────────────────────────────────────

/// Registry backed by [`KNOWN_CAMERAS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRegistry;

impl CameraRegistry for BuiltinRegistry {
    fn lookup(&self, name: &str) -> Result<RawCameraSpec> {
        let cam = KnownCamera::by_name(name)
            .ok_or_else(|| GeometryError::UnknownCamera(name.to_string()))?;
        debug!(
            "Synthesizing {} layout: {} {} pixels, pitch {} m",
            cam.name, cam.n_pixels, cam.pix_type, cam.pitch_m
        );
        Ok(cam.raw_spec())
    }

    fn names(&self) -> BTreeSet<String> {
        KNOWN_CAMERAS.iter().map(|cam| cam.name.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_unique() {
        assert_eq!(BuiltinRegistry.names().len(), KNOWN_CAMERAS.len());
    }

    #[test]
    fn test_pixel_counts() {
        for cam in KNOWN_CAMERAS {
            let (xs, ys) = cam.pixel_positions();
            assert_eq!(xs.len(), cam.n_pixels, "{}", cam.name);
            assert_eq!(ys.len(), cam.n_pixels, "{}", cam.name);
        }
    }

    #[test]
    fn test_center_pixel_first() {
        let (xs, ys) = KnownCamera::by_name("LSTCam").unwrap().pixel_positions();
        assert_eq!((xs[0], ys[0]), (0.0, 0.0));
        // First ring: six pixels one pitch away.
        for i in 1..7 {
            let r = (xs[i] * xs[i] + ys[i] * ys[i]).sqrt();
            assert!((r - 0.05).abs() < 1e-12);
        }
    }

    #[test]
    fn test_identify() {
        assert_eq!(KnownCamera::identify(1855, 28.0).unwrap().name, "LSTCam");
        assert_eq!(KnownCamera::identify(1855, 16.04).unwrap().name, "NectarCam");
        assert!(KnownCamera::identify(1855, 3.0).is_none());
        assert_eq!(KnownCamera::identify(11328, 5.586).unwrap().name, "SCTCam");
        assert!(KnownCamera::identify(11328, 0.0).is_none());
        assert!(KnownCamera::identify(1764, 28.0).is_none());
        assert_eq!(KnownCamera::identify(2048, 2.3).unwrap().name, "CHEC");
        assert!(KnownCamera::identify(7, 1.0).is_none());
    }

    #[test]
    fn test_unknown_camera() {
        assert!(matches!(
            BuiltinRegistry.lookup("NoSuchCam"),
            Err(GeometryError::UnknownCamera(_))
        ));
    }
}
