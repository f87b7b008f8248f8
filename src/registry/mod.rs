//! Named camera lookup.
//!
//! A [`CameraRegistry`] maps camera names to raw pixel arrays plus whatever
//! metadata the source knows. [`CameraGeometry`](crate::CameraGeometry) turns a
//! [`RawCameraSpec`] into a validated geometry, filling in the pixel shape and
//! area when the registry leaves them out.
//!
//! Two registries ship with the crate:
//! - [`BuiltinRegistry`]: synthesized layouts of well-known instruments.
//! - [`DirectoryRegistry`]: geometry table files found in a directory.

pub mod builtin;
pub mod directory;

use std::collections::BTreeSet;

use crate::error::Result;
use crate::shape::PixelShape;
use crate::units::{Quantity, QuantityVec};

pub use builtin::{BuiltinRegistry, KnownCamera, KNOWN_CAMERAS};
pub use directory::DirectoryRegistry;

/// Raw pixel description of one camera, as delivered by a registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCameraSpec {
    pub cam_id: String,
    /// Pixel ids. `None` means `0..N`.
    pub pix_id: Option<Vec<i64>>,
    pub pix_x: QuantityVec,
    pub pix_y: QuantityVec,
    /// Per-pixel areas. `None` means "estimate from the pixel spacing".
    pub pix_area: Option<QuantityVec>,
    /// Pixel shape. `None` means "classify from the pixel positions".
    pub pix_type: Option<PixelShape>,
    pub pix_rotation: Option<Quantity>,
    pub cam_rotation: Option<Quantity>,
}

/// Source of named camera layouts.
pub trait CameraRegistry {
    /// Raw layout of the camera called `name`.
    ///
    /// Fails with [`GeometryError::UnknownCamera`](crate::GeometryError::UnknownCamera)
    /// when the name is not registered.
    fn lookup(&self, name: &str) -> Result<RawCameraSpec>;

    /// All names this registry can resolve.
    fn names(&self) -> BTreeSet<String>;
}
