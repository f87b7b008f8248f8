//! Registry over a directory of persisted geometry tables.
//!
//! Every file named `<name>.camgeom.<ext>` (with `ext` one of `rkyv`, `ecsv`,
//! `csv`, optionally followed by `.gz`) registers the camera `<name>`. Files
//! are only read on lookup. When several files name the same camera, the one
//! whose extension comes first in that list wins, uncompressed before `.gz`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{GeometryError, Result};
use crate::table::CameraTable;

use super::{CameraRegistry, RawCameraSpec};

const GEOMETRY_SUFFIX: &str = ".camgeom";
/// In order of preference.
const EXTENSIONS: &[&str] = &["rkyv", "ecsv", "csv"];

#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    dir: PathBuf,
    files: BTreeMap<String, PathBuf>,
}

impl DirectoryRegistry {
    /// Scan `dir` for geometry table files.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let mut found: BTreeMap<String, (usize, PathBuf)> = BTreeMap::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some((name, rank)) = camera_name_from_path(&path) else {
                continue;
            };
            match found.get(&name) {
                Some((best, previous)) if *best <= rank => {
                    warn!(
                        "Camera {} defined twice; using {} over {}",
                        name,
                        previous.display(),
                        path.display()
                    );
                }
                Some((_, previous)) => {
                    warn!(
                        "Camera {} defined twice; using {} over {}",
                        name,
                        path.display(),
                        previous.display()
                    );
                    found.insert(name, (rank, path));
                }
                None => {
                    found.insert(name, (rank, path));
                }
            }
        }
        let files: BTreeMap<String, PathBuf> = found
            .into_iter()
            .map(|(name, (_, path))| (name, path))
            .collect();
        info!("Found {} camera geometries in {}", files.len(), dir.display());
        Ok(Self { dir, files })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the table file for `name`, if registered.
    pub fn path_for(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(PathBuf::as_path)
    }
}

/// `"LSTCam.camgeom.rkyv"` → `("LSTCam", 0)`. The rank orders files that
/// name the same camera; lower is preferred.
fn camera_name_from_path(path: &Path) -> Option<(String, usize)> {
    let file_name = path.file_name()?.to_str()?;
    let (file_name, gzip) = match file_name.strip_suffix(".gz") {
        Some(inner) => (inner, true),
        None => (file_name, false),
    };
    let (stem, ext) = file_name.rsplit_once('.')?;
    let position = EXTENSIONS.iter().position(|&e| e == ext)?;
    let name = stem.strip_suffix(GEOMETRY_SUFFIX)?;
    (!name.is_empty()).then(|| (name.to_string(), 2 * position + usize::from(gzip)))
}

impl CameraRegistry for DirectoryRegistry {
    fn lookup(&self, name: &str) -> Result<RawCameraSpec> {
        let path = self
            .path_for(name)
            .ok_or_else(|| GeometryError::UnknownCamera(name.to_string()))?;
        let table = CameraTable::read(path)?;
        RawCameraSpec::from_table(&table)
    }

    fn names(&self) -> BTreeSet<String> {
        self.files.keys().cloned().collect()
    }
}
