//! Conversion between [`CameraGeometry`] and [`CameraTable`].
//!
//! One row per pixel with columns `pix_id`, `pix_x`, `pix_y` and `pix_area`
//! (the float columns carry their unit). Camera-level fields go into table
//! metadata. Neighbors are not stored.

use std::path::Path;

use tracing::info;

use crate::error::{GeometryError, Result};
use crate::registry::RawCameraSpec;
use crate::shape::PixelShape;
use crate::table::{CameraTable, Column, ColumnData};
use crate::units::{Quantity, QuantityVec, Unit};

use super::CameraGeometry;

/// Value of the `TAB_TYPE` metadata key.
pub const TABLE_TYPE: &str = "camgeom.CameraGeometry";
/// Value of the `TAB_VER` metadata key.
pub const TABLE_VERSION: &str = "1.0";

impl CameraGeometry {
    /// Encode this geometry as a table.
    pub fn to_table(&self) -> CameraTable {
        let columns = vec![
            Column::int("pix_id", self.pix_id.clone()),
            Column::float("pix_x", self.pix_x.values.clone(), Some(self.pix_x.unit.symbol())),
            Column::float("pix_y", self.pix_y.values.clone(), Some(self.pix_y.unit.symbol())),
            Column::float(
                "pix_area",
                self.pix_area.values.clone(),
                Some(self.pix_area.unit.symbol()),
            ),
        ];
        let mut table = CameraTable {
            columns,
            ..Default::default()
        };
        table.set_meta("TAB_TYPE", TABLE_TYPE);
        table.set_meta("TAB_VER", TABLE_VERSION);
        table.set_meta("CAM_ID", self.cam_id.as_str());
        table.set_meta("PIX_TYPE", self.pix_type.as_str());
        table.set_meta("PIX_ROT", self.pix_rotation.to_string());
        table.set_meta("CAM_ROT", self.cam_rotation.to_string());
        table
    }

    /// Decode a geometry from a table produced by [`CameraGeometry::to_table`].
    pub fn from_table(table: &CameraTable) -> Result<Self> {
        Self::from_raw_spec(RawCameraSpec::from_table(table)?)
    }

    /// Read a table file (see [`CameraTable::read`]) and decode it.
    pub fn from_table_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let geom = Self::from_table(&CameraTable::read(path)?)?;
        info!(
            "Loaded camera geometry {} ({} pixels) from {}",
            geom.cam_id,
            geom.len(),
            path.display()
        );
        Ok(geom)
    }
}

impl RawCameraSpec {
    /// Extract a raw layout from a geometry table.
    pub fn from_table(table: &CameraTable) -> Result<Self> {
        if let Some(tab_type) = table.meta("TAB_TYPE") {
            if tab_type != TABLE_TYPE {
                return Err(invalid("TAB_TYPE", format!("unexpected table type '{}'", tab_type)));
            }
        }

        let cam_id = required_meta(table, "CAM_ID")?.to_string();
        let pix_type = required_meta(table, "PIX_TYPE")?
            .parse::<PixelShape>()
            .map_err(|e: GeometryError| invalid("PIX_TYPE", e.to_string()))?;
        let pix_rotation = optional_angle(table, "PIX_ROT")?;
        let cam_rotation = optional_angle(table, "CAM_ROT")?;

        let pix_id = match &required_column(table, "pix_id")?.data {
            ColumnData::Int(ids) => ids.clone(),
            ColumnData::Float(_) => return Err(invalid("pix_id", "expected an integer column")),
        };

        Ok(RawCameraSpec {
            cam_id,
            pix_id: Some(pix_id),
            pix_x: float_column(table, "pix_x")?,
            pix_y: float_column(table, "pix_y")?,
            pix_area: Some(float_column(table, "pix_area")?),
            pix_type: Some(pix_type),
            pix_rotation,
            cam_rotation,
        })
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> GeometryError {
    GeometryError::InvalidTableField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn required_meta<'a>(table: &'a CameraTable, key: &str) -> Result<&'a str> {
    table
        .meta(key)
        .ok_or_else(|| GeometryError::MissingMetadata(key.to_string()))
}

fn optional_angle(table: &CameraTable, key: &str) -> Result<Option<Quantity>> {
    table
        .meta(key)
        .map(|text| {
            text.parse::<Quantity>()
                .map_err(|e| invalid(key, e.to_string()))
        })
        .transpose()
}

fn required_column<'a>(table: &'a CameraTable, name: &str) -> Result<&'a Column> {
    table
        .column(name)
        .ok_or_else(|| GeometryError::MissingColumn(name.to_string()))
}

fn float_column(table: &CameraTable, name: &str) -> Result<QuantityVec> {
    let column = required_column(table, name)?;
    let ColumnData::Float(values) = &column.data else {
        return Err(invalid(name, "expected a float column"));
    };
    let unit: Unit = column
        .unit
        .as_deref()
        .ok_or_else(|| invalid(name, "missing unit"))?
        .parse()
        .map_err(|e: GeometryError| invalid(name, e.to_string()))?;
    Ok(QuantityVec::new(values.clone(), unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let geom = CameraGeometry::make_rectangular().unwrap();
        let table = geom.to_table();
        assert_eq!(table.num_rows(), 1600);
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["pix_id", "pix_x", "pix_y", "pix_area"]);
        assert_eq!(table.column("pix_area").unwrap().unit.as_deref(), Some("m2"));
        assert_eq!(table.meta("CAM_ID"), Some("Rectangular"));
        assert_eq!(table.meta("PIX_TYPE"), Some("rectangular"));
        assert_eq!(table.meta("CAM_ROT"), Some("0deg"));
    }

    #[test]
    fn test_missing_column() {
        let geom = CameraGeometry::make_rectangular().unwrap();
        let mut table = geom.to_table();
        table.columns.retain(|c| c.name != "pix_y");
        match CameraGeometry::from_table(&table) {
            Err(GeometryError::MissingColumn(name)) => assert_eq!(name, "pix_y"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_metadata() {
        let geom = CameraGeometry::make_rectangular().unwrap();
        let mut table = geom.to_table();
        table.meta.remove("CAM_ID");
        match CameraGeometry::from_table(&table) {
            Err(GeometryError::MissingMetadata(key)) => assert_eq!(key, "CAM_ID"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_fields() {
        let geom = CameraGeometry::make_rectangular().unwrap();

        let mut table = geom.to_table();
        table.set_meta("PIX_TYPE", "triangular");
        assert!(matches!(
            CameraGeometry::from_table(&table),
            Err(GeometryError::InvalidTableField { field, .. }) if field == "PIX_TYPE"
        ));

        let mut table = geom.to_table();
        table.set_meta("TAB_TYPE", "something.Else");
        assert!(CameraGeometry::from_table(&table).is_err());

        let mut table = geom.to_table();
        table.columns[1].unit = Some("parsec".to_string());
        assert!(matches!(
            CameraGeometry::from_table(&table),
            Err(GeometryError::InvalidTableField { field, .. }) if field == "pix_x"
        ));
    }
}
