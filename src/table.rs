//! Column-oriented table with table-level metadata, and its file formats.
//!
//! Two on-disk formats are supported, chosen by file extension:
//! - `.csv` / `.ecsv`: text. Header comment lines carry metadata, column units
//!   and column types, followed by ordinary CSV with a header row.
//! - anything else: binary, serialized with [rkyv](https://docs.rs/rkyv).
//!
//! A trailing `.gz` (`cam.camgeom.rkyv.gz`, `cam.camgeom.csv.gz`) gzip-compresses
//! either format. Metadata values and units in the text header are written as
//! quoted, escaped strings.
//!
//! Both formats reproduce floating-point values bit for bit.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rkyv::{Archive, Deserialize, Serialize};
use tracing::info;

use crate::error::{GeometryError, Result};

/// Values of one column.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Int(_) => "int64",
            ColumnData::Float(_) => "float64",
        }
    }

    fn cell(&self, row: usize) -> Cell {
        match self {
            ColumnData::Int(v) => Cell::Int(v[row]),
            ColumnData::Float(v) => Cell::Float(v[row]),
        }
    }
}

/// A named, optionally unit-tagged column.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub unit: Option<String>,
    pub data: ColumnData,
}

impl Column {
    pub fn int(name: &str, values: Vec<i64>) -> Self {
        Self {
            name: name.to_string(),
            unit: None,
            data: ColumnData::Int(values),
        }
    }

    pub fn float(name: &str, values: Vec<f64>, unit: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.map(str::to_string),
            data: ColumnData::Float(values),
        }
    }
}

/// One value of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Table of equally long columns plus string key/value metadata.
#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct CameraTable {
    pub columns: Vec<Column>,
    pub meta: BTreeMap<String, String>,
}

impl CameraTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Its length must match the existing columns.
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if let Some(first) = self.columns.first() {
            if first.data.len() != column.data.len() {
                return Err(GeometryError::LengthMismatch {
                    field: "column",
                    expected: first.data.len(),
                    actual: column.data.len(),
                });
            }
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    /// Iterate over rows, each row holding one cell per column in column order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Cell>> + '_ {
        (0..self.num_rows()).map(move |row| self.columns.iter().map(|c| c.data.cell(row)).collect())
    }

    pub fn set_meta(&mut self, key: &str, value: impl Into<String>) {
        self.meta.insert(key.to_string(), value.into());
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    // ── Binary format ───────────────────────────────────────────────────────

    /// Serialize the table to bytes using rkyv.
    pub fn to_rkyv_bytes(&self) -> Result<Vec<u8>> {
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map_err(|e| GeometryError::Serialization(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Deserialize a table from rkyv bytes, validating them first.
    pub fn from_rkyv_bytes(bytes: &[u8]) -> Result<Self> {
        // Archived f64/i64 columns need 8-byte alignment; file buffers carry no guarantee.
        let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned)
            .map_err(|e| GeometryError::Serialization(e.to_string()))
    }

    // ── Files ───────────────────────────────────────────────────────────────

    /// Write the table to `path`, in the format implied by its extension.
    ///
    /// A trailing `.gz` gzip-compresses the file; the extension before it picks
    /// the format. Fails with [`GeometryError::FileExists`] if the file exists
    /// and `overwrite` is false.
    pub fn write<P: AsRef<Path>>(&self, path: P, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        if !overwrite && path.exists() {
            return Err(GeometryError::FileExists(path.to_path_buf()));
        }
        let format = FileFormat::from_path(path);
        let bytes = if format.text {
            self.to_text_bytes()?
        } else {
            self.to_rkyv_bytes()?
        };
        let file = BufWriter::new(File::create(path)?);
        if format.gzip {
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(&bytes)?;
            encoder.finish()?.flush()?;
        } else {
            let mut file = file;
            file.write_all(&bytes)?;
            file.flush()?;
        }
        info!(
            "Wrote table with {} rows and {} columns to {}",
            self.num_rows(),
            self.columns.len(),
            path.display()
        );
        Ok(())
    }

    /// Read a table written by [`CameraTable::write`].
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path);
        let mut bytes = std::fs::read(path)?;
        if format.gzip {
            let mut decoded = Vec::new();
            GzDecoder::new(bytes.as_slice()).read_to_end(&mut decoded)?;
            bytes = decoded;
        }
        let table = if format.text {
            let text = String::from_utf8(bytes)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            Self::parse_text(&text)?
        } else {
            Self::from_rkyv_bytes(&bytes)?
        };
        info!(
            "Read table with {} rows from {}",
            table.num_rows(),
            path.display()
        );
        Ok(table)
    }

    // ── Text format ─────────────────────────────────────────────────────────

    fn to_text_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for (key, value) in &self.meta {
            check_header_key(key)?;
            writeln!(out, "# meta {} = {:?}", key, value)?;
        }
        for column in &self.columns {
            check_header_key(&column.name)?;
            writeln!(out, "# dtype {} = {}", column.name, column.data.type_name())?;
            if let Some(unit) = &column.unit {
                writeln!(out, "# unit {} = {:?}", column.name, unit)?;
            }
        }

        let mut writer = csv::Writer::from_writer(&mut out);
        writer.write_record(self.column_names())?;
        for row in self.rows() {
            writer.write_record(row.iter().map(Cell::to_string))?;
        }
        writer.flush()?;
        drop(writer);
        Ok(out)
    }

    fn parse_text(text: &str) -> Result<Self> {
        let mut meta = BTreeMap::new();
        let mut dtypes: BTreeMap<String, String> = BTreeMap::new();
        let mut units: BTreeMap<String, String> = BTreeMap::new();

        for line in text.lines() {
            let Some(header) = line.strip_prefix('#') else {
                continue;
            };
            let Some((kind, rest)) = header.trim().split_once(' ') else {
                continue;
            };
            let Some((key, value)) = rest.split_once('=') else {
                continue;
            };
            let key = key.trim().to_string();
            let value = unquote(value.trim()).ok_or_else(|| GeometryError::InvalidTableField {
                field: key.clone(),
                reason: format!("malformed quoted value {}", value.trim()),
            })?;
            match kind {
                "meta" => {
                    meta.insert(key, value);
                }
                "dtype" => {
                    dtypes.insert(key, value);
                }
                "unit" => {
                    units.insert(key, value);
                }
                _ => {}
            }
        }

        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .from_reader(text.as_bytes());
        let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];
        for record in reader.records() {
            let record = record?;
            for (col, field) in record.iter().enumerate() {
                if let Some(values) = raw.get_mut(col) {
                    values.push(field.to_string());
                }
            }
        }

        let mut table = CameraTable {
            columns: Vec::with_capacity(names.len()),
            meta,
        };
        for (name, values) in names.into_iter().zip(raw) {
            let data = match dtypes.get(&name).map(String::as_str) {
                Some("int64") => ColumnData::Int(parse_values(&name, &values)?),
                Some("float64") | None => ColumnData::Float(parse_values(&name, &values)?),
                Some(other) => {
                    return Err(GeometryError::InvalidTableField {
                        field: name,
                        reason: format!("unsupported column type '{}'", other),
                    })
                }
            };
            let unit = units.remove(&name);
            table.add_column(Column { name, unit, data })?;
        }
        Ok(table)
    }
}

/// Storage format derived from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileFormat {
    text: bool,
    gzip: bool,
}

impl FileFormat {
    fn from_path(path: &Path) -> Self {
        let gzip = path.extension().is_some_and(|e| e == "gz");
        let inner = if gzip {
            path.file_stem().map(Path::new)
        } else {
            Some(path)
        };
        let text = matches!(
            inner.and_then(Path::extension).and_then(|e| e.to_str()),
            Some("csv") | Some("ecsv")
        );
        Self { text, gzip }
    }
}

/// Header keys and column names are stored unquoted, so they must survive
/// the `# kind KEY = value` line and the CSV header row unchanged.
fn check_header_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        Some("empty name")
    } else if key.trim() != key {
        Some("leading or trailing whitespace")
    } else if key.starts_with('#') {
        Some("starts with '#'")
    } else if key.contains(['=', '\n', '\r']) {
        Some("contains '=' or a line break")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(GeometryError::InvalidTableField {
            field: key.to_string(),
            reason: format!("cannot be stored in a text table: {}", reason),
        }),
        None => Ok(()),
    }
}

/// Inverse of the `{:?}` formatting of a string. Unquoted input is taken
/// verbatim, so hand-written headers stay readable.
fn unquote(value: &str) -> Option<String> {
    let Some(inner) = value.strip_prefix('"') else {
        return Some(value.to_string());
    };
    let inner = inner.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next()? {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'u' => {
                let rest = chars.as_str().strip_prefix('{')?;
                let (hex, tail) = rest.split_once('}')?;
                let c = char::from_u32(u32::from_str_radix(hex, 16).ok()?)?;
                chars = tail.chars();
                c
            }
            _ => return None,
        };
        out.push(escaped);
    }
    Some(out)
}

fn parse_values<T: std::str::FromStr>(column: &str, values: &[String]) -> Result<Vec<T>> {
    values
        .iter()
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| GeometryError::InvalidTableField {
                    field: column.to_string(),
                    reason: format!("cannot parse value '{}'", v),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> CameraTable {
        let mut table = CameraTable::new();
        table.add_column(Column::int("id", vec![3, 1, 2])).unwrap();
        table
            .add_column(Column::float("x", vec![0.1, -2.5e-7, 1.0 / 3.0], Some("m")))
            .unwrap();
        table.set_meta("NAME", "test table");
        table
    }

    #[test]
    fn test_rows() {
        let table = sample_table();
        let rows: Vec<Vec<Cell>> = table.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![Cell::Int(1), Cell::Float(-2.5e-7)]);
    }

    #[test]
    fn test_column_length_checked() {
        let mut table = sample_table();
        assert!(matches!(
            table.add_column(Column::int("short", vec![1])),
            Err(GeometryError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_rkyv_bytes_roundtrip() {
        let table = sample_table();
        let bytes = table.to_rkyv_bytes().unwrap();
        let back = CameraTable::from_rkyv_bytes(&bytes).unwrap();
        assert_eq!(table, back);
    }

    #[test]
    fn test_text_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let table = sample_table();
        table.write(&path, false).unwrap();
        let back = CameraTable::read(&path).unwrap();
        assert_eq!(table, back);
    }

    #[test]
    fn test_bad_value_reported() {
        let text = "# dtype id = int64\nid\n1\nabc\n";
        match CameraTable::parse_text(text) {
            Err(GeometryError::InvalidTableField { field, .. }) => assert_eq!(field, "id"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_text_metadata_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.ecsv");
        let mut table = sample_table();
        table.set_meta("PADDED", "  spaced  ");
        table.set_meta("LINES", "first\nsecond\r\tthird");
        table.set_meta("QUOTED", "say \"hi\" = \\o/ # not a comment");
        table.set_meta("EMPTY", "");
        table.set_meta("ODD", "bell\u{7}é");
        table.write(&path, false).unwrap();
        let back = CameraTable::read(&path).unwrap();
        assert_eq!(table, back);
    }

    #[test]
    fn test_text_rejects_unstorable_names() {
        let dir = tempfile::tempdir().unwrap();
        for key in ["", " KEY", "A=B", "A\nB", "#KEY"] {
            let mut table = sample_table();
            table.set_meta(key, "value");
            let path = dir.path().join("bad.csv");
            assert!(
                matches!(
                    table.write(&path, true),
                    Err(GeometryError::InvalidTableField { .. })
                ),
                "key {:?}",
                key
            );
        }
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("plain").as_deref(), Some("plain"));
        assert_eq!(unquote("\"a\\\\b\"").as_deref(), Some("a\\b"));
        assert_eq!(unquote("\"\\u{e9}\"").as_deref(), Some("é"));
        assert!(unquote("\"open").is_none());
        assert!(unquote("\"bad \\q\"").is_none());
    }

    #[test]
    fn test_file_format_from_path() {
        let format = |p: &str| FileFormat::from_path(Path::new(p));
        assert_eq!(format("a.csv"), FileFormat { text: true, gzip: false });
        assert_eq!(format("a.camgeom.ecsv.gz"), FileFormat { text: true, gzip: true });
        assert_eq!(format("a.camgeom.rkyv.gz"), FileFormat { text: false, gzip: true });
        assert_eq!(format("a.rkyv"), FileFormat { text: false, gzip: false });
        assert_eq!(format("a.gz"), FileFormat { text: false, gzip: true });
    }

    #[test]
    fn test_gzip_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["table.rkyv.gz", "table.csv.gz"] {
            let path = dir.path().join(name);
            let table = sample_table();
            table.write(&path, false).unwrap();
            // gzip magic number
            let raw = std::fs::read(&path).unwrap();
            assert_eq!(&raw[..2], &[0x1f, 0x8b], "{}", name);
            assert_eq!(CameraTable::read(&path).unwrap(), table, "{}", name);
        }
    }

    #[test]
    fn test_no_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.rkyv");
        let table = sample_table();
        table.write(&path, false).unwrap();
        assert!(matches!(
            table.write(&path, false),
            Err(GeometryError::FileExists(_))
        ));
        table.write(&path, true).unwrap();
    }
}
