use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::cache::LoadCache;
use super::model::{CellValue, Table};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// A file picked in upload mode, held in memory.
#[derive(Debug, Clone)]
pub struct Upload {
    /// File name as picked (its extension selects the parser).
    pub name: String,
    pub bytes: Arc<Vec<u8>>,
}

impl Upload {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading upload {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Upload {
            name,
            bytes: Arc::new(bytes),
        })
    }
}

/// Where one dataset comes from on this run.
#[derive(Debug, Clone)]
pub enum Source {
    /// Fixed path on disk.
    Path(PathBuf),
    /// Upload mode; `None` until the user picks a file.
    Upload(Option<Upload>),
}

impl Source {
    /// File name shown in error banners: the path's last component or the
    /// uploaded file's name. `None` while no upload has been picked.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Source::Path(path) => Some(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            ),
            Source::Upload(upload) => upload.as_ref().map(|u| u.name.clone()),
        }
    }
}

/// Result of loading one source.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(Arc<Table>),
    /// Nothing to show. `warning` is set when the user should be told why.
    Absent { warning: Option<String> },
}

impl LoadOutcome {
    pub fn table(&self) -> Option<&Arc<Table>> {
        match self {
            LoadOutcome::Loaded(t) => Some(t),
            LoadOutcome::Absent { .. } => None,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            LoadOutcome::Absent { warning } => warning.as_deref(),
            LoadOutcome::Loaded(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one dataset. A missing file or a missing upload is `Absent`, not an
/// error; malformed contents are an error.
pub fn load_source(source: &Source, label: &str, cache: &mut LoadCache) -> Result<LoadOutcome> {
    match source {
        Source::Upload(None) => {
            log::debug!("{label}: waiting for upload");
            Ok(LoadOutcome::Absent { warning: None })
        }
        Source::Upload(Some(upload)) => {
            let table = cache.load_upload(upload, |u| parse_bytes(&u.name, &u.bytes))?;
            Ok(LoadOutcome::Loaded(table))
        }
        Source::Path(path) => {
            if !path.exists() {
                let warning = DashboardError::MissingSource { path: path.clone() };
                log::warn!("{label}: {warning}");
                return Ok(LoadOutcome::Absent {
                    warning: Some(warning.to_string()),
                });
            }
            let table = cache.load_path(path, load_file)?;
            Ok(LoadOutcome::Loaded(table))
        }
    }
}

/// Load a table from a file.  Dispatch by extension.
pub fn load_file(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let table = parse_with_extension(extension_of(path), &bytes)?;
    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.columns,
        path.display()
    );
    Ok(table)
}

/// Parse in-memory file contents, choosing the format from `name`'s extension.
///
/// Supported formats:
/// * `.csv`     – comma-separated, header row
/// * `.json`    – `[{ "Timepoint": 0, "Gene": "X", ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn parse_bytes(name: &str, bytes: &[u8]) -> Result<Table> {
    parse_with_extension(extension_of(Path::new(name)), bytes)
}

fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Case-insensitive dispatch on a bare extension (no leading dot).
fn parse_with_extension(ext: &str, bytes: &[u8]) -> Result<Table> {
    match ext.to_ascii_lowercase().as_str() {
        "csv" => parse_csv(bytes),
        "json" => parse_json(bytes),
        "parquet" | "pq" => parse_parquet(bytes),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Header row with column names; every cell type-guessed.
/// Short rows are padded with nulls, long rows are rejected.
fn parse_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > columns.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, saw {}",
                columns.len(),
                record.len()
            );
        }
        let mut row: Vec<CellValue> = record.iter().map(CellValue::guess).collect();
        row.resize(columns.len(), CellValue::Null);
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// Columns are the union of all keys in first-seen order.
fn parse_json(bytes: &[u8]) -> Result<Table> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut sparse: Vec<Vec<(usize, CellValue)>> = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let mut cells = Vec::with_capacity(obj.len());
        for (key, val) in obj {
            let idx = *index.entry(key.clone()).or_insert_with(|| {
                columns.push(key.clone());
                columns.len() - 1
            });
            cells.push((idx, json_to_cell(val)));
        }
        sparse.push(cells);
    }

    let rows = sparse
        .into_iter()
        .map(|cells| {
            let mut row = vec![CellValue::Null; columns.len()];
            for (idx, val) in cells {
                row[idx] = val;
            }
            row
        })
        .collect();

    Ok(Table::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Flat Parquet files as written by Pandas (`df.to_parquet()`) or Polars
/// (`df.write_parquet()`). Nested columns are shown as their text rendering.
fn parse_parquet(bytes: &[u8]) -> Result<Table> {
    let data = bytes::Bytes::copy_from_slice(bytes);
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(cells);
        }
    }

    Ok(Table::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::String(
            array_value_to_string(col.as_ref(), row).context("formatting parquet value")?,
        ),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    const GENE_CSV: &str = "Timepoint,Twin,Gene,Expression\n0,A,X,1.0\n400,A,X,9.0\n";

    fn expected_gene_table() -> Table {
        Table::new(
            vec!["Timepoint".into(), "Twin".into(), "Gene".into(), "Expression".into()],
            vec![
                vec![
                    CellValue::Integer(0),
                    CellValue::String("A".into()),
                    CellValue::String("X".into()),
                    CellValue::Float(1.0),
                ],
                vec![
                    CellValue::Integer(400),
                    CellValue::String("A".into()),
                    CellValue::String("X".into()),
                    CellValue::Float(9.0),
                ],
            ],
        )
    }

    #[test]
    fn test_parse_csv() {
        let table = parse_bytes("gene_expression.csv", GENE_CSV.as_bytes()).unwrap();
        assert_eq!(table, expected_gene_table());
    }

    #[test]
    fn test_csv_short_rows_padded_long_rows_rejected() {
        let table = parse_bytes("x.csv", b"Timepoint,Marker,Value\n1,MDA\n").unwrap();
        assert_eq!(table.rows[0][2], CellValue::Null);

        let err = parse_bytes("x.csv", b"Timepoint,Marker\n1,MDA,3,4\n").unwrap_err();
        assert!(format!("{err:#}").contains("expected 2 fields"));
    }

    #[test]
    fn test_parse_json_records() {
        let json = r#"[
            {"Timepoint": 0, "Twin": "A", "Gene": "X", "Expression": 1.0},
            {"Timepoint": 400, "Twin": "A", "Gene": "X", "Expression": 9.0}
        ]"#;
        let table = parse_bytes("gene.json", json.as_bytes()).unwrap();
        assert_eq!(table, expected_gene_table());
    }

    #[test]
    fn test_parse_json_keeps_file_key_order() {
        let json = r#"[
            {"Value": 2.5, "Marker": "MDA", "Timepoint": 10},
            {"Value": 3.0, "Marker": "MDA", "Timepoint": 20, "Assay": "ELISA"}
        ]"#;
        let table = parse_bytes("ox.json", json.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["Value", "Marker", "Timepoint", "Assay"]);
        assert_eq!(table.cell(0, 3), &CellValue::Null);
    }

    #[test]
    fn test_parse_json_rejects_non_array() {
        assert!(parse_bytes("gene.json", br#"{"Timepoint": 0}"#).is_err());
    }

    #[test]
    fn test_parse_parquet() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Timepoint", DataType::Int64, false),
            Field::new("Twin", DataType::Utf8, false),
            Field::new("Gene", DataType::Utf8, false),
            Field::new("Expression", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![0, 400])),
                Arc::new(StringArray::from(vec!["A", "A"])),
                Arc::new(StringArray::from(vec!["X", "X"])),
                Arc::new(Float64Array::from(vec![Some(1.0), Some(9.0)])),
            ],
        )
        .unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let bytes = std::fs::read(file.path()).unwrap();
        let table = parse_bytes("gene.parquet", &bytes).unwrap();
        assert_eq!(table, expected_gene_table());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = parse_bytes("gene.xlsx", b"").unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn test_load_file_dispatches_on_path_extension() {
        let dir = tempfile::tempdir().unwrap();
        // Directory name looks like an extension; only the file's own counts.
        let nested = dir.path().join("run.json");
        std::fs::create_dir(&nested).unwrap();
        let path = nested.join("GENE_EXPRESSION.CSV");
        std::fs::write(&path, GENE_CSV).unwrap();

        assert_eq!(load_file(&path).unwrap(), expected_gene_table());

        let bare = nested.join("gene_expression");
        std::fs::write(&bare, GENE_CSV).unwrap();
        let err = load_file(&bare).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn test_missing_path_is_absent_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gene_expression.csv");
        let mut cache = LoadCache::default();

        let outcome = load_source(&Source::Path(path.clone()), "Gene Expression", &mut cache).unwrap();
        assert!(outcome.table().is_none());
        let warning = outcome.warning().unwrap();
        assert_eq!(warning, format!("File not found: {}", path.display()));
    }

    #[test]
    fn test_source_file_name() {
        let path = Source::Path(PathBuf::from("data/ox_custom.csv"));
        assert_eq!(path.file_name().as_deref(), Some("ox_custom.csv"));

        let upload = Source::Upload(Some(Upload {
            name: "uploaded.json".into(),
            bytes: Arc::new(Vec::new()),
        }));
        assert_eq!(upload.file_name().as_deref(), Some("uploaded.json"));
        assert_eq!(Source::Upload(None).file_name(), None);
    }

    #[test]
    fn test_upload_mode_without_file_is_absent_silently() {
        let mut cache = LoadCache::default();
        let outcome = load_source(&Source::Upload(None), "Gene Expression", &mut cache).unwrap();
        assert!(outcome.table().is_none());
        assert!(outcome.warning().is_none());
    }

    #[test]
    fn test_load_existing_path_and_upload() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(GENE_CSV.as_bytes()).unwrap();
        let mut cache = LoadCache::default();

        let from_path = load_source(&Source::Path(file.path().to_path_buf()), "Gene", &mut cache).unwrap();
        assert_eq!(from_path.table().unwrap().as_ref(), &expected_gene_table());

        let upload = Upload::from_path(file.path()).unwrap();
        let from_upload = load_source(&Source::Upload(Some(upload)), "Gene", &mut cache).unwrap();
        assert_eq!(from_upload.table().unwrap().as_ref(), &expected_gene_table());
    }
}
