use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arrow::array::{Array, AsArray, Float32Array, Float64Array, LargeListArray, ListArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, Record, RecordLabel};

/// Timeout applied to every HTTP fetch.
const HTTP_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("fetching {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parsing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("reading record batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("{0}")]
    InvalidDocument(String),

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("unsupported file extension: .{0}")]
    Unsupported(String),

    #[error("load cancelled")]
    Cancelled,
}

impl LoadError {
    fn row(row: usize, message: impl Into<String>) -> Self {
        LoadError::InvalidRow {
            row,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resource locations
// ---------------------------------------------------------------------------

/// Where a dataset is read from: a local file or an HTTP(S) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSource {
    File(PathBuf),
    Url(String),
}

impl ResourceSource {
    /// Join `relative` onto `base`. A base starting with `http://` or
    /// `https://` yields a URL, anything else a filesystem path.
    pub fn resolve(base: &str, relative: &str) -> Self {
        let relative = relative.trim_start_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            ResourceSource::Url(format!("{}/{relative}", base.trim_end_matches('/')))
        } else {
            ResourceSource::File(Path::new(base).join(relative))
        }
    }

    /// Lower-cased file extension, ignoring any URL query or fragment.
    pub fn extension(&self) -> String {
        let name = match self {
            ResourceSource::File(path) => {
                return path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_ascii_lowercase();
            }
            ResourceSource::Url(url) => {
                let path = url.split(['?', '#']).next().unwrap_or("");
                path.rsplit('/').next().unwrap_or("")
            }
        };
        name.rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

impl fmt::Display for ResourceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceSource::File(path) => write!(f, "{}", path.display()),
            ResourceSource::Url(url) => write!(f, "{url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read the raw bytes of a resource.
pub fn fetch(source: &ResourceSource) -> Result<Vec<u8>, LoadError> {
    match source {
        ResourceSource::File(path) => std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        }),
        ResourceSource::Url(url) => fetch_url(url),
    }
}

fn fetch_url(url: &str) -> Result<Vec<u8>, LoadError> {
    let http_err = |source: reqwest::Error| LoadError::Http {
        url: url.to_string(),
        source: source.without_url(),
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .map_err(http_err)?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(http_err)?;
    let body = response.bytes().map_err(http_err)?;
    Ok(body.to_vec())
}

/// Parse a dataset from raw bytes. Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "data": [...], "index": ... }, ...]`
/// * `.csv`     – columns `data` (semicolon-separated floats) and `index`
/// * `.parquet` – `data` list column and `index` column
pub fn parse_dataset(extension: &str, bytes: Vec<u8>) -> Result<Dataset, LoadError> {
    match extension {
        "json" => parse_json(&bytes),
        "csv" => parse_csv(&bytes),
        "parquet" | "pq" => parse_parquet(bytes),
        other => Err(LoadError::Unsupported(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "data": [-0.11, -2.82, ...], "index": 1416 },
///   ...
/// ]
/// ```
///
/// Fields other than `data` and `index` are ignored.
fn parse_json(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;

    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidDocument("expected top-level JSON array".into()))?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::row(i, "not a JSON object"))?;

        let data = json_array_to_f64(obj.get("data"), i)?;
        let index = obj.get("index").map(json_to_label).unwrap_or(RecordLabel::Null);

        records.push(Record::new(data, index));
    }

    Ok(Dataset::from_records(records))
}

fn json_array_to_f64(val: Option<&JsonValue>, row: usize) -> Result<Vec<f64>, LoadError> {
    let arr = val
        .and_then(|v| v.as_array())
        .ok_or_else(|| LoadError::row(row, "missing or invalid 'data' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .ok_or_else(|| LoadError::row(row, format!("data[{j}] is not a number")))
        })
        .collect()
}

fn json_to_label(val: &JsonValue) -> RecordLabel {
    match val {
        JsonValue::String(s) => RecordLabel::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RecordLabel::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RecordLabel::Float(f)
            } else {
                RecordLabel::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => RecordLabel::Bool(*b),
        JsonValue::Null => RecordLabel::Null,
        other => RecordLabel::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names.
/// The `data` column holds semicolon-separated floats (`"-0.11;-2.82;-3.77"`),
/// the optional `index` column holds the label. Other columns are ignored.
fn parse_csv(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader.headers()?.clone();

    let data_idx = headers
        .iter()
        .position(|h| h == "data")
        .ok_or_else(|| LoadError::InvalidDocument("CSV missing 'data' column".into()))?;
    let index_idx = headers.iter().position(|h| h == "index");

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result?;

        let data = parse_semicolon_floats(row.get(data_idx).unwrap_or(""), row_no)?;
        let index = index_idx
            .and_then(|idx| row.get(idx))
            .map(guess_label)
            .unwrap_or(RecordLabel::Null);

        records.push(Record::new(data, index));
    }

    Ok(Dataset::from_records(records))
}

fn parse_semicolon_floats(s: &str, row: usize) -> Result<Vec<f64>, LoadError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .enumerate()
        .map(|(j, tok)| {
            tok.trim().parse::<f64>().map_err(|_| {
                LoadError::row(row, format!("data[{j}]: '{tok}' is not a number"))
            })
        })
        .collect()
}

fn guess_label(s: &str) -> RecordLabel {
    if s.is_empty() {
        return RecordLabel::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return RecordLabel::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return RecordLabel::Float(f);
    }
    if s == "true" || s == "false" {
        return RecordLabel::Bool(s == "true");
    }
    RecordLabel::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Expected schema:
/// - `data`: List<Float64|Float32> or LargeList of the same
/// - `index`: any primitive column (optional)
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn parse_parquet(bytes: Vec<u8>) -> Result<Dataset, LoadError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes::Bytes::from(bytes))?.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let offset = records.len();

        let data_idx = schema
            .index_of("data")
            .map_err(|_| LoadError::InvalidDocument("parquet file missing 'data' column".into()))?;
        let data_col = batch.column(data_idx);
        let index_col = schema.index_of("index").ok().map(|i| batch.column(i));

        for row in 0..batch.num_rows() {
            let data = extract_f64_list(data_col, row)
                .map_err(|message| LoadError::row(offset + row, message))?;
            let index = index_col
                .map(|col| extract_label(col, row))
                .unwrap_or(RecordLabel::Null);

            records.push(Record::new(data, index));
        }
    }

    Ok(Dataset::from_records(records))
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>, String> {
    if col.is_null(row) {
        return Err("null value in 'data'".into());
    }

    let values_array = match col.data_type() {
        DataType::List(_) => col
            .as_any()
            .downcast_ref::<ListArray>()
            .ok_or("expected ListArray")?
            .value(row),
        DataType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .ok_or("expected LargeListArray")?
            .value(row),
        other => return Err(format!("expected List or LargeList column, got {other:?}")),
    };

    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        Err(format!(
            "list inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        ))
    }
}

/// Extract a single label from an Arrow column at a given row.
/// Integer columns of any width become `Integer`; values that do not fit an
/// `i64` and non-primitive columns (dictionaries, views, dates) are kept as
/// their display text.
fn extract_label(col: &Arc<dyn Array>, row: usize) -> RecordLabel {
    if col.is_null(row) {
        return RecordLabel::Null;
    }
    match col.data_type() {
        DataType::Utf8 => RecordLabel::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => RecordLabel::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => RecordLabel::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => RecordLabel::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => RecordLabel::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => RecordLabel::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => RecordLabel::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => {
            RecordLabel::Integer(col.as_primitive::<UInt16Type>().value(row).into())
        }
        DataType::UInt32 => {
            RecordLabel::Integer(col.as_primitive::<UInt32Type>().value(row).into())
        }
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(RecordLabel::Integer)
                .unwrap_or_else(|_| RecordLabel::Text(v.to_string()))
        }
        DataType::Float32 => {
            RecordLabel::Float(col.as_primitive::<Float32Type>().value(row).into())
        }
        DataType::Float64 => RecordLabel::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => RecordLabel::Bool(col.as_boolean().value(row)),
        _ => formatted_label(col.as_ref(), row),
    }
}

fn formatted_label(col: &dyn Array, row: usize) -> RecordLabel {
    match ArrayFormatter::try_new(col, &FormatOptions::default()) {
        Ok(formatter) => RecordLabel::Text(formatter.value(row).to_string()),
        Err(e) => {
            log::debug!("cannot display {} label: {e}", col.data_type());
            RecordLabel::Null
        }
    }
}
