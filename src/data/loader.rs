use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{CellValue, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read a listings source into a [`RawTable`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one listing per line (primary format)
/// * `.json`    – `[{ "price": 15000, "odometer": 50000, ... }, ...]`
/// * `.parquet` – flat columns of strings, numbers, bools, dates
pub fn load_file(path: &Path) -> Result<RawTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    if table.is_empty() {
        log::warn!("{} has a header but no rows", path.display());
    }
    log::info!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

fn unreadable(path: &Path) -> impl FnOnce(std::io::Error) -> LoadError + '_ {
    move |source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Tokens treated as a missing value, on top of the empty string.
const NA_TOKENS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL", "None", "-"];

fn load_csv(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(unreadable(path))?;
    read_csv(file)
}

/// Parse CSV text with a header row. Ragged rows are fatal.
///
/// Cell types are decided per column, the way a dataframe reader picks one
/// dtype per column: a column of whole numbers is `Integer`, any fractional
/// value makes it `Float`, and anything non-numeric turns it into `Text`.
pub fn read_csv<R: std::io::Read>(input: R) -> Result<RawTable, LoadError> {
    let mut reader = csv::Reader::from_reader(input);
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result?);
    }

    let kinds: Vec<Option<ColumnKind>> = (0..columns.len())
        .map(|col| {
            records
                .iter()
                .filter_map(|rec| rec.get(col).and_then(cell_kind))
                .reduce(ColumnKind::widen)
        })
        .collect();

    let rows = records
        .iter()
        .map(|rec| {
            rec.iter()
                .zip(&kinds)
                .map(|(raw, kind)| typed_cell(raw, *kind))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    fn widen(self, other: Self) -> Self {
        use ColumnKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Text,
        }
    }
}

fn is_missing(s: &str) -> bool {
    s.is_empty() || NA_TOKENS.contains(&s)
}

/// Narrowest kind a single cell fits; `None` for a missing value.
fn cell_kind(s: &str) -> Option<ColumnKind> {
    let s = s.trim();
    if is_missing(s) {
        None
    } else if s.parse::<i64>().is_ok() {
        Some(ColumnKind::Integer)
    } else if s.parse::<f64>().is_ok() {
        Some(ColumnKind::Float)
    } else if s == "true" || s == "false" {
        Some(ColumnKind::Bool)
    } else {
        Some(ColumnKind::Text)
    }
}

fn typed_cell(s: &str, kind: Option<ColumnKind>) -> CellValue {
    let s = s.trim();
    if is_missing(s) {
        return CellValue::Null;
    }
    let parsed = match kind {
        Some(ColumnKind::Integer) => s.parse().ok().map(CellValue::Integer),
        Some(ColumnKind::Float) => s.parse().ok().map(CellValue::Float),
        Some(ColumnKind::Bool) => Some(CellValue::Bool(s == "true")),
        Some(ColumnKind::Text) | None => None,
    };
    parsed.unwrap_or_else(|| CellValue::Text(s.to_string()))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "price": 9400, "model_year": 2011, "model": "bmw x5", "odometer": 145000 },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys in first-seen order; absent keys are null.
fn load_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(unreadable(path))?;
    read_json(&text)
}

pub fn read_json(text: &str) -> Result<RawTable, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Layout("expected a top-level JSON array".into()))?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Layout(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of listings. Every column becomes a table column;
/// nested types are rendered as text.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(unreadable(path))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        if columns.is_none() {
            columns = Some(schema.fields().iter().map(|f| f.name().clone()).collect());
        }

        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable {
        columns: columns.unwrap_or_default(),
        rows,
    })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let timestamp = |dt: Option<chrono::NaiveDateTime>| dt.map_or(CellValue::Null, CellValue::Date);
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => timestamp(col.as_primitive::<Date32Type>().value_as_datetime(row)),
        DataType::Date64 => timestamp(col.as_primitive::<Date64Type>().value_as_datetime(row)),
        DataType::Timestamp(unit, _) => timestamp(match unit {
            TimeUnit::Second => col.as_primitive::<TimestampSecondType>().value_as_datetime(row),
            TimeUnit::Millisecond => {
                col.as_primitive::<TimestampMillisecondType>().value_as_datetime(row)
            }
            TimeUnit::Microsecond => {
                col.as_primitive::<TimestampMicrosecondType>().value_as_datetime(row)
            }
            TimeUnit::Nanosecond => {
                col.as_primitive::<TimestampNanosecondType>().value_as_datetime(row)
            }
        }),
        other => CellValue::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_cells_are_typed_and_na_tokens_nulled() {
        let text = "price,model,odometer,is_4wd\n9400,bmw x5,145000,true\n8100,ford f-150,NaN,\n";
        let table = read_csv(text.as_bytes()).unwrap();

        assert_eq!(table.columns, vec!["price", "model", "odometer", "is_4wd"]);
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::Integer(9400),
                CellValue::Text("bmw x5".into()),
                CellValue::Integer(145000),
                CellValue::Bool(true),
            ]
        );
        assert!(table.rows[1][2].is_null());
        assert!(table.rows[1][3].is_null());
    }

    #[test]
    fn csv_types_are_decided_per_column() {
        let text = "price,odometer,model_year,is_4wd\n\
                    15000,50000,2015,true\n\
                    15000.0,50000,abc,false\n\
                    9400,,2011,1\n";
        let table = read_csv(text.as_bytes()).unwrap();

        // One fractional value widens the whole column to Float.
        assert_eq!(table.rows[0][0], CellValue::Float(15000.0));
        assert_eq!(table.rows[0][0], table.rows[1][0]);
        assert_eq!(table.rows[0][1], CellValue::Integer(50000));
        assert!(table.rows[2][1].is_null());
        // Non-numeric text keeps the column as text.
        assert_eq!(table.rows[0][2], CellValue::Text("2015".into()));
        assert_eq!(table.rows[1][2], CellValue::Text("abc".into()));
        // Booleans mixed with numbers are text, not 1/0.
        assert_eq!(table.rows[0][3], CellValue::Text("true".into()));
        assert_eq!(table.rows[2][3], CellValue::Text("1".into()));
    }

    #[test]
    fn ragged_csv_is_fatal() {
        let text = "price,odometer\n1,2\n3,4,5\n";
        assert!(matches!(read_csv(text.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn json_columns_are_the_union_of_keys() {
        let text = r#"[{"price": 100, "odometer": 5}, {"price": "12.5", "type": "SUV"}]"#;
        let table = read_json(text).unwrap();

        assert_eq!(table.columns.len(), 3);
        let price = table.column_index("price").unwrap();
        let odometer = table.column_index("odometer").unwrap();
        let kind = table.column_index("type").unwrap();
        assert_eq!(table.rows[0][kind], CellValue::Null);
        assert_eq!(table.rows[1][price], CellValue::Text("12.5".into()));
        assert_eq!(table.rows[1][odometer], CellValue::Null);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(matches!(read_json(r#"{"price": 1}"#), Err(LoadError::Layout(_))));
        assert!(matches!(read_json("[1, 2]"), Err(LoadError::Layout(_))));
        assert!(matches!(read_json("[{"), Err(LoadError::Json(_))));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("vehicles_us.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Unreadable { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("listings.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn loads_csv_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "price,odometer,date_posted").unwrap();
        writeln!(file, "15000,50000,2018-06-23").unwrap();
        file.flush().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.column_index("date_posted"), Some(2));
        assert_eq!(table.rows[0][2], CellValue::Text("2018-06-23".into()));
    }

    #[test]
    fn loads_parquet_with_typed_columns() {
        use arrow::array::{ArrayRef, Date32Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use chrono::NaiveDate;
        use parquet::arrow::ArrowWriter;

        let posted = NaiveDate::from_ymd_opt(2018, 6, 23).unwrap();
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let days = (posted - epoch).num_days() as i32;

        let schema = Arc::new(Schema::new(vec![
            Field::new("price", DataType::Int64, false),
            Field::new("model", DataType::Utf8, true),
            Field::new("date_posted", DataType::Date32, true),
        ]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(Int64Array::from(vec![9400_i64, 25500_i64])) as ArrayRef,
                Arc::new(StringArray::from(vec![Some("bmw x5"), None])) as ArrayRef,
                Arc::new(Date32Array::from(vec![Some(days), None])) as ArrayRef,
            ],
        )
        .unwrap();

        let mut file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.as_file_mut(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.columns, vec!["price", "model", "date_posted"]);
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::Integer(9400),
                CellValue::Text("bmw x5".into()),
                CellValue::Date(posted.and_hms_opt(0, 0, 0).unwrap()),
            ]
        );
        assert_eq!(
            table.rows[1],
            vec![CellValue::Integer(25500), CellValue::Null, CellValue::Null]
        );
    }
}
