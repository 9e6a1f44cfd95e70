use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sensor export from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one reading per line (the usual logger export)
/// * `.json`    – `[{ "Timestamp": "...", "Temp": 21.4, "RH": 63 }, ...]`
/// * `.parquet` – flat columns of strings, numbers or timestamps
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    info!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.headers,
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    read_csv(reader)
}

/// Parse CSV text already in memory (e.g. an uploaded file body).
pub fn parse_csv_str(text: &str) -> Result<RawTable> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<RawTable> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut table = RawTable::new(headers);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = (0..table.headers.len())
            .map(|i| guess_cell_type(record.get(i).unwrap_or("")))
            .collect();
        table.push_row(cells);
    }

    Ok(table)
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the shape `df.to_json(orient='records')` writes.
/// Key order of the first occurrence of each key defines header order.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json_str(&text)
}

pub fn parse_json_str(text: &str) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut table = RawTable::default();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for key in obj.keys() {
            table.ensure_header(key);
        }
        let row = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();
        table.rows.push(row);
    }

    Ok(table)
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
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one reading per row.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); timestamp columns keep their type.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = RawTable::new(headers);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell_value(col, row))
                .collect();
            table.push_row(cells);
        }
    }

    Ok(table)
}

// -- Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
/// Unsupported types come back as `Null`, which the normalizer drops.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| CellValue::String(a.value(row).to_string())),
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>();
            Some(CellValue::String(s.value(row).to_string()))
        }
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        DataType::Date32 => any
            .downcast_ref::<Date32Array>()
            .and_then(|a| a.value_as_datetime(row))
            .map(CellValue::DateTime),
        DataType::Timestamp(unit, _) => {
            let dt = match unit {
                TimeUnit::Second => any
                    .downcast_ref::<TimestampSecondArray>()
                    .and_then(|a| a.value_as_datetime(row)),
                TimeUnit::Millisecond => any
                    .downcast_ref::<TimestampMillisecondArray>()
                    .and_then(|a| a.value_as_datetime(row)),
                TimeUnit::Microsecond => any
                    .downcast_ref::<TimestampMicrosecondArray>()
                    .and_then(|a| a.value_as_datetime(row)),
                TimeUnit::Nanosecond => any
                    .downcast_ref::<TimestampNanosecondArray>()
                    .and_then(|a| a.value_as_datetime(row)),
            };
            dt.map(CellValue::DateTime)
        }
        _ => None,
    };
    cell.unwrap_or(CellValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn test_csv_cells_are_type_guessed() {
        let table = parse_csv_str(
            "\u{feff}Timestamp,Temp(°C),RH (%),Note\n2024-01-01 00:00,21.5,80,\n",
        )
        .unwrap();
        assert_eq!(table.headers, vec!["Timestamp", "Temp(°C)", "RH (%)", "Note"]);
        assert_eq!(table.cell(0, "Temp(°C)"), &CellValue::Float(21.5));
        assert_eq!(table.cell(0, "RH (%)"), &CellValue::Integer(80));
        assert!(table.cell(0, "Note").is_null());
        assert_eq!(
            table.cell(0, "Timestamp"),
            &CellValue::String("2024-01-01 00:00".into())
        );
    }

    #[test]
    fn test_csv_short_rows_are_padded() {
        let table = parse_csv_str("a,b,c\n1,2\n").unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.cell(0, "c").is_null());
    }

    #[test]
    fn test_json_preserves_key_order() {
        let table = parse_json_str(
            r#"[{"time": "2024-01-01 00:00", "temperature": 20, "humidity": 85.5, "ok": true}]"#,
        )
        .unwrap();
        assert_eq!(table.headers, vec!["time", "temperature", "humidity", "ok"]);
        assert_eq!(table.cell(0, "humidity"), &CellValue::Float(85.5));
        assert_eq!(table.cell(0, "ok"), &CellValue::Bool(true));
    }

    #[test]
    fn test_json_rejects_non_array() {
        assert!(parse_json_str(r#"{"time": 1}"#).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("readings.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn test_load_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.CSV");
        std::fs::write(&path, "time,temperature,humidity\n2024-01-01 00:00,20,90\n").unwrap();
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "humidity"), &CellValue::Integer(90));
    }

    #[test]
    fn test_load_parquet_with_timestamp_column() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(
                "Measurement Time",
                DataType::Timestamp(TimeUnit::Second, None),
                false,
            ),
            Field::new("Temperature", DataType::Float64, false),
            Field::new("Humidity", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(TimestampSecondArray::from(vec![1_704_067_200, 1_704_070_800])),
                Arc::new(Float64Array::from(vec![21.0, 22.0])),
                Arc::new(Int64Array::from(vec![Some(85), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.headers, vec!["Measurement Time", "Temperature", "Humidity"]);
        assert_eq!(table.len(), 2);
        let expected = chrono::DateTime::from_timestamp(1_704_067_200, 0)
            .unwrap()
            .naive_utc();
        assert_eq!(table.cell(0, "Measurement Time"), &CellValue::DateTime(expected));
        assert_eq!(table.cell(0, "Humidity"), &CellValue::Integer(85));
        assert!(table.cell(1, "Humidity").is_null());
    }
}
