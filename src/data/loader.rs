use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, SalaryDataset, SalaryRecord};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a salary dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "work_year": 2024, "salary_in_usd": 150000, ... }, ...]`
/// * `.parquet` – flat columns, as written by `df.to_parquet()`
///
/// Every format must carry the required columns (see
/// [`REQUIRED_COLUMNS`](super::model::REQUIRED_COLUMNS)); anything else is
/// kept as extra columns for the data table.
pub fn load_file(path: &Path) -> Result<SalaryDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} salary records with columns {:?} from {}",
        dataset.len(),
        dataset.column_names(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Cell types are guessed per value with [`CellValue::infer`].
fn load_csv(path: &Path) -> Result<SalaryDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let cells: BTreeMap<String, CellValue> = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), CellValue::infer(value.trim())))
            .collect();

        records.push(SalaryRecord::from_row(row_no, cells)?);
    }

    Ok(SalaryDataset::new(records, headers))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "work_year": 2024,
///     "experience_level": "senior",
///     "salary_in_usd": 150000,
///     ...
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<SalaryDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let cells: BTreeMap<String, CellValue> = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();

        records.push(SalaryRecord::from_row(i, cells)?);
    }

    Ok(SalaryDataset::from_records(records))
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

/// Load a Parquet file of salary records.
///
/// Every column must be flat (strings, ints, floats, bools). Dictionary
/// columns (pandas `category`), narrow or unsigned integers, dates and
/// timestamps are cast first; anything else fails the load. Works with files
/// written by both **Pandas** (`df.to_parquet()`) and **Polars**
/// (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<SalaryDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let columns: Vec<(String, ArrayRef)> = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, col)| Ok((field.name().clone(), normalize_column(field.name(), col)?)))
            .collect::<Result<_>>()?;

        for row in 0..batch.num_rows() {
            let cells: BTreeMap<String, CellValue> = columns
                .iter()
                .map(|(name, col)| (name.clone(), extract_cell_value(col, row)))
                .collect();

            let row_no = records.len();
            records.push(SalaryRecord::from_row(row_no, cells)?);
        }
    }

    Ok(SalaryDataset::new(records, column_names))
}

/// Whether `extract_cell_value` reads this type directly.
fn is_readable(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

/// Type a non-readable column is cast to, if any.
fn cast_target(data_type: &DataType) -> Option<DataType> {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => Some(DataType::Int64),
        DataType::Float16 => Some(DataType::Float64),
        DataType::Utf8View
        | DataType::Date32
        | DataType::Date64
        | DataType::Timestamp(_, _) => Some(DataType::Utf8),
        DataType::Dictionary(_, value) if is_readable(value) => Some(value.as_ref().clone()),
        DataType::Dictionary(_, value) => cast_target(value),
        _ => None,
    }
}

/// Cast a column into one of the types `extract_cell_value` understands.
fn normalize_column(name: &str, col: &ArrayRef) -> Result<ArrayRef> {
    let data_type = col.data_type();
    if is_readable(data_type) {
        return Ok(Arc::clone(col));
    }
    let Some(target) = cast_target(data_type) else {
        bail!("Parquet column '{name}' has unsupported type {data_type:?}");
    };
    log::debug!("Casting parquet column '{name}' from {data_type:?} to {target:?}");
    cast(col, &target)
        .with_context(|| format!("casting parquet column '{name}' from {data_type:?} to {target:?}"))
}

/// Extract a single cell from a normalized Arrow column at a given row.
fn extract_cell_value(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // `normalize_column` only lets the types above through.
        other => unreachable!("unnormalized parquet column type {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{BinaryArray, DictionaryArray, Float64Array, Int16Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::{FilterColumn, LoadError};

    const CSV_HEADER: &str = "work_year,experience_level,employment_type,job_title,salary,salary_currency,salary_in_usd,employee_residence,remote_ratio,company_location,company_size,employee_residence_iso3";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{CSV_HEADER}\n\
             2025,senior,integral,Data Scientist,150000,USD,150000,US,remoto,US,M,USA\n\
             2024,junior,integral,Data Analyst,60000,EUR,65000,DE,presencial,DE,L,DEU\n"
        );
        let path = write_file(&dir, "salaries.csv", &body);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names().len(), 12);
        assert_eq!(ds.column_names()[0], "work_year");

        let first = &ds.records()[0];
        assert_eq!(first.work_year, CellValue::Integer(2025));
        assert_eq!(first.salary_in_usd, 150_000.0);
        assert_eq!(first.employee_residence_iso3, "USA");
        assert_eq!(first.extra.get("salary_currency"), Some(&CellValue::from("USD")));
        assert_eq!(ds.unique_values(FilterColumn::RemoteRatio).len(), 2);
    }

    #[test]
    fn test_load_csv_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bad.csv",
            "work_year,experience_level\n2024,senior\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::MissingColumn { row: 0, .. })
        ));
    }

    #[test]
    fn test_load_csv_non_numeric_salary() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{CSV_HEADER}\n2025,senior,integral,Data Scientist,1,USD,lots,US,remoto,US,M,USA\n"
        );
        let path = write_file(&dir, "bad_salary.csv", &body);
        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::NonNumericSalary { .. })
        ));
    }

    #[test]
    fn test_load_csv_infinite_salary() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{CSV_HEADER}\n\
             2025,senior,integral,Data Scientist,1,USD,inf,US,remoto,US,M,USA\n\
             2025,senior,integral,Data Scientist,1,USD,100,US,remoto,US,M,USA\n"
        );
        let path = write_file(&dir, "inf_salary.csv", &body);
        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::NonFiniteSalary { row: 0, .. })
        ));
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "salaries.json",
            r#"[
                {"work_year": 2023, "experience_level": "mid", "remote_ratio": 50,
                 "company_size": "S", "salary_in_usd": 80000.5, "job_title": "ML Engineer",
                 "employee_residence_iso3": "CAN", "employment_type": "FT"}
            ]"#,
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        let rec = &ds.records()[0];
        assert_eq!(rec.remote_ratio, CellValue::Integer(50));
        assert_eq!(rec.salary_in_usd, 80_000.5);
        assert_eq!(rec.display_cell("employment_type"), "FT");
        assert!(ds.column_names().iter().any(|c| c == "employment_type"));
    }

    #[test]
    fn test_load_json_not_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "obj.json", r#"{"work_year": 2024}"#);
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn test_load_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salaries.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("work_year", DataType::Int64, false),
            Field::new("experience_level", DataType::Utf8, false),
            Field::new("remote_ratio", DataType::Utf8, false),
            Field::new("company_size", DataType::Utf8, false),
            Field::new("salary_in_usd", DataType::Float64, false),
            Field::new("job_title", DataType::Utf8, false),
            Field::new("employee_residence_iso3", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2024, 2025])),
                Arc::new(StringArray::from(vec!["senior", "mid"])),
                Arc::new(StringArray::from(vec!["remoto", "hibrido"])),
                Arc::new(StringArray::from(vec!["L", "S"])),
                Arc::new(Float64Array::from(vec![120_000.0, 90_000.0])),
                Arc::new(StringArray::from(vec!["Data Scientist", "Data Engineer"])),
                Arc::new(StringArray::from(vec!["USA", "PRT"])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1].employee_residence_iso3, "PRT");
        assert_eq!(ds.records()[0].work_year, CellValue::Integer(2024));
        assert_eq!(ds.column_names()[4], "salary_in_usd");
    }

    fn write_parquet(path: &Path, schema: Arc<Schema>, columns: Vec<ArrayRef>) {
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_load_parquet_casts_category_and_narrow_int_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categorical.parquet");
        let dict_utf8 = DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));

        let schema = Arc::new(Schema::new(vec![
            Field::new("work_year", DataType::Int16, false),
            Field::new("experience_level", dict_utf8.clone(), false),
            Field::new("remote_ratio", DataType::Utf8, false),
            Field::new("company_size", dict_utf8.clone(), false),
            Field::new("salary_in_usd", DataType::Float64, false),
            Field::new("job_title", dict_utf8, false),
            Field::new("employee_residence_iso3", DataType::Utf8, false),
        ]));
        let dict = |values: Vec<&str>| -> ArrayRef {
            Arc::new(values.into_iter().collect::<DictionaryArray<Int32Type>>())
        };
        write_parquet(
            &path,
            schema,
            vec![
                Arc::new(Int16Array::from(vec![2024i16, 2025])),
                dict(vec!["senior", "pleno"]),
                Arc::new(StringArray::from(vec!["remoto", "hibrido"])),
                dict(vec!["grande", "media"]),
                Arc::new(Float64Array::from(vec![120_000.0, 90_000.0])),
                dict(vec!["Data Scientist", "Data Engineer"]),
                Arc::new(StringArray::from(vec!["USA", "PRT"])),
            ],
        );

        let ds = load_file(&path).unwrap();
        let years: Vec<_> = ds.unique_values(FilterColumn::WorkYear).iter().cloned().collect();
        assert_eq!(years, vec![CellValue::Integer(2024), CellValue::Integer(2025)]);
        let titles: Vec<_> = ds.records().iter().map(|r| r.job_title.as_str()).collect();
        assert_eq!(titles, vec!["Data Scientist", "Data Engineer"]);
        assert_eq!(ds.records()[1].experience_level, CellValue::from("pleno"));
        assert_eq!(ds.unique_values(FilterColumn::CompanySize).len(), 2);
    }

    #[test]
    fn test_load_parquet_rejects_unsupported_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("work_year", DataType::Int64, false),
            Field::new("experience_level", DataType::Utf8, false),
            Field::new("remote_ratio", DataType::Utf8, false),
            Field::new("company_size", DataType::Utf8, false),
            Field::new("salary_in_usd", DataType::Float64, false),
            Field::new("job_title", DataType::Binary, false),
            Field::new("employee_residence_iso3", DataType::Utf8, false),
        ]));
        write_parquet(
            &path,
            schema,
            vec![
                Arc::new(Int64Array::from(vec![2024])),
                Arc::new(StringArray::from(vec!["senior"])),
                Arc::new(StringArray::from(vec!["remoto"])),
                Arc::new(StringArray::from(vec!["M"])),
                Arc::new(Float64Array::from(vec![1.0])),
                Arc::new(BinaryArray::from(vec![b"Data Scientist".as_ref()])),
                Arc::new(StringArray::from(vec!["USA"])),
            ],
        );

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("job_title"), "{err:#}");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("salaries.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
