use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::Bandpass;
use crate::error::CoverageError;

const WAVE_COLUMN: &str = "wave";
const THROUGHPUT_COLUMN: &str = "throughput";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sampled throughput curve as a named bandpass.  Dispatch by extension.
///
/// Every format carries a `wave` column (Å) and a `throughput` column:
/// * `.csv`     – header row, other columns ignored
/// * `.json`    – `[{ "wave": 8000.0, "throughput": 0.02 }, ...]`
/// * `.parquet` – flat Float64 / Float32 / integer columns
pub fn load_bandpass(name: &str, path: &Path) -> Result<Bandpass, CoverageError> {
    let (wave, throughput) = read_curve(path).map_err(|source| CoverageError::Reference {
        path: path.to_path_buf(),
        source,
    })?;
    let band = Bandpass::from_curve(name, wave, throughput)?;
    log::info!(
        "Loaded bandpass '{name}' with {} samples from {}",
        band.len(),
        path.display()
    );
    Ok(band)
}

fn read_curve(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let wave_idx = column(WAVE_COLUMN)?;
    let thr_idx = column(THROUGHPUT_COLUMN)?;

    let mut wave = Vec::new();
    let mut throughput = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        wave.push(parse_cell(record.get(wave_idx), row_no, WAVE_COLUMN)?);
        throughput.push(parse_cell(record.get(thr_idx), row_no, THROUGHPUT_COLUMN)?);
    }

    Ok((wave, throughput))
}

fn parse_cell(cell: Option<&str>, row: usize, col: &str) -> Result<f64> {
    let tok = cell.unwrap_or("").trim();
    tok.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{tok}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented, as written by `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut wave = Vec::with_capacity(records.len());
    let mut throughput = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let number = |col: &str| {
            obj.get(col)
                .and_then(JsonValue::as_f64)
                .with_context(|| format!("Row {i}: missing or invalid '{col}'"))
        };
        wave.push(number(WAVE_COLUMN)?);
        throughput.push(number(THROUGHPUT_COLUMN)?);
    }

    Ok((wave, throughput))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn load_parquet(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut wave = Vec::new();
    let mut throughput = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let wave_idx = schema
            .index_of(WAVE_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{WAVE_COLUMN}' column"))?;
        let thr_idx = schema
            .index_of(THROUGHPUT_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{THROUGHPUT_COLUMN}' column"))?;

        wave.extend(extract_f64_column(batch.column(wave_idx)).context("reading 'wave'")?);
        throughput.extend(
            extract_f64_column(batch.column(thr_idx)).context("reading 'throughput'")?,
        );
    }

    Ok((wave, throughput))
}

/// Widen a numeric Arrow column to `f64`. Nulls are rejected.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    if col.null_count() > 0 {
        bail!("{} null values in column", col.null_count());
    }

    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.values().iter().copied().collect())
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.values().iter().map(|&v| v as f64).collect())
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.values().iter().map(|&v| v as f64).collect())
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.values().iter().map(|&v| v as f64).collect())
    } else {
        bail!("Column type is {:?}, expected a numeric type", col.data_type())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    #[test]
    fn test_load_csv_curve() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g102.csv");
        fs::write(
            &path,
            "wave,throughput,note\n8000,0.01,edge\n9500,0.35,\n11500,0.02,edge\n",
        )
        .unwrap();

        let band = load_bandpass("G102", &path).unwrap();
        assert_eq!(band.name(), "G102");
        assert_eq!(band.wavelengths(), &[8000.0, 9500.0, 11500.0]);
        assert_eq!(band.throughput(), &[0.01, 0.35, 0.02]);
    }

    #[test]
    fn test_csv_missing_column_is_reference_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "wavelength,throughput\n8000,0.1\n").unwrap();

        let err = load_bandpass("bad", &path).unwrap_err();
        assert!(matches!(err, CoverageError::Reference { .. }));
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert!(chain.contains("missing 'wave'"), "{chain}");
    }

    #[test]
    fn test_csv_bad_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "wave,throughput\n8000,abc\n").unwrap();
        assert!(load_bandpass("bad", &path).is_err());
    }

    #[test]
    fn test_missing_file_is_reference_error() {
        let err = load_bandpass("g141", Path::new("/nonexistent/g141.csv")).unwrap_err();
        assert!(matches!(err, CoverageError::Reference { .. }));
    }

    #[test]
    fn test_empty_curve_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "wave,throughput\n").unwrap();
        assert!(matches!(
            load_bandpass("empty", &path),
            Err(CoverageError::MalformedBandpass { .. })
        ));
    }

    #[test]
    fn test_load_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.json");
        fs::write(
            &path,
            r#"[{"wave": 10750, "throughput": 0.1}, {"wave": 17000.5, "throughput": 0.4}]"#,
        )
        .unwrap();

        let band = load_bandpass("G141", &path).unwrap();
        assert_eq!(band.range_angstrom(), [10750.0, 17000.5]);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.fits");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            load_bandpass("x", &path),
            Err(CoverageError::Reference { .. })
        ));
    }

    #[test]
    fn test_load_parquet_mixed_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("wave", DataType::Int64, false),
            Field::new("throughput", DataType::Float32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![8000, 9000, 11500])),
                Arc::new(Float32Array::from(vec![0.0_f32, 0.5, 0.25])),
            ],
        )
        .unwrap();
        let file = fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let band = load_bandpass("G102", &path).unwrap();
        assert_eq!(band.wavelengths(), &[8000.0, 9000.0, 11500.0]);
        assert_eq!(band.throughput(), &[0.0, 0.5, 0.25]);
    }
}
