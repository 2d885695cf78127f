use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{LaunchDataset, LaunchRecord, Outcome};
use crate::error::DataLoadError;

pub const COL_LAUNCH_SITE: &str = "Launch Site";
pub const COL_PAYLOAD_MASS: &str = "Payload Mass (kg)";
pub const COL_CLASS: &str = "class";
pub const COL_BOOSTER_CATEGORY: &str = "Booster Version Category";

/// Columns every launch table must carry. Anything else is ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    COL_LAUNCH_SITE,
    COL_PAYLOAD_MASS,
    COL_CLASS,
    COL_BOOSTER_CATEGORY,
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a launch table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma-delimited, header row required
/// * `.tsv`     – tab-delimited, header row required
/// * `.parquet` – the four required columns, any numeric type for payload
///   and `class` (boolean also accepted for `class`)
pub fn load_file(path: &Path) -> Result<LaunchDataset, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv_reader(open(path)?, b',')?,
        "tsv" => load_csv_reader(open(path)?, b'\t')?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} launches from {} ({} sites, payload {}..={} kg)",
        dataset.len(),
        path.display(),
        dataset.sites().len(),
        dataset.bounds().min,
        dataset.bounds().max
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<File, DataLoadError> {
    File::open(path).map_err(|source| DataLoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn check_columns<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<(), DataLoadError> {
    let names: Vec<&str> = names.into_iter().collect();
    for required in REQUIRED_COLUMNS {
        if !names.contains(&required) {
            return Err(DataLoadError::MissingColumn(required));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared cell validation
// ---------------------------------------------------------------------------

fn check_site(record: usize, site: &str) -> Result<(), DataLoadError> {
    if site.is_empty() {
        return Err(DataLoadError::InvalidValue {
            record,
            column: COL_LAUNCH_SITE,
            value: String::new(),
        });
    }
    Ok(())
}

fn check_payload(record: usize, payload: Option<f64>, raw: &str) -> Result<f64, DataLoadError> {
    match payload {
        Some(kg) if kg.is_finite() && kg >= 0.0 => Ok(kg),
        _ => Err(DataLoadError::InvalidValue {
            record,
            column: COL_PAYLOAD_MASS,
            value: raw.to_string(),
        }),
    }
}

fn check_outcome(record: usize, outcome: Option<Outcome>, raw: &str) -> Result<Outcome, DataLoadError> {
    outcome.ok_or_else(|| DataLoadError::InvalidValue {
        record,
        column: COL_CLASS,
        value: raw.to_string(),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// One row as it appears in the file, before validation. Cells are kept as
/// text so a bad value reports the offending column rather than a serde
/// message.
#[derive(Debug, Deserialize)]
struct RawLaunchRow {
    #[serde(rename = "Launch Site")]
    launch_site: String,
    #[serde(rename = "Payload Mass (kg)")]
    payload_mass_kg: String,
    #[serde(rename = "class")]
    class: String,
    #[serde(rename = "Booster Version Category")]
    booster_version_category: String,
}

impl RawLaunchRow {
    fn into_record(self, record: usize) -> Result<LaunchRecord, DataLoadError> {
        check_site(record, &self.launch_site)?;
        let payload = check_payload(
            record,
            self.payload_mass_kg.parse::<f64>().ok(),
            &self.payload_mass_kg,
        )?;
        let outcome = check_outcome(record, Outcome::parse(&self.class), &self.class)?;
        Ok(LaunchRecord {
            launch_site: self.launch_site,
            payload_mass_kg: payload,
            outcome,
            booster_version_category: self.booster_version_category,
        })
    }
}

/// Parse a delimited launch table from any reader. The first row must be
/// the header; cells and header names are trimmed.
pub fn load_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<LaunchDataset, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    check_columns(headers.iter())?;

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<RawLaunchRow>().enumerate() {
        let record = idx + 1;
        let raw = row.map_err(|source| DataLoadError::Row { record, source })?;
        records.push(raw.into_record(record)?);
    }

    LaunchDataset::from_records(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet launch table. Columns are cast to the type we need, so
/// files written by Pandas (`int64` class) and Polars (`bool` class,
/// `float32` payloads) both work.
/// A numeric cell as it reads in a table: the bare number, or `null`.
fn cell_text(value: Option<f64>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

fn load_parquet(path: &Path) -> Result<LaunchDataset, DataLoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    check_columns(builder.schema().fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let sites = column_as(&batch, COL_LAUNCH_SITE, &DataType::Utf8)?;
        let payloads = column_as(&batch, COL_PAYLOAD_MASS, &DataType::Float64)?;
        let classes = column_as(&batch, COL_CLASS, &DataType::Float64)?;
        let categories = column_as(&batch, COL_BOOSTER_CATEGORY, &DataType::Utf8)?;

        let sites = sites.as_string::<i32>();
        let payloads = payloads.as_primitive::<Float64Type>();
        let classes = classes.as_primitive::<Float64Type>();
        let categories = categories.as_string::<i32>();

        for row in 0..batch.num_rows() {
            let record = records.len() + 1;

            let site = if sites.is_null(row) { "" } else { sites.value(row) };
            check_site(record, site)?;

            let payload = (!payloads.is_null(row)).then(|| payloads.value(row));
            let payload = check_payload(record, payload, &cell_text(payload))?;

            let class = (!classes.is_null(row)).then(|| classes.value(row));
            let outcome = match class {
                Some(v) if v == 1.0 => Some(Outcome::Success),
                Some(v) if v == 0.0 => Some(Outcome::Failure),
                _ => None,
            };
            let outcome = check_outcome(record, outcome, &cell_text(class))?;

            let category = if categories.is_null(row) {
                ""
            } else {
                categories.value(row)
            };

            records.push(LaunchRecord::new(site, payload, outcome, category));
        }
    }

    LaunchDataset::from_records(records)
}

fn column_as(
    batch: &RecordBatch,
    name: &'static str,
    to: &DataType,
) -> Result<ArrayRef, DataLoadError> {
    let col = batch
        .column_by_name(name)
        .ok_or(DataLoadError::MissingColumn(name))?;
    Ok(cast(col, to)?)
}
