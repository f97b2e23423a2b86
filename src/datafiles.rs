// 💾 Dataset Files - Parquet/CSV writers and column-oriented read-back
// One file per dataset under the data directory

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::datasets::{Dataset, ValueType};
use crate::generator::SampleData;
use crate::records::{to_record_batch, DatasetRecord};

// ============================================================================
// OUTPUT FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "parquet" => Ok(OutputFormat::Parquet),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(anyhow!("Unknown output format: {} (expected parquet or csv)", other)),
        }
    }
}

// ============================================================================
// WRITING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub dataset: Dataset,
    pub path: PathBuf,
    pub rows: usize,
}

/// Write every dataset into `dir`, creating it if needed
pub fn write_sample_data(data: &SampleData, dir: &Path, format: OutputFormat) -> Result<Vec<WrittenFile>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let written = vec![
        write_dataset(&data.customers, dir, format)?,
        write_dataset(&data.transactions, dir, format)?,
        write_dataset(&data.atm_usage, dir, format)?,
        write_dataset(&data.branch_visits, dir, format)?,
        write_dataset(&data.call_center, dir, format)?,
    ];

    info!(
        dir = %dir.display(),
        format = %format,
        files = written.len(),
        "sample data written"
    );

    Ok(written)
}

pub fn write_dataset<R: DatasetRecord>(rows: &[R], dir: &Path, format: OutputFormat) -> Result<WrittenFile> {
    let path = dir.join(R::DATASET.file_name(format));

    match format {
        OutputFormat::Parquet => write_parquet(rows, &path)?,
        OutputFormat::Csv => write_csv(rows, &path)?,
    }

    debug!(dataset = %R::DATASET, rows = rows.len(), path = %path.display(), "dataset written");

    Ok(WrittenFile {
        dataset: R::DATASET,
        path,
        rows: rows.len(),
    })
}

fn write_parquet<R: DatasetRecord>(rows: &[R], path: &Path) -> Result<()> {
    let batch = to_record_batch(rows)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .with_context(|| format!("Failed to open Parquet writer for {}", path.display()))?;
    writer
        .write(&batch)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer
        .close()
        .with_context(|| format!("Failed to finish {}", path.display()))?;

    Ok(())
}

fn write_csv<R: DatasetRecord>(rows: &[R], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    if rows.is_empty() {
        // serde only emits headers with the first row
        let header: Vec<&str> = R::DATASET.columns().iter().map(|c| c.name).collect();
        writer.write_record(&header)?;
    }

    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer.flush()?;

    Ok(())
}

// ============================================================================
// TABLE (column-oriented read-back)
// ============================================================================

/// Values of one column, typed by the dataset's declared value type
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    String(Vec<String>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    /// Microseconds since the Unix epoch, UTC
    Timestamp(Vec<i64>),
}

impl ColumnData {
    fn empty(value_type: ValueType) -> Self {
        match value_type {
            ValueType::String => ColumnData::String(Vec::new()),
            ValueType::Int64 => ColumnData::Int64(Vec::new()),
            ValueType::Float64 => ColumnData::Float64(Vec::new()),
            ValueType::Bool => ColumnData::Bool(Vec::new()),
            ValueType::UnixTimestamp => ColumnData::Timestamp(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::String(v) => v.len(),
            ColumnData::Int64(v) | ColumnData::Timestamp(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            ColumnData::String(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric view of Int64/Float64 columns
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        match self {
            ColumnData::Int64(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ColumnData::Float64(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn extend_from_array(&mut self, array: &ArrayRef, column: &str) -> Result<()> {
        if array.null_count() > 0 {
            bail!("Column {} contains {} null values", column, array.null_count());
        }

        let mismatch = || anyhow!("Column {} has unexpected type {}", column, array.data_type());

        match self {
            ColumnData::String(values) => {
                let arr = array.as_any().downcast_ref::<StringArray>().ok_or_else(mismatch)?;
                values.extend(arr.iter().flatten().map(str::to_string));
            }
            ColumnData::Int64(values) => {
                let arr = array.as_any().downcast_ref::<Int64Array>().ok_or_else(mismatch)?;
                values.extend(arr.values().iter().copied());
            }
            ColumnData::Float64(values) => {
                let arr = array.as_any().downcast_ref::<Float64Array>().ok_or_else(mismatch)?;
                values.extend(arr.values().iter().copied());
            }
            ColumnData::Bool(values) => {
                let arr = array.as_any().downcast_ref::<BooleanArray>().ok_or_else(mismatch)?;
                values.extend(arr.iter().flatten());
            }
            ColumnData::Timestamp(values) => {
                let arr = array
                    .as_any()
                    .downcast_ref::<TimestampMicrosecondArray>()
                    .ok_or_else(mismatch)?;
                values.extend(arr.values().iter().copied());
            }
        }
        Ok(())
    }

    fn push_parsed(&mut self, raw: &str, column: &str, line: usize) -> Result<()> {
        let bad = |e: String| anyhow!("Line {}: invalid value {:?} in column {}: {}", line, raw, column, e);

        match self {
            ColumnData::String(values) => values.push(raw.to_string()),
            ColumnData::Int64(values) => values.push(raw.parse::<i64>().map_err(|e| bad(e.to_string()))?),
            ColumnData::Float64(values) => values.push(raw.parse::<f64>().map_err(|e| bad(e.to_string()))?),
            ColumnData::Bool(values) => values.push(raw.parse::<bool>().map_err(|e| bad(e.to_string()))?),
            ColumnData::Timestamp(values) => {
                let ts = DateTime::parse_from_rfc3339(raw).map_err(|e| bad(e.to_string()))?;
                values.push(ts.timestamp_micros());
            }
        }
        Ok(())
    }
}

/// A dataset loaded back from disk (or converted from memory)
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub dataset: Dataset,
    pub row_count: usize,
    columns: BTreeMap<String, ColumnData>,
}

impl Table {
    fn empty(dataset: Dataset) -> Self {
        let columns = dataset
            .columns()
            .iter()
            .map(|c| (c.name.to_string(), ColumnData::empty(c.value_type)))
            .collect();
        Table {
            dataset,
            row_count: 0,
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Distinct values of a string column (empty if absent)
    pub fn distinct_strings(&self, name: &str) -> HashSet<&str> {
        self.column(name)
            .and_then(ColumnData::as_strings)
            .map(|values| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn from_batches(dataset: Dataset, batches: &[RecordBatch]) -> Result<Self> {
        let mut table = Table::empty(dataset);

        for batch in batches {
            for spec in dataset.columns() {
                let array = batch
                    .column_by_name(spec.name)
                    .ok_or_else(|| anyhow!("{} is missing column {}", dataset, spec.name))?;
                if let Some(data) = table.columns.get_mut(spec.name) {
                    data.extend_from_array(array, spec.name)?;
                }
            }
            table.row_count += batch.num_rows();
        }

        Ok(table)
    }

    pub fn from_records<R: DatasetRecord>(rows: &[R]) -> Result<Self> {
        let batch = to_record_batch(rows)?;
        Table::from_batches(R::DATASET, &[batch])
    }
}

// ============================================================================
// READING
// ============================================================================

pub fn read_table(dir: &Path, dataset: Dataset, format: OutputFormat) -> Result<Table> {
    let path = dir.join(dataset.file_name(format));
    match format {
        OutputFormat::Parquet => read_parquet(&path, dataset),
        OutputFormat::Csv => read_csv(&path, dataset),
    }
}

/// Read every dataset file found in `dir`; missing files are skipped
pub fn read_sample_data(dir: &Path, format: OutputFormat) -> Result<BTreeMap<Dataset, Table>> {
    let mut tables = BTreeMap::new();

    for dataset in Dataset::ALL {
        let path = dir.join(dataset.file_name(format));
        if !path.exists() {
            debug!(dataset = %dataset, path = %path.display(), "dataset file not found");
            continue;
        }
        tables.insert(dataset, read_table(dir, dataset, format)?);
    }

    Ok(tables)
}

pub fn read_parquet(path: &Path, dataset: Dataset) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("Failed to read Parquet metadata from {}", path.display()))?
        .build()
        .with_context(|| format!("Failed to build Parquet reader for {}", path.display()))?;

    let batches = reader
        .collect::<Result<Vec<RecordBatch>, _>>()
        .with_context(|| format!("Failed to read record batches from {}", path.display()))?;

    Table::from_batches(dataset, &batches)
        .with_context(|| format!("Unexpected layout in {}", path.display()))
}

pub fn read_csv(path: &Path, dataset: Dataset) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let mut positions = Vec::with_capacity(dataset.columns().len());
    for spec in dataset.columns() {
        let idx = headers
            .iter()
            .position(|h| h == spec.name)
            .ok_or_else(|| anyhow!("{} is missing column {}", path.display(), spec.name))?;
        positions.push((spec.name, idx));
    }

    let mut table = Table::empty(dataset);

    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read {}", path.display()))?;
        for (name, idx) in &positions {
            let raw = record.get(*idx).unwrap_or_default();
            if let Some(data) = table.columns.get_mut(*name) {
                data.push_parsed(raw, name, line + 2)?;
            }
        }
        table.row_count += 1;
    }

    Ok(table)
}

/// In-memory tables, same shape as a read-back
pub fn sample_data_tables(data: &SampleData) -> Result<BTreeMap<Dataset, Table>> {
    let mut tables = BTreeMap::new();
    tables.insert(Dataset::Customers, Table::from_records(&data.customers)?);
    tables.insert(Dataset::Transactions, Table::from_records(&data.transactions)?);
    tables.insert(Dataset::AtmUsage, Table::from_records(&data.atm_usage)?);
    tables.insert(Dataset::BranchVisits, Table::from_records(&data.branch_visits)?);
    tables.insert(Dataset::CallCenter, Table::from_records(&data.call_center)?);
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator::SampleDataGenerator;
    use chrono::{TimeZone, Utc};

    fn sample() -> SampleData {
        SampleDataGenerator::new(GeneratorConfig::small())
            .with_anchor(Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap())
            .generate_all()
            .unwrap()
    }

    #[test]
    fn test_parquet_files_read_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let data = sample();

        let written = write_sample_data(&data, dir.path(), OutputFormat::Parquet).unwrap();
        assert_eq!(written.len(), 5);
        assert!(dir.path().join("customers.parquet").exists());
        assert!(dir.path().join("call_center.parquet").exists());

        let from_disk = read_sample_data(dir.path(), OutputFormat::Parquet).unwrap();
        let in_memory = sample_data_tables(&data).unwrap();
        assert_eq!(from_disk, in_memory);
    }

    #[test]
    fn test_csv_files_read_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let data = sample();

        write_sample_data(&data, dir.path(), OutputFormat::Csv).unwrap();
        let from_disk = read_sample_data(dir.path(), OutputFormat::Csv).unwrap();

        let customers = &from_disk[&Dataset::Customers];
        assert_eq!(customers.row_count, data.customers.len());
        assert_eq!(
            customers.column("credit_score"),
            sample_data_tables(&data).unwrap()[&Dataset::Customers].column("credit_score")
        );
        assert_eq!(
            from_disk[&Dataset::Transactions].column("is_fraud"),
            Some(&ColumnData::Bool(data.transactions.iter().map(|t| t.is_fraud).collect()))
        );
    }

    #[test]
    fn test_output_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("feature_repo").join("data");

        write_sample_data(&SampleData::default(), &nested, OutputFormat::Csv).unwrap();

        let tables = read_sample_data(&nested, OutputFormat::Csv).unwrap();
        assert_eq!(tables.len(), 5);
        assert!(tables.values().all(|t| t.row_count == 0));
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let tables = read_sample_data(dir.path(), OutputFormat::Parquet).unwrap();
        assert!(tables.is_empty());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("PARQUET".parse::<OutputFormat>().unwrap(), OutputFormat::Parquet);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }
}
