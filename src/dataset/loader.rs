//! CSV and Parquet readers for [`Dataset`](super::Dataset).
//!
//! Numeric columns become features; columns holding any non-numeric value
//! are skipped. The label column must hold 0/1 values.

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::record_batch::RecordBatch;
use tracing::debug;

use super::Dataset;
use crate::{Error, Result};

pub(super) fn load_csv(path: &Path, label_column: &str) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Dataset(format!("Failed to open CSV file {}: {e}", path.display())))?;
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (column, field) in columns.iter_mut().zip(record.iter()) {
            column.push(field.trim().parse::<f64>().ok());
        }
    }

    assemble(path, headers, columns, label_column)
}

pub(super) fn load_parquet(path: &Path, label_column: &str) -> Result<Dataset> {
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    let file = File::open(path)
        .map_err(|e| Error::Dataset(format!("Failed to open Parquet file: {e}")))?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::Dataset(format!("Failed to parse Parquet file: {e}")))?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let reader = builder
        .build()
        .map_err(|e| Error::Dataset(format!("Failed to create Parquet reader: {e}")))?;

    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];
    for batch in reader {
        let batch: RecordBatch = batch?;
        for (column, array) in columns.iter_mut().zip(batch.columns()) {
            append_numeric(column, array);
        }
    }

    assemble(path, headers, columns, label_column)
}

/// Append an Arrow column as optional `f64`s; non-numeric types become `None`.
#[allow(clippy::cast_precision_loss)]
fn append_numeric(column: &mut Vec<Option<f64>>, array: &ArrayRef) {
    let any = array.as_any();
    if let Some(values) = any.downcast_ref::<Float64Array>() {
        column.extend(values.iter());
    } else if let Some(values) = any.downcast_ref::<Float32Array>() {
        column.extend(values.iter().map(|v| v.map(f64::from)));
    } else if let Some(values) = any.downcast_ref::<Int64Array>() {
        column.extend(values.iter().map(|v| v.map(|x| x as f64)));
    } else if let Some(values) = any.downcast_ref::<Int32Array>() {
        column.extend(values.iter().map(|v| v.map(f64::from)));
    } else {
        column.extend(std::iter::repeat(None).take(array.len()));
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn assemble(
    path: &Path,
    headers: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
    label_column: &str,
) -> Result<Dataset> {
    let label_idx = headers.iter().position(|h| h == label_column).ok_or_else(|| {
        Error::Dataset(format!(
            "{} has no label column '{label_column}'",
            path.display()
        ))
    })?;

    let labels = columns[label_idx]
        .iter()
        .map(|value| match value {
            Some(v) if *v == 0.0 || *v == 1.0 => Ok(*v as usize),
            Some(v) => Err(Error::Dataset(format!("label {v} is not 0 or 1"))),
            None => Err(Error::Dataset(format!("non-numeric value in label column '{label_column}'"))),
        })
        .collect::<Result<Vec<usize>>>()?;

    let mut names = Vec::new();
    let mut features: Vec<Vec<f64>> = Vec::new();
    for (idx, (name, column)) in headers.into_iter().zip(columns).enumerate() {
        if idx == label_idx {
            continue;
        }
        match column.into_iter().collect::<Option<Vec<f64>>>() {
            Some(values) => {
                names.push(name);
                features.push(values);
            }
            None => debug!(column = %name, "Skipping non-numeric column"),
        }
    }

    let rows = (0..labels.len())
        .map(|r| features.iter().map(|col| col[r] as f32).collect())
        .collect();

    debug!(path = %path.display(), rows = labels.len(), features = names.len(), "Loaded dataset");
    Dataset::new(names, rows, labels)
}
