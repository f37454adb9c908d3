//! Local file data source (CSV, Parquet).
//!
//! Loads the whole file into a [`Table`], then applies projection, equality
//! filtering and truncation in that order. Row order matches source order.
use std::fs::File;
use std::path::Path;

use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use crate::sources::{parse_config, Connector};
use quarry_common::models::QuerySpec;
use quarry_common::table::{Scalar, Table};
use quarry_error::{ErrorCode, ErrorContext, QuarryError, Result};

const SUPPORTED_EXTENSIONS: [&str; 2] = ["csv", "parquet"];

#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    pub path: String,
}

/// Reads CSV or Parquet from the local filesystem.
#[derive(Debug)]
pub struct LocalConnector {
    config: LocalConfig,
}

impl LocalConnector {
    pub fn from_config(config: &serde_json::Value) -> Result<Self> {
        Ok(Self {
            config: parse_config("local", config)?,
        })
    }
}

impl Connector for LocalConnector {
    fn name(&self) -> &'static str {
        "local"
    }

    fn query(&self, spec: &QuerySpec) -> Result<Table> {
        let path = Path::new(&self.config.path);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let table = match extension.as_deref() {
            Some("csv") => read_csv(path)?,
            Some("parquet") => read_parquet(path)?,
            _ => {
                return Err(QuarryError::new(
                    ErrorCode::UnsupportedFormat,
                    format!("Unsupported file type: {}", self.config.path),
                )
                .with_context(ErrorContext::UnsupportedFormat {
                    path: self.config.path.clone(),
                    extension,
                    supported: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
                })
                .with_hint("Use .csv or .parquet"));
            }
        };

        tracing::debug!(
            path = %self.config.path,
            rows = table.len(),
            "loaded local source"
        );

        let mut out = table;
        if let Some(select) = &spec.select {
            out = out.project(select);
        }
        if let Some(conditions) = &spec.where_ {
            out = out.filter_eq(conditions);
        }
        if let Some(limit) = spec.limit {
            out = out.limit(limit);
        }
        Ok(out)
    }
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        QuarryError::new(
            ErrorCode::SourceIo,
            format!("Failed to open CSV {}: {}", path.display(), e),
        )
    })?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| {
            QuarryError::new(
                ErrorCode::SourceIo,
                format!("Failed to read CSV header of {}: {}", path.display(), e),
            )
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record.map_err(|e| {
            QuarryError::new(
                ErrorCode::SourceIo,
                format!("Failed to read CSV row of {}: {}", path.display(), e),
            )
        })?;
        table.push_row(record.iter().map(infer_scalar).collect());
    }
    Ok(table)
}

/// CSV cells carry no type information; infer the narrowest scalar.
fn infer_scalar(raw: &str) -> Scalar {
    if raw.is_empty() {
        return Scalar::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Scalar::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Scalar::Float(f);
    }
    match raw {
        "true" | "True" | "TRUE" => Scalar::Bool(true),
        "false" | "False" | "FALSE" => Scalar::Bool(false),
        _ => Scalar::Str(raw.to_string()),
    }
}

fn read_parquet(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| {
        QuarryError::new(
            ErrorCode::SourceIo,
            format!("Failed to open parquet {}: {}", path.display(), e),
        )
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| parquet_err(path, e.to_string()))?;

    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let mut table = Table::new(columns);

    let reader = builder
        .build()
        .map_err(|e| parquet_err(path, e.to_string()))?;

    for batch in reader {
        let batch = batch.map_err(|e| parquet_err(path, e.to_string()))?;

        let mut columns_scalars: Vec<Vec<Scalar>> = Vec::with_capacity(batch.num_columns());
        for column in batch.columns() {
            columns_scalars.push(column_to_scalars(path, column)?);
        }

        for row_idx in 0..batch.num_rows() {
            table.push_row(
                columns_scalars
                    .iter()
                    .map(|col| col[row_idx].clone())
                    .collect(),
            );
        }
    }
    Ok(table)
}

fn column_to_scalars(path: &Path, column: &dyn Array) -> Result<Vec<Scalar>> {
    let data_type = column.data_type().clone();

    let scalars = if data_type == DataType::Boolean {
        let array = column
            .as_any()
            .downcast_ref::<BooleanArray>()
            .expect("boolean array");
        (0..array.len())
            .map(|i| {
                if array.is_null(i) {
                    Scalar::Null
                } else {
                    Scalar::Bool(array.value(i))
                }
            })
            .collect()
    } else if data_type.is_integer() {
        let array = cast(column, &DataType::Int64)
            .map_err(|e| parquet_err(path, e.to_string()))?;
        let array = array
            .as_any()
            .downcast_ref::<Int64Array>()
            .expect("int64 array");
        (0..array.len())
            .map(|i| {
                if array.is_null(i) {
                    Scalar::Null
                } else {
                    Scalar::Int(array.value(i))
                }
            })
            .collect()
    } else if data_type.is_floating() {
        let array = cast(column, &DataType::Float64)
            .map_err(|e| parquet_err(path, e.to_string()))?;
        let array = array
            .as_any()
            .downcast_ref::<Float64Array>()
            .expect("float64 array");
        (0..array.len())
            .map(|i| {
                if array.is_null(i) {
                    Scalar::Null
                } else {
                    Scalar::Float(array.value(i))
                }
            })
            .collect()
    } else {
        // Strings and everything else (dates, timestamps, decimals) go
        // through arrow's cast to Utf8.
        let array =
            cast(column, &DataType::Utf8).map_err(|e| parquet_err(path, e.to_string()))?;
        let array = array
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("utf8 array");
        (0..array.len())
            .map(|i| {
                if array.is_null(i) {
                    Scalar::Null
                } else {
                    Scalar::Str(array.value(i).to_string())
                }
            })
            .collect()
    };

    Ok(scalars)
}

fn parquet_err(path: &Path, message: String) -> QuarryError {
    QuarryError::new(
        ErrorCode::SourceIo,
        format!("Failed to read parquet {}: {}", path.display(), message),
    )
}
