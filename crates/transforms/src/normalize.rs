//! Min-max normalization for selected numeric columns.
use serde::Deserialize;

use crate::{parse_params, Transform};
use quarry_common::table::{Scalar, Table};
use quarry_error::{ErrorCode, ErrorContext, QuarryError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeParams {
    pub columns: Vec<String>,
}

/// Rescales each named column to `[0, 1]` in place. A constant column maps
/// to all `0.0` (the zero denominator is replaced by `1.0`). Columns not
/// present in the data are skipped silently; no columns are added.
#[derive(Debug)]
pub struct Normalize {
    params: NormalizeParams,
}

impl Normalize {
    pub fn from_params(params: &serde_json::Value) -> Result<Self> {
        Ok(Self {
            params: parse_params("normalize", params)?,
        })
    }
}

impl Transform for Normalize {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let mut out = table.clone();

        for column in &self.params.columns {
            let idx = match out.column_index(column) {
                Some(idx) => idx,
                None => {
                    tracing::debug!(column = %column, "normalize target absent, skipping");
                    continue;
                }
            };

            // Nulls stay null and are excluded from min/max.
            let mut values: Vec<Option<f64>> = Vec::with_capacity(out.len());
            for row in out.rows() {
                let cell = &row[idx];
                if cell.is_null() {
                    values.push(None);
                    continue;
                }
                match cell.as_f64() {
                    Some(v) => values.push(Some(v)),
                    None => {
                        return Err(QuarryError::new(
                            ErrorCode::TypeCoercion,
                            format!("Column '{}' holds non-numeric values", column),
                        )
                        .with_context(ErrorContext::Transform {
                            transform: "normalize".to_string(),
                            column: Some(column.clone()),
                        }));
                    }
                }
            }

            let observed: Vec<f64> = values.iter().copied().flatten().collect();
            if observed.is_empty() {
                continue;
            }
            let min = observed.iter().copied().fold(f64::INFINITY, f64::min);
            let max = observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let denom = if max - min == 0.0 { 1.0 } else { max - min };

            let scaled = values
                .into_iter()
                .map(|v| match v {
                    Some(v) => Scalar::Float((v - min) / denom),
                    None => Scalar::Null,
                })
                .collect();
            out.replace_column(idx, scaled);
        }

        Ok(out)
    }
}
