//! Trailing moving average over a numeric column.
use serde::Deserialize;

use crate::{parse_params, Transform};
use quarry_common::table::{Scalar, Table};
use quarry_error::{ErrorCode, ErrorContext, QuarryError, Result};

fn default_window() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovingAverageParams {
    pub column: String,
    #[serde(default = "default_window")]
    pub window: usize,
}

/// Appends `<column>_ma<window>`: for row i, the mean over rows
/// `max(0, i - window + 1)..=i`, i.e. an expanding mean for the first
/// `window - 1` rows and a full trailing window thereafter. The source
/// column is left unchanged. No-op if the target column is absent.
#[derive(Debug)]
pub struct MovingAverage {
    params: MovingAverageParams,
}

impl MovingAverage {
    pub fn from_params(params: &serde_json::Value) -> Result<Self> {
        let params: MovingAverageParams = parse_params("moving_average", params)?;
        if params.window == 0 {
            return Err(QuarryError::new(
                ErrorCode::InvalidParams,
                "moving_average window must be at least 1",
            ));
        }
        Ok(Self { params })
    }
}

impl Transform for MovingAverage {
    fn name(&self) -> &'static str {
        "moving_average"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let idx = match table.column_index(&self.params.column) {
            Some(idx) => idx,
            None => {
                tracing::debug!(column = %self.params.column, "moving_average target absent, skipping");
                return Ok(table.clone());
            }
        };

        let mut values: Vec<Option<f64>> = Vec::with_capacity(table.len());
        for row in table.rows() {
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
                        format!("Column '{}' holds non-numeric values", self.params.column),
                    )
                    .with_context(ErrorContext::Transform {
                        transform: "moving_average".to_string(),
                        column: Some(self.params.column.clone()),
                    }));
                }
            }
        }

        let window = self.params.window;
        let means = (0..values.len()).map(|i| {
            let start = (i + 1).saturating_sub(window);
            let observed: Vec<f64> = values[start..=i].iter().copied().flatten().collect();
            if observed.is_empty() {
                Scalar::Null
            } else {
                Scalar::Float(observed.iter().sum::<f64>() / observed.len() as f64)
            }
        });

        let mut out = table.clone();
        out.append_column(
            format!("{}_ma{}", self.params.column, window),
            means.collect(),
        );
        Ok(out)
    }
}
