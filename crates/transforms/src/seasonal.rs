//! Seasonal adjustment via robust additive decomposition.
//!
//! The decomposition (centered moving-average trend, per-phase median
//! seasonal effects) is an optional capability behind the `seasonal`
//! feature; without it, construction reports a missing dependency instead
//! of failing on first use.
use serde::Deserialize;

use crate::Transform;
use quarry_error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonalAdjustmentParams {
    pub column: String,
    pub period: usize,
}

pub fn build(params: &serde_json::Value) -> Result<Box<dyn Transform>> {
    #[cfg(feature = "seasonal")]
    {
        Ok(Box::new(SeasonalAdjustment::from_params(params)?))
    }
    #[cfg(not(feature = "seasonal"))]
    {
        let _ = params;
        Err(quarry_error::QuarryError::new(
            quarry_error::ErrorCode::MissingOptionalDependency,
            "seasonal_adjustment is not available in this build",
        )
        .with_hint("Rebuild quarry-transforms with the `seasonal` cargo feature"))
    }
}

#[cfg(feature = "seasonal")]
pub use imp::SeasonalAdjustment;

#[cfg(feature = "seasonal")]
mod imp {
    use super::SeasonalAdjustmentParams;
    use crate::{parse_params, Transform};
    use quarry_common::table::{Scalar, Table};
    use quarry_error::{ErrorCode, QuarryError, Result};

    /// Appends `<column>_sa`: the forward-filled series minus its seasonal
    /// component. Non-numeric values are treated as missing and filled, not
    /// failed. No-op if the target column is absent.
    #[derive(Debug)]
    pub struct SeasonalAdjustment {
        params: SeasonalAdjustmentParams,
    }

    impl SeasonalAdjustment {
        pub fn from_params(params: &serde_json::Value) -> Result<Self> {
            let params: SeasonalAdjustmentParams = parse_params("seasonal_adjustment", params)?;
            if params.period < 2 {
                return Err(QuarryError::new(
                    ErrorCode::InvalidParams,
                    "seasonal_adjustment period must be at least 2",
                ));
            }
            Ok(Self { params })
        }
    }

    impl Transform for SeasonalAdjustment {
        fn name(&self) -> &'static str {
            "seasonal_adjustment"
        }

        fn apply(&self, table: &Table) -> Result<Table> {
            let idx = match table.column_index(&self.params.column) {
                Some(idx) => idx,
                None => {
                    tracing::debug!(
                        column = %self.params.column,
                        "seasonal_adjustment target absent, skipping"
                    );
                    return Ok(table.clone());
                }
            };

            // Coerce-or-missing, then forward fill; the leading gap takes the
            // first observed value.
            let observed: Vec<Option<f64>> =
                table.rows().iter().map(|row| row[idx].as_f64()).collect();

            let first = match observed.iter().copied().flatten().next() {
                Some(v) => v,
                None => {
                    tracing::debug!(
                        column = %self.params.column,
                        "seasonal_adjustment target has no numeric values, skipping"
                    );
                    return Ok(table.clone());
                }
            };

            let mut filled = Vec::with_capacity(observed.len());
            let mut last = first;
            for value in observed {
                if let Some(v) = value {
                    last = v;
                }
                filled.push(last);
            }

            let period = self.params.period;
            if filled.len() < 2 * period {
                return Err(QuarryError::new(
                    ErrorCode::InvalidParams,
                    format!(
                        "seasonal_adjustment needs at least {} rows for period {}, got {}",
                        2 * period,
                        period,
                        filled.len()
                    ),
                ));
            }

            let seasonal = seasonal_component(&filled, period);
            let adjusted = filled
                .iter()
                .zip(&seasonal)
                .map(|(value, effect)| Scalar::Float(value - effect))
                .collect();

            let mut out = table.clone();
            out.append_column(format!("{}_sa", self.params.column), adjusted);
            Ok(out)
        }
    }

    /// Classical additive decomposition, robustified with per-phase medians:
    /// a centered moving-average trend, median detrended effect per phase,
    /// effects centered to sum to zero over one period.
    fn seasonal_component(series: &[f64], period: usize) -> Vec<f64> {
        let trend = centered_moving_average(series, period);

        let mut by_phase: Vec<Vec<f64>> = vec![Vec::new(); period];
        for (i, trend_value) in trend.iter().enumerate() {
            if let Some(t) = trend_value {
                by_phase[i % period].push(series[i] - t);
            }
        }

        let mut effects: Vec<f64> = by_phase.iter().map(|values| median(values)).collect();
        let mean = effects.iter().sum::<f64>() / period as f64;
        for effect in &mut effects {
            *effect -= mean;
        }

        (0..series.len()).map(|i| effects[i % period]).collect()
    }

    /// Centered moving average; for an even period, the standard 2×MA with
    /// half-weighted endpoints. Edges stay undefined.
    fn centered_moving_average(series: &[f64], period: usize) -> Vec<Option<f64>> {
        let n = series.len();
        let half = period / 2;
        let mut out = vec![None; n];

        if period % 2 == 1 {
            for i in half..n - half {
                let window = &series[i - half..=i + half];
                out[i] = Some(window.iter().sum::<f64>() / period as f64);
            }
        } else {
            for i in half..n - half {
                let window = &series[i - half..=i + half];
                let sum = 0.5 * window[0]
                    + window[1..period].iter().sum::<f64>()
                    + 0.5 * window[period];
                out[i] = Some(sum / period as f64);
            }
        }
        out
    }

    fn median(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn table_with(values: Vec<Scalar>) -> Table {
            Table::from_rows(
                vec!["value".into()],
                values.into_iter().map(|v| vec![v]).collect(),
            )
        }

        fn build(period: usize) -> SeasonalAdjustment {
            SeasonalAdjustment::from_params(
                &serde_json::json!({ "column": "value", "period": period }),
            )
            .unwrap()
        }

        /// Linear trend plus a zero-mean period-4 pattern: adjustment should
        /// recover the trend exactly (up to float noise).
        #[test]
        fn test_removes_known_seasonal_pattern() {
            let pattern = [5.0, 0.0, -5.0, 0.0];
            let values: Vec<Scalar> = (0..24)
                .map(|i| Scalar::Float(10.0 + 0.5 * i as f64 + pattern[i % 4]))
                .collect();
            let table = table_with(values);

            let out = build(4).apply(&table).unwrap();
            assert_eq!(
                out.columns(),
                &["value".to_string(), "value_sa".to_string()]
            );
            for (i, row) in out.rows().iter().enumerate() {
                let expected = 10.0 + 0.5 * i as f64;
                match &row[1] {
                    Scalar::Float(v) => {
                        assert!((v - expected).abs() < 1e-6, "row {}: {} !~ {}", i, v, expected)
                    }
                    other => panic!("expected float, got {:?}", other),
                }
            }
            // original column untouched
            assert_eq!(out.rows()[0][0], table.rows()[0][0]);
        }

        #[test]
        fn test_odd_period() {
            let pattern = [2.0, -1.0, -1.0];
            let values: Vec<Scalar> = (0..18)
                .map(|i| Scalar::Float(100.0 + pattern[i % 3]))
                .collect();
            let out = build(3).apply(&table_with(values)).unwrap();
            for row in out.rows() {
                match &row[1] {
                    Scalar::Float(v) => assert!((v - 100.0).abs() < 1e-6),
                    other => panic!("expected float, got {:?}", other),
                }
            }
        }

        #[test]
        fn test_forward_fill_of_missing_values() {
            let mut values: Vec<Scalar> =
                (0..16).map(|i| Scalar::Float((i % 4) as f64)).collect();
            values[5] = Scalar::Null;
            values[6] = Scalar::from("n/a");
            let out = build(4).apply(&table_with(values)).unwrap();
            // still produces a full column, no nulls
            assert!(out.rows().iter().all(|row| !row[1].is_null()));
        }

        #[test]
        fn test_missing_column_is_noop() {
            let table = table_with(vec![Scalar::Int(1); 8]);
            let transform = SeasonalAdjustment::from_params(
                &serde_json::json!({ "column": "ghost", "period": 4 }),
            )
            .unwrap();
            assert_eq!(transform.apply(&table).unwrap(), table);
        }

        #[test]
        fn test_short_series_rejected() {
            let table = table_with(vec![Scalar::Int(1); 5]);
            let err = build(4).apply(&table).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidParams);
        }

        #[test]
        fn test_period_below_two_rejected() {
            let err = SeasonalAdjustment::from_params(
                &serde_json::json!({ "column": "value", "period": 1 }),
            )
            .unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidParams);
        }
    }
}

#[cfg(all(test, not(feature = "seasonal")))]
mod feature_gated_tests {
    use quarry_error::ErrorKind;

    #[test]
    fn test_build_without_feature_reports_missing_dependency() {
        let err = super::build(&serde_json::json!({ "column": "value", "period": 4 }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingOptionalDependency);
    }
}
