//! Transform capability: maps tabular data to tabular data given named
//! parameters.
//!
//! A transform is constructed fresh per pipeline step from a parameter
//! mapping, applied exactly once, and discarded. Transforms never mutate
//! their input and never fail on a missing target column: that case is a
//! defined no-op, the input is returned unchanged. Transforms only ever
//! append derived columns or leave the column set intact.
pub mod moving_average;
pub mod normalize;
pub mod seasonal;

use quarry_common::table::Table;
use quarry_error::{ErrorCode, QuarryError, Result};

pub trait Transform: Send + Sync {
    /// Returns the registry name of this transform kind (e.g., "normalize")
    fn name(&self) -> &'static str;

    /// Applies the transform, returning a new table.
    fn apply(&self, table: &Table) -> Result<Table>;
}

/// Deserialize a transform parameter mapping into its typed form, failing
/// structurally at construction time.
pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(
    kind: &str,
    params: &serde_json::Value,
) -> Result<T> {
    serde_json::from_value(params.clone()).map_err(|e| {
        QuarryError::new(
            ErrorCode::InvalidParams,
            format!("Failed to parse {} parameters: {}", kind, e),
        )
    })
}

// Constructor entry points used by the registry.

pub fn build_normalize(params: &serde_json::Value) -> Result<Box<dyn Transform>> {
    Ok(Box::new(normalize::Normalize::from_params(params)?))
}

pub fn build_moving_average(params: &serde_json::Value) -> Result<Box<dyn Transform>> {
    Ok(Box::new(moving_average::MovingAverage::from_params(
        params,
    )?))
}

pub fn build_seasonal_adjustment(params: &serde_json::Value) -> Result<Box<dyn Transform>> {
    seasonal::build(params)
}
