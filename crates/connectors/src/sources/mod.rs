use quarry_common::models::QuerySpec;
use quarry_common::table::Table;
use quarry_error::{ErrorCode, QuarryError, Result};

pub mod file;
pub mod sql;

#[cfg(feature = "databricks")]
pub mod databricks;

pub trait Connector: Send + Sync {
    /// Returns the registry name of this connector kind (e.g., "local")
    fn name(&self) -> &'static str;

    /// Executes the specification against the source, single shot.
    ///
    /// A failed attempt is final: connectors never retry, and any connection
    /// or file handle opened here is released before returning.
    fn query(&self, spec: &QuerySpec) -> Result<Table>;
}

/// Deserialize a connector configuration mapping into its typed form,
/// failing structurally at construction time rather than on late access.
pub(crate) fn parse_config<T: serde::de::DeserializeOwned>(
    kind: &str,
    config: &serde_json::Value,
) -> Result<T> {
    serde_json::from_value(config.clone()).map_err(|e| {
        QuarryError::new(
            ErrorCode::InvalidSourceConfig,
            format!("Failed to parse {} source configuration: {}", kind, e),
        )
    })
}

#[cfg(any(not(feature = "postgres"), not(feature = "clickhouse"), not(feature = "databricks")))]
pub(crate) fn driver_unavailable(kind: &str, feature: &str) -> QuarryError {
    QuarryError::new(
        ErrorCode::DriverUnavailable,
        format!("Quarry was compiled without {} support", kind),
    )
    .with_hint(format!(
        "Rebuild with the `{}` cargo feature enabled",
        feature
    ))
}

// Constructor entry points used by the registry. Each returns a fresh boxed
// connector, or fails when the backing driver is compiled out.

pub fn build_local(config: &serde_json::Value) -> Result<Box<dyn Connector>> {
    Ok(Box::new(file::LocalConnector::from_config(config)?))
}

#[cfg(feature = "postgres")]
pub fn build_postgres(config: &serde_json::Value) -> Result<Box<dyn Connector>> {
    Ok(Box::new(sql::postgres::PostgresConnector::from_config(
        config,
    )?))
}

#[cfg(not(feature = "postgres"))]
pub fn build_postgres(_config: &serde_json::Value) -> Result<Box<dyn Connector>> {
    Err(driver_unavailable("PostgreSQL", "postgres"))
}

#[cfg(feature = "clickhouse")]
pub fn build_clickhouse(config: &serde_json::Value) -> Result<Box<dyn Connector>> {
    Ok(Box::new(sql::clickhouse::ClickHouseConnector::from_config(
        config,
    )?))
}

#[cfg(not(feature = "clickhouse"))]
pub fn build_clickhouse(_config: &serde_json::Value) -> Result<Box<dyn Connector>> {
    Err(driver_unavailable("ClickHouse", "clickhouse"))
}

#[cfg(feature = "databricks")]
pub fn build_databricks(config: &serde_json::Value) -> Result<Box<dyn Connector>> {
    Ok(Box::new(databricks::DatabricksConnector::from_config(
        config,
    )?))
}

#[cfg(not(feature = "databricks"))]
pub fn build_databricks(_config: &serde_json::Value) -> Result<Box<dyn Connector>> {
    Err(driver_unavailable("Databricks", "databricks"))
}
