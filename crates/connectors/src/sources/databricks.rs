//! Databricks SQL warehouse connector.
//!
//! Executes one statement through the SQL Statement Execution REST API
//! (`/api/2.0/sql/statements`) with a synchronous wait: no polling loop, no
//! retry, one round trip per `query` call. Where-values are bound as named
//! `:pN` parameters, never interpolated.
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::sources::sql::{build_select, SqlDialect};
use crate::sources::{parse_config, Connector};
use quarry_common::models::QuerySpec;
use quarry_common::table::{Scalar, Table};
use quarry_error::{ErrorCode, ErrorContext, QuarryError, Result};

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::from(s))
}

#[derive(Debug, Deserialize)]
pub struct DatabricksConfig {
    pub server_hostname: String,
    pub http_path: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub access_token: SecretString,
    pub table: String,
}

pub struct DatabricksConnector {
    config: DatabricksConfig,
}

#[derive(Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    warehouse_id: &'a str,
    wait_timeout: &'a str,
    on_wait_timeout: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<StatementParameter>,
}

#[derive(Serialize)]
struct StatementParameter {
    name: String,
    value: Option<String>,
    #[serde(rename = "type")]
    type_name: &'static str,
}

#[derive(Deserialize)]
struct StatementResponse {
    status: StatementStatus,
    manifest: Option<Manifest>,
    result: Option<StatementResult>,
}

#[derive(Deserialize)]
struct StatementStatus {
    state: String,
    error: Option<StatementError>,
}

#[derive(Deserialize)]
struct StatementError {
    message: String,
}

#[derive(Deserialize)]
struct Manifest {
    schema: ManifestSchema,
}

#[derive(Deserialize)]
struct ManifestSchema {
    columns: Vec<ManifestColumn>,
}

#[derive(Deserialize)]
struct ManifestColumn {
    name: String,
    type_name: String,
}

#[derive(Deserialize)]
struct StatementResult {
    #[serde(default)]
    data_array: Vec<Vec<Option<String>>>,
}

impl DatabricksConnector {
    pub fn from_config(config: &serde_json::Value) -> Result<Self> {
        let config: DatabricksConfig = parse_config("databricks", config)?;
        // Fail on an unusable http_path at construction, not mid-request.
        warehouse_id(&config.http_path)?;
        Ok(Self { config })
    }

    fn source_context(&self) -> ErrorContext {
        ErrorContext::Source {
            connector: "databricks".to_string(),
            target: Some(self.config.table.clone()),
        }
    }

    fn endpoint(&self) -> String {
        let host = &self.config.server_hostname;
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}/api/2.0/sql/statements", host.trim_end_matches('/'))
        } else {
            format!("https://{}/api/2.0/sql/statements", host)
        }
    }
}

impl Connector for DatabricksConnector {
    fn name(&self) -> &'static str {
        "databricks"
    }

    fn query(&self, spec: &QuerySpec) -> Result<Table> {
        let bound = build_select(SqlDialect::Databricks, &self.config.table, spec)?;
        let warehouse = warehouse_id(&self.config.http_path)?;
        tracing::debug!(sql = %bound.sql, warehouse = %warehouse, "executing databricks statement");

        let request = StatementRequest {
            statement: &bound.sql,
            warehouse_id: warehouse,
            wait_timeout: "30s",
            on_wait_timeout: "CANCEL",
            parameters: bound
                .params
                .iter()
                .enumerate()
                .map(|(i, value)| bind_param(i, value))
                .collect(),
        };

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(self.endpoint())
            .bearer_auth(self.config.access_token.expose_secret())
            .json(&request)
            .send()
            .map_err(|e| {
                QuarryError::new(
                    ErrorCode::SourceConnection,
                    format!("Failed to reach Databricks: {}", e),
                )
                .with_context(self.source_context())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuarryError::new(
                ErrorCode::SourceQuery,
                format!("Databricks returned {}: {}", status, body.trim()),
            )
            .with_context(self.source_context()));
        }

        let payload: StatementResponse = response.json().map_err(|e| {
            QuarryError::new(
                ErrorCode::SourceQuery,
                format!("Failed to decode Databricks response: {}", e),
            )
            .with_context(self.source_context())
        })?;

        if payload.status.state != "SUCCEEDED" {
            let detail = payload
                .status
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| payload.status.state.clone());
            return Err(QuarryError::new(
                ErrorCode::SourceQuery,
                format!("Databricks statement failed: {}", detail),
            )
            .with_context(self.source_context()));
        }

        let manifest = match payload.manifest {
            Some(m) => m,
            None => return Ok(Table::default()),
        };

        let mut table = Table::new(
            manifest
                .schema
                .columns
                .iter()
                .map(|c| c.name.clone())
                .collect(),
        );

        let data_array = payload.result.map(|r| r.data_array).unwrap_or_default();
        for raw_row in &data_array {
            let row = manifest
                .schema
                .columns
                .iter()
                .zip(raw_row)
                .map(|(column, cell)| scalar_from_databricks(cell.as_deref(), &column.type_name))
                .collect();
            table.push_row(row);
        }
        Ok(table)
    }
}

fn bind_param(i: usize, value: &Scalar) -> StatementParameter {
    let (type_name, text) = match value {
        Scalar::Null => ("STRING", None),
        Scalar::Bool(b) => ("BOOLEAN", Some(b.to_string())),
        Scalar::Int(v) => ("BIGINT", Some(v.to_string())),
        Scalar::Float(v) => ("DOUBLE", Some(v.to_string())),
        Scalar::Str(s) => ("STRING", Some(s.clone())),
    };
    StatementParameter {
        name: format!("p{}", i),
        value: text,
        type_name,
    }
}

/// Every `data_array` cell arrives as text; the manifest's `type_name`
/// decides the scalar.
fn scalar_from_databricks(cell: Option<&str>, type_name: &str) -> Scalar {
    let text = match cell {
        None => return Scalar::Null,
        Some(t) => t,
    };
    match type_name {
        "BYTE" | "SHORT" | "INT" | "LONG" => text
            .parse::<i64>()
            .map(Scalar::Int)
            .unwrap_or_else(|_| Scalar::Str(text.to_string())),
        "FLOAT" | "DOUBLE" | "DECIMAL" => text
            .parse::<f64>()
            .map(Scalar::Float)
            .unwrap_or_else(|_| Scalar::Str(text.to_string())),
        "BOOLEAN" => match text {
            "true" => Scalar::Bool(true),
            "false" => Scalar::Bool(false),
            _ => Scalar::Str(text.to_string()),
        },
        _ => Scalar::Str(text.to_string()),
    }
}

fn warehouse_id(http_path: &str) -> Result<&str> {
    http_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| {
            QuarryError::new(
                ErrorCode::InvalidSourceConfig,
                format!("Cannot derive a warehouse id from http_path '{}'", http_path),
            )
            .with_hint("Expected a path like /sql/1.0/warehouses/<id>")
        })
}
