//! ClickHouse connector (generic-SQL, warehouse-flavored).
//!
//! Speaks the ClickHouse HTTP interface: the statement is POSTed with
//! `FORMAT JSON`, and every bound value travels as a `param_pN` request
//! parameter matching a `{pN:Type}` placeholder in the statement.
use serde::Deserialize;

use crate::sources::sql::{build_select, SqlConfig, SqlDialect};
use crate::sources::{parse_config, Connector};
use quarry_common::models::QuerySpec;
use quarry_common::table::{Scalar, Table};
use quarry_error::{ErrorCode, ErrorContext, QuarryError, Result};

pub struct ClickHouseConnector {
    config: SqlConfig,
}

#[derive(Debug, Deserialize)]
struct ClickHouseResponse {
    meta: Vec<ColumnMeta>,
    #[serde(default)]
    data: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ColumnMeta {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
}

impl ClickHouseConnector {
    pub fn from_config(config: &serde_json::Value) -> Result<Self> {
        Ok(Self {
            config: parse_config("clickhouse", config)?,
        })
    }

    fn source_context(&self) -> ErrorContext {
        ErrorContext::Source {
            connector: "clickhouse".to_string(),
            target: Some(self.config.table.clone()),
        }
    }
}

impl Connector for ClickHouseConnector {
    fn name(&self) -> &'static str {
        "clickhouse"
    }

    fn query(&self, spec: &QuerySpec) -> Result<Table> {
        let bound = build_select(SqlDialect::ClickHouse, &self.config.table, spec)?;
        tracing::debug!(sql = %bound.sql, params = bound.params.len(), "executing clickhouse query");

        let client = reqwest::blocking::Client::new();
        let mut request = client.post(&self.config.url);
        for (i, value) in bound.params.iter().enumerate() {
            request = request.query(&[(format!("param_p{}", i), param_text(value))]);
        }

        let response = request
            .body(format!("{} FORMAT JSON", bound.sql))
            .send()
            .map_err(|e| {
                QuarryError::new(
                    ErrorCode::SourceConnection,
                    format!("Failed to reach ClickHouse: {}", e),
                )
                .with_context(self.source_context())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuarryError::new(
                ErrorCode::SourceQuery,
                format!("ClickHouse returned {}: {}", status, body.trim()),
            )
            .with_context(self.source_context()));
        }

        let payload: ClickHouseResponse = response.json().map_err(|e| {
            QuarryError::new(
                ErrorCode::SourceQuery,
                format!("Failed to decode ClickHouse response: {}", e),
            )
            .with_context(self.source_context())
        })?;

        let mut table = Table::new(payload.meta.iter().map(|m| m.name.clone()).collect());
        for record in &payload.data {
            let row = payload
                .meta
                .iter()
                .map(|m| scalar_from_clickhouse(record.get(&m.name), &m.column_type))
                .collect();
            table.push_row(row);
        }
        Ok(table)
    }
}

fn param_text(value: &Scalar) -> String {
    match value {
        // \N is the HTTP interface's NULL literal
        Scalar::Null => "\\N".to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Str(s) => s.clone(),
    }
}

/// ClickHouse serializes 64-bit integers as JSON strings by default
/// (`output_format_json_quote_64bit_integers`); map values back through the
/// declared column type.
fn scalar_from_clickhouse(value: Option<&serde_json::Value>, column_type: &str) -> Scalar {
    let value = match value {
        None | Some(serde_json::Value::Null) => return Scalar::Null,
        Some(v) => v,
    };

    let base = column_type
        .trim_start_matches("Nullable(")
        .trim_start_matches("LowCardinality(")
        .trim_end_matches(')');

    if base.starts_with("Int") || base.starts_with("UInt") {
        if let Some(i) = value.as_i64() {
            return Scalar::Int(i);
        }
        if let Some(i) = value.as_str().and_then(|s| s.parse::<i64>().ok()) {
            return Scalar::Int(i);
        }
    } else if base.starts_with("Float") {
        if let Some(f) = value.as_f64() {
            return Scalar::Float(f);
        }
        if let Some(f) = value.as_str().and_then(|s| s.parse::<f64>().ok()) {
            return Scalar::Float(f);
        }
    } else if base == "Bool" {
        if let Some(b) = value.as_bool() {
            return Scalar::Bool(b);
        }
        if let Some(i) = value.as_i64() {
            return Scalar::Bool(i != 0);
        }
    }

    Scalar::from_json(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_from_clickhouse_quoted_int64() {
        let v = serde_json::json!("9007199254740993");
        assert_eq!(
            scalar_from_clickhouse(Some(&v), "UInt64"),
            Scalar::Int(9007199254740993)
        );
    }

    #[test]
    fn test_scalar_from_clickhouse_nullable_wrapper() {
        let v = serde_json::json!(3);
        assert_eq!(
            scalar_from_clickhouse(Some(&v), "Nullable(Int32)"),
            Scalar::Int(3)
        );
        assert_eq!(scalar_from_clickhouse(None, "Nullable(Int32)"), Scalar::Null);
    }

    #[test]
    fn test_param_text_null_literal() {
        assert_eq!(param_text(&Scalar::Null), "\\N");
        assert_eq!(param_text(&Scalar::from("GDP")), "GDP");
    }
}
