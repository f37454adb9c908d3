//! PostgreSQL connector (generic-SQL, relational).
//!
//! One connection, one prepared statement, one execution per `query` call;
//! the connection drops before returning.
use postgres::types::{ToSql, Type};
use postgres::{NoTls, Row};

use crate::sources::sql::{build_select, SqlConfig, SqlDialect};
use crate::sources::{parse_config, Connector};
use quarry_common::models::QuerySpec;
use quarry_common::table::{Scalar, Table};
use quarry_error::{ErrorCode, ErrorContext, QuarryError, Result};

pub struct PostgresConnector {
    config: SqlConfig,
}

impl PostgresConnector {
    pub fn from_config(config: &serde_json::Value) -> Result<Self> {
        Ok(Self {
            config: parse_config("postgres", config)?,
        })
    }

    fn source_context(&self) -> ErrorContext {
        ErrorContext::Source {
            connector: "postgres".to_string(),
            target: Some(self.config.table.clone()),
        }
    }
}

impl Connector for PostgresConnector {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn query(&self, spec: &QuerySpec) -> Result<Table> {
        let bound = build_select(SqlDialect::Postgres, &self.config.table, spec)?;
        tracing::debug!(sql = %bound.sql, params = bound.params.len(), "executing postgres query");

        let mut client = postgres::Client::connect(&self.config.url, NoTls).map_err(|e| {
            QuarryError::new(
                ErrorCode::SourceConnection,
                format!("Failed to connect to PostgreSQL: {}", e),
            )
            .with_context(self.source_context())
        })?;

        let statement = client.prepare(&bound.sql).map_err(|e| {
            QuarryError::new(
                ErrorCode::SourceQuery,
                format!("Failed to prepare statement: {}", e),
            )
            .with_context(self.source_context())
        })?;

        let owned: Vec<Box<dyn ToSql + Sync>> = bound.params.iter().map(bind_param).collect();
        let param_refs: Vec<&(dyn ToSql + Sync)> = owned.iter().map(|p| p.as_ref()).collect();

        let rows = client.query(&statement, &param_refs).map_err(|e| {
            QuarryError::new(
                ErrorCode::SourceQuery,
                format!("Query execution failed: {}", e),
            )
            .with_context(self.source_context())
        })?;

        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let mut table = Table::new(columns);

        for row in &rows {
            let values = statement
                .columns()
                .iter()
                .enumerate()
                .map(|(i, column)| scalar_from_row(row, i, column.type_()))
                .collect();
            table.push_row(values);
        }
        Ok(table)
    }
}

fn bind_param(value: &Scalar) -> Box<dyn ToSql + Sync> {
    match value {
        Scalar::Null => Box::new(Option::<String>::None),
        Scalar::Bool(b) => Box::new(*b),
        Scalar::Int(i) => Box::new(*i),
        Scalar::Float(f) => Box::new(*f),
        Scalar::Str(s) => Box::new(s.clone()),
    }
}

fn scalar_from_row(row: &Row, idx: usize, ty: &Type) -> Scalar {
    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)
            .ok()
            .flatten()
            .map(Scalar::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)
            .ok()
            .flatten()
            .map(|v| Scalar::Int(v as i64))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)
            .ok()
            .flatten()
            .map(|v| Scalar::Int(v as i64))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)
            .ok()
            .flatten()
            .map(Scalar::Int)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)
            .ok()
            .flatten()
            .map(|v| Scalar::Float(v as f64))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)
            .ok()
            .flatten()
            .map(Scalar::Float)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        row.try_get::<_, Option<String>>(idx)
            .ok()
            .flatten()
            .map(Scalar::Str)
    } else {
        // Types outside the scalar model (timestamps, numerics, arrays)
        // surface as null rather than failing the whole result set.
        match row.try_get::<_, Option<String>>(idx) {
            Ok(v) => v.map(Scalar::Str),
            Err(_) => {
                tracing::debug!(column = idx, r#type = %ty, "unmapped postgres column type");
                None
            }
        }
    };
    value.unwrap_or(Scalar::Null)
}
