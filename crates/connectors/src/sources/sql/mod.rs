//! SQL-speaking connectors.
//!
//! All SQL targets share one SELECT builder: `select` becomes an explicit
//! quoted column list (or `*`), each `where` entry becomes a parameterized
//! equality clause joined with AND, and `limit` becomes the dialect's
//! row-limiting clause. Values are always bound as parameters, never
//! interpolated into the statement text.
use quarry_common::models::QuerySpec;
use quarry_common::table::Scalar;
use quarry_error::{ErrorCode, QuarryError, Result};
use serde::Deserialize;

#[cfg(feature = "clickhouse")]
pub mod clickhouse;
#[cfg(feature = "postgres")]
pub mod postgres;

/// Connection target plus table name, shared by the generic-SQL connectors.
#[derive(Debug, Clone, Deserialize)]
pub struct SqlConfig {
    pub url: String,
    pub table: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    ClickHouse,
    Databricks,
}

impl SqlDialect {
    /// Placeholder for the i-th bound parameter (named `p{i}` where the
    /// dialect uses named markers).
    fn placeholder(&self, i: usize, value: &Scalar) -> String {
        match self {
            SqlDialect::Postgres => format!("${}", i + 1),
            SqlDialect::ClickHouse => format!("{{p{}:{}}}", i, clickhouse_param_type(value)),
            SqlDialect::Databricks => format!(":p{}", i),
        }
    }

    fn quote_ident(&self, name: &str) -> String {
        match self {
            SqlDialect::Postgres => format!("\"{}\"", name),
            SqlDialect::ClickHouse | SqlDialect::Databricks => format!("`{}`", name),
        }
    }

    /// Row-limiting clause. Every current target uses `LIMIT n`; a
    /// `TOP n`-style dialect would render differently here.
    fn limit_clause(&self, n: usize) -> String {
        format!(" LIMIT {}", n)
    }
}

fn clickhouse_param_type(value: &Scalar) -> &'static str {
    match value {
        Scalar::Bool(_) => "Bool",
        Scalar::Int(_) => "Int64",
        Scalar::Float(_) => "Float64",
        Scalar::Str(_) => "String",
        Scalar::Null => "Nullable(String)",
    }
}

/// A rendered statement plus its positional parameter values (`p0`, `p1`, …
/// in order).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSelect {
    pub sql: String,
    pub params: Vec<Scalar>,
}

pub fn build_select(dialect: SqlDialect, table: &str, spec: &QuerySpec) -> Result<BoundSelect> {
    let columns = match &spec.select {
        Some(names) => names
            .iter()
            .map(|n| quote_checked(dialect, n))
            .collect::<Result<Vec<_>>>()?
            .join(", "),
        None => "*".to_string(),
    };

    // Table names may be schema-qualified; validate and quote each part.
    let table_ref = table
        .split('.')
        .map(|part| quote_checked(dialect, part))
        .collect::<Result<Vec<_>>>()?
        .join(".");

    let mut params = Vec::new();
    let mut where_clause = String::new();
    if let Some(conditions) = &spec.where_ {
        if !conditions.is_empty() {
            let mut parts = Vec::with_capacity(conditions.len());
            for (i, (column, value)) in conditions.iter().enumerate() {
                parts.push(format!(
                    "{} = {}",
                    quote_checked(dialect, column)?,
                    dialect.placeholder(i, value)
                ));
                params.push(value.clone());
            }
            where_clause = format!(" WHERE {}", parts.join(" AND "));
        }
    }

    let limit_clause = spec
        .limit
        .map(|n| dialect.limit_clause(n))
        .unwrap_or_default();

    Ok(BoundSelect {
        sql: format!(
            "SELECT {} FROM {}{}{}",
            columns, table_ref, where_clause, limit_clause
        ),
        params,
    })
}

fn quote_checked(dialect: SqlDialect, name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(dialect.quote_ident(name))
}

fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid_identifier("empty".to_string()));
    }
    if name.len() > 128 {
        return Err(invalid_identifier(format!("too long: {}", name.len())));
    }
    if name.contains('"')
        || name.contains('\x00')
        || name.contains(';')
        || name.contains('`')
        || name.contains('\\')
    {
        return Err(invalid_identifier(format!("forbidden characters in: {}", name)));
    }
    Ok(())
}

fn invalid_identifier(detail: String) -> QuarryError {
    QuarryError::new(
        ErrorCode::SourceQuery,
        format!("Invalid identifier: {}", detail),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("observations").is_ok());
        assert!(validate_identifier("series_id").is_ok());

        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("foo\"bar").is_err());
        assert!(validate_identifier("x; DROP TABLE t").is_err());
        assert!(validate_identifier("null\0byte").is_err());
    }

    #[test]
    fn test_build_select_star_no_clauses() {
        let bound = build_select(SqlDialect::Postgres, "obs", &QuerySpec::default()).unwrap();
        assert_eq!(bound.sql, "SELECT * FROM \"obs\"");
        assert!(bound.params.is_empty());
    }

    #[test]
    fn test_build_select_full_postgres() {
        let mut conditions = BTreeMap::new();
        conditions.insert("series".to_string(), Scalar::from("GDP"));
        conditions.insert("year".to_string(), Scalar::Int(2024));
        let spec = QuerySpec {
            select: Some(vec!["date".into(), "value".into()]),
            where_: Some(conditions),
            limit: Some(10),
        };

        let bound = build_select(SqlDialect::Postgres, "econ.obs", &spec).unwrap();
        assert_eq!(
            bound.sql,
            "SELECT \"date\", \"value\" FROM \"econ\".\"obs\" \
             WHERE \"series\" = $1 AND \"year\" = $2 LIMIT 10"
        );
        assert_eq!(bound.params, vec![Scalar::from("GDP"), Scalar::Int(2024)]);
        // the bound value never appears in the statement text
        assert!(!bound.sql.contains("GDP"));
    }

    #[test]
    fn test_build_select_clickhouse_named_typed_params() {
        let mut conditions = BTreeMap::new();
        conditions.insert("series".to_string(), Scalar::from("GDP"));
        let spec = QuerySpec {
            select: None,
            where_: Some(conditions),
            limit: Some(3),
        };

        let bound = build_select(SqlDialect::ClickHouse, "obs", &spec).unwrap();
        assert_eq!(
            bound.sql,
            "SELECT * FROM `obs` WHERE `series` = {p0:String} LIMIT 3"
        );
    }

    #[test]
    fn test_build_select_rejects_hostile_column() {
        let spec = QuerySpec {
            select: Some(vec!["value\"; DROP TABLE obs; --".into()]),
            where_: None,
            limit: None,
        };
        let err = build_select(SqlDialect::Postgres, "obs", &spec).unwrap_err();
        assert_eq!(err.code, ErrorCode::SourceQuery);
    }

    #[test]
    fn test_empty_where_map_renders_no_clause() {
        let spec = QuerySpec {
            select: None,
            where_: Some(BTreeMap::new()),
            limit: None,
        };
        let bound = build_select(SqlDialect::Databricks, "obs", &spec).unwrap();
        assert_eq!(bound.sql, "SELECT * FROM `obs`");
    }
}
