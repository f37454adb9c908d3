//! The `query` subcommand: assemble connector config and query spec from
//! flags, execute once, print CSV.
use std::collections::BTreeMap;

use quarry_common::models::QuerySpec;
use quarry_common::table::Scalar;
use quarry_core::Engine;
use quarry_error::{ErrorCode, QuarryError, Result};

pub struct QueryArgs {
    pub connector: String,
    pub path: Option<String>,
    pub url: Option<String>,
    pub table: Option<String>,
    pub server_hostname: Option<String>,
    pub http_path: Option<String>,
    pub access_token: Option<String>,
    pub select: Vec<String>,
    pub filters: Vec<String>,
    pub limit: Option<usize>,
}

pub fn run(args: QueryArgs) -> Result<()> {
    let config = connector_config(&args);
    let spec = QuerySpec {
        select: if args.select.is_empty() {
            None
        } else {
            Some(args.select.clone())
        },
        where_: parse_filters(&args.filters)?,
        limit: args.limit,
    };

    let table = Engine::new().query(&args.connector, &config, &spec)?;
    super::write_csv(&table, std::io::stdout().lock())
}

/// Only flags that were actually given end up in the config; each connector
/// validates its own required fields at construction.
fn connector_config(args: &QueryArgs) -> serde_json::Value {
    let mut config = serde_json::Map::new();
    let fields = [
        ("path", &args.path),
        ("url", &args.url),
        ("table", &args.table),
        ("server_hostname", &args.server_hostname),
        ("http_path", &args.http_path),
        ("access_token", &args.access_token),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            config.insert(key.to_string(), serde_json::Value::from(value.clone()));
        }
    }
    serde_json::Value::Object(config)
}

fn parse_filters(filters: &[String]) -> Result<Option<BTreeMap<String, Scalar>>> {
    if filters.is_empty() {
        return Ok(None);
    }
    let mut conditions = BTreeMap::new();
    for filter in filters {
        let Some((key, value)) = filter.split_once('=') else {
            return Err(QuarryError::new(
                ErrorCode::InvalidParams,
                format!("Invalid --where filter '{}', expected key=value", filter),
            ));
        };
        conditions.insert(key.to_string(), Scalar::from(value));
    }
    Ok(Some(conditions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> QueryArgs {
        QueryArgs {
            connector: "local".to_string(),
            path: Some("data.csv".to_string()),
            url: None,
            table: None,
            server_hostname: None,
            http_path: None,
            access_token: None,
            select: vec![],
            filters: vec![],
            limit: None,
        }
    }

    #[test]
    fn test_config_only_carries_given_flags() {
        let config = connector_config(&args());
        assert_eq!(config, serde_json::json!({ "path": "data.csv" }));
    }

    #[test]
    fn test_parse_filters() {
        let conditions = parse_filters(&["series=GDP".to_string(), "year=2024".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(conditions.get("series"), Some(&Scalar::from("GDP")));
        assert_eq!(conditions.get("year"), Some(&Scalar::from("2024")));

        assert!(parse_filters(&["nonsense".to_string()]).is_err());
        assert!(parse_filters(&[]).unwrap().is_none());
    }
}
