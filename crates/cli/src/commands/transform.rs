//! The `transform` subcommand: CSV in, pipeline, CSV out.
//!
//! Step syntax: `name:key=value,key=value`. Values parse as int, float or
//! bool where they look like one, stay strings otherwise, and split into
//! lists on `|` (e.g. `normalize:columns=price|volume`).
use std::path::Path;

use quarry_common::models::{PipelineStep, QuerySpec};
use quarry_core::Engine;
use quarry_error::{ErrorCode, QuarryError, Result};

pub fn run(input: &str, out: Option<&str>, steps: &[String]) -> Result<()> {
    let engine = Engine::new();

    let table = engine.query(
        "local",
        &serde_json::json!({ "path": input }),
        &QuerySpec::default(),
    )?;

    let pipeline: Vec<PipelineStep> = steps
        .iter()
        .map(|step| parse_step(step))
        .collect::<Result<_>>()?;
    let table = engine.run_pipeline(table, &pipeline)?;

    match out {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = std::fs::File::create(path)?;
            super::write_csv(&table, file)
        }
        None => super::write_csv(&table, std::io::stdout().lock()),
    }
}

pub(crate) fn parse_step(step: &str) -> Result<PipelineStep> {
    let (name, args) = match step.split_once(':') {
        Some((name, args)) => (name, args),
        None => (step, ""),
    };
    if name.is_empty() {
        return Err(QuarryError::new(
            ErrorCode::InvalidParams,
            format!("Invalid --step '{}', expected name:key=value,...", step),
        ));
    }

    let mut params = serde_json::Map::new();
    if !args.is_empty() {
        for pair in args.split(',') {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(QuarryError::new(
                    ErrorCode::InvalidParams,
                    format!("Invalid step argument '{}' in '{}'", pair, step),
                ));
            };
            params.insert(key.to_string(), parse_literal(value));
        }
    }

    Ok(PipelineStep::new(name, serde_json::Value::Object(params)))
}

fn parse_literal(raw: &str) -> serde_json::Value {
    if raw.contains('|') {
        return serde_json::Value::Array(raw.split('|').map(parse_literal).collect());
    }
    if let Ok(i) = raw.parse::<i64>() {
        return serde_json::Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return serde_json::Value::from(f);
    }
    match raw {
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => serde_json::Value::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step_with_typed_args() {
        let step = parse_step("moving_average:column=value,window=3").unwrap();
        assert_eq!(step.name, "moving_average");
        assert_eq!(
            step.params,
            serde_json::json!({ "column": "value", "window": 3 })
        );
    }

    #[test]
    fn test_parse_step_with_list_arg() {
        let step = parse_step("normalize:columns=price|volume").unwrap();
        assert_eq!(
            step.params,
            serde_json::json!({ "columns": ["price", "volume"] })
        );
    }

    #[test]
    fn test_parse_step_without_args() {
        let step = parse_step("normalize").unwrap();
        assert_eq!(step.name, "normalize");
        assert_eq!(step.params, serde_json::json!({}));
    }

    #[test]
    fn test_parse_literal_kinds() {
        assert_eq!(parse_literal("3"), serde_json::json!(3));
        assert_eq!(parse_literal("2.5"), serde_json::json!(2.5));
        assert_eq!(parse_literal("true"), serde_json::json!(true));
        assert_eq!(parse_literal("value"), serde_json::json!("value"));
    }

    #[test]
    fn test_malformed_step_rejected() {
        assert!(parse_step("normalize:columns").is_err());
        assert!(parse_step(":columns=a").is_err());
    }

    #[test]
    fn test_transform_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("nested/out.csv");
        std::fs::write(&input, "value\n10\n20\n30\n").unwrap();

        run(
            input.to_str().unwrap(),
            Some(output.to_str().unwrap()),
            &["normalize:columns=value".to_string()],
        )
        .unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, "value\n0\n0.5\n1\n");
    }
}
