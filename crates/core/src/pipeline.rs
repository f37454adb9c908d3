//! Sequential pipeline executor.
//!
//! Resolves each `(name, params)` step through the registry in list order
//! and folds the table left to right. Execution is all-or-nothing: the
//! first failing step aborts the pipeline and no partial result survives.
use crate::registry::Registry;
use quarry_common::models::PipelineStep;
use quarry_common::table::Table;
use quarry_error::Result;

pub fn run(registry: &Registry, table: Table, steps: &[PipelineStep]) -> Result<Table> {
    let mut current = table;
    for (position, step) in steps.iter().enumerate() {
        let transform = registry.transform(&step.name, &step.params)?;
        tracing::debug!(step = position, transform = %step.name, rows = current.len(), "applying pipeline step");
        current = transform.apply(&current)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_common::table::Scalar;
    use quarry_error::ErrorKind;

    fn observations() -> Table {
        Table::from_rows(
            vec!["value".into()],
            [100, 110, 105, 120, 115]
                .iter()
                .map(|v| vec![Scalar::Int(*v)])
                .collect(),
        )
    }

    fn step(name: &str, params: serde_json::Value) -> PipelineStep {
        PipelineStep::new(name, params)
    }

    #[test]
    fn test_steps_fold_in_order() {
        let registry = Registry::with_builtins();
        let out = run(
            &registry,
            observations(),
            &[
                step("normalize", serde_json::json!({ "columns": ["value"] })),
                step(
                    "moving_average",
                    serde_json::json!({ "column": "value", "window": 2 }),
                ),
            ],
        )
        .unwrap();

        // the moving average saw normalized values, so order mattered
        assert_eq!(
            out.columns(),
            &["value".to_string(), "value_ma2".to_string()]
        );
        assert_eq!(out.rows()[0][0], Scalar::Float(0.0));
        match &out.rows()[1][1] {
            Scalar::Float(v) => assert!((v - 0.25).abs() < 1e-9),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let registry = Registry::with_builtins();
        let table = observations();
        let out = run(&registry, table.clone(), &[]).unwrap();
        assert_eq!(out, table);
    }

    #[test]
    fn test_unknown_step_aborts_with_no_partial_output() {
        let registry = Registry::with_builtins();
        let result = run(
            &registry,
            observations(),
            &[
                step("normalize", serde_json::json!({ "columns": ["value"] })),
                step(
                    "moving_average",
                    serde_json::json!({ "column": "value" }),
                ),
                step("nope", serde_json::json!({})),
            ],
        );

        // total failure: callers see only the error, never the output of the
        // two completed steps
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownName);
    }

    #[test]
    fn test_invalid_params_abort_before_any_application() {
        let registry = Registry::with_builtins();
        let err = run(
            &registry,
            observations(),
            &[step("moving_average", serde_json::json!({ "window": 3 }))],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transform);
    }
}
