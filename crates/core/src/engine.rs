//! The `Engine` facade: the five operations the outer layers call.
use crate::registry::{registry, Registry};
use crate::{pipeline, syntax};
use quarry_common::models::{PipelineStep, QuerySpec};
use quarry_common::table::Table;
use quarry_error::Result;

/// Bundles the process-wide registry behind the core's public operations.
/// Cheap to construct; holds no per-request state.
#[derive(Clone, Copy)]
pub struct Engine {
    registry: &'static Registry,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            registry: registry(),
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered connector names, in stable sorted order.
    pub fn connector_names(&self) -> Vec<String> {
        self.registry.connector_names()
    }

    /// Registered transform names, in stable sorted order.
    pub fn transform_names(&self) -> Vec<String> {
        self.registry.transform_names()
    }

    /// Resolve `connector`, run `spec` against it once, return the result.
    pub fn query(
        &self,
        connector: &str,
        config: &serde_json::Value,
        spec: &QuerySpec,
    ) -> Result<Table> {
        let connector = self.registry.connector(connector, config)?;
        tracing::info!(connector = connector.name(), "executing query");
        connector.query(spec)
    }

    /// Apply `steps` to `table` in order, all-or-nothing.
    pub fn run_pipeline(&self, table: Table, steps: &[PipelineStep]) -> Result<Table> {
        pipeline::run(self.registry, table, steps)
    }

    /// Parse a declarative query expression into a [`QuerySpec`].
    pub fn parse_query(&self, expression: &str) -> QuerySpec {
        syntax::parse(expression)
    }
}
