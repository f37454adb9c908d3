//! Process-wide name-to-factory resolution for connectors and transforms.
//!
//! The registry is populated once and never mutated afterward; reads are
//! safe without synchronization. It is the only place capability names are
//! resolved to concrete implementations, so new kinds plug in without
//! touching callers.
use std::collections::BTreeMap;
use std::sync::OnceLock;

use quarry_connectors::{sources, Connector};
use quarry_error::{find_closest_match, ErrorCode, ErrorContext, QuarryError, Result};
use quarry_transforms::Transform;

pub type ConnectorFactory = fn(&serde_json::Value) -> Result<Box<dyn Connector>>;
pub type TransformFactory = fn(&serde_json::Value) -> Result<Box<dyn Transform>>;

pub struct Registry {
    connectors: BTreeMap<&'static str, ConnectorFactory>,
    transforms: BTreeMap<&'static str, TransformFactory>,
}

impl Registry {
    pub fn with_builtins() -> Self {
        let mut connectors: BTreeMap<&'static str, ConnectorFactory> = BTreeMap::new();
        connectors.insert("local", sources::build_local);
        connectors.insert("postgres", sources::build_postgres);
        connectors.insert("clickhouse", sources::build_clickhouse);
        connectors.insert("databricks", sources::build_databricks);

        let mut transforms: BTreeMap<&'static str, TransformFactory> = BTreeMap::new();
        transforms.insert("normalize", quarry_transforms::build_normalize);
        transforms.insert("moving_average", quarry_transforms::build_moving_average);
        transforms.insert(
            "seasonal_adjustment",
            quarry_transforms::build_seasonal_adjustment,
        );

        Self {
            connectors,
            transforms,
        }
    }

    /// Construct a fresh connector instance for `name` from `config`.
    pub fn connector(&self, name: &str, config: &serde_json::Value) -> Result<Box<dyn Connector>> {
        match self.connectors.get(name) {
            Some(factory) => factory(config),
            None => Err(unknown_name(
                ErrorCode::UnknownConnector,
                "connector",
                name,
                self.connector_names(),
            )),
        }
    }

    /// Construct a fresh transform instance for `name` from `params`.
    pub fn transform(&self, name: &str, params: &serde_json::Value) -> Result<Box<dyn Transform>> {
        match self.transforms.get(name) {
            Some(factory) => factory(params),
            None => Err(unknown_name(
                ErrorCode::UnknownTransform,
                "transform",
                name,
                self.transform_names(),
            )),
        }
    }

    /// Registered connector names, sorted.
    pub fn connector_names(&self) -> Vec<String> {
        self.connectors.keys().map(|k| k.to_string()).collect()
    }

    /// Registered transform names, sorted.
    pub fn transform_names(&self) -> Vec<String> {
        self.transforms.keys().map(|k| k.to_string()).collect()
    }
}

fn unknown_name(
    code: ErrorCode,
    label: &str,
    requested: &str,
    available: Vec<String>,
) -> QuarryError {
    let mut err = QuarryError::new(code, format!("Unknown {}: {}", label, requested))
        .with_context(ErrorContext::UnknownName {
            requested: requested.to_string(),
            available: available.clone(),
        });
    if let Some(suggestion) = find_closest_match(requested, &available) {
        err = err.with_hint(format!("Did you mean '{}'?", suggestion));
    }
    err
}

/// The process-wide read-only registry, built on first use.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::with_builtins)
}
