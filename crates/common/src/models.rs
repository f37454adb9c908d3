//! Shared contracts: the query specification and the request models the
//! outer layers (HTTP, CLI) marshal into the core.

use crate::table::Scalar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Structural description of a request against a source, decoupled from the
/// source's native query language.
///
/// Absent `select` means "all columns present in source"; absent `where`
/// means "no filtering"; absent `limit` means "no truncation". Multiple
/// `where` entries are combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,

    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_: Option<BTreeMap<String, Scalar>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// One not-yet-instantiated pipeline step: a transform name plus its
/// parameter mapping. Resolved through the registry at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    pub name: String,
    #[serde(default = "default_params")]
    pub params: serde_json::Value,
}

impl PipelineStep {
    pub fn new(name: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

// --- HTTP request contracts ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub connector: String,
    #[serde(default = "default_params")]
    pub connector_config: serde_json::Value,
    pub query: QuerySpec,
}

/// Either inline row records, or a connector plus query to load from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<serde_json::Map<String, serde_json::Value>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,

    #[serde(default = "default_params")]
    pub connector_config: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QuerySpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRequest {
    pub input: InputSource,
    pub pipeline: Vec<PipelineStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarativeRequest {
    pub connector: String,
    #[serde(default = "default_params")]
    pub connector_config: serde_json::Value,
    pub expression: String,
}
