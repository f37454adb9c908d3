use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::ApiError;
use quarry_common::models::{DeclarativeRequest, QueryRequest, TransformRequest};
use quarry_common::table::Table;
use quarry_core::Engine;

type Records = Vec<serde_json::Map<String, serde_json::Value>>;

pub fn create_router(engine: Engine) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/connectors", get(list_connectors))
        .route("/transforms", get(list_transforms))
        .route("/query", post(execute_query))
        .route("/transform", post(run_transform))
        .route("/declarative", post(declarative_query))
        .with_state(engine)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_connectors(State(engine): State<Engine>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "connectors": engine.connector_names() }))
}

async fn list_transforms(State(engine): State<Engine>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "transforms": engine.transform_names() }))
}

/// The core is synchronous and single-shot; run it off the async workers.
async fn run_core<T: Send + 'static>(
    task: impl FnOnce() -> Result<T, ApiError> + Send + 'static,
) -> Result<T, ApiError> {
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}

async fn execute_query(
    State(engine): State<Engine>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Records>, ApiError> {
    let table = run_core(move || {
        engine
            .query(&request.connector, &request.connector_config, &request.query)
            .map_err(ApiError::from)
    })
    .await?;
    Ok(Json(table.to_records()))
}

async fn run_transform(
    State(engine): State<Engine>,
    Json(request): Json<TransformRequest>,
) -> Result<Json<Records>, ApiError> {
    let table = run_core(move || {
        let input = &request.input;
        let table = if let Some(data) = &input.data {
            Table::from_records(data)
        } else {
            let (Some(connector), Some(query)) = (&input.connector, &input.query) else {
                return Err(ApiError::BadRequest(
                    "Provide input data or connector+query".to_string(),
                ));
            };
            engine
                .query(connector, &input.connector_config, query)
                .map_err(ApiError::from)?
        };
        engine
            .run_pipeline(table, &request.pipeline)
            .map_err(ApiError::from)
    })
    .await?;
    Ok(Json(table.to_records()))
}

async fn declarative_query(
    State(engine): State<Engine>,
    Json(request): Json<DeclarativeRequest>,
) -> Result<Json<Records>, ApiError> {
    let table = run_core(move || {
        let spec = engine.parse_query(&request.expression);
        engine
            .query(&request.connector, &request.connector_config, &spec)
            .map_err(ApiError::from)
    })
    .await?;
    Ok(Json(table.to_records()))
}
