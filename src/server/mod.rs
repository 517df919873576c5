// SPDX-License-Identifier: MIT

//! HTTP boundary around the workflow

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::workflow::{ResearchWorkflow, RunRequest};

pub fn router(workflow: Arc<ResearchWorkflow>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/invoke", post(invoke))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(workflow)
}

pub async fn serve(
    workflow: Arc<ResearchWorkflow>,
    port: u16,
) -> Result<(), crate::error::ScholarError> {
    let app = router(workflow);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::ScholarError::other(e.to_string()))?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Run (or resume) a review and return the final state
async fn invoke(
    State(workflow): State<Arc<ResearchWorkflow>>,
    Json(request): Json<RunRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    log::info!("Invoke request for thread '{}'", request.thread_id);

    match workflow.invoke(&request).await {
        Ok(state) => {
            let body = serde_json::to_value(&state).map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
            })?;
            Ok(Json(body))
        }
        Err(e) => {
            log::error!("Run failed for thread '{}': {}", request.thread_id, e);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": e.to_string() })),
            ))
        }
    }
}
