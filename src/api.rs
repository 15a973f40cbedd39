//! REST API server for the market query agent
//!
//! One stateless endpoint: a question in, an answer out. Every response,
//! including failures, carries an `{ "answer": ... }` body.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::agent::ReasoningAgent;
use crate::error::{AgentError, Result};
use crate::extractor::FALLBACK_ANSWER;
use crate::models::Query;

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub answer: String,
}

impl QueryResponse {
    fn retry() -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<ReasoningAgent>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Query Endpoint
/// =============================

/// Validates the request body into a non-blank query.
fn parse_request(
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Query> {
    let Json(req) =
        payload.map_err(|rejection| AgentError::InvalidRequest(rejection.body_text()))?;

    let query = Query::new(req.query);
    if query.is_blank() {
        return Err(AgentError::InvalidRequest("query is empty".to_string()));
    }
    Ok(query)
}

async fn handle_query(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> (StatusCode, Json<QueryResponse>) {
    let query = match parse_request(payload) {
        Ok(query) => query,
        Err(e) => {
            warn!(error = %e, "Rejected query request");
            return (StatusCode::BAD_REQUEST, Json(QueryResponse::retry()));
        }
    };

    info!("Received query: {}", query);

    match state.agent.run(&query).await {
        Ok(run) => {
            info!(
                steps = run.trace.len(),
                aborted = run.outcome.is_aborted(),
                execution_time_ms = run.execution_time_ms,
                "Query answered"
            );
            (
                StatusCode::OK,
                Json(QueryResponse {
                    answer: run.outcome.into_answer(),
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "Query failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(QueryResponse::retry()))
        }
    }
}

/// Panics anywhere below the router still produce a well-formed body.
fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Request handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(QueryResponse::retry())).into_response()
}

/// =============================
/// Router
/// =============================

pub fn create_router(agent: Arc<ReasoningAgent>) -> Router {
    let state = ApiState { agent };

    Router::new()
        .route("/health", get(health))
        .route("/api/query", post(handle_query))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    agent: Arc<ReasoningAgent>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(agent);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
