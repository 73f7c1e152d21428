//! REST API Server for the financial AI gateway
//!
//! Exposes the master agent via HTTP endpoints

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::{get, post}, Json, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agent::MasterAgent;
use crate::error::AdvisorError;
use crate::models::{
    ChatRequest, ChatResponse, ExpenditureEntry, FullAnalysisRequest, InsightRequest,
};
use crate::Result;

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<MasterAgent>,
}

/// =============================
/// Info & Health Endpoints
/// =============================

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Financial AI System API" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(req) = payload?;

    if req.message.trim().is_empty() {
        return Err(AdvisorError::InvalidRequest("message must not be empty".into()));
    }

    info!("Received chat request ({} chars)", req.message.len());

    Ok(Json(state.agent.process(&req).await))
}

/// =============================
/// Expenditure Endpoints
/// =============================

async fn analyze_expenditure(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<Vec<ExpenditureEntry>>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(entries) = payload?;
    require_entries(&entries)?;

    info!("Received expenditure analysis request: {} entries", entries.len());

    let req = ChatRequest::new("Analyze my spending data").with_expenditures(entries);
    Ok(Json(state.agent.process(&req).await))
}

async fn generate_insights(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<InsightRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(req) = payload?;

    info!("Received insights request");

    Ok(Json(
        state
            .agent
            .insights_for(&req.analysis_data, &req.user_context)
            .await,
    ))
}

async fn full_analysis(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<FullAnalysisRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(req) = payload?;
    require_entries(&req.entries)?;

    info!("Received full analysis request: {} entries", req.entries.len());

    let chat = ChatRequest::new("Analyze my spending and provide insights")
        .with_context(req.user_context)
        .with_expenditures(req.entries);
    Ok(Json(state.agent.process(&chat).await))
}

fn require_entries(entries: &[ExpenditureEntry]) -> Result<()> {
    if entries.is_empty() {
        return Err(AdvisorError::InvalidRequest(
            "No expenditure entries provided".into(),
        ));
    }
    Ok(())
}

/// =============================
/// Router
/// =============================

pub fn create_router(agent: Arc<MasterAgent>) -> Router {
    let state = ApiState { agent };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", post(chat_handler))
        .route("/analyze-expenditure", post(analyze_expenditure))
        .route("/generate-insights", post(generate_insights))
        .route("/full-analysis", post(full_analysis))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(agent: Arc<MasterAgent>, addr: &str) -> Result<()> {
    let router = create_router(agent);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
