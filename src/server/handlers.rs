use super::types::{AnalyzeForm, ErrorResponse, HealthResponse};
use crate::analysis::{AnalysisRequest, EMPTY_REQUEST_ERROR, FraudAnalyzer};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub const SERVICE_NAME: &str = "fraud-lens";
pub const ANALYSIS_STATUS_HEADER: &str = "x-analysis-status";

const INDEX_HTML: &str = include_str!("../../templates/index.html");

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<FraudAnalyzer>,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

pub async fn analyze(
    State(state): State<AppState>,
    Form(form): Form<AnalyzeForm>,
) -> Result<([(&'static str, &'static str); 1], Json<Value>), (StatusCode, Json<ErrorResponse>)> {
    let request = AnalysisRequest::new(form.message, form.url).map_err(|e| {
        warn!("Rejected analysis request: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: EMPTY_REQUEST_ERROR.to_string(),
            }),
        )
    })?;

    info!(
        "Received analysis request (message: {}, url: {})",
        request.message().is_some(),
        request.url().is_some()
    );

    let outcome = state.analyzer.analyze(&request).await;

    info!(
        "Analysis {} finished with status {} using {} template",
        outcome.request_id, outcome.status, outcome.template
    );

    Ok((
        [(ANALYSIS_STATUS_HEADER, outcome.status.as_str())],
        Json(outcome.result),
    ))
}
