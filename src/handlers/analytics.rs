//! Analytics API Handlers
//!
//! On-demand completion endpoints used by the dashboard buttons.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;
use crate::services::llm::LLMError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SummarizeErrorRequest {
    /// Error text or any JSON value describing the error
    #[schema(value_type = Object)]
    pub error_details: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrendAnalysisResponse {
    pub trend_analysis: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsErrorBody {
    pub error: String,
    pub details: String,
}

/// Summarize one error
/// POST /api/summarize-error
#[utoipa::path(
    post,
    path = "/api/summarize-error",
    request_body = SummarizeErrorRequest,
    responses(
        (status = 200, description = "Generated summary", body = SummaryResponse),
        (status = 500, description = "Completion failed", body = AnalyticsErrorBody)
    ),
    tag = "Analytics"
)]
pub async fn summarize_error(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeErrorRequest>,
) -> Result<impl IntoResponse, AnalyticsApiError> {
    let summary = state
        .analytics_service
        .summarize(&req.error_details)
        .await
        .map_err(|e| AnalyticsApiError::new("Failed to generate summary", e))?;
    Ok(Json(SummaryResponse { summary }))
}

/// Predict trends across all cached errors
/// GET /api/predict-trends
#[utoipa::path(
    get,
    path = "/api/predict-trends",
    responses(
        (status = 200, description = "Trend analysis", body = TrendAnalysisResponse),
        (status = 500, description = "Completion failed", body = AnalyticsErrorBody)
    ),
    tag = "Analytics"
)]
pub async fn predict_trends(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AnalyticsApiError> {
    let trend_analysis = state
        .analytics_service
        .predict_trends()
        .await
        .map_err(|e| AnalyticsApiError::new("Failed to analyze trends", e))?;
    Ok(Json(TrendAnalysisResponse { trend_analysis }))
}

// ============================================================================
// Error Handling
// ============================================================================

pub struct AnalyticsApiError {
    message: &'static str,
    source: LLMError,
}

impl AnalyticsApiError {
    pub fn new(message: &'static str, source: LLMError) -> Self {
        Self { message, source }
    }
}

impl IntoResponse for AnalyticsApiError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Error during completion API call: {}", self.source);

        let body = Json(AnalyticsErrorBody {
            error: self.message.to_string(),
            details: self.source.to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
