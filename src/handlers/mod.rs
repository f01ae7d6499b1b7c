pub mod analytics;
pub mod dashboard;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(analytics::summarize_error, analytics::predict_trends),
    components(schemas(
        analytics::SummarizeErrorRequest,
        analytics::SummaryResponse,
        analytics::TrendAnalysisResponse,
        analytics::AnalyticsErrorBody,
    )),
    tags((name = "Analytics", description = "On-demand error analytics"))
)]
pub struct ApiDoc;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let app_routes = Router::new()
        .route("/", get(dashboard::index))
        .route("/api/summarize-error", post(analytics::summarize_error))
        .route("/api/predict-trends", get(analytics::predict_trends))
        .with_state(state);

    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check));

    Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(app_routes)
        .merge(health_routes)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn ready_check() -> &'static str {
    "READY"
}
