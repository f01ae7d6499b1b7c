//! Dashboard page
//!
//! Server-rendered list of cached error records with client-side search and
//! buttons for the analytics endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt::Write;
use std::sync::Arc;

use crate::AppState;
use crate::embedded::DashboardAssets;
use crate::models::ErrorRecord;
use crate::utils::{StringExt, escape_html};

const TEMPLATE_NAME: &str = "dashboard.html";
const ERROR_PREVIEW_CHARS: usize = 80;

/// Render the dashboard
/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let mut history = state.history_service.list_history().await;
    // newest first; store order carries no meaning
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    match render_dashboard(&history) {
        Some(page) => Html(page).into_response(),
        None => {
            tracing::error!("Dashboard template '{}' is missing", TEMPLATE_NAME);
            (StatusCode::INTERNAL_SERVER_ERROR, "Dashboard template unavailable").into_response()
        },
    }
}

pub fn render_dashboard(history: &[ErrorRecord]) -> Option<String> {
    let template = DashboardAssets::template(TEMPLATE_NAME)?;

    let mut entries = String::new();
    for (index, record) in history.iter().enumerate() {
        render_entry(&mut entries, index + 1, record);
    }

    Some(
        template
            .replace("{{RECORD_COUNT}}", &history.len().to_string())
            .replace("{{RECORDS}}", &entries),
    )
}

fn render_entry(out: &mut String, index: usize, record: &ErrorRecord) {
    let error = escape_html(&record.error);
    let preview = escape_html(&record.error.truncate_chars(ERROR_PREVIEW_CHARS));
    let solution = escape_html(&record.solution);
    let timestamp = record.timestamp.to_rfc3339();

    // writing into a String cannot fail
    let _ = write!(
        out,
        r##"        <div class="accordion-item" data-error="{error}">
            <h2 class="accordion-header" id="heading{index}">
                <button class="accordion-button collapsed" type="button" data-bs-toggle="collapse" data-bs-target="#collapse{index}" aria-expanded="false" aria-controls="collapse{index}">
                    <span class="error-message">{preview}</span>
                    <span class="timestamp">Timestamp: {timestamp}</span>
                </button>
            </h2>
            <div id="collapse{index}" class="accordion-collapse collapse" aria-labelledby="heading{index}" data-bs-parent="#errorAccordion">
                <div class="accordion-body">
                    <p class="solution-message">{solution}</p>
                    <button class="btn btn-sm btn-outline-secondary" onclick="summarizeError(this)">Summarize</button>
                </div>
            </div>
        </div>
"##
    );
}
