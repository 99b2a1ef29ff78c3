use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, instrument, warn};

use crate::eligibility::pending_feedback;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub email: Option<String>,
}

/// Meetings that recently ended and still have an actionable feedback
/// prompt. The calendar integration itself is external; this reads
/// whatever snapshot the meeting store holds.
#[instrument(skip(state, query))]
pub async fn pending_meetings(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let email = query.email.unwrap_or_default();
    if email.trim().is_empty() {
        warn!("Pending meetings requested without an email");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Email parameter required" })),
        ));
    }

    let meetings = state.meetings.all_meetings().await.map_err(|e| {
        error!("Failed to load meetings: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch meetings" })),
        )
    })?;

    let pending = pending_feedback(
        &meetings,
        Utc::now(),
        state.feedback_window,
        state.prompt_ttl,
    );

    let count = pending.len();
    Ok(Json(json!({
        "meetings": pending,
        "count": count,
    })))
}
