use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{error, info, instrument, warn};

use crate::error::FeedbackError;
use crate::store::StoreError;
use crate::validation::FeedbackRequest;
use crate::AppState;

fn storage_failure(e: StoreError) -> (StatusCode, Json<Value>) {
    error!("Storage error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
}

fn rejection(e: FeedbackError) -> (StatusCode, Json<Value>) {
    warn!("Rejected feedback submission: {}", e);
    let status = match e {
        FeedbackError::Validation(_) => StatusCode::BAD_REQUEST,
        FeedbackError::MeetingNotFound(_) => StatusCode::NOT_FOUND,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

#[instrument(skip(state, payload))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let feedback = state
        .validator
        .validate(&payload, Utc::now())
        .map_err(rejection)?;

    let meeting = state
        .meetings
        .get_meeting(&feedback.meeting_id)
        .await
        .map_err(storage_failure)?;
    if meeting.is_none() {
        return Err(rejection(FeedbackError::MeetingNotFound(
            feedback.meeting_id,
        )));
    }

    state
        .feedback
        .upsert_feedback(feedback.clone())
        .await
        .map_err(storage_failure)?;

    info!(
        "Feedback recorded for meeting {} by {}: {}",
        feedback.meeting_id,
        feedback.user_id,
        feedback.value.as_str()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "feedback": feedback,
            "message": "Feedback submitted successfully",
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackListQuery {
    pub meeting_id: Option<String>,
    pub team_id: Option<String>,
}

#[instrument(skip(state, query))]
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<FeedbackListQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let feedback = if let Some(meeting_id) = query.meeting_id.as_deref() {
        state
            .feedback
            .feedback_for_meeting(meeting_id)
            .await
            .map_err(storage_failure)?
    } else if let Some(team_id) = query.team_id.as_deref() {
        let team_meetings: HashSet<String> = state
            .meetings
            .meetings_for_team(team_id)
            .await
            .map_err(storage_failure)?
            .into_iter()
            .map(|m| m.id)
            .collect();

        state
            .feedback
            .all_feedback()
            .await
            .map_err(storage_failure)?
            .into_iter()
            .filter(|f| team_meetings.contains(&f.meeting_id))
            .collect()
    } else {
        state.feedback.all_feedback().await.map_err(storage_failure)?
    };

    let total = feedback.len();
    Ok(Json(json!({
        "feedback": feedback,
        "total": total,
    })))
}
