use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{error, instrument, warn};

use crate::aggregation::{compute_meeting_stats, compute_team_insights};
use crate::models::Meeting;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    pub team_id: Option<String>,
    pub team_name: Option<String>,
    pub week_of: Option<NaiveDate>,
}

fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn in_week(meeting: &Meeting, week_start: NaiveDate) -> bool {
    let day = meeting.start_time.date_naive();
    day >= week_start && day < week_start + Duration::days(7)
}

/// Weekly dashboard payload for one team: point-in-time stats plus the
/// insight report, recomputed from the snapshot on every request.
#[instrument(skip(state, query))]
pub async fn team_insights(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let team_id = query.team_id.unwrap_or_default();
    if team_id.trim().is_empty() {
        warn!("Insights requested without a team id");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "team_id parameter required" })),
        ));
    }
    let team_name = query.team_name.unwrap_or_else(|| team_id.clone());

    let week_start = start_of_week(query.week_of.unwrap_or_else(|| Utc::now().date_naive()));

    let meetings: Vec<Meeting> = state
        .meetings
        .meetings_for_team(&team_id)
        .await
        .map_err(|e| {
            error!("Failed to load meetings: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
        })?
        .into_iter()
        .filter(|m| in_week(m, week_start))
        .collect();

    let meeting_ids: HashSet<&str> = meetings.iter().map(|m| m.id.as_str()).collect();
    let feedback: Vec<_> = state
        .feedback
        .all_feedback()
        .await
        .map_err(|e| {
            error!("Failed to load feedback: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
        })?
        .into_iter()
        .filter(|f| meeting_ids.contains(f.meeting_id.as_str()))
        .collect();

    let stats = compute_meeting_stats(&meetings, &feedback).map_err(|e| {
        warn!("Malformed meeting population for team {}: {}", team_id, e);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    let insights = compute_team_insights(&team_id, &team_name, week_start, &meetings, &feedback)
        .map_err(|e| {
            warn!("Malformed meeting population for team {}: {}", team_id, e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

    Ok(Json(json!({
        "stats": stats,
        "insights": insights,
    })))
}
