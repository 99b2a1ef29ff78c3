use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MagicLinkRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MagicLinkResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic_link: Option<String>,
}

#[instrument(skip(state, payload))]
pub async fn send_magic_link(
    State(state): State<AppState>,
    Json(payload): Json<MagicLinkRequest>,
) -> Result<Json<MagicLinkResponse>, (StatusCode, Json<Value>)> {
    let link = state
        .magic_links
        .issue(&payload.email, Utc::now())
        .await
        .map_err(|e| {
            warn!("Rejected magic link request: {}", e);
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
        })?;

    // Email delivery is an external collaborator; log the link so a
    // developer can follow it from the console.
    info!(
        "Magic link for {}: {} (expires {})",
        link.email, link.link_url, link.expires_at
    );

    Ok(Json(MagicLinkResponse {
        success: true,
        message: "Magic link sent to your email".to_string(),
        // Only expose the link outside the email channel in development.
        magic_link: state.dev_mode.then(|| link.link_url.to_string()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

#[instrument(skip(state, query))]
pub async fn verify_magic_link(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let Some(token) = query.token else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Token required" })),
        )
            .into_response();
    };

    match state.magic_links.verify(&token, Utc::now()).await {
        Ok(session) => {
            let max_age = (session.expires_at - Utc::now()).num_seconds();
            let cookie = format!(
                "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
                session.token, max_age
            );
            info!("Session issued for {}", session.email);
            ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
        }
        Err(e) => {
            warn!("Magic link verification failed: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
