use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod aggregation;
mod auth;
mod eligibility;
mod error;
mod handlers;
mod models;
mod store;
mod validation;

use auth::{InMemoryTokenStore, MagicLinkService, TokenStore};
use store::{FeedbackStore, InMemoryFeedbackStore, InMemoryMeetingStore, MeetingStore};
use validation::FeedbackValidator;

#[derive(Clone)]
pub struct AppState {
    pub meetings: Arc<dyn MeetingStore>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub magic_links: Arc<MagicLinkService>,
    pub validator: Arc<FeedbackValidator>,
    pub feedback_window: chrono::Duration,
    pub prompt_ttl: chrono::Duration,
    pub dev_mode: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meeting_pulse=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url = env::var("BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .parse::<Url>()?;

    let feedback_window_minutes = env::var("FEEDBACK_WINDOW_MINUTES")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(120);
    let prompt_ttl_minutes = env::var("PROMPT_TTL_MINUTES")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(30);
    let dev_mode = env::var("ENVIRONMENT")
        .map(|v| v != "production")
        .unwrap_or(true);
    let demo_mode = env::var("DEMO_MODE")
        .map(|v| v != "false")
        .unwrap_or(true);

    let token_store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let meetings: Arc<dyn MeetingStore> = Arc::new(InMemoryMeetingStore::new());
    let feedback: Arc<dyn FeedbackStore> = Arc::new(InMemoryFeedbackStore::new());

    if demo_mode {
        store::seed_demo_meetings(meetings.as_ref(), chrono::Utc::now()).await?;
        info!("Seeded demo meetings (set DEMO_MODE=false to disable)");
    }

    let state = AppState {
        meetings,
        feedback,
        magic_links: Arc::new(MagicLinkService::new(token_store.clone(), base_url)),
        validator: Arc::new(FeedbackValidator::new()),
        feedback_window: chrono::Duration::minutes(feedback_window_minutes),
        prompt_ttl: chrono::Duration::minutes(prompt_ttl_minutes),
        dev_mode,
    };

    tokio::spawn(auth::start_cleanup_task(token_store));

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/magic-link", post(handlers::auth::send_magic_link))
        .route("/api/auth/verify", get(handlers::auth::verify_magic_link))
        .route("/api/calendar/meetings", get(handlers::calendar::pending_meetings))
        .route(
            "/api/feedback",
            post(handlers::feedback::submit_feedback).get(handlers::feedback::list_feedback),
        )
        .route("/api/insights", get(handlers::insights::team_insights))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[instrument]
async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "meeting-pulse",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
