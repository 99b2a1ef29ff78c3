use thiserror::Error;

/// Errors produced while accepting a feedback submission.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Invalid feedback submission: {0}")]
    Validation(String),
    #[error("Meeting not found: {0}")]
    MeetingNotFound(String),
}

/// Errors produced by the magic-link lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("Invalid or already used token")]
    InvalidToken,
    #[error("Token expired")]
    ExpiredToken,
}

/// A malformed meeting population handed to the aggregation engine.
///
/// Meetings with an inverted time range are rejected up front instead of
/// silently skewing duration and weekday statistics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationInputError {
    #[error("Meeting {meeting_id} ends at or before it starts")]
    InvalidTimeRange { meeting_id: String },
}
