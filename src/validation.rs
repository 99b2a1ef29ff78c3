use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::FeedbackError;
use crate::models::{Feedback, FeedbackReason, FeedbackValue};

/// A raw feedback submission as it arrives over the wire. Field names
/// match the original client payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub meeting_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub value: String,
    pub reason: Option<String>,
    pub comment: Option<String>,
}

pub struct FeedbackValidator {
    max_comment_length: usize,
}

impl Default for FeedbackValidator {
    fn default() -> Self {
        Self {
            max_comment_length: 2000,
        }
    }
}

impl FeedbackValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks a raw submission and, when acceptable, produces a normalized
    /// `Feedback` record stamped at `now` with a fresh id. Meeting existence
    /// is checked by the caller against its store; everything here is
    /// shape and consistency.
    pub fn validate(
        &self,
        request: &FeedbackRequest,
        now: DateTime<Utc>,
    ) -> Result<Feedback, FeedbackError> {
        if request.meeting_id.trim().is_empty() {
            return Err(FeedbackError::Validation(
                "Missing required field: meetingId".to_string(),
            ));
        }

        if request.user_id.trim().is_empty() {
            return Err(FeedbackError::Validation(
                "Missing required field: userId".to_string(),
            ));
        }

        if request.value.trim().is_empty() {
            return Err(FeedbackError::Validation(
                "Missing required field: value".to_string(),
            ));
        }

        let value = FeedbackValue::parse(&request.value).ok_or_else(|| {
            FeedbackError::Validation(format!("Invalid feedback value: {}", request.value))
        })?;

        let reason = self.validate_reason(value, request.reason.as_deref())?;
        let comment = self.normalize_comment(request.comment.as_deref())?;

        Ok(Feedback {
            id: Uuid::new_v4(),
            meeting_id: request.meeting_id.trim().to_string(),
            user_id: request.user_id.trim().to_string(),
            value,
            reason,
            comment,
            submitted_at: now,
        })
    }

    fn validate_reason(
        &self,
        value: FeedbackValue,
        reason: Option<&str>,
    ) -> Result<Option<FeedbackReason>, FeedbackError> {
        let Some(raw) = reason else {
            return Ok(None);
        };

        let reason = FeedbackReason::parse(raw)
            .ok_or_else(|| FeedbackError::Validation(format!("Unknown reason: {}", raw)))?;

        if !value.valid_reasons().contains(&reason) {
            return Err(FeedbackError::Validation(format!(
                "Reason '{}' is not valid for value '{}'",
                reason.as_str(),
                value.as_str()
            )));
        }

        Ok(Some(reason))
    }

    /// Trims the comment and drops it entirely when blank. Oversized
    /// comments are rejected rather than truncated.
    fn normalize_comment(
        &self,
        comment: Option<&str>,
    ) -> Result<Option<String>, FeedbackError> {
        let Some(raw) = comment else {
            return Ok(None);
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        if trimmed.len() > self.max_comment_length {
            return Err(FeedbackError::Validation(format!(
                "Comment exceeds maximum length of {} characters",
                self.max_comment_length
            )));
        }

        Ok(Some(trimmed.to_string()))
    }
}
