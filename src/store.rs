//! Storage ports for meetings and feedback.
//!
//! The core never talks to a database directly; it is handed these traits
//! so a durable backend can replace the in-memory maps without touching
//! the lifecycle logic.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Feedback, Meeting};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn get_meeting(&self, id: &str) -> StoreResult<Option<Meeting>>;
    async fn all_meetings(&self) -> StoreResult<Vec<Meeting>>;
    async fn meetings_for_team(&self, team_id: &str) -> StoreResult<Vec<Meeting>>;
    async fn insert_meeting(&self, meeting: Meeting) -> StoreResult<()>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Stores a feedback record. One record per (meeting, user) pair; a
    /// resubmission replaces the earlier vote.
    async fn upsert_feedback(&self, feedback: Feedback) -> StoreResult<()>;
    async fn all_feedback(&self) -> StoreResult<Vec<Feedback>>;
    async fn feedback_for_meeting(&self, meeting_id: &str) -> StoreResult<Vec<Feedback>>;
}

#[derive(Clone, Default)]
pub struct InMemoryMeetingStore {
    meetings: Arc<RwLock<HashMap<String, Meeting>>>,
}

impl InMemoryMeetingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeetingStore for InMemoryMeetingStore {
    async fn get_meeting(&self, id: &str) -> StoreResult<Option<Meeting>> {
        Ok(self.meetings.read().await.get(id).cloned())
    }

    async fn all_meetings(&self) -> StoreResult<Vec<Meeting>> {
        let mut meetings: Vec<Meeting> = self.meetings.read().await.values().cloned().collect();
        meetings.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(meetings)
    }

    async fn meetings_for_team(&self, team_id: &str) -> StoreResult<Vec<Meeting>> {
        let mut meetings: Vec<Meeting> = self
            .meetings
            .read()
            .await
            .values()
            .filter(|m| m.team_id.as_deref() == Some(team_id))
            .cloned()
            .collect();
        meetings.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(meetings)
    }

    async fn insert_meeting(&self, meeting: Meeting) -> StoreResult<()> {
        self.meetings.write().await.insert(meeting.id.clone(), meeting);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryFeedbackStore {
    feedback: Arc<RwLock<HashMap<(String, String), Feedback>>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn upsert_feedback(&self, feedback: Feedback) -> StoreResult<()> {
        let key = (feedback.meeting_id.clone(), feedback.user_id.clone());
        self.feedback.write().await.insert(key, feedback);
        Ok(())
    }

    async fn all_feedback(&self) -> StoreResult<Vec<Feedback>> {
        let mut feedback: Vec<Feedback> = self.feedback.read().await.values().cloned().collect();
        feedback.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(feedback)
    }

    async fn feedback_for_meeting(&self, meeting_id: &str) -> StoreResult<Vec<Feedback>> {
        let mut feedback: Vec<Feedback> = self
            .feedback
            .read()
            .await
            .values()
            .filter(|f| f.meeting_id == meeting_id)
            .cloned()
            .collect();
        feedback.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(feedback)
    }
}

/// Seeds a pair of recently ended meetings so the demo works without a
/// calendar integration. Mirrors what the calendar poller would deliver.
pub async fn seed_demo_meetings(store: &dyn MeetingStore, now: DateTime<Utc>) -> StoreResult<()> {
    let product_sync = Meeting::new(
        "meeting-1".to_string(),
        "calendar-event-1".to_string(),
        "Product Sync".to_string(),
        now - Duration::minutes(90),
        now - Duration::minutes(60),
        5,
        Some("product-sync-weekly".to_string()),
        "pm@company.com".to_string(),
        Some("team-product".to_string()),
        Some("dept-product".to_string()),
    )
    .map_err(|e| StoreError::Backend(e.to_string()))?;

    let standup = Meeting::new(
        "meeting-2".to_string(),
        "calendar-event-2".to_string(),
        "Engineering Standup".to_string(),
        now - Duration::minutes(75),
        now - Duration::minutes(60),
        12,
        Some("eng-standup-daily".to_string()),
        "eng-lead@company.com".to_string(),
        Some("team-eng".to_string()),
        Some("dept-eng".to_string()),
    )
    .map_err(|e| StoreError::Backend(e.to_string()))?;

    store.insert_meeting(product_sync).await?;
    store.insert_meeting(standup).await?;
    Ok(())
}
