use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AggregationInputError;

/// The three-way verdict a user gives a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackValue {
    WorthIt,
    Async,
    Waste,
}

impl FeedbackValue {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "worth_it" => Some(FeedbackValue::WorthIt),
            "async" => Some(FeedbackValue::Async),
            "waste" => Some(FeedbackValue::Waste),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackValue::WorthIt => "worth_it",
            FeedbackValue::Async => "async",
            FeedbackValue::Waste => "waste",
        }
    }

    /// The refinement reasons that may accompany this value. "Worth it"
    /// stands on its own and accepts no reason.
    pub fn valid_reasons(&self) -> &'static [FeedbackReason] {
        match self {
            FeedbackValue::WorthIt => &[],
            FeedbackValue::Async => &[
                FeedbackReason::CouldBeEmail,
                FeedbackReason::NoAgenda,
                FeedbackReason::WrongPeople,
                FeedbackReason::TooLong,
            ],
            FeedbackValue::Waste => &[
                FeedbackReason::NoAgenda,
                FeedbackReason::WrongPeople,
                FeedbackReason::TooLong,
                FeedbackReason::Other,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackReason {
    TooLong,
    NoAgenda,
    WrongPeople,
    CouldBeEmail,
    Productive,
    GreatDiscussion,
    DecisionMade,
    Other,
}

impl FeedbackReason {
    pub fn parse(reason: &str) -> Option<Self> {
        match reason {
            "too_long" => Some(FeedbackReason::TooLong),
            "no_agenda" => Some(FeedbackReason::NoAgenda),
            "wrong_people" => Some(FeedbackReason::WrongPeople),
            "could_be_email" => Some(FeedbackReason::CouldBeEmail),
            "productive" => Some(FeedbackReason::Productive),
            "great_discussion" => Some(FeedbackReason::GreatDiscussion),
            "decision_made" => Some(FeedbackReason::DecisionMade),
            "other" => Some(FeedbackReason::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackReason::TooLong => "too_long",
            FeedbackReason::NoAgenda => "no_agenda",
            FeedbackReason::WrongPeople => "wrong_people",
            FeedbackReason::CouldBeEmail => "could_be_email",
            FeedbackReason::Productive => "productive",
            FeedbackReason::GreatDiscussion => "great_discussion",
            FeedbackReason::DecisionMade => "decision_made",
            FeedbackReason::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub calendar_event_id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub attendee_count: u32,
    pub is_recurring: bool,
    pub recurrence_id: Option<String>,
    pub organizer_email: String,
    pub team_id: Option<String>,
    pub department_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Meeting {
    /// Builds a meeting record, deriving the duration from the two
    /// timestamps. Inverted time ranges are rejected at ingestion.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        calendar_event_id: String,
        title: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        attendee_count: u32,
        recurrence_id: Option<String>,
        organizer_email: String,
        team_id: Option<String>,
        department_id: Option<String>,
    ) -> Result<Self, AggregationInputError> {
        if end_time <= start_time {
            return Err(AggregationInputError::InvalidTimeRange { meeting_id: id });
        }

        let duration_minutes = (end_time - start_time).num_minutes();

        Ok(Self {
            id,
            calendar_event_id,
            title,
            start_time,
            end_time,
            duration_minutes,
            attendee_count,
            is_recurring: recurrence_id.is_some(),
            recurrence_id,
            organizer_email,
            team_id,
            department_id,
            created_at: Utc::now(),
        })
    }

    pub fn has_valid_time_range(&self) -> bool {
        self.end_time > self.start_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub meeting_id: String,
    pub user_id: String,
    pub value: FeedbackValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FeedbackReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// A meeting awaiting feedback, paired with the instant the prompt stops
/// being actionable. Purely a projection over `Meeting`; never stored.
#[derive(Debug, Clone, Serialize)]
pub struct PendingFeedback {
    pub meeting: Meeting,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingStats {
    pub total_meetings: usize,
    pub total_feedback: usize,
    pub worth_it_percentage: u32,
    pub async_percentage: u32,
    pub waste_percentage: u32,
    pub avg_meeting_duration: f64,
    pub recurring_meeting_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasteReasonCount {
    pub reason: FeedbackReason,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingSuggestion {
    Keep,
    Review,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringMeetingInsight {
    pub meeting_title: String,
    pub async_votes: usize,
    pub total_votes: usize,
    pub suggestion: MeetingSuggestion,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamInsights {
    pub team_id: String,
    pub team_name: String,
    pub week_of: NaiveDate,
    pub total_meetings: usize,
    pub total_meeting_hours: f64,
    pub feedback_rate: u32,
    pub worth_it_rate: u32,
    pub async_suggestion_rate: u32,
    pub top_waste_reasons: Vec<WasteReasonCount>,
    pub worst_day: Option<String>,
    pub best_day: Option<String>,
    pub recurring_meeting_insights: Vec<RecurringMeetingInsight>,
}

/// A single-use login token bound to an email address.
#[derive(Debug, Clone)]
pub struct MagicLinkToken {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl MagicLinkToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The opaque session issued when a magic link is redeemed. Cookie
/// issuance and session persistence belong to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionCredential {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_parse_feedback_value() {
        assert_eq!(FeedbackValue::parse("worth_it"), Some(FeedbackValue::WorthIt));
        assert_eq!(FeedbackValue::parse("async"), Some(FeedbackValue::Async));
        assert_eq!(FeedbackValue::parse("waste"), Some(FeedbackValue::Waste));
        assert_eq!(FeedbackValue::parse("meh"), None);
        assert_eq!(FeedbackValue::parse(""), None);
    }

    #[test]
    fn test_valid_reason_sets() {
        assert!(FeedbackValue::WorthIt.valid_reasons().is_empty());
        assert!(FeedbackValue::Async
            .valid_reasons()
            .contains(&FeedbackReason::CouldBeEmail));
        assert!(!FeedbackValue::Waste
            .valid_reasons()
            .contains(&FeedbackReason::CouldBeEmail));
        assert!(FeedbackValue::Waste
            .valid_reasons()
            .contains(&FeedbackReason::Other));
    }

    #[test]
    fn test_meeting_derives_duration() {
        let start = Utc::now();
        let meeting = Meeting::new(
            "m1".to_string(),
            "event-1".to_string(),
            "Sync".to_string(),
            start,
            start + Duration::minutes(45),
            5,
            None,
            "organizer@company.com".to_string(),
            None,
            None,
        )
        .unwrap();

        assert_eq!(meeting.duration_minutes, 45);
        assert!(!meeting.is_recurring);
        assert!(meeting.has_valid_time_range());
    }

    #[test]
    fn test_meeting_rejects_inverted_time_range() {
        let start = Utc::now();
        let result = Meeting::new(
            "m1".to_string(),
            "event-1".to_string(),
            "Sync".to_string(),
            start,
            start - Duration::minutes(30),
            5,
            None,
            "organizer@company.com".to_string(),
            None,
            None,
        );

        assert!(matches!(
            result,
            Err(AggregationInputError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn test_magic_link_token_expiry() {
        let now = Utc::now();
        let token = MagicLinkToken {
            token: "t".to_string(),
            email: "a@b.com".to_string(),
            expires_at: now + Duration::minutes(15),
        };

        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::minutes(15)));
        assert!(token.is_expired(now + Duration::hours(1)));
    }
}
