use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

use crate::models::{Meeting, PendingFeedback};

/// Selects the meetings whose end time falls within `[now - window, now]`.
///
/// Meetings that have not ended yet, or ended before the window opened,
/// are excluded. Duplicate ids are dropped; input order is preserved.
pub fn eligible_meetings(
    meetings: &[Meeting],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<Meeting> {
    let window_start = now - window;
    let mut seen = HashSet::new();

    meetings
        .iter()
        .filter(|meeting| meeting.end_time >= window_start && meeting.end_time <= now)
        .filter(|meeting| seen.insert(meeting.id.clone()))
        .cloned()
        .collect()
}

/// Projects eligible meetings into feedback prompts. Each prompt expires
/// `prompt_ttl` after the meeting ended; prompts already past that instant
/// are not surfaced.
pub fn pending_feedback(
    meetings: &[Meeting],
    now: DateTime<Utc>,
    window: Duration,
    prompt_ttl: Duration,
) -> Vec<PendingFeedback> {
    eligible_meetings(meetings, now, window)
        .into_iter()
        .filter_map(|meeting| {
            let expires_at = meeting.end_time + prompt_ttl;
            if expires_at <= now {
                return None;
            }
            Some(PendingFeedback { meeting, expires_at })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting_ending_at(id: &str, end_time: DateTime<Utc>) -> Meeting {
        Meeting::new(
            id.to_string(),
            format!("event-{}", id),
            "Team Sync".to_string(),
            end_time - Duration::minutes(30),
            end_time,
            5,
            None,
            "organizer@company.com".to_string(),
            Some("team-eng".to_string()),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_excludes_meetings_outside_window() {
        let now = Utc::now();
        let meetings = vec![
            meeting_ending_at("ended-recently", now - Duration::minutes(10)),
            meeting_ending_at("too-stale", now - Duration::hours(3)),
            meeting_ending_at("not-ended", now + Duration::minutes(10)),
        ];

        let eligible = eligible_meetings(&meetings, now, Duration::hours(2));
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, "ended-recently");
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let now = Utc::now();
        let window = Duration::hours(2);
        let meetings = vec![
            meeting_ending_at("at-now", now),
            meeting_ending_at("at-window-start", now - window),
        ];

        let eligible = eligible_meetings(&meetings, now, window);
        assert_eq!(eligible.len(), 2);
    }

    #[test]
    fn test_shrinking_window_never_adds_meetings() {
        let now = Utc::now();
        let meetings: Vec<Meeting> = (0..8)
            .map(|i| meeting_ending_at(&format!("m{}", i), now - Duration::minutes(i * 20)))
            .collect();

        let wide: HashSet<String> = eligible_meetings(&meetings, now, Duration::hours(2))
            .into_iter()
            .map(|m| m.id)
            .collect();
        let narrow: HashSet<String> = eligible_meetings(&meetings, now, Duration::minutes(30))
            .into_iter()
            .map(|m| m.id)
            .collect();

        assert!(narrow.is_subset(&wide));
    }

    #[test]
    fn test_duplicate_ids_appear_once() {
        let now = Utc::now();
        let meeting = meeting_ending_at("dup", now - Duration::minutes(5));
        let meetings = vec![meeting.clone(), meeting];

        let eligible = eligible_meetings(&meetings, now, Duration::hours(2));
        assert_eq!(eligible.len(), 1);
    }

    #[test]
    fn test_pending_feedback_expiry() {
        let now = Utc::now();
        let meetings = vec![
            meeting_ending_at("fresh", now - Duration::minutes(10)),
            meeting_ending_at("prompt-expired", now - Duration::minutes(50)),
        ];

        let pending =
            pending_feedback(&meetings, now, Duration::hours(2), Duration::minutes(30));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].meeting.id, "fresh");
        assert_eq!(
            pending[0].expires_at,
            pending[0].meeting.end_time + Duration::minutes(30)
        );
    }
}
