use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;

use crate::error::AggregationInputError;
use crate::models::{
    Feedback, FeedbackReason, FeedbackValue, Meeting, MeetingStats, MeetingSuggestion,
    RecurringMeetingInsight, TeamInsights, WasteReasonCount,
};

/// A recurring series is suggested for cancellation when at least this
/// share of its votes say "async", and kept when at most `KEEP_THRESHOLD`
/// of them do.
const CANCEL_THRESHOLD: f64 = 0.66;
const KEEP_THRESHOLD: f64 = 0.20;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * count as f64 / total as f64).round() as u32
}

fn count_value(feedback: &[Feedback], value: FeedbackValue) -> usize {
    feedback.iter().filter(|f| f.value == value).count()
}

fn check_population(meetings: &[Meeting]) -> Result<(), AggregationInputError> {
    for meeting in meetings {
        if !meeting.has_valid_time_range() {
            return Err(AggregationInputError::InvalidTimeRange {
                meeting_id: meeting.id.clone(),
            });
        }
    }
    Ok(())
}

/// Folds a meeting population and its feedback into point-in-time stats.
/// Deterministic and side-effect free; recomputation is the only update
/// mechanism.
pub fn compute_meeting_stats(
    meetings: &[Meeting],
    feedback: &[Feedback],
) -> Result<MeetingStats, AggregationInputError> {
    check_population(meetings)?;

    let total_meetings = meetings.len();
    let total_feedback = feedback.len();

    let avg_meeting_duration = if total_meetings == 0 {
        0.0
    } else {
        meetings.iter().map(|m| m.duration_minutes as f64).sum::<f64>() / total_meetings as f64
    };

    let recurring = meetings.iter().filter(|m| m.is_recurring).count();

    Ok(MeetingStats {
        total_meetings,
        total_feedback,
        worth_it_percentage: percentage(count_value(feedback, FeedbackValue::WorthIt), total_feedback),
        async_percentage: percentage(count_value(feedback, FeedbackValue::Async), total_feedback),
        waste_percentage: percentage(count_value(feedback, FeedbackValue::Waste), total_feedback),
        avg_meeting_duration,
        recurring_meeting_percentage: percentage(recurring, total_meetings),
    })
}

/// Computes the weekly insight report for one team. The caller supplies a
/// consistent snapshot of the team's meetings and their feedback; feedback
/// referencing meetings outside the snapshot still counts toward the value
/// buckets but is skipped by the groupings that need meeting attributes.
pub fn compute_team_insights(
    team_id: &str,
    team_name: &str,
    week_of: NaiveDate,
    meetings: &[Meeting],
    feedback: &[Feedback],
) -> Result<TeamInsights, AggregationInputError> {
    check_population(meetings)?;

    let total_meetings = meetings.len();
    let total_feedback = feedback.len();
    let total_meeting_hours =
        meetings.iter().map(|m| m.duration_minutes as f64).sum::<f64>() / 60.0;

    let by_id: HashMap<&str, &Meeting> =
        meetings.iter().map(|m| (m.id.as_str(), m)).collect();

    let (best_day, worst_day) = best_and_worst_day(&by_id, feedback);

    Ok(TeamInsights {
        team_id: team_id.to_string(),
        team_name: team_name.to_string(),
        week_of,
        total_meetings,
        total_meeting_hours,
        feedback_rate: percentage(total_feedback, total_meetings),
        worth_it_rate: percentage(count_value(feedback, FeedbackValue::WorthIt), total_feedback),
        async_suggestion_rate: percentage(count_value(feedback, FeedbackValue::Async), total_feedback),
        top_waste_reasons: top_waste_reasons(feedback),
        worst_day,
        best_day,
        recurring_meeting_insights: recurring_meeting_insights(&by_id, feedback),
    })
}

/// Ranks the reasons attached to waste feedback. Only value = waste counts
/// here; async suggestions surface through their own rate and the
/// recurring-series insights, so blending their reasons in would count
/// them twice. Percentages are taken over the reason-bearing waste rows.
fn top_waste_reasons(feedback: &[Feedback]) -> Vec<WasteReasonCount> {
    let mut counts: HashMap<FeedbackReason, usize> = HashMap::new();
    for item in feedback {
        if item.value == FeedbackValue::Waste {
            if let Some(reason) = item.reason {
                *counts.entry(reason).or_insert(0) += 1;
            }
        }
    }

    let total: usize = counts.values().sum();
    let mut ranked: Vec<WasteReasonCount> = counts
        .into_iter()
        .map(|(reason, count)| WasteReasonCount {
            reason,
            count,
            percentage: percentage(count, total),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.reason.as_str().cmp(b.reason.as_str()))
    });
    ranked
}

/// Groups feedback by the weekday its meeting started on and picks the
/// days with the highest and lowest worth-it rate. Ties resolve to the
/// earliest weekday, Monday first, so output is stable.
fn best_and_worst_day(
    by_id: &HashMap<&str, &Meeting>,
    feedback: &[Feedback],
) -> (Option<String>, Option<String>) {
    // (worth_it, total) per weekday, Monday-indexed
    let mut days = [(0usize, 0usize); 7];
    for item in feedback {
        let Some(meeting) = by_id.get(item.meeting_id.as_str()) else {
            continue;
        };
        let index = meeting.start_time.weekday().num_days_from_monday() as usize;
        if item.value == FeedbackValue::WorthIt {
            days[index].0 += 1;
        }
        days[index].1 += 1;
    }

    let mut best: Option<(Weekday, f64)> = None;
    let mut worst: Option<(Weekday, f64)> = None;
    for weekday in WEEKDAYS {
        let (worth_it, total) = days[weekday.num_days_from_monday() as usize];
        if total == 0 {
            continue;
        }
        let rate = worth_it as f64 / total as f64;
        if best.map_or(true, |(_, r)| rate > r) {
            best = Some((weekday, rate));
        }
        if worst.map_or(true, |(_, r)| rate < r) {
            worst = Some((weekday, rate));
        }
    }

    (
        best.map(|(day, _)| weekday_name(day).to_string()),
        worst.map(|(day, _)| weekday_name(day).to_string()),
    )
}

/// Per-series health for recurring meetings: how often attendees voted
/// "async" across all instances sharing a recurrence id. Series without
/// any votes are omitted; output is sorted worst first.
fn recurring_meeting_insights(
    by_id: &HashMap<&str, &Meeting>,
    feedback: &[Feedback],
) -> Vec<RecurringMeetingInsight> {
    struct SeriesVotes<'a> {
        label: &'a Meeting,
        async_votes: usize,
        total_votes: usize,
    }

    let mut series: HashMap<&str, SeriesVotes> = HashMap::new();
    for item in feedback {
        let Some(meeting) = by_id.get(item.meeting_id.as_str()).copied() else {
            continue;
        };
        let Some(recurrence_id) = meeting.recurrence_id.as_deref() else {
            continue;
        };

        let entry = series.entry(recurrence_id).or_insert(SeriesVotes {
            label: meeting,
            async_votes: 0,
            total_votes: 0,
        });
        // Label the series by its most recent instance.
        if meeting.start_time > entry.label.start_time {
            entry.label = meeting;
        }
        if item.value == FeedbackValue::Async {
            entry.async_votes += 1;
        }
        entry.total_votes += 1;
    }

    let mut insights: Vec<RecurringMeetingInsight> = series
        .into_values()
        .map(|votes| {
            let ratio = votes.async_votes as f64 / votes.total_votes as f64;
            let suggestion = if ratio >= CANCEL_THRESHOLD {
                MeetingSuggestion::Cancel
            } else if ratio <= KEEP_THRESHOLD {
                MeetingSuggestion::Keep
            } else {
                MeetingSuggestion::Review
            };
            RecurringMeetingInsight {
                meeting_title: votes.label.title.clone(),
                async_votes: votes.async_votes,
                total_votes: votes.total_votes,
                suggestion,
            }
        })
        .collect();

    // Highest async share first; integer cross-multiplication keeps the
    // ordering exact.
    insights.sort_by(|a, b| {
        (b.async_votes * a.total_votes)
            .cmp(&(a.async_votes * b.total_votes))
            .then_with(|| a.meeting_title.cmp(&b.meeting_title))
    });
    insights
}
