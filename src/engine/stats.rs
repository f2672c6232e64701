use chrono::{Local, TimeZone};

use crate::session::record::StudySession;

pub const TOP_TOPICS: usize = 5;
pub const RECENT_SESSIONS: usize = 30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicMinutes {
    pub topic: String,
    pub seconds: u64,
    pub minutes: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayMinutes {
    /// `DD/MM`
    pub label: String,
    pub minutes: u64,
}

/// Headline numbers for the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_minutes: u64,
    pub sessions: usize,
    pub quizzes: usize,
}

pub fn summary(sessions: &[StudySession]) -> Summary {
    let total: u64 = sessions.iter().map(|s| s.duration_seconds).sum();
    Summary {
        total_minutes: total / 60,
        sessions: sessions.len(),
        quizzes: sessions.iter().filter(|s| s.quiz_result.is_some()).count(),
    }
}

/// Study time per topic, the [`TOP_TOPICS`] largest by seconds. Equal totals
/// keep the order in which the topics first appear.
pub fn topic_minutes(sessions: &[StudySession]) -> Vec<TopicMinutes> {
    let mut totals: Vec<(String, u64)> = Vec::new();
    for s in sessions {
        match totals.iter_mut().find(|(t, _)| *t == s.topic) {
            Some((_, secs)) => *secs += s.duration_seconds,
            None => totals.push((s.topic.clone(), s.duration_seconds)),
        }
    }
    // Stable sort keeps first-appearance order for ties.
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
        .into_iter()
        .take(TOP_TOPICS)
        .map(|(topic, seconds)| TopicMinutes {
            topic,
            seconds,
            minutes: seconds / 60,
        })
        .collect()
}

/// Minutes per local calendar day over the last [`RECENT_SESSIONS`] sessions.
pub fn daily_minutes(sessions: &[StudySession]) -> Vec<DayMinutes> {
    daily_minutes_in(sessions, &Local)
}

/// [`daily_minutes`] with days cut in the given time zone.
pub fn daily_minutes_in<Tz: TimeZone>(sessions: &[StudySession], tz: &Tz) -> Vec<DayMinutes>
where
    Tz::Offset: std::fmt::Display,
{
    let recent = &sessions[sessions.len().saturating_sub(RECENT_SESSIONS)..];
    let mut days: Vec<(String, u64)> = Vec::new();
    for s in recent {
        let label = s.start_time.with_timezone(tz).format("%d/%m").to_string();
        match days.iter_mut().find(|(d, _)| *d == label) {
            Some((_, secs)) => *secs += s.duration_seconds,
            None => days.push((label, s.duration_seconds)),
        }
    }
    days.into_iter()
        .map(|(label, secs)| DayMinutes {
            label,
            minutes: (secs as f64 / 60.0).round() as u64,
        })
        .collect()
}

/// `N min S s`
pub fn format_duration(seconds: u64) -> String {
    format!("{} min {} s", seconds / 60, seconds % 60)
}
