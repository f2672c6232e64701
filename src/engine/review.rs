use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::session::record::StudySession;

const CALENDAR_TEMPLATE_URL: &str = "https://calendar.google.com/calendar/render";

/// Google Calendar link for a one-hour review block starting one day
/// after `now`.
pub fn review_url(session: &StudySession, now: DateTime<Utc>) -> Option<Url> {
    let start = now + Duration::days(1);
    let end = start + Duration::hours(1);
    let dates = format!("{}/{}", calendar_stamp(start), calendar_stamp(end));
    let score = session.quiz_result.as_ref().map_or(0, |r| r.score);
    let title = format!("Review: {}", session.topic);
    let details = format!(
        "Review materials about {}. Previous score: {score}",
        session.topic
    );
    Url::parse_with_params(
        CALENDAR_TEMPLATE_URL,
        &[
            ("action", "TEMPLATE"),
            ("text", title.as_str()),
            ("dates", dates.as_str()),
            ("details", details.as_str()),
        ],
    )
    .ok()
}

/// `YYYYMMDDTHHMMSSZ`
pub fn calendar_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}
