use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of suggested resources kept for a session.
pub const MAX_RESOURCES: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    pub summary: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub topic: String,
    pub score: usize,
    pub total_questions: usize,
    pub date: DateTime<Utc>,
}

impl QuizResult {
    /// Scores above half the question count earn a celebration.
    pub fn is_celebration(&self) -> bool {
        self.total_questions > 0 && self.score * 2 > self.total_questions
    }
}

/// A finished study period. Without a quiz result it is only the hand-off
/// value between the timer and the quiz; with one it is permanent history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub topic: String,
    pub duration_seconds: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_result: Option<QuizResult>,
}

impl StudySession {
    pub fn is_archived(&self) -> bool {
        self.quiz_result.is_some()
    }

    /// Attach the quiz outcome. A session takes exactly one result; a second
    /// attachment is ignored and reported as `false`.
    pub fn attach_quiz_result(&mut self, result: QuizResult) -> bool {
        if self.quiz_result.is_some() {
            return false;
        }
        self.quiz_result = Some(result);
        true
    }
}

/// Drop resources whose URL was already seen and cap the list.
pub fn dedup_resources(resources: Vec<Resource>) -> Vec<Resource> {
    let mut out: Vec<Resource> = Vec::with_capacity(MAX_RESOURCES);
    for res in resources {
        if out.len() >= MAX_RESOURCES {
            break;
        }
        if !out.iter().any(|r| r.url == res.url) {
            out.push(res);
        }
    }
    out
}

/// `MM:SS` clock display.
pub fn format_clock(total_seconds: u64) -> String {
    let m = total_seconds / 60;
    let s = total_seconds % 60;
    format!("{m:02}:{s:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(url: &str) -> Resource {
        Resource {
            title: format!("title {url}"),
            url: url.to_string(),
            summary: String::new(),
        }
    }

    fn session() -> StudySession {
        StudySession {
            id: "s1".to_string(),
            topic: "Calculus".to_string(),
            duration_seconds: 42,
            start_time: Utc::now(),
            end_time: Utc::now(),
            resources: vec![res("https://a")],
            quiz_result: None,
        }
    }

    #[test]
    fn test_dedup_resources_by_url_and_cap() {
        let out = dedup_resources(vec![
            res("https://a"),
            res("https://a"),
            res("https://b"),
            res("https://c"),
            res("https://d"),
        ]);
        let urls: Vec<&str> = out.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a", "https://b", "https://c"]);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(3600), "60:00");
    }

    #[test]
    fn test_quiz_result_attaches_once() {
        let mut s = session();
        let first = QuizResult {
            topic: "Calculus".to_string(),
            score: 3,
            total_questions: 5,
            date: Utc::now(),
        };
        let mut second = first.clone();
        second.score = 5;

        assert!(s.attach_quiz_result(first));
        assert!(!s.attach_quiz_result(second));
        assert_eq!(s.quiz_result.as_ref().map(|r| r.score), Some(3));
        assert!(s.is_archived());
    }

    #[test]
    fn test_celebration_threshold() {
        let mut r = QuizResult {
            topic: "t".to_string(),
            score: 3,
            total_questions: 5,
            date: Utc::now(),
        };
        assert!(r.is_celebration());
        r.score = 2;
        assert!(!r.is_celebration());
        r.total_questions = 0;
        r.score = 0;
        assert!(!r.is_celebration());
    }

    #[test]
    fn test_session_json_uses_camel_case() {
        let json = serde_json::to_value(session()).unwrap();
        assert!(json.get("durationSeconds").is_some());
        assert!(json.get("startTime").is_some());
        assert!(json.get("quizResult").is_none());
    }
}
