//! Gemini `generateContent` client.
//!
//! Request building and response parsing are plain functions so they can be
//! tested without a network; only [`GeminiProvider`] needs `reqwest`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ProviderError;
use crate::session::quiz::QuizQuestion;
use crate::session::record::{Resource, dedup_resources};

pub const QUIZ_QUESTION_COUNT: usize = 5;
pub const GROUNDED_SUMMARY: &str = "Resource found via Google Search.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    generation_config: Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

fn user_prompt(text: String) -> Vec<Content> {
    vec![Content {
        parts: vec![Part { text: Some(text) }],
    }]
}

/// Search-grounded request; links come back as grounding chunks.
pub fn resources_request(topic: &str) -> GenerateRequest {
    GenerateRequest {
        contents: user_prompt(format!(
            "Find 3 high-quality, distinct web resources about \"{topic}\". For each resource, \
             provide the title, the URL, and a brief 1-sentence summary suitable for a student."
        )),
        tools: vec![json!({ "google_search": {} })],
        generation_config: json!({ "temperature": 0.7 }),
    }
}

/// JSON-mode request constrained by a response schema.
pub fn quiz_request(topic: &str) -> GenerateRequest {
    GenerateRequest {
        contents: user_prompt(format!(
            "Generate a quiz with {QUIZ_QUESTION_COUNT} multiple-choice questions about \"{topic}\". \
             Return a JSON object with a property \"questions\" which is an array of objects. \
             Each object must have: \"question\" (string), \"options\" (array of 4 strings), \
             and \"correctAnswerIndex\" (integer 0-3)."
        )),
        tools: Vec::new(),
        generation_config: json!({
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "questions": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "question": { "type": "STRING" },
                                "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                                "correctAnswerIndex": { "type": "INTEGER" }
                            },
                            "required": ["question", "options", "correctAnswerIndex"]
                        }
                    }
                }
            }
        }),
    }
}

/// Web resources cited by the first candidate, deduplicated and capped.
pub fn parse_grounding(response: &GenerateResponse) -> Vec<Resource> {
    let Some(meta) = response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
    else {
        return Vec::new();
    };
    let found = meta
        .grounding_chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| match (&web.uri, &web.title) {
            (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => Some(Resource {
                title: title.clone(),
                url: uri.clone(),
                summary: GROUNDED_SUMMARY.to_string(),
            }),
            _ => None,
        })
        .collect();
    dedup_resources(found)
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    #[serde(default)]
    questions: Option<Vec<Value>>,
}

/// Parse the quiz JSON. Questions with the wrong shape are dropped; a
/// payload whose questions are all unusable is malformed.
pub fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>, ProviderError> {
    let payload: QuizPayload = serde_json::from_str(text)?;
    let raw = payload.questions.unwrap_or_default();
    let raw_count = raw.len();
    let questions: Vec<QuizQuestion> = raw
        .into_iter()
        .filter_map(|v| serde_json::from_value::<QuizQuestion>(v).ok())
        .filter(QuizQuestion::is_well_formed)
        .collect();
    if raw_count > 0 && questions.is_empty() {
        return Err(ProviderError::Malformed(format!(
            "none of {raw_count} questions had four options and a valid answer index"
        )));
    }
    if questions.len() < raw_count {
        tracing::warn!(
            kept = questions.len(),
            dropped = raw_count - questions.len(),
            "dropped malformed quiz questions"
        );
    }
    Ok(questions)
}

#[cfg(feature = "network")]
pub use client::GeminiProvider;

#[cfg(feature = "network")]
mod client {
    use std::time::Duration;

    use super::*;
    use crate::config::Config;
    use crate::provider::{StudyProvider, fallback_quiz};

    pub struct GeminiProvider {
        client: reqwest::blocking::Client,
        base_url: String,
        model: String,
        api_key: Option<String>,
    }

    impl GeminiProvider {
        pub fn new(config: &Config) -> Result<Self, ProviderError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()?;
            let api_key = config.resolve_api_key();
            if api_key.is_none() {
                tracing::warn!("no Gemini API key configured; resources and quizzes are disabled");
            }
            Ok(Self {
                client,
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
                model: config.model.clone(),
                api_key,
            })
        }

        fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
            let key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
            let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
            let response = self
                .client
                .post(url)
                .header("x-goog-api-key", key)
                .json(request)
                .send()?;
            if !response.status().is_success() {
                return Err(ProviderError::HttpStatus(response.status().as_u16()));
            }
            Ok(response.json()?)
        }

        fn try_quiz(&self, topic: &str) -> Result<Vec<QuizQuestion>, ProviderError> {
            let response = self.generate(&quiz_request(topic))?;
            let text = response.text().ok_or(ProviderError::EmptyResponse)?;
            parse_quiz(&text)
        }
    }

    impl StudyProvider for GeminiProvider {
        fn fetch_resources(&self, topic: &str) -> Vec<Resource> {
            if self.api_key.is_none() {
                return Vec::new();
            }
            match self.generate(&resources_request(topic)) {
                Ok(response) => {
                    let resources = parse_grounding(&response);
                    tracing::info!(topic, count = resources.len(), "fetched resources");
                    resources
                }
                Err(e) => {
                    tracing::warn!(topic, error = %e, "resource lookup failed");
                    Vec::new()
                }
            }
        }

        fn fetch_quiz(&self, topic: &str) -> Vec<QuizQuestion> {
            if self.api_key.is_none() {
                return Vec::new();
            }
            match self.try_quiz(topic) {
                Ok(questions) => {
                    tracing::info!(topic, count = questions.len(), "generated quiz");
                    questions
                }
                Err(e) => {
                    tracing::warn!(topic, error = %e, "quiz generation failed, using fallback");
                    fallback_quiz(topic)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(raw: &str) -> GenerateResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_parse_grounding_dedupes_and_caps() {
        let r = response(
            r#"{"candidates":[{"groundingMetadata":{"groundingChunks":[
                {"web":{"uri":"https://a","title":"A"}},
                {"web":{"uri":"https://a","title":"A again"}},
                {"web":{"uri":"https://b"}},
                {"web":{"uri":"https://c","title":"C"}},
                {"web":{"uri":"https://d","title":"D"}},
                {"web":{"uri":"https://e","title":"E"}}
            ]}}]}"#,
        );
        let res = parse_grounding(&r);
        let urls: Vec<&str> = res.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a", "https://c", "https://d"]);
        assert_eq!(res[0].title, "A");
        assert_eq!(res[0].summary, GROUNDED_SUMMARY);
    }

    #[test]
    fn test_parse_grounding_without_metadata_is_empty() {
        assert!(parse_grounding(&response(r#"{"candidates":[]}"#)).is_empty());
        assert!(parse_grounding(&response(r#"{}"#)).is_empty());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let r = response(r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#);
        assert_eq!(r.text().as_deref(), Some("{\"a\":1}"));
        assert_eq!(response(r#"{"candidates":[{}]}"#).text(), None);
    }

    #[test]
    fn test_parse_quiz_keeps_well_formed_questions() {
        let text = r#"{"questions":[
            {"question":"q1","options":["a","b","c","d"],"correctAnswerIndex":2},
            {"question":"q2","options":["a","b"],"correctAnswerIndex":0},
            {"question":"q3","options":["a","b","c","d"],"correctAnswerIndex":7},
            {"question":"q4","options":["a","b","c","d"],"correctAnswerIndex":-1},
            {"question":"q5","options":["a","b","c","d"],"correctAnswerIndex":0}
        ]}"#;
        let qs = parse_quiz(text).unwrap();
        let names: Vec<&str> = qs.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(names, vec!["q1", "q5"]);
    }

    #[test]
    fn test_parse_quiz_empty_list_is_not_an_error() {
        assert!(parse_quiz(r#"{"questions":[]}"#).unwrap().is_empty());
        assert!(parse_quiz(r#"{}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_quiz_all_invalid_is_malformed() {
        let text = r#"{"questions":[{"question":"q","options":[],"correctAnswerIndex":0}]}"#;
        assert!(matches!(parse_quiz(text), Err(ProviderError::Malformed(_))));
        assert!(matches!(parse_quiz("not json"), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_requests_serialize_expected_shape() {
        let res = serde_json::to_value(resources_request("Rust")).unwrap();
        assert!(res["tools"][0].get("google_search").is_some());
        assert!(
            res["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("\"Rust\"")
        );

        let quiz = serde_json::to_value(quiz_request("Rust")).unwrap();
        assert!(quiz.get("tools").is_none());
        assert_eq!(
            quiz["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }
}
