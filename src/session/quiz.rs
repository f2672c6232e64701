use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::session::record::{QuizResult, StudySession};

pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

impl QuizQuestion {
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == OPTIONS_PER_QUESTION
            && self.correct_answer_index < OPTIONS_PER_QUESTION
    }
}

/// The single quiz lookup issued when a flow begins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizRequest {
    pub session_id: String,
    pub topic: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizStep {
    /// Nothing answered yet on this question, or the flow is not answering.
    Ignored,
    Next,
    Finished(QuizResult),
}

/// Quiz over one finished study session. Owns the session until it is
/// archived with its result.
pub struct QuizFlow {
    session: StudySession,
    questions: Vec<QuizQuestion>,
    loaded: bool,
    current: usize,
    score: usize,
    selected: Option<usize>,
    result: Option<QuizResult>,
}

impl QuizFlow {
    pub fn begin(session: StudySession) -> (Self, QuizRequest) {
        let request = QuizRequest {
            session_id: session.id.clone(),
            topic: session.topic.clone(),
        };
        let flow = Self {
            session,
            questions: Vec::new(),
            loaded: false,
            current: 0,
            score: 0,
            selected: None,
            result: None,
        };
        (flow, request)
    }

    pub fn session(&self) -> &StudySession {
        &self.session
    }

    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    /// Loaded, but the provider had nothing to ask.
    pub fn is_empty(&self) -> bool {
        self.loaded && self.questions.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if !self.loaded || self.is_finished() {
            return None;
        }
        self.questions.get(self.current)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    /// The locked-in answer for the current question, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    /// Accept the quiz for this flow's session. Only the first answer counts.
    pub fn questions_loaded(&mut self, session_id: &str, questions: Vec<QuizQuestion>) -> bool {
        if self.loaded || session_id != self.session.id {
            return false;
        }
        self.questions = questions;
        self.loaded = true;
        true
    }

    /// Lock in an answer for the current question. Returns whether it was
    /// correct, or `None` when the selection is ignored (already answered,
    /// out of range, nothing to answer).
    pub fn select(&mut self, option: usize) -> Option<bool> {
        if self.selected.is_some() {
            return None;
        }
        let question = self.current_question()?;
        if option >= question.options.len() {
            return None;
        }
        let correct = option == question.correct_answer_index;
        self.selected = Some(option);
        if correct {
            self.score += 1;
        }
        Some(correct)
    }

    /// Move past the answered question; past the last one the quiz finalizes.
    pub fn advance(&mut self) -> QuizStep {
        if self.selected.is_none() || self.current_question().is_none() {
            return QuizStep::Ignored;
        }
        if self.is_last_question() {
            return QuizStep::Finished(self.finalize());
        }
        self.current += 1;
        self.selected = None;
        QuizStep::Next
    }

    /// Way out when the provider returned no questions: finalizes with 0/0.
    pub fn exit_empty(&mut self) -> Option<QuizResult> {
        if !self.is_empty() || self.is_finished() {
            return None;
        }
        Some(self.finalize())
    }

    /// The session with its result attached, once the quiz is finished.
    pub fn into_archived(self) -> Option<StudySession> {
        let result = self.result?;
        let mut session = self.session;
        session.attach_quiz_result(result);
        Some(session)
    }

    fn finalize(&mut self) -> QuizResult {
        let result = QuizResult {
            topic: self.session.topic.clone(),
            score: self.score.min(self.questions.len()),
            total_questions: self.questions.len(),
            date: Utc::now(),
        };
        self.result = Some(result.clone());
        result
    }
}
