use std::sync::Arc;

use crate::auth::credentials::{self, CredentialStore, User};
use crate::auth::form::{AuthForm, AuthMode};
use crate::config::Config;
use crate::error::{AuthError, StudyError};
use crate::event::AppEvent;
use crate::provider::StudyProvider;
use crate::router::{self, Screen, ViewState};
use crate::session::history::SessionHistory;
use crate::session::quiz::{QuizFlow, QuizStep};
use crate::session::record::QuizResult;
use crate::session::study::{ResourceRequest, StudyController};
use crate::session::timer::TickScheduler;
use crate::speech::Speaker;
use crate::store::kv::KvStore;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;
use crate::worker::TaskRunner;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
    Celebration,
    /// Stays up until the next key press, which it swallows.
    Blocking,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Capabilities the app is wired with. Production uses files, threads and
/// HTTP; tests swap in memory, manual ticks and inline tasks.
pub struct Services {
    pub store: Box<dyn KvStore>,
    pub provider: Arc<dyn StudyProvider>,
    pub scheduler: Box<dyn TickScheduler>,
    pub runner: Box<dyn TaskRunner>,
    pub speaker: Box<dyn Speaker>,
}

pub struct App {
    pub view: ViewState,
    pub user: Option<User>,
    pub history: SessionHistory,
    pub study: StudyController,
    pub quiz: Option<QuizFlow>,
    pub auth_form: AuthForm,
    pub topic_input: LineInput,
    pub notice: Option<Notice>,
    pub history_selected: usize,
    pub theme: &'static Theme,
    pub config: Config,
    pub should_quit: bool,
    store: Box<dyn KvStore>,
    provider: Arc<dyn StudyProvider>,
    runner: Box<dyn TaskRunner>,
    speaker: Box<dyn Speaker>,
}

impl App {
    pub fn new(config: Config, theme: &'static Theme, services: Services) -> Self {
        let Services {
            store,
            provider,
            scheduler,
            runner,
            speaker,
        } = services;

        let history = SessionHistory::load(&*store).unwrap_or_else(|e| {
            tracing::error!(error = %e, "could not read session history");
            SessionHistory::default()
        });
        let user = credentials::load_active_user(&*store).unwrap_or_else(|e| {
            tracing::error!(error = %e, "could not read active user");
            None
        });
        let view = if user.is_some() {
            ViewState::Hub
        } else {
            ViewState::Auth
        };
        if let Some(ref u) = user {
            tracing::info!(email = %u.email, "restored active user");
        }

        Self {
            view,
            user,
            history,
            study: StudyController::new(scheduler),
            quiz: None,
            auth_form: AuthForm::new(),
            topic_input: LineInput::new(""),
            notice: None,
            history_selected: 0,
            theme,
            config,
            should_quit: false,
            store,
            provider,
            runner,
            speaker,
        }
    }

    pub fn screen(&self) -> Screen {
        router::route(self.view, self.quiz.is_some())
    }

    pub fn store(&self) -> &dyn KvStore {
        &*self.store
    }

    // --- auth ---

    /// Validate the auth form and log in or register with it.
    pub fn submit_auth(&mut self) {
        let submission = match self.auth_form.validate() {
            Ok(s) => s,
            Err(e) => {
                self.auth_form.error = Some(e.to_string());
                return;
            }
        };
        let creds = CredentialStore::new(&*self.store);
        let outcome = match submission.mode {
            AuthMode::Login => creds.authenticate(&submission.email, &submission.password),
            AuthMode::Register => creds.register(
                &submission.name,
                &submission.email,
                &submission.password,
            ),
        };
        match outcome {
            Ok(user) => self.login(user),
            Err(e) => {
                if let AuthError::Store(ref inner) = e {
                    tracing::error!(error = %inner, "credential store failure");
                }
                self.auth_form.error = Some(e.to_string());
            }
        }
    }

    pub fn login(&mut self, user: User) {
        if let Err(e) = credentials::save_active_user(&*self.store, &user) {
            tracing::error!(error = %e, "could not persist active user");
        }
        tracing::info!(email = %user.email, "logged in");
        self.user = Some(user);
        self.auth_form.reset();
        self.notice = None;
        self.view = ViewState::Hub;
    }

    /// Forget the user and any in-progress work.
    pub fn logout(&mut self) {
        if let Err(e) = credentials::clear_active_user(&*self.store) {
            tracing::error!(error = %e, "could not clear active user");
        }
        if let Some(user) = self.user.take() {
            tracing::info!(email = %user.email, "logged out");
        }
        self.study.discard();
        self.quiz = None;
        self.topic_input.clear();
        self.notice = None;
        self.history_selected = 0;
        self.auth_form.reset();
        self.view = ViewState::Auth;
    }

    // --- navigation ---

    pub fn go_to(&mut self, view: ViewState) {
        if self.user.is_none() {
            self.view = ViewState::Auth;
            return;
        }
        if view == ViewState::KnowledgeBase {
            self.history_selected = 0;
        }
        self.view = view;
    }

    /// Cycle through the header tabs; the quiz tab joins while a quiz is open.
    pub fn next_tab(&mut self, forward: bool) {
        let mut tabs: Vec<ViewState> = ViewState::TABS.to_vec();
        if self.quiz.is_some() {
            tabs.insert(1, ViewState::Quiz);
        }
        let pos = tabs.iter().position(|v| *v == self.view).unwrap_or(0);
        let next = if forward {
            (pos + 1) % tabs.len()
        } else {
            (pos + tabs.len() - 1) % tabs.len()
        };
        self.go_to(tabs[next]);
    }

    // --- study ---

    pub fn start_study(&mut self) {
        if self.quiz.is_some() {
            self.notice = Some(Notice::new(
                NoticeKind::Info,
                "Finish the pending quiz before starting a new session.",
            ));
            return;
        }
        let topic = self.topic_input.value().to_string();
        match self.study.start(&topic) {
            Ok(Some(request)) => self.request_resources(request),
            Ok(None) => {}
            Err(e) => self.notice = Some(Notice::new(NoticeKind::Error, e.to_string())),
        }
    }

    pub fn pause_study(&mut self) {
        self.study.pause();
    }

    /// Stop the timer and hand the session to the quiz, or discard it when
    /// too short.
    pub fn stop_study(&mut self) {
        let outcome = self.study.stop();
        self.topic_input.clear();
        match outcome {
            Ok(session) => {
                let (flow, request) = QuizFlow::begin(session);
                let provider = Arc::clone(&self.provider);
                self.runner.run(Box::new(move || AppEvent::QuizLoaded {
                    questions: provider.fetch_quiz(&request.topic),
                    session_id: request.session_id,
                }));
                self.quiz = Some(flow);
                self.view = ViewState::Quiz;
            }
            Err(e @ StudyError::SessionTooShort { .. }) => {
                self.notice = Some(Notice::new(NoticeKind::Blocking, e.to_string()));
            }
            Err(e) => tracing::debug!(error = %e, "stop ignored"),
        }
    }

    fn request_resources(&mut self, request: ResourceRequest) {
        tracing::info!(topic = %request.topic, draft = request.draft, "requesting resources");
        let provider = Arc::clone(&self.provider);
        self.runner.run(Box::new(move || AppEvent::ResourcesLoaded {
            resources: provider.fetch_resources(&request.topic),
            draft: request.draft,
        }));
    }

    pub fn speak_resource(&self, index: usize) {
        if let Some(res) = self.study.resources().get(index) {
            self.speaker.speak(&format!("{}. {}", res.title, res.summary));
        }
    }

    // --- quiz ---

    pub fn select_answer(&mut self, option: usize) -> Option<bool> {
        self.quiz.as_mut()?.select(option)
    }

    pub fn advance_quiz(&mut self) {
        let Some(flow) = self.quiz.as_mut() else {
            return;
        };
        if let QuizStep::Finished(result) = flow.advance() {
            self.finish_quiz(result);
        }
    }

    /// Leave a quiz that came back without questions, recording 0/0.
    pub fn exit_empty_quiz(&mut self) {
        let Some(flow) = self.quiz.as_mut() else {
            return;
        };
        if let Some(result) = flow.exit_empty() {
            self.finish_quiz(result);
        }
    }

    pub fn speak_question(&self) {
        if let Some(q) = self.quiz.as_ref().and_then(|f| f.current_question()) {
            self.speaker.speak(&q.question);
        }
    }

    fn finish_quiz(&mut self, result: QuizResult) {
        let Some(session) = self.quiz.take().and_then(QuizFlow::into_archived) else {
            return;
        };
        tracing::info!(
            topic = %result.topic,
            score = result.score,
            total = result.total_questions,
            "quiz finished"
        );
        self.notice = Some(if let Err(e) = self.history.archive(&*self.store, session) {
            tracing::error!(error = %e, "could not persist session history");
            Notice::new(NoticeKind::Error, "Session kept, but saving history failed.")
        } else if result.is_celebration() {
            Notice::new(
                NoticeKind::Celebration,
                format!(
                    "Great job! {}/{} on {}.",
                    result.score, result.total_questions, result.topic
                ),
            )
        } else {
            Notice::new(
                NoticeKind::Info,
                format!(
                    "Quiz saved: {}/{} on {}.",
                    result.score, result.total_questions, result.topic
                ),
            )
        });
        self.view = ViewState::Dashboard;
    }

    // --- history ---

    pub fn history_up(&mut self) {
        self.history_selected = self.history_selected.saturating_sub(1);
    }

    pub fn history_down(&mut self) {
        if self.history_selected + 1 < self.history.len() {
            self.history_selected += 1;
        }
    }

    // --- events ---

    /// Apply a non-key event from the loop.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::StudyTick(timer) => {
                self.study.tick(timer);
            }
            AppEvent::ResourcesLoaded { draft, resources } => {
                if !self.study.resources_loaded(draft, resources) {
                    tracing::debug!(draft, "dropped resources for a stale draft");
                }
            }
            AppEvent::QuizLoaded {
                session_id,
                questions,
            } => {
                let accepted = self
                    .quiz
                    .as_mut()
                    .is_some_and(|flow| flow.questions_loaded(&session_id, questions));
                if !accepted {
                    tracing::debug!(%session_id, "dropped quiz for an inactive session");
                }
            }
            AppEvent::Key(_) | AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }
    }

    /// Drop any non-blocking notice; returns true if a blocking one was
    /// dismissed (the key is consumed).
    pub fn dismiss_notice(&mut self) -> bool {
        match self.notice.take() {
            Some(n) if n.kind == NoticeKind::Blocking => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, Receiver};

    use crate::provider::OfflineProvider;
    use crate::session::timer::ManualTicker;
    use crate::speech::SilentSpeaker;
    use crate::store::kv::MemoryKvStore;
    use crate::worker::InlineRunner;

    fn make_app() -> (App, ManualTicker, Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let ticker = ManualTicker::new();
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let app = App::new(
            Config::default(),
            theme,
            Services {
                store: Box::new(MemoryKvStore::new()),
                provider: Arc::new(OfflineProvider),
                scheduler: Box::new(ticker.clone()),
                runner: Box::new(InlineRunner::new(tx)),
                speaker: Box::new(SilentSpeaker),
            },
        );
        (app, ticker, rx)
    }

    fn drain(app: &mut App, rx: &Receiver<AppEvent>) {
        while let Ok(ev) = rx.try_recv() {
            app.handle_event(ev);
        }
    }

    fn logged_in() -> (App, ManualTicker, Receiver<AppEvent>) {
        let (mut app, ticker, rx) = make_app();
        app.login(User {
            email: "a@x".to_string(),
            name: "Ana Lima".to_string(),
            password: None,
        });
        (app, ticker, rx)
    }

    fn type_topic(app: &mut App, topic: &str) {
        app.topic_input = LineInput::new(topic);
    }

    #[test]
    fn test_starts_on_auth_without_active_user() {
        let (app, _, _) = make_app();
        assert_eq!(app.view, ViewState::Auth);
        assert_eq!(app.screen(), Screen::Auth);
    }

    #[test]
    fn test_navigation_requires_login() {
        let (mut app, _, _) = make_app();
        app.go_to(ViewState::Dashboard);
        assert_eq!(app.view, ViewState::Auth);
    }

    #[test]
    fn test_too_short_session_shows_blocking_notice() {
        let (mut app, ticker, rx) = logged_in();
        type_topic(&mut app, "Rust");
        app.start_study();
        drain(&mut app, &rx);
        for _ in 0..10 {
            let id = app.study.live_timer().unwrap();
            app.handle_event(AppEvent::StudyTick(id));
        }
        app.stop_study();
        assert!(ticker.live_timers().is_empty());
        assert_eq!(app.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Blocking));
        assert!(app.quiz.is_none());
        assert!(app.history.is_empty());
        assert!(app.dismiss_notice());
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_empty_topic_is_reported() {
        let (mut app, ticker, _) = logged_in();
        app.start_study();
        assert_eq!(app.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Error));
        assert_eq!(ticker.scheduled_count(), 0);
    }

    #[test]
    fn test_offline_quiz_exits_with_zero_result() {
        let (mut app, _, rx) = logged_in();
        type_topic(&mut app, "Rust");
        app.start_study();
        for _ in 0..12 {
            let id = app.study.live_timer().unwrap();
            app.handle_event(AppEvent::StudyTick(id));
        }
        app.stop_study();
        assert_eq!(app.screen(), Screen::Quiz);
        drain(&mut app, &rx);
        assert!(app.quiz.as_ref().unwrap().is_empty());
        app.exit_empty_quiz();
        assert_eq!(app.view, ViewState::Dashboard);
        let archived = &app.history.sessions()[0];
        assert_eq!(archived.duration_seconds, 12);
        assert_eq!(archived.quiz_result.as_ref().unwrap().total_questions, 0);
    }

    #[test]
    fn test_logout_discards_running_draft() {
        let (mut app, ticker, _) = logged_in();
        type_topic(&mut app, "Rust");
        app.start_study();
        assert_eq!(ticker.live_timers().len(), 1);
        app.logout();
        assert!(ticker.live_timers().is_empty());
        assert!(app.user.is_none());
        assert_eq!(app.view, ViewState::Auth);
        assert_eq!(credentials::load_active_user(app.store()).unwrap(), None);
    }

    #[test]
    fn test_quiz_tab_without_session_routes_to_error() {
        let (mut app, _, _) = logged_in();
        app.go_to(ViewState::Quiz);
        assert_eq!(app.screen(), Screen::MissingSession);
    }

    #[test]
    fn test_tab_cycle_skips_quiz_when_inactive() {
        let (mut app, _, _) = logged_in();
        app.next_tab(true);
        assert_eq!(app.view, ViewState::Dashboard);
        app.next_tab(true);
        assert_eq!(app.view, ViewState::KnowledgeBase);
        app.next_tab(true);
        assert_eq!(app.view, ViewState::Hub);
        app.next_tab(false);
        assert_eq!(app.view, ViewState::KnowledgeBase);
    }

    #[test]
    fn test_submit_auth_reports_invalid_credentials() {
        let (mut app, _, _) = make_app();
        app.auth_form = AuthForm::new();
        for ch in "a@x".chars() {
            app.auth_form.handle_key(crossterm::event::KeyEvent::new(
                crossterm::event::KeyCode::Char(ch),
                crossterm::event::KeyModifiers::NONE,
            ));
        }
        app.auth_form.handle_key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Tab,
            crossterm::event::KeyModifiers::NONE,
        ));
        for ch in "secret".chars() {
            app.auth_form.handle_key(crossterm::event::KeyEvent::new(
                crossterm::event::KeyCode::Char(ch),
                crossterm::event::KeyModifiers::NONE,
            ));
        }
        app.submit_auth();
        assert_eq!(app.auth_form.error.as_deref(), Some("invalid credentials"));
        assert_eq!(app.view, ViewState::Auth);
    }
}
