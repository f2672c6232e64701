/// Which screen the user asked for. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewState {
    Auth,
    Hub,
    Quiz,
    Dashboard,
    KnowledgeBase,
}

impl ViewState {
    /// Tabs shown in the header once logged in.
    pub const TABS: [ViewState; 3] = [ViewState::Hub, ViewState::Dashboard, ViewState::KnowledgeBase];

    pub fn title(self) -> &'static str {
        match self {
            ViewState::Auth => "Sign in",
            ViewState::Hub => "Study",
            ViewState::Quiz => "Quiz",
            ViewState::Dashboard => "Dashboard",
            ViewState::KnowledgeBase => "History",
        }
    }
}

/// What actually gets drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Hub,
    Quiz,
    Dashboard,
    KnowledgeBase,
    /// The quiz view was requested without a session to quiz on.
    MissingSession,
}

impl Screen {
    pub fn shows_header(self) -> bool {
        self != Screen::Auth
    }
}

pub fn route(view: ViewState, has_active_session: bool) -> Screen {
    match view {
        ViewState::Auth => Screen::Auth,
        ViewState::Hub => Screen::Hub,
        ViewState::Quiz if has_active_session => Screen::Quiz,
        ViewState::Quiz => Screen::MissingSession,
        ViewState::Dashboard => Screen::Dashboard,
        ViewState::KnowledgeBase => Screen::KnowledgeBase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_without_session_routes_to_error_screen() {
        assert_eq!(route(ViewState::Quiz, false), Screen::MissingSession);
        assert_eq!(route(ViewState::Quiz, true), Screen::Quiz);
    }

    #[test]
    fn test_other_views_ignore_session_flag() {
        for (view, screen) in [
            (ViewState::Auth, Screen::Auth),
            (ViewState::Hub, Screen::Hub),
            (ViewState::Dashboard, Screen::Dashboard),
            (ViewState::KnowledgeBase, Screen::KnowledgeBase),
        ] {
            assert_eq!(route(view, false), screen);
            assert_eq!(route(view, true), screen);
        }
    }

    #[test]
    fn test_header_hidden_only_on_auth() {
        assert!(!Screen::Auth.shows_header());
        assert!(Screen::MissingSession.shows_header());
    }
}
