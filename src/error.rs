use thiserror::Error;

/// Input rejected before touching any store; recoverable by re-entering it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please fill in all required fields ({0} is missing)")]
    MissingField(&'static str),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("credential store unavailable: {0}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudyError {
    #[error("enter a topic before starting")]
    EmptyTopic,
    #[error("no study session in progress")]
    NotStarted,
    #[error("session too short to be recorded ({seconds}s, minimum is more than {min}s)", min = crate::session::study::MIN_SESSION_SECS)]
    SessionTooShort { seconds: u64 },
}

/// Failures inside the AI provider. These are logged and degraded into
/// empty or fallback data; they never reach the lifecycle controller.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider API key is not configured")]
    MissingApiKey,
    #[cfg(feature = "network")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("provider request failed with status {0}")]
    HttpStatus(u16),
    #[error("provider returned an empty response")]
    EmptyResponse,
    #[error("provider returned a malformed response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Malformed(e.to_string())
    }
}
