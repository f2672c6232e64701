use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::ValidationError;
use crate::ui::line_input::{InputResult, LineInput};

pub const MIN_PASSWORD_LEN: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthField {
    Name,
    Email,
    Password,
}

impl AuthField {
    pub fn label(self) -> &'static str {
        match self {
            AuthField::Name => "Name",
            AuthField::Email => "Email",
            AuthField::Password => "Password",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Quit,
}

/// Checked credentials ready for the credential store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSubmission {
    pub mode: AuthMode,
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct AuthForm {
    pub mode: AuthMode,
    name: LineInput,
    email: LineInput,
    password: LineInput,
    focus: usize,
    pub error: Option<String>,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthForm {
    pub fn new() -> Self {
        Self {
            mode: AuthMode::Login,
            name: LineInput::new(""),
            email: LineInput::new(""),
            password: LineInput::masked(),
            focus: 0,
            error: None,
        }
    }

    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &[AuthField::Email, AuthField::Password],
            AuthMode::Register => &[AuthField::Name, AuthField::Email, AuthField::Password],
        }
    }

    pub fn focused(&self) -> AuthField {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn input(&self, field: AuthField) -> &LineInput {
        match field {
            AuthField::Name => &self.name,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
        }
    }

    fn input_mut(&mut self, field: AuthField) -> &mut LineInput {
        match field {
            AuthField::Name => &mut self.name,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    /// Switch between login and register, keeping what was typed.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.focus = 0;
        self.error = None;
    }

    /// Forget everything, back to an empty login form.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.toggle_mode();
            return FormAction::None;
        }
        let count = self.fields().len();
        let field = self.focused();
        match self.input_mut(field).handle(key) {
            InputResult::Continue => FormAction::None,
            InputResult::Next => {
                self.focus = (self.focus + 1) % count;
                FormAction::None
            }
            InputResult::Previous => {
                self.focus = (self.focus + count - 1) % count;
                FormAction::None
            }
            InputResult::Submit => FormAction::Submit,
            InputResult::Cancel => FormAction::Quit,
        }
    }

    pub fn validate(&self) -> Result<AuthSubmission, ValidationError> {
        let name = self.name.value().trim();
        let email = self.email.value();
        let password = self.password.value();

        if self.mode == AuthMode::Register && name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(AuthSubmission {
            mode: self.mode,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(form: &mut AuthForm, s: &str) {
        for ch in s.chars() {
            form.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn test_login_requires_email_and_password() {
        let mut form = AuthForm::new();
        assert_eq!(form.validate(), Err(ValidationError::MissingField("email")));
        type_str(&mut form, "a@x");
        assert_eq!(form.validate(), Err(ValidationError::MissingField("password")));
        form.handle_key(key(KeyCode::Tab));
        type_str(&mut form, "abcd");
        let sub = form.validate().unwrap();
        assert_eq!(sub.mode, AuthMode::Login);
        assert_eq!(sub.email, "a@x");
        assert_eq!(sub.password, "abcd");
    }

    #[test]
    fn test_email_passed_through_verbatim() {
        let mut form = AuthForm::new();
        type_str(&mut form, " a@x ");
        form.handle_key(key(KeyCode::Tab));
        type_str(&mut form, "abcd");
        assert_eq!(form.validate().unwrap().email, " a@x ");

        let mut blank = AuthForm::new();
        type_str(&mut blank, "   ");
        assert_eq!(blank.validate(), Err(ValidationError::MissingField("email")));
    }

    #[test]
    fn test_short_password_rejected() {
        let mut form = AuthForm::new();
        type_str(&mut form, "a@x");
        form.handle_key(key(KeyCode::Tab));
        type_str(&mut form, "abc");
        assert_eq!(
            form.validate(),
            Err(ValidationError::PasswordTooShort { min: 4 })
        );
    }

    #[test]
    fn test_register_requires_name() {
        let mut form = AuthForm::new();
        form.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert_eq!(form.mode, AuthMode::Register);
        assert_eq!(form.focused(), AuthField::Name);
        form.handle_key(key(KeyCode::Tab));
        type_str(&mut form, "a@x");
        form.handle_key(key(KeyCode::Tab));
        type_str(&mut form, "secret");
        assert_eq!(form.validate(), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let mut form = AuthForm::new();
        assert_eq!(form.focused(), AuthField::Email);
        form.handle_key(key(KeyCode::BackTab));
        assert_eq!(form.focused(), AuthField::Password);
        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focused(), AuthField::Email);
    }

    #[test]
    fn test_enter_submits_and_esc_quits() {
        let mut form = AuthForm::new();
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormAction::Submit);
        assert_eq!(form.handle_key(key(KeyCode::Esc)), FormAction::Quit);
    }

    #[test]
    fn test_toggle_keeps_typed_values_and_clears_error() {
        let mut form = AuthForm::new();
        type_str(&mut form, "a@x");
        form.error = Some("invalid credentials".to_string());
        form.toggle_mode();
        assert!(form.error.is_none());
        assert_eq!(form.input(AuthField::Email).value(), "a@x");
    }
}
