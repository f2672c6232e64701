use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::store::kv::KvStore;
use crate::store::schema::{self, ACTIVE_USER_KEY, USERS_KEY};

/// A locally registered user. The password is kept and compared as plain
/// text; there is no backend and this is not a security boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl User {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// User records stored as one JSON list under a single key.
pub struct CredentialStore<'a> {
    store: &'a dyn KvStore,
}

impl<'a> CredentialStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    pub fn users(&self) -> Result<Vec<User>, AuthError> {
        Ok(schema::load_json_or_default(self.store, USERS_KEY)?)
    }

    /// Append a new user. Emails compare case-sensitively.
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let mut users = self.users()?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::DuplicateEmail);
        }
        let user = User {
            email: email.to_string(),
            name: name.to_string(),
            password: Some(password.to_string()),
        };
        users.push(user.clone());
        schema::save_json(self.store, USERS_KEY, &users)?;
        tracing::info!(email, "registered user");
        Ok(user)
    }

    /// Succeeds only when exactly one record matches both fields.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let users = self.users()?;
        let mut matches = users
            .into_iter()
            .filter(|u| u.email == email && u.password.as_deref() == Some(password));
        match (matches.next(), matches.next()) {
            (Some(user), None) => {
                tracing::info!(email, "user authenticated");
                Ok(user)
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

pub fn load_active_user(store: &dyn KvStore) -> anyhow::Result<Option<User>> {
    schema::load_json(store, ACTIVE_USER_KEY)
}

pub fn save_active_user(store: &dyn KvStore, user: &User) -> anyhow::Result<()> {
    schema::save_json(store, ACTIVE_USER_KEY, user)
}

pub fn clear_active_user(store: &dyn KvStore) -> anyhow::Result<()> {
    store.remove(ACTIVE_USER_KEY)
}
