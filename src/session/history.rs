use anyhow::{Result, bail};

use crate::session::record::StudySession;
use crate::store::kv::KvStore;
use crate::store::schema::{self, SESSIONS_KEY};

/// Archived sessions in archive order. Append-only; every archive rewrites
/// the whole list under one key.
#[derive(Clone, Debug, Default)]
pub struct SessionHistory {
    sessions: Vec<StudySession>,
}

impl SessionHistory {
    pub fn load(store: &dyn KvStore) -> Result<Self> {
        let sessions: Vec<StudySession> = schema::load_json_or_default(store, SESSIONS_KEY)?;
        Ok(Self { sessions })
    }

    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Append a session that carries its quiz result and persist the list.
    ///
    /// The in-memory list keeps the session even if the write fails.
    pub fn archive(&mut self, store: &dyn KvStore, session: StudySession) -> Result<()> {
        if !session.is_archived() {
            bail!("session {} has no quiz result and cannot be archived", session.id);
        }
        tracing::info!(
            id = %session.id,
            topic = %session.topic,
            seconds = session.duration_seconds,
            "archiving study session"
        );
        self.sessions.push(session);
        schema::save_json(store, SESSIONS_KEY, &self.sessions)
    }

    /// Sessions by start time, most recent first.
    pub fn newest_first(&self) -> Vec<&StudySession> {
        let mut sorted: Vec<&StudySession> = self.sessions.iter().collect();
        sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sorted
    }
}
