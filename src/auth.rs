use std::sync::Arc;

use anyhow::Context as _;

use crate::formats::{Session, User};
use crate::storage::{BlobStore, LoadStatus, load_json, save_json};

pub const SESSION_KEY: &str = "ietm_auth";

// Mock accounts; exact match, no hashing.
const CREDENTIALS: [(&str, &str); 3] = [
    ("technician", "tech2024"),
    ("admin", "admin2024"),
    ("bel_user", "bel2024"),
];

#[must_use]
pub fn verify_credentials(username: &str, password: &str) -> bool {
    CREDENTIALS
        .iter()
        .any(|(u, p)| *u == username && *p == password)
}

/// The stored login, if any. Presence of the session blob is trusted as-is.
#[derive(Debug)]
pub struct SessionStore {
    storage: Arc<dyn BlobStore>,
    session: Option<Session>,
    status: LoadStatus,
}

impl SessionStore {
    pub fn load(storage: Arc<dyn BlobStore>) -> anyhow::Result<Self> {
        let (session, status) =
            load_json::<Session>(storage.as_ref(), SESSION_KEY).context("load session")?;
        tracing::debug!(authenticated = session.is_some(), ?status, "loaded session");
        Ok(Self {
            storage,
            session,
            status,
        })
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }

    /// Returns `Ok(false)` and leaves the current session untouched when the
    /// credentials do not match.
    pub fn login(&mut self, username: &str, password: &str) -> anyhow::Result<bool> {
        if !verify_credentials(username, password) {
            tracing::info!(username, "login rejected");
            return Ok(false);
        }

        let session = Session {
            user: User {
                username: username.to_owned(),
            },
        };
        tracing::info!(username, "login accepted");
        let saved = save_json(self.storage.as_ref(), SESSION_KEY, &session).context("save session");
        self.session = Some(session);
        saved?;
        Ok(true)
    }

    pub fn logout(&mut self) -> anyhow::Result<()> {
        if let Some(session) = self.session.take() {
            tracing::info!(username = %session.user.username, "logout");
        }
        self.storage
            .remove(SESSION_KEY)
            .context("remove stored session")
    }
}
