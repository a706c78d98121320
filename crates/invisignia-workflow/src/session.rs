//! Session lifecycle manager.
//!
//! Owns the authenticated identity, its durable storage, and invalidation
//! on authorization failure. All mutation funnels through the named
//! operations `login`, `logout`, and `invalidate`; other components only
//! read. States are LoggedOut and LoggedIn(Session); hydration from the
//! durable store happens once, at construction, before any protected
//! workflow runs.

use anyhow::{Context, Result};
use invisignia_core::models::Session;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Message recorded when a session is invalidated without a caller-supplied
/// reason.
pub const DEFAULT_INVALIDATION_NOTICE: &str = "Session expired, please log in again";

/// Durable storage for the session entry (credential, identity, expiry —
/// written together, cleared together).
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON-file backed store under the configured state directory.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: state_dir.into().join("session.json"),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Session>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to read session file"),
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt entry is treated as logged out rather than a
                // hard failure; the next login rewrites it.
                tracing::warn!(error = %e, path = %self.path.display(), "Discarding unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        let raw = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        std::fs::write(&self.path, raw).context("Failed to write session file")
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove session file"),
        }
    }
}

#[derive(Debug, Default)]
struct ManagerState {
    session: Option<Session>,
    notice: Option<String>,
}

/// Process-wide session state. Sole mutator of the live [`Session`].
pub struct SessionManager {
    state: Mutex<ManagerState>,
    store: Box<dyn CredentialStore>,
}

impl SessionManager {
    /// Build the manager, hydrating a live session from durable storage.
    /// Expired or unreadable entries are purged.
    pub fn new(store: Box<dyn CredentialStore>) -> Result<Self> {
        let session = match store.load()? {
            Some(session) if session.is_expired() => {
                tracing::info!(identity = %session.identity, "Stored session expired, clearing");
                store.clear()?;
                None
            }
            other => other,
        };
        if let Some(ref session) = session {
            tracing::debug!(identity = %session.identity, "Restored session from durable storage");
        }
        Ok(Self {
            state: Mutex::new(ManagerState {
                session,
                notice: None,
            }),
            store,
        })
    }

    fn locked(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Transition to LoggedIn, overwriting any prior session and persisting
    /// the new one with a fresh 7-day expiry.
    pub fn login(&self, identity: &str, token: &str) -> Result<Session> {
        let session = Session::new(identity, token);
        self.store.save(&session)?;
        let mut state = self.locked();
        state.session = Some(session.clone());
        state.notice = None;
        tracing::info!(identity = %identity, "Logged in");
        Ok(session)
    }

    /// Transition to LoggedOut, clearing durable storage.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        self.locked().session = None;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Forced transition to LoggedOut on a detected-invalid credential,
    /// additionally recording a user-facing notice consumed exactly once
    /// via [`SessionManager::take_notice`].
    pub fn invalidate(&self, reason: Option<&str>) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear durable session on invalidation");
        }
        let mut state = self.locked();
        state.session = None;
        state.notice = Some(
            reason
                .unwrap_or(DEFAULT_INVALIDATION_NOTICE)
                .to_string(),
        );
        tracing::warn!("Session invalidated");
    }

    pub fn session(&self) -> Option<Session> {
        self.locked().session.clone()
    }

    /// Active credential, read at request-issue time.
    pub fn token(&self) -> Option<String> {
        self.locked().session.as_ref().map(|s| s.token.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.locked().session.is_some()
    }

    /// Consume the pending invalidation notice, if any. Returns it at most
    /// once.
    pub fn take_notice(&self) -> Option<String> {
        self.locked().notice.take()
    }
}
