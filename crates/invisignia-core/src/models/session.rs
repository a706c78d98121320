//! Authenticated session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Sessions persist for seven days, matching the server-side token lifetime.
pub const SESSION_TTL_DAYS: i64 = 7;

/// The authenticated identity and credential held by the client for the
/// duration of a login. Exactly one session is live per process; the session
/// manager is its sole mutator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub identity: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(identity: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            token: token.into(),
            expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
