//! Wire types for the remote watermark service.
//!
//! Shapes match the server's JSON responses; none of these are persisted
//! locally beyond the lifetime of one operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `POST /auth/login` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// `POST /auth/register` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
}

/// `POST /verify/` response: the record behind a recognized watermark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub status: String,
    pub purpose: String,
    pub created_at: DateTime<Utc>,
}

/// One entry of the `GET /history/` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub purpose: String,
    pub created_at: DateTime<Utc>,
    pub hash_id: String,
}
