//! Mock collaborator implementations for testing.
//!
//! These allow exercising the workflow and session lifecycle without a
//! filesystem or a running service.

use crate::backend::WatermarkBackend;
use crate::session::CredentialStore;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use invisignia_api_client::ApiError;
use invisignia_core::models::{HistoryEntry, MediaAsset, Session, VerificationRecord};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// In-memory credential store with a clear-call counter.
#[derive(Default)]
pub struct MemoryCredentialStore {
    session: Mutex<Option<Session>>,
    clears: Mutex<u32>,
}

impl MemoryCredentialStore {
    pub fn clear_count(&self) -> u32 {
        *self.clears.lock().unwrap()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock().unwrap() = None;
        *self.clears.lock().unwrap() += 1;
        Ok(())
    }
}

/// Adapter letting tests keep a handle on a shared store's counters while
/// the manager owns a boxed reference to it.
pub struct SharedStore(pub Arc<MemoryCredentialStore>);

impl CredentialStore for SharedStore {
    fn load(&self) -> Result<Option<Session>> {
        self.0.load()
    }

    fn save(&self, session: &Session) -> Result<()> {
        self.0.save(session)
    }

    fn clear(&self) -> Result<()> {
        self.0.clear()
    }
}

#[derive(Default)]
struct Recorded {
    upload_calls: u32,
    verify_calls: u32,
    history_calls: u32,
    /// (payload, purpose, token) of the most recent upload.
    last_upload: Option<(Bytes, String, String)>,
    /// (payload, token) of the most recent verify.
    last_verify: Option<(Bytes, String)>,
}

/// Cloneable handle on a [`MockBackend`]'s recorded calls, usable after the
/// backend has been moved into a workflow.
#[derive(Clone, Default)]
pub struct CallCounters {
    inner: Arc<Mutex<Recorded>>,
}

impl CallCounters {
    pub fn upload_calls(&self) -> u32 {
        self.inner.lock().unwrap().upload_calls
    }

    pub fn verify_calls(&self) -> u32 {
        self.inner.lock().unwrap().verify_calls
    }

    pub fn history_calls(&self) -> u32 {
        self.inner.lock().unwrap().history_calls
    }

    pub fn last_upload(&self) -> Option<(Bytes, String, String)> {
        self.inner.lock().unwrap().last_upload.clone()
    }

    pub fn last_verify(&self) -> Option<(Bytes, String)> {
        self.inner.lock().unwrap().last_verify.clone()
    }
}

/// Scripted remote collaborator. Replies are consumed in order; an
/// unscripted call fails as a transport error so tests surface it.
#[derive(Default)]
pub struct MockBackend {
    counters: CallCounters,
    upload_replies: Mutex<VecDeque<Result<Bytes, ApiError>>>,
    verify_replies: Mutex<VecDeque<Result<VerificationRecord, ApiError>>>,
    history_replies: Mutex<VecDeque<Result<Vec<HistoryEntry>, ApiError>>>,
}

impl MockBackend {
    pub fn counters(&self) -> CallCounters {
        self.counters.clone()
    }

    pub fn script_upload(&self, reply: Result<Bytes, ApiError>) {
        self.upload_replies.lock().unwrap().push_back(reply);
    }

    pub fn script_verify(&self, reply: Result<VerificationRecord, ApiError>) {
        self.verify_replies.lock().unwrap().push_back(reply);
    }

    pub fn script_history(&self, reply: Result<Vec<HistoryEntry>, ApiError>) {
        self.history_replies.lock().unwrap().push_back(reply);
    }

    fn unscripted() -> ApiError {
        ApiError::Transport("no scripted reply".to_string())
    }
}

#[async_trait]
impl WatermarkBackend for MockBackend {
    async fn upload(
        &self,
        asset: &MediaAsset,
        purpose: &str,
        token: &str,
    ) -> Result<Bytes, ApiError> {
        {
            let mut recorded = self.counters.inner.lock().unwrap();
            recorded.upload_calls += 1;
            recorded.last_upload =
                Some((asset.data().clone(), purpose.to_string(), token.to_string()));
        }
        self.upload_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn verify(
        &self,
        asset: &MediaAsset,
        token: &str,
    ) -> Result<VerificationRecord, ApiError> {
        {
            let mut recorded = self.counters.inner.lock().unwrap();
            recorded.verify_calls += 1;
            recorded.last_verify = Some((asset.data().clone(), token.to_string()));
        }
        self.verify_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn history(&self, _token: &str, _limit: u32) -> Result<Vec<HistoryEntry>, ApiError> {
        self.counters.inner.lock().unwrap().history_calls += 1;
        self.history_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted()))
    }
}
