//! Submission workflow: validation, compression, remote submission, and
//! result handling for the mark and verify operations.
//!
//! Transitions run strictly forward:
//! `Idle -> Validating -> (Compressing ->)? Submitting -> Succeeded | Failed`,
//! then back to Idle on the next operation. Each operation borrows the
//! workflow mutably, so a second submission cannot start while one is in
//! flight; there is no cancellation — an operation runs to completion.

use crate::backend::WatermarkBackend;
use crate::session::SessionManager;
use crate::state::{ProgressTracker, WorkflowPhase, WorkflowState};
use bytes::Bytes;
use invisignia_api_client::ApiError;
use invisignia_core::error::WorkflowError;
use invisignia_core::models::{HistoryEntry, MediaAsset, VerificationRecord};
use invisignia_core::validation::{validate_asset, validate_purpose};
use invisignia_processing::{Compressor, SizePolicy};
use std::sync::Arc;
use tokio::sync::watch;

/// Marker inserted before the extension of a processed asset's name.
pub const OUTPUT_NAME_SUFFIX: &str = "_ivsgn";

/// Remote messages carrying this marker (case-insensitive) are image-quality
/// rejections; "sufficient quality" also matches "insufficient quality".
const QUALITY_REJECTION_MARKER: &str = "sufficient quality";

/// Result of a successful mark operation, handed back for local delivery.
#[derive(Debug, Clone)]
pub struct MarkOutcome {
    /// The processed binary returned by the service.
    pub data: Bytes,
    /// Output file name with [`OUTPUT_NAME_SUFFIX`] inserted before the
    /// original extension.
    pub suggested_name: String,
}

/// Orchestrates one operation at a time against the remote service.
pub struct SubmissionWorkflow<B: WatermarkBackend> {
    backend: B,
    session: Arc<SessionManager>,
    policy: SizePolicy,
    progress: ProgressTracker,
}

impl<B: WatermarkBackend> SubmissionWorkflow<B> {
    pub fn new(backend: B, session: Arc<SessionManager>, policy: SizePolicy) -> Self {
        Self {
            backend,
            session,
            policy,
            progress: ProgressTracker::new(),
        }
    }

    /// Observe state snapshots without any rendering environment attached.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.progress.subscribe()
    }

    pub fn state(&self) -> WorkflowState {
        self.progress.current()
    }

    /// Submit an asset for invisible watermark embedding.
    pub async fn submit_mark(
        &mut self,
        asset: &MediaAsset,
        purpose: &str,
    ) -> Result<MarkOutcome, WorkflowError> {
        self.progress.reset();
        let result = self.run_mark(asset, purpose).await;
        self.finish(&result);
        result
    }

    /// Submit an asset to check for a previously embedded mark.
    pub async fn submit_verify(
        &mut self,
        asset: &MediaAsset,
    ) -> Result<VerificationRecord, WorkflowError> {
        self.progress.reset();
        let result = self.run_verify(asset).await;
        self.finish(&result);
        result
    }

    /// Authenticated passthrough to the history listing.
    pub async fn history(&self, limit: u32) -> Result<Vec<HistoryEntry>, WorkflowError> {
        let token = self.active_token()?;
        self.backend
            .history(&token, limit)
            .await
            .map_err(|e| self.classify_remote_error(e))
    }

    async fn run_mark(
        &self,
        asset: &MediaAsset,
        purpose: &str,
    ) -> Result<MarkOutcome, WorkflowError> {
        self.progress
            .report(WorkflowPhase::Validating, 10, "Validating image...");
        validate_asset(asset)?;
        validate_purpose(purpose)?;
        self.progress
            .report(WorkflowPhase::Validating, 20, "Analyzing image quality...");

        let working = self.maybe_compress(asset).await?;

        self.progress.report(
            WorkflowPhase::Submitting,
            60,
            "Embedding invisible watermark...",
        );
        let token = self.active_token()?;
        let data = self
            .backend
            .upload(&working, purpose, &token)
            .await
            .map_err(|e| self.classify_remote_error(e))?;

        self.progress
            .report(WorkflowPhase::Submitting, 90, "Preparing download...");

        Ok(MarkOutcome {
            data,
            suggested_name: asset.derived_name(OUTPUT_NAME_SUFFIX),
        })
    }

    async fn run_verify(&self, asset: &MediaAsset) -> Result<VerificationRecord, WorkflowError> {
        self.progress
            .report(WorkflowPhase::Validating, 10, "Analyzing image...");
        validate_asset(asset)?;
        self.progress
            .report(WorkflowPhase::Validating, 25, "Extracting watermark...");

        // Verification submits the asset untouched: re-encoding could damage
        // the very mark being checked.
        self.progress
            .report(WorkflowPhase::Submitting, 50, "Verifying authenticity...");
        let token = self.active_token()?;
        let record = self
            .backend
            .verify(asset, &token)
            .await
            .map_err(|e| self.classify_remote_error(e))?;

        self.progress
            .report(WorkflowPhase::Submitting, 75, "Checking record...");
        Ok(record)
    }

    /// Run the compression engine when the policy asks for it; otherwise
    /// hand back the asset unchanged.
    async fn maybe_compress(&self, asset: &MediaAsset) -> Result<MediaAsset, WorkflowError> {
        let Some(target) = self.policy.select(asset.byte_size()) else {
            return Ok(asset.clone());
        };
        self.progress
            .report(WorkflowPhase::Compressing, 40, "Compressing image...");
        let outcome = Compressor::compress(asset, &target).await?;
        tracing::info!(
            original_bytes = asset.byte_size(),
            compressed_bytes = outcome.asset.byte_size(),
            final_quality = outcome.final_quality,
            "Asset compressed for submission"
        );
        Ok(outcome.asset)
    }

    /// Credential read at request-issue time, never cached across
    /// operations.
    fn active_token(&self) -> Result<String, WorkflowError> {
        self.session
            .token()
            .ok_or_else(|| WorkflowError::Unauthorized("No active session".to_string()))
    }

    /// Classify a non-success response. A 401 invalidates the session
    /// before the error is surfaced; no failure kind is retried.
    fn classify_remote_error(&self, err: ApiError) -> WorkflowError {
        if err.status() == Some(401) {
            self.session.invalidate(None);
            return WorkflowError::Unauthorized(err.message().to_string());
        }
        let message = err.message();
        if message.to_lowercase().contains(QUALITY_REJECTION_MARKER) {
            return WorkflowError::InsufficientQuality(message.to_string());
        }
        WorkflowError::Remote(message.to_string())
    }

    fn finish<T>(&self, result: &Result<T, WorkflowError>) {
        match result {
            Ok(_) => {
                self.progress
                    .report(WorkflowPhase::Succeeded, 100, "Completed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Operation failed");
                self.progress.fail(&e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CredentialStore;
    use crate::test_helpers::{MemoryCredentialStore, MockBackend};
    use invisignia_core::error::ErrorKind;

    fn logged_in_session() -> (Arc<SessionManager>, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::default());
        let manager = Arc::new(
            SessionManager::new(Box::new(crate::test_helpers::SharedStore(store.clone())))
                .unwrap(),
        );
        manager.login("user@example.com", "tok-123").unwrap();
        (manager, store)
    }

    fn small_png_asset() -> MediaAsset {
        // Below every policy threshold, so no compression path is taken.
        MediaAsset::new("photo.jpg", "image/jpeg", Bytes::from(vec![0u8; 1024]))
    }

    #[tokio::test]
    async fn empty_purpose_fails_before_any_network_call() {
        let (session, _) = logged_in_session();
        let backend = MockBackend::default();
        let calls = backend.counters();
        let mut workflow = SubmissionWorkflow::new(backend, session, SizePolicy::Tiered);

        let err = workflow
            .submit_mark(&small_png_asset(), "   ")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(calls.upload_calls(), 0);
        assert_eq!(workflow.state().phase, WorkflowPhase::Failed);
    }

    #[tokio::test]
    async fn non_image_asset_fails_before_any_network_call() {
        let (session, _) = logged_in_session();
        let backend = MockBackend::default();
        let calls = backend.counters();
        let mut workflow = SubmissionWorkflow::new(backend, session, SizePolicy::Tiered);

        let asset = MediaAsset::new("doc.pdf", "application/pdf", Bytes::from(vec![0u8; 10]));
        let err = workflow.submit_mark(&asset, "purpose").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        assert_eq!(calls.upload_calls(), 0);
    }

    #[tokio::test]
    async fn small_asset_skips_compression_and_uploads_same_bytes() {
        let (session, _) = logged_in_session();
        let backend = MockBackend::default();
        backend.script_upload(Ok(Bytes::from_static(b"marked-bytes")));
        let calls = backend.counters();
        let mut workflow = SubmissionWorkflow::new(backend, session, SizePolicy::Tiered);

        let asset = small_png_asset();
        let outcome = workflow.submit_mark(&asset, "my purpose").await.unwrap();

        assert_eq!(outcome.suggested_name, "photo_ivsgn.jpg");
        assert_eq!(outcome.data, Bytes::from_static(b"marked-bytes"));
        assert_eq!(calls.upload_calls(), 1);
        // Asset below the threshold is submitted byte-identical.
        let (submitted, purpose, token) = calls.last_upload().unwrap();
        assert_eq!(&submitted, asset.data());
        assert_eq!(purpose, "my purpose");
        assert_eq!(token, "tok-123");
        assert_eq!(workflow.state().phase, WorkflowPhase::Succeeded);
        assert_eq!(workflow.state().percent, 100);
    }

    #[tokio::test]
    async fn engine_failure_short_circuits_before_submission() {
        let (session, _) = logged_in_session();
        let backend = MockBackend::default();
        let calls = backend.counters();
        let mut workflow = SubmissionWorkflow::new(backend, session, SizePolicy::Tiered);

        // Over the no-compression threshold, so the engine must run; the
        // payload is not decodable image data.
        let asset = MediaAsset::new(
            "broken.png",
            "image/png",
            Bytes::from(vec![0xABu8; 1024 * 1024]),
        );
        let err = workflow.submit_mark(&asset, "purpose").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(calls.upload_calls(), 0);
        assert_eq!(workflow.state().phase, WorkflowPhase::Failed);
    }

    #[tokio::test]
    async fn unauthorized_invalidates_session_exactly_once() {
        let (session, store) = logged_in_session();
        let backend = MockBackend::default();
        backend.script_upload(Err(ApiError::Status {
            status: 401,
            message: "Could not validate credentials".to_string(),
        }));
        let mut workflow = SubmissionWorkflow::new(backend, session.clone(), SizePolicy::Tiered);

        let err = workflow
            .submit_mark(&small_png_asset(), "purpose")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(!session.is_logged_in());
        // Stored credential is gone; exactly one invalidation happened.
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.clear_count(), 1);
        assert!(session.take_notice().is_some());
        assert_eq!(workflow.state().phase, WorkflowPhase::Failed);
    }

    #[tokio::test]
    async fn quality_rejection_is_classified_with_guidance() {
        let (session, _) = logged_in_session();
        let backend = MockBackend::default();
        backend.script_upload(Err(ApiError::Status {
            status: 400,
            message: "The image does not have sufficient quality for an invisible watermark"
                .to_string(),
        }));
        let mut workflow = SubmissionWorkflow::new(backend, session.clone(), SizePolicy::Tiered);

        let err = workflow
            .submit_mark(&small_png_asset(), "purpose")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientQuality);
        assert!(err.suggested_action().is_some());
        // Only 401 touches the session.
        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn other_remote_failures_keep_the_server_message() {
        let (session, _) = logged_in_session();
        let backend = MockBackend::default();
        backend.script_upload(Err(ApiError::Status {
            status: 500,
            message: "disk full".to_string(),
        }));
        let mut workflow = SubmissionWorkflow::new(backend, session, SizePolicy::Tiered);

        let err = workflow
            .submit_mark(&small_png_asset(), "purpose")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn verify_submits_asset_untouched() {
        let (session, _) = logged_in_session();
        let backend = MockBackend::default();
        backend.script_verify(Ok(VerificationRecord {
            status: "found".to_string(),
            purpose: "Property of Jane".to_string(),
            created_at: chrono::Utc::now(),
        }));
        let calls = backend.counters();
        let mut workflow = SubmissionWorkflow::new(backend, session, SizePolicy::Tiered);

        // Large enough that the mark path would compress it.
        let asset = MediaAsset::new(
            "big.png",
            "image/png",
            Bytes::from(vec![7u8; 3 * 1024 * 1024]),
        );
        let record = workflow.submit_verify(&asset).await.unwrap();
        assert_eq!(record.status, "found");
        let (submitted, _) = calls.last_verify().unwrap();
        assert_eq!(&submitted, asset.data());
        assert_eq!(workflow.state().phase, WorkflowPhase::Succeeded);
    }

    #[tokio::test]
    async fn logged_out_operation_fails_without_network() {
        let store = Arc::new(MemoryCredentialStore::default());
        let session = Arc::new(
            SessionManager::new(Box::new(crate::test_helpers::SharedStore(store))).unwrap(),
        );
        let backend = MockBackend::default();
        let calls = backend.counters();
        let mut workflow = SubmissionWorkflow::new(backend, session, SizePolicy::Tiered);

        let err = workflow
            .submit_mark(&small_png_asset(), "purpose")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(calls.upload_calls(), 0);
    }

    #[tokio::test]
    async fn history_passes_through_in_server_order() {
        let (session, _) = logged_in_session();
        let backend = MockBackend::default();
        let now = chrono::Utc::now();
        backend.script_history(Ok(vec![
            HistoryEntry {
                id: 2,
                purpose: "newer".to_string(),
                created_at: now,
                hash_id: "b".to_string(),
            },
            HistoryEntry {
                id: 1,
                purpose: "older".to_string(),
                created_at: now,
                hash_id: "a".to_string(),
            },
        ]));
        let workflow = SubmissionWorkflow::new(backend, session, SizePolicy::Tiered);

        let entries = workflow.history(10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 2);
        assert_eq!(entries[1].id, 1);
    }
}
