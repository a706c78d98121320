//! Seam between the workflow and the remote watermark service.
//!
//! The workflow talks to this trait so it can be exercised against mock
//! collaborators; [`invisignia_api_client::ApiClient`] is the production
//! implementation.

use async_trait::async_trait;
use bytes::Bytes;
use invisignia_api_client::{ApiClient, ApiError};
use invisignia_core::models::{HistoryEntry, MediaAsset, VerificationRecord};

#[async_trait]
pub trait WatermarkBackend: Send + Sync {
    /// Embed `purpose` into the asset; returns the processed binary.
    async fn upload(
        &self,
        asset: &MediaAsset,
        purpose: &str,
        token: &str,
    ) -> Result<Bytes, ApiError>;

    /// Check the asset for a previously embedded mark.
    async fn verify(&self, asset: &MediaAsset, token: &str)
        -> Result<VerificationRecord, ApiError>;

    /// The user's previous marks, newest first.
    async fn history(&self, token: &str, limit: u32) -> Result<Vec<HistoryEntry>, ApiError>;
}

#[async_trait]
impl WatermarkBackend for ApiClient {
    async fn upload(
        &self,
        asset: &MediaAsset,
        purpose: &str,
        token: &str,
    ) -> Result<Bytes, ApiError> {
        ApiClient::upload(self, asset, purpose, token).await
    }

    async fn verify(
        &self,
        asset: &MediaAsset,
        token: &str,
    ) -> Result<VerificationRecord, ApiError> {
        ApiClient::verify(self, asset, token).await
    }

    async fn history(&self, token: &str, limit: u32) -> Result<Vec<HistoryEntry>, ApiError> {
        ApiClient::history(self, token, limit).await
    }
}
