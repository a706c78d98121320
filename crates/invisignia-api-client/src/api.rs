//! Domain methods for the watermark service endpoints.
//!
//! Response types live in `invisignia_core::models::wire`; binary payloads
//! come back as `Bytes`.

use crate::{ApiClient, ApiError};
use bytes::Bytes;
use invisignia_core::models::{HistoryEntry, MediaAsset, RegisterResponse, TokenResponse, VerificationRecord};
use reqwest::multipart;

fn asset_part(asset: &MediaAsset) -> Result<multipart::Part, ApiError> {
    multipart::Part::bytes(asset.data().to_vec())
        .file_name(asset.name().to_string())
        .mime_str(asset.mime_type())
        .map_err(|e| ApiError::Transport(format!("Invalid media type: {}", e)))
}

impl ApiClient {
    /// `POST /auth/login` — multipart `username` + `password` fields.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let form = multipart::Form::new()
            .text("username", username.to_string())
            .text("password", password.to_string());

        let response = self
            .client()
            .post(self.build_url("/auth/login"))
            .multipart(form)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// `POST /auth/register` — JSON body.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisterResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .client()
            .post(self.build_url("/auth/register"))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// `POST /upload/` — embed `purpose` into the asset. Returns the
    /// processed binary for local delivery.
    pub async fn upload(
        &self,
        asset: &MediaAsset,
        purpose: &str,
        token: &str,
    ) -> Result<Bytes, ApiError> {
        let form = multipart::Form::new()
            .part("file", asset_part(asset)?)
            .text("purpose", purpose.to_string());

        tracing::debug!(
            name = asset.name(),
            bytes = asset.byte_size(),
            "Uploading asset for marking"
        );

        let response = self
            .client()
            .post(self.build_url("/upload/"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?)
    }

    /// `POST /verify/` — check an asset for a previously embedded mark.
    pub async fn verify(
        &self,
        asset: &MediaAsset,
        token: &str,
    ) -> Result<VerificationRecord, ApiError> {
        let form = multipart::Form::new().part("file", asset_part(asset)?);

        let response = self
            .client()
            .post(self.build_url("/verify/"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// `GET /history/` — the user's previous marks, newest first.
    pub async fn history(&self, token: &str, limit: u32) -> Result<Vec<HistoryEntry>, ApiError> {
        let response = self
            .client()
            .get(self.build_url("/history/"))
            .bearer_auth(token)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }
}
