//! Local input validation.
//!
//! Everything here runs before any compression or network work: a rejected
//! input never costs a request.

use crate::error::WorkflowError;
use crate::models::MediaAsset;
use validator::Validate;

/// Hard cap on the size of a user-selected asset.
pub const MAX_ASSET_BYTES: usize = 10 * 1024 * 1024;

/// The purpose text is embedded as the watermark payload; the server stores
/// at most 255 characters.
pub const MAX_PURPOSE_CHARS: u64 = 255;

#[derive(Debug, Validate)]
struct MarkRequest {
    #[validate(length(min = 1, max = MAX_PURPOSE_CHARS))]
    purpose: String,
}

/// Reject non-image assets and assets over the 10 MiB cap.
pub fn validate_asset(asset: &MediaAsset) -> Result<(), WorkflowError> {
    if !asset.is_image() {
        return Err(WorkflowError::UnsupportedType(format!(
            "Only image files are accepted, got {}",
            asset.mime_type()
        )));
    }
    if asset.byte_size() > MAX_ASSET_BYTES {
        return Err(WorkflowError::InvalidInput(
            "The image must not exceed 10 MB".to_string(),
        ));
    }
    Ok(())
}

/// Reject empty (after trimming) or overlong purpose text.
pub fn validate_purpose(purpose: &str) -> Result<(), WorkflowError> {
    let trimmed = purpose.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::InvalidInput(
            "The purpose text must not be empty".to_string(),
        ));
    }
    let request = MarkRequest {
        purpose: purpose.to_string(),
    };
    request.validate()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use bytes::Bytes;

    #[test]
    fn rejects_non_image_type() {
        let asset = MediaAsset::new("a.pdf", "application/pdf", Bytes::from_static(b"x"));
        let err = validate_asset(&asset).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }

    #[test]
    fn rejects_oversized_asset() {
        let asset = MediaAsset::new(
            "big.png",
            "image/png",
            Bytes::from(vec![0u8; MAX_ASSET_BYTES + 1]),
        );
        let err = validate_asset(&asset).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn accepts_image_within_cap() {
        let asset = MediaAsset::new("a.jpg", "image/jpeg", Bytes::from_static(b"abc"));
        assert!(validate_asset(&asset).is_ok());
    }

    #[test]
    fn rejects_empty_and_whitespace_purpose() {
        assert_eq!(
            validate_purpose("").unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            validate_purpose("   ").unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn rejects_overlong_purpose() {
        let long = "x".repeat(MAX_PURPOSE_CHARS as usize + 1);
        assert_eq!(
            validate_purpose(&long).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        let max = "x".repeat(MAX_PURPOSE_CHARS as usize);
        assert!(validate_purpose(&max).is_ok());
    }
}
