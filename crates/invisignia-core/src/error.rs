//! Error types module
//!
//! All failures surfaced by the client pipeline are unified under
//! [`WorkflowError`]. Local validation errors, compression-stage errors, and
//! submission-stage errors each carry a human-readable message; no failure is
//! silently swallowed. [`ErrorKind`] gives callers a stable discriminant for
//! branching without matching on message text.

/// Stable discriminant for [`WorkflowError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedType,
    InvalidInput,
    Decode,
    Environment,
    Unauthorized,
    InsufficientQuality,
    Remote,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The selected asset's declared media type is not an image type.
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// Local validation failed (empty/overlong purpose, oversized asset).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The asset could not be decoded (corrupt or unsupported image data).
    #[error("Could not decode image: {0}")]
    Decode(String),

    /// The runtime could not provide an encoding surface.
    #[error("Encoding environment failure: {0}")]
    Environment(String),

    /// The remote service rejected the credential (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The remote service rejected the image for lack of embeddable quality.
    #[error("Insufficient image quality: {0}")]
    InsufficientQuality(String),

    /// Any other non-success response from the remote service.
    #[error("Remote error: {0}")]
    Remote(String),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            WorkflowError::InvalidInput(_) => ErrorKind::InvalidInput,
            WorkflowError::Decode(_) => ErrorKind::Decode,
            WorkflowError::Environment(_) => ErrorKind::Environment,
            WorkflowError::Unauthorized(_) => ErrorKind::Unauthorized,
            WorkflowError::InsufficientQuality(_) => ErrorKind::InsufficientQuality,
            WorkflowError::Remote(_) => ErrorKind::Remote,
        }
    }

    /// Actionable guidance for the user, where one exists.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            WorkflowError::InsufficientQuality(_) => Some(
                "Try a higher-resolution or less-compressed source image \
                 (PNG instead of heavily compressed JPEG).",
            ),
            WorkflowError::Unauthorized(_) => Some("Log in again and retry the operation."),
            WorkflowError::UnsupportedType(_) => Some("Select a JPG, PNG, or BMP image file."),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for WorkflowError {
    fn from(err: validator::ValidationErrors) -> Self {
        WorkflowError::InvalidInput(format!("Validation error: {}", err))
    }
}
