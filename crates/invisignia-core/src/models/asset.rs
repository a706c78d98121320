//! Media asset model

use bytes::Bytes;

/// An immutable binary media payload plus metadata.
///
/// Produced by user selection or by the compression engine as a derived
/// asset. Never mutated in place: compression always yields a new
/// `MediaAsset`. The byte size is derived from the payload so it can never
/// disagree with the encoded data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    name: String,
    mime_type: String,
    data: Bytes,
}

impl MediaAsset {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Derived asset with the same name but a re-encoded payload.
    pub fn with_payload(&self, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: self.name.clone(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Suggested output name with a marker suffix inserted before the
    /// extension, e.g. `photo.jpg` -> `photo_ivsgn.jpg`. Extension-less
    /// names get the suffix appended.
    pub fn derived_name(&self, suffix: &str) -> String {
        match self.name.rsplit_once('.') {
            Some((base, ext)) => format!("{}{}.{}", base, suffix, ext),
            None => format!("{}{}", self.name, suffix),
        }
    }
}
