//! Adaptive compression engine.
//!
//! Shrinks an image asset toward a byte budget by a monotone linear search
//! over encoding quality: decode, downscale to the target's bounding box,
//! then re-encode stepping quality down by a fixed amount until the encoded
//! size fits or the quality floor is reached. Linear rather than binary
//! search: bounded at `(initial - floor) / step + 1` iterations and simple
//! to reason about.

use crate::policy::CompressionTarget;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use invisignia_core::error::WorkflowError;
use invisignia_core::models::MediaAsset;
use std::io::Cursor;

/// Quality decrement per iteration.
pub const QUALITY_STEP: f32 = 0.05;

/// Above this quality the engine emits lossless PNG; at or below, lossy
/// JPEG. A trade-off policy, not an error path: a floor above the threshold
/// deliberately keeps the output lossless.
pub const PNG_QUALITY_THRESHOLD: f32 = 0.80;

/// Output encoding for a compression pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn for_quality(quality: f32) -> Self {
        if quality > PNG_QUALITY_THRESHOLD {
            OutputFormat::Png
        } else {
            OutputFormat::Jpeg
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

/// Result of one compression pass. The derived asset keeps the original
/// name; final quality and iteration count are exposed for logging and for
/// callers that want to check the termination guarantee.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub asset: MediaAsset,
    pub format: OutputFormat,
    pub final_quality: f32,
    pub iterations: u32,
}

/// Main compression engine. Stateless; one invocation per asset, no
/// internal concurrency.
pub struct Compressor;

impl Compressor {
    /// Compress `asset` toward `target`. Yields a new asset; the input is
    /// never mutated. Encoding runs on the blocking pool so the caller's
    /// task stays responsive.
    pub async fn compress(
        asset: &MediaAsset,
        target: &CompressionTarget,
    ) -> Result<CompressionOutcome, WorkflowError> {
        let asset = asset.clone();
        let target = *target;
        tokio::task::spawn_blocking(move || Self::compress_blocking(&asset, &target))
            .await
            .map_err(|e| WorkflowError::Environment(format!("Compression task failed: {}", e)))?
    }

    fn compress_blocking(
        asset: &MediaAsset,
        target: &CompressionTarget,
    ) -> Result<CompressionOutcome, WorkflowError> {
        let img = Self::decode(asset.data())?;
        let img = Self::fit_to_bounds(img, target.max_width_px, target.max_height_px);

        let mut quality = target.initial_quality;
        let mut iterations = 0u32;

        loop {
            iterations += 1;
            let format = OutputFormat::for_quality(quality);
            let encoded = Self::encode(&img, format, quality)?;

            if encoded.len() <= target.target_bytes || quality <= target.quality_floor {
                tracing::debug!(
                    original_bytes = asset.byte_size(),
                    encoded_bytes = encoded.len(),
                    target_bytes = target.target_bytes,
                    quality = quality,
                    iterations = iterations,
                    "Compression finished"
                );
                return Ok(CompressionOutcome {
                    asset: asset.with_payload(format.to_mime_type(), Bytes::from(encoded)),
                    format,
                    final_quality: quality,
                    iterations,
                });
            }

            // Strictly decreasing toward the floor; the floor check above
            // guarantees termination.
            quality = (quality - QUALITY_STEP).max(target.quality_floor);
        }
    }

    fn decode(data: &[u8]) -> Result<DynamicImage, WorkflowError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| WorkflowError::Decode(e.to_string()))?;
        reader
            .decode()
            .map_err(|e| WorkflowError::Decode(e.to_string()))
    }

    /// Uniform downscale preserving aspect ratio so both dimensions fit.
    fn fit_to_bounds(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
        let (width, height) = img.dimensions();
        if width <= max_width && height <= max_height {
            return img;
        }
        tracing::debug!(
            width = width,
            height = height,
            max_width = max_width,
            max_height = max_height,
            "Downscaling to bounding box"
        );
        img.resize(max_width, max_height, FilterType::Lanczos3)
    }

    fn encode(
        img: &DynamicImage,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>, WorkflowError> {
        match format {
            OutputFormat::Png => Self::encode_png(img),
            OutputFormat::Jpeg => Self::encode_jpeg(img, quality),
        }
    }

    fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, WorkflowError> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| WorkflowError::Environment(format!("PNG encoding failed: {}", e)))?;
        Ok(buffer)
    }

    /// JPEG via mozjpeg with progressive mode and optimized coding.
    fn encode_jpeg(img: &DynamicImage, quality: f32) -> Result<Vec<u8>, WorkflowError> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality * 100.0);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| WorkflowError::Environment(format!("JPEG encoding failed: {}", e)))?;
        comp.write_scanlines(&rgb_img)
            .map_err(|e| WorkflowError::Environment(format!("JPEG encoding failed: {}", e)))?;
        comp.finish()
            .map_err(|e| WorkflowError::Environment(format!("JPEG encoding failed: {}", e)))
    }
}
