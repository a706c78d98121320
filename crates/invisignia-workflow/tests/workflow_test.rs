//! End-to-end mark flow against a scripted remote collaborator: a large
//! image goes through validation, real compression, and one multipart
//! submission, with observable monotone progress.

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use invisignia_core::models::MediaAsset;
use invisignia_processing::SizePolicy;
use invisignia_workflow::test_helpers::{MemoryCredentialStore, MockBackend, SharedStore};
use invisignia_workflow::{SessionManager, SubmissionWorkflow, WorkflowPhase};
use rand::{Rng, SeedableRng};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Deterministic noise PNG; noise compresses poorly, forcing the quality
/// loop to do real work.
fn noise_png_asset(width: u32, height: u32) -> MediaAsset {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let mut img = image::RgbImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = image::Rgb([rng.random(), rng.random(), rng.random()]);
    }
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    MediaAsset::new("photo.png", "image/png", Bytes::from(buffer))
}

fn logged_in_session() -> Arc<SessionManager> {
    let store = Arc::new(MemoryCredentialStore::default());
    let manager = Arc::new(SessionManager::new(Box::new(SharedStore(store))).unwrap());
    manager.login("user@example.com", "tok-e2e").unwrap();
    manager
}

#[tokio::test]
async fn large_image_is_compressed_then_submitted_once() {
    let asset = noise_png_asset(2000, 1300);
    let original_size = asset.byte_size();
    // Large enough to trigger a compression tier.
    assert!(original_size > 2048 * 1024);

    let backend = MockBackend::default();
    backend.script_upload(Ok(Bytes::from_static(b"marked-binary")));
    let calls = backend.counters();

    let mut workflow = SubmissionWorkflow::new(backend, logged_in_session(), SizePolicy::Tiered);

    // Collect observable snapshots until the operation terminates.
    let mut rx = workflow.subscribe();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let collector = {
        let seen = seen.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let state = rx.borrow().clone();
                let terminal = state.phase.is_terminal();
                seen.lock().unwrap().push(state);
                if terminal {
                    break;
                }
            }
        })
    };

    let outcome = workflow
        .submit_mark(&asset, "Property of Jane Doe")
        .await
        .unwrap();
    collector.await.unwrap();

    // Exactly one submission, carrying the compressed asset.
    assert_eq!(calls.upload_calls(), 1);
    let (submitted, purpose, token) = calls.last_upload().unwrap();
    assert!(
        submitted.len() < original_size,
        "submitted {} bytes, expected less than {}",
        submitted.len(),
        original_size
    );
    assert_eq!(purpose, "Property of Jane Doe");
    assert_eq!(token, "tok-e2e");

    // Result handed back for local delivery with the derived name.
    assert_eq!(outcome.data, Bytes::from_static(b"marked-binary"));
    assert_eq!(outcome.suggested_name, "photo_ivsgn.png");

    // Progress never regressed and ended at 100.
    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    let mut last_percent = 0;
    for state in seen.iter() {
        assert!(
            state.percent >= last_percent,
            "progress regressed: {} after {}",
            state.percent,
            last_percent
        );
        last_percent = state.percent;
    }
    let terminal = seen.last().unwrap();
    assert_eq!(terminal.phase, WorkflowPhase::Succeeded);
    assert_eq!(terminal.percent, 100);
}

#[tokio::test]
async fn small_image_is_submitted_byte_identical() {
    // Well below the 800 KiB threshold: the policy returns no target and
    // the engine must never run.
    let img = image::RgbImage::from_pixel(100, 100, image::Rgb([10, 20, 30]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    let asset = MediaAsset::new("tiny.png", "image/png", Bytes::from(buffer));

    let backend = MockBackend::default();
    backend.script_upload(Ok(Bytes::from_static(b"marked")));
    let calls = backend.counters();

    let mut workflow = SubmissionWorkflow::new(backend, logged_in_session(), SizePolicy::Tiered);
    let outcome = workflow.submit_mark(&asset, "tiny test").await.unwrap();

    let (submitted, _, _) = calls.last_upload().unwrap();
    assert_eq!(&submitted, asset.data());
    assert_eq!(outcome.suggested_name, "tiny_ivsgn.png");
}
