use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use client::notice::{NoticeLevel, RecordingNotifier};
use client::upload::{ImageFile, ImageUploadClient, MAX_BATCH_FILES};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Hits(Arc<AtomicUsize>);

/// Minimal image host: answers like an unsigned upload endpoint, failing files named `fail*`.
async fn upload(State(hits): State<Hits>, mut form: Multipart) -> axum::response::Response {
    hits.0.fetch_add(1, Ordering::SeqCst);
    let mut file_name = String::new();
    let mut size = 0usize;
    let mut cloud = String::new();
    let mut preset = String::new();
    while let Ok(Some(field)) = form.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().unwrap_or_default().to_string();
                size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
            }
            "cloud_name" => cloud = field.text().await.unwrap_or_default(),
            "upload_preset" => preset = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }
    if file_name.starts_with("fail") || preset.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": {"message": "rejected"}}))).into_response();
    }
    Json(json!({
        "secure_url": format!("https://res.cloudinary.com/{cloud}/image/upload/{file_name}"),
        "public_id": file_name,
        "width": 800,
        "height": 600,
        "format": "jpg",
        "bytes": size,
    }))
    .into_response()
}

async fn start_host() -> anyhow::Result<(String, Hits)> {
    let hits = Hits::default();
    let app = Router::new()
        .route("/v1_1/:cloud/image/upload", post(upload))
        .layer(axum::extract::DefaultBodyLimit::max(32 * 1024 * 1024))
        .with_state(hits.clone());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("image host error: {}", e);
        }
    });
    Ok((format!("http://{addr}/v1_1/demo-cloud/image/upload"), hits))
}

fn uploader(endpoint: String, notifier: Arc<RecordingNotifier>) -> anyhow::Result<ImageUploadClient> {
    let cfg = configs::ImageHostConfig {
        cloud_name: "demo-cloud".into(),
        upload_preset: "unsigned_admin".into(),
        upload_url: Some(endpoint),
        max_bytes: configs::DEFAULT_MAX_IMAGE_BYTES,
    };
    Ok(ImageUploadClient::from_config(&cfg)?.with_notifier(notifier))
}

fn jpeg(name: &str, size: usize) -> ImageFile {
    ImageFile::new(name, "image/jpeg", vec![0xff; size])
}

#[tokio::test]
async fn oversized_and_non_image_files_never_reach_the_host() -> anyhow::Result<()> {
    let (endpoint, hits) = start_host().await?;
    let notifier = Arc::new(RecordingNotifier::default());
    let client = uploader(endpoint, notifier.clone())?;

    assert!(client.upload(&jpeg("big.jpg", 12 * 1024 * 1024)).await.is_none());
    let notices = notifier.take();
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "حجم الصورة يجب أن يكون أقل من 10 ميجابايت");

    let pdf = ImageFile::new("menu.pdf", "application/pdf", vec![1; 64]);
    assert!(client.upload(&pdf).await.is_none());
    assert_eq!(notifier.take()[0].message, "يرجى اختيار ملف صورة صالح");

    assert_eq!(hits.0.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn single_upload_returns_the_hosted_url() -> anyhow::Result<()> {
    let (endpoint, hits) = start_host().await?;
    let notifier = Arc::new(RecordingNotifier::default());
    let client = uploader(endpoint, notifier.clone())?;

    let image = client.upload(&jpeg("cover.jpg", 1024 * 1024)).await.expect("uploaded");
    assert!(image.secure_url.starts_with("https://"));
    assert!(image.secure_url.contains("demo-cloud"));
    assert_eq!(image.bytes, 1024 * 1024);
    assert_eq!(hits.0.load(Ordering::SeqCst), 1);
    assert_eq!(notifier.take()[0].level, NoticeLevel::Success);

    assert!(client.upload(&jpeg("fail.jpg", 10)).await.is_none());
    assert_eq!(notifier.take()[0].message, "فشل رفع الصورة، حاول مرة أخرى");
    Ok(())
}

#[tokio::test]
async fn batch_reports_partial_success() -> anyhow::Result<()> {
    let (endpoint, hits) = start_host().await?;
    let notifier = Arc::new(RecordingNotifier::default());
    let client = uploader(endpoint, notifier.clone())?;

    let files = vec![jpeg("a.jpg", 100), jpeg("fail-b.jpg", 100), jpeg("c.jpg", 100)];
    let batch = client.upload_batch(&files).await;
    assert_eq!(batch.total, 3);
    assert_eq!(batch.failed, 1);
    assert_eq!(batch.urls.len(), 2);
    assert!(batch.urls[0].ends_with("a.jpg"));
    assert!(batch.urls[1].ends_with("c.jpg"));
    assert!(batch.is_partial());
    assert_eq!(hits.0.load(Ordering::SeqCst), 3);

    let notices = notifier.take();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].message, "تم رفع 2 من 3 صور");
    Ok(())
}

#[tokio::test]
async fn batch_over_the_limit_is_rejected_up_front() -> anyhow::Result<()> {
    let (endpoint, hits) = start_host().await?;
    let notifier = Arc::new(RecordingNotifier::default());
    let client = uploader(endpoint, notifier.clone())?;

    let files: Vec<ImageFile> = (0..=MAX_BATCH_FILES).map(|i| jpeg(&format!("{i}.jpg"), 10)).collect();
    let batch = client.upload_batch(&files).await;
    assert!(batch.urls.is_empty());
    assert_eq!(batch.failed, files.len());
    assert_eq!(hits.0.load(Ordering::SeqCst), 0);
    assert_eq!(notifier.take()[0].level, NoticeLevel::Error);
    Ok(())
}
