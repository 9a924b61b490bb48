//! Image uploads to the CDN with client-side type and size checks.

use std::sync::Arc;
use std::time::Duration;

use common::metrics::IMAGE_UPLOADS_TOTAL;
use futures::future::join_all;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::ClientError;
use crate::notice::{Notice, Notifier, TracingNotifier};

/// Most files accepted by one batch upload.
pub const MAX_BATCH_FILES: usize = 10;

const MSG_NOT_IMAGE: &str = "يرجى اختيار ملف صورة صالح";
const MSG_UPLOAD_FAILED: &str = "فشل رفع الصورة، حاول مرة أخرى";

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    /// Declared media type, e.g. `image/jpeg`.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), media_type: media_type.into(), bytes }
    }

    pub fn size(&self) -> u64 { self.bytes.len() as u64 }
}

/// Upload response of the image host.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadedImage {
    pub secure_url: String,
    #[serde(default)]
    pub public_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub bytes: u64,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("not an image: {0}")]
    NotAnImage(String),
    #[error("file is {size} bytes, the limit is {max}")]
    TooLarge { size: u64, max: u64 },
    #[error("image host answered with status {0}")]
    Http(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unreadable image host response: {0}")]
    Decode(String),
}

impl UploadError {
    /// Message shown to the console user.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::NotAnImage(_) => MSG_NOT_IMAGE.to_string(),
            UploadError::TooLarge { max, .. } => {
                format!("حجم الصورة يجب أن يكون أقل من {} ميجابايت", max / (1024 * 1024))
            }
            UploadError::Http(_) | UploadError::Transport(_) | UploadError::Decode(_) => MSG_UPLOAD_FAILED.to_string(),
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            UploadError::NotAnImage(_) => "rejected_type",
            UploadError::TooLarge { .. } => "rejected_size",
            _ => "failed",
        }
    }
}

/// Aggregate of a batch upload; URLs keep the input order of the successful files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchUpload {
    pub urls: Vec<String>,
    pub failed: usize,
    pub total: usize,
}

impl BatchUpload {
    pub fn is_partial(&self) -> bool { !self.urls.is_empty() && self.failed > 0 }
    pub fn is_complete(&self) -> bool { self.total > 0 && self.failed == 0 }
}

#[derive(Clone)]
pub struct ImageUploadClient {
    http: reqwest::Client,
    endpoint: String,
    cloud_name: String,
    upload_preset: String,
    max_bytes: u64,
    notifier: Arc<dyn Notifier>,
}

impl ImageUploadClient {
    pub fn from_config(cfg: &configs::ImageHostConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint(),
            cloud_name: cfg.cloud_name.clone(),
            upload_preset: cfg.upload_preset.clone(),
            max_bytes: cfg.max_bytes,
            notifier: Arc::new(TracingNotifier),
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Client-side checks; nothing is sent when they fail.
    pub fn validate(&self, file: &ImageFile) -> Result<(), UploadError> {
        if !file.media_type.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(UploadError::NotAnImage(file.media_type.clone()));
        }
        if file.size() > self.max_bytes {
            return Err(UploadError::TooLarge { size: file.size(), max: self.max_bytes });
        }
        Ok(())
    }

    pub async fn try_upload(&self, file: &ImageFile) -> Result<UploadedImage, UploadError> {
        self.validate(file)?;

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|_| UploadError::NotAnImage(file.media_type.clone()))?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("cloud_name", self.cloud_name.clone());

        let resp = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UploadError::Http(status.as_u16()));
        }
        resp.json::<UploadedImage>().await.map_err(|e| UploadError::Decode(e.to_string()))
    }

    /// Upload one image; failures become a notice and `None`.
    pub async fn upload(&self, file: &ImageFile) -> Option<UploadedImage> {
        match self.try_upload(file).await {
            Ok(img) => {
                IMAGE_UPLOADS_TOTAL.with_label_values(&["ok"]).inc();
                info!(file = %file.name, url = %img.secure_url, "image uploaded");
                self.notifier.notify(Notice::success("تم رفع الصورة بنجاح"));
                Some(img)
            }
            Err(e) => {
                IMAGE_UPLOADS_TOTAL.with_label_values(&[e.outcome()]).inc();
                warn!(file = %file.name, error = %e, "image upload failed");
                self.notifier.notify(Notice::error(e.user_message()));
                None
            }
        }
    }

    /// Upload up to [`MAX_BATCH_FILES`] images concurrently; one failure never aborts the others.
    pub async fn upload_batch(&self, files: &[ImageFile]) -> BatchUpload {
        if files.len() > MAX_BATCH_FILES {
            self.notifier
                .notify(Notice::error(format!("يمكن رفع {MAX_BATCH_FILES} صور كحد أقصى في المرة الواحدة")));
            return BatchUpload { urls: Vec::new(), failed: files.len(), total: files.len() };
        }

        let results = join_all(files.iter().map(|f| self.try_upload(f))).await;
        let mut batch = BatchUpload { total: files.len(), ..BatchUpload::default() };
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(img) => {
                    IMAGE_UPLOADS_TOTAL.with_label_values(&["ok"]).inc();
                    batch.urls.push(img.secure_url);
                }
                Err(e) => {
                    IMAGE_UPLOADS_TOTAL.with_label_values(&[e.outcome()]).inc();
                    warn!(file = %file.name, error = %e, "batch image upload failed");
                    batch.failed += 1;
                }
            }
        }

        let notice = if batch.total == 0 {
            Notice::info("لم يتم اختيار أي صور")
        } else if batch.is_complete() {
            Notice::success(format!("تم رفع {} صور بنجاح", batch.total))
        } else if batch.is_partial() {
            Notice::warning(format!("تم رفع {} من {} صور", batch.urls.len(), batch.total))
        } else {
            Notice::error("فشل رفع الصور")
        };
        self.notifier.notify(notice);
        batch
    }
}
