//! Section images embedded as `data:` URLs
//!
//! Picked image files are read off the UI thread. Each read delivers exactly
//! one [`ImageReadOutcome`] tagged with the section it was requested for; the
//! caller resolves it against whatever the document looks like at that time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Extensions offered by the image picker
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("could not read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported image type: {0}")]
    UnsupportedFormat(String),
}

/// MIME type for an image path, judged by extension
pub fn mime_for_path(path: &Path) -> Result<&'static str, ImageError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => Err(ImageError::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its MIME type and decoded bytes
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = BASE64_STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

/// Read a file and encode it as a data URL
pub async fn read_as_data_url(path: &Path) -> Result<String, ImageError> {
    let mime = mime_for_path(path)?;
    let bytes = tokio::fs::read(path).await.map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encode_data_url(mime, &bytes))
}

/// Completion of one image read
#[derive(Debug)]
pub struct ImageReadOutcome {
    pub section_id: String,
    pub result: Result<String, ImageError>,
}

/// Background reader for picked image files
pub struct ImageLoader {
    runtime: Runtime,
    tx: UnboundedSender<ImageReadOutcome>,
    rx: UnboundedReceiver<ImageReadOutcome>,
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl ImageLoader {
    /// Create a loader. `notify` runs after every completion, e.g. to wake
    /// the UI.
    pub fn new(notify: impl Fn() + Send + Sync + 'static) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("image-reader")
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            runtime,
            tx,
            rx,
            notify: Arc::new(notify),
        })
    }

    /// Start reading `path` for the section `section_id`
    pub fn request(&self, section_id: impl Into<String>, path: PathBuf) {
        let section_id = section_id.into();
        let tx = self.tx.clone();
        let notify = Arc::clone(&self.notify);

        tracing::debug!("Reading image {} for {}", path.display(), section_id);
        self.runtime.spawn(async move {
            let result = read_as_data_url(&path).await;
            // The receiver lives as long as the loader
            let _ = tx.send(ImageReadOutcome { section_id, result });
            notify();
        });
    }

    /// Drain completed reads
    pub fn poll(&mut self) -> Vec<ImageReadOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            outcomes.push(outcome);
        }
        outcomes
    }
}
