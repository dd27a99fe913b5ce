//! Resource download collaborator
//!
//! Remote fonts are fetched by a [`ResourceLoader`] supplied by the host.
//! Completion callbacks may run on any thread; fonts only use them to post a
//! task onto the UI task queue.

use crate::TextError;

/// Bytes of a finished download
#[derive(Clone, PartialEq, Eq)]
pub struct Download {
    pub url: String,
    pub data: Vec<u8>,
}

impl Download {
    pub fn new(url: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("url", &self.url)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Handle to an in-flight download
pub trait DownloadRequest: Send {
    /// Stop the download. The completion callback must not run afterwards.
    fn cancel(&self);
}

/// Called once when a download finishes or fails
pub type DownloadCallback = Box<dyn FnOnce(Result<Download, TextError>) + Send + 'static>;

/// Fetches remote resources
pub trait ResourceLoader: Send + Sync {
    fn fetch(&self, url: &str, on_complete: DownloadCallback) -> Box<dyn DownloadRequest>;
}

/// Loader for hosts without network access; every fetch fails immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLoader;

struct CompletedRequest;

impl DownloadRequest for CompletedRequest {
    fn cancel(&self) {}
}

impl ResourceLoader for OfflineLoader {
    fn fetch(&self, url: &str, on_complete: DownloadCallback) -> Box<dyn DownloadRequest> {
        tracing::debug!("Offline loader rejecting fetch of {}", url);
        on_complete(Err(TextError::DownloadError(format!(
            "no network loader configured for {}",
            url
        ))));
        Box::new(CompletedRequest)
    }
}

/// Load state of a font resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceStatus {
    /// Not settled yet
    #[default]
    Pending,
    Ok,
    FileNotFound,
    DecodeFailure,
    NetworkError,
}

impl ResourceStatus {
    /// Numeric status code exposed to scripts; `None` while pending
    pub const fn code(self) -> Option<u32> {
        match self {
            ResourceStatus::Pending => None,
            ResourceStatus::Ok => Some(0),
            ResourceStatus::FileNotFound => Some(1),
            ResourceStatus::DecodeFailure => Some(2),
            ResourceStatus::NetworkError => Some(3),
        }
    }

    pub const fn is_settled(self) -> bool {
        !matches!(self, ResourceStatus::Pending)
    }
}

/// How a font load settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Resolved,
    Rejected(ResourceStatus),
}

impl LoadOutcome {
    pub const fn is_resolved(self) -> bool {
        matches!(self, LoadOutcome::Resolved)
    }
}

/// Whether a font url must go through the resource loader
pub fn is_remote_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
