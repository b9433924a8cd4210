use std::fmt;
use std::path::PathBuf;

use archive_core::{PostReference, PostStatus, RunSummary};

/// Progress notifications emitted while a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ListingPageScanned {
        page: usize,
        url: String,
        rows: usize,
        matched: usize,
    },
    LinksCollected {
        total: usize,
    },
    PostFinished {
        /// 1-based position of the post among the collected references.
        position: usize,
        total: usize,
        reference: PostReference,
        outcome: ArchiveOutcome,
    },
    MediaFailed {
        url: String,
        message: String,
    },
    RunFinished(RunSummary),
    RunAborted {
        reason: String,
    },
}

/// Result of archiving one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutcome {
    pub status: PostStatus,
    pub title: Option<String>,
    pub path: Option<PathBuf>,
    pub detail: String,
    pub media: MediaReport,
}

impl ArchiveOutcome {
    pub(crate) fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: PostStatus::Failed,
            title: None,
            path: None,
            detail: detail.into(),
            media: MediaReport::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaReport {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// `img` elements are photos; every other media element is filed as video.
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("img") {
            MediaKind::Photo
        } else {
            MediaKind::Video
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }
}

/// A media element found in a post body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Source as written in the page; `None` when the element has no `src`.
    pub source: Option<String>,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    InvalidSelector,
    NoPageLoaded,
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::InvalidSelector => write!(f, "invalid selector"),
            FailureKind::NoPageLoaded => write!(f, "no page loaded"),
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
