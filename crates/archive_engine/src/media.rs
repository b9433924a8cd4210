use std::path::Path;

use archive_logging::{archive_debug, archive_warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::filename::{media_filename, sanitize};
use crate::persist::AtomicFileWriter;
use crate::session::PageSession;
use crate::urls::resolve_url;
use crate::{EngineEvent, MediaItem, MediaKind, MediaReport, ProgressSink};

/// Which media kinds are downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaOptions {
    pub photos: bool,
    pub videos: bool,
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            photos: true,
            videos: true,
        }
    }
}

impl MediaOptions {
    fn wants(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Photo => self.photos,
            MediaKind::Video => self.videos,
        }
    }
}

/// Downloads a post's media into its `photo/` and `video/` directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaFetcher {
    options: MediaOptions,
}

impl MediaFetcher {
    pub fn new(options: MediaOptions) -> Self {
        Self { options }
    }

    /// Fetch every item in order, one at a time.
    ///
    /// Never fails: a download or write error is logged, reported to `sink`
    /// and counted, and the next item is attempted.
    pub async fn fetch_media(
        &self,
        session: &dyn PageSession,
        items: &[MediaItem],
        page_url: Option<&str>,
        post_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> MediaReport {
        let base = page_url.and_then(|url| Url::parse(url).ok());
        let mut report = MediaReport::default();

        for item in items {
            let Some(source) = item.source.as_deref() else {
                report.skipped += 1;
                continue;
            };
            if !self.options.wants(item.kind) {
                archive_debug!("Skipping {:?} {} (disabled)", item.kind, source);
                report.skipped += 1;
                continue;
            }

            match self.fetch_one(session, source, base.as_ref(), item.kind, post_dir).await {
                Ok(()) => report.saved += 1,
                Err(message) => {
                    archive_warn!("Media download failed {}: {}", source, message);
                    sink.emit(EngineEvent::MediaFailed {
                        url: source.to_string(),
                        message,
                    });
                    report.failed += 1;
                }
            }
        }
        report
    }

    async fn fetch_one(
        &self,
        session: &dyn PageSession,
        source: &str,
        base: Option<&Url>,
        kind: MediaKind,
        post_dir: &Path,
    ) -> Result<(), String> {
        let url = resolve_url(source, base).ok_or_else(|| "unresolvable source".to_string())?;
        let bytes = session
            .request_bytes(url.as_str())
            .await
            .map_err(|err| err.to_string())?;

        let filename = sanitize(&media_filename(&url));
        let writer = AtomicFileWriter::new(post_dir.join(kind.dir_name()));
        let path = writer
            .write(&filename, &bytes)
            .map_err(|err| err.to_string())?;
        archive_debug!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}
