use std::path::{Path, PathBuf};

use archive_core::{PostReference, PostStatus};
use archive_logging::{archive_error, archive_info, archive_warn};
use thiserror::Error;

use crate::filename::sanitize;
use crate::media::{MediaFetcher, MediaOptions};
use crate::persist::{ensure_output_dir, AtomicFileWriter, PersistError};
use crate::post::{extract_post, render_post_markdown, PostRecord};
use crate::selectors::ForumSelectors;
use crate::session::PageSession;
use crate::{ArchiveOutcome, FetchError, MediaKind, MediaReport, ProgressSink};

pub const POST_FILENAME: &str = "post.md";
/// Written last; holds the post URL.
pub const COMPLETE_MARKER: &str = ".complete";
const UNTITLED: &str = "untitled";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("element `{0}` not found on post page")]
    MissingElement(String),
    #[error("invalid publish timestamp `{0}`")]
    InvalidTimestamp(String),
    #[error("could not write archive: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    pub archive_root: PathBuf,
    pub selectors: ForumSelectors,
    pub media: MediaOptions,
    /// Re-archive directories that exist but lack the completion marker.
    pub resume_incomplete: bool,
}

impl ArchiveSettings {
    pub fn new(archive_root: impl Into<PathBuf>) -> Self {
        Self {
            archive_root: archive_root.into(),
            selectors: ForumSelectors::default(),
            media: MediaOptions::default(),
            resume_incomplete: false,
        }
    }
}

/// `root/author/YYYY/MM/title`, each free-text segment sanitized.
pub fn post_dir(archive_root: &Path, author: &str, record: &PostRecord) -> PathBuf {
    let title = sanitize(&record.title);
    let title = if title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        title
    };
    archive_root
        .join(sanitize(author))
        .join(record.year())
        .join(record.month())
        .join(title)
}

pub struct PostArchiver<'a> {
    settings: &'a ArchiveSettings,
    media: MediaFetcher,
}

impl<'a> PostArchiver<'a> {
    pub fn new(settings: &'a ArchiveSettings) -> Self {
        Self {
            settings,
            media: MediaFetcher::new(settings.media),
        }
    }

    /// Archive one reference. Errors never escape: they become a `Failed`
    /// outcome so the caller can move on to the next reference.
    pub async fn archive(
        &self,
        session: &mut dyn PageSession,
        reference: &PostReference,
        sink: &dyn ProgressSink,
    ) -> ArchiveOutcome {
        match self.try_archive(session, reference, sink).await {
            Ok(outcome) => outcome,
            Err(err) => {
                archive_error!("Failed to archive {}: {}", reference.url, err);
                ArchiveOutcome::failed(err.to_string())
            }
        }
    }

    async fn try_archive(
        &self,
        session: &mut dyn PageSession,
        reference: &PostReference,
        sink: &dyn ProgressSink,
    ) -> Result<ArchiveOutcome, ArchiveError> {
        session.navigate(&reference.url).await?;
        let page = extract_post(
            &session.document()?,
            &reference.author,
            &self.settings.selectors,
        )?;
        let page_url = session.current_url().map(String::from);

        let dir = post_dir(&self.settings.archive_root, &reference.author, &page.record);
        if dir.exists() {
            if !self.settings.resume_incomplete || dir.join(COMPLETE_MARKER).is_file() {
                return Ok(ArchiveOutcome {
                    status: PostStatus::Skipped,
                    title: Some(page.record.title),
                    path: Some(dir),
                    detail: "already archived".to_string(),
                    media: MediaReport::default(),
                });
            }
            archive_info!("Resuming incomplete archive {}", dir.display());
        }

        ensure_output_dir(&dir)?;
        for kind in [MediaKind::Photo, MediaKind::Video] {
            ensure_output_dir(&dir.join(kind.dir_name()))?;
        }

        let writer = AtomicFileWriter::new(dir.clone());
        writer.write(
            POST_FILENAME,
            render_post_markdown(&page.record, &page.body_markdown),
        )?;

        let media = self
            .media
            .fetch_media(&*session, &page.media, page_url.as_deref(), &dir, sink)
            .await;

        // post.md and the media are on disk; a missing marker only matters
        // for resume_incomplete.
        if let Err(err) = writer.write(COMPLETE_MARKER, &reference.url) {
            archive_warn!("Could not mark {} complete: {}", dir.display(), err);
        }
        archive_info!(
            "Archived {} to {} ({} media saved, {} failed)",
            reference.url,
            dir.display(),
            media.saved,
            media.failed
        );

        Ok(ArchiveOutcome {
            status: PostStatus::Created,
            title: Some(page.record.title),
            path: Some(dir),
            detail: String::new(),
            media,
        })
    }
}
