use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use scraper::Html;

use crate::normalize::normalize_element;
use crate::selectors::{parse_selector, ForumSelectors};
use crate::{ArchiveError, MediaItem, MediaKind};

/// A post as read from its page. Lives only while the post is archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub title: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub body_html: String,
}

impl PostRecord {
    pub fn year(&self) -> String {
        self.published_at.year().to_string()
    }

    /// Two-digit month, `01` to `12`.
    pub fn month(&self) -> String {
        format!("{:02}", self.published_at.month())
    }

    /// Timestamp in the `post.md` header, e.g. `2023-11-14T22:13:20.000Z`.
    pub fn published_iso(&self) -> String {
        self.published_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Everything the archiver needs from a post page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostPage {
    pub record: PostRecord,
    pub body_markdown: String,
    pub media: Vec<MediaItem>,
}

/// Read title, timestamp, body and media elements from a post page. The
/// author is taken from the listing, not from the page.
pub(crate) fn extract_post(
    doc: &Html,
    author: &str,
    selectors: &ForumSelectors,
) -> Result<PostPage, ArchiveError> {
    let title_sel = parse_selector(&selectors.post_title)?;
    let timestamp_sel = parse_selector(&selectors.post_timestamp)?;
    let body_sel = parse_selector(&selectors.post_body)?;
    let media_sel = parse_selector(&selectors.post_media)?;

    let title = doc
        .select(&title_sel)
        .next()
        .ok_or_else(|| ArchiveError::MissingElement(selectors.post_title.clone()))?
        .text()
        .collect::<String>()
        .trim()
        .to_string();

    let raw_timestamp = doc
        .select(&timestamp_sel)
        .next()
        .and_then(|el| el.value().attr(&selectors.post_timestamp_attr))
        .ok_or_else(|| ArchiveError::MissingElement(selectors.post_timestamp.clone()))?;
    let published_at = parse_epoch_seconds(raw_timestamp)?;

    let body = doc
        .select(&body_sel)
        .next()
        .ok_or_else(|| ArchiveError::MissingElement(selectors.post_body.clone()))?;

    let media = body
        .select(&media_sel)
        .map(|el| MediaItem {
            source: el
                .value()
                .attr("src")
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .map(String::from),
            kind: MediaKind::from_tag(el.value().name()),
        })
        .collect();

    Ok(PostPage {
        record: PostRecord {
            title,
            author: author.to_string(),
            published_at,
            body_html: body.inner_html(),
        },
        body_markdown: normalize_element(body),
        media,
    })
}

pub(crate) fn parse_epoch_seconds(raw: &str) -> Result<DateTime<Utc>, ArchiveError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| ArchiveError::InvalidTimestamp(raw.to_string()))
}

/// Render `post.md`. The layout is read by other tools and must not drift.
pub fn render_post_markdown(record: &PostRecord, body_markdown: &str) -> String {
    format!(
        "## {title}\n\n**作者**: {author}\n**发布日期**: {published}\n\n---\n\n{body}",
        title = record.title,
        author = record.author,
        published = record.published_iso(),
        body = body_markdown,
    )
}
