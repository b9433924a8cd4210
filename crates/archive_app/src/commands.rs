use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context};
use archive_core::{PostReference, RunSummary};
use archive_engine::{
    collect_links, discover_authors, extract_post_author, run_pipeline, ForumSelectors,
    PageSession, ProgressSink,
};
use archive_logging::{archive_info, archive_warn};

use crate::config::ArchiverConfig;

/// What `follow` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowOutcome {
    pub author: String,
    /// False when the author was already followed; the config is then left
    /// untouched and no run is started.
    pub newly_followed: bool,
    pub run: Option<RunSummary>,
}

/// Run the full pipeline for exactly `authors`.
pub async fn archive_authors(
    session: &mut dyn PageSession,
    config: &ArchiverConfig,
    authors: &[String],
    sink: &dyn ProgressSink,
) -> anyhow::Result<RunSummary> {
    if authors.iter().all(|author| author.trim().is_empty()) {
        bail!("archive needs at least one author name");
    }
    let summary = run_pipeline(session, &config.pipeline_settings(), authors, sink).await?;
    Ok(summary)
}

/// Phase one only. Without explicit authors the followed list is used.
pub async fn list_links(
    session: &mut dyn PageSession,
    config: Option<&ArchiverConfig>,
    listing_url: &str,
    authors: &[String],
    sink: &dyn ProgressSink,
) -> anyhow::Result<Vec<PostReference>> {
    let filter: BTreeSet<String> = if authors.is_empty() {
        let config = config.context("no authors given and no config file to read them from")?;
        config.followed_authors.iter().cloned().collect()
    } else {
        authors.iter().cloned().collect()
    };

    let selectors = selectors_of(config);
    let references = collect_links(session, listing_url, &filter, &selectors, sink)
        .await
        .with_context(|| format!("collecting links from {listing_url}"))?;
    Ok(references)
}

pub async fn discover(
    session: &mut dyn PageSession,
    config: Option<&ArchiverConfig>,
    listing_url: &str,
    sink: &dyn ProgressSink,
) -> anyhow::Result<BTreeSet<String>> {
    let selectors = selectors_of(config);
    let authors = discover_authors(session, listing_url, &selectors, sink)
        .await
        .with_context(|| format!("discovering authors on {listing_url}"))?;
    Ok(authors)
}

/// Follow the author of `post_url` and archive them right away.
///
/// The config is saved before the run starts so a failed run still leaves the
/// author followed.
pub async fn follow(
    session: &mut dyn PageSession,
    config: &mut ArchiverConfig,
    config_path: &Path,
    post_url: &str,
    sink: &dyn ProgressSink,
) -> anyhow::Result<FollowOutcome> {
    let author = extract_post_author(session, post_url, &config.selectors)
        .await
        .with_context(|| format!("reading the author of {post_url}"))?;

    if !config.follow(&author) {
        archive_info!("{} is already followed", author);
        return Ok(FollowOutcome {
            author,
            newly_followed: false,
            run: None,
        });
    }
    config.save(config_path)?;
    archive_info!("Now following {}", author);

    let summary = archive_authors(session, config, std::slice::from_ref(&author), sink).await?;
    Ok(FollowOutcome {
        author,
        newly_followed: true,
        run: Some(summary),
    })
}

/// Archive every followed author. `None` when nobody is followed.
pub async fn update(
    session: &mut dyn PageSession,
    config: &ArchiverConfig,
    sink: &dyn ProgressSink,
) -> anyhow::Result<Option<RunSummary>> {
    if config.followed_authors.is_empty() {
        archive_warn!("No followed authors; nothing to update");
        return Ok(None);
    }
    archive_authors(session, config, &config.followed_authors, sink)
        .await
        .map(Some)
}

fn selectors_of(config: Option<&ArchiverConfig>) -> ForumSelectors {
    config
        .map(|config| config.selectors.clone())
        .unwrap_or_default()
}
