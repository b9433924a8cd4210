use archive_logging::archive_info;
use scraper::Html;
use thiserror::Error;

use crate::selectors::{parse_selector, ForumSelectors};
use crate::session::PageSession;
use crate::FetchError;

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("no author name found on {0}")]
    AuthorNotFound(String),
}

/// Read the author's name from a post page.
pub async fn extract_post_author(
    session: &mut dyn PageSession,
    post_url: &str,
    selectors: &ForumSelectors,
) -> Result<String, FollowError> {
    session.navigate(post_url).await?;
    session.wait_for_selector(&selectors.post_author).await?;

    let author = first_author(&session.document()?, &selectors.post_author)?
        .ok_or_else(|| FollowError::AuthorNotFound(post_url.to_string()))?;
    archive_info!("Post {} was written by {}", post_url, author);
    Ok(author)
}

fn first_author(doc: &Html, selector: &str) -> Result<Option<String>, FetchError> {
    let selector = parse_selector(selector)?;
    Ok(doc
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty()))
}
