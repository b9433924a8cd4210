use scraper::Html;

use crate::FetchError;

/// The page-fetch capability every component drives.
///
/// A session holds at most one loaded page and must be navigated serially;
/// `&mut self` on the navigation methods makes that a compile-time rule.
/// `document` hands out a freshly parsed copy of the current page, which
/// callers read synchronously and drop before their next `.await`.
#[async_trait::async_trait]
pub trait PageSession: Send + Sync {
    /// Load `url` as the current page, within the navigation timeout.
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError>;

    /// Wait until the current page contains an element matching `selector`,
    /// failing with [`crate::FailureKind::Timeout`] once the wait bound passes.
    async fn wait_for_selector(&mut self, selector: &str) -> Result<(), FetchError>;

    /// Parsed view of the current page.
    fn document(&self) -> Result<Html, FetchError>;

    /// URL of the current page after redirects.
    fn current_url(&self) -> Option<&str>;

    /// Download a resource referenced by the current page.
    async fn request_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
