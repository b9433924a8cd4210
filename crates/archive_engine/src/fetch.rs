use std::time::Duration;

use archive_logging::{archive_debug, archive_trace};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use scraper::Html;
use tokio::time::Instant;

use crate::decode::decode_html;
use crate::selectors::parse_selector;
use crate::session::PageSession;
use crate::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Bound on loading one page, body included.
    pub navigation_timeout: Duration,
    /// Bound on waiting for a selector to appear.
    pub selector_timeout: Duration,
    /// Pause between page reloads while waiting for a selector.
    pub poll_interval: Duration,
    /// Bound on downloading one media item.
    pub media_timeout: Duration,
    pub redirect_limit: usize,
    pub max_page_bytes: u64,
    pub max_media_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(60),
            selector_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
            media_timeout: Duration::from_secs(60),
            redirect_limit: 5,
            max_page_bytes: 5 * 1024 * 1024,
            max_media_bytes: 100 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
        }
    }
}

impl FetchSettings {
    /// Apply one bound to navigation, selector waits and media downloads.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self.selector_timeout = timeout;
        self.media_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
struct LoadedPage {
    url: String,
    html: String,
}

/// [`PageSession`] over plain HTTP: pages are fetched with `reqwest` and
/// parsed with `scraper`.
///
/// Waiting for a selector reloads the current page every `poll_interval`
/// until the element shows up or `selector_timeout` elapses.
#[derive(Debug)]
pub struct HttpPageSession {
    settings: FetchSettings,
    client: reqwest::Client,
    current: Option<LoadedPage>,
}

impl HttpPageSession {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let redirect_limit = settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.navigation_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            client,
            current: None,
        })
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = essence(content_type);
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    async fn load(&self, url: &str) -> Result<LoadedPage, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{url}: {err}")))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{url}: {status}"),
            ));
        }

        let final_url = response.url().to_string();
        let content_type = header_content_type(&response);
        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let bytes = read_body(response, self.settings.max_page_bytes).await?;
        let decoded = decode_html(&bytes, content_type.as_deref());
        if decoded.lossy {
            archive_debug!(
                "Page {} decoded lossily as {}",
                final_url,
                decoded.encoding_label
            );
        }
        archive_trace!("Loaded {} ({} bytes)", final_url, bytes.len());

        Ok(LoadedPage {
            url: final_url,
            html: decoded.html,
        })
    }

    fn current_page(&self) -> Result<&LoadedPage, FetchError> {
        self.current
            .as_ref()
            .ok_or_else(|| FetchError::new(FailureKind::NoPageLoaded, "navigate first"))
    }
}

#[async_trait::async_trait]
impl PageSession for HttpPageSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        let page = self.load(url).await?;
        self.current = Some(page);
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str) -> Result<(), FetchError> {
        let deadline = Instant::now() + self.settings.selector_timeout;
        loop {
            let page = self.current_page()?;
            if page_matches(&page.html, selector)? {
                return Ok(());
            }
            let url = page.url.clone();

            let now = Instant::now();
            if now >= deadline {
                return Err(FetchError::new(
                    FailureKind::Timeout,
                    format!(
                        "`{selector}` did not appear on {url} within {:?}",
                        self.settings.selector_timeout
                    ),
                ));
            }
            tokio::time::sleep(self.settings.poll_interval.min(deadline - now)).await;

            match self.load(&url).await {
                Ok(page) => self.current = Some(page),
                Err(err) => archive_debug!("Reload of {} while waiting failed: {}", url, err),
            }
        }
    }

    fn document(&self) -> Result<Html, FetchError> {
        Ok(Html::parse_document(&self.current_page()?.html))
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|page| page.url.as_str())
    }

    async fn request_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{url}: {err}")))?;

        let response = self
            .client
            .get(parsed)
            .timeout(self.settings.media_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{url}: {status}"),
            ));
        }

        // An HTML body here is an error or login page, not the media itself.
        if let Some(ct) = header_content_type(&response) {
            if essence(&ct).eq_ignore_ascii_case("text/html") {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType { content_type: ct },
                    "expected media, got an html page",
                ));
            }
        }

        read_body(response, self.settings.max_media_bytes).await
    }
}

fn page_matches(html: &str, selector: &str) -> Result<bool, FetchError> {
    let selector = parse_selector(selector)?;
    let doc = Html::parse_document(html);
    let found = doc.select(&selector).next().is_some();
    Ok(found)
}

fn essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}

fn header_content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

async fn read_body(response: reqwest::Response, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(FetchError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(content_len),
                },
                "response too large",
            ));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(FetchError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(next_len),
                },
                "response too large",
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
