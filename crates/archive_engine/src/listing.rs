use std::collections::{BTreeSet, HashSet};

use archive_core::PostReference;
use archive_logging::{archive_debug, archive_info, archive_warn};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::selectors::{parse_selector, ForumSelectors};
use crate::session::PageSession;
use crate::urls::resolve_url;
use crate::{EngineEvent, FetchError, ProgressSink};

/// One row of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListingRow {
    pub author: String,
    pub post_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ListingPage {
    rows: Vec<ListingRow>,
    next: Option<String>,
}

/// Walk every listing page from `listing_url` and return the posts written by
/// one of `authors`, in page-then-row order.
///
/// Rows are not de-duplicated: a row that shifts onto the next page between
/// loads is returned twice.
pub async fn collect_links(
    session: &mut dyn PageSession,
    listing_url: &str,
    authors: &BTreeSet<String>,
    selectors: &ForumSelectors,
    sink: &dyn ProgressSink,
) -> Result<Vec<PostReference>, FetchError> {
    if authors.is_empty() {
        return Ok(Vec::new());
    }

    let mut references = Vec::new();
    walk_listing(session, listing_url, selectors, sink, |rows| {
        let before = references.len();
        references.extend(
            rows.iter()
                .filter(|row| authors.contains(&row.author))
                .filter_map(|row| {
                    let url = row.post_url.as_ref()?;
                    Some(PostReference::new(row.author.clone(), url.clone()))
                }),
        );
        references.len() - before
    })
    .await?;

    archive_info!("Collected {} post links from {}", references.len(), listing_url);
    Ok(references)
}

/// Walk every listing page and return each distinct author seen.
pub async fn discover_authors(
    session: &mut dyn PageSession,
    listing_url: &str,
    selectors: &ForumSelectors,
    sink: &dyn ProgressSink,
) -> Result<BTreeSet<String>, FetchError> {
    let mut authors = BTreeSet::new();
    walk_listing(session, listing_url, selectors, sink, |rows| {
        let before = authors.len();
        authors.extend(rows.iter().map(|row| row.author.clone()));
        authors.len() - before
    })
    .await?;

    archive_info!("Discovered {} authors on {}", authors.len(), listing_url);
    Ok(authors)
}

/// Shared pagination: load, wait for the table, hand the rows to `on_page`,
/// follow the "next" control until it is missing, disabled, or leads back to
/// a page already seen.
async fn walk_listing<F>(
    session: &mut dyn PageSession,
    listing_url: &str,
    selectors: &ForumSelectors,
    sink: &dyn ProgressSink,
    mut on_page: F,
) -> Result<(), FetchError>
where
    F: FnMut(&[ListingRow]) -> usize + Send,
{
    session.navigate(listing_url).await?;

    let mut visited = HashSet::new();
    let mut page_no = 1;
    loop {
        session.wait_for_selector(&selectors.listing_table).await?;

        let current = session.current_url().unwrap_or(listing_url).to_string();
        visited.insert(current.clone());
        let base = Url::parse(&current).ok();
        let page = scan_listing(&session.document()?, base.as_ref(), selectors)?;

        let matched = on_page(&page.rows);
        archive_debug!(
            "Listing page {} ({}): {} rows, {} kept",
            page_no,
            current,
            page.rows.len(),
            matched
        );
        sink.emit(EngineEvent::ListingPageScanned {
            page: page_no,
            url: current,
            rows: page.rows.len(),
            matched,
        });

        match page.next {
            Some(next) if visited.contains(&next) => {
                archive_warn!("Next page {} was already visited; stopping", next);
                break;
            }
            Some(next) => {
                session.navigate(&next).await?;
                page_no += 1;
            }
            None => break,
        }
    }
    Ok(())
}

fn scan_listing(
    doc: &Html,
    base: Option<&Url>,
    selectors: &ForumSelectors,
) -> Result<ListingPage, FetchError> {
    let row_sel = parse_selector(&selectors.listing_row)?;
    let author_sel = parse_selector(&selectors.row_author)?;
    let link_sel = parse_selector(&selectors.row_link)?;

    let rows = doc
        .select(&row_sel)
        .filter_map(|row| {
            let author = first_text(row, &author_sel)?;
            let post_url = row
                .select(&link_sel)
                .next()
                .and_then(|link| link.value().attr("href"))
                .and_then(|href| resolve_url(href, base))
                .map(String::from);
            Some(ListingRow { author, post_url })
        })
        .collect();

    Ok(ListingPage {
        rows,
        next: next_page(doc, base, selectors)?,
    })
}

fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    let text = scope
        .select(selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

fn next_page(
    doc: &Html,
    base: Option<&Url>,
    selectors: &ForumSelectors,
) -> Result<Option<String>, FetchError> {
    let anchor_sel = parse_selector("a")?;
    let wanted = selectors.next_page_text.trim();
    let Some(anchor) = doc
        .select(&anchor_sel)
        .find(|a| a.text().collect::<String>().contains(wanted))
    else {
        return Ok(None);
    };

    let disabled = anchor
        .value()
        .classes()
        .any(|class| class == selectors.next_page_disabled_class);
    if disabled {
        return Ok(None);
    }

    Ok(anchor
        .value()
        .attr("href")
        .and_then(|href| resolve_url(href, base))
        .map(String::from))
}
