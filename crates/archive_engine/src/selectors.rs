use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::{FailureKind, FetchError};

/// CSS selectors describing where the forum keeps each piece of data.
///
/// Every field has a default matching the forum layout the archiver was built
/// against; a configuration file may override any subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForumSelectors {
    /// Container that signals the listing has rendered.
    pub listing_table: String,
    pub listing_row: String,
    /// Author cell, relative to a row.
    pub row_author: String,
    /// Post link, relative to a row.
    pub row_link: String,
    /// Visible text of the "next page" anchor.
    pub next_page_text: String,
    /// Class carried by the "next page" anchor on the last page.
    pub next_page_disabled_class: String,
    pub post_title: String,
    pub post_timestamp: String,
    pub post_timestamp_attr: String,
    pub post_body: String,
    /// Media elements, relative to the post body.
    pub post_media: String,
    /// Author name on a post page, used when following an author.
    pub post_author: String,
}

impl Default for ForumSelectors {
    fn default() -> Self {
        Self {
            listing_table: "#tbody".to_string(),
            listing_row: "#tbody tr".to_string(),
            row_author: ".bl".to_string(),
            row_link: "h3 > a".to_string(),
            next_page_text: "下一頁".to_string(),
            next_page_disabled_class: "gray".to_string(),
            post_title: "h4.f16".to_string(),
            post_timestamp: "span[data-timestamp]".to_string(),
            post_timestamp_attr: "data-timestamp".to_string(),
            post_body: "div.tpc_content#conttpc".to_string(),
            post_media: "img, video".to_string(),
            post_author: ".tr1.do_not_catch b".to_string(),
        }
    }
}

pub(crate) fn parse_selector(raw: &str) -> Result<Selector, FetchError> {
    Selector::parse(raw).map_err(|err| {
        FetchError::new(
            FailureKind::InvalidSelector,
            format!("invalid selector `{raw}`: {err:?}"),
        )
    })
}
