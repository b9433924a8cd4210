#![allow(dead_code)]

use std::time::Duration;

use archive_engine::{FetchSettings, HttpPageSession};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn init_logging() {
    archive_logging::initialize_for_tests();
}

/// Short bounds so failing waits finish quickly.
pub fn fast_settings() -> FetchSettings {
    FetchSettings {
        navigation_timeout: Duration::from_secs(5),
        selector_timeout: Duration::from_millis(300),
        poll_interval: Duration::from_millis(50),
        media_timeout: Duration::from_secs(5),
        ..FetchSettings::default()
    }
}

pub fn session() -> HttpPageSession {
    HttpPageSession::new(fast_settings()).expect("http session")
}

/// A listing page in the forum's layout. `rows` are `(author, href)`.
pub fn listing_page(rows: &[(&str, &str)], next: Option<&str>, next_disabled: bool) -> String {
    let rows: String = rows
        .iter()
        .map(|(author, href)| {
            format!(
                r#"<tr class="tr3"><td><h3><a href="{href}">post</a></h3></td><td><a class="bl">{author}</a></td></tr>"#
            )
        })
        .collect();
    let pager = match next {
        Some(href) if next_disabled => format!(r#"<a class="gray" href="{href}">下一頁</a>"#),
        Some(href) => format!(r#"<a href="{href}">下一頁</a>"#),
        None => String::new(),
    };
    format!(
        r#"<html><body><table><tbody id="tbody">{rows}</tbody></table><div class="pages">{pager}</div></body></html>"#
    )
}

pub fn post_page(title: &str, timestamp: i64, body: &str) -> String {
    format!(
        r#"<html><body>
        <div class="tr1 do_not_catch"><b>author-on-page</b></div>
        <h4 class="f16">{title}</h4>
        <span data-timestamp="{timestamp}"></span>
        <div class="tpc_content do_not_catch" id="conttpc">{body}</div>
        </body></html>"#
    )
}

pub async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, at: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve image bytes and require exactly `times` downloads over the test.
pub async fn mount_image(server: &MockServer, at: &str, bytes: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(bytes.to_vec(), "image/jpeg"))
        .expect(times)
        .mount(server)
        .await;
}
