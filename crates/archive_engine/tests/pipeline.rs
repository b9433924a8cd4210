mod common;

use archive_core::{PostStatus, RunSummary};
use archive_engine::{
    run_pipeline, ArchiveSettings, EngineEvent, FailureKind, NullProgressSink, PipelineError,
    PipelineSettings, RecordingProgressSink,
};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};
use wiremock::MockServer;

use common::{init_logging, listing_page, mount_html, mount_image, mount_status, post_page, session};

const TS: i64 = 1_700_000_000;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

fn settings(server: &MockServer, root: &TempDir) -> PipelineSettings {
    PipelineSettings {
        listing_url: format!("{}/list/1", server.uri()),
        archive: ArchiveSettings::new(root.path()),
    }
}

/// Two listing pages with three posts by Alice, one by Bob.
async fn forum(server: &MockServer) {
    let uri = server.uri();
    mount_html(
        server,
        "/list/1",
        listing_page(
            &[("Alice", "/post/1"), ("Bob", "/post/2"), ("Alice", "/post/3")],
            Some(&format!("{uri}/list/2")),
            false,
        ),
    )
    .await;
    mount_html(
        server,
        "/list/2",
        listing_page(&[("Alice", "/post/4")], None, false),
    )
    .await;

    mount_html(
        server,
        "/post/1",
        post_page("First", TS, &format!(r#"hello<img src="{uri}/img/1.jpg">"#)),
    )
    .await;
    mount_html(server, "/post/2", post_page("Bob's", TS, "bob")).await;
    mount_html(server, "/post/3", post_page("Third", TS - 86_400 * 60, "three")).await;
    mount_html(server, "/post/4", post_page("Fourth", TS, "four")).await;
}

#[tokio::test]
async fn run_archives_every_matching_post() {
    init_logging();
    let server = MockServer::start().await;
    forum(&server).await;
    mount_image(&server, "/img/1.jpg", b"one", 1).await;
    let root = tempdir().unwrap();

    let sink = RecordingProgressSink::new();
    let mut session = session();
    let summary = run_pipeline(&mut session, &settings(&server, &root), &names(&["Alice"]), &sink)
        .await
        .unwrap();

    assert_eq!(
        summary,
        RunSummary {
            found: 3,
            created: 3,
            skipped: 0,
            failed: 0,
        }
    );
    let alice = root.path().join("Alice");
    assert!(alice.join("2023/11/First/post.md").exists());
    assert!(alice.join("2023/09/Third/post.md").exists());
    assert!(alice.join("2023/11/Fourth/post.md").exists());
    assert!(!root.path().join("Bob").exists());

    let events = sink.take();
    let progress: Vec<(usize, usize)> = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::PostFinished {
                position, total, ..
            } => Some((*position, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    assert!(events.contains(&EngineEvent::LinksCollected { total: 3 }));
    assert_eq!(events.last(), Some(&EngineEvent::RunFinished(summary)));
}

#[tokio::test]
async fn second_run_creates_nothing_and_downloads_nothing() {
    let server = MockServer::start().await;
    forum(&server).await;
    // One download across both runs.
    mount_image(&server, "/img/1.jpg", b"one", 1).await;
    let root = tempdir().unwrap();
    let settings = settings(&server, &root);
    let mut session = session();

    let first = run_pipeline(&mut session, &settings, &names(&["Alice"]), &NullProgressSink)
        .await
        .unwrap();
    assert_eq!(first.created, 3);

    let second = run_pipeline(&mut session, &settings, &names(&["Alice"]), &NullProgressSink)
        .await
        .unwrap();
    assert_eq!(
        second,
        RunSummary {
            found: 3,
            created: 0,
            skipped: 3,
            failed: 0,
        }
    );
}

#[tokio::test]
async fn later_run_with_more_authors_adds_only_the_new_posts() {
    let server = MockServer::start().await;
    forum(&server).await;
    mount_image(&server, "/img/1.jpg", b"one", 1).await;
    let root = tempdir().unwrap();
    let settings = settings(&server, &root);
    let mut session = session();

    run_pipeline(&mut session, &settings, &names(&["Bob"]), &NullProgressSink)
        .await
        .unwrap();
    let summary = run_pipeline(
        &mut session,
        &settings,
        &names(&["Alice", "Bob"]),
        &NullProgressSink,
    )
    .await
    .unwrap();

    assert_eq!(summary.found, 4);
    assert_eq!(summary.created, 3);
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn broken_post_is_counted_and_the_rest_continue() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_html(
        &server,
        "/list/1",
        listing_page(
            &[("Alice", "/post/1"), ("Alice", "/post/2"), ("Alice", "/post/3")],
            None,
            false,
        ),
    )
    .await;
    mount_html(&server, "/post/1", post_page("One", TS, "1")).await;
    mount_status(&server, "/post/2", 500).await;
    mount_html(&server, "/post/3", post_page("Three", TS, "3")).await;
    let root = tempdir().unwrap();

    let sink = RecordingProgressSink::new();
    let mut session = session();
    let summary = run_pipeline(&mut session, &settings(&server, &root), &names(&["Alice"]), &sink)
        .await
        .unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(summary.failed, 1);

    let statuses: Vec<(String, PostStatus)> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::PostFinished {
                reference, outcome, ..
            } => Some((reference.url, outcome.status)),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            (format!("{uri}/post/1"), PostStatus::Created),
            (format!("{uri}/post/2"), PostStatus::Failed),
            (format!("{uri}/post/3"), PostStatus::Created),
        ]
    );
}

#[tokio::test]
async fn no_authors_aborts_before_any_request() {
    let server = MockServer::start().await;
    let root = tempdir().unwrap();

    let mut session = session();
    let err = run_pipeline(
        &mut session,
        &settings(&server, &root),
        &names(&["", "  "]),
        &NullProgressSink,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::NoAuthors));
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn unreachable_listing_aborts_the_run() {
    let server = MockServer::start().await;
    mount_status(&server, "/list/1", 503).await;
    let root = tempdir().unwrap();

    let sink = RecordingProgressSink::new();
    let mut session = session();
    let err = run_pipeline(&mut session, &settings(&server, &root), &names(&["Alice"]), &sink)
        .await
        .unwrap_err();

    match err {
        PipelineError::Collection(fetch) => assert_eq!(fetch.kind, FailureKind::HttpStatus(503)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        sink.take().last(),
        Some(EngineEvent::RunAborted { .. })
    ));
    assert!(!root.path().join("Alice").exists());
}
