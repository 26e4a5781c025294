//! Progress persistence across runs

use crate::common::*;
use kiosque::output::{JsonOutputSink, OutputSink, TerminationReason};
use kiosque::state::{PaginationCursor, SeenUrlSet};
use kiosque::storage::{JsonProgressStore, ProgressStore};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn progress_path(dir: &std::path::Path) -> std::path::PathBuf {
    dir.join("leaders.progress.json")
}

#[tokio::test]
async fn test_second_run_finds_nothing_new() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1, 2]).await;
    mount_article(&server, 1, "18.05.2024").await;
    mount_article(&server, 2, "18.05.2024").await;

    let dir = tempfile::tempdir().unwrap();
    let first = persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()))
        .run_once_at(now())
        .await;
    assert_eq!(first.new_articles(), 2);

    let progress_after_first = std::fs::read_to_string(progress_path(dir.path())).unwrap();

    let mut orchestrator = persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()));
    let second = orchestrator.run_once_at(now()).await;

    assert_eq!(second.new_articles(), 0);
    assert_eq!(second.categories[0].termination, Some(TerminationReason::AllSeen));
    assert_eq!(orchestrator.results().records(CATEGORY).len(), 2);
    assert_eq!(
        std::fs::read_to_string(progress_path(dir.path())).unwrap(),
        progress_after_first
    );
}

#[tokio::test]
async fn test_prepopulated_seen_set_leaves_cursor_unchanged() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1, 2, 3]).await;
    for id in 1..=3 {
        Mock::given(method("GET"))
            .and(path(article_path(id)))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let mut seen = SeenUrlSet::new();
    for id in 1..=3 {
        seen.insert_if_absent(&url(&article_url(&server, id)));
    }
    let mut store = JsonProgressStore::open(&progress_path(dir.path()));
    store
        .save(CATEGORY, &seen, &PaginationCursor::default())
        .unwrap();

    let summary = persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()))
        .run_once_at(now())
        .await;

    assert_eq!(summary.new_articles(), 0);
    let progress = JsonProgressStore::open(&progress_path(dir.path())).load(CATEGORY);
    assert_eq!(progress.cursor, PaginationCursor::default());
    assert_eq!(progress.seen, seen);
}

#[tokio::test]
async fn test_seen_then_not_found_then_fresh() {
    let server = MockServer::start().await;
    // A = 1 (already seen), B = 2 (404), C = 3 (fresh)
    mount_listing(&server, 1, &[1, 2, 3]).await;
    Mock::given(method("GET"))
        .and(path(article_path(1)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(article_path(2)))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_article(&server, 3, "18.05.2024").await;

    let dir = tempfile::tempdir().unwrap();
    let mut seen = SeenUrlSet::new();
    seen.insert_if_absent(&url(&article_url(&server, 1)));
    JsonProgressStore::open(&progress_path(dir.path()))
        .save(CATEGORY, &seen, &PaginationCursor::default())
        .unwrap();

    let mut orchestrator = persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()));
    let summary = orchestrator.run_once_at(now()).await;

    assert_eq!(summary.new_articles(), 1);
    assert_eq!(summary.categories[0].totals.not_found, 1);
    assert_eq!(summary.categories[0].totals.duplicates, 1);

    let records = orchestrator.results().records(CATEGORY);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, article_url(&server, 3));

    let progress = JsonProgressStore::open(&progress_path(dir.path())).load(CATEGORY);
    assert_eq!(progress.seen.len(), 3);
    for id in 1..=3 {
        assert!(progress.seen.contains(&url(&article_url(&server, id))));
    }
}

#[tokio::test]
async fn test_interrupted_walk_resumes_after_last_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/opinions"))
        .and(NoQuery)
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/opinions"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_listing(&server, 3, &[7]).await;
    mount_article(&server, 7, "18.05.2024").await;

    let dir = tempfile::tempdir().unwrap();
    let interrupted = PaginationCursor::interrupted_at(2);
    JsonProgressStore::open(&progress_path(dir.path()))
        .save(CATEGORY, &SeenUrlSet::new(), &interrupted)
        .unwrap();

    let summary = persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()))
        .run_once_at(now())
        .await;

    assert_eq!(summary.categories[0].first_page, Some(3));
    assert_eq!(summary.new_articles(), 1);

    // Page 4 does not exist, so the next walk starts over at page 1
    let progress = JsonProgressStore::open(&progress_path(dir.path())).load(CATEGORY);
    assert_eq!(progress.cursor.last_completed_page, 3);
    assert!(progress.cursor.exhausted);
    assert_eq!(progress.cursor.resume_page(), 1);
}

#[tokio::test]
async fn test_restarted_walk_keeps_deepest_page() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1]).await;
    mount_article(&server, 1, "18.05.2024").await;
    Mock::given(method("GET"))
        .and(path("/opinions"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let finished = PaginationCursor {
        last_completed_page: 7,
        walk_page: None,
        exhausted: true,
    };
    JsonProgressStore::open(&progress_path(dir.path()))
        .save(CATEGORY, &SeenUrlSet::new(), &finished)
        .unwrap();

    let summary = persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()))
        .run_once_at(now())
        .await;

    assert_eq!(summary.categories[0].first_page, Some(1));
    assert_eq!(summary.new_articles(), 1);

    let progress = JsonProgressStore::open(&progress_path(dir.path())).load(CATEGORY);
    assert_eq!(progress.cursor.last_completed_page, 7);
    assert_eq!(progress.cursor.walk_position(), 1);
    assert!(progress.cursor.exhausted);
    assert_eq!(progress.cursor.resume_page(), 1);
}

#[tokio::test]
async fn test_runs_append_to_snapshot() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1]).await;
    mount_article(&server, 1, "18.05.2024").await;

    let dir = tempfile::tempdir().unwrap();
    persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()))
        .run_once_at(now())
        .await;

    // The site publishes article 2 on top of page 1
    server.reset().await;
    mount_listing(&server, 1, &[2, 1]).await;
    mount_article(&server, 2, "19.05.2024").await;

    let summary = persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()))
        .run_once_at(now())
        .await;
    assert_eq!(summary.new_articles(), 1);
    assert_eq!(summary.total_articles, 2);

    let snapshot = JsonOutputSink::new(&dir.path().join("leaders.json")).load();
    let urls: Vec<&str> = snapshot
        .records(CATEGORY)
        .iter()
        .map(|r| r.url.as_str())
        .collect();
    assert_eq!(urls, vec![article_url(&server, 1), article_url(&server, 2)]);
}

#[tokio::test]
async fn test_snapshot_urls_count_as_seen_without_progress_file() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1]).await;
    mount_article(&server, 1, "18.05.2024").await;

    let dir = tempfile::tempdir().unwrap();
    persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()))
        .run_once_at(now())
        .await;

    // Losing the progress file must not duplicate records
    std::fs::write(progress_path(dir.path()), "{ not json").unwrap();

    let mut orchestrator = persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()));
    let summary = orchestrator.run_once_at(now()).await;

    assert_eq!(summary.new_articles(), 0);
    assert_eq!(orchestrator.results().records(CATEGORY).len(), 1);
}
