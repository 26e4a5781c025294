//! End-to-end runs against a mock news site

use crate::common::*;
use kiosque::output::{JsonOutputSink, OutputSink, TerminationReason};
use kiosque::storage::{JsonProgressStore, ProgressStore};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn urls(orchestrator: &kiosque::Orchestrator) -> Vec<String> {
    orchestrator
        .results()
        .records(CATEGORY)
        .iter()
        .map(|r| r.url.clone())
        .collect()
}

#[tokio::test]
async fn test_records_follow_listing_order() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1, 2, 3, 4]).await;
    mount_listing(&server, 2, &[5, 6]).await;

    // Earlier articles answer later, so completion order differs from listing order
    mount_article_with_delay(&server, 1, "18.05.2024", Duration::from_millis(150)).await;
    mount_article_with_delay(&server, 2, "18.05.2024", Duration::from_millis(100)).await;
    mount_article_with_delay(&server, 3, "18.05.2024", Duration::from_millis(50)).await;
    for id in 4..=6 {
        mount_article(&server, id, "18.05.2024").await;
    }

    let expected: Vec<String> = (1..=6).map(|id| article_url(&server, id)).collect();

    let first_dir = tempfile::tempdir().unwrap();
    let mut first = fresh_orchestrator(config(&server, first_dir.path(), SiteOptions::default()));
    let summary = first.run_once_at(now()).await;
    assert_eq!(summary.new_articles(), 6);
    assert_eq!(urls(&first), expected);

    let second_dir = tempfile::tempdir().unwrap();
    let mut second = fresh_orchestrator(config(&server, second_dir.path(), SiteOptions::default()));
    second.run_once_at(now()).await;
    assert_eq!(urls(&second), expected);
}

#[tokio::test]
async fn test_record_fields_and_snapshot_file() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1]).await;
    mount_article(&server, 1, "18.05.2024").await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path(), SiteOptions::default());
    let articles_path = dir.path().join("leaders.json");
    let mut orchestrator = persistent_orchestrator(config);
    let summary = orchestrator.run_once_at(now()).await;

    assert_eq!(summary.categories[0].pages, 1);
    assert_eq!(
        summary.categories[0].termination,
        Some(TerminationReason::ListingUnavailable)
    );

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&articles_path).unwrap()).unwrap();
    assert_eq!(raw["journal_info"]["name"], "Leaders");

    let record = &raw["articles"][CATEGORY][0];
    assert_eq!(record["url"], article_url(&server, 1));
    assert_eq!(record["title"], "Article 1");
    assert_eq!(record["author"], "Leaders");
    assert_eq!(record["date_of_publication"], "Opinions - 18.05.2024");
    assert_eq!(record["published_at"], "2024-05-18T00:00:00");
    assert_eq!(record["content"], "Contenu de Article 1.");
}

#[tokio::test]
async fn test_empty_listing_ends_the_walk() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1]).await;
    mount_listing(&server, 2, &[]).await;
    mount_article(&server, 1, "18.05.2024").await;

    // Page 3 exists but must not be requested
    Mock::given(method("GET"))
        .and(path("/opinions"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[article_path(2)])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, dir.path(), SiteOptions::default());
    let progress_path = dir.path().join("leaders.progress.json");
    let mut orchestrator = persistent_orchestrator(config);
    let summary = orchestrator.run_once_at(now()).await;

    let category = &summary.categories[0];
    assert_eq!(category.termination, Some(TerminationReason::EmptyListing));
    assert_eq!(category.last_page, Some(1));
    assert_eq!(urls(&orchestrator), vec![article_url(&server, 1)]);

    let progress = JsonProgressStore::open(&progress_path).load(CATEGORY);
    assert!(progress.cursor.exhausted);
    assert_eq!(progress.cursor.resume_page(), 1);
}

#[tokio::test]
async fn test_one_unreachable_article_does_not_affect_the_others() {
    let server = MockServer::start().await;

    let mut hrefs: Vec<String> = (1..=9).map(article_path).collect();
    hrefs.insert(4, "http://127.0.0.1:1/article/unreachable".to_string());
    Mock::given(method("GET"))
        .and(path("/opinions"))
        .and(NoQuery)
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&hrefs)))
        .mount(&server)
        .await;
    for id in 1..=9 {
        mount_article(&server, id, "18.05.2024").await;
    }

    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = fresh_orchestrator(config(&server, dir.path(), SiteOptions::default()));
    let summary = orchestrator.run_once_at(now()).await;

    assert_eq!(summary.new_articles(), 9);
    assert_eq!(summary.categories[0].totals.failed, 1);
    let expected: Vec<String> = (1..=9).map(|id| article_url(&server, id)).collect();
    assert_eq!(urls(&orchestrator), expected);
}

#[tokio::test]
async fn test_stale_page_ends_the_walk() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1, 2]).await;
    mount_listing(&server, 2, &[3, 4]).await;
    mount_article(&server, 1, "19.05.2024").await;
    mount_article(&server, 2, "15.05.2024").await;
    mount_article(&server, 3, "02.01.2024").await;
    mount_article(&server, 4, "01.01.2024").await;

    // Page 3 exists but must not be requested
    Mock::given(method("GET"))
        .and(path("/opinions"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[article_path(5)])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = SiteOptions {
        freshness_window_days: Some(10),
        ..SiteOptions::default()
    };
    let mut orchestrator = fresh_orchestrator(config(&server, dir.path(), options));
    let summary = orchestrator.run_once_at(now()).await;

    let category = &summary.categories[0];
    assert_eq!(category.termination, Some(TerminationReason::FreshnessWindow));
    assert_eq!(category.last_page, Some(2));
    assert_eq!(category.totals.stale, 2);
    assert_eq!(
        urls(&orchestrator),
        vec![article_url(&server, 1), article_url(&server, 2)]
    );
}

#[tokio::test]
async fn test_article_on_window_boundary_is_kept() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1, 2]).await;
    mount_article(&server, 1, "10.05.2024").await;
    mount_article(&server, 2, "09.05.2024").await;

    let dir = tempfile::tempdir().unwrap();
    let options = SiteOptions {
        freshness_window_days: Some(10),
        ..SiteOptions::default()
    };
    let mut orchestrator = fresh_orchestrator(config(&server, dir.path(), options));
    let summary = orchestrator.run_once_at(now()).await;

    assert_eq!(summary.categories[0].totals.stale, 1);
    assert_eq!(urls(&orchestrator), vec![article_url(&server, 1)]);
}

#[tokio::test]
async fn test_stale_articles_dropped_within_a_fresh_page() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1, 2, 3]).await;
    mount_article(&server, 1, "19.05.2024").await;
    mount_article(&server, 2, "01.03.2024").await;
    mount_article(&server, 3, "not a date").await;

    let dir = tempfile::tempdir().unwrap();
    let options = SiteOptions {
        freshness_window_days: Some(10),
        ..SiteOptions::default()
    };
    let mut orchestrator = fresh_orchestrator(config(&server, dir.path(), options));
    orchestrator.run_once_at(now()).await;

    // An unparsable date keeps the article
    assert_eq!(
        urls(&orchestrator),
        vec![article_url(&server, 1), article_url(&server, 3)]
    );
    assert_eq!(orchestrator.results().records(CATEGORY)[1].published_at, None);
}

#[tokio::test]
async fn test_retry_status_recovers() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1]).await;
    Mock::given(method("GET"))
        .and(path(article_path(1)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_article(&server, 1, "18.05.2024").await;

    let dir = tempfile::tempdir().unwrap();
    let options = SiteOptions {
        retry_statuses: vec![503],
        ..SiteOptions::default()
    };
    let mut orchestrator = fresh_orchestrator(config(&server, dir.path(), options));
    let summary = orchestrator.run_once_at(now()).await;

    assert_eq!(summary.new_articles(), 1);
}

#[tokio::test]
async fn test_error_status_skips_article_without_retry() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1, 2]).await;
    Mock::given(method("GET"))
        .and(path(article_path(1)))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_article(&server, 2, "18.05.2024").await;

    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = fresh_orchestrator(config(&server, dir.path(), SiteOptions::default()));
    let summary = orchestrator.run_once_at(now()).await;

    assert_eq!(summary.new_articles(), 1);
    assert_eq!(summary.categories[0].totals.failed, 1);
    assert_eq!(urls(&orchestrator), vec![article_url(&server, 2)]);
}

#[tokio::test]
async fn test_page_limit_caps_the_walk() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1]).await;
    mount_listing(&server, 2, &[2]).await;
    mount_listing(&server, 3, &[3]).await;
    for id in 1..=3 {
        mount_article(&server, id, "18.05.2024").await;
    }

    let dir = tempfile::tempdir().unwrap();
    let options = SiteOptions {
        max_pages: Some(2),
        ..SiteOptions::default()
    };
    let mut orchestrator = fresh_orchestrator(config(&server, dir.path(), options));
    let summary = orchestrator.run_once_at(now()).await;

    assert_eq!(summary.categories[0].termination, Some(TerminationReason::PageLimit));
    assert_eq!(summary.new_articles(), 2);
}

#[tokio::test]
async fn test_fresh_run_does_not_preload_snapshot() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1]).await;
    mount_article(&server, 1, "18.05.2024").await;

    let dir = tempfile::tempdir().unwrap();
    let mut first = persistent_orchestrator(config(&server, dir.path(), SiteOptions::default()));
    first.run_once_at(now()).await;

    let mut fresh =
        kiosque::Orchestrator::from_config(config(&server, dir.path(), SiteOptions::default()), true)
            .unwrap();
    let summary = fresh.run_once_at(now()).await;

    // Article 1 is scraped again and written once
    assert_eq!(summary.new_articles(), 1);
    let snapshot = JsonOutputSink::new(&dir.path().join("leaders.json")).load();
    assert_eq!(snapshot.records(CATEGORY).len(), 1);
}
