//! Fetcher retry behavior and single-item operations

use crate::common::{chapter_page, detail_page, mount_item, mount_page, test_config};
use comic_sync::config::{FetcherConfig, RenderConfig};
use comic_sync::crawler::{FetchResult, Fetcher};
use comic_sync::storage::{SqliteStorage, Storage, StorageError};
use comic_sync::{Coordinator, Operation, Outcome, SyncError};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_fetcher(max_attempts: u32) -> Fetcher {
    let config = FetcherConfig {
        max_attempts,
        base_backoff_ms: 20,
        ..Default::default()
    };
    Fetcher::new(&config, None).unwrap()
}

#[tokio::test]
async fn test_retry_succeeds_after_transient_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fast_fetcher(5);
    let started = Instant::now();
    let result = fetcher.fetch(&format!("{}/flaky", server.uri())).await;

    // Two failures: 20ms + 40ms of backoff
    assert!(started.elapsed() >= Duration::from_millis(60));
    match result {
        FetchResult::Success {
            status_code, body, ..
        } => {
            assert_eq!(status_code, 200);
            assert_eq!(body, "finally");
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_exhausted_retries_are_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let result = fast_fetcher(3)
        .fetch(&format!("{}/down", server.uri()))
        .await;

    assert!(matches!(
        result,
        FetchResult::Unavailable { attempts: 3, ref error, .. } if error.contains("500")
    ));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = fast_fetcher(5)
        .fetch(&format!("{}/missing", server.uri()))
        .await;

    assert!(matches!(result, FetchResult::Unavailable { attempts: 1, .. }));
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let result = fast_fetcher(3)
        .fetch(&format!("{}/busy", server.uri()))
        .await;
    match result {
        FetchResult::Success { body, .. } => assert_eq!(body, "ok"),
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rendered_fetch_goes_through_proxy() {
    let server = MockServer::start().await;
    let target = url::Url::parse("https://comics.example.com/tim-truyen?page=4").unwrap();

    Mock::given(method("GET"))
        .and(path("/render"))
        .and(query_param("api_key", "secret"))
        .and(query_param("url", target.as_str()))
        .and(query_param("render", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("rendered"))
        .expect(1)
        .mount(&server)
        .await;

    let render = RenderConfig {
        endpoint: format!("{}/render", server.uri()),
        api_key: "secret".to_string(),
    };
    let fetcher = Fetcher::new(&FetcherConfig::default(), Some(render)).unwrap();

    let result = fetcher.fetch_rendered(&target).await;
    match result {
        FetchResult::Success { body, .. } => assert_eq!(body, "rendered"),
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_one_leaves_store_untouched() {
    let server = MockServer::start().await;
    mount_item(&server, "/truyen/solo", "Solo", 2).await;

    let store = SqliteStorage::open_in_memory("comics").unwrap();
    let coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();

    let record = coordinator
        .fetch_one(&format!("{}/truyen/solo", server.uri()))
        .await
        .unwrap();

    assert_eq!(record.item_path, "/truyen/solo");
    assert_eq!(record.title(), "Solo");
    assert_eq!(record.detail.genres, vec!["Action"]);
    assert_eq!(
        record.chapters.iter().map(|c| c.ordinal).collect::<Vec<_>>(),
        vec![2, 1]
    );
    assert_eq!(coordinator.store().count_items().unwrap(), 0);
}

#[tokio::test]
async fn test_fetch_one_with_save() {
    let server = MockServer::start().await;
    mount_item(&server, "/truyen/solo", "Solo", 1).await;

    let store = SqliteStorage::open_in_memory("comics").unwrap();
    let mut coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();
    let url = format!("{}/truyen/solo", server.uri());

    let outcome = coordinator
        .dispatch(Operation::FetchOne {
            url: url.clone(),
            save: true,
        })
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Item { saved: true, .. }));
    assert!(coordinator.store().find_item("/truyen/solo").unwrap().is_some());

    let again = coordinator
        .dispatch(Operation::FetchOne { url, save: true })
        .await;
    assert!(matches!(
        again,
        Err(SyncError::Storage(StorageError::Conflict(ref p))) if p == "/truyen/solo"
    ));
}

#[tokio::test]
async fn test_unnumbered_chapters_are_never_fetched() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/truyen/odd",
        detail_page(
            "Odd",
            &[
                ("Chapter 2", "/truyen/odd/chap-2"),
                ("Chapter 1.5", "/truyen/odd/chap-1-5"),
                ("Extra", "/truyen/odd/extra"),
            ],
        ),
    )
    .await;
    mount_page(
        &server,
        "/truyen/odd/chap-2",
        chapter_page(&["https://cdn.example.net/odd/2-1.jpg"]),
    )
    .await;
    for unfetched in ["/truyen/odd/chap-1-5", "/truyen/odd/extra"] {
        Mock::given(method("GET"))
            .and(path(unfetched))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
    }

    let store = SqliteStorage::open_in_memory("comics").unwrap();
    let coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();
    let record = coordinator
        .fetch_one(&format!("{}/truyen/odd", server.uri()))
        .await
        .unwrap();

    assert_eq!(record.episodes().len(), 3);
    assert_eq!(record.chapters.len(), 1);
    assert_eq!(record.chapters[0].ordinal, 2);
    assert_eq!(record.chapters[0].images, vec!["/odd/2-1.jpg"]);
}

#[tokio::test]
async fn test_fetch_chapter_by_number() {
    let server = MockServer::start().await;
    mount_item(&server, "/truyen/solo", "Solo", 3).await;

    let store = SqliteStorage::open_in_memory("comics").unwrap();
    let mut coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();
    let url = format!("{}/truyen/solo", server.uri());

    let outcome = coordinator
        .dispatch(Operation::FetchChapter {
            url: url.clone(),
            number: 2,
        })
        .await
        .unwrap();
    let Outcome::Chapter(chapter) = outcome else {
        panic!("expected a chapter");
    };
    assert_eq!(chapter.ordinal, 2);
    assert_eq!(
        chapter.images,
        vec!["/truyen/solo/2-1.jpg", "/truyen/solo/2-2.jpg"]
    );

    let missing = coordinator.fetch_chapter(&url, 9).await;
    assert!(matches!(
        missing,
        Err(SyncError::EpisodeNotFound { ref name, .. }) if name == "CHAPTER 9"
    ));
}

/// Item with six chapters whose pages each take 200ms to answer
async fn slow_chapter_site() -> MockServer {
    let server = MockServer::start().await;
    let links: Vec<(String, String)> = (1..=6)
        .rev()
        .map(|n| (format!("Chapter {}", n), format!("/truyen/slow/chap-{}", n)))
        .collect();
    let link_refs: Vec<(&str, &str)> = links
        .iter()
        .map(|(name, href)| (name.as_str(), href.as_str()))
        .collect();
    mount_page(&server, "/truyen/slow", detail_page("Slow", &link_refs)).await;

    for (_, href) in &links {
        Mock::given(method("GET"))
            .and(path(href.as_str()))
            .respond_with(
                chapter_page(&["https://cdn.example.net/slow/p.jpg"])
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    server
}

async fn timed_fetch(max_in_flight: usize) -> Duration {
    let server = slow_chapter_site().await;
    let mut config = test_config(&server.uri());
    config.pool.max_in_flight = max_in_flight;

    let store = SqliteStorage::open_in_memory("comics").unwrap();
    let coordinator = Coordinator::new(config, store).unwrap();

    let started = Instant::now();
    let record = coordinator
        .fetch_one(&format!("{}/truyen/slow", server.uri()))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(
        record.chapters.iter().map(|c| c.ordinal).collect::<Vec<_>>(),
        vec![6, 5, 4, 3, 2, 1]
    );
    elapsed
}

#[tokio::test]
async fn test_max_in_flight_bounds_chapter_fetches() {
    // Two at a time: three rounds of 200ms
    let bounded = timed_fetch(2).await;
    assert!(
        bounded >= Duration::from_millis(600),
        "six chapters two at a time took {:?}",
        bounded
    );

    // All six at once: a single round
    let unbounded = timed_fetch(6).await;
    assert!(
        unbounded < Duration::from_millis(600),
        "six chapters six at a time took {:?}",
        unbounded
    );
}
