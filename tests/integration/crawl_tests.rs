//! Catalog discovery against a mock site

use crate::common::{
    blank_page, insert_corrupt_document, listing_page, mount_item, mount_listing, test_config,
};
use comic_sync::storage::{SqliteStorage, Storage};
use comic_sync::{Coordinator, Operation, Outcome};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn three_page_site() -> MockServer {
    let server = MockServer::start().await;

    mount_listing(&server, 1, listing_page(&["/truyen/alpha", "/truyen/beta"])).await;
    mount_listing(&server, 2, blank_page()).await;
    mount_listing(&server, 3, listing_page(&["/truyen/gamma"])).await;

    mount_item(&server, "/truyen/alpha", "Alpha", 2).await;
    mount_item(&server, "/truyen/beta", "Beta", 1).await;
    mount_item(&server, "/truyen/gamma", "Gamma", 3).await;

    server
}

#[tokio::test]
async fn test_discover_stores_new_items() {
    let server = three_page_site().await;
    let store = SqliteStorage::open_in_memory("comics").unwrap();
    let mut coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();

    let report = coordinator.discover_and_sync(1, 3).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_failed, 1, "page 2 has no item container");
    assert_eq!(
        report.inserted,
        vec!["/truyen/alpha", "/truyen/beta", "/truyen/gamma"]
    );
    assert_eq!(coordinator.store().count_items().unwrap(), 3);

    let gamma = coordinator.store().find_item("/truyen/gamma").unwrap().unwrap();
    assert_eq!(gamma.title(), "Gamma");
    assert_eq!(gamma.detail.author, "Test Author");
    assert_eq!(gamma.detail.banner, "/covers/Gamma.jpg");
    assert_eq!(gamma.episodes().len(), 3);
    assert_eq!(
        gamma.chapters.iter().map(|c| c.ordinal).collect::<Vec<_>>(),
        vec![3, 2, 1]
    );
    assert_eq!(
        gamma.chapters[0].images,
        vec!["/truyen/gamma/3-1.jpg", "/truyen/gamma/3-2.jpg"]
    );
}

#[tokio::test]
async fn test_rediscovery_inserts_nothing() {
    let server = three_page_site().await;
    let store = SqliteStorage::open_in_memory("comics").unwrap();
    let mut coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();

    let first = coordinator.discover_and_sync(1, 3).await.unwrap();
    assert_eq!(first.inserted.len(), 3);

    let second = coordinator.discover_and_sync(1, 3).await.unwrap();
    assert!(second.inserted.is_empty());
    assert_eq!(second.skipped_existing, 3);
    assert_eq!(coordinator.store().count_items().unwrap(), 3);
}

#[tokio::test]
async fn test_item_listed_twice_is_stored_once() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, listing_page(&["/truyen/alpha"])).await;
    mount_listing(&server, 2, listing_page(&["/truyen/alpha", "/truyen/beta"])).await;
    mount_item(&server, "/truyen/alpha", "Alpha", 1).await;
    mount_item(&server, "/truyen/beta", "Beta", 1).await;

    let store = SqliteStorage::open_in_memory("comics").unwrap();
    let mut coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();

    let report = coordinator.discover_and_sync(1, 2).await.unwrap();
    assert_eq!(report.inserted, vec!["/truyen/alpha", "/truyen/beta"]);
    assert_eq!(report.skipped_existing, 1);
    assert!(report.conflicts.is_empty());
}

#[tokio::test]
async fn test_failed_item_does_not_stop_the_page() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, listing_page(&["/truyen/broken", "/truyen/beta"])).await;
    mount_item(&server, "/truyen/beta", "Beta", 1).await;

    Mock::given(method("GET"))
        .and(path("/truyen/broken"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let store = SqliteStorage::open_in_memory("comics").unwrap();
    let mut coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();

    let outcome = coordinator
        .dispatch(Operation::Discover { start: 1, end: 1 })
        .await
        .unwrap();

    let Outcome::Discovery(report) = outcome else {
        panic!("expected a discovery report");
    };
    assert_eq!(report.failed_items, 1);
    assert_eq!(report.inserted, vec!["/truyen/beta"]);
}

#[tokio::test]
async fn test_discover_into_file_store_survives_restart() {
    let server = three_page_site().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("comics.db");

    let store = SqliteStorage::open(&db_path, "comics").unwrap();
    let mut coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();
    coordinator.discover_and_sync(1, 1).await.unwrap();
    coordinator.shutdown().unwrap();

    let store = SqliteStorage::open(&db_path, "comics").unwrap();
    let mut coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();
    let report = coordinator.discover_and_sync(1, 1).await.unwrap();

    assert!(report.inserted.is_empty());
    assert_eq!(report.skipped_existing, 2);
}

#[tokio::test]
async fn test_unreadable_stored_item_does_not_stop_discovery() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, listing_page(&["/truyen/alpha", "/truyen/beta"])).await;
    mount_item(&server, "/truyen/beta", "Beta", 1).await;

    Mock::given(method("GET"))
        .and(path("/truyen/alpha"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("comics.db");
    let store = SqliteStorage::open(&db_path, "comics").unwrap();
    insert_corrupt_document(&db_path, "/truyen/alpha");

    let mut coordinator = Coordinator::new(test_config(&server.uri()), store).unwrap();
    let report = coordinator.discover_and_sync(1, 1).await.unwrap();

    assert_eq!(report.items_seen, 2);
    assert_eq!(report.failed_items, 1);
    assert_eq!(report.inserted, vec!["/truyen/beta"]);
    assert_eq!(coordinator.store().count_items().unwrap(), 2);
}
