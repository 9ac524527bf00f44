//! Shared fixtures: configuration and page markup for the mock site

use comic_sync::config::Config;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration pointing at the mock server with short backoff
pub fn test_config(base_url: &str) -> Config {
    toml::from_str(&format!(
        r#"
        [site]
        base-url = "{}/"

        [fetcher]
        user-agent = "comic-sync-tests"
        max-attempts = 3
        base-backoff-ms = 20
        timeout-secs = 5

        [pool]
        max-in-flight = 4

        [store]
        path = ":memory:"
        "#,
        base_url
    ))
    .expect("test config parses")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// Detail page for `title` listing `(display name, href)` chapters
pub fn detail_page(title: &str, chapters: &[(&str, &str)]) -> ResponseTemplate {
    let links: String = chapters
        .iter()
        .map(|(name, href)| {
            format!(
                r#"<li class="row"><div class="col-xs-5 chapter"><a href="{}">{}</a></div></li>"#,
                href, name
            )
        })
        .collect();

    html(format!(
        r#"<html><body>
          <h1 class="title-detail">{title}</h1>
          <div class="col-xs-4 col-image"><img src="https://cdn.example.net/covers/{title}.jpg"></div>
          <ul class="list-info">
            <li class="author row"><p class="name">Author</p><p class="col-xs-8">Test Author</p></li>
            <li class="status row"><p class="name">Status</p><p class="col-xs-8">Ongoing</p></li>
            <li class="kind row"><p class="name">Genres</p><p class="col-xs-8"><a href="/g/action">Action</a></p></li>
          </ul>
          <div class="detail-content"><p>About {title}.</p></div>
          <div class="list-chapter" id="nt_listchapter"><ul>{links}</ul></div>
        </body></html>"#
    ))
}

/// Listing page linking to the given item paths
pub fn listing_page(item_paths: &[&str]) -> ResponseTemplate {
    let items: String = item_paths
        .iter()
        .map(|p| {
            format!(
                r#"<div class="item"><figure><figcaption><h3><a href="{}">{}</a></h3></figcaption></figure></div>"#,
                p, p
            )
        })
        .collect();

    html(format!(
        r#"<html><body><div class="ModuleContent"><div class="items">{}</div></div></body></html>"#,
        items
    ))
}

/// Chapter reading page with the given image URLs
pub fn chapter_page(images: &[&str]) -> ResponseTemplate {
    let pages: String = images
        .iter()
        .map(|src| format!(r#"<div class="page-chapter"><img data-src="{}"></div>"#, src))
        .collect();

    html(format!(
        r#"<html><body><div class="reading-detail box_doc">{}</div></body></html>"#,
        pages
    ))
}

/// A page the parser cannot extract anything from
pub fn blank_page() -> ResponseTemplate {
    html("<html><body><p>Loading...</p></body></html>".to_string())
}

pub async fn mount_listing(server: &MockServer, page: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/tim-truyen"))
        .and(query_param("page", page.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_page(server: &MockServer, page_path: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts an item with `count` numbered chapters, each with two images
pub async fn mount_item(server: &MockServer, item_path: &str, title: &str, count: u32) {
    let chapter_paths: Vec<(String, String)> = (1..=count)
        .rev()
        .map(|n| (format!("Chapter {}", n), format!("{}/chap-{}", item_path, n)))
        .collect();
    let links: Vec<(&str, &str)> = chapter_paths
        .iter()
        .map(|(name, href)| (name.as_str(), href.as_str()))
        .collect();

    mount_page(server, item_path, detail_page(title, &links)).await;

    for (n, (_, href)) in (1..=count).rev().zip(&chapter_paths) {
        let images = [
            format!("https://cdn.example.net{}/{}-1.jpg", item_path, n),
            format!("https://cdn.example.net{}/{}-2.jpg", item_path, n),
        ];
        let images: Vec<&str> = images.iter().map(String::as_str).collect();
        mount_page(server, href, chapter_page(&images)).await;
    }
}

/// Writes a row whose detail column is not valid JSON, next to whatever the
/// store at `db_path` already holds
pub fn insert_corrupt_document(db_path: &std::path::Path, item_path: &str) {
    let conn = rusqlite::Connection::open(db_path).expect("open store file");
    conn.execute(
        "INSERT INTO comics (item_path, title, detail, chapters, created_at, updated_at)
         VALUES (?1, 'Broken', 'not json', '[]', 'now', 'now')",
        [item_path],
    )
    .expect("insert corrupt row");
}
