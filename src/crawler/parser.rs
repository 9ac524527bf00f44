//! Page parser for extracting structured records
//!
//! The `PageParser` trait is the seam between the crawl engine and the
//! site-specific markup rules. `HtmlPageParser` implements it for the target
//! site's markup with `scraper` selectors:
//!
//! | Page role | Required | Extracted |
//! |-----------|----------|-----------|
//! | Detail | title, chapter list container | banner, author, status, description, genres, episode index |
//! | Listing | items container | item URLs in page order |
//! | Chapter | reading container | image paths in reading order |

use crate::model::{EpisodeIndex, ItemDetail};
use crate::url::{resolve_path, resolve_url};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised while extracting a page
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot extract {0}")]
    Missing(&'static str),

    #[error("invalid selector '{0}'")]
    Selector(&'static str),
}

/// Extracts structured records from raw page content
pub trait PageParser: Send + Sync {
    /// Parses an item detail page
    fn parse_detail(&self, html: &str, page_url: &Url) -> Result<ItemDetail, ParseError>;

    /// Parses a listing page into absolute item URLs, in page order
    fn parse_listing(&self, html: &str, page_url: &Url) -> Result<Vec<String>, ParseError>;

    /// Parses a chapter page into image paths, in reading order
    fn parse_chapter_images(&self, html: &str, page_url: &Url)
        -> Result<Vec<String>, ParseError>;
}

/// Markup rules for the target site
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPageParser;

impl HtmlPageParser {
    pub fn new() -> Self {
        Self
    }
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css))
}

/// Text content with whitespace collapsed; None if blank
fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn first_text(document: &Html, css: &'static str) -> Result<Option<String>, ParseError> {
    let sel = selector(css)?;
    Ok(document.select(&sel).next().and_then(element_text))
}

impl PageParser for HtmlPageParser {
    fn parse_detail(&self, html: &str, page_url: &Url) -> Result<ItemDetail, ParseError> {
        let document = Html::parse_document(html);

        let title = first_text(&document, "h1.title-detail")?.ok_or(ParseError::Missing("title"))?;

        let banner = document
            .select(&selector("div.col-image img")?)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| resolve_path(page_url, src))
            .unwrap_or_default();

        let author = first_text(&document, "li.author p.col-xs-8")?.unwrap_or_default();
        let status = first_text(&document, "li.status p.col-xs-8")?.unwrap_or_default();
        let description = first_text(&document, "div.detail-content p")?;

        let genres = document
            .select(&selector("li.kind p.col-xs-8 a")?)
            .filter_map(element_text)
            .collect();

        let container = document
            .select(&selector("#nt_listchapter")?)
            .next()
            .ok_or(ParseError::Missing("chapter list"))?;

        let mut episodes = EpisodeIndex::new();
        for link in container.select(&selector("div.chapter a[href]")?) {
            let name = element_text(link);
            let path = link
                .value()
                .attr("href")
                .and_then(|href| resolve_path(page_url, href));
            if let (Some(name), Some(path)) = (name, path) {
                episodes.insert(&name, path);
            }
        }

        if episodes.is_empty() {
            tracing::warn!("No chapters listed on {}", page_url);
        }

        Ok(ItemDetail {
            title,
            banner,
            author,
            status,
            description,
            genres,
            episodes,
        })
    }

    fn parse_listing(&self, html: &str, page_url: &Url) -> Result<Vec<String>, ParseError> {
        let document = Html::parse_document(html);

        let container = document
            .select(&selector("div.ModuleContent div.items")?)
            .next()
            .ok_or(ParseError::Missing("item list"))?;

        let mut urls: Vec<String> = Vec::new();
        for link in container.select(&selector("div.item h3 a[href]")?) {
            let Some(url) = link
                .value()
                .attr("href")
                .and_then(|href| resolve_url(page_url, href))
            else {
                continue;
            };
            let url = url.to_string();
            if !urls.contains(&url) {
                urls.push(url);
            }
        }

        Ok(urls)
    }

    fn parse_chapter_images(
        &self,
        html: &str,
        page_url: &Url,
    ) -> Result<Vec<String>, ParseError> {
        let document = Html::parse_document(html);

        let container = document
            .select(&selector("div.reading-detail")?)
            .next()
            .ok_or(ParseError::Missing("reading container"))?;

        let images = container
            .select(&selector("div.page-chapter img")?)
            .filter_map(|img| {
                let value = img.value();
                value.attr("data-src").or_else(|| value.attr("src"))
            })
            .filter_map(|src| resolve_path(page_url, src))
            .collect();

        Ok(images)
    }
}
