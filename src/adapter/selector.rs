//! Configuration-driven adapter
//!
//! Every supported site is described by a `[site]` table of CSS selectors and
//! one `[[category]]` table per listing. Selectors are compiled once when the
//! adapter is built.

use crate::adapter::dates::parse_date;
use crate::adapter::{AdapterError, ArticleFields, ListingLink, SiteAdapter};
use crate::config::{CategoryConfig, Config, SiteConfig};
use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Author strings longer than this are page furniture, not a byline
const MAX_AUTHOR_LEN: usize = 100;

/// Links to these resources are not outbound article links
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];

/// Used when the configuration names no date selector
const FALLBACK_DATE_SELECTORS: &[(&str, &str)] = &[
    ("meta[property='article:published_time']", "content"),
    ("time[datetime]", "datetime"),
];

struct ListingTemplates {
    first_page: String,
    subsequent_pages: String,
}

/// Adapter built from the `[site]` and `[[category]]` configuration
pub struct SelectorAdapter {
    base_url: Url,
    freshness_window_days: Option<u32>,
    categories: HashMap<String, ListingTemplates>,
    listing_item: Selector,
    listing_link: Selector,
    title: Option<Selector>,
    author: Option<Selector>,
    author_prefix: Option<String>,
    strip_author_from_body: bool,
    date: Option<Selector>,
    date_attribute: Option<String>,
    date_formats: Vec<String>,
    fallback_dates: Vec<(Selector, &'static str)>,
    body: Option<Selector>,
    body_paragraph: Selector,
    links: Option<Selector>,
    any_link: Selector,
    title_from_url: bool,
}

impl SelectorAdapter {
    /// Builds the adapter for the configured site
    pub fn from_config(config: &Config) -> Result<Self, AdapterError> {
        Self::new(&config.site, &config.categories)
    }

    pub fn new(site: &SiteConfig, categories: &[CategoryConfig]) -> Result<Self, AdapterError> {
        let fallback_dates = FALLBACK_DATE_SELECTORS
            .iter()
            .map(|(selector, attr)| compile(selector).map(|s| (s, *attr)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base_url: Url::parse(&site.base_url)?,
            freshness_window_days: site.freshness_window_days,
            categories: categories
                .iter()
                .map(|c| {
                    (
                        c.name.clone(),
                        ListingTemplates {
                            first_page: c.first_page.clone(),
                            subsequent_pages: c.subsequent_pages.clone(),
                        },
                    )
                })
                .collect(),
            listing_item: compile(&site.listing_item_selector)?,
            listing_link: compile(&site.listing_link_selector)?,
            title: compile_optional(&site.title_selector)?,
            author: compile_optional(&site.author_selector)?,
            author_prefix: site.author_prefix.clone(),
            strip_author_from_body: site.strip_author_from_body,
            date: compile_optional(&site.date_selector)?,
            date_attribute: site.date_attribute.clone(),
            date_formats: site.date_formats.clone(),
            fallback_dates,
            body: compile_optional(&site.body_selector)?,
            body_paragraph: compile(&site.body_paragraph_selector)?,
            links: compile_optional(&site.links_selector)?,
            any_link: compile("a[href]")?,
            title_from_url: site.title_from_url,
        })
    }

    fn extract_title(&self, document: &Html) -> Option<String> {
        let selector = self.title.as_ref()?;
        document
            .select(selector)
            .map(|element| collect_text(&element))
            .find(|text| !text.is_empty())
    }

    /// Author element text as it appears on the page
    fn byline(&self, document: &Html) -> Option<String> {
        let selector = self.author.as_ref()?;
        document
            .select(selector)
            .map(|element| collect_text(&element))
            .find(|text| !text.is_empty())
    }

    fn extract_author(&self, byline: Option<String>) -> Option<String> {
        let text = byline?;
        let author = match &self.author_prefix {
            Some(prefix) => text
                .strip_prefix(prefix.as_str())
                .map(|rest| rest.trim_start_matches([':', ' ']).to_string())
                .unwrap_or(text),
            None => text,
        };

        if author.is_empty() || author.chars().count() > MAX_AUTHOR_LEN {
            None
        } else {
            Some(author)
        }
    }

    fn extract_date(&self, document: &Html) -> Option<String> {
        if let Some(selector) = &self.date {
            let element = document.select(selector).next()?;
            let raw = match &self.date_attribute {
                Some(attr) => element.value().attr(attr)?.trim().to_string(),
                None => collect_text(&element),
            };
            return Some(raw).filter(|raw| !raw.is_empty());
        }

        self.fallback_dates.iter().find_map(|(selector, attr)| {
            document
                .select(selector)
                .filter_map(|element| element.value().attr(attr))
                .map(str::trim)
                .find(|raw| !raw.is_empty())
                .map(str::to_string)
        })
    }

    fn extract_body(&self, body: Option<ElementRef<'_>>) -> Option<String> {
        let body = body?;
        let paragraphs: Vec<String> = body
            .select(&self.body_paragraph)
            .map(|p| collect_text(&p))
            .filter(|text| !text.is_empty())
            .collect();

        let text = if paragraphs.is_empty() {
            collect_text(&body)
        } else {
            paragraphs.join("\n")
        };

        Some(text).filter(|text| !text.is_empty())
    }

    fn extract_links(&self, document: &Html, body: Option<ElementRef<'_>>, url: &Url) -> Vec<String> {
        let anchors: Vec<ElementRef<'_>> = match (&self.links, body) {
            (Some(selector), _) => document.select(selector).collect(),
            (None, Some(body)) => body.select(&self.any_link).collect(),
            (None, None) => Vec::new(),
        };

        let mut seen = HashSet::new();
        anchors
            .into_iter()
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| resolve_link(href, url))
            .filter(|link| !is_image(link))
            .map(|link| link.to_string())
            .filter(|link| seen.insert(link.clone()))
            .collect()
    }
}

impl SiteAdapter for SelectorAdapter {
    fn listing_url(&self, category: &str, page: u32) -> Result<Url, AdapterError> {
        let templates = self
            .categories
            .get(category)
            .ok_or_else(|| AdapterError::MissingCategory(category.to_string()))?;

        let target = if page <= 1 {
            templates.first_page.clone()
        } else {
            templates
                .subsequent_pages
                .replace("{page}", &page.to_string())
        };

        self.base_url
            .join(&target)
            .map_err(|e| AdapterError::Template {
                template: target,
                message: e.to_string(),
            })
    }

    fn extract_listing_links(&self, html: &str) -> Vec<ListingLink> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        for item in document.select(&self.listing_item) {
            let anchor = item.select(&self.listing_link).next().or_else(|| {
                item.value().attr("href").map(|_| item)
            });

            let Some(anchor) = anchor else {
                continue;
            };

            let Some(url) = anchor
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, &self.base_url))
            else {
                continue;
            };

            let title_hint = anchor
                .value()
                .attr("title")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .or_else(|| Some(collect_text(&anchor)).filter(|t| !t.is_empty()));

            links.push(ListingLink { url, title_hint });
        }

        links
    }

    fn extract_article_fields(&self, html: &str, url: &Url) -> Result<ArticleFields, AdapterError> {
        let document = Html::parse_document(html);
        let body_element = self
            .body
            .as_ref()
            .and_then(|selector| document.select(selector).next());

        let title = self.extract_title(&document);
        let date_raw = self.extract_date(&document);
        let byline = self.byline(&document);
        let mut body = self.extract_body(body_element);

        if title.is_none() && date_raw.is_none() && body.is_none() {
            return Err(AdapterError::Extraction {
                url: url.to_string(),
                message: "page has no title, date or body".to_string(),
            });
        }

        if self.strip_author_from_body {
            if let Some(byline) = byline.as_deref() {
                body = body.and_then(|text| strip_byline(&text, byline));
            }
        }

        let published_at = date_raw
            .as_deref()
            .and_then(|raw| parse_date(raw, &self.date_formats));

        Ok(ArticleFields {
            title,
            author: self.extract_author(byline),
            published_at,
            date_raw,
            body,
            links: self.extract_links(&document, body_element, url),
        })
    }

    fn freshness_window_days(&self) -> Option<u32> {
        self.freshness_window_days
    }

    fn title_from_url(&self) -> bool {
        self.title_from_url
    }
}

fn compile(selector: &str) -> Result<Selector, AdapterError> {
    Selector::parse(selector).map_err(|e| AdapterError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

fn compile_optional(selector: &Option<String>) -> Result<Option<Selector>, AdapterError> {
    selector.as_deref().map(compile).transpose()
}

/// Text content with runs of whitespace collapsed to single spaces
///
/// Text nodes are joined as they are, so inline markup inside a word or
/// before punctuation adds no space.
fn collect_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Body text with every occurrence of `byline` removed; lines left empty are
/// dropped
fn strip_byline(body: &str, byline: &str) -> Option<String> {
    let text = body
        .replace(byline, "")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Some(text).filter(|text| !text.is_empty())
}

fn is_image(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
