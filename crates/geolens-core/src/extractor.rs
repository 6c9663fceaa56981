//! Page extraction
//!
//! Turns raw HTML into an [`ExtractedContent`] snapshot. The document is
//! parsed once; every detector and the bot-view builder run against that
//! parse so the returned record is complete.

use scraper::{ElementRef, Html};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::markdown;
use crate::parser::{
    element_text, html_to_markdown, json_ld_blocks, normalize_whitespace, select_all, selector,
};
use crate::signals::{ai, mobile, robots::RobotsPolicy, structured_data, ux};
use crate::types::{ExtractedContent, Heading, Image, Link, PageMeta, PageSource};
use crate::url_utils;

/// Minimum trimmed length of a paragraph
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Elements whose text is never visible
const INVISIBLE: &[&str] = &["script", "style", "noscript", "template", "head", "svg"];

/// Extract a normalized snapshot from raw HTML
pub fn extract(html: &str, url: &str, source: PageSource) -> ExtractedContent {
    let document = Html::parse_document(html);
    let host = url_utils::hostname(url);

    let title = select_all(&document, "title")
        .first()
        .map(element_text)
        .unwrap_or_default();
    let meta_description = meta_content(&document, "meta[name='description']").unwrap_or_default();

    let headings = extract_headings(&document);
    let paragraphs = extract_paragraphs(&document);
    let images = extract_images(&document);
    let links = extract_links(&document, host.as_deref());
    let schema_blocks = match selector("script") {
        Some(script) => json_ld_blocks(&document, &script),
        None => Vec::new(),
    };
    let page_meta = extract_page_meta(&document);

    let text_content = visible_text(&document);
    let word_count = text_content.split_whitespace().count();

    debug!(
        url,
        headings = headings.len(),
        paragraphs = paragraphs.len(),
        images = images.len(),
        links = links.len(),
        schema_blocks = schema_blocks.len(),
        word_count,
        "extracted page structure"
    );

    let robots_policy = RobotsPolicy::from_source(&source);
    let mobile_signals = mobile::detect(&document);
    let structured_data_signals = structured_data::detect(&document, &schema_blocks);
    let ux_signals = ux::detect(&document);
    let ai_signals = ai::detect(&ai::AiInput {
        document: &document,
        text: &text_content,
        word_count,
        html_length: html.len(),
        headings: &headings,
        links: &links,
        structured: &structured_data_signals,
    });

    let mut bot_view = markdown::build_from_document(&document, url);
    bot_view.stats.full_markdown_length = html_to_markdown(html).len();
    debug!(
        container = %bot_view.stats.container,
        nodes = bot_view.stats.node_count,
        "built bot view"
    );

    ExtractedContent {
        url: url.to_string(),
        source,
        title,
        meta_description,
        headings,
        paragraphs,
        images,
        links,
        schema_blocks,
        text_content,
        word_count,
        html_length: html.len(),
        page_meta,
        robots_policy,
        mobile_signals,
        structured_data_signals,
        ux_signals,
        ai_signals,
        markdown_representation: bot_view.markdown,
        bot_view: bot_view.stats,
    }
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    select_all(document, css)
        .first()
        .and_then(|meta| meta.value().attr("content"))
        .map(normalize_whitespace)
        .filter(|content| !content.is_empty())
}

fn extract_headings(document: &Html) -> Vec<Heading> {
    select_all(document, "h1, h2, h3, h4, h5, h6")
        .iter()
        .filter_map(|element| {
            let level = element.value().name()[1..].parse::<u8>().ok()?;
            Some(Heading {
                level,
                text: element_text(element),
            })
        })
        .collect()
}

fn extract_paragraphs(document: &Html) -> Vec<String> {
    select_all(document, "p")
        .iter()
        .map(element_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect()
}

/// Images deduplicated by `src`, first occurrence wins
fn extract_images(document: &Html) -> Vec<Image> {
    let mut seen = HashSet::new();
    select_all(document, "img")
        .iter()
        .filter_map(|img| {
            let el = img.value();
            let src = el
                .attr("src")
                .or_else(|| el.attr("data-src"))
                .map(str::trim)
                .filter(|src| !src.is_empty())?;
            if !seen.insert(src.to_string()) {
                return None;
            }
            Some(Image {
                src: src.to_string(),
                alt: el.attr("alt").map(normalize_whitespace),
                title: el.attr("title").map(normalize_whitespace),
                has_srcset: el.attr("srcset").is_some(),
            })
        })
        .collect()
}

fn extract_links(document: &Html, host: Option<&str>) -> Vec<Link> {
    select_all(document, "a[href]")
        .iter()
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim();
            if href.is_empty() || href.to_ascii_lowercase().starts_with("javascript:") {
                return None;
            }
            let text = match element_text(anchor) {
                text if text.is_empty() => anchor
                    .value()
                    .attr("aria-label")
                    .or_else(|| anchor.value().attr("title"))
                    .map(normalize_whitespace)
                    .unwrap_or_default(),
                text => text,
            };
            Some(Link {
                href: href.to_string(),
                text,
                internal: url_utils::is_internal_link(href, host),
            })
        })
        .collect()
}

fn extract_page_meta(document: &Html) -> PageMeta {
    let robots_meta = meta_content(document, "meta[name='robots']");
    let robots_lower = robots_meta
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase();

    let mut open_graph = BTreeMap::new();
    for meta in select_all(document, "meta[property^='og:'], meta[property^='article:']") {
        if let (Some(property), Some(content)) =
            (meta.value().attr("property"), meta.value().attr("content"))
        {
            open_graph
                .entry(property.to_string())
                .or_insert_with(|| normalize_whitespace(content));
        }
    }

    let mut twitter = BTreeMap::new();
    for meta in select_all(document, "meta[name^='twitter:']") {
        if let (Some(name), Some(content)) = (meta.value().attr("name"), meta.value().attr("content")) {
            twitter
                .entry(name.to_string())
                .or_insert_with(|| normalize_whitespace(content));
        }
    }

    let link_href = |css: &str| {
        select_all(document, css)
            .first()
            .and_then(|link| link.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
    };

    let hreflang = select_all(document, "link[rel='alternate'][hreflang]")
        .iter()
        .filter_map(|link| link.value().attr("hreflang"))
        .map(str::to_string)
        .collect();

    let charset = select_all(document, "meta[charset]")
        .first()
        .and_then(|meta| meta.value().attr("charset"))
        .map(str::to_string);

    let published_time = open_graph
        .get("article:published_time")
        .cloned()
        .or_else(|| first_attr(document, "time[datetime]", "datetime"));
    let modified_time = open_graph
        .get("article:modified_time")
        .cloned()
        .or_else(|| meta_content(document, "meta[property='og:updated_time']"))
        .or_else(|| meta_content(document, "meta[name='last-modified']"));

    PageMeta {
        canonical: link_href("link[rel='canonical']"),
        lang: first_attr(document, "html", "lang"),
        charset,
        noindex: robots_lower.contains("noindex") || robots_lower.contains("none"),
        nofollow: robots_lower.contains("nofollow") || robots_lower.contains("none"),
        robots_meta,
        open_graph,
        twitter,
        hreflang,
        sitemap_link: link_href("link[rel='sitemap']"),
        published_time,
        modified_time,
        author: meta_content(document, "meta[name='author']"),
    }
}

fn first_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    select_all(document, css)
        .first()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Visible body text, whitespace normalized
fn visible_text(document: &Html) -> String {
    let root = select_all(document, "body")
        .into_iter()
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut parts = Vec::new();
    collect_text(root, &mut parts);
    normalize_whitespace(&parts.join(" "))
}

fn collect_text<'a>(element: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            parts.push(text);
        } else if let Some(child_el) = ElementRef::wrap(child)
            && !INVISIBLE.contains(&child_el.value().name())
        {
            collect_text(child_el, parts);
        }
    }
}
