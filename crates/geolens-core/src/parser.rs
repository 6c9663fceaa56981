//! HTML parsing helpers shared by the extractor, detectors and bot view

use anyhow::{Context, Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value as JsonValue;

/// Non-empty JSON-LD script bodies of a parsed document, in document order
pub(crate) fn json_ld_blocks(document: &Html, script: &Selector) -> Vec<String> {
    document
        .select(script)
        .filter(|element| element.value().attr("type").is_some_and(is_json_ld_type))
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|body| !body.is_empty())
        .collect()
}

/// `application/ld+json`, in any case and with optional parameters
fn is_json_ld_type(media_type: &str) -> bool {
    media_type.to_ascii_lowercase().contains("ld+json")
}

/// Parse one JSON-LD block into its top-level entities.
///
/// Objects are returned as-is, top-level arrays and `@graph` containers are
/// flattened. Top-level primitives are not valid JSON-LD documents.
pub fn parse_json_ld_entities(block: &str) -> Result<Vec<JsonValue>> {
    let parsed: JsonValue = serde_json::from_str(block)
        .with_context(|| format!("failed to parse JSON-LD block: {}", truncate(block, 80)))?;

    let mut entities = Vec::new();
    match parsed {
        JsonValue::Object(_) => flatten_graph(parsed, &mut entities),
        JsonValue::Array(items) => {
            for item in items {
                if item.is_object() {
                    flatten_graph(item, &mut entities);
                }
            }
        }
        _ => {
            return Err(anyhow!(
                "JSON-LD top level must be an object or array, got {}",
                truncate(&parsed.to_string(), 40)
            ));
        }
    }
    Ok(entities)
}

fn flatten_graph(value: JsonValue, out: &mut Vec<JsonValue>) {
    if let Some(JsonValue::Array(graph)) = value.get("@graph") {
        for item in graph {
            if item.is_object() {
                out.push(item.clone());
            }
        }
        // A bare @graph container is not an entity of its own
        if value.get("@type").is_none() {
            return;
        }
    }
    out.push(value);
}

/// Short `@type` names of an entity (`https://schema.org/Product` becomes `Product`)
pub fn schema_types(entity: &JsonValue) -> Vec<String> {
    match entity.get("@type") {
        Some(JsonValue::String(s)) => vec![shorten_iri(s)],
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(shorten_iri)
            .collect(),
        _ => Vec::new(),
    }
}

pub fn shorten_iri(iri: &str) -> String {
    if let Some(pos) = iri.rfind('#') {
        iri[pos + 1..].to_string()
    } else if let Some(pos) = iri.rfind('/') {
        iri[pos + 1..].to_string()
    } else {
        iri.to_string()
    }
}

/// Strip elements whose content is never rendered, plus HTML comments
pub fn sanitize_html(html: &str) -> String {
    static RE_UNRENDERED: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<noscript\b[^>]*>.*?</noscript\s*>|<template\b[^>]*>.*?</template\s*>",
        )
        .expect("invalid sanitize regex")
    });
    RE_UNRENDERED.replace_all(html, "").into_owned()
}

/// Plain html2md conversion of the sanitized page
pub fn html_to_markdown(html: &str) -> String {
    html2md::parse_html(&sanitize_html(html))
}

/// Collapse runs of whitespace into single spaces
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-normalized text content of an element
pub fn element_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Parse a selector the core relies on.
///
/// Selector strings are compile-time constants; an invalid one yields a
/// selector that matches nothing rather than a panic.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

pub(crate) fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => document.select(&sel).collect(),
        None => Vec::new(),
    }
}

pub(crate) fn select_exists(document: &Html, css: &str) -> bool {
    selector(css).is_some_and(|sel| document.select(&sel).next().is_some())
}

pub(crate) fn count_elements(document: &Html, css: &str) -> usize {
    selector(css).map_or(0, |sel| document.select(&sel).count())
}

/// Truncate to at most `max` characters, appending an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_ld_blocks_by_media_type() {
        let html = r#"
            <script type="application/ld+json; charset=utf-8">{"@type": "Product", "name": "Mug"}</script>
            <script type="APPLICATION/LD+JSON">{"@type": "Brand"}</script>
            <script type="application/ld+json">   </script>
            <script type="application/json">{"@type": "Ignored"}</script>
            <script>{"@type": "AlsoIgnored"}</script>
        "#;
        let script = selector("script").unwrap();
        let blocks = json_ld_blocks(&Html::parse_document(html), &script);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("Mug"));
        assert!(blocks[1].contains("Brand"));

        let empty = Html::parse_document("<p>none</p>");
        assert!(json_ld_blocks(&empty, &script).is_empty());
    }

    #[test]
    fn graph_containers_are_flattened() {
        let block = r#"{
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "Organization", "name": "Acme"},
                {"@type": "WebSite", "name": "Acme Site"}
            ]
        }"#;
        let entities = parse_json_ld_entities(block).unwrap();
        let types: Vec<Vec<String>> = entities.iter().map(schema_types).collect();
        assert_eq!(types, vec![vec!["Organization"], vec!["WebSite"]]);
    }

    #[test]
    fn top_level_arrays_skip_primitives() {
        let block = r#"[{"@type": "Product"}, "stray", {"@type": ["Thing", "https://schema.org/Offer"]}]"#;
        let entities = parse_json_ld_entities(block).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(schema_types(&entities[1]), vec!["Thing", "Offer"]);
    }

    #[test]
    fn malformed_blocks_are_errors() {
        assert!(parse_json_ld_entities(r#"{"@type": "Product""#).is_err());
        assert!(parse_json_ld_entities("42").is_err());
    }

    #[test]
    fn iri_shortening() {
        assert_eq!(shorten_iri("https://schema.org/FAQPage"), "FAQPage");
        assert_eq!(shorten_iri("http://schema.org#Person"), "Person");
        assert_eq!(shorten_iri("Recipe"), "Recipe");
    }

    #[test]
    fn sanitize_drops_unrendered_content() {
        let html = r#"
            <p>Visible copy</p>
            <script>track('pageview')</script>
            <script src="bundle.js"></script>
            <style>.x { color: red }</style>
            <!-- build 1234 -->
            <noscript>Enable JavaScript</noscript>
        "#;
        let clean = sanitize_html(html);
        assert!(clean.contains("Visible copy"));
        for gone in ["track(", "bundle.js", "color: red", "build 1234", "Enable JavaScript"] {
            assert!(!clean.contains(gone), "{gone} survived");
        }
    }

    #[test]
    fn markdown_conversion_keeps_text() {
        let markdown = html_to_markdown("<h1>Brewing</h1><script>x()</script><p>Grind fine.</p>");
        assert!(markdown.contains("Brewing"));
        assert!(markdown.contains("Grind fine."));
        assert!(!markdown.contains("x()"));
    }

    #[test]
    fn whitespace_and_truncation() {
        assert_eq!(normalize_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(normalize_whitespace("   "), "");
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
