//! Mobile readiness probes
//!
//! These run against the HTML alone, so pasted pages get the same probes as
//! crawled ones.

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::parser::{count_elements, select_all, select_exists};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileSignals {
    pub has_viewport: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport_content: Option<String>,
    /// `width=device-width` is declared
    pub device_width: bool,
    /// `user-scalable=no` or `maximum-scale=1` blocks zooming
    pub zoom_disabled: bool,
    /// `@media` rules in inline `<style>` blocks
    pub media_queries: usize,
    /// External stylesheets with a `media` attribute
    pub media_stylesheets: usize,
    pub stylesheets: usize,
    pub total_images: usize,
    /// Images with `srcset` or inside `<picture>`
    pub responsive_images: usize,
    pub lazy_images: usize,
    pub apple_touch_icon: bool,
    pub theme_color: bool,
    pub web_manifest: bool,
    pub tel_links: usize,
    pub amp_link: bool,
    /// Elements with an inline pixel width above a phone viewport
    pub fixed_width_elements: usize,
    /// Combined mobile readiness, 0-100
    pub score: u8,
}

/// Probe a parsed document for mobile signals
pub fn detect(document: &Html) -> MobileSignals {
    let viewport_content = select_all(document, "meta[name='viewport']")
        .first()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string());

    let normalized = viewport_content
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase()
        .replace(' ', "");
    let device_width = normalized.contains("width=device-width");
    let zoom_disabled = normalized.contains("user-scalable=no")
        || normalized.contains("maximum-scale=1.0")
        || normalized.split(',').any(|part| part == "maximum-scale=1");

    let media_queries = select_all(document, "style")
        .iter()
        .map(|style| style.text().collect::<String>().matches("@media").count())
        .sum();

    let images = select_all(document, "img");
    let responsive_images = images
        .iter()
        .filter(|img| {
            img.value().attr("srcset").is_some()
                || img
                    .parent()
                    .and_then(scraper::ElementRef::wrap)
                    .is_some_and(|parent| parent.value().name() == "picture")
        })
        .count();
    let lazy_images = images
        .iter()
        .filter(|img| img.value().attr("loading") == Some("lazy"))
        .count();

    let fixed_width_elements = select_all(document, "[style*='width']")
        .iter()
        .filter(|el| {
            el.value()
                .attr("style")
                .is_some_and(|style| has_wide_fixed_width(style))
        })
        .count();

    let mut signals = MobileSignals {
        has_viewport: viewport_content.is_some(),
        viewport_content,
        device_width,
        zoom_disabled,
        media_queries,
        media_stylesheets: count_elements(document, "link[rel='stylesheet'][media]"),
        stylesheets: count_elements(document, "link[rel='stylesheet']"),
        total_images: images.len(),
        responsive_images,
        lazy_images,
        apple_touch_icon: select_exists(document, "link[rel*='apple-touch-icon']"),
        theme_color: select_exists(document, "meta[name='theme-color']"),
        web_manifest: select_exists(document, "link[rel='manifest']"),
        tel_links: count_elements(document, "a[href^='tel:']"),
        amp_link: select_exists(document, "link[rel='amphtml']"),
        fixed_width_elements,
        score: 0,
    };
    signals.score = overall_score(&signals);
    signals
}

/// Inline `width: NNNpx` wider than a typical phone viewport
fn has_wide_fixed_width(style: &str) -> bool {
    style
        .to_ascii_lowercase()
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(prop, _)| prop.trim() == "width" || prop.trim() == "min-width")
        .filter_map(|(_, value)| value.trim().strip_suffix("px").map(str::trim))
        .filter_map(|px| px.parse::<f64>().ok())
        .any(|px| px > 480.0)
}

fn overall_score(signals: &MobileSignals) -> u8 {
    let mut score: i32 = 0;
    if signals.device_width {
        score += 40;
    } else if signals.has_viewport {
        score += 20;
    }
    if signals.zoom_disabled {
        score -= 10;
    }
    if signals.media_queries > 0 || signals.media_stylesheets > 0 {
        score += 20;
    }
    if signals.total_images == 0 || signals.responsive_images * 2 >= signals.total_images {
        score += 20;
    }
    if signals.apple_touch_icon || signals.theme_color || signals.web_manifest {
        score += 10;
    }
    if signals.fixed_width_elements == 0 {
        score += 10;
    }
    score.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_responsive_page() {
        let html = r##"
        <html><head>
            <meta name="viewport" content="width=device-width, initial-scale=1">
            <meta name="theme-color" content="#fff">
            <style>@media (max-width: 600px) { body { font-size: 14px; } }</style>
        </head><body>
            <img src="a.jpg" srcset="a-2x.jpg 2x" alt="A">
            <picture><img src="b.jpg" alt="B"></picture>
            <a href="tel:+15551234">Call</a>
        </body></html>
        "##;

        let signals = detect(&Html::parse_document(html));
        assert!(signals.device_width);
        assert!(!signals.zoom_disabled);
        assert_eq!(signals.media_queries, 1);
        assert_eq!(signals.total_images, 2);
        assert_eq!(signals.responsive_images, 2);
        assert_eq!(signals.tel_links, 1);
        assert_eq!(signals.score, 100);
    }

    #[test]
    fn missing_viewport_scores_low() {
        let html = r#"<html><body><div style="width: 1200px">Wide</div></body></html>"#;
        let signals = detect(&Html::parse_document(html));
        assert!(!signals.has_viewport);
        assert_eq!(signals.fixed_width_elements, 1);
        assert_eq!(signals.score, 20);
    }

    #[test]
    fn zoom_lock_is_detected() {
        let html = r#"<meta name="viewport" content="width=device-width, user-scalable=no">"#;
        let signals = detect(&Html::parse_document(html));
        assert!(signals.zoom_disabled);
    }

    #[test]
    fn wide_fixed_width_parsing() {
        assert!(has_wide_fixed_width("color: red; width: 960px"));
        assert!(!has_wide_fixed_width("width: 100%"));
        assert!(!has_wide_fixed_width("max-width: 960px"));
    }
}
