//! Structured data detection: JSON-LD, microdata, RDFa and social meta tags

use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use crate::parser::{count_elements, parse_json_ld_entities, schema_types, select_all, shorten_iri};

/// Properties search engines expect for common schema.org types
const RECOMMENDED_PROPERTIES: &[(&str, &[&str])] = &[
    (
        "Organization",
        &["name", "url", "logo", "sameAs", "contactPoint", "description"],
    ),
    (
        "LocalBusiness",
        &["name", "address", "telephone", "openingHours", "geo", "url"],
    ),
    ("WebSite", &["name", "url", "potentialAction"]),
    ("WebPage", &["name", "description", "url"]),
    (
        "Article",
        &["headline", "author", "datePublished", "dateModified", "image", "publisher"],
    ),
    ("FAQPage", &["mainEntity"]),
    ("HowTo", &["name", "step", "totalTime"]),
    (
        "Product",
        &["name", "image", "description", "offers", "brand", "aggregateRating"],
    ),
    ("Person", &["name", "jobTitle", "url", "sameAs"]),
    ("BreadcrumbList", &["itemListElement"]),
    ("Review", &["author", "reviewRating", "itemReviewed"]),
    ("Event", &["name", "startDate", "location"]),
    (
        "Recipe",
        &["name", "recipeIngredient", "recipeInstructions", "image"],
    ),
];

/// One top-level JSON-LD entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEntity {
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Property names present on the entity, `@` keywords excluded
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDataSignals {
    pub json_ld_blocks: usize,
    pub valid_json_ld: usize,
    pub invalid_json_ld: usize,
    pub validation_errors: Vec<String>,
    pub entities: Vec<SchemaEntity>,
    /// Distinct schema types across JSON-LD and microdata, sorted
    pub schema_types: Vec<String>,
    pub microdata_items: usize,
    pub rdfa_items: usize,
    pub open_graph_tags: usize,
    pub twitter_tags: usize,
    pub has_speakable: bool,
    /// Share of recommended properties present on typed entities, 0-100
    pub completeness: u8,
}

/// Detect structured data in a document and its JSON-LD blocks.
///
/// Invalid blocks are recorded as validation errors and skipped.
pub fn detect(document: &Html, schema_blocks: &[String]) -> StructuredDataSignals {
    let mut entities = Vec::new();
    let mut validation_errors = Vec::new();
    let mut valid_json_ld = 0;

    for (index, block) in schema_blocks.iter().enumerate() {
        match parse_json_ld_entities(block) {
            Ok(parsed) => {
                valid_json_ld += 1;
                entities.extend(parsed.iter().map(to_entity));
            }
            Err(err) => {
                warn!(block = index + 1, "skipping invalid JSON-LD block: {err:#}");
                validation_errors.push(format!("JSON-LD block {}: {:#}", index + 1, err));
            }
        }
    }

    let mut types: BTreeSet<String> = entities
        .iter()
        .flat_map(|entity| entity.types.iter().cloned())
        .collect();

    let microdata = select_all(document, "[itemscope]");
    for item in &microdata {
        if let Some(itemtype) = item.value().attr("itemtype") {
            types.extend(itemtype.split_whitespace().map(shorten_iri));
        }
    }

    let has_speakable = types.contains("SpeakableSpecification")
        || schema_blocks
            .iter()
            .any(|block| block.contains("\"speakable\""));

    let completeness = completeness(&entities);

    StructuredDataSignals {
        json_ld_blocks: schema_blocks.len(),
        valid_json_ld,
        invalid_json_ld: schema_blocks.len() - valid_json_ld,
        validation_errors,
        entities,
        schema_types: types.into_iter().collect(),
        microdata_items: microdata.len(),
        rdfa_items: count_elements(document, "[typeof], [vocab]"),
        open_graph_tags: count_elements(document, "meta[property^='og:']"),
        twitter_tags: count_elements(document, "meta[name^='twitter:']"),
        has_speakable,
        completeness,
    }
}

fn to_entity(value: &serde_json::Value) -> SchemaEntity {
    let properties = value
        .as_object()
        .map(|obj| {
            obj.keys()
                .filter(|key| !key.starts_with('@'))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    SchemaEntity {
        types: schema_types(value),
        name: value
            .get("name")
            .or_else(|| value.get("headline"))
            .and_then(|name| name.as_str())
            .map(str::to_string),
        properties,
    }
}

/// Recommended properties for a type, folding common subtypes into their parent
pub fn recommended_properties(schema_type: &str) -> Option<&'static [&'static str]> {
    let canonical = match schema_type {
        "NewsArticle" | "BlogPosting" | "TechArticle" => "Article",
        "Corporation" => "Organization",
        "Store" | "Restaurant" => "LocalBusiness",
        "ProductGroup" => "Product",
        "AboutPage" | "ContactPage" | "CollectionPage" => "WebPage",
        other => other,
    };
    RECOMMENDED_PROPERTIES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, props)| *props)
}

/// Average share of recommended properties present.
///
/// No entities scores 0; entities whose types are all unknown score a neutral 50.
fn completeness(entities: &[SchemaEntity]) -> u8 {
    if entities.is_empty() {
        return 0;
    }

    let ratios: Vec<f64> = entities
        .iter()
        .filter_map(|entity| {
            let recommended = entity
                .types
                .iter()
                .find_map(|t| recommended_properties(t))?;
            let present = recommended
                .iter()
                .filter(|prop| entity.properties.iter().any(|p| p == *prop))
                .count();
            Some(present as f64 / recommended.len() as f64)
        })
        .collect();

    if ratios.is_empty() {
        return 50;
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    (mean * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn valid_and_invalid_blocks_are_counted() {
        let schema = blocks(&[
            r#"{"@context": "https://schema.org", "@type": "Organization", "name": "Acme", "url": "https://acme.test", "logo": "https://acme.test/logo.png"}"#,
            r#"{"@type": "Product", "name": "Broken""#,
        ]);
        let signals = detect(&Html::parse_document("<html></html>"), &schema);

        assert_eq!(signals.json_ld_blocks, 2);
        assert_eq!(signals.valid_json_ld, 1);
        assert_eq!(signals.invalid_json_ld, 1);
        assert_eq!(signals.validation_errors.len(), 1);
        assert!(signals.validation_errors[0].starts_with("JSON-LD block 2"));
        assert_eq!(signals.schema_types, vec!["Organization"]);
        assert_eq!(signals.entities[0].name.as_deref(), Some("Acme"));
        assert_eq!(signals.completeness, 50);
    }

    #[test]
    fn microdata_and_social_tags() {
        let html = r#"
        <html><head>
            <meta property="og:title" content="Title">
            <meta property="og:image" content="/img.png">
            <meta name="twitter:card" content="summary">
        </head><body>
            <div itemscope itemtype="https://schema.org/Product"><span itemprop="name">Bike</span></div>
            <div vocab="https://schema.org/" typeof="Person"></div>
        </body></html>
        "#;

        let signals = detect(&Html::parse_document(html), &[]);
        assert_eq!(signals.microdata_items, 1);
        assert_eq!(signals.rdfa_items, 1);
        assert_eq!(signals.open_graph_tags, 2);
        assert_eq!(signals.twitter_tags, 1);
        assert_eq!(signals.schema_types, vec!["Product"]);
        assert_eq!(signals.completeness, 0);
    }

    #[test]
    fn unknown_types_get_neutral_completeness() {
        let schema = blocks(&[r#"{"@type": "Thing", "name": "x"}"#]);
        let signals = detect(&Html::parse_document(""), &schema);
        assert_eq!(signals.completeness, 50);
    }

    #[test]
    fn subtypes_share_parent_properties() {
        assert_eq!(
            recommended_properties("BlogPosting"),
            recommended_properties("Article")
        );
        assert!(recommended_properties("Thing").is_none());
    }

    #[test]
    fn speakable_is_detected() {
        let schema = blocks(&[
            r#"{"@type": "WebPage", "speakable": {"@type": "SpeakableSpecification", "cssSelector": [".summary"]}}"#,
        ]);
        let signals = detect(&Html::parse_document(""), &schema);
        assert!(signals.has_speakable);
    }
}
