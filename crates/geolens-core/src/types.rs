//! Common types used across geolens

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::signals::{
    ai::AiSignals, mobile::MobileSignals, robots::RobotsPolicy,
    structured_data::StructuredDataSignals, ux::UxSignals,
};

/// The seven scoring categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    TechnicalSeo,
    ContentQuality,
    AiOptimization,
    Eeat,
    TechnicalCrawlability,
    MobileOptimization,
    SchemaAnalysis,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::TechnicalSeo,
        Category::ContentQuality,
        Category::AiOptimization,
        Category::Eeat,
        Category::TechnicalCrawlability,
        Category::MobileOptimization,
        Category::SchemaAnalysis,
    ];

    /// Stable identifier, matching the serialized form
    pub fn key(&self) -> &'static str {
        match self {
            Category::TechnicalSeo => "technicalSeo",
            Category::ContentQuality => "contentQuality",
            Category::AiOptimization => "aiOptimization",
            Category::Eeat => "eeat",
            Category::TechnicalCrawlability => "technicalCrawlability",
            Category::MobileOptimization => "mobileOptimization",
            Category::SchemaAnalysis => "schemaAnalysis",
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            Category::TechnicalSeo => "Technical SEO",
            Category::ContentQuality => "Content Quality",
            Category::AiOptimization => "AI Optimization",
            Category::Eeat => "E-E-A-T Signals",
            Category::TechnicalCrawlability => "Technical Crawlability",
            Category::MobileOptimization => "Mobile Optimization",
            Category::SchemaAnalysis => "Schema Analysis",
        }
    }
}

/// Score band shared by all categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
    Critical,
}

impl Status {
    /// Band a 0-100 score: 85+ excellent, 70+ good, 50+ needs improvement, 25+ poor
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => Status::Excellent,
            70..=84 => Status::Good,
            50..=69 => Status::NeedsImprovement,
            25..=49 => Status::Poor,
            _ => Status::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Excellent => "excellent",
            Status::Good => "good",
            Status::NeedsImprovement => "needs-improvement",
            Status::Poor => "poor",
            Status::Critical => "critical",
        }
    }
}

/// Priority of a recommendation or content improvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Priority derived from the score of the category that triggered an item
    pub fn from_category_score(score: u8) -> Self {
        if score < 50 {
            Priority::High
        } else if score < 70 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Where the HTML came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PageSource {
    /// Fetched over HTTP; carries the metadata the fetch produced
    Crawled(CrawlMetadata),
    /// Pasted HTML with no HTTP metadata
    Manual,
}

impl PageSource {
    pub fn kind(&self) -> &'static str {
        match self {
            PageSource::Crawled(_) => "crawled",
            PageSource::Manual => "manual",
        }
    }

    pub fn crawl(&self) -> Option<&CrawlMetadata> {
        match self {
            PageSource::Crawled(meta) => Some(meta),
            PageSource::Manual => None,
        }
    }
}

/// HTTP metadata captured while fetching a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlMetadata {
    /// URL after redirects
    pub final_url: String,
    pub status_code: u16,
    pub is_https: bool,
    /// Body size in bytes
    pub content_length: usize,
    /// From sending the request until the whole body was read
    pub response_time_ms: u64,
    /// robots.txt body, if the site served one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots_txt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_robots_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub src: String,
    /// `None` when the attribute is missing, `Some("")` for decorative images
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub has_srcset: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub text: String,
    pub internal: bool,
}

/// Document-level metadata from `<head>` and the root element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub canonical: Option<String>,
    pub lang: Option<String>,
    pub charset: Option<String>,
    pub robots_meta: Option<String>,
    pub noindex: bool,
    pub nofollow: bool,
    /// `og:*` properties, keyed by property name
    pub open_graph: BTreeMap<String, String>,
    /// `twitter:*` meta names
    pub twitter: BTreeMap<String, String>,
    pub hreflang: Vec<String>,
    pub sitemap_link: Option<String>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub author: Option<String>,
}

/// Statistics of the bot-simulated walk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotViewStats {
    /// Selector of the container the walk started from
    pub container: String,
    pub node_count: usize,
    pub excluded_regions: usize,
    pub structured_items: usize,
    pub key_links: usize,
    /// Length of a plain html2md conversion of the sanitized page
    pub full_markdown_length: usize,
}

/// Normalized structural snapshot of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    pub url: String,
    pub source: PageSource,
    pub title: String,
    pub meta_description: String,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,
    pub images: Vec<Image>,
    pub links: Vec<Link>,
    pub schema_blocks: Vec<String>,
    /// Whitespace-normalized visible body text
    pub text_content: String,
    pub word_count: usize,
    pub html_length: usize,
    pub page_meta: PageMeta,
    pub robots_policy: RobotsPolicy,
    pub mobile_signals: MobileSignals,
    pub structured_data_signals: StructuredDataSignals,
    pub ux_signals: UxSignals,
    pub ai_signals: AiSignals,
    pub markdown_representation: String,
    pub bot_view: BotViewStats,
}

/// A structured, actionable recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub priority: Priority,
    pub category: Category,
    /// Sub-metric that triggered the recommendation
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
}

/// One of the seven independent category ratings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: u8,
    pub status: Status,
    pub findings: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    /// Named sub-metrics, each 0-100
    pub metrics: BTreeMap<String, u8>,
}

impl CategoryScore {
    pub fn metric(&self, name: &str) -> Option<u8> {
        self.metrics.get(name).copied()
    }
}

/// A threshold-gated suggested remediation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentImprovement {
    pub section: String,
    pub current: String,
    pub improved: String,
    pub reasoning: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Deterministic diagnostics about one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub source_kind: String,
    pub html_length: usize,
    pub heading_count: usize,
    pub paragraph_count: usize,
    pub image_count: usize,
    pub link_count: usize,
    pub schema_block_count: usize,
    pub invalid_schema_blocks: usize,
    pub bot_view_container: String,
    pub bot_view_nodes: usize,
    pub bot_markdown_length: usize,
    pub full_markdown_length: usize,
    /// Share of the full conversion kept by the bot view, 0-100
    pub retention_percent: u8,
    pub config_version: u32,
    /// Category weights keyed by [`Category::key`]
    pub category_weights: BTreeMap<String, f64>,
}

/// Top-level result of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteAnalysis {
    pub url: String,
    pub title: String,
    pub overall_score: u8,
    pub timestamp: DateTime<Utc>,
    pub technical_seo: CategoryScore,
    pub content_quality: CategoryScore,
    pub ai_optimization: CategoryScore,
    pub eeat: CategoryScore,
    pub technical_crawlability: CategoryScore,
    pub mobile_optimization: CategoryScore,
    pub schema_analysis: CategoryScore,
    pub content_improvements: Vec<ContentImprovement>,
    pub extracted_content: ExtractedContent,
    pub debug_info: DebugInfo,
}

impl WebsiteAnalysis {
    /// The seven category scores in [`Category::ALL`] order
    pub fn categories(&self) -> [&CategoryScore; 7] {
        [
            &self.technical_seo,
            &self.content_quality,
            &self.ai_optimization,
            &self.eeat,
            &self.technical_crawlability,
            &self.mobile_optimization,
            &self.schema_analysis,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bands_at_boundaries() {
        assert_eq!(Status::from_score(100), Status::Excellent);
        assert_eq!(Status::from_score(85), Status::Excellent);
        assert_eq!(Status::from_score(84), Status::Good);
        assert_eq!(Status::from_score(70), Status::Good);
        assert_eq!(Status::from_score(69), Status::NeedsImprovement);
        assert_eq!(Status::from_score(50), Status::NeedsImprovement);
        assert_eq!(Status::from_score(49), Status::Poor);
        assert_eq!(Status::from_score(25), Status::Poor);
        assert_eq!(Status::from_score(24), Status::Critical);
        assert_eq!(Status::from_score(0), Status::Critical);
    }

    #[test]
    fn priority_follows_category_band() {
        assert_eq!(Priority::from_category_score(49), Priority::High);
        assert_eq!(Priority::from_category_score(50), Priority::Medium);
        assert_eq!(Priority::from_category_score(69), Priority::Medium);
        assert_eq!(Priority::from_category_score(70), Priority::Low);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&Status::NeedsImprovement).unwrap();
        assert_eq!(json, "\"needs-improvement\"");
        assert_eq!(Status::NeedsImprovement.label(), "needs-improvement");
    }

    #[test]
    fn page_source_is_tagged() {
        let manual = serde_json::to_value(PageSource::Manual).unwrap();
        assert_eq!(manual["kind"], "manual");

        let crawled = PageSource::Crawled(CrawlMetadata {
            final_url: "https://example.com/".to_string(),
            status_code: 200,
            is_https: true,
            content_length: 1024,
            response_time_ms: 320,
            robots_txt: None,
            x_robots_tag: None,
        });
        let value = serde_json::to_value(&crawled).unwrap();
        assert_eq!(value["kind"], "crawled");
        assert_eq!(value["finalUrl"], "https://example.com/");
        assert!(value.get("robotsTxt").is_none());
    }

    #[test]
    fn category_list_is_complete_and_unique() {
        let mut all = Category::ALL.to_vec();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 7);

        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.key()));
        }
    }
}
