//! # geolens-core
//!
//! Core library for grading how ready a web page is for AI-driven search and
//! classic SEO.
//!
//! This library provides:
//! - HTML extraction into a normalized [`ExtractedContent`] snapshot
//! - A bot-simulated Markdown view of the page's primary content
//! - Seven independent category scorers with findings and recommendations
//! - Weighted aggregation into a [`WebsiteAnalysis`] with content improvements
//!
//! ## Features
//!
//! - `default`: Pure, synchronous analysis of HTML you already have
//! - `fetch`: Fetch pages and robots.txt over HTTP (reqwest + tokio)
//!
//! ## Example
//!
//! ```no_run
//! use geolens_core::{PageSource, analyze_html};
//!
//! let html = r#"
//!     <html><head><title>Espresso guide</title></head>
//!     <body><main><h1>Espresso</h1><p>Pull a shot in about thirty seconds.</p></main></body></html>
//! "#;
//!
//! let analysis = analyze_html(html, "https://example.com/espresso", PageSource::Manual);
//! println!("{} / 100", analysis.overall_score);
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extractor;
pub mod markdown;
pub mod parser;
pub mod patterns;
pub mod scoring;
pub mod signals;
pub mod types;
pub mod url_utils;

#[cfg(feature = "fetch")]
pub mod fetch;

// Re-export commonly used types
pub use aggregate::{Analyzer, overall_score};
pub use config::AnalyzerConfig;
pub use error::{GeolensError, Result};
pub use extractor::extract;
pub use markdown::{BotView, build_bot_markdown};
pub use scoring::CategoryScorer;
pub use types::{
    Category, CategoryScore, ContentImprovement, CrawlMetadata, ExtractedContent, PageSource,
    Priority, Recommendation, Status, WebsiteAnalysis,
};

#[cfg(feature = "fetch")]
pub use fetch::{FetchOptions, FetchedPage, fetch_page};

/// Extract and score a page with the default configuration
pub fn analyze_html(html: &str, url: &str, source: PageSource) -> WebsiteAnalysis {
    Analyzer::default().analyze(extract(html, url, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_html_fills_every_category() {
        let analysis = analyze_html(
            "<title>Hello</title><main><h1>Hello</h1><p>A short greeting page for tests.</p></main>",
            "https://example.com/",
            PageSource::Manual,
        );
        assert_eq!(analysis.title, "Hello");
        for (score, category) in analysis.categories().iter().zip(Category::ALL) {
            assert_eq!(score.category, category);
            assert!(score.score <= 100);
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Analyzer::new(AnalyzerConfig::default()).is_ok());
    }
}
