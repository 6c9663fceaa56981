//! Overall scoring and content improvements
//!
//! The [`Analyzer`] runs the seven category scorers over an
//! [`ExtractedContent`], combines them into the weighted overall score and
//! derives threshold-gated [`ContentImprovement`]s.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{AnalyzerConfig, CategoryWeights};
use crate::error::{GeolensError, Result};
use crate::scoring::{CategoryScorer, clamp_score, default_scorers, metric_advice, ratio_score};
use crate::types::{
    Category, CategoryScore, ContentImprovement, DebugInfo, ExtractedContent, Priority, Status,
    WebsiteAnalysis,
};

/// Categories below this score are listed in the priority action
const CRITICAL_CATEGORY: u8 = 50;

/// Overall scores below this get a strategy entry
const STRATEGY_THRESHOLD: u8 = 70;

/// Scores pages with a validated configuration
pub struct Analyzer {
    config: AnalyzerConfig,
    /// One scorer per category, in [`Category::ALL`] order
    scorers: Vec<Box<dyn CategoryScorer>>,
}

impl Analyzer {
    /// Build an analyzer with the default scorers, rejecting invalid weights
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let scorers = default_scorers(&config);
        Ok(Self { config, scorers })
    }

    /// Build an analyzer with custom scorers.
    ///
    /// Every category needs exactly one scorer.
    pub fn with_scorers(
        config: AnalyzerConfig,
        mut scorers: Vec<Box<dyn CategoryScorer>>,
    ) -> Result<Self> {
        config.validate()?;
        for category in Category::ALL {
            let count = scorers.iter().filter(|s| s.category() == category).count();
            if count != 1 {
                return Err(GeolensError::Config(format!(
                    "expected one scorer for {}, found {count}",
                    category.key()
                )));
            }
        }
        scorers.sort_by_key(|s| s.category());
        Ok(Self { config, scorers })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Score a page, stamped with the current time
    pub fn analyze(&self, content: ExtractedContent) -> WebsiteAnalysis {
        self.analyze_at(content, Utc::now())
    }

    /// Score a page with a fixed timestamp
    pub fn analyze_at(
        &self,
        content: ExtractedContent,
        timestamp: DateTime<Utc>,
    ) -> WebsiteAnalysis {
        let mut scores: BTreeMap<Category, CategoryScore> = BTreeMap::new();
        for scorer in &self.scorers {
            let score = scorer.score(&content);
            debug!(
                category = score.category.key(),
                score = score.score,
                findings = score.findings.len(),
                "scored category"
            );
            scores.insert(score.category, score);
        }

        let pairs: Vec<(Category, u8)> = scores.values().map(|s| (s.category, s.score)).collect();
        let overall_score = overall_score(&self.config.weights, &pairs);
        debug!(url = %content.url, overall_score, "aggregated scores");

        let ordered: Vec<&CategoryScore> = Category::ALL
            .iter()
            .filter_map(|category| scores.get(category))
            .collect();
        let content_improvements = self.content_improvements(&ordered, overall_score);
        let debug_info = self.debug_info(&content);

        let mut take = |category: Category| {
            scores
                .remove(&category)
                .unwrap_or_else(|| empty_score(category))
        };

        WebsiteAnalysis {
            url: content.url.clone(),
            title: content.title.clone(),
            overall_score,
            timestamp,
            technical_seo: take(Category::TechnicalSeo),
            content_quality: take(Category::ContentQuality),
            ai_optimization: take(Category::AiOptimization),
            eeat: take(Category::Eeat),
            technical_crawlability: take(Category::TechnicalCrawlability),
            mobile_optimization: take(Category::MobileOptimization),
            schema_analysis: take(Category::SchemaAnalysis),
            content_improvements,
            extracted_content: content,
            debug_info,
        }
    }

    fn content_improvements(
        &self,
        categories: &[&CategoryScore],
        overall: u8,
    ) -> Vec<ContentImprovement> {
        let threshold = self.config.thresholds.improvement;
        let mut improvements = Vec::new();

        let critical: Vec<&&CategoryScore> = categories
            .iter()
            .filter(|c| c.score < CRITICAL_CATEGORY)
            .collect();
        if !critical.is_empty() {
            let listed: Vec<String> = critical
                .iter()
                .map(|c| format!("{} ({}/100)", c.category.label(), c.score))
                .collect();
            improvements.push(ContentImprovement {
                section: "Priority Action".to_string(),
                current: format!("Critical gaps in: {}", listed.join(", ")),
                improved: "Fix the high-priority recommendations in these categories first"
                    .to_string(),
                reasoning: format!(
                    "Categories under {CRITICAL_CATEGORY} hold the overall score down the most"
                ),
                priority: Priority::High,
                category: None,
            });
        }

        for score in categories.iter().filter(|c| c.score < threshold) {
            let priority = Priority::from_category_score(score.score);
            if score.recommendations.is_empty() {
                improvements.push(category_improvement(score, threshold, priority));
                continue;
            }
            for recommendation in &score.recommendations {
                let value = score.metric(&recommendation.metric).unwrap_or_default();
                let reasoning = metric_advice(&recommendation.metric)
                    .map(|advice| advice.finding.to_string())
                    .or_else(|| recommendation.implementation.clone())
                    .unwrap_or_default();
                improvements.push(ContentImprovement {
                    section: score.category.label().to_string(),
                    current: format!("{}: {value}/100", recommendation.metric),
                    improved: recommendation.text.clone(),
                    reasoning,
                    priority,
                    category: Some(score.category),
                });
            }
        }

        if overall < STRATEGY_THRESHOLD {
            let weakest = categories
                .iter()
                .min_by(|a, b| {
                    let wa = self.config.weights.weight(a.category) * (100 - a.score) as f64;
                    let wb = self.config.weights.weight(b.category) * (100 - b.score) as f64;
                    wb.total_cmp(&wa)
                })
                .map(|c| c.category.label())
                .unwrap_or("any category");
            improvements.push(ContentImprovement {
                section: "Overall Strategy".to_string(),
                current: format!(
                    "Overall score {overall}/100 ({})",
                    Status::from_score(overall).label()
                ),
                improved: format!(
                    "Start with {weakest}, where the weighted gap is largest, then work down the list"
                ),
                reasoning: "AI answer engines cite pages they can crawl and quote".to_string(),
                priority: Priority::from_category_score(overall),
                category: None,
            });
        }

        improvements
    }

    fn debug_info(&self, content: &ExtractedContent) -> DebugInfo {
        let bot_markdown_length = content.markdown_representation.len();
        let full_markdown_length = content.bot_view.full_markdown_length;
        DebugInfo {
            source_kind: content.source.kind().to_string(),
            html_length: content.html_length,
            heading_count: content.headings.len(),
            paragraph_count: content.paragraphs.len(),
            image_count: content.images.len(),
            link_count: content.links.len(),
            schema_block_count: content.schema_blocks.len(),
            invalid_schema_blocks: content.structured_data_signals.invalid_json_ld,
            bot_view_container: content.bot_view.container.clone(),
            bot_view_nodes: content.bot_view.node_count,
            bot_markdown_length,
            full_markdown_length,
            retention_percent: ratio_score(bot_markdown_length, full_markdown_length, 0),
            config_version: self.config.version,
            category_weights: Category::ALL
                .iter()
                .map(|c| (c.key().to_string(), self.config.weights.weight(*c)))
                .collect(),
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        let config = AnalyzerConfig::default();
        Self {
            scorers: default_scorers(&config),
            config,
        }
    }
}

/// Rounded weighted sum of category scores, clamped to 0-100
pub fn overall_score(weights: &CategoryWeights, scores: &[(Category, u8)]) -> u8 {
    let total: f64 = scores
        .iter()
        .map(|(category, score)| weights.weight(*category) * *score as f64)
        .sum();
    clamp_score(total)
}

/// Entry for a category that is below the improvement threshold although no
/// single metric is below the finding threshold
fn category_improvement(
    score: &CategoryScore,
    threshold: u8,
    priority: Priority,
) -> ContentImprovement {
    let weakest = score
        .metrics
        .iter()
        .min_by_key(|(_, value)| **value)
        .map(|(name, value)| format!("{name} ({value}/100)"))
        .unwrap_or_default();
    ContentImprovement {
        section: score.category.label().to_string(),
        current: format!("{} scores {}/100", score.category.label(), score.score),
        improved: format!("Lift the weakest metric first: {weakest}"),
        reasoning: format!("The category is below the improvement threshold of {threshold}"),
        priority,
        category: Some(score.category),
    }
}

fn empty_score(category: Category) -> CategoryScore {
    CategoryScore {
        category,
        score: 0,
        status: Status::Critical,
        findings: Vec::new(),
        recommendations: Vec::new(),
        metrics: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract;
    use crate::scoring::{MobileScorer, SchemaScorer};
    use crate::types::PageSource;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn analyze(html: &str) -> WebsiteAnalysis {
        let content = extract(html, "https://example.com/guide", PageSource::Manual);
        Analyzer::default().analyze_at(content, fixed_time())
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let mut config = AnalyzerConfig::default();
        config.weights.eeat = 0.5;
        assert!(matches!(Analyzer::new(config), Err(GeolensError::Config(_))));
    }

    #[test]
    fn custom_scorers_must_cover_every_category() {
        let scorers: Vec<Box<dyn CategoryScorer>> = vec![
            Box::new(MobileScorer { threshold: 70 }),
            Box::new(SchemaScorer { threshold: 70 }),
        ];
        let err = Analyzer::with_scorers(AnalyzerConfig::default(), scorers).err();
        assert!(matches!(err, Some(GeolensError::Config(_))));
    }

    #[test]
    fn overall_is_rounded_weighted_sum() {
        let weights = CategoryWeights::default();
        let scores: Vec<(Category, u8)> = Category::ALL.iter().map(|c| (*c, 100)).collect();
        assert_eq!(overall_score(&weights, &scores), 100);

        let mut mixed: Vec<(Category, u8)> = Category::ALL.iter().map(|c| (*c, 0)).collect();
        mixed[2].1 = 100; // AI optimization carries 0.25
        assert_eq!(overall_score(&weights, &mixed), 25);
    }

    #[test]
    fn thin_page_gets_priority_action_and_strategy() {
        let analysis = analyze("<p>Too short to matter.</p>");
        let improvements = &analysis.content_improvements;
        assert_eq!(improvements[0].section, "Priority Action");
        assert_eq!(improvements[0].priority, Priority::High);
        assert_eq!(
            improvements.last().map(|i| i.section.as_str()),
            Some("Overall Strategy")
        );
        assert!(analysis.overall_score < 70);
    }

    #[test]
    fn improvements_quote_metric_values() {
        let analysis = analyze("<p>Too short to matter.</p>");
        let schema: Vec<&ContentImprovement> = analysis
            .content_improvements
            .iter()
            .filter(|i| i.category == Some(Category::SchemaAnalysis))
            .collect();
        assert_eq!(schema.len(), 4);
        assert!(schema.iter().any(|i| i.current == "schemaPresence: 0/100"));
        assert!(schema.iter().all(|i| i.priority == Priority::High));
    }

    #[test]
    fn debug_info_reports_configuration() {
        let analysis =
            analyze("<main><h1>Title</h1><p>Some readable body text goes here.</p></main>");
        let debug = &analysis.debug_info;
        assert_eq!(debug.source_kind, "manual");
        assert_eq!(debug.heading_count, 1);
        assert_eq!(debug.bot_view_container, "main");
        assert_eq!(debug.category_weights.len(), 7);
        assert!((debug.category_weights.values().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(debug.retention_percent <= 100);
    }
}
