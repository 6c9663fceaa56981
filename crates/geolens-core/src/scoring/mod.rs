//! Category scorers
//!
//! Seven independent scorers, one per [`Category`]. Each computes a handful
//! of 0-100 sub-metrics from an [`ExtractedContent`] and combines them into a
//! [`CategoryScore`], either as a plain mean or a configured weighted sum.
//! Sub-metrics under the finding threshold attach a canned finding and a
//! [`Recommendation`].

mod ai_optimization;
mod content_quality;
mod crawlability;
mod eeat;
mod mobile;
mod schema;
mod technical_seo;

pub use ai_optimization::AiOptimizationScorer;
pub use content_quality::ContentQualityScorer;
pub use crawlability::CrawlabilityScorer;
pub use eeat::EeatScorer;
pub use mobile::MobileScorer;
pub use schema::SchemaScorer;
pub use technical_seo::TechnicalSeoScorer;

use std::collections::BTreeMap;

use crate::config::AnalyzerConfig;
use crate::types::{Category, CategoryScore, ExtractedContent, Priority, Recommendation, Status};

/// A scorer for one category
pub trait CategoryScorer: Send + Sync {
    fn category(&self) -> Category;
    fn score(&self, content: &ExtractedContent) -> CategoryScore;
}

/// The seven default scorers in [`Category::ALL`] order
pub fn default_scorers(config: &AnalyzerConfig) -> Vec<Box<dyn CategoryScorer>> {
    let threshold = config.thresholds.finding;
    vec![
        Box::new(TechnicalSeoScorer { threshold }),
        Box::new(ContentQualityScorer {
            weights: config.content_quality.clone(),
            threshold,
        }),
        Box::new(AiOptimizationScorer {
            weights: config.ai_optimization.clone(),
            clarity: config.clarity.clone(),
            threshold,
        }),
        Box::new(EeatScorer {
            weights: config.eeat.clone(),
            threshold,
        }),
        Box::new(CrawlabilityScorer { threshold }),
        Box::new(MobileScorer { threshold }),
        Box::new(SchemaScorer { threshold }),
    ]
}

/// Canned finding and recommendation of a sub-metric
#[derive(Debug)]
pub(crate) struct MetricAdvice {
    pub name: &'static str,
    pub finding: &'static str,
    pub recommendation: &'static str,
    pub priority: Priority,
    pub implementation: &'static str,
}

/// A computed sub-metric with its weight in the category score
pub(crate) struct Metric {
    pub advice: &'static MetricAdvice,
    pub value: u8,
    pub weight: f64,
}

impl Metric {
    /// Metric that takes part in an unweighted mean
    pub fn new(advice: &'static MetricAdvice, value: u8) -> Self {
        Self {
            advice,
            value: value.min(100),
            weight: 1.0,
        }
    }

    pub fn weighted(advice: &'static MetricAdvice, value: u8, weight: f64) -> Self {
        Self {
            advice,
            value: value.min(100),
            weight,
        }
    }
}

/// Combine sub-metrics into a category score.
///
/// The score is `Σ wᵢ·vᵢ / Σ wᵢ`, which is the plain mean for unit weights
/// and the documented weighted sum for weights that add up to 1.
pub(crate) fn finalize(category: Category, metrics: &[Metric], threshold: u8) -> CategoryScore {
    let total_weight: f64 = metrics.iter().map(|m| m.weight).sum();
    let score = if total_weight > 0.0 {
        let weighted: f64 = metrics.iter().map(|m| m.weight * m.value as f64).sum();
        clamp_score(weighted / total_weight)
    } else {
        0
    };

    let mut findings = Vec::new();
    let mut recommendations = Vec::new();
    for metric in metrics.iter().filter(|m| m.value < threshold) {
        let advice = metric.advice;
        findings.push(format!("{} ({}/100)", advice.finding, metric.value));
        recommendations.push(Recommendation {
            text: advice.recommendation.to_string(),
            priority: advice.priority,
            category,
            metric: advice.name.to_string(),
            implementation: Some(advice.implementation.to_string()),
        });
    }

    let metrics: BTreeMap<String, u8> = metrics
        .iter()
        .map(|m| (m.advice.name.to_string(), m.value))
        .collect();

    CategoryScore {
        category,
        score,
        status: Status::from_score(score),
        findings,
        recommendations,
        metrics,
    }
}

/// Round and clamp into 0-100
pub(crate) fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Fraction of `part` in `total` as 0-100, `empty` when `total` is zero
pub(crate) fn ratio_score(part: usize, total: usize, empty: u8) -> u8 {
    if total == 0 {
        empty
    } else {
        clamp_score(part as f64 * 100.0 / total as f64)
    }
}

/// Canned advice of a sub-metric, looked up by name across all scorers
pub(crate) fn metric_advice(name: &str) -> Option<&'static MetricAdvice> {
    ALL_ADVICE.iter().copied().find(|advice| advice.name == name)
}

static ALL_ADVICE: &[&MetricAdvice] = &[
    &technical_seo::TITLE,
    &technical_seo::META_DESCRIPTION,
    &technical_seo::HEADINGS,
    &technical_seo::URL,
    &technical_seo::IMAGES,
    &technical_seo::SOCIAL,
    &content_quality::DEPTH,
    &content_quality::RELEVANCE,
    &content_quality::FRESHNESS,
    &ai_optimization::SEMANTIC_STRUCTURE,
    &ai_optimization::ANSWER_POTENTIAL,
    &ai_optimization::CLARITY,
    &eeat::EXPERTISE,
    &eeat::AUTHORITY,
    &eeat::TRUST,
    &crawlability::ROBOTS,
    &crawlability::INDEXABILITY,
    &crawlability::BOT_ACCESS,
    &crawlability::LINKS,
    &crawlability::PERFORMANCE,
    &mobile::VIEWPORT,
    &mobile::RESPONSIVE_IMAGES,
    &mobile::MEDIA_QUERIES,
    &mobile::MOBILE_UX,
    &schema::PRESENCE,
    &schema::VALIDITY,
    &schema::TYPES,
    &schema::COMPLETENESS,
];


#[cfg(test)]
mod tests {
    use super::*;

    static A: MetricAdvice = MetricAdvice {
        name: "a",
        finding: "A is low",
        recommendation: "Raise A",
        priority: Priority::High,
        implementation: "Do the A thing",
    };
    static B: MetricAdvice = MetricAdvice {
        name: "b",
        finding: "B is low",
        recommendation: "Raise B",
        priority: Priority::Low,
        implementation: "Do the B thing",
    };

    #[test]
    fn mean_of_unit_weights() {
        let score = finalize(
            Category::TechnicalSeo,
            &[Metric::new(&A, 40), Metric::new(&B, 91)],
            70,
        );
        assert_eq!(score.score, 66);
        assert_eq!(score.status, Status::NeedsImprovement);
        assert_eq!(score.findings, vec!["A is low (40/100)"]);
        assert_eq!(score.recommendations.len(), 1);
        assert_eq!(score.recommendations[0].metric, "a");
        assert_eq!(score.metric("b"), Some(91));
    }

    #[test]
    fn weighted_sum() {
        let score = finalize(
            Category::Eeat,
            &[Metric::weighted(&A, 100, 0.25), Metric::weighted(&B, 0, 0.75)],
            70,
        );
        assert_eq!(score.score, 25);
        assert_eq!(score.findings.len(), 1);
    }

    #[test]
    fn threshold_gates_findings() {
        let score = finalize(Category::MobileOptimization, &[Metric::new(&A, 69)], 60);
        assert!(score.findings.is_empty());
        assert!(score.recommendations.is_empty());
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(clamp_score(130.4), 100);
        assert_eq!(clamp_score(-5.0), 0);
        assert_eq!(clamp_score(f64::NAN), 0);
        assert_eq!(Metric::new(&A, 250).value, 100);
    }

    #[test]
    fn ratio_uses_empty_default() {
        assert_eq!(ratio_score(0, 0, 100), 100);
        assert_eq!(ratio_score(1, 3, 100), 33);
    }

    #[test]
    fn default_scorers_cover_every_category_once() {
        let scorers = default_scorers(&AnalyzerConfig::default());
        let categories: Vec<Category> = scorers.iter().map(|s| s.category()).collect();
        assert_eq!(categories, Category::ALL.to_vec());
    }

    #[test]
    fn every_metric_has_advice() {
        assert_eq!(ALL_ADVICE.len(), 28);
        assert!(metric_advice("headingStructure").is_some());
        assert!(metric_advice("unknown").is_none());
    }
}
