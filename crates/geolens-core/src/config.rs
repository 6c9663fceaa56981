//! Tunable scoring parameters
//!
//! Every weight and threshold the scorers use lives here so it can be tuned
//! from a TOML file without touching scorer logic. Missing sections fall
//! back to the defaults below.
//!
//! ```toml
//! [weights]
//! ai_optimization = 0.30
//! content_quality = 0.13
//!
//! [thresholds]
//! finding = 65
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GeolensError, Result};
use crate::types::Category;

/// Tolerance used when checking that a weight set sums to 1.0
const WEIGHT_EPSILON: f64 = 1e-6;

/// Top-level analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Version of the pattern tables and defaults this config was tuned against
    pub version: u32,
    pub weights: CategoryWeights,
    pub thresholds: Thresholds,
    pub ai_optimization: AiOptimizationWeights,
    pub content_quality: ContentQualityWeights,
    pub eeat: EeatWeights,
    pub clarity: ClarityTuning,
}

/// Weights of the seven categories in the overall score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub ai_optimization: f64,
    pub content_quality: f64,
    pub technical_crawlability: f64,
    pub eeat: f64,
    pub mobile_optimization: f64,
    pub schema_analysis: f64,
    pub technical_seo: f64,
}

/// Score thresholds that gate findings and content improvements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A sub-metric below this value produces a finding and a recommendation
    pub finding: u8,
    /// A category below this value produces content improvements
    pub improvement: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiOptimizationWeights {
    pub semantic_structure: f64,
    pub answer_potential: f64,
    pub clarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentQualityWeights {
    pub depth: f64,
    pub relevance: f64,
    pub freshness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EeatWeights {
    pub expertise: f64,
    pub authority: f64,
    pub trust: f64,
}

/// Parameters of the semantic clarity heuristic.
///
/// These are coarse proxies, so they are exposed for tuning rather than
/// hard-coded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClarityTuning {
    /// Points deducted per hedge word per 100 words
    pub hedge_penalty: f64,
    /// Lower bound of the ideal average sentence length (words)
    pub ideal_sentence_min: f64,
    /// Upper bound of the ideal average sentence length (words)
    pub ideal_sentence_max: f64,
    /// Personal pronouns per 100 words considered natural conversational tone
    pub pronoun_target: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            version: crate::patterns::PATTERN_SET_VERSION,
            weights: CategoryWeights::default(),
            thresholds: Thresholds::default(),
            ai_optimization: AiOptimizationWeights::default(),
            content_quality: ContentQualityWeights::default(),
            eeat: EeatWeights::default(),
            clarity: ClarityTuning::default(),
        }
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            ai_optimization: 0.25,
            content_quality: 0.18,
            technical_crawlability: 0.16,
            eeat: 0.12,
            mobile_optimization: 0.12,
            schema_analysis: 0.10,
            technical_seo: 0.07,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            finding: 70,
            improvement: 70,
        }
    }
}

impl Default for AiOptimizationWeights {
    fn default() -> Self {
        Self {
            semantic_structure: 0.45,
            answer_potential: 0.35,
            clarity: 0.20,
        }
    }
}

impl Default for ContentQualityWeights {
    fn default() -> Self {
        Self {
            depth: 0.40,
            relevance: 0.35,
            freshness: 0.25,
        }
    }
}

impl Default for EeatWeights {
    fn default() -> Self {
        Self {
            expertise: 0.40,
            authority: 0.35,
            trust: 0.25,
        }
    }
}

impl Default for ClarityTuning {
    fn default() -> Self {
        Self {
            hedge_penalty: 4.0,
            ideal_sentence_min: 12.0,
            ideal_sentence_max: 22.0,
            pronoun_target: 2.0,
        }
    }
}

impl CategoryWeights {
    /// Weight of a single category
    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::TechnicalSeo => self.technical_seo,
            Category::ContentQuality => self.content_quality,
            Category::AiOptimization => self.ai_optimization,
            Category::Eeat => self.eeat,
            Category::TechnicalCrawlability => self.technical_crawlability,
            Category::MobileOptimization => self.mobile_optimization,
            Category::SchemaAnalysis => self.schema_analysis,
        }
    }

    pub fn sum(&self) -> f64 {
        Category::ALL.iter().map(|c| self.weight(*c)).sum()
    }
}

impl AnalyzerConfig {
    /// Parse a TOML document and validate the result
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check that every weight set sums to 1.0 and thresholds are in range
    pub fn validate(&self) -> Result<()> {
        let weights: Vec<f64> = Category::ALL
            .iter()
            .map(|c| self.weights.weight(*c))
            .collect();
        check_weight_set("weights", &weights)?;
        check_weight_set(
            "ai_optimization",
            &[
                self.ai_optimization.semantic_structure,
                self.ai_optimization.answer_potential,
                self.ai_optimization.clarity,
            ],
        )?;
        check_weight_set(
            "content_quality",
            &[
                self.content_quality.depth,
                self.content_quality.relevance,
                self.content_quality.freshness,
            ],
        )?;
        check_weight_set(
            "eeat",
            &[self.eeat.expertise, self.eeat.authority, self.eeat.trust],
        )?;

        if self.thresholds.finding > 100 || self.thresholds.improvement > 100 {
            return Err(GeolensError::Config(
                "thresholds must be within 0-100".to_string(),
            ));
        }

        let clarity = &self.clarity;
        if !(clarity.hedge_penalty >= 0.0 && clarity.pronoun_target >= 0.0) {
            return Err(GeolensError::Config(
                "clarity.hedge_penalty and clarity.pronoun_target must be non-negative"
                    .to_string(),
            ));
        }
        if !(clarity.ideal_sentence_min > 0.0
            && clarity.ideal_sentence_min < clarity.ideal_sentence_max)
        {
            return Err(GeolensError::Config(format!(
                "clarity sentence band is empty: {} .. {}",
                clarity.ideal_sentence_min, clarity.ideal_sentence_max
            )));
        }

        Ok(())
    }
}

fn check_weight_set(section: &str, weights: &[f64]) -> Result<()> {
    if let Some(bad) = weights.iter().find(|w| !(0.0..=1.0).contains(*w)) {
        return Err(GeolensError::Config(format!(
            "[{section}] weight {bad} is outside 0.0-1.0"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_EPSILON {
        return Err(GeolensError::Config(format!(
            "[{section}] weights sum to {sum:.4}, expected 1.0"
        )));
    }
    Ok(())
}
