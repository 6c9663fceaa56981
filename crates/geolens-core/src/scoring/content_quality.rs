use std::collections::BTreeSet;

use super::{CategoryScorer, Metric, MetricAdvice, clamp_score, finalize};
use crate::config::ContentQualityWeights;
use crate::patterns::{self, TOPIC_COVERAGE};
use crate::types::{Category, CategoryScore, ExtractedContent, Priority};

pub(crate) static DEPTH: MetricAdvice = MetricAdvice {
    name: "depth",
    finding: "Content is thin for the topic",
    recommendation: "Expand the page into a comprehensive answer of at least 1000 words",
    priority: Priority::High,
    implementation: "Cover definitions, steps, examples, edge cases and an FAQ for the main topic",
};

pub(crate) static RELEVANCE: MetricAdvice = MetricAdvice {
    name: "relevance",
    finding: "Body text does not reinforce the title topic",
    recommendation: "Use the title's key terms in the body and cover the topic from several angles",
    priority: Priority::Medium,
    implementation: "Add sections such as 'What is ...', 'How to ...', 'Benefits' and 'Key takeaways'",
};

pub(crate) static FRESHNESS: MetricAdvice = MetricAdvice {
    name: "freshness",
    finding: "No publication or update date is visible",
    recommendation: "Show when the page was published and last updated",
    priority: Priority::Low,
    implementation: "<time datetime=\"2025-01-15\">Last updated January 15, 2025</time> plus article:modified_time meta",
};

/// Words too common to say anything about topic relevance
const STOPWORDS: &[&str] = &[
    "about", "after", "also", "best", "from", "guide", "have", "home", "into", "more", "page",
    "that", "their", "there", "these", "this", "what", "when", "with", "your",
];

/// Depth, topical relevance and freshness of the body text
#[derive(Debug, Clone)]
pub struct ContentQualityScorer {
    pub weights: ContentQualityWeights,
    pub threshold: u8,
}

impl CategoryScorer for ContentQualityScorer {
    fn category(&self) -> Category {
        Category::ContentQuality
    }

    fn score(&self, content: &ExtractedContent) -> CategoryScore {
        let metrics = [
            Metric::weighted(&DEPTH, depth_score(content.word_count), self.weights.depth),
            Metric::weighted(&RELEVANCE, relevance_score(content), self.weights.relevance),
            Metric::weighted(&FRESHNESS, freshness_score(content), self.weights.freshness),
        ];
        finalize(self.category(), &metrics, self.threshold)
    }
}

/// Zero words score 0
fn depth_score(words: usize) -> u8 {
    match words {
        0 => 0,
        1..=299 => 25,
        300..=599 => 50,
        600..=999 => 70,
        1000..=1999 => 90,
        _ => 100,
    }
}

/// Share of title terms found in the body, plus topic coverage cues
fn relevance_score(content: &ExtractedContent) -> u8 {
    if content.word_count == 0 {
        return 0;
    }
    let body = content.text_content.to_lowercase();
    let body_words: BTreeSet<&str> = body
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();

    let title = content.title.to_lowercase();
    let terms: BTreeSet<&str> = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 3 && !STOPWORDS.contains(word))
        .collect();

    let overlap = if terms.is_empty() {
        // Without a usable title, judge coverage alone
        30.0
    } else {
        let found = terms.iter().filter(|term| body_words.contains(*term)).count();
        found as f64 * 60.0 / terms.len() as f64
    };
    let coverage = TOPIC_COVERAGE.weighted_score(&content.text_content, 1).min(40) as f64;
    clamp_score(overlap + coverage)
}

/// Starts at 30 and rises with dated metadata and visible update cues
fn freshness_score(content: &ExtractedContent) -> u8 {
    let meta = &content.page_meta;
    let mut score = 30u32;
    if meta.modified_time.is_some() {
        score += 30;
    }
    if meta.published_time.is_some() {
        score += 15;
    }
    if content.ux_signals.structure.time_elements > 0 {
        score += 10;
    }
    score += patterns::FRESHNESS.weighted_score(&content.text_content, 1);
    score.min(100) as u8
}
