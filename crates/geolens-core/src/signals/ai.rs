//! Signals that describe how easily an AI system can read, quote and trust a page

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::parser::{count_elements, select_exists};
use crate::patterns::{
    AUTHORITY_CUES, CONVERSATIONAL, CREDENTIALS, DEFINITIONS, FACTUAL, INDUSTRY_EXPERTISE,
    QUESTION_MARKERS, TOPIC_COVERAGE,
};
use crate::signals::structured_data::StructuredDataSignals;
use crate::types::{Heading, Link};

/// Maximum number of named entities kept
const MAX_ENTITIES: usize = 20;

/// Client-side app mount points that render nothing without JavaScript
const SPA_ROOTS: &str = "#root, #app, #__next, #__nuxt, [data-reactroot], [ng-app], [data-server-rendered]";

static NAMED_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-zA-Z0-9&'-]+(?:\s+[A-Z][a-zA-Z0-9&'-]+)+\b")
        .expect("invalid entity regex")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSignals {
    pub entities: EntitySignals,
    pub answer_formats: AnswerFormats,
    pub authority: AuthoritySignals,
    pub factual: FactualSignals,
    pub bot_accessibility: BotAccessibility,
    pub voice_search: VoiceSearchSignals,
}

/// Named entities mentioned in the text and declared in schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySignals {
    /// Most frequent multi-word proper names, most frequent first
    pub named_entities: Vec<String>,
    pub distinct_count: usize,
    /// Named schema.org entities from JSON-LD
    pub schema_entities: Vec<String>,
}

/// Content shapes that answer engines lift directly
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFormats {
    pub question_headings: usize,
    pub faq_items: usize,
    pub definitions: usize,
    pub lists: usize,
    pub step_lists: usize,
    pub tables: usize,
    pub has_summary: bool,
    /// 0-100
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoritySignals {
    pub credentials: usize,
    /// Weighted credential score, capped
    pub credential_score: u32,
    pub expertise_areas: Vec<String>,
    pub citations: usize,
    pub external_links: usize,
    pub has_author_byline: bool,
    /// 0-100
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactualSignals {
    /// Matches per factual pattern category
    pub counts: BTreeMap<String, usize>,
    pub total: usize,
    pub per_thousand_words: f64,
    /// 0-100
    pub score: u8,
}

/// What a crawler that does not run JavaScript gets out of the raw HTML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotAccessibility {
    /// Visible text length as a share of the HTML length, 0-100
    pub text_to_html_ratio: u8,
    pub word_count: usize,
    pub script_count: usize,
    /// Page looks like an empty client-side app shell
    pub spa_shell: bool,
    pub has_noscript_fallback: bool,
    /// 0-100
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSearchSignals {
    pub conversational_phrases: usize,
    pub local_phrases: usize,
    pub question_headings: usize,
    pub has_speakable: bool,
    /// 0-100
    pub score: u8,
}

/// Inputs the AI detectors share
pub struct AiInput<'a> {
    pub document: &'a Html,
    pub text: &'a str,
    pub word_count: usize,
    pub html_length: usize,
    pub headings: &'a [Heading],
    pub links: &'a [Link],
    pub structured: &'a StructuredDataSignals,
}

/// Run every AI-facing detector over one page
pub fn detect(input: &AiInput<'_>) -> AiSignals {
    let question_headings = input
        .headings
        .iter()
        .filter(|heading| is_question(&heading.text))
        .count();

    AiSignals {
        entities: detect_entities(input),
        answer_formats: detect_answer_formats(input, question_headings),
        authority: detect_authority(input),
        factual: detect_factual(input),
        bot_accessibility: detect_bot_accessibility(input),
        voice_search: detect_voice_search(input, question_headings),
    }
}

/// Heading text phrased as a question
pub fn is_question(text: &str) -> bool {
    text.trim_end().ends_with('?') || QUESTION_MARKERS.is_match(text)
}

fn detect_entities(input: &AiInput<'_>) -> EntitySignals {
    let mut frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for found in NAMED_ENTITY.find_iter(input.text) {
        *frequency.entry(found.as_str()).or_insert(0) += 1;
    }

    let distinct_count = frequency.len();
    let mut ranked: Vec<(&str, usize)> = frequency.into_iter().collect();
    // Stable sort keeps alphabetical order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let schema_entities = input
        .structured
        .entities
        .iter()
        .filter_map(|entity| entity.name.clone())
        .collect();

    EntitySignals {
        named_entities: ranked
            .into_iter()
            .take(MAX_ENTITIES)
            .map(|(name, _)| name.to_string())
            .collect(),
        distinct_count,
        schema_entities,
    }
}

fn detect_answer_formats(input: &AiInput<'_>, question_headings: usize) -> AnswerFormats {
    let document = input.document;
    let faq_items = count_elements(
        document,
        "details, dt, [itemtype*='Question'], [class*='faq-item'], [class*='faq-question']",
    );
    let definitions = DEFINITIONS.count(input.text);
    let unordered = count_elements(document, "ul");
    let step_lists = count_elements(document, "ol");
    let tables = count_elements(document, "table");
    let has_summary = TOPIC_COVERAGE
        .count_by_category(input.text)
        .contains_key("summary");

    let mut score = 0u32;
    score += match question_headings {
        0 => 0,
        1..=2 => 15,
        _ => 25,
    };
    if faq_items > 0 || input.structured.schema_types.iter().any(|t| t == "FAQPage") {
        score += 20;
    }
    if definitions > 0 {
        score += 15;
    }
    if unordered + step_lists > 0 {
        score += 15;
    }
    if step_lists > 0 {
        score += 5;
    }
    if tables > 0 {
        score += 10;
    }
    if has_summary {
        score += 10;
    }

    AnswerFormats {
        question_headings,
        faq_items,
        definitions,
        lists: unordered + step_lists,
        step_lists,
        tables,
        has_summary,
        score: score.min(100) as u8,
    }
}

fn detect_authority(input: &AiInput<'_>) -> AuthoritySignals {
    let credentials = CREDENTIALS.count(input.text);
    let credential_score = CREDENTIALS.weighted_score(input.text, 2);
    let expertise_areas: Vec<String> = INDUSTRY_EXPERTISE
        .count_by_category(input.text)
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(area, _)| area.to_string())
        .collect();
    let citations = AUTHORITY_CUES.count(input.text);
    let external_links = input
        .links
        .iter()
        .filter(|link| !link.internal && link.href.starts_with("http"))
        .count();
    let has_author_byline = select_exists(
        input.document,
        "[rel='author'], [itemprop='author'], [class*='author'], [class*='byline'], meta[name='author']",
    );

    let mut score = credential_score.min(40);
    score += (citations as u32 * 8).min(25);
    score += (external_links as u32 * 5).min(15);
    if has_author_byline {
        score += 15;
    }
    if !expertise_areas.is_empty() {
        score += 5;
    }

    AuthoritySignals {
        credentials,
        credential_score,
        expertise_areas,
        citations,
        external_links,
        has_author_byline,
        score: score.min(100) as u8,
    }
}

fn detect_factual(input: &AiInput<'_>) -> FactualSignals {
    let counts: BTreeMap<String, usize> = FACTUAL
        .count_by_category(input.text)
        .into_iter()
        .map(|(category, count)| (category.to_string(), count))
        .collect();
    let total: usize = counts.values().sum();
    let per_thousand_words = if input.word_count == 0 {
        0.0
    } else {
        total as f64 * 1000.0 / input.word_count as f64
    };

    // Around 10 facts per 1000 words reads as well supported
    let score = (per_thousand_words * 10.0).round().clamp(0.0, 100.0) as u8;

    FactualSignals {
        counts,
        total,
        per_thousand_words,
        score,
    }
}

fn detect_bot_accessibility(input: &AiInput<'_>) -> BotAccessibility {
    let text_to_html_ratio = if input.html_length == 0 {
        0
    } else {
        (input.text.len() as f64 * 100.0 / input.html_length as f64)
            .round()
            .clamp(0.0, 100.0) as u8
    };
    let script_count = count_elements(input.document, "script:not([type='application/ld+json'])");
    let spa_shell = input.word_count < 50 && select_exists(input.document, SPA_ROOTS);
    let has_noscript_fallback = select_exists(input.document, "noscript");

    let mut score = match text_to_html_ratio {
        25..=u8::MAX => 40,
        10..=24 => 30,
        5..=9 => 20,
        _ => 10,
    };
    score += match input.word_count {
        0 => 0,
        1..=99 => 10,
        100..=299 => 20,
        _ => 30,
    };
    if !spa_shell {
        score += 20;
    } else if has_noscript_fallback {
        score += 5;
    }
    if script_count <= 20 {
        score += 10;
    }

    BotAccessibility {
        text_to_html_ratio,
        word_count: input.word_count,
        script_count,
        spa_shell,
        has_noscript_fallback,
        score: score.min(100),
    }
}

fn detect_voice_search(input: &AiInput<'_>, question_headings: usize) -> VoiceSearchSignals {
    let phrases = CONVERSATIONAL.count_by_category(input.text);
    let conversational_phrases: usize = phrases.values().sum();
    let local_phrases = phrases.get("local").copied().unwrap_or(0);
    let has_speakable = input.structured.has_speakable;

    let mut score = 0u32;
    score += match question_headings {
        0 => 0,
        1..=2 => 25,
        _ => 35,
    };
    if conversational_phrases > 0 {
        score += 20;
    }
    if has_speakable {
        score += 20;
    }
    if input
        .structured
        .schema_types
        .iter()
        .any(|t| t == "FAQPage" || t == "HowTo" || t == "QAPage")
    {
        score += 15;
    }
    if local_phrases > 0 {
        score += 10;
    }

    VoiceSearchSignals {
        conversational_phrases,
        local_phrases,
        question_headings,
        has_speakable,
        score: score.min(100) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str, text: &str, headings: &[Heading], links: &[Link]) -> AiSignals {
        let document = Html::parse_document(html);
        let structured = StructuredDataSignals::default();
        detect(&AiInput {
            document: &document,
            text,
            word_count: text.split_whitespace().count(),
            html_length: html.len(),
            headings,
            links,
            structured: &structured,
        })
    }

    fn heading(level: u8, text: &str) -> Heading {
        Heading {
            level,
            text: text.to_string(),
        }
    }

    #[test]
    fn question_headings_feed_answer_and_voice_signals() {
        let headings = vec![
            heading(1, "Caching guide"),
            heading(2, "What is a cache?"),
            heading(2, "How does eviction work"),
        ];
        let signals = run("<ol><li>One</li></ol>", "A cache is a store that keeps data.", &headings, &[]);

        assert_eq!(signals.answer_formats.question_headings, 2);
        assert_eq!(signals.answer_formats.step_lists, 1);
        assert!(signals.answer_formats.definitions >= 1);
        assert_eq!(signals.voice_search.question_headings, 2);
        assert!(signals.voice_search.score >= 25);
    }

    #[test]
    fn entities_are_ranked_by_frequency() {
        let text = "Acme Corp hired Jane Doe. Jane Doe leads research at Acme Corp. Jane Doe writes.";
        let signals = run("", text, &[], &[]);
        assert_eq!(signals.entities.named_entities[0], "Jane Doe");
        assert!(signals.entities.named_entities.contains(&"Acme Corp".to_string()));
    }

    #[test]
    fn spa_shell_is_flagged() {
        let html = r#"<html><body><div id="root"></div><script src="/app.js"></script></body></html>"#;
        let signals = run(html, "", &[], &[]);
        assert!(signals.bot_accessibility.spa_shell);
        assert!(signals.bot_accessibility.score < 50);
    }

    #[test]
    fn empty_text_has_zero_factual_density() {
        let signals = run("", "", &[], &[]);
        assert_eq!(signals.factual.total, 0);
        assert_eq!(signals.factual.score, 0);
    }

    #[test]
    fn authority_counts_external_links_and_bylines() {
        let links = vec![
            Link {
                href: "https://journal.example.org/paper".to_string(),
                text: "paper".to_string(),
                internal: false,
            },
            Link {
                href: "/about".to_string(),
                text: "About".to_string(),
                internal: true,
            },
        ];
        let html = r#"<p class="byline">By Jane Doe</p>"#;
        let text = "According to a study published in a journal, research shows results.";
        let signals = run(html, text, &[], &links);

        assert_eq!(signals.authority.external_links, 1);
        assert!(signals.authority.has_author_byline);
        assert!(signals.authority.citations >= 2);
        assert!(signals.authority.score > 0);
    }

    #[test]
    fn scores_stay_in_range() {
        let text = "What is it? ".repeat(500) + &"50% of $10 in 2024 ".repeat(200);
        let signals = run("<table></table><ul></ul><details></details>", &text, &[], &[]);
        for score in [
            signals.answer_formats.score,
            signals.authority.score,
            signals.factual.score,
            signals.bot_accessibility.score,
            signals.voice_search.score,
        ] {
            assert!(score <= 100);
        }
    }
}
