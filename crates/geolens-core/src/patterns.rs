//! Named, versioned pattern tables
//!
//! The keyword and phrase families the detectors and scorers count live here
//! as data: each table maps a category to a case-insensitive regex and a
//! weight. Tables are compiled once and shared.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Version of the pattern set as a whole; bump when any table changes
pub const PATTERN_SET_VERSION: u32 = 1;

/// One pattern of a table
#[derive(Debug)]
pub struct PatternEntry {
    pub category: &'static str,
    pub regex: Regex,
    pub weight: u32,
}

/// A named family of weighted patterns
#[derive(Debug)]
pub struct PatternTable {
    pub name: &'static str,
    pub version: u32,
    pub entries: Vec<PatternEntry>,
}

impl PatternTable {
    fn new(name: &'static str, version: u32, specs: &[(&'static str, &str, u32)]) -> Self {
        let entries = specs
            .iter()
            .map(|&(category, pattern, weight)| PatternEntry {
                category,
                regex: Regex::new(&format!("(?i){pattern}"))
                    .unwrap_or_else(|e| panic!("invalid pattern in table {name}: {e}")),
                weight,
            })
            .collect();
        Self {
            name,
            version,
            entries,
        }
    }

    /// Total number of matches across all entries
    pub fn count(&self, text: &str) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.regex.find_iter(text).count())
            .sum()
    }

    /// Match counts per category
    pub fn count_by_category(&self, text: &str) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            let found = entry.regex.find_iter(text).count();
            if found > 0 {
                *counts.entry(entry.category).or_insert(0) += found;
            }
        }
        counts
    }

    /// Sum of `weight * min(matches, cap)` over all entries
    pub fn weighted_score(&self, text: &str, cap_per_entry: usize) -> u32 {
        self.entries
            .iter()
            .map(|entry| {
                let found = entry.regex.find_iter(text).count().min(cap_per_entry);
                entry.weight * found as u32
            })
            .sum()
    }

    /// Sum of the weights of entries matching at least one label; each entry counts once
    pub fn score_labels(&self, labels: &[String]) -> u32 {
        self.entries
            .iter()
            .filter(|entry| labels.iter().any(|label| entry.regex.is_match(label)))
            .map(|entry| entry.weight)
            .sum()
    }

    /// Whether any entry matches
    pub fn is_match(&self, text: &str) -> bool {
        self.entries.iter().any(|entry| entry.regex.is_match(text))
    }
}

/// Credential and qualification mentions
pub static CREDENTIALS: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "credentials",
        1,
        &[
            (
                "degree",
                r"\b(ph\.?d|m\.d\.|mba|msc|bsc|master'?s degree|bachelor'?s degree|doctorate)\b",
                15,
            ),
            (
                "certification",
                r"\b(certified|certification|licensed|accredited|chartered)\b",
                12,
            ),
            (
                "experience",
                r"\b\d+\+?\s+years?\s+(of\s+)?(experience|expertise|practice)\b",
                15,
            ),
            (
                "role",
                r"\b(expert|specialist|professor|researcher|consultant|physician|attorney|analyst|engineer)s?\b",
                8,
            ),
            (
                "recognition",
                r"\b(award[- ]winning|awarded|recognized by|featured in)\b",
                10,
            ),
        ],
    )
});

/// Industry vocabulary that signals first-hand domain expertise
pub static INDUSTRY_EXPERTISE: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "industry_expertise",
        1,
        &[
            (
                "health",
                r"\b(clinical|diagnosis|treatment|symptoms|patients?|dosage|medical)\b",
                5,
            ),
            (
                "finance",
                r"\b(portfolio|investment|interest rates?|tax(es)?|revenue|dividends?|roi)\b",
                5,
            ),
            (
                "technology",
                r"\b(api|framework|architecture|deployment|algorithm|latency|database)s?\b",
                5,
            ),
            (
                "legal",
                r"\b(regulation|compliance|statute|liability|jurisdiction|contract)s?\b",
                5,
            ),
            (
                "marketing",
                r"\b(conversion rate|seo|audience|engagement|funnel|campaign)s?\b",
                5,
            ),
            (
                "science",
                r"\b(hypothesis|methodology|peer[- ]reviewed|experiment|dataset|sample size)s?\b",
                5,
            ),
        ],
    )
});

/// Phrases that indicate a topic is covered from several angles
pub static TOPIC_COVERAGE: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "topic_coverage",
        1,
        &[
            ("guide", r"\b(how to|step[- ]by[- ]step|guide|tutorial)\b", 10),
            ("explanation", r"\b(what is|overview|introduction|definition)\b", 10),
            ("comparison", r"\b(versus|compared to|comparison|alternatives?)\b|\bvs\.?\s", 8),
            ("examples", r"\b(for example|for instance|such as|e\.g\.)", 8),
            ("benefits", r"\b(benefits?|advantages?|pros and cons|drawbacks?)\b", 8),
            ("practical", r"\b(tips?|best practices?|checklist|mistakes to avoid)\b", 8),
            ("summary", r"\b(in summary|conclusion|key takeaways?|tl;dr)\b", 8),
        ],
    )
});

/// Citation and research cues
pub static AUTHORITY_CUES: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "authority_cues",
        1,
        &[
            ("citation", r"\b(according to|cited by|references?)\b|\bsources?:", 10),
            (
                "research",
                r"\b(study|studies|research|survey|report|analysis)\s+(shows?|found|finds|suggests?|indicates?|revealed)\b",
                12,
            ),
            ("publication", r"\b(journal|published in|university|institute)\b", 8),
            ("data", r"\b(data from|statistics|census|official figures)\b", 6),
        ],
    )
});

/// Transparency and trust cues
pub static TRUST_CUES: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "trust_cues",
        1,
        &[
            ("contact", r"\b(contact us|customer service|customer support|call us)\b", 10),
            (
                "policy",
                r"\b(privacy policy|terms of (service|use)|cookie policy|refund policy)\b",
                10,
            ),
            (
                "transparency",
                r"\b(about us|our team|editorial (policy|standards)|fact[- ]checked|reviewed by)\b",
                10,
            ),
            ("social_proof", r"\b(testimonials?|customer reviews?|rated \d|trusted by)\b", 6),
            ("security", r"\b(secure checkout|ssl|encrypted|gdpr|money[- ]back guarantee)\b", 6),
        ],
    )
});

/// Hedge words that weaken a statement
pub static HEDGE_WORDS: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "hedge_words",
        1,
        &[(
            "hedge",
            r"\b(maybe|perhaps|possibly|probably|might|could be|somewhat|arguably|seemingly|sort of|kind of|i think|i guess)\b",
            1,
        )],
    )
});

/// Heading or sentence openers that phrase a question
pub static QUESTION_MARKERS: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "question_markers",
        1,
        &[
            ("interrogative", r"^\s*(what|how|why|when|where|who|which)\b", 1),
            ("auxiliary", r"^\s*(can|should|is|are|does|do|will)\s+\w+", 1),
        ],
    )
});

/// Sentences that define a term
pub static DEFINITIONS: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "definitions",
        1,
        &[
            (
                "explicit",
                r"\b(is defined as|refers to|is a type of|is known as|stands for|means that)\b",
                1,
            ),
            ("copula", r"\b\w+ (is|are) (a|an) \w+ (that|which|used|designed)\b", 1),
        ],
    )
});

/// Verifiable facts: figures, dates, attributions
pub static FACTUAL: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "factual",
        1,
        &[
            ("percentage", r"\b\d+(\.\d+)?\s?%", 1),
            (
                "figure",
                r"\b\d{1,3}(,\d{3})+\b|\b\d+(\.\d+)?\s?(million|billion|thousand)\b",
                1,
            ),
            ("currency", r"[$€£]\s?\d+", 1),
            ("year", r"\b(19|20)\d{2}\b", 1),
            ("attribution", r"\b(according to|data from|reported by)\b", 1),
            (
                "measurement",
                r"\b\d+(\.\d+)?\s?(kg|km|mb|gb|ms|hours?|minutes?|days?)\b",
                1,
            ),
        ],
    )
});

/// Conversational phrasing that voice assistants favour
pub static CONVERSATIONAL: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "conversational",
        1,
        &[
            (
                "question",
                r"\b(what|how|why|when|where|who)\s+(is|are|do|does|can|should|to)\b",
                1,
            ),
            (
                "local",
                r"\b(near me|nearby|in your area|directions to|opening hours|open now)\b",
                1,
            ),
            ("action", r"\b(call|book|order|find|get)\s+(now|today|online)\b", 1),
        ],
    )
});

/// Personal pronouns, used as a proxy for natural language
pub static PRONOUNS: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "pronouns",
        1,
        &[
            ("second_person", r"\b(you|your|yours)\b", 1),
            ("first_person", r"\b(we|our|us)\b", 1),
        ],
    )
});

/// Visible freshness cues
pub static FRESHNESS: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "freshness",
        1,
        &[
            ("updated", r"\b(last (updated|modified|reviewed)|updated on|revised)\b", 30),
            ("published", r"\b(published|posted) on\b", 15),
            ("recent_year", r"\b20[2-3]\d\b", 10),
        ],
    )
});

/// Call-to-action markup on links
pub static CALL_TO_ACTION: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "call_to_action",
        1,
        &[
            ("class", r"\b(btn|button|cta)\b", 1),
            (
                "text",
                r"^\s*(get started|sign up|buy now|learn more|contact us|try|download|subscribe|book)\b",
                1,
            ),
        ],
    )
});

/// Schema.org types and how much each tells a search engine about the page
pub static SCHEMA_TYPES: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::new(
        "schema_types",
        1,
        &[
            ("Organization", r"^(Organization|Corporation)$", 25),
            ("LocalBusiness", r"^(LocalBusiness|Store|Restaurant)$", 25),
            ("WebSite", r"^WebSite$", 15),
            ("WebPage", r"^(WebPage|AboutPage|ContactPage|CollectionPage)$", 10),
            ("Article", r"^(Article|NewsArticle|BlogPosting|TechArticle)$", 25),
            ("FAQPage", r"^FAQPage$", 30),
            ("QAPage", r"^QAPage$", 25),
            ("HowTo", r"^HowTo$", 25),
            ("BreadcrumbList", r"^BreadcrumbList$", 15),
            ("Product", r"^(Product|ProductGroup)$", 25),
            ("Person", r"^Person$", 15),
            ("Review", r"^(Review|AggregateRating)$", 15),
            ("Event", r"^Event$", 15),
            ("Recipe", r"^Recipe$", 20),
            ("VideoObject", r"^VideoObject$", 15),
            ("Speakable", r"^SpeakableSpecification$", 10),
        ],
    )
});

/// Every table, for listing and validation
pub fn all_tables() -> Vec<&'static PatternTable> {
    vec![
        &CREDENTIALS,
        &INDUSTRY_EXPERTISE,
        &TOPIC_COVERAGE,
        &AUTHORITY_CUES,
        &TRUST_CUES,
        &HEDGE_WORDS,
        &QUESTION_MARKERS,
        &DEFINITIONS,
        &FACTUAL,
        &CONVERSATIONAL,
        &PRONOUNS,
        &FRESHNESS,
        &CALL_TO_ACTION,
        &SCHEMA_TYPES,
    ]
}
