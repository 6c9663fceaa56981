use super::{CategoryScorer, Metric, MetricAdvice, clamp_score, finalize};
use crate::config::EeatWeights;
use crate::patterns::{AUTHORITY_CUES, TRUST_CUES};
use crate::types::{Category, CategoryScore, ExtractedContent, PageSource, Priority};

pub(crate) static EXPERTISE: MetricAdvice = MetricAdvice {
    name: "expertise",
    finding: "Author credentials and first-hand expertise are not visible",
    recommendation: "Add an author byline with credentials and relevant experience",
    priority: Priority::High,
    implementation: "<p class=\"byline\">By Dr. Jane Doe, certified nutritionist with 12 years of clinical experience</p>",
};

pub(crate) static AUTHORITY: MetricAdvice = MetricAdvice {
    name: "authority",
    finding: "Claims are not backed by citations or authoritative sources",
    recommendation: "Cite research and link to authoritative external sources",
    priority: Priority::Medium,
    implementation: "According to a 2024 study published in <a href=\"https://...\">Journal Name</a>, ...",
};

pub(crate) static TRUST: MetricAdvice = MetricAdvice {
    name: "trust",
    finding: "Trust signals (HTTPS, contact details, policies) are missing",
    recommendation: "Serve over HTTPS and link contact details, privacy policy and terms from every page",
    priority: Priority::Medium,
    implementation: "<footer><a href=\"/contact\">Contact us</a> <a href=\"/privacy\">Privacy policy</a> <a href=\"/terms\">Terms</a></footer>",
};

/// Experience, expertise, authoritativeness and trust cues
#[derive(Debug, Clone)]
pub struct EeatScorer {
    pub weights: EeatWeights,
    pub threshold: u8,
}

impl CategoryScorer for EeatScorer {
    fn category(&self) -> Category {
        Category::Eeat
    }

    fn score(&self, content: &ExtractedContent) -> CategoryScore {
        let metrics = [
            Metric::weighted(&EXPERTISE, expertise(content), self.weights.expertise),
            Metric::weighted(&AUTHORITY, authority(content), self.weights.authority),
            Metric::weighted(&TRUST, trust(content), self.weights.trust),
        ];
        finalize(self.category(), &metrics, self.threshold)
    }
}

fn expertise(content: &ExtractedContent) -> u8 {
    let authority = &content.ai_signals.authority;
    let mut score = authority.credential_score.min(60) as f64;
    score += (authority.expertise_areas.len() as f64 * 10.0).min(20.0);
    if authority.has_author_byline || content.page_meta.author.is_some() {
        score += 20.0;
    }
    clamp_score(score)
}

fn authority(content: &ExtractedContent) -> u8 {
    let mut score = AUTHORITY_CUES.weighted_score(&content.text_content, 3).min(50) as f64;
    score += (content.ai_signals.authority.external_links as f64 * 5.0).min(25.0);

    let types = &content.structured_data_signals.schema_types;
    if types
        .iter()
        .any(|t| t == "Organization" || t == "Person" || t == "Corporation")
    {
        score += 15.0;
    }
    if content
        .links
        .iter()
        .any(|link| link.internal && link.href.to_ascii_lowercase().contains("about"))
    {
        score += 10.0;
    }
    clamp_score(score)
}

fn trust(content: &ExtractedContent) -> u8 {
    let https = match &content.source {
        PageSource::Crawled(meta) => meta.is_https,
        PageSource::Manual => content.url.starts_with("https://"),
    };

    let mut score = 0.0;
    if https {
        score += 25.0;
    }
    score += TRUST_CUES.weighted_score(&content.text_content, 1).min(35) as f64;

    let hrefs: Vec<String> = content
        .links
        .iter()
        .map(|link| link.href.to_ascii_lowercase())
        .collect();
    if hrefs
        .iter()
        .any(|href| href.contains("privacy") || href.contains("terms"))
    {
        score += 15.0;
    }
    if hrefs.iter().any(|href| {
        href.contains("contact") || href.starts_with("mailto:") || href.starts_with("tel:")
    }) {
        score += 15.0;
    }
    if content.page_meta.author.is_some() || content.ai_signals.authority.has_author_byline {
        score += 10.0;
    }
    clamp_score(score)
}
