use super::{CategoryScorer, Metric, MetricAdvice, finalize, ratio_score};
use crate::patterns::SCHEMA_TYPES;
use crate::signals::structured_data::StructuredDataSignals;
use crate::types::{Category, CategoryScore, ExtractedContent, Priority};

pub(crate) static PRESENCE: MetricAdvice = MetricAdvice {
    name: "schemaPresence",
    finding: "No structured data found",
    recommendation: "Describe the page and its publisher with JSON-LD structured data",
    priority: Priority::High,
    implementation: "<script type=\"application/ld+json\">{\"@context\":\"https://schema.org\",\"@type\":\"Organization\",\"name\":\"...\",\"url\":\"...\"}</script>",
};

pub(crate) static VALIDITY: MetricAdvice = MetricAdvice {
    name: "schemaValidity",
    finding: "Structured data is missing or contains JSON-LD blocks that fail to parse",
    recommendation: "Fix JSON syntax errors in JSON-LD blocks and validate them",
    priority: Priority::High,
    implementation: "Run each block through a JSON-LD validator; check for trailing commas and unescaped quotes",
};

pub(crate) static TYPES: MetricAdvice = MetricAdvice {
    name: "schemaTypes",
    finding: "Structured data uses few of the types search engines reward",
    recommendation: "Add FAQPage, Article, HowTo, Product or BreadcrumbList types where they fit",
    priority: Priority::Medium,
    implementation: "{\"@type\":\"FAQPage\",\"mainEntity\":[{\"@type\":\"Question\",\"name\":\"...\",\"acceptedAnswer\":{\"@type\":\"Answer\",\"text\":\"...\"}}]}",
};

pub(crate) static COMPLETENESS: MetricAdvice = MetricAdvice {
    name: "schemaCompleteness",
    finding: "Structured data entities lack recommended properties",
    recommendation: "Fill in recommended properties such as logo, sameAs, author and datePublished",
    priority: Priority::Low,
    implementation: "Organization: name, url, logo, sameAs, contactPoint, description",
};

/// JSON-LD, microdata and RDFa coverage
#[derive(Debug, Clone)]
pub struct SchemaScorer {
    pub threshold: u8,
}

impl CategoryScorer for SchemaScorer {
    fn category(&self) -> Category {
        Category::SchemaAnalysis
    }

    fn score(&self, content: &ExtractedContent) -> CategoryScore {
        let signals = &content.structured_data_signals;
        let types = SCHEMA_TYPES.score_labels(&signals.schema_types).min(100) as u8;
        let metrics = [
            Metric::new(&PRESENCE, presence(signals)),
            Metric::new(&VALIDITY, validity(signals)),
            Metric::new(&TYPES, types),
            Metric::new(&COMPLETENESS, signals.completeness),
        ];
        finalize(self.category(), &metrics, self.threshold)
    }
}

fn presence(signals: &StructuredDataSignals) -> u8 {
    let json_ld = match signals.valid_json_ld {
        0 => 0,
        1 => 70,
        2 => 85,
        _ => 100,
    };
    let microdata = if signals.microdata_items > 0 { 50 } else { 0 };
    let rdfa = if signals.rdfa_items > 0 { 40 } else { 0 };
    json_ld.max(microdata).max(rdfa)
}

/// Share of JSON-LD blocks that parse; microdata alone counts as valid markup
fn validity(signals: &StructuredDataSignals) -> u8 {
    if signals.json_ld_blocks == 0 {
        return if signals.microdata_items > 0 || signals.rdfa_items > 0 {
            80
        } else {
            0
        };
    }
    ratio_score(signals.valid_json_ld, signals.json_ld_blocks, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::test_support::manual;
    use crate::types::Status;

    #[test]
    fn no_schema_scores_zero() {
        let score = SchemaScorer { threshold: 70 }.score(&manual("<p>Nothing structured.</p>"));
        assert_eq!(score.score, 0);
        assert_eq!(score.status, Status::Critical);
        assert_eq!(score.recommendations.len(), 4);
    }

    #[test]
    fn organization_block_is_needs_improvement() {
        let html = r#"
        <script type="application/ld+json">
        {"@context": "https://schema.org", "@type": "Organization", "name": "Acme", "url": "https://acme.test", "logo": "https://acme.test/logo.png"}
        </script>
        "#;
        let score = SchemaScorer { threshold: 70 }.score(&manual(html));
        assert_eq!(score.metric("schemaPresence"), Some(70));
        assert_eq!(score.metric("schemaValidity"), Some(100));
        assert_eq!(score.metric("schemaTypes"), Some(25));
        assert_eq!(score.metric("schemaCompleteness"), Some(50));
        assert_eq!(score.score, 61);
        assert_eq!(score.status, Status::NeedsImprovement);
    }

    #[test]
    fn invalid_blocks_reduce_validity() {
        let html = r#"
        <script type="application/ld+json">{"@type": "WebSite", "name": "A", "url": "/"}</script>
        <script type="application/ld+json">{"@type": "Product",</script>
        "#;
        let score = SchemaScorer { threshold: 70 }.score(&manual(html));
        assert_eq!(score.metric("schemaValidity"), Some(50));
        assert_eq!(score.metric("schemaPresence"), Some(70));
    }
}
