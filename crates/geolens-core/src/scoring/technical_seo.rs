use url::Url;

use super::{CategoryScorer, Metric, MetricAdvice, finalize, ratio_score};
use crate::types::{Category, CategoryScore, ExtractedContent, Heading, Priority};

pub(crate) static TITLE: MetricAdvice = MetricAdvice {
    name: "titleOptimization",
    finding: "Title tag is missing or outside the 30-60 character range",
    recommendation: "Write a descriptive 30-60 character title that leads with the main topic",
    priority: Priority::High,
    implementation: "<title>Primary Topic: Specific Benefit | Brand</title>",
};

pub(crate) static META_DESCRIPTION: MetricAdvice = MetricAdvice {
    name: "metaDescription",
    finding: "Meta description is missing or outside the 120-160 character range",
    recommendation: "Add a 120-160 character meta description that summarises the page",
    priority: Priority::High,
    implementation: "<meta name=\"description\" content=\"One or two sentences answering what the page offers.\">",
};

pub(crate) static HEADINGS: MetricAdvice = MetricAdvice {
    name: "headingStructure",
    finding: "Heading hierarchy is incomplete (single H1, nested H2/H3 expected)",
    recommendation: "Use exactly one H1 and nest H2 and H3 headings without skipping levels",
    priority: Priority::Medium,
    implementation: "<h1>Topic</h1> <h2>Subtopic</h2> <h3>Detail</h3>",
};

pub(crate) static URL: MetricAdvice = MetricAdvice {
    name: "urlStructure",
    finding: "URL is not short, lowercase and served over HTTPS",
    recommendation: "Serve the page over HTTPS with a short, lowercase, hyphenated path",
    priority: Priority::Low,
    implementation: "https://example.com/topic/descriptive-page-name",
};

pub(crate) static IMAGES: MetricAdvice = MetricAdvice {
    name: "imageOptimization",
    finding: "Images are missing alt attributes",
    recommendation: "Give every meaningful image descriptive alt text",
    priority: Priority::Medium,
    implementation: "<img src=\"chart.png\" alt=\"Bar chart of monthly sales growth in 2024\">",
};

pub(crate) static SOCIAL: MetricAdvice = MetricAdvice {
    name: "socialMeta",
    finding: "Canonical link or social sharing tags are missing",
    recommendation: "Add a canonical link plus Open Graph and Twitter card tags",
    priority: Priority::Low,
    implementation: "<link rel=\"canonical\" href=\"...\"> <meta property=\"og:title\" content=\"...\"> <meta name=\"twitter:card\" content=\"summary_large_image\">",
};

/// Classic on-page SEO: title, description, headings, URL, images, social tags
#[derive(Debug, Clone)]
pub struct TechnicalSeoScorer {
    pub threshold: u8,
}

impl CategoryScorer for TechnicalSeoScorer {
    fn category(&self) -> Category {
        Category::TechnicalSeo
    }

    fn score(&self, content: &ExtractedContent) -> CategoryScore {
        let meta = &content.page_meta;
        let with_alt = content.images.iter().filter(|img| img.alt.is_some()).count();

        let mut social = 0u8;
        if meta.canonical.is_some() {
            social += 30;
        }
        for (key, points) in [("og:title", 20), ("og:description", 20), ("og:image", 15)] {
            if meta.open_graph.contains_key(key) {
                social += points;
            }
        }
        if meta.twitter.contains_key("twitter:card") {
            social += 15;
        }

        let metrics = [
            Metric::new(&TITLE, title_score(&content.title)),
            Metric::new(&META_DESCRIPTION, description_score(&content.meta_description)),
            Metric::new(&HEADINGS, heading_score(&content.headings)),
            Metric::new(&URL, url_score(&content.url)),
            // No images: nothing to fix
            Metric::new(&IMAGES, ratio_score(with_alt, content.images.len(), 100)),
            Metric::new(&SOCIAL, social),
        ];
        finalize(self.category(), &metrics, self.threshold)
    }
}

fn title_score(title: &str) -> u8 {
    match title.chars().count() {
        0 => 0,
        30..=60 => 100,
        10..=29 | 61..=70 => 70,
        _ => 40,
    }
}

fn description_score(description: &str) -> u8 {
    match description.chars().count() {
        0 => 0,
        120..=160 => 100,
        70..=119 | 161..=200 => 75,
        _ => 40,
    }
}

/// Zero headings score 0
pub(crate) fn heading_score(headings: &[Heading]) -> u8 {
    if headings.is_empty() {
        return 0;
    }

    let h1_count = headings.iter().filter(|h| h.level == 1).count();
    let mut score = match h1_count {
        0 => 0,
        1 => 40,
        _ => 20,
    };

    // Going deeper never skips a level, e.g. H2 straight to H4
    let ordered = headings
        .windows(2)
        .all(|pair| pair[1].level <= pair[0].level + 1);
    if ordered && headings[0].level <= 2 {
        score += 30;
    }
    if headings.iter().any(|h| h.level == 2) {
        score += 20;
    }
    if headings.iter().any(|h| h.level == 3) || headings.len() >= 3 {
        score += 10;
    }
    score
}

/// Unparseable or empty URLs score a neutral 50
fn url_score(url: &str) -> u8 {
    let Ok(parsed) = Url::parse(url) else {
        return 50;
    };

    let path = parsed.path();
    let mut score = 0;
    if parsed.scheme() == "https" {
        score += 25;
    }
    let depth = path.split('/').filter(|segment| !segment.is_empty()).count();
    if path.len() <= 75 && depth <= 4 {
        score += 25;
    }
    if parsed.query().is_none() {
        score += 25;
    }
    if !path.contains('_') && !path.chars().any(|c| c.is_ascii_uppercase()) {
        score += 25;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::test_support::manual;

    fn heading(level: u8) -> Heading {
        Heading {
            level,
            text: format!("Heading {level}"),
        }
    }

    #[test]
    fn title_length_bands() {
        assert_eq!(title_score(""), 0);
        assert_eq!(title_score("Short"), 40);
        assert_eq!(title_score("A ten char"), 70);
        assert_eq!(title_score(&"x".repeat(45)), 100);
        assert_eq!(title_score(&"x".repeat(65)), 70);
        assert_eq!(title_score(&"x".repeat(90)), 40);
    }

    #[test]
    fn heading_structure_rewards_single_h1_and_nesting() {
        assert_eq!(heading_score(&[]), 0);
        assert_eq!(
            heading_score(&[heading(1), heading(2), heading(2), heading(2)]),
            100
        );
        assert_eq!(heading_score(&[heading(1), heading(1)]), 20 + 30);
        assert_eq!(heading_score(&[heading(1), heading(3)]), 40 + 10);
        assert_eq!(heading_score(&[heading(2), heading(3), heading(3)]), 30 + 20 + 10);
    }

    #[test]
    fn url_structure() {
        assert_eq!(url_score(""), 50);
        assert_eq!(url_score("not a url"), 50);
        assert_eq!(url_score("https://example.com/guides/espresso"), 100);
        assert_eq!(url_score("http://example.com/Guides/My_Page?id=3"), 25);
    }

    #[test]
    fn page_without_images_is_not_penalised() {
        let content = manual("<title>Espresso brewing guide for beginners at home</title><h1>Espresso</h1>");
        let score = TechnicalSeoScorer { threshold: 70 }.score(&content);
        assert_eq!(score.metric("imageOptimization"), Some(100));
        assert_eq!(score.metric("titleOptimization"), Some(100));
        assert_eq!(score.metric("metaDescription"), Some(0));
        assert!(
            score
                .recommendations
                .iter()
                .any(|r| r.metric == "metaDescription" && r.priority == Priority::High)
        );
    }

    #[test]
    fn social_meta_adds_up() {
        let html = r#"
        <head>
            <link rel="canonical" href="https://example.com/guide">
            <meta property="og:title" content="T">
            <meta property="og:description" content="D">
            <meta property="og:image" content="/i.png">
            <meta name="twitter:card" content="summary">
        </head>
        "#;
        let score = TechnicalSeoScorer { threshold: 70 }.score(&manual(html));
        assert_eq!(score.metric("socialMeta"), Some(100));
    }
}
