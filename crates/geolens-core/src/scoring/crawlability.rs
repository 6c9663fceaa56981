use url::Url;

use super::{CategoryScorer, Metric, MetricAdvice, finalize};
use crate::signals::robots::{AccessLevel, RobotsPolicy};
use crate::types::{Category, CategoryScore, ExtractedContent, PageSource, Priority};

pub(crate) static ROBOTS: MetricAdvice = MetricAdvice {
    name: "robotsAccess",
    finding: "robots.txt blocks or restricts AI crawlers",
    recommendation: "Allow search and AI crawlers such as GPTBot, ClaudeBot and PerplexityBot in robots.txt",
    priority: Priority::High,
    implementation: "User-agent: GPTBot\nAllow: /\n\nUser-agent: *\nAllow: /\nSitemap: https://example.com/sitemap.xml",
};

pub(crate) static INDEXABILITY: MetricAdvice = MetricAdvice {
    name: "indexability",
    finding: "Page is not fully indexable (noindex, nofollow or no canonical)",
    recommendation: "Remove noindex directives and declare a canonical URL",
    priority: Priority::High,
    implementation: "<meta name=\"robots\" content=\"index, follow\"> <link rel=\"canonical\" href=\"https://example.com/page\">",
};

pub(crate) static BOT_ACCESS: MetricAdvice = MetricAdvice {
    name: "botAccessibility",
    finding: "Little content is available without running JavaScript",
    recommendation: "Server-render the main content so crawlers that skip JavaScript can read it",
    priority: Priority::High,
    implementation: "Use server-side rendering or static generation; keep a <noscript> fallback for app shells",
};

pub(crate) static LINKS: MetricAdvice = MetricAdvice {
    name: "linkStructure",
    finding: "Few internal links or vague anchor text",
    recommendation: "Link related pages with descriptive anchor text",
    priority: Priority::Medium,
    implementation: "<a href=\"/guides/espresso-grind-size\">espresso grind size guide</a> instead of 'click here'",
};

pub(crate) static PERFORMANCE: MetricAdvice = MetricAdvice {
    name: "performance",
    finding: "Page responds slowly or is very large",
    recommendation: "Reduce server response time and page weight",
    priority: Priority::Medium,
    implementation: "Enable caching and compression, defer non-critical scripts, keep HTML under 2 MB",
};

/// Anchor texts that say nothing about the target
const GENERIC_ANCHORS: &[&str] = &["click here", "here", "read more", "more", "link", "this"];

const LARGE_PAGE_BYTES: usize = 2_000_000;

/// Whether crawlers may fetch, index and read the page
#[derive(Debug, Clone)]
pub struct CrawlabilityScorer {
    pub threshold: u8,
}

impl CategoryScorer for CrawlabilityScorer {
    fn category(&self) -> Category {
        Category::TechnicalCrawlability
    }

    fn score(&self, content: &ExtractedContent) -> CategoryScore {
        let metrics = [
            Metric::new(&ROBOTS, robots_access(content)),
            Metric::new(&INDEXABILITY, indexability(content)),
            Metric::new(&BOT_ACCESS, content.ai_signals.bot_accessibility.score),
            Metric::new(&LINKS, link_structure(content)),
            Metric::new(&PERFORMANCE, performance(&content.source)),
        ];
        finalize(self.category(), &metrics, self.threshold)
    }
}

/// Manual input scores 75 and a missing robots.txt 70.
///
/// Each crawler barred from this page's path costs 15 points, a crawler
/// restricted elsewhere on the site 5, and a robots.txt without a
/// `Sitemap` line 5.
fn robots_access(content: &ExtractedContent) -> u8 {
    let policy = &content.robots_policy;
    let analysis = match policy {
        RobotsPolicy::Manual => return 75,
        RobotsPolicy::Crawled(analysis) => analysis,
    };
    if !analysis.found {
        return 70;
    }
    if analysis.wildcard_blocks_all() {
        return 0;
    }

    let path = page_path(&content.url);
    let mut score: i32 = 100;
    for crawler in &analysis.crawlers {
        if !analysis.allows(&crawler.name, &path) {
            score -= 15;
        } else if matches!(crawler.access, AccessLevel::Partial | AccessLevel::Blocked) {
            score -= 5;
        }
    }
    if policy.sitemaps().is_empty() {
        score -= 5;
    }
    score.clamp(0, 100) as u8
}

/// Path robots rules are matched against; `/` when the URL does not parse
fn page_path(url: &str) -> String {
    Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| "/".to_string())
}

fn indexability(content: &ExtractedContent) -> u8 {
    let meta = &content.page_meta;
    let header = match &content.source {
        PageSource::Crawled(crawl) => crawl.x_robots_tag.as_deref().unwrap_or_default(),
        PageSource::Manual => "",
    }
    .to_ascii_lowercase();

    if meta.noindex || header.contains("noindex") {
        return 10;
    }
    let mut score: i32 = 100;
    if meta.nofollow || header.contains("nofollow") {
        score -= 25;
    }
    if meta.canonical.is_none() {
        score -= 20;
    }
    if let PageSource::Crawled(crawl) = &content.source
        && !(200..300).contains(&crawl.status_code)
    {
        score -= 30;
    }
    score.clamp(0, 100) as u8
}

fn link_structure(content: &ExtractedContent) -> u8 {
    let internal = content.links.iter().filter(|link| link.internal).count();
    let mut score: i32 = match internal {
        0 => 20,
        1..=4 => 50,
        5..=19 => 80,
        _ => 100,
    };

    let generic = content
        .links
        .iter()
        .filter(|link| {
            let text = link.text.trim().to_ascii_lowercase();
            text.is_empty() || GENERIC_ANCHORS.contains(&text.as_str())
        })
        .count();
    if !content.links.is_empty() && generic * 10 > content.links.len() * 3 {
        score -= 15;
    }
    score.clamp(0, 100) as u8
}

/// Manual input scores a neutral 70
fn performance(source: &PageSource) -> u8 {
    let crawl = match source {
        PageSource::Crawled(crawl) => crawl,
        PageSource::Manual => return 70,
    };
    let mut score: i32 = match crawl.response_time_ms {
        0..=499 => 100,
        500..=999 => 85,
        1000..=1999 => 70,
        2000..=3999 => 50,
        _ => 25,
    };
    if crawl.content_length > LARGE_PAGE_BYTES {
        score -= 15;
    }
    score.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::test_support::{crawled, manual};

    #[test]
    fn manual_input_gets_neutral_defaults() {
        let score = CrawlabilityScorer { threshold: 70 }.score(&manual("<p>Hello there reader.</p>"));
        assert_eq!(score.metric("robotsAccess"), Some(75));
        assert_eq!(score.metric("performance"), Some(70));
    }

    #[test]
    fn robots_rules_reduce_access() {
        let open = crawled(
            "<p>x</p>",
            Some("User-agent: *\nAllow: /\nSitemap: https://example.com/sitemap.xml\n"),
            200,
        );
        assert_eq!(robots_access(&open), 100);

        let no_sitemap = crawled("<p>x</p>", Some("User-agent: *\nAllow: /\n"), 200);
        assert_eq!(robots_access(&no_sitemap), 95);

        let blocked = crawled("<p>x</p>", Some("User-agent: *\nDisallow: /\n"), 200);
        assert_eq!(robots_access(&blocked), 0);

        let gptbot = crawled(
            "<p>x</p>",
            Some("User-agent: GPTBot\nDisallow: /\n\nUser-agent: CCBot\nDisallow: /private\n"),
            200,
        );
        assert_eq!(robots_access(&gptbot), 100 - 15 - 5 - 5);

        let missing = crawled("<p>x</p>", None, 200);
        assert_eq!(robots_access(&missing), 70);
    }

    #[test]
    fn rules_matching_the_page_path_cost_most() {
        let sitemap = "Sitemap: https://example.com/sitemap.xml\n";
        let elsewhere = crawled(
            "<p>x</p>",
            Some(&format!("User-agent: *\nDisallow: /admin\n{sitemap}")),
            200,
        );
        assert_eq!(robots_access(&elsewhere), 100 - 12 * 5);

        let this_page = crawled(
            "<p>x</p>",
            Some(&format!("User-agent: *\nDisallow: /guide\n{sitemap}")),
            200,
        );
        assert_eq!(robots_access(&this_page), 0);

        let reopened = crawled(
            "<p>x</p>",
            Some(&format!(
                "User-agent: ClaudeBot\nDisallow: /\nAllow: /guide\n{sitemap}"
            )),
            200,
        );
        assert_eq!(robots_access(&reopened), 95);
    }

    #[test]
    fn page_path_falls_back_to_root() {
        assert_eq!(page_path("https://example.com/guide?x=1"), "/guide");
        assert_eq!(page_path(""), "/");
    }

    #[test]
    fn noindex_dominates_indexability() {
        let content = manual(r#"<meta name="robots" content="noindex, follow">"#);
        assert_eq!(indexability(&content), 10);

        let plain = manual("<p>x</p>");
        assert_eq!(indexability(&plain), 80);
    }

    #[test]
    fn response_time_bands() {
        assert_eq!(performance(&crawled("", None, 120).source), 100);
        assert_eq!(performance(&crawled("", None, 1500).source), 70);
        assert_eq!(performance(&crawled("", None, 9000).source), 25);
    }

    #[test]
    fn vague_anchors_cost_points() {
        let html = r#"
            <a href="/a">click here</a><a href="/b">read more</a><a href="/c">Pricing plans</a>
        "#;
        assert_eq!(link_structure(&manual(html)), 50 - 15);
    }
}
