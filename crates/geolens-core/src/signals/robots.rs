//! robots.txt groups and AI crawler access
//!
//! Models what the crawlability score needs from robots.txt: the rule group
//! of each user-agent token, announced sitemaps, and the resulting access
//! level of well-known AI and search crawlers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::PageSource;

/// Crawlers whose access is reported, in report order
pub const AI_CRAWLERS: &[&str] = &[
    // OpenAI
    "GPTBot",
    "ChatGPT-User",
    "OAI-SearchBot",
    // Anthropic
    "ClaudeBot",
    "Claude-Web",
    "Anthropic-AI",
    // Search engines feeding AI answers
    "Google-Extended",
    "Bingbot",
    "Applebot",
    "PerplexityBot",
    "YouBot",
    "CCBot",
];

/// Robots policy of a page, depending on where the HTML came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RobotsPolicy {
    /// robots.txt was requested alongside the page
    Crawled(RobotsAnalysis),
    /// Pasted HTML; there is no site to ask
    Manual,
}

impl RobotsPolicy {
    pub fn from_source(source: &PageSource) -> Self {
        match source {
            PageSource::Crawled(meta) => RobotsPolicy::Crawled(
                meta.robots_txt
                    .as_deref()
                    .map(parse_robots_txt)
                    .unwrap_or_default(),
            ),
            PageSource::Manual => RobotsPolicy::Manual,
        }
    }

    pub fn analysis(&self) -> Option<&RobotsAnalysis> {
        match self {
            RobotsPolicy::Crawled(analysis) => Some(analysis),
            RobotsPolicy::Manual => None,
        }
    }

    pub fn sitemaps(&self) -> &[String] {
        self.analysis()
            .map(|analysis| analysis.sitemaps.as_slice())
            .unwrap_or_default()
    }
}

/// Parsed robots.txt. `found` is false when the site served none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotsAnalysis {
    pub found: bool,
    pub sitemaps: Vec<String>,
    /// Rule groups keyed by user-agent token as written
    pub groups: BTreeMap<String, RuleGroup>,
    /// Access of every crawler in [`AI_CRAWLERS`]
    pub crawlers: Vec<CrawlerAccess>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl_delay: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerAccess {
    pub name: String,
    pub access: AccessLevel,
    /// User-agent token the access was derived from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_group: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Allowed,
    /// Some paths are disallowed
    Partial,
    /// `Disallow: /` without a compensating `Allow: /`
    Blocked,
    /// No group names the crawler and `*` does not restrict it
    Default,
}

impl RuleGroup {
    pub fn blocks_all(&self) -> bool {
        self.disallow.iter().any(|path| path == "/") && !self.allow.iter().any(|path| path == "/")
    }

    pub fn access(&self) -> AccessLevel {
        if self.blocks_all() {
            AccessLevel::Blocked
        } else if self.disallow.is_empty() {
            AccessLevel::Allowed
        } else {
            AccessLevel::Partial
        }
    }

    /// Longest matching prefix wins; `Allow` wins a tie
    pub fn allows(&self, path: &str) -> bool {
        let longest = |rules: &[String]| {
            rules
                .iter()
                .filter(|rule| path.starts_with(rule.as_str()))
                .map(String::len)
                .max()
        };
        match (longest(&self.allow), longest(&self.disallow)) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(allow), Some(disallow)) => allow >= disallow,
        }
    }

    fn merge(&mut self, other: &RuleGroup) {
        self.allow.extend(other.allow.iter().cloned());
        self.disallow.extend(other.disallow.iter().cloned());
        if other.crawl_delay.is_some() {
            self.crawl_delay = other.crawl_delay;
        }
    }
}

impl RobotsAnalysis {
    /// Number of reported crawlers with the given access level
    pub fn count_access(&self, level: AccessLevel) -> usize {
        self.crawlers.iter().filter(|c| c.access == level).count()
    }

    /// Whether `User-agent: *` disallows the whole site
    pub fn wildcard_blocks_all(&self) -> bool {
        self.groups.get("*").is_some_and(RuleGroup::blocks_all)
    }

    /// Group for a user agent; tokens compare case-insensitively
    pub fn group_for(&self, agent: &str) -> Option<(&str, &RuleGroup)> {
        self.groups
            .iter()
            .find(|(token, _)| token.eq_ignore_ascii_case(agent))
            .map(|(token, group)| (token.as_str(), group))
    }

    /// Whether `agent` may fetch `path`, falling back to the `*` group
    pub fn allows(&self, agent: &str, path: &str) -> bool {
        self.group_for(agent)
            .or_else(|| self.group_for("*"))
            .is_none_or(|(_, group)| group.allows(path))
    }

    fn crawler_access(&self, crawler: &str) -> CrawlerAccess {
        let (access, matched_group) = match self.group_for(crawler) {
            Some((token, group)) => (group.access(), Some(token.to_string())),
            None => match self.group_for("*") {
                Some((_, group)) if group.access() != AccessLevel::Allowed => {
                    (group.access(), Some("*".to_string()))
                }
                _ => (AccessLevel::Default, None),
            },
        };
        CrawlerAccess {
            name: crawler.to_string(),
            access,
            matched_group,
        }
    }
}

/// Parse a robots.txt body. Never fails; odd lines become issues.
pub fn parse_robots_txt(content: &str) -> RobotsAnalysis {
    let mut analysis = RobotsAnalysis {
        found: true,
        ..RobotsAnalysis::default()
    };

    // Consecutive User-agent lines open one shared group
    let mut agents: Vec<String> = Vec::new();
    let mut group = RuleGroup::default();
    let mut in_rules = false;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.split_once('#').map_or(raw, |(before, _)| before).trim();
        if line.is_empty() {
            continue;
        }
        let number = index + 1;
        let Some((key, value)) = line.split_once(':') else {
            analysis.issues.push(format!("line {number}: missing ':' separator"));
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_lowercase().as_str() {
            "user-agent" => {
                if in_rules {
                    flush(&mut analysis.groups, &mut agents, &mut group);
                    in_rules = false;
                }
                agents.push(value.to_string());
            }
            directive @ ("allow" | "disallow" | "crawl-delay") => {
                in_rules = true;
                if agents.is_empty() {
                    analysis
                        .issues
                        .push(format!("line {number}: {directive} before any User-agent"));
                    continue;
                }
                match directive {
                    "crawl-delay" => group.crawl_delay = value.parse().ok(),
                    _ if value.is_empty() => {}
                    "allow" => group.allow.push(value.to_string()),
                    _ => group.disallow.push(value.to_string()),
                }
            }
            "sitemap" => {
                if !value.is_empty() {
                    analysis.sitemaps.push(value.to_string());
                }
            }
            // Non-standard but widely served
            "host" | "clean-param" => {}
            other => analysis
                .issues
                .push(format!("line {number}: unknown directive '{other}'")),
        }
    }
    flush(&mut analysis.groups, &mut agents, &mut group);

    analysis.crawlers = AI_CRAWLERS
        .iter()
        .map(|crawler| analysis.crawler_access(crawler))
        .collect();

    if analysis.sitemaps.is_empty() {
        analysis.issues.push("no Sitemap directive".to_string());
    }
    if analysis.wildcard_blocks_all() {
        analysis
            .issues
            .push("User-agent: * disallows the entire site".to_string());
    }
    analysis
}

fn flush(
    groups: &mut BTreeMap<String, RuleGroup>,
    agents: &mut Vec<String>,
    group: &mut RuleGroup,
) {
    for agent in agents.drain(..) {
        groups.entry(agent).or_default().merge(group);
    }
    *group = RuleGroup::default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CrawlMetadata;

    fn access_of(analysis: &RobotsAnalysis, name: &str) -> AccessLevel {
        analysis
            .crawlers
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.access)
            .unwrap()
    }

    #[test]
    fn wildcard_group_with_sitemap() {
        let analysis = parse_robots_txt(
            "User-agent: *\nDisallow: /admin/\nDisallow: /cart\n\nSitemap: https://example.com/sitemap.xml\n",
        );
        assert!(analysis.found);
        assert_eq!(analysis.sitemaps, vec!["https://example.com/sitemap.xml"]);
        assert_eq!(analysis.groups["*"].disallow.len(), 2);
        assert!(!analysis.wildcard_blocks_all());
        assert_eq!(analysis.count_access(AccessLevel::Partial), AI_CRAWLERS.len());
    }

    #[test]
    fn named_group_overrides_wildcard() {
        let analysis =
            parse_robots_txt("User-agent: *\nDisallow:\n\nUser-agent: GPTBot\nDisallow: /\n");
        assert_eq!(access_of(&analysis, "GPTBot"), AccessLevel::Blocked);
        assert_eq!(access_of(&analysis, "ClaudeBot"), AccessLevel::Default);
        assert_eq!(analysis.count_access(AccessLevel::Blocked), 1);
    }

    #[test]
    fn stacked_user_agents_share_rules() {
        let analysis = parse_robots_txt(
            "User-agent: ClaudeBot\nUser-agent: perplexitybot # answer engines\nDisallow: /drafts/\n",
        );
        assert_eq!(analysis.groups["ClaudeBot"].disallow, vec!["/drafts/"]);
        assert_eq!(access_of(&analysis, "PerplexityBot"), AccessLevel::Partial);
        let perplexity = analysis
            .crawlers
            .iter()
            .find(|c| c.name == "PerplexityBot")
            .unwrap();
        assert_eq!(perplexity.matched_group.as_deref(), Some("perplexitybot"));
    }

    #[test]
    fn full_wildcard_block_reaches_every_crawler() {
        let analysis = parse_robots_txt("User-agent: *\nDisallow: /\n");
        assert!(analysis.wildcard_blocks_all());
        assert_eq!(analysis.count_access(AccessLevel::Blocked), AI_CRAWLERS.len());
        assert!(analysis.issues.iter().any(|i| i.contains("entire site")));
    }

    #[test]
    fn longest_match_decides_path_access() {
        let analysis = parse_robots_txt("User-agent: *\nDisallow: /admin/\nAllow: /admin/public/\n");
        assert!(analysis.allows("GPTBot", "/"));
        assert!(!analysis.allows("GPTBot", "/admin/secret"));
        assert!(analysis.allows("GPTBot", "/admin/public/doc.html"));
    }

    #[test]
    fn odd_lines_become_issues() {
        let analysis = parse_robots_txt("Disallow: /early\nnonsense\nUser-agent: *\nNoindex: /x\n");
        assert_eq!(analysis.issues.len(), 4);
        assert!(analysis.issues[0].starts_with("line 1:"));
        assert!(analysis.issues[1].contains("missing ':'"));
        assert!(analysis.issues[2].contains("'noindex'"));
    }

    #[test]
    fn policy_follows_page_source() {
        assert_eq!(RobotsPolicy::from_source(&PageSource::Manual), RobotsPolicy::Manual);
        assert!(RobotsPolicy::Manual.sitemaps().is_empty());

        let crawled = PageSource::Crawled(CrawlMetadata {
            final_url: "https://example.com/".to_string(),
            status_code: 200,
            is_https: true,
            content_length: 10,
            response_time_ms: 100,
            robots_txt: None,
            x_robots_tag: None,
        });
        let policy = RobotsPolicy::from_source(&crawled);
        assert!(!policy.analysis().unwrap().found);
    }
}
