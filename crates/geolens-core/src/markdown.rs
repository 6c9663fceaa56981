//! Bot-simulated markdown
//!
//! Rebuilds the text a crawler that ignores page chrome would read: the
//! primary content container walked in document order with navigation,
//! ads, consent banners and hidden regions pruned, wrapped in sections describing
//! the page's technical signals, structured data and most important links.
//!
//! The parsed document is never mutated; pruning happens during the walk.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt::Write;

use crate::parser::{
    element_text, html_to_markdown, json_ld_blocks, normalize_whitespace, parse_json_ld_entities,
    schema_types, select_all, selector, shorten_iri, truncate,
};
use crate::patterns::CALL_TO_ACTION;
use crate::types::BotViewStats;
use crate::url_utils;

/// Primary content containers, most specific first
const CONTAINER_CANDIDATES: &[&str] = &[
    "main",
    "article",
    ".main-content",
    "#main-content",
    ".content",
    "#content",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".page-content",
    "[role='main']",
];

/// Elements that never carry main content
const EXCLUDED_TAGS: &[&str] = &[
    "nav", "footer", "aside", "script", "style", "noscript", "template", "form", "iframe",
];

const EXCLUDED_ROLES: &[&str] = &["navigation", "contentinfo", "complementary"];

/// Blocks competing for the largest run of text
const TEXT_BLOCKS: &str = "p, li, blockquote, pre, td, dd";

const MAX_STRUCTURED_ITEMS: usize = 10;
const MAX_KEY_LINKS: usize = 15;
/// Labels listed per navigation or footer line
const MAX_LINK_LABELS: usize = 8;
/// Shortest alt or title text that describes an image
const MIN_IMAGE_LABEL: usize = 5;

/// A single class or id token naming a boilerplate widget: `sidebar`,
/// `ad-slot-1` and `cookie_banner` match, `has-sidebar` does not
static BOILERPLATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(sidebar|ads?|advert|advertisement|adsbygoogle|sponsored|share|sharing|social-share|cookies?|consent|gdpr|comments?|disqus|newsletter-popup)([-_].*)?$",
    )
    .expect("invalid boilerplate regex")
});

/// Kind of a captured block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Heading(u8),
    Paragraph,
    List { ordered: bool },
    Blockquote,
    Table,
    Code,
    Image,
}

/// One block of main content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    pub kind: NodeKind,
    /// Document-order index among captured nodes
    pub position: usize,
    pub priority: u32,
    /// Rendered markdown
    pub markdown: String,
}

/// Result of the bot walk
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotView {
    pub markdown: String,
    pub stats: BotViewStats,
    pub nodes: Vec<ContentNode>,
}

/// Build the bot view of raw HTML
pub fn build_bot_markdown(html: &str, url: &str) -> BotView {
    let document = Html::parse_document(html);
    let mut view = build_from_document(&document, url);
    view.stats.full_markdown_length = html_to_markdown(html).len();
    view
}

pub(crate) fn build_from_document(document: &Html, url: &str) -> BotView {
    let (container_name, container) = select_container(document);
    let pruner = Pruner::new(container);

    let mut walk = Walk::new(&pruner);
    walk.run(container);
    let excluded = walk.excluded;

    let mut nodes = walk.nodes;
    nodes.sort_by_key(|node| (node.position, Reverse(node.priority)));

    let structured = structured_items(document);
    let key_links = key_links(document, container, &pruner, url);

    let mut buf = String::new();
    render_navigation_context(&mut buf, document, url);
    render_technical_signals(&mut buf, document);

    let _ = writeln!(buf, "## Main Content\n");
    if nodes.is_empty() {
        let _ = writeln!(buf, "_No readable content found._\n");
    }
    for node in &nodes {
        let _ = writeln!(buf, "{}\n", node.markdown);
    }

    let _ = writeln!(buf, "## Structured Data\n");
    if structured.is_empty() {
        let _ = writeln!(buf, "_None detected._\n");
    } else {
        for item in &structured {
            let _ = writeln!(buf, "- {item}");
        }
        let _ = writeln!(buf);
    }

    let _ = writeln!(buf, "## Key Links\n");
    if key_links.is_empty() {
        let _ = writeln!(buf, "_None detected._");
    }
    for link in &key_links {
        let _ = writeln!(buf, "- [{}]({})", link.text, link.href);
    }

    BotView {
        markdown: buf.trim_end().to_string() + "\n",
        stats: BotViewStats {
            container: container_name,
            node_count: nodes.len(),
            excluded_regions: excluded,
            structured_items: structured.len(),
            key_links: key_links.len(),
            full_markdown_length: 0,
        },
        nodes,
    }
}

/// First candidate container with text, then `body`, then the root element
fn select_container(document: &Html) -> (String, ElementRef<'_>) {
    for candidate in CONTAINER_CANDIDATES {
        if let Some(found) = select_all(document, candidate)
            .into_iter()
            .find(|el| !element_text(el).is_empty())
        {
            return (candidate.to_string(), found);
        }
    }
    match select_all(document, "body").into_iter().next() {
        Some(body) => ("body".to_string(), body),
        None => ("html".to_string(), document.root_element()),
    }
}

/// Decides which regions of the container the walk skips
struct Pruner<'a> {
    /// The container's largest text block and its ancestors below the
    /// container; class and id tokens never prune these
    protected: Vec<ElementRef<'a>>,
}

impl<'a> Pruner<'a> {
    fn new(container: ElementRef<'a>) -> Self {
        let protected = largest_text_block(container)
            .map(|block| {
                std::iter::once(block)
                    .chain(
                        block
                            .ancestors()
                            .take_while(|node| node.id() != container.id())
                            .filter_map(ElementRef::wrap),
                    )
                    .collect()
            })
            .unwrap_or_default();
        Self { protected }
    }

    /// Whether an element and its subtree are boilerplate
    fn excludes(&self, element: &ElementRef) -> bool {
        let el = element.value();
        if EXCLUDED_TAGS.contains(&el.name()) {
            return true;
        }
        let role = el.attr("role").map(str::trim);
        if role.is_some_and(|role| EXCLUDED_ROLES.contains(&role)) {
            return true;
        }
        // Site banner only; article and section headers hold the title
        if (el.name() == "header" || role == Some("banner")) && parent_is_body(element) {
            return true;
        }
        if el.attr("hidden").is_some() || el.attr("aria-hidden") == Some("true") {
            return true;
        }
        if let Some(style) = el.attr("style") {
            let compact = style.to_ascii_lowercase().replace(' ', "");
            if compact.contains("display:none") || compact.contains("visibility:hidden") {
                return true;
            }
        }
        if self.protected.iter().any(|kept| kept.id() == element.id()) {
            return false;
        }
        el.attr("class")
            .into_iter()
            .chain(el.attr("id"))
            .flat_map(str::split_whitespace)
            .any(|token| BOILERPLATE_TOKEN.is_match(token))
    }

    /// Whether an anchor sits in the walked part of the container
    fn keeps_link(&self, anchor: &ElementRef, container: ElementRef<'_>) -> bool {
        for node in anchor.ancestors() {
            if node.id() == container.id() {
                return true;
            }
            if let Some(element) = ElementRef::wrap(node)
                && self.excludes(&element)
            {
                return false;
            }
        }
        false
    }
}

fn parent_is_body(element: &ElementRef) -> bool {
    element
        .parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| parent.value().name() == "body")
}

/// First block with the most text; ties go to the earlier block
fn largest_text_block(container: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let blocks = selector(TEXT_BLOCKS)?;
    let mut best: Option<(usize, ElementRef<'_>)> = None;
    for block in container.select(&blocks) {
        let len = element_text(&block).chars().count();
        if len > 0 && best.is_none_or(|(longest, _)| len > longest) {
            best = Some((len, block));
        }
    }
    best.map(|(_, block)| block)
}

struct Walk<'p, 'a> {
    pruner: &'p Pruner<'a>,
    nodes: Vec<ContentNode>,
    excluded: usize,
}

impl<'p, 'a> Walk<'p, 'a> {
    fn new(pruner: &'p Pruner<'a>) -> Self {
        Self {
            pruner,
            nodes: Vec::new(),
            excluded: 0,
        }
    }

    /// Captured blocks are not descended into, so every element is emitted
    /// at most once while equal text in separate elements is kept
    fn run(&mut self, container: ElementRef<'_>) {
        let mut stack: Vec<ElementRef<'_>> = children(container);
        stack.reverse();

        while let Some(element) = stack.pop() {
            if self.pruner.excludes(&element) {
                self.excluded += 1;
                continue;
            }
            if let Some((kind, priority, markdown)) = capture(&element, self.pruner) {
                let position = self.nodes.len();
                self.nodes.push(ContentNode {
                    kind,
                    position,
                    priority,
                    markdown,
                });
                continue;
            }
            let mut nested = children(element);
            nested.reverse();
            stack.extend(nested);
        }
    }
}

fn children(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap).collect()
}

/// Render a block node as `(kind, priority, markdown)`
fn capture(element: &ElementRef, pruner: &Pruner<'_>) -> Option<(NodeKind, u32, String)> {
    let name = element.value().name();
    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<u8>().ok()?;
            let text = visible_text(element, pruner);
            if text.is_empty() {
                return None;
            }
            let markdown = format!("{} {}", "#".repeat(level as usize), text);
            Some((NodeKind::Heading(level), (7 - level as u32) * 10, markdown))
        }
        "p" => {
            let text = visible_text(element, pruner);
            if text.is_empty() {
                return None;
            }
            let priority = 10 + (text.chars().count() as u32 / 50).min(40);
            Some((NodeKind::Paragraph, priority, text))
        }
        "ul" | "ol" => {
            let ordered = name == "ol";
            let items: Vec<String> = children(*element)
                .into_iter()
                .filter(|child| child.value().name() == "li" && !pruner.excludes(child))
                .map(|li| visible_text(&li, pruner))
                .filter(|text| !text.is_empty())
                .collect();
            if items.is_empty() {
                return None;
            }
            let markdown = items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    if ordered {
                        format!("{}. {}", idx + 1, item)
                    } else {
                        format!("- {item}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            let priority = 10 + (items.len() as u32 * 3).min(30);
            Some((NodeKind::List { ordered }, priority, markdown))
        }
        "blockquote" => {
            let text = visible_text(element, pruner);
            if text.is_empty() {
                return None;
            }
            Some((NodeKind::Blockquote, 15, format!("> {text}")))
        }
        "table" => render_table(element),
        "pre" => {
            let raw = element.text().collect::<String>();
            let code = raw.trim_matches('\n').trim_end();
            if code.trim().is_empty() {
                return None;
            }
            Some((NodeKind::Code, 12, format!("```\n{code}\n```")))
        }
        "img" => {
            let el = element.value();
            let label = el
                .attr("alt")
                .map(normalize_whitespace)
                .filter(|alt| alt.chars().count() >= MIN_IMAGE_LABEL)
                .or_else(|| {
                    el.attr("title")
                        .map(normalize_whitespace)
                        .filter(|title| title.chars().count() >= MIN_IMAGE_LABEL)
                })?;
            let src = el.attr("src").unwrap_or_default().trim();
            Some((NodeKind::Image, 5, format!("![{label}]({src})")))
        }
        _ => None,
    }
}

/// Text of a captured block without its boilerplate descendants
fn visible_text(element: &ElementRef, pruner: &Pruner<'_>) -> String {
    let mut parts = Vec::new();
    collect_visible(*element, pruner, &mut parts);
    normalize_whitespace(&parts.join(" "))
}

fn collect_visible<'a>(element: ElementRef<'a>, pruner: &Pruner<'_>, parts: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            parts.push(text);
        } else if let Some(child_el) = ElementRef::wrap(child)
            && !pruner.excludes(&child_el)
        {
            collect_visible(child_el, pruner, parts);
        }
    }
}

fn render_table(element: &ElementRef) -> Option<(NodeKind, u32, String)> {
    let row_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;

    let rows: Vec<Vec<String>> = element
        .select(&row_sel)
        .map(|row| {
            row.select(&cell_sel)
                .map(|cell| element_text(&cell).replace('|', "\\|"))
                .collect::<Vec<_>>()
        })
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
        .collect();
    if rows.is_empty() {
        return None;
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let format_row = |cells: &[String]| -> String {
        let mut padded: Vec<&str> = cells.iter().map(String::as_str).collect();
        padded.resize(columns, "");
        format!("| {} |", padded.join(" | "))
    };

    let mut lines = vec![format_row(rows[0].as_slice())];
    lines.push(format!("|{}|", vec![" --- "; columns].join("|")));
    lines.extend(rows[1..].iter().map(|row| format_row(row.as_slice())));

    let priority = 10 + (rows.len() as u32 * 2).min(30);
    Some((NodeKind::Table, priority, lines.join("\n")))
}

fn render_navigation_context(buf: &mut String, document: &Html, url: &str) {
    let _ = writeln!(buf, "## Navigation Context\n");
    if !url.is_empty() {
        let _ = writeln!(buf, "- URL: {url}");
    }
    let title = select_all(document, "title")
        .first()
        .map(element_text)
        .unwrap_or_default();
    if !title.is_empty() {
        let _ = writeln!(buf, "- Page title: {title}");
    }
    if let Some(lang) = select_all(document, "html")
        .first()
        .and_then(|html| html.value().attr("lang"))
    {
        let _ = writeln!(buf, "- Language: {lang}");
    }

    let breadcrumb: Vec<String> = select_all(
        document,
        "[aria-label*='readcrumb'] a, .breadcrumb a, .breadcrumbs a",
    )
    .iter()
    .map(element_text)
    .filter(|text| !text.is_empty())
    .collect();
    if !breadcrumb.is_empty() {
        let _ = writeln!(buf, "- Breadcrumb: {}", breadcrumb.join(" > "));
    }

    let nav_links = link_labels(document, "nav a[href], [role='navigation'] a[href]");
    if nav_links.is_empty() {
        let _ = writeln!(buf, "- Navigation: none detected");
    } else {
        push_labels(buf, "Navigation", &nav_links);
    }
    let footer_links = link_labels(document, "footer a[href], [role='contentinfo'] a[href]");
    if !footer_links.is_empty() {
        push_labels(buf, "Footer", &footer_links);
    }

    let host = url_utils::hostname(url);
    let (internal, external) = select_all(document, "a[href]")
        .iter()
        .filter_map(followable_href)
        .fold((0, 0), |(internal, external), href| {
            if is_internal_href(href, host.as_deref()) {
                (internal + 1, external)
            } else {
                (internal, external + 1)
            }
        });
    let _ = writeln!(buf, "- Links: {internal} internal, {external} external");
    let _ = writeln!(buf);
}

fn link_labels(document: &Html, css: &str) -> Vec<String> {
    select_all(document, css)
        .iter()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn push_labels(buf: &mut String, label: &str, labels: &[String]) {
    let shown: Vec<&str> = labels
        .iter()
        .take(MAX_LINK_LABELS)
        .map(String::as_str)
        .collect();
    let _ = writeln!(
        buf,
        "- {label} ({} links): {}",
        labels.len(),
        shown.join(", ")
    );
}

/// The trimmed href of an anchor a crawler would follow
fn followable_href<'a>(anchor: &ElementRef<'a>) -> Option<&'a str> {
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() || href == "#" || href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    Some(href)
}

/// Root-relative, same-host and in-page hrefs
fn is_internal_href(href: &str, host: Option<&str>) -> bool {
    href.starts_with('#') || url_utils::is_internal_link(href, host)
}

fn render_technical_signals(buf: &mut String, document: &Html) {
    let _ = writeln!(buf, "## Technical SEO Signals\n");

    let attr_of = |css: &str, attr: &str| {
        select_all(document, css)
            .first()
            .and_then(|el| el.value().attr(attr))
            .map(normalize_whitespace)
            .filter(|value| !value.is_empty())
    };
    let present = |value: Option<String>| value.unwrap_or_else(|| "missing".to_string());
    let counted = |count: usize, noun: &str| {
        if count == 0 {
            "missing".to_string()
        } else {
            format!("{count} {noun}")
        }
    };

    let title = select_all(document, "title")
        .first()
        .map(element_text)
        .filter(|title| !title.is_empty())
        .map(|title| format!("present ({} chars)", title.chars().count()));
    let description = attr_of("meta[name='description']", "content")
        .map(|desc| format!("present ({} chars)", desc.chars().count()));
    let json_ld = match selector("script") {
        Some(script) => json_ld_blocks(document, &script).len(),
        None => 0,
    };

    let _ = writeln!(buf, "- Title: {}", present(title));
    let _ = writeln!(buf, "- Meta description: {}", present(description));
    let _ = writeln!(
        buf,
        "- Open Graph: {}",
        counted(select_all(document, "meta[property^='og:']").len(), "tags")
    );
    let _ = writeln!(buf, "- JSON-LD: {}", counted(json_ld, "blocks"));
    let _ = writeln!(
        buf,
        "- Microdata: {}",
        counted(select_all(document, "[itemscope]").len(), "items")
    );
    let _ = writeln!(
        buf,
        "- Canonical: {}",
        present(attr_of("link[rel='canonical']", "href"))
    );
    let _ = writeln!(
        buf,
        "- Hreflang: {}",
        counted(
            select_all(document, "link[rel='alternate'][hreflang]").len(),
            "alternates"
        )
    );
    let _ = writeln!(
        buf,
        "- Robots meta: {}",
        present(attr_of("meta[name='robots']", "content"))
    );
    let _ = writeln!(
        buf,
        "- Sitemap reference: {}\n",
        present(attr_of("link[rel='sitemap']", "href"))
    );
}

/// One-line summaries of JSON-LD entities, microdata items and social meta tags
fn structured_items(document: &Html) -> Vec<String> {
    let mut items = Vec::new();

    let blocks = match selector("script") {
        Some(script) => json_ld_blocks(document, &script),
        None => Vec::new(),
    };
    for block in &blocks {
        match parse_json_ld_entities(block) {
            Ok(entities) => {
                for entity in &entities {
                    let types = schema_types(entity);
                    let label = if types.is_empty() {
                        "Thing".to_string()
                    } else {
                        types.join(", ")
                    };
                    let name = entity
                        .get("name")
                        .or_else(|| entity.get("headline"))
                        .and_then(|name| name.as_str());
                    items.push(match name {
                        Some(name) => format!("JSON-LD {label}: {}", truncate(name, 80)),
                        None => format!("JSON-LD {label}"),
                    });
                }
            }
            Err(_) => items.push("invalid JSON-LD block skipped".to_string()),
        }
    }

    for item in select_all(document, "[itemscope][itemtype]") {
        if let Some(itemtype) = item.value().attr("itemtype") {
            let types: Vec<String> = itemtype.split_whitespace().map(shorten_iri).collect();
            items.push(format!("Microdata {}", types.join(", ")));
        }
    }

    for meta in select_all(
        document,
        "meta[property='og:title'], meta[property='og:type'], meta[property='og:description'], meta[name='twitter:card']",
    ) {
        let el = meta.value();
        if let (Some(key), Some(content)) =
            (el.attr("property").or_else(|| el.attr("name")), el.attr("content"))
        {
            items.push(format!("Meta {key}: {}", truncate(&normalize_whitespace(content), 80)));
        }
    }

    items.truncate(MAX_STRUCTURED_ITEMS);
    items
}

struct KeyLink {
    href: String,
    text: String,
    score: u32,
}

/// Links ranked by importance; ties keep document order
fn key_links(
    document: &Html,
    container: ElementRef<'_>,
    pruner: &Pruner<'_>,
    url: &str,
) -> Vec<KeyLink> {
    let host = url_utils::hostname(url);
    let mut seen = HashSet::new();

    let mut links: Vec<KeyLink> = select_all(document, "a[href]")
        .iter()
        .filter_map(|anchor| {
            let href = followable_href(anchor)?;
            let text = element_text(anchor);
            if text.is_empty() || !seen.insert(href.to_string()) {
                return None;
            }

            let mut score = 0;
            if pruner.keeps_link(anchor, container) {
                score += 3;
            }
            if text.chars().count() > 10 {
                score += 2;
            }
            if is_internal_href(href, host.as_deref()) {
                score += 2;
            }
            let class = anchor.value().attr("class").unwrap_or_default();
            let role_button = anchor.value().attr("role") == Some("button");
            if role_button || CALL_TO_ACTION.is_match(class) || CALL_TO_ACTION.is_match(&text) {
                score += 2;
            }

            Some(KeyLink {
                href: href.to_string(),
                text: truncate(&text, 80),
                score,
            })
        })
        .collect();

    links.sort_by_key(|link| Reverse(link.score));
    links.truncate(MAX_KEY_LINKS);
    links
}
