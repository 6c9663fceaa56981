//! Semantic HTML, ARIA and content-structure signals
//!
//! Records how well the markup exposes page structure to machines: landmark
//! regions, ARIA usage, form labelling and the structural elements (lists,
//! tables, tables of contents) that make content easy to lift into answers.

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::parser::{count_elements, select_all, select_exists, selector};

/// UX and semantic-structure signals of a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UxSignals {
    pub landmarks: LandmarkSignals,
    pub aria: AriaSignals,
    pub forms: FormSignals,
    pub structure: StructureSignals,
    /// Semantic markup score, 0-100
    pub semantic_score: u8,
    pub issues: Vec<String>,
}

/// Landmark regions found
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkSignals {
    /// Has `<main>` or role="main"
    pub has_main: bool,
    /// Has `<nav>` or role="navigation"
    pub has_navigation: bool,
    /// Has `<header>` or role="banner"
    pub has_header: bool,
    /// Has `<footer>` or role="contentinfo"
    pub has_footer: bool,
    pub article_count: usize,
    pub section_count: usize,
    pub aside_count: usize,
}

/// ARIA attribute usage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AriaSignals {
    pub labeled_elements: usize,
    pub described_elements: usize,
    pub live_regions: usize,
    pub interactive_roles: usize,
    pub misuse_warnings: Vec<String>,
}

/// Form accessibility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSignals {
    pub form_count: usize,
    pub total_inputs: usize,
    pub labeled_inputs: usize,
}

/// Structural elements that help answer extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureSignals {
    pub ordered_lists: usize,
    pub unordered_lists: usize,
    pub tables: usize,
    pub tables_with_headers: usize,
    pub blockquotes: usize,
    pub definition_lists: usize,
    pub details_elements: usize,
    /// In-page anchor links, a proxy for a table of contents
    pub anchor_links: usize,
    pub has_table_of_contents: bool,
    pub buttons: usize,
    pub time_elements: usize,
}

/// Analyze semantic structure of a parsed document
pub fn detect(document: &Html) -> UxSignals {
    let landmarks = analyze_landmarks(document);
    let aria = analyze_aria(document);
    let forms = analyze_forms(document);
    let structure = analyze_structure(document);

    let mut issues = Vec::new();

    if !landmarks.has_main {
        issues.push(
            "Missing main landmark - AI browsers use this to identify primary content".to_string(),
        );
    }

    if forms.total_inputs > 0 {
        let label_percentage = forms.labeled_inputs * 100 / forms.total_inputs;
        if label_percentage < 80 {
            issues.push(format!(
                "Only {}% of form inputs have labels - AI needs labels to understand form purpose",
                label_percentage
            ));
        }
    }

    issues.extend(aria.misuse_warnings.iter().cloned());

    let semantic_score = semantic_score(&landmarks, &aria, &structure);

    UxSignals {
        landmarks,
        aria,
        forms,
        structure,
        semantic_score,
        issues,
    }
}

fn semantic_score(
    landmarks: &LandmarkSignals,
    aria: &AriaSignals,
    structure: &StructureSignals,
) -> u8 {
    let mut score = 0u32;
    if landmarks.has_main {
        score += 25;
    }
    if landmarks.article_count > 0 {
        score += 15;
    }
    if landmarks.section_count > 0 {
        score += 10;
    }
    if landmarks.has_header {
        score += 10;
    }
    if landmarks.has_navigation {
        score += 10;
    }
    if landmarks.has_footer {
        score += 10;
    }
    if aria.labeled_elements > 0 || aria.interactive_roles > 0 {
        score += 10;
    }
    if structure.ordered_lists + structure.unordered_lists + structure.tables > 0 {
        score += 10;
    }
    score.min(100) as u8
}

fn analyze_landmarks(document: &Html) -> LandmarkSignals {
    LandmarkSignals {
        has_main: select_exists(document, "main, [role='main']"),
        has_navigation: select_exists(document, "nav, [role='navigation']"),
        has_header: select_exists(document, "header, [role='banner']"),
        has_footer: select_exists(document, "footer, [role='contentinfo']"),
        article_count: count_elements(document, "article, [role='article']"),
        section_count: count_elements(document, "section"),
        aside_count: count_elements(document, "aside, [role='complementary']"),
    }
}

fn analyze_aria(document: &Html) -> AriaSignals {
    let mut misuse_warnings = Vec::new();

    if select_exists(document, "button[role='button']") {
        misuse_warnings.push(
            "Found <button> with role='button' - redundant, native elements have implicit roles"
                .to_string(),
        );
    }

    if select_exists(document, "a[role='link']") {
        misuse_warnings.push(
            "Found <a> with role='link' - redundant, use semantic HTML instead".to_string(),
        );
    }

    AriaSignals {
        labeled_elements: count_elements(document, "[aria-label], [aria-labelledby]"),
        described_elements: count_elements(document, "[aria-describedby]"),
        live_regions: count_elements(document, "[aria-live]"),
        interactive_roles: count_elements(
            document,
            "[role='button'], [role='link'], [role='tab'], [role='menuitem']",
        ),
        misuse_warnings,
    }
}

fn analyze_forms(document: &Html) -> FormSignals {
    let controls = select_all(
        document,
        "input:not([type='hidden']):not([type='submit']):not([type='button']), select, textarea",
    );

    let label_targets: Vec<String> = select_all(document, "label[for]")
        .iter()
        .filter_map(|label| label.value().attr("for"))
        .map(str::to_string)
        .collect();

    let labeled_inputs = controls
        .iter()
        .filter(|control| {
            let el = control.value();
            el.attr("aria-label").is_some()
                || el.attr("aria-labelledby").is_some()
                || el
                    .id()
                    .is_some_and(|id| label_targets.iter().any(|target| target == id))
                || control
                    .ancestors()
                    .filter_map(scraper::ElementRef::wrap)
                    .any(|ancestor| ancestor.value().name() == "label")
        })
        .count();

    FormSignals {
        form_count: count_elements(document, "form"),
        total_inputs: controls.len(),
        labeled_inputs,
    }
}

fn analyze_structure(document: &Html) -> StructureSignals {
    let anchor_links = count_elements(document, "a[href^='#']:not([href='#'])");
    let has_table_of_contents = select_exists(
        document,
        "[class*='toc'], [id*='toc'], [class*='table-of-contents']",
    ) || anchor_links >= 3;

    StructureSignals {
        ordered_lists: count_elements(document, "ol"),
        unordered_lists: count_elements(document, "ul"),
        tables: count_elements(document, "table"),
        tables_with_headers: tables_with_headers(document),
        blockquotes: count_elements(document, "blockquote"),
        definition_lists: count_elements(document, "dl"),
        details_elements: count_elements(document, "details"),
        anchor_links,
        has_table_of_contents,
        buttons: count_elements(document, "button, [role='button'], a[class*='btn'], a[class*='button']"),
        time_elements: count_elements(document, "time"),
    }
}

fn tables_with_headers(document: &Html) -> usize {
    let Some(header_cell) = selector("th, thead") else {
        return 0;
    };
    select_all(document, "table")
        .iter()
        .filter(|table| table.select(&header_cell).next().is_some())
        .count()
}
