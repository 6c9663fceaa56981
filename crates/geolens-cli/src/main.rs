use std::fmt::Write as FmtWrite;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use geolens_core::fetch::{DEFAULT_TIMEOUT_SECS, FetchOptions, fetch_page};
use geolens_core::{
    Analyzer, AnalyzerConfig, GeolensError, PageSource, Status, WebsiteAnalysis, extract,
};

const APP_NAME: &str = "geolens";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human readable report
    Summary,
    /// Full analysis as JSON
    Json,
    /// Bot-simulated Markdown view of the page
    Markdown,
}

/// Grade a web page's readiness for AI search and SEO
#[derive(Debug, Parser)]
#[command(name = APP_NAME, version, about)]
struct Cli {
    /// Page to fetch and analyse
    #[arg(required_unless_present = "html")]
    target: Option<String>,

    /// Analyse HTML from a file ('-' = stdin) instead of fetching
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// URL to attribute to --html input
    #[arg(long, value_name = "URL", requires = "html")]
    url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// TOML file overriding scoring configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(hint) = err.downcast_ref::<GeolensError>().and_then(|e| e.hint()) {
                eprintln!("\nhint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    let analyzer = Analyzer::new(config)?;

    let content = match &cli.html {
        Some(path) => {
            let html = read_html(path)?;
            let url = cli.url.clone().or_else(|| cli.target.clone()).unwrap_or_default();
            debug!(path = %path.display(), bytes = html.len(), "read manual input");
            extract(&html, &url, PageSource::Manual)
        }
        None => {
            let target = cli.target.as_deref().unwrap_or_default();
            info!(url = target, timeout = cli.timeout, "fetching page");
            let options = FetchOptions {
                timeout_secs: cli.timeout,
                ..FetchOptions::default()
            };
            let page = fetch_page(target, &options).await?;
            extract(&page.html, &page.url, page.source)
        }
    };

    let analysis = analyzer.analyze(content);
    let output = match cli.format {
        OutputFormat::Summary => render_summary(&analysis),
        OutputFormat::Json => serde_json::to_string_pretty(&analysis)?,
        OutputFormat::Markdown => analysis.extracted_content.markdown_representation.clone(),
    };
    println!("{}", output.trim_end());
    Ok(())
}

fn read_html(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return io::read_to_string(io::stdin()).context("failed to read HTML from stdin");
    }
    fs::read_to_string(path).with_context(|| format!("failed to read HTML file {}", path.display()))
}

const DIVIDER: &str = "─────────────────────────────────────────────────────────────";
const LABEL_WIDTH: usize = 16;

fn push_section_header(buf: &mut String, icon: &str, title: &str) {
    let _ = writeln!(buf, "{DIVIDER}");
    let _ = writeln!(buf, "{icon} {title}");
    let _ = writeln!(buf, "{DIVIDER}");
}

fn push_key_value(buf: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let _ = writeln!(buf, "• {:<width$} : {}", label, value, width = LABEL_WIDTH);
}

fn render_summary(analysis: &WebsiteAnalysis) -> String {
    let mut buf = String::new();

    push_section_header(&mut buf, "🔎", "Page");
    push_key_value(&mut buf, "URL", &analysis.url);
    push_key_value(&mut buf, "Title", &analysis.title);
    push_key_value(
        &mut buf,
        "Overall",
        &format!(
            "{}/100 ({})",
            analysis.overall_score,
            Status::from_score(analysis.overall_score).label()
        ),
    );
    push_key_value(&mut buf, "Source", &analysis.debug_info.source_kind);
    push_key_value(&mut buf, "Analysed", &analysis.timestamp.to_rfc3339());
    let _ = writeln!(buf);

    render_category_table(&mut buf, analysis);
    render_findings(&mut buf, analysis);
    render_improvements(&mut buf, analysis);

    push_section_header(&mut buf, "🤖", "Bot View");
    let debug = &analysis.debug_info;
    push_key_value(&mut buf, "Container", &debug.bot_view_container);
    push_key_value(&mut buf, "Content nodes", &debug.bot_view_nodes.to_string());
    push_key_value(&mut buf, "Retention", &format!("{}%", debug.retention_percent));
    if debug.invalid_schema_blocks > 0 {
        push_key_value(
            &mut buf,
            "Invalid JSON-LD",
            &debug.invalid_schema_blocks.to_string(),
        );
    }

    buf
}

fn render_category_table(buf: &mut String, analysis: &WebsiteAnalysis) {
    push_section_header(buf, "📊", "Category Scores");

    let headers = ["Category", "Score", "Status", "Weight"];
    let rows: Vec<Vec<String>> = analysis
        .categories()
        .iter()
        .map(|score| {
            let weight = analysis
                .debug_info
                .category_weights
                .get(score.category.key())
                .copied()
                .unwrap_or_default();
            vec![
                score.category.label().to_string(),
                score.score.to_string(),
                score.status.label().to_string(),
                format!("{:.0}%", weight * 100.0),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| -> String {
        let mut parts = Vec::with_capacity(cells.len());
        for (idx, cell) in cells.iter().enumerate() {
            parts.push(format!(" {:<width$} ", cell, width = widths[idx]));
        }
        format!("|{}|", parts.join("|"))
    };

    let header_cells = headers.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let _ = writeln!(buf, "{}", format_row(header_cells.as_slice()));

    let separator_parts: Vec<String> = widths
        .iter()
        .map(|width| format!(" {:-<width$} ", "", width = *width))
        .collect();
    let _ = writeln!(buf, "|{}|", separator_parts.join("|"));

    for row in &rows {
        let _ = writeln!(buf, "{}", format_row(row.as_slice()));
    }
    let _ = writeln!(buf);
}

fn render_findings(buf: &mut String, analysis: &WebsiteAnalysis) {
    let with_findings: Vec<_> = analysis
        .categories()
        .into_iter()
        .filter(|score| !score.findings.is_empty())
        .collect();
    if with_findings.is_empty() {
        return;
    }

    push_section_header(buf, "🧭", "Findings");
    for score in with_findings {
        let _ = writeln!(buf, "{}", score.category.label());
        for finding in &score.findings {
            let _ = writeln!(buf, "  - {finding}");
        }
    }
    let _ = writeln!(buf);
}

fn render_improvements(buf: &mut String, analysis: &WebsiteAnalysis) {
    if analysis.content_improvements.is_empty() {
        return;
    }

    push_section_header(buf, "🛠", "Content Improvements");
    for item in &analysis.content_improvements {
        let _ = writeln!(buf, "[{}] {}", item.priority.label(), item.section);
        let _ = writeln!(buf, "  now : {}", item.current);
        let _ = writeln!(buf, "  do  : {}", item.improved);
        let _ = writeln!(buf, "  why : {}", item.reasoning);
    }
    let _ = writeln!(buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_argument_defaults_to_summary() {
        let cli = Cli::try_parse_from(["geolens", "https://example.com"]).unwrap();
        assert_eq!(cli.target.as_deref(), Some("https://example.com"));
        assert_eq!(cli.format, OutputFormat::Summary);
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn html_input_with_attributed_url() {
        let cli = Cli::try_parse_from([
            "geolens",
            "--html",
            "page.html",
            "--url",
            "https://example.com/page",
            "-f",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.html, Some(PathBuf::from("page.html")));
        assert_eq!(cli.url.as_deref(), Some("https://example.com/page"));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn requires_url_or_html() {
        assert!(Cli::try_parse_from(["geolens"]).is_err());
        assert!(Cli::try_parse_from(["geolens", "--url", "https://example.com"]).is_err());
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["geolens", "https://example.com", "-f", "yaml"]).is_err());
    }

    #[test]
    fn summary_lists_every_category() {
        let analysis = geolens_core::analyze_html(
            "<title>Guide</title><main><h1>Guide</h1><p>Some body text for the summary test.</p></main>",
            "https://example.com/guide",
            PageSource::Manual,
        );
        let summary = render_summary(&analysis);
        assert!(summary.contains("Overall"));
        assert!(summary.contains("| Category"));
        for score in analysis.categories() {
            assert!(summary.contains(score.category.label()));
        }
    }
}
