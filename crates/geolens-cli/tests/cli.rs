//! End-to-end tests for the geolens binary
//!
//! These run the compiled CLI as a subprocess against local HTML files, so
//! no network access is needed.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>Espresso Brewing Guide for Beginners at Home</title>
    <meta name="description" content="Learn how to pull a balanced espresso shot at home with the right grind, dose and timing.">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <script type="application/ld+json">
    {"@context": "https://schema.org", "@type": "Organization", "name": "Bean Lab", "url": "https://beanlab.test"}
    </script>
</head>
<body>
    <nav><a href="/">Home</a></nav>
    <main>
        <h1>Espresso Brewing Guide</h1>
        <h2>What grind size should you use?</h2>
        <p>Use a fine grind that feels like powdered sugar between your fingers.</p>
    </main>
</body>
</html>
"#;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_geolens"))
}

fn write_page(name: &str, html: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("geolens-{}-{name}.html", std::process::id()));
    fs::write(&path, html).expect("Failed to write fixture");
    path
}

#[test]
fn test_cli_help() {
    let output = binary().arg("--help").output().expect("Failed to run CLI");
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success());
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--html"));
    assert!(stdout.contains("--format"));
}

#[test]
fn test_cli_json_output_from_file() {
    let path = write_page("json", PAGE);
    let output = binary()
        .args(["--html", path.to_str().unwrap()])
        .args(["--url", "https://beanlab.test/espresso", "--format", "json"])
        .output()
        .expect("Failed to run CLI");
    fs::remove_file(&path).ok();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["url"], "https://beanlab.test/espresso");
    assert_eq!(value["debugInfo"]["sourceKind"], "manual");
    let overall = value["overallScore"].as_u64().unwrap();
    assert!(overall <= 100);
    assert!(value["schemaAnalysis"]["metrics"]["schemaPresence"].as_u64().unwrap() > 0);
}

#[test]
fn test_cli_markdown_output() {
    let path = write_page("markdown", PAGE);
    let output = binary()
        .args(["--html", path.to_str().unwrap(), "-f", "markdown"])
        .output()
        .expect("Failed to run CLI");
    fs::remove_file(&path).ok();

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(output.status.success());
    assert!(stdout.contains("## Main Content"));
    assert!(stdout.contains("Espresso Brewing Guide"));
}

#[test]
fn test_cli_summary_output() {
    let path = write_page("summary", PAGE);
    let output = binary()
        .args(["--html", path.to_str().unwrap()])
        .output()
        .expect("Failed to run CLI");
    fs::remove_file(&path).ok();

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(output.status.success());
    assert!(stdout.contains("Category Scores"));
    assert!(stdout.contains("Schema Analysis"));
}

#[test]
fn test_cli_missing_file_fails() {
    let output = binary()
        .args(["--html", "/definitely/not/here.html"])
        .output()
        .expect("Failed to run CLI");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read HTML file"));
}

#[test]
fn test_cli_rejects_invalid_config() {
    let config = env::temp_dir().join(format!("geolens-{}-bad.toml", std::process::id()));
    fs::write(&config, "[weights]\neeat = 0.9\n").unwrap();
    let page = write_page("config", PAGE);

    let output = binary()
        .args(["--html", page.to_str().unwrap()])
        .args(["--config", config.to_str().unwrap()])
        .output()
        .expect("Failed to run CLI");
    fs::remove_file(&config).ok();
    fs::remove_file(&page).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hint:"));
}

#[test]
fn test_cli_unsupported_scheme_fails_before_fetch() {
    let output = binary()
        .arg("ftp://example.com/page")
        .output()
        .expect("Failed to run CLI");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported URL scheme"));
}
