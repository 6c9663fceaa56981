//! HTTP collaborator
//!
//! Fetches a page and its `/robots.txt` concurrently and packages the HTTP
//! metadata the scorers use. When the page redirects to another origin the
//! robots.txt of that origin is fetched instead. Only compiled with the
//! `fetch` feature.

use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

use crate::error::{GeolensError, Result};
use crate::types::{CrawlMetadata, PageSource};
use crate::url_utils;

/// Default wall-clock timeout per request
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!(
                "Mozilla/5.0 (compatible; geolens/{})",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

/// A fetched page ready for extraction
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects
    pub url: String,
    pub html: String,
    pub source: PageSource,
}

/// Fetch a page and its robots.txt.
///
/// A missing or unreachable robots.txt degrades to "not found"; any failure
/// of the page request itself is an error.
pub async fn fetch_page(url: &str, options: &FetchOptions) -> Result<FetchedPage> {
    let parsed = validate_url(url)?;
    let client = Client::builder()
        .timeout(Duration::from_secs(options.timeout_secs))
        .user_agent(options.user_agent.as_str())
        .build()
        .map_err(|e| GeolensError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let robots_url = url_utils::robots_txt_url(parsed.as_str());
    let (page, robots_txt) = tokio::join!(
        fetch_document(&client, parsed.as_str(), options.timeout_secs),
        fetch_robots(&client, robots_url.as_deref()),
    );
    let page = page?;

    let robots_txt = match redirected_robots_url(&parsed, &page.final_url) {
        Some(final_robots) => {
            debug!(url = %final_robots, "page redirected to another origin");
            fetch_robots(&client, Some(&final_robots)).await
        }
        None => robots_txt,
    };

    let is_https = Url::parse(&page.final_url)
        .map(|u| u.scheme() == "https")
        .unwrap_or(false);
    debug!(
        url = %page.final_url,
        status = page.status_code,
        bytes = page.html.len(),
        elapsed_ms = page.response_time_ms,
        robots_txt = robots_txt.is_some(),
        "fetched page"
    );

    Ok(FetchedPage {
        url: page.final_url.clone(),
        source: PageSource::Crawled(CrawlMetadata {
            final_url: page.final_url,
            status_code: page.status_code,
            is_https,
            content_length: page.html.len(),
            response_time_ms: page.response_time_ms,
            robots_txt,
            x_robots_tag: page.x_robots_tag,
        }),
        html: page.html,
    })
}

/// robots.txt governing the final URL, when it differs from the one that
/// was fetched for the requested URL
fn redirected_robots_url(requested: &Url, final_url: &str) -> Option<String> {
    let final_robots = url_utils::robots_txt_url(final_url)?;
    (url_utils::robots_txt_url(requested.as_str()).as_deref() != Some(final_robots.as_str()))
        .then_some(final_robots)
}

/// Parse a URL and require an http(s) scheme
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim())?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(GeolensError::UnsupportedScheme(other.to_string())),
    }
}

struct Document {
    final_url: String,
    status_code: u16,
    html: String,
    response_time_ms: u64,
    x_robots_tag: Option<String>,
}

async fn fetch_document(client: &Client, url: &str, timeout_secs: u64) -> Result<Document> {
    let started = Instant::now();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| request_error(url, timeout_secs, e))?;
    let status = response.status();
    let final_url = response.url().to_string();
    if !status.is_success() {
        return Err(GeolensError::HttpStatus {
            url: final_url,
            status: status.as_u16(),
        });
    }
    let x_robots_tag = response
        .headers()
        .get("x-robots-tag")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let html = response
        .text()
        .await
        .map_err(|e| request_error(url, timeout_secs, e))?;
    let response_time_ms = started.elapsed().as_millis() as u64;

    Ok(Document {
        final_url,
        status_code: status.as_u16(),
        html,
        response_time_ms,
        x_robots_tag,
    })
}

async fn fetch_robots(client: &Client, robots_url: Option<&str>) -> Option<String> {
    let robots_url = robots_url?;
    let response = match client.get(robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(url = robots_url, error = %e, "robots.txt fetch failed");
            return None;
        }
    };
    if !response.status().is_success() {
        debug!(url = robots_url, status = response.status().as_u16(), "no robots.txt");
        return None;
    }
    match response.text().await {
        Ok(body) => Some(body),
        Err(e) => {
            warn!(url = robots_url, error = %e, "robots.txt body unreadable");
            None
        }
    }
}

fn request_error(url: &str, timeout_secs: u64, error: reqwest::Error) -> GeolensError {
    if error.is_timeout() {
        GeolensError::Timeout {
            url: url.to_string(),
            seconds: timeout_secs,
        }
    } else {
        GeolensError::Fetch {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_url("https://example.com/page").is_ok());
        assert!(validate_url(" http://example.com ").is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(
            validate_url("ftp://example.com/file"),
            Err(GeolensError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
        assert!(matches!(
            validate_url("example.com"),
            Err(GeolensError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn invalid_url_never_hits_the_network() {
        let err = fetch_page("not a url", &FetchOptions::default()).await;
        assert!(matches!(err, Err(GeolensError::InvalidUrl(_))));
    }

    #[test]
    fn robots_follow_cross_origin_redirects() {
        let requested = validate_url("http://beanlab.test/guide").unwrap();
        assert_eq!(
            redirected_robots_url(&requested, "https://www.beanlab.test/guide"),
            Some("https://www.beanlab.test/robots.txt".to_string())
        );
        assert_eq!(
            redirected_robots_url(&requested, "http://beanlab.test/guides/espresso"),
            None
        );
    }

    #[test]
    fn default_user_agent_names_the_tool() {
        assert!(FetchOptions::default().user_agent.contains("geolens/"));
    }
}
