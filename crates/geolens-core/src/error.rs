//! Error types for geolens
//!
//! Only the fetch stage and configuration loading can fail. Once an
//! [`ExtractedContent`](crate::types::ExtractedContent) exists, scoring is total.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeolensError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeolensError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            GeolensError::InvalidUrl(_) | GeolensError::UnsupportedScheme(_) => {
                Some("Pass a full http:// or https:// URL, e.g. https://example.com/page")
            }
            GeolensError::Fetch { .. } => Some(
                "Check your internet connection, or save the page and run:\n  geolens --html page.html",
            ),
            GeolensError::Timeout { .. } => Some("Retry with a longer timeout: geolens --timeout 60 <url>"),
            GeolensError::HttpStatus { .. } => {
                Some("The server refused the request; try the final URL after redirects or analyse saved HTML")
            }
            GeolensError::Config(_) | GeolensError::Toml(_) => {
                Some("Category weights must sum to 1.0 and thresholds must be within 0-100")
            }
            GeolensError::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeolensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_carry_hints() {
        let err = GeolensError::Timeout {
            url: "https://example.com".to_string(),
            seconds: 20,
        };
        assert_eq!(
            err.to_string(),
            "Request to https://example.com timed out after 20s"
        );
        assert!(err.hint().unwrap().contains("--timeout"));
    }

    #[test]
    fn url_parse_errors_convert() {
        let err: GeolensError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, GeolensError::InvalidUrl(_)));
        assert!(err.hint().is_some());
    }
}
