use url::Url;

/// Normalize a URL to its origin (scheme + host + optional port).
///
/// Falls back to trimming trailing slashes if the input cannot be parsed.
pub fn normalize_origin(input: &str) -> String {
    match Url::parse(input) {
        Ok(parsed) => parsed
            .origin()
            .ascii_serialization()
            .trim_end_matches('/')
            .to_string(),
        Err(_) => input.trim_end_matches('/').to_string(),
    }
}

/// Lowercased hostname of a URL, without a leading `www.`
pub fn hostname(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.trim_start_matches("www.").to_string())
}

/// A link is internal when it is root-relative or mentions the page's hostname
pub fn is_internal_link(href: &str, host: Option<&str>) -> bool {
    if href.starts_with('/') {
        return true;
    }
    match host {
        Some(host) if !host.is_empty() => href.to_ascii_lowercase().contains(host),
        _ => false,
    }
}

/// URL of the robots.txt file for a page
pub fn robots_txt_url(page_url: &str) -> Option<String> {
    let origin = normalize_origin(page_url);
    if origin.starts_with("http://") || origin.starts_with("https://") {
        Some(format!("{origin}/robots.txt"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_standard_url() {
        let url = "https://example.com/path/page?query=true";
        assert_eq!(normalize_origin(url), "https://example.com");
    }

    #[test]
    fn keeps_port_information() {
        let url = "https://example.com:8443/path";
        assert_eq!(normalize_origin(url), "https://example.com:8443");
    }

    #[test]
    fn trims_trailing_slash_when_parse_fails() {
        let url = "example.com/";
        assert_eq!(normalize_origin(url), "example.com");
    }

    #[test]
    fn hostname_strips_www() {
        assert_eq!(
            hostname("https://WWW.Example.com/a").as_deref(),
            Some("example.com")
        );
        assert_eq!(hostname("not a url"), None);
    }

    #[test]
    fn classifies_internal_links() {
        let host = Some("example.com");
        assert!(is_internal_link("/about", host));
        assert!(is_internal_link("https://example.com/blog", host));
        assert!(is_internal_link("https://www.example.com/blog", host));
        assert!(!is_internal_link("https://other.org/", host));
        assert!(!is_internal_link("#section", host));
        assert!(!is_internal_link("https://other.org/", None));
    }

    #[test]
    fn robots_url_uses_origin() {
        assert_eq!(
            robots_txt_url("https://example.com/deep/page?x=1").as_deref(),
            Some("https://example.com/robots.txt")
        );
        assert_eq!(robots_txt_url("manual input"), None);
    }
}
