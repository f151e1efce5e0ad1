//! URL classification for outbound requests.

/// Decides which outbound request URLs are caption-endpoint traffic.
///
/// The default policy is a substring match on the caption API path segment,
/// minus requests carrying a query marker used by a sibling endpoint that
/// shares the path prefix but serves a different purpose.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    needle: String,
    exclude_marker: Option<String>,
}

impl UrlFilter {
    /// Path segment of the platform's caption endpoint.
    pub const CAPTION_PATH_SEGMENT: &'static str = "/api/timedtext";

    /// Query marker carried by non-caption requests on the same path prefix.
    pub const NON_CAPTION_MARKER: &'static str = "type=metadata";

    pub fn new(needle: impl Into<String>, exclude_marker: Option<String>) -> Self {
        Self {
            needle: needle.into(),
            exclude_marker,
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        if !url.contains(&self.needle) {
            return false;
        }
        match &self.exclude_marker {
            Some(marker) => !url.contains(marker.as_str()),
            None => true,
        }
    }
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::new(
            Self::CAPTION_PATH_SEGMENT,
            Some(Self::NON_CAPTION_MARKER.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_caption_endpoint() {
        let filter = UrlFilter::default();
        assert!(filter.matches(
            "https://video.example/api/timedtext?v=abc123&lang=en&fmt=json3"
        ));
    }

    #[test]
    fn rejects_unrelated_urls() {
        let filter = UrlFilter::default();
        assert!(!filter.matches("https://video.example/api/stats?v=abc123"));
    }

    #[test]
    fn rejects_sibling_endpoint_with_marker() {
        let filter = UrlFilter::default();
        assert!(!filter.matches(
            "https://video.example/api/timedtext?v=abc123&type=metadata"
        ));
    }

    #[test]
    fn custom_policy_without_marker() {
        let filter = UrlFilter::new("/captions", None);
        assert!(filter.matches("https://other.example/captions?id=1&type=metadata"));
    }
}
