use regex::Regex;
use serde::{Deserialize, Serialize};

/// A user-chosen caption-track locator, taken from the host page's own
/// embedded track metadata. Used by the manual-fetch fallback when live
/// interception did not produce a candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackLocator {
    pub url: String,
    pub language: Option<String>,
    pub is_auto_generated: bool,
}

impl TrackLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            language: None,
            is_auto_generated: false,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn auto_generated(mut self) -> Self {
        self.is_auto_generated = true;
        self
    }

    /// Extracts the video identifier from the locator's `v=` query parameter.
    pub fn video_id(&self) -> Option<String> {
        // Lazily compiling per call is fine here; locators are touched once
        // or twice per session.
        let re = Regex::new(r"[?&]v=([A-Za-z0-9_-]+)").ok()?;
        re.captures(&self.url)
            .map(|caps| caps[1].to_string())
    }

    /// Extracts the caption language from the locator's `lang=` parameter,
    /// falling back to the explicitly set language.
    pub fn language_code(&self) -> Option<String> {
        let re = Regex::new(r"[?&]lang=([A-Za-z-]+)").ok()?;
        re.captures(&self.url)
            .map(|caps| caps[1].to_string())
            .or_else(|| self.language.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_video_id_and_language() {
        let track = TrackLocator::new(
            "https://video.example/api/timedtext?v=dQw4w9WgXcQ&lang=en&fmt=json3&kind=asr",
        );
        assert_eq!(track.video_id().as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(track.language_code().as_deref(), Some("en"));
    }

    #[test]
    fn missing_parameters_yield_none() {
        let track = TrackLocator::new("https://video.example/api/timedtext?fmt=json3");
        assert!(track.video_id().is_none());
        assert!(track.language_code().is_none());
    }

    #[test]
    fn explicit_language_is_a_fallback() {
        let track = TrackLocator::new("https://video.example/api/timedtext?v=abc")
            .with_language("de")
            .auto_generated();
        assert_eq!(track.language_code().as_deref(), Some("de"));
        assert!(track.is_auto_generated);
    }
}
