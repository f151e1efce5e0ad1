use serde::Deserialize;

use crate::interception::url_filter::UrlFilter;

/// Capture-pipeline tuning, nested under `[capture]` in the TOML file.
///
/// Both fields default to the platform's known caption endpoint policy;
/// overriding them is only needed if the platform changes its URL scheme.
#[derive(clap::Args, Debug, Clone, Default, Deserialize)]
pub struct CaptureSettings {
    /// URL substring identifying caption traffic
    #[arg(long = "capture-url-needle")]
    #[serde(default)]
    pub url_needle: Option<String>,

    /// Query marker identifying sibling non-caption requests to exclude
    #[arg(long = "capture-exclude-marker")]
    #[serde(default)]
    pub exclude_marker: Option<String>,
}

impl CaptureSettings {
    /// Builds the URL filter, falling back to the default policy for any
    /// unset field.
    pub fn url_filter(&self) -> UrlFilter {
        match &self.url_needle {
            Some(needle) => UrlFilter::new(needle.clone(), self.exclude_marker.clone()),
            None => match &self.exclude_marker {
                Some(marker) => UrlFilter::new(
                    UrlFilter::CAPTION_PATH_SEGMENT,
                    Some(marker.clone()),
                ),
                None => UrlFilter::default(),
            },
        }
    }
}
