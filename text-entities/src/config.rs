//! Configuration for pattern construction and extraction.

use serde::{Deserialize, Serialize};

/// Options that change how matches are turned into entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Whether bare domains without `http://`/`https://` count as URLs.
    pub extract_url_without_protocol: bool,

    /// Whether `t.co` links are cut back to `https?://t.co/<slug>`.
    pub trim_tco_paths: bool,
}

impl ExtractorConfig {
    /// Toggle extraction of URLs without an explicit protocol.
    pub fn with_url_without_protocol(mut self, enabled: bool) -> Self {
        self.extract_url_without_protocol = enabled;
        self
    }

    /// Toggle trimming of trailing `t.co` path characters.
    pub fn with_tco_trimming(mut self, enabled: bool) -> Self {
        self.trim_tco_paths = enabled;
        self
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            extract_url_without_protocol: true,
            trim_tco_paths: true,
        }
    }
}

/// Tables consumed while building the [`PatternLibrary`](crate::PatternLibrary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Country-code TLDs that may end a protocol-less domain on their own,
    /// e.g. `example.co`.
    pub special_cctlds: Vec<String>,
}

impl PatternConfig {
    /// Replace the special country-code TLD table.
    pub fn with_special_cctlds<I, S>(mut self, tlds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.special_cctlds = tlds.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            special_cctlds: vec!["co".to_string(), "tv".to_string()],
        }
    }
}
