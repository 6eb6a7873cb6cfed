//! Recognized enrichment options.

use serde::Deserialize;
use std::fmt;

/// Minimum score a candidate needs before it is accepted.
pub const DEFAULT_MIN_ALBUM_POINTS: u32 = 10;

/// Catalog result pages requested per query.
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Catalog storefront region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Us,
    Uk,
    De,
    Fr,
    Jp,
    Ca,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Us => "us",
            Locale::Uk => "uk",
            Locale::De => "de",
            Locale::Fr => "fr",
            Locale::Jp => "jp",
            Locale::Ca => "ca",
        }
    }

    /// EAN barcodes are only searchable outside the default region.
    pub fn supports_ean(self) -> bool {
        self != Locale::default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Options controlling lookup and merge behavior.
/// Every key is optional; `api_token` must be supplied before a lookup can run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    pub quiet: bool,
    pub verbose: bool,
    /// Resolve track/disc from the title even when a track number is present
    pub trust_title: bool,
    /// Use the local track number as-is to look up the title
    pub trust_track: bool,
    /// Replace an existing picture with the large cover
    #[serde(rename = "coveroverwrite")]
    pub cover_overwrite: bool,
    #[serde(rename = "apiToken", alias = "api_token")]
    pub api_token: Option<String>,
    pub min_album_points: u32,
    pub ignore_asin: bool,
    pub ignore_upc: bool,
    pub ignore_ean: bool,
    pub max_pages: u32,
    pub locale: Locale,
    /// Copy commerce fields into the amazon_* extension fields
    pub amazon_info: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            quiet: false,
            verbose: false,
            trust_title: false,
            trust_track: false,
            cover_overwrite: false,
            api_token: None,
            min_album_points: DEFAULT_MIN_ALBUM_POINTS,
            ignore_asin: false,
            ignore_upc: false,
            ignore_ean: false,
            max_pages: DEFAULT_MAX_PAGES,
            locale: Locale::default(),
            amazon_info: false,
        }
    }
}

impl Options {
    /// Token with surrounding whitespace removed; blank counts as missing.
    pub fn api_token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
