//! Catalog query contract.
//!
//! The wire protocol lives with the host; the enricher only builds a request
//! and consumes the candidates it gets back.

use std::fmt;

use crate::config::{Locale, Options};
use crate::models::{Candidate, Field, TagRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Catalog identifier (ASIN)
    Identifier,
    /// UPC or EAN barcode
    Barcode,
    ArtistName,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryKind::Identifier => "identifier",
            QueryKind::Barcode => "barcode",
            QueryKind::ArtistName => "artist name",
        })
    }
}

/// One catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    pub kind: QueryKind,
    pub key: String,
    pub locale: Locale,
    pub max_pages: u32,
    pub api_token: String,
}

impl CatalogRequest {
    /// Pick the most specific lookup the record allows:
    /// ASIN, then UPC, then EAN (non-default regions only), then artist name.
    pub fn for_record(record: &dyn TagRecord, options: &Options, api_token: &str) -> Self {
        let present = |field: Field| record.text(field).filter(|v| !v.trim().is_empty());

        let (kind, key) = if let Some(asin) = present(Field::Asin).filter(|_| !options.ignore_asin)
        {
            (QueryKind::Identifier, asin)
        } else if let Some(upc) = present(Field::Upc).filter(|_| !options.ignore_upc) {
            (QueryKind::Barcode, upc)
        } else if let Some(ean) = present(Field::Ean)
            .filter(|_| !options.ignore_ean && options.locale.supports_ean())
        {
            (QueryKind::Barcode, ean)
        } else {
            (
                QueryKind::ArtistName,
                record.text(Field::Artist).unwrap_or_default(),
            )
        };

        Self {
            kind,
            key: key.trim().to_string(),
            locale: options.locale,
            max_pages: options.max_pages,
            api_token: api_token.to_string(),
        }
    }
}

/// Source of album candidates.
pub trait Catalog {
    fn search(&self, request: &CatalogRequest) -> anyhow::Result<Vec<Candidate>>;
}

impl<F> Catalog for F
where
    F: Fn(&CatalogRequest) -> anyhow::Result<Vec<Candidate>>,
{
    fn search(&self, request: &CatalogRequest) -> anyhow::Result<Vec<Candidate>> {
        self(request)
    }
}
