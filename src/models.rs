//! Core data models for catalog enrichment.
//!
//! This module contains the destination record contract, the catalog
//! candidate shape and the artwork descriptor.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Record Fields
// ============================================================================

/// Every field the enricher may read or write on a record.
///
/// The `Amazon*` variants are the optional commerce extension fields; they
/// are part of the schema up front so hosts never declare them at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Artist,
    Album,
    Title,
    Track,
    Disc,
    TotalTracks,
    TotalDiscs,
    Asin,
    Upc,
    Ean,
    ReleaseDate,
    Year,
    Url,
    Picture,
    Label,
    AmazonSalesRank,
    AmazonDescription,
    AmazonPrice,
    AmazonAvailability,
    AmazonListPrice,
    AmazonUsedPrice,
    AmazonUsedCount,
}

impl Field {
    /// Tag name as hosts know it.
    pub fn name(self) -> &'static str {
        match self {
            Field::Artist => "artist",
            Field::Album => "album",
            Field::Title => "title",
            Field::Track => "track",
            Field::Disc => "disc",
            Field::TotalTracks => "totaltracks",
            Field::TotalDiscs => "totaldiscs",
            Field::Asin => "asin",
            Field::Upc => "upc",
            Field::Ean => "ean",
            Field::ReleaseDate => "releasedate",
            Field::Year => "year",
            Field::Url => "url",
            Field::Picture => "picture",
            Field::Label => "label",
            Field::AmazonSalesRank => "amazon_salesrank",
            Field::AmazonDescription => "amazon_description",
            Field::AmazonPrice => "amazon_price",
            Field::AmazonAvailability => "amazon_availability",
            Field::AmazonListPrice => "amazon_listprice",
            Field::AmazonUsedPrice => "amazon_usedprice",
            Field::AmazonUsedCount => "amazon_usedcount",
        }
    }

    pub fn is_extended(self) -> bool {
        matches!(
            self,
            Field::AmazonSalesRank
                | Field::AmazonDescription
                | Field::AmazonPrice
                | Field::AmazonAvailability
                | Field::AmazonListPrice
                | Field::AmazonUsedPrice
                | Field::AmazonUsedCount
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Record Values
// ============================================================================

/// Value stored in a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Text(String),
    Number(u32),
    Picture(Artwork),
}

/// Destination record the enricher reads from and writes to.
///
/// `notify_changed` is called once for every field the enricher actually
/// mutates, right after the corresponding `set`.
pub trait TagRecord {
    fn get(&self, field: Field) -> Option<TagValue>;
    fn set(&mut self, field: Field, value: TagValue);
    fn notify_changed(&mut self, field: Field);

    fn text(&self, field: Field) -> Option<String> {
        match self.get(field)? {
            TagValue::Text(s) => Some(s),
            TagValue::Number(n) => Some(n.to_string()),
            TagValue::Picture(_) => None,
        }
    }

    fn number(&self, field: Field) -> Option<u32> {
        match self.get(field)? {
            TagValue::Number(n) => Some(n),
            TagValue::Text(s) => s.trim().parse().ok(),
            TagValue::Picture(_) => None,
        }
    }

    fn is_set(&self, field: Field) -> bool {
        self.get(field).is_some()
    }
}

/// In-memory record with the fixed core fields and an extension map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub total_tracks: Option<u32>,
    pub total_discs: Option<u32>,
    pub asin: Option<String>,
    pub upc: Option<String>,
    pub ean: Option<String>,
    pub release_date: Option<String>,
    pub year: Option<u32>,
    pub url: Option<String>,
    pub picture: Option<Artwork>,
    pub label: Option<String>,
    pub extended: BTreeMap<Field, String>,
    /// Fields reported through `notify_changed`, in order.
    pub changed: Vec<Field>,
}

impl TagRecord for TrackTags {
    fn get(&self, field: Field) -> Option<TagValue> {
        let text = |v: &Option<String>| v.clone().map(TagValue::Text);
        let number = |v: &Option<u32>| v.map(TagValue::Number);
        match field {
            Field::Artist => text(&self.artist),
            Field::Album => text(&self.album),
            Field::Title => text(&self.title),
            Field::Track => number(&self.track),
            Field::Disc => number(&self.disc),
            Field::TotalTracks => number(&self.total_tracks),
            Field::TotalDiscs => number(&self.total_discs),
            Field::Asin => text(&self.asin),
            Field::Upc => text(&self.upc),
            Field::Ean => text(&self.ean),
            Field::ReleaseDate => text(&self.release_date),
            Field::Year => number(&self.year),
            Field::Url => text(&self.url),
            Field::Picture => self.picture.clone().map(TagValue::Picture),
            Field::Label => text(&self.label),
            _ => self.extended.get(&field).cloned().map(TagValue::Text),
        }
    }

    fn set(&mut self, field: Field, value: TagValue) {
        let as_text = |v: TagValue| match v {
            TagValue::Text(s) => Some(s),
            TagValue::Number(n) => Some(n.to_string()),
            TagValue::Picture(_) => None,
        };
        let as_number = |v: TagValue| match v {
            TagValue::Number(n) => Some(n),
            TagValue::Text(s) => s.trim().parse().ok(),
            TagValue::Picture(_) => None,
        };
        match field {
            Field::Artist => self.artist = as_text(value),
            Field::Album => self.album = as_text(value),
            Field::Title => self.title = as_text(value),
            Field::Track => self.track = as_number(value),
            Field::Disc => self.disc = as_number(value),
            Field::TotalTracks => self.total_tracks = as_number(value),
            Field::TotalDiscs => self.total_discs = as_number(value),
            Field::Asin => self.asin = as_text(value),
            Field::Upc => self.upc = as_text(value),
            Field::Ean => self.ean = as_text(value),
            Field::ReleaseDate => self.release_date = as_text(value),
            Field::Year => self.year = as_number(value),
            Field::Url => self.url = as_text(value),
            Field::Picture => {
                self.picture = match value {
                    TagValue::Picture(art) => Some(art),
                    _ => None,
                }
            }
            Field::Label => self.label = as_text(value),
            _ => match as_text(value) {
                Some(s) => {
                    self.extended.insert(field, s);
                }
                None => {
                    self.extended.remove(&field);
                }
            },
        }
    }

    fn notify_changed(&mut self, field: Field) {
        self.changed.push(field);
    }
}

// ============================================================================
// Catalog Models
// ============================================================================

/// One track in a catalog track listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogTrack {
    pub number: u32,
    pub title: String,
}

/// One disc of a catalog track listing. Tracks may arrive unsorted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Disc {
    pub number: u32,
    #[serde(default)]
    pub tracks: Vec<CatalogTrack>,
}

/// Optional commerce data attached to a catalog entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Commerce {
    pub sales_rank: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub availability: Option<String>,
    pub list_price: Option<String>,
    pub used_price: Option<String>,
    pub used_count: Option<String>,
}

/// One album search hit returned by the catalog.
/// Any field may be missing; candidates without discs are never scored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub album: Option<String>,
    pub label: Option<String>,
    pub asin: Option<String>,
    pub upc: Option<String>,
    pub ean: Option<String>,
    pub release_date: Option<String>, // Free text, e.g. "05 January, 1999"
    pub year: Option<u32>,
    pub url: Option<String>, // Detail page
    pub image_large: Option<String>,
    pub image_medium: Option<String>,
    pub image_small: Option<String>,
    pub commerce: Commerce,
    pub discs: Vec<Disc>,
}

impl Candidate {
    pub fn has_tracks(&self) -> bool {
        self.discs.iter().any(|d| !d.tracks.is_empty())
    }

    /// Catalog value feeding a record field, for the fields copied verbatim.
    pub fn value_for(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Album => &self.album,
            Field::Label => &self.label,
            Field::Asin => &self.asin,
            Field::Upc => &self.upc,
            Field::Ean => &self.ean,
            Field::AmazonSalesRank => &self.commerce.sales_rank,
            Field::AmazonDescription => &self.commerce.description,
            Field::AmazonPrice => &self.commerce.price,
            Field::AmazonAvailability => &self.commerce.availability,
            Field::AmazonListPrice => &self.commerce.list_price,
            Field::AmazonUsedPrice => &self.commerce.used_price,
            Field::AmazonUsedCount => &self.commerce.used_count,
            _ => return None,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

// ============================================================================
// Artwork
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureKind {
    FrontCover,
}

/// Cover art ready to embed in a record.
#[derive(Clone, PartialEq, Eq)]
pub struct Artwork {
    pub kind: PictureKind,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl fmt::Debug for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artwork")
            .field("kind", &self.kind)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_tags_round_trips_fields() {
        let mut tags = TrackTags::default();
        tags.set(Field::Title, TagValue::Text("Love of My Life".into()));
        tags.set(Field::Track, TagValue::Number(9));
        tags.set(Field::AmazonPrice, TagValue::Text("$9.99".into()));

        assert_eq!(tags.text(Field::Title).as_deref(), Some("Love of My Life"));
        assert_eq!(tags.number(Field::Track), Some(9));
        assert_eq!(tags.text(Field::Track).as_deref(), Some("9"));
        assert_eq!(tags.text(Field::AmazonPrice).as_deref(), Some("$9.99"));
        assert!(!tags.is_set(Field::Disc));
        assert!(tags.changed.is_empty());
    }

    #[test]
    fn test_candidate_deserializes_with_missing_fields() {
        let candidate: Candidate = serde_json::from_value(serde_json::json!({
            "album": "Jazz",
            "discs": [{ "number": 1, "tracks": [{ "number": 1, "title": "Mustapha" }] }]
        }))
        .unwrap();

        assert!(candidate.has_tracks());
        assert_eq!(candidate.value_for(Field::Album), Some("Jazz"));
        assert_eq!(candidate.value_for(Field::Label), None);
        assert_eq!(candidate.value_for(Field::Title), None);
        assert!(!Candidate::default().has_tracks());
    }

    #[test]
    fn test_blank_catalog_values_count_as_missing() {
        let candidate = Candidate {
            label: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(candidate.value_for(Field::Label), None);
    }

    #[test]
    fn test_catalog_values_are_trimmed() {
        let candidate = Candidate {
            album: Some("Jazz \n".into()),
            ..Default::default()
        };
        assert_eq!(candidate.value_for(Field::Album), Some("Jazz"));
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Field::TotalTracks.to_string(), "totaltracks");
        assert_eq!(Field::AmazonUsedCount.name(), "amazon_usedcount");
        assert!(Field::AmazonSalesRank.is_extended());
        assert!(!Field::Album.is_extended());
    }
}
