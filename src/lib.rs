//! Album catalog enrichment for track metadata records.
//!
//! Queries a catalog, scores the returned albums against the local record
//! and merges the winner's fields back, reporting every field it changed.

pub mod artwork;
pub mod catalog;
pub mod config;
pub mod date;
pub mod error;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod scoring;
pub mod tracks;

pub use artwork::{ArtworkCache, CoverArtResolver, HttpFetch, MemoryCache};
pub use catalog::{Catalog, CatalogRequest, QueryKind};
pub use config::{Locale, Options};
pub use error::{Error, Result};
pub use models::{Artwork, Candidate, Field, TagRecord, TagValue, TrackTags};
pub use reconcile::Reconciler;
pub use scoring::{select_best, BestMatch, MatchTarget, NoMatch};
