//! Merging the best catalog album into a local record.
//!
//! One call runs one catalog query, picks a winner and copies fields over,
//! touching a field only when the catalog has a value that differs from the
//! local one. Every mutation is reported through `TagRecord::notify_changed`
//! and returned to the caller.

use tracing::{info, warn};

use crate::artwork::CoverArtResolver;
use crate::catalog::{Catalog, CatalogRequest};
use crate::config::Options;
use crate::date::parse_release_date;
use crate::error::{Error, Result};
use crate::models::{Candidate, Field, TagRecord, TagValue};
use crate::normalize::TITLE_MATCH_THRESHOLD;
use crate::scoring::{select_best, MatchTarget};
use crate::tracks::{DiscTable, TitleIndex, TrackPosition};

/// Catalog fields always copied, each into the record field of the same meaning.
pub const CORE_FIELD_MAP: [Field; 5] = [Field::Album, Field::Label, Field::Asin, Field::Upc, Field::Ean];

/// Commerce fields copied only when `amazon_info` is enabled.
pub const EXTENDED_FIELD_MAP: [Field; 7] = [
    Field::AmazonSalesRank,
    Field::AmazonDescription,
    Field::AmazonPrice,
    Field::AmazonAvailability,
    Field::AmazonListPrice,
    Field::AmazonUsedPrice,
    Field::AmazonUsedCount,
];

// ============================================================================
// Change tracking
// ============================================================================

/// Writes to a record, skipping no-op writes and logging what changed.
struct RecordWriter<'r> {
    record: &'r mut dyn TagRecord,
    changed: Vec<Field>,
}

impl<'r> RecordWriter<'r> {
    fn new(record: &'r mut dyn TagRecord) -> Self {
        Self {
            record,
            changed: Vec::new(),
        }
    }

    fn update(&mut self, field: Field, value: TagValue) {
        // Hosts may store numbers as text; compare through the typed accessors
        let unchanged = match &value {
            TagValue::Number(n) => self.record.number(field) == Some(*n),
            TagValue::Text(s) => self.record.text(field).as_deref() == Some(s.as_str()),
            TagValue::Picture(_) => self.record.get(field).as_ref() == Some(&value),
        };
        if unchanged {
            return;
        }
        self.record.set(field, value);
        self.record.notify_changed(field);
        self.changed.push(field);
    }

    fn is_set(&self, field: Field) -> bool {
        self.record.is_set(field)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Reconciler
// ============================================================================

/// Looks a record up in the catalog and merges the best album into it.
pub struct Reconciler<'a> {
    options: &'a Options,
    catalog: &'a dyn Catalog,
    artwork: CoverArtResolver<'a>,
}

impl<'a> Reconciler<'a> {
    pub fn new(options: &'a Options, catalog: &'a dyn Catalog, artwork: CoverArtResolver<'a>) -> Self {
        Self {
            options,
            catalog,
            artwork,
        }
    }

    /// Enrich `record` and return the fields that changed, in the order they changed.
    ///
    /// An empty list means nothing matched well enough or nothing differed.
    /// Errors mean the lookup itself could not run; the record is untouched.
    pub fn reconcile(&self, record: &mut dyn TagRecord) -> Result<Vec<Field>> {
        let options = self.options;
        let api_token = options.api_token().ok_or(Error::MissingApiToken)?;

        if record.text(Field::Artist).map_or(true, |a| a.trim().is_empty()) {
            warn!("record has no artist; catalog matching may fail");
        }

        let request = CatalogRequest::for_record(record, options, api_token);
        if !options.quiet {
            info!(kind = %request.kind, key = %request.key, locale = %request.locale, "querying catalog");
        }

        let candidates = self.catalog.search(&request).map_err(|e| Error::Catalog {
            kind: request.kind,
            message: format!("{e:#}"),
        })?;

        let target = MatchTarget::from_record(record);
        let best = match select_best(&target, &candidates, options) {
            Ok(best) => best,
            Err(no_match) => {
                if !options.quiet {
                    info!(
                        candidates = no_match.candidates,
                        best_score = ?no_match.best_score,
                        threshold = no_match.threshold,
                        "no catalog album scored high enough"
                    );
                }
                return Ok(Vec::new());
            }
        };

        if !options.quiet {
            info!(
                album = ?best.candidate.album,
                asin = ?best.candidate.asin,
                score = best.score,
                candidates = best.candidates,
                "matched catalog album"
            );
        }

        let mut writer = RecordWriter::new(record);
        self.merge(&mut writer, &target, best.candidate);

        if !options.quiet {
            let names: Vec<_> = writer.changed.iter().map(|f| f.name()).collect();
            info!(changed = %names.join(", "), "record updated");
        }

        Ok(writer.changed)
    }

    fn merge(&self, writer: &mut RecordWriter<'_>, target: &MatchTarget, winner: &Candidate) {
        let table = DiscTable::by_discs(winner);

        if let Some(position) = self.resolve_position(writer, target, winner) {
            if let Some(title) = table.title_at(position.disc, position.track) {
                writer.update(Field::Title, TagValue::Text(title.to_string()));
                if let Some(len) = table.disc_len(position.disc).and_then(|n| u32::try_from(n).ok()) {
                    writer.update(Field::TotalTracks, TagValue::Number(len));
                }
                if let Ok(count) = u32::try_from(table.disc_count()) {
                    writer.update(Field::TotalDiscs, TagValue::Number(count));
                }
            }
        }

        if let Some(date) = present(&winner.release_date).and_then(parse_release_date) {
            writer.update(Field::ReleaseDate, TagValue::Text(date));
        }

        if !writer.is_set(Field::Url) {
            if let Some(url) = present(&winner.url) {
                writer.update(Field::Url, TagValue::Text(url.to_string()));
            }
        }

        let extended: &[Field] = if self.options.amazon_info {
            &EXTENDED_FIELD_MAP
        } else {
            &[]
        };
        for &field in CORE_FIELD_MAP.iter().chain(extended) {
            if let Some(value) = winner.value_for(field) {
                writer.update(field, TagValue::Text(value.to_string()));
            }
        }

        self.apply_cover(writer, winner);
    }

    /// Work out which catalog track the record is, adopting its track/disc
    /// numbers when they were found by title.
    fn resolve_position(
        &self,
        writer: &mut RecordWriter<'_>,
        target: &MatchTarget,
        winner: &Candidate,
    ) -> Option<TrackPosition> {
        if self.options.trust_title || target.track.is_none() {
            let title = target.title.as_deref()?;
            let position = TitleIndex::by_name(winner).find_title(title, TITLE_MATCH_THRESHOLD)?;
            writer.update(Field::Track, TagValue::Number(position.track));
            writer.update(Field::Disc, TagValue::Number(position.disc));
            Some(position)
        } else if self.options.trust_track {
            Some(TrackPosition {
                track: target.track?,
                disc: target.disc.unwrap_or(1),
            })
        } else {
            None
        }
    }

    /// Large cover first, medium as fallback. `cover_overwrite` only lets the
    /// large cover replace a picture the record already has.
    fn apply_cover(&self, writer: &mut RecordWriter<'_>, winner: &Candidate) {
        let mut covered = false;

        if !writer.is_set(Field::Picture) || self.options.cover_overwrite {
            if let Some(art) = present(&winner.image_large).and_then(|url| self.artwork.fetch(url)) {
                writer.update(Field::Picture, TagValue::Picture(art));
                covered = true;
            }
        }

        if !covered && !writer.is_set(Field::Picture) {
            if let Some(art) = present(&winner.image_medium).and_then(|url| self.artwork.fetch(url)) {
                writer.update(Field::Picture, TagValue::Picture(art));
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
