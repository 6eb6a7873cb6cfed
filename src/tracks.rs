//! Track listing indexes built from a catalog candidate.
//!
//! Two views of the same listing:
//! - a by-disc title table with 1-based positional lookup
//! - a by-title index resolving a title to its track/disc position

use rustc_hash::FxHashMap;

use crate::models::Candidate;
use crate::normalize::{normalize_name, normalized_similarity};

/// Where a title sits in a candidate's track listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackPosition {
    pub track: u32,
    pub disc: u32,
}

// ============================================================================
// By-disc table
// ============================================================================

/// Disc → ordered track titles, discs ascending by disc number and titles
/// ascending by track number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscTable {
    discs: Vec<Vec<String>>,
}

impl DiscTable {
    pub fn by_discs(candidate: &Candidate) -> Self {
        let mut discs: Vec<_> = candidate.discs.iter().collect();
        discs.sort_by_key(|d| d.number);

        let discs: Vec<Vec<String>> = discs
            .into_iter()
            .map(|disc| {
                let mut tracks: Vec<_> = disc.tracks.iter().collect();
                tracks.sort_by_key(|t| t.number);
                tracks.into_iter().map(|t| t.title.clone()).collect()
            })
            .collect();

        Self { discs }
    }

    /// Title at a 1-based (disc, track) position.
    pub fn title_at(&self, disc: u32, track: u32) -> Option<&str> {
        let disc = self.disc(disc)?;
        let index = usize::try_from(track).ok()?.checked_sub(1)?;
        disc.get(index).map(String::as_str)
    }

    /// Track count of a 1-based disc.
    pub fn disc_len(&self, disc: u32) -> Option<usize> {
        self.disc(disc).map(Vec::len)
    }

    pub fn disc_count(&self) -> usize {
        self.discs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discs.iter().all(Vec::is_empty)
    }

    pub fn discs(&self) -> &[Vec<String>] {
        &self.discs
    }

    fn disc(&self, disc: u32) -> Option<&Vec<String>> {
        let index = usize::try_from(disc).ok()?.checked_sub(1)?;
        self.discs.get(index)
    }
}

// ============================================================================
// By-title index
// ============================================================================

/// Title → position, first occurrence wins across discs.
/// Keeps insertion order so fuzzy lookups are deterministic.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    entries: Vec<(String, TrackPosition)>,
    lookup: FxHashMap<String, usize>,
}

impl TitleIndex {
    pub fn by_name(candidate: &Candidate) -> Self {
        let mut index = Self::default();
        for disc in &candidate.discs {
            for track in &disc.tracks {
                if index.lookup.contains_key(&track.title) {
                    continue;
                }
                index.lookup.insert(track.title.clone(), index.entries.len());
                index.entries.push((
                    track.title.clone(),
                    TrackPosition {
                        track: track.number,
                        disc: disc.number,
                    },
                ));
            }
        }
        index
    }

    pub fn get(&self, title: &str) -> Option<TrackPosition> {
        self.lookup.get(title).map(|&i| self.entries[i].1)
    }

    /// Position of the first title that is at least `threshold` similar to `title`.
    /// An exact key wins over earlier fuzzy hits.
    pub fn find_title(&self, title: &str, threshold: f64) -> Option<TrackPosition> {
        if let Some(position) = self.get(title) {
            return Some(position);
        }
        let wanted = normalize_name(title);
        self.entries
            .iter()
            .find(|(t, _)| normalized_similarity(&normalize_name(t), &wanted) >= threshold)
            .map(|(_, position)| *position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
