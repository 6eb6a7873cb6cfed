//! Candidate scoring for catalog album matching.
//!
//! Each candidate earns points for every rule it satisfies; the rules are
//! all-or-nothing and additive:
//! - identifier and barcode matches (strong evidence)
//! - album name, exact or fuzzy
//! - a track whose title matches, plus its position
//! - track count and release year agreement

use serde::Serialize;
use tracing::debug;

use crate::config::Options;
use crate::models::{Candidate, Field, TagRecord};
use crate::normalize::{
    fuzzy_matches, normalize_name, normalized_similarity, ALBUM_MATCH_THRESHOLD,
    TITLE_MATCH_THRESHOLD,
};
use crate::tracks::DiscTable;

// ============================================================================
// Point Table
// ============================================================================

pub const ASIN_POINTS: u32 = 128;
pub const BARCODE_POINTS: u32 = 64;
pub const ALBUM_EXACT_POINTS: u32 = 32;
pub const ALBUM_FUZZY_POINTS: u32 = 20;
pub const TITLE_POINTS: u32 = 8;
/// On top of TITLE_POINTS when the matching track sits at the local track number
pub const TRACK_NUMBER_POINTS: u32 = 2;
pub const TRACK_COUNT_POINTS: u32 = 4;
pub const YEAR_POINTS: u32 = 2;
/// Tie-breaker: released before the baseline candidate
pub const EARLIER_YEAR_POINTS: u32 = 1;

// ============================================================================
// Match Target
// ============================================================================

/// The local record's values that scoring looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchTarget {
    pub album: Option<String>,
    pub title: Option<String>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub total_tracks: Option<u32>,
    pub year: Option<u32>,
    pub asin: Option<String>,
    pub upc: Option<String>,
    pub ean: Option<String>,
}

impl MatchTarget {
    pub fn from_record(record: &dyn TagRecord) -> Self {
        let text = |field: Field| {
            record
                .text(field)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            album: text(Field::Album),
            title: text(Field::Title),
            track: record.number(Field::Track),
            disc: record.number(Field::Disc),
            total_tracks: record.number(Field::TotalTracks),
            year: record.number(Field::Year),
            asin: text(Field::Asin),
            upc: text(Field::Upc),
            ean: text(Field::Ean),
        }
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Points a candidate earned, rule by rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub asin: u32,
    pub barcode: u32,
    pub album: u32,
    pub title: u32,
    pub track_number: u32,
    pub track_count: u32,
    pub year: u32,
    pub earlier_year: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.asin
            + self.barcode
            + self.album
            + self.title
            + self.track_number
            + self.track_count
            + self.year
            + self.earlier_year
    }
}

fn same_code(local: &Option<String>, remote: &Option<String>) -> bool {
    match (local, remote) {
        (Some(l), Some(r)) => !r.trim().is_empty() && l.trim() == r.trim(),
        _ => false,
    }
}

/// Score one candidate against the local record.
///
/// `baseline_year` is the year of the first track-bearing candidate in the
/// result list; candidates released earlier get a one-point nudge.
pub fn score_candidate(
    target: &MatchTarget,
    candidate: &Candidate,
    baseline_year: Option<u32>,
    options: &Options,
) -> ScoreBreakdown {
    let mut score = ScoreBreakdown::default();

    if !options.ignore_asin {
        if let (Some(local), Some(remote)) = (&target.asin, &candidate.asin) {
            if local.eq_ignore_ascii_case(remote.trim()) {
                score.asin = ASIN_POINTS;
            }
        }
    }

    if same_code(&target.upc, &candidate.upc) || same_code(&target.ean, &candidate.ean) {
        score.barcode = BARCODE_POINTS;
    }

    if let (Some(local), Some(remote)) = (&target.album, &candidate.album) {
        if local == remote.trim() {
            score.album = ALBUM_EXACT_POINTS;
        } else if fuzzy_matches(local, remote, ALBUM_MATCH_THRESHOLD) {
            score.album = ALBUM_FUZZY_POINTS;
        }
    }

    if let Some(title) = &target.title {
        let wanted = normalize_name(title);
        let matching = candidate
            .discs
            .iter()
            .flat_map(|d| d.tracks.iter())
            .find(|t| normalized_similarity(&normalize_name(&t.title), &wanted) >= TITLE_MATCH_THRESHOLD);
        if let Some(track) = matching {
            score.title = TITLE_POINTS;
            if target.track == Some(track.number) {
                score.track_number = TRACK_NUMBER_POINTS;
            }
        }
    }

    if let Some(total) = target.total_tracks {
        let table = DiscTable::by_discs(candidate);
        if table.disc_len(target.disc.unwrap_or(1)) == Some(total as usize) {
            score.track_count = TRACK_COUNT_POINTS;
        }
    }

    if let Some(year) = candidate.year {
        if target.year == Some(year) {
            score.year = YEAR_POINTS;
        }
        if baseline_year.is_some_and(|baseline| year < baseline) {
            score.earlier_year = EARLIER_YEAR_POINTS;
        }
    }

    score
}

// ============================================================================
// Selection
// ============================================================================

/// The accepted candidate.
#[derive(Debug, Clone, Copy)]
pub struct BestMatch<'a> {
    pub candidate: &'a Candidate,
    pub score: u32,
    /// All candidates seen, scored or not
    pub candidates: usize,
}

/// No candidate reached the minimum score. Not an error: the record is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoMatch {
    pub candidates: usize,
    pub best_score: Option<u32>,
    pub threshold: u32,
}

/// Pick the highest scoring candidate, keeping the earliest on ties.
///
/// Candidates without a track listing are counted but never scored. The
/// first candidate that does have tracks fixes the baseline year for the
/// earlier-release tie-breaker, whatever its own score turns out to be.
pub fn select_best<'a>(
    target: &MatchTarget,
    candidates: &'a [Candidate],
    options: &Options,
) -> Result<BestMatch<'a>, NoMatch> {
    let mut baseline: Option<Option<u32>> = None;
    let mut best: Option<(&'a Candidate, u32)> = None;

    for (i, candidate) in candidates.iter().enumerate() {
        if !candidate.has_tracks() {
            if options.verbose {
                debug!(index = i, album = ?candidate.album, "skipping candidate without tracks");
            }
            continue;
        }

        let baseline_year = *baseline.get_or_insert(candidate.year);
        let breakdown = score_candidate(target, candidate, baseline_year, options);
        let score = breakdown.total();

        if options.verbose {
            debug!(
                index = i,
                album = ?candidate.album,
                asin = ?candidate.asin,
                score,
                breakdown = %serde_json::to_string(&breakdown).unwrap_or_default(),
                "scored candidate"
            );
        }

        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }

    match best {
        Some((candidate, score)) if score >= options.min_album_points => Ok(BestMatch {
            candidate,
            score,
            candidates: candidates.len(),
        }),
        _ => Err(NoMatch {
            candidates: candidates.len(),
            best_score: best.map(|(_, score)| score),
            threshold: options.min_album_points,
        }),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogTrack, Disc};

    fn disc(number: u32, titles: &[&str]) -> Disc {
        Disc {
            number,
            tracks: titles
                .iter()
                .enumerate()
                .map(|(i, title)| CatalogTrack {
                    number: i as u32 + 1,
                    title: title.to_string(),
                })
                .collect(),
        }
    }

    const OPERA: [&str; 12] = [
        "Death on Two Legs (Dedicated to...)",
        "Lazing on a Sunday Afternoon",
        "I'm in Love With My Car",
        "You're My Best Friend",
        "'39",
        "Sweet Lady",
        "Seaside Rendezvous",
        "The Prophet's Song",
        "Love of My Life",
        "Good Company",
        "Bohemian Rhapsody",
        "God Save the Queen",
    ];

    fn opera() -> Candidate {
        Candidate {
            album: Some("A Night at the Opera".into()),
            asin: Some("B000002UJQ".into()),
            year: Some(1975),
            discs: vec![disc(1, &OPERA)],
            ..Default::default()
        }
    }

    fn queen_target() -> MatchTarget {
        MatchTarget {
            album: Some("A Night at the Opera".into()),
            title: Some("Bohemian Rhapsody".into()),
            asin: Some("b000002ujq".into()),
            ..Default::default()
        }
    }

    fn unrelated(album: &str) -> Candidate {
        Candidate {
            album: Some(album.into()),
            discs: vec![disc(1, &["Intro", "Outro"])],
            ..Default::default()
        }
    }

    #[test]
    fn test_queen_scenario_scores_168() {
        let candidates = vec![opera()];
        let best = select_best(&queen_target(), &candidates, &Options::default()).unwrap();

        assert_eq!(best.score, ASIN_POINTS + ALBUM_EXACT_POINTS + TITLE_POINTS);
        assert_eq!(best.score, 168);
        assert_eq!(best.candidates, 1);
    }

    #[test]
    fn test_breakdown_rules() {
        let mut target = queen_target();
        target.track = Some(11);
        target.total_tracks = Some(12);
        target.year = Some(1975);
        target.upc = Some("720616209323".into());
        let mut candidate = opera();
        candidate.upc = Some("720616209323".into());

        let score = score_candidate(&target, &candidate, Some(1975), &Options::default());

        assert_eq!(
            score,
            ScoreBreakdown {
                asin: 128,
                barcode: 64,
                album: 32,
                title: 8,
                track_number: 2,
                track_count: 4,
                year: 2,
                earlier_year: 0,
            }
        );
        assert_eq!(score.total(), 240);
    }

    #[test]
    fn test_fuzzy_album_scores_20() {
        let target = MatchTarget {
            album: Some("Wall".into()),
            ..Default::default()
        };
        let candidate = Candidate {
            album: Some("The Wall".into()),
            discs: vec![disc(1, &["In the Flesh?"])],
            ..Default::default()
        };

        let score = score_candidate(&target, &candidate, None, &Options::default());
        assert_eq!(score.album, ALBUM_FUZZY_POINTS);
        assert_eq!(score.total(), 20);
    }

    #[test]
    fn test_padded_catalog_album_scores_exact() {
        let target = MatchTarget {
            album: Some("Jazz".into()),
            ..Default::default()
        };
        let candidate = Candidate {
            album: Some("Jazz ".into()),
            discs: vec![disc(1, &["Mustapha"])],
            ..Default::default()
        };

        let score = score_candidate(&target, &candidate, None, &Options::default());
        assert_eq!(score.album, ALBUM_EXACT_POINTS);
    }

    #[test]
    fn test_ean_match_scores_barcode() {
        let target = MatchTarget {
            ean: Some("0077774617528".into()),
            ..Default::default()
        };
        let candidate = Candidate {
            ean: Some("0077774617528".into()),
            ..Default::default()
        };
        let score = score_candidate(&target, &candidate, None, &Options::default());
        assert_eq!(score.barcode, BARCODE_POINTS);
    }

    #[test]
    fn test_ignore_asin_option() {
        let options = Options {
            ignore_asin: true,
            ..Default::default()
        };
        let score = score_candidate(&queen_target(), &opera(), None, &options);
        assert_eq!(score.asin, 0);
        assert_eq!(score.total(), 40);
    }

    #[test]
    fn test_track_count_uses_local_disc() {
        let target = MatchTarget {
            disc: Some(2),
            total_tracks: Some(2),
            ..Default::default()
        };
        let candidate = Candidate {
            discs: vec![disc(1, &OPERA), disc(2, &["A", "B"])],
            ..Default::default()
        };
        let score = score_candidate(&target, &candidate, None, &Options::default());
        assert_eq!(score.track_count, TRACK_COUNT_POINTS);

        let target = MatchTarget {
            total_tracks: Some(2),
            ..Default::default()
        };
        let score = score_candidate(&target, &candidate, None, &Options::default());
        assert_eq!(score.track_count, 0);
    }

    #[test]
    fn test_no_match_when_all_zero() {
        let candidates = vec![unrelated("Greatest Hits"), unrelated("Made in Heaven")];
        let target = MatchTarget {
            album: Some("Jazz".into()),
            title: Some("Mustapha".into()),
            ..Default::default()
        };

        let result = select_best(&target, &candidates, &Options::default());
        assert_eq!(
            result.unwrap_err(),
            NoMatch {
                candidates: 2,
                best_score: Some(0),
                threshold: 10,
            }
        );
    }

    #[test]
    fn test_candidates_without_tracks_counted_not_scored() {
        let bare = Candidate {
            asin: Some("B000002UJQ".into()),
            album: Some("A Night at the Opera".into()),
            ..Default::default()
        };
        let candidates = vec![bare.clone(), opera(), bare];

        let best = select_best(&queen_target(), &candidates, &Options::default()).unwrap();
        assert!(std::ptr::eq(best.candidate, &candidates[1]));
        assert_eq!(best.candidates, 3);

        let only_bare = vec![Candidate::default(), Candidate::default()];
        let result = select_best(&queen_target(), &only_bare, &Options::default());
        assert_eq!(result.unwrap_err().best_score, None);
        assert_eq!(result.unwrap_err().candidates, 2);
    }

    #[test]
    fn test_ties_keep_earlier_candidate() {
        let candidates = vec![opera(), opera()];
        let best = select_best(&queen_target(), &candidates, &Options::default()).unwrap();
        assert!(std::ptr::eq(best.candidate, &candidates[0]));
    }

    #[test]
    fn test_baseline_is_first_track_bearing_candidate() {
        let target = MatchTarget {
            album: Some("Queen".into()),
            ..Default::default()
        };
        let mut first = unrelated("Queen");
        first.year = Some(1990);
        let mut reissue = unrelated("Queen");
        reissue.year = Some(2001);
        let mut original = unrelated("Queen");
        original.year = Some(1973);
        let candidates = vec![Candidate::default(), first, reissue, original];

        let best = select_best(&target, &candidates, &Options::default()).unwrap();

        // Baseline stays at 1990; only the 1973 release earns the extra point
        assert!(std::ptr::eq(best.candidate, &candidates[3]));
        assert_eq!(best.score, ALBUM_EXACT_POINTS + EARLIER_YEAR_POINTS);
    }

    #[test]
    fn test_never_accepts_below_threshold() {
        let candidates = vec![unrelated("Wall"), opera(), unrelated("The Wall")];
        let target = MatchTarget {
            album: Some("The Wall".into()),
            ..Default::default()
        };

        for threshold in [0, 10, 20, 32, 33, 200] {
            let options = Options {
                min_album_points: threshold,
                ..Default::default()
            };
            match select_best(&target, &candidates, &options) {
                Ok(best) => assert!(best.score >= threshold),
                Err(no_match) => assert!(no_match.best_score.unwrap_or(0) < threshold),
            }
        }
    }

    #[test]
    fn test_selection_is_deterministic() {
        let candidates = vec![unrelated("Opera"), opera(), opera(), unrelated("Night at the Opera")];
        let first = select_best(&queen_target(), &candidates, &Options::default()).unwrap();
        for _ in 0..5 {
            let again = select_best(&queen_target(), &candidates, &Options::default()).unwrap();
            assert!(std::ptr::eq(first.candidate, again.candidate));
            assert_eq!(first.score, again.score);
        }
    }

    #[test]
    fn test_target_from_record() {
        let tags = crate::models::TrackTags {
            album: Some("  Jazz ".into()),
            title: Some("".into()),
            track: Some(3),
            ..Default::default()
        };
        let target = MatchTarget::from_record(&tags);
        assert_eq!(target.album.as_deref(), Some("Jazz"));
        assert_eq!(target.title, None);
        assert_eq!(target.track, Some(3));
    }
}
