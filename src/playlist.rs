//! Playlist selection from ranked scores.

use crate::catalog::TrackCatalog;
use crate::error::{RecommendError, Result};
use crate::graph::SongIndex;
use crate::pagerank::ScoreVector;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Walk nodes in ranked order and emit up to `length` distinct display names.
///
/// Ranking is score descending with ties broken by ascending node id.
/// Zero-score nodes are never chosen, songs without a display name are
/// skipped and a name already emitted is not repeated. Running out of
/// candidates early yields a shorter playlist.
pub fn select_playlist(
    scores: &ScoreVector,
    index: &SongIndex,
    catalog: &TrackCatalog,
    length: usize,
) -> Result<Vec<String>> {
    if length == 0 {
        return Err(RecommendError::InvalidParameter(
            "playlist length must be >= 1".to_string(),
        ));
    }

    let mut playlist = Vec::with_capacity(length);
    let mut emitted = FxHashSet::default();

    for node in scores.ranked() {
        if playlist.len() == length || scores.score(node) <= 0.0 {
            break;
        }
        let Some(display_name) = index.id_of(node).and_then(|id| catalog.display_name(id)) else {
            debug!(node, "ranked song has no display name");
            continue;
        };
        if emitted.insert(display_name) {
            playlist.push(display_name.to_string());
        }
    }

    Ok(playlist)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[f64]) -> ScoreVector {
        ScoreVector {
            scores: values.to_vec(),
            iterations: 1,
            residual: 0.0,
        }
    }

    fn fixture() -> (SongIndex, TrackCatalog) {
        let index = SongIndex::from_ids(["s0", "s1", "s2", "s3", "s4"]).unwrap();
        let catalog = TrackCatalog::from_entries([
            ("s0", "A - One"),
            ("s1", "B - Two"),
            ("s2", "A - One"),
            ("s3", "C - Three"),
        ]);
        (index, catalog)
    }

    #[test]
    fn test_ranked_and_deduplicated() {
        let (index, catalog) = fixture();
        let playlist =
            select_playlist(&scores(&[0.3, 0.1, 0.35, 0.15, 0.1]), &index, &catalog, 3).unwrap();
        assert_eq!(playlist, vec!["A - One", "C - Three", "B - Two"]);
    }

    #[test]
    fn test_tie_break_by_index() {
        let (index, catalog) = fixture();
        let playlist =
            select_playlist(&scores(&[0.1, 0.2, 0.1, 0.2, 0.4]), &index, &catalog, 2).unwrap();
        // s4 has no name; s1 and s3 tie, s1 wins on index
        assert_eq!(playlist, vec!["B - Two", "C - Three"]);
    }

    #[test]
    fn test_shorter_than_requested() {
        let (index, catalog) = fixture();
        let playlist =
            select_playlist(&scores(&[0.5, 0.5, 0.0, 0.0, 0.0]), &index, &catalog, 4).unwrap();
        assert_eq!(playlist, vec!["A - One", "B - Two"]);
    }

    #[test]
    fn test_zero_length_rejected() {
        let (index, catalog) = fixture();
        assert!(select_playlist(&scores(&[1.0, 0.0, 0.0, 0.0, 0.0]), &index, &catalog, 0).is_err());
    }
}
