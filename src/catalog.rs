//! Track metadata and seed resolution
//!
//! The catalog maps external song ids to display names and, in reverse,
//! normalized display names to every id carrying that name. Several songs can
//! share one display name (re-releases, compilations), so a seed name may
//! resolve to more than one node.

use crate::error::RecommendError;
use crate::graph::{NodeId, SongIndex};
use crate::string_normalization::normalize_track_name;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

type NameLookup = FxHashMap<String, Vec<String>>;
type DisplayNames = FxHashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    display_names: DisplayNames,
    name_lookup: NameLookup,
}

/// Outcome of resolving seed names against the catalog and song index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSeeds {
    /// Distinct seed nodes in request order
    pub nodes: Vec<NodeId>,
    /// Seed names that matched no indexed song
    pub unresolved: Vec<String>,
}

impl TrackCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut catalog = Self::new();
        for (song_id, display_name) in entries {
            catalog.insert(song_id, display_name);
        }
        catalog
    }

    /// Register a song; re-inserting an id replaces its display name
    pub fn insert(&mut self, song_id: impl Into<String>, display_name: impl Into<String>) {
        let song_id = song_id.into();
        let display_name = display_name.into();

        if let Some(previous) = self.display_names.get(&song_id) {
            let previous_key = normalize_track_name(previous);
            if let Some(ids) = self.name_lookup.get_mut(&previous_key) {
                ids.retain(|id| id != &song_id);
                if ids.is_empty() {
                    self.name_lookup.remove(&previous_key);
                }
            }
        }

        self.name_lookup
            .entry(normalize_track_name(&display_name))
            .or_default()
            .push(song_id.clone());
        self.display_names.insert(song_id, display_name);
    }

    pub fn display_name(&self, song_id: &str) -> Option<&str> {
        self.display_names.get(song_id).map(String::as_str)
    }

    /// All song ids whose display name normalizes like `name`, in insertion order
    pub fn song_ids(&self, name: &str) -> &[String] {
        self.name_lookup
            .get(&normalize_track_name(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.display_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display_names.is_empty()
    }

    /// Resolve seed display names to graph nodes.
    ///
    /// Every indexed song matching a seed name becomes a seed; names with no
    /// indexed match are reported back instead of failing the request.
    pub fn resolve_seeds<S: AsRef<str>>(&self, seeds: &[S], index: &SongIndex) -> ResolvedSeeds {
        let mut resolved = ResolvedSeeds::default();
        let mut seen = FxHashSet::default();

        for seed in seeds {
            let seed = seed.as_ref();
            let nodes: Vec<NodeId> = self
                .song_ids(seed)
                .iter()
                .filter_map(|song_id| index.node_of(song_id))
                .collect();

            if nodes.is_empty() {
                let error = RecommendError::UnresolvedSeed(seed.to_string());
                warn!(%error, "skipping seed");
                resolved.unresolved.push(seed.to_string());
                continue;
            }
            for node in nodes {
                if seen.insert(node) {
                    resolved.nodes.push(node);
                }
            }
        }

        resolved
    }
}
