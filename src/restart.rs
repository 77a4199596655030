//! Community-biased restart distribution.
//!
//! The restart vector decides where teleporting walkers land. Seeds and their
//! communities are boosted above a small uniform background whose height is
//! driven by the request's discover rate, so low discover rates keep the
//! playlist inside the seeds' clusters and high rates let it wander.

use crate::community::CommunityPartition;
use crate::config::RestartWeights;
use crate::error::{RecommendError, Result};
use crate::graph::NodeId;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Dense, non-negative distribution over nodes summing to 1
#[derive(Debug, Clone, PartialEq)]
pub struct RestartVector {
    weights: Vec<f64>,
}

impl RestartVector {
    /// Normalize non-negative weights into a distribution
    pub fn from_weights(mut weights: Vec<f64>) -> Result<Self> {
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(RecommendError::InvalidParameter(
                "restart weights must be finite and non-negative".to_string(),
            ));
        }
        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            return Err(RecommendError::InvalidParameter(
                "restart weights must have a positive sum".to_string(),
            ));
        }
        for w in &mut weights {
            *w /= sum;
        }
        Ok(Self { weights })
    }

    pub fn uniform(num_nodes: usize) -> Result<Self> {
        Self::from_weights(vec![1.0; num_nodes])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, node: NodeId) -> f64 {
        self.weights.get(node as usize).copied().unwrap_or(0.0)
    }
}

/// Build the restart vector for resolved seeds.
///
/// With `n` nodes: every entry starts at `discover_rate * background_scale / n`;
/// each community holding a seed is raised (once, however many seeds share
/// it) to `community_weight / n` per member; each seed is set to
/// `seed_weight * |community(seed)| / n`. The result is normalized.
pub fn build_restart_vector(
    seeds: &[NodeId],
    discover_rate: f64,
    partition: &CommunityPartition,
    weights: &RestartWeights,
) -> Result<RestartVector> {
    if seeds.is_empty() {
        return Err(RecommendError::NoSeeds);
    }
    if !(0.0..=1.0).contains(&discover_rate) {
        return Err(RecommendError::InvalidParameter(format!(
            "discover rate {discover_rate} outside [0,1]"
        )));
    }

    let n = partition.node_count();
    let n_f64 = n as f64;
    let mut restart = vec![discover_rate * weights.background_scale / n_f64; n];

    let mut boosted = FxHashSet::default();
    let mut seed_mass = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        let community = partition.community_of(seed).ok_or_else(|| {
            RecommendError::InvalidParameter(format!("seed node {seed} outside 0..{n}"))
        })?;
        let members = partition
            .members(community)
            .filter(|members| !members.is_empty())
            .ok_or(RecommendError::EmptyCommunity { community })?;

        if boosted.insert(community) {
            for &member in members {
                restart[member as usize] = weights.community_weight / n_f64;
            }
        }
        seed_mass.push((seed, weights.seed_weight * members.len() as f64 / n_f64));
    }

    for (seed, mass) in seed_mass {
        restart[seed as usize] = mass;
    }

    debug!(
        seeds = seeds.len(),
        communities = boosted.len(),
        discover_rate,
        "restart vector built"
    );
    RestartVector::from_weights(restart)
}
