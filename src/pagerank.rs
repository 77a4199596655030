//! Personalized PageRank by power iteration
//!
//! ```text
//! x_0     = uniform
//! x_{t+1} = d * (x_t M + sink_mass(x_t) * v) + (1 - d) * v
//! ```
//!
//! Mass sitting on sink rows is handed back through the restart vector `v`,
//! so every iterate stays a probability distribution. The run stops once the
//! L1 change drops below the tolerance; exhausting the iteration cap is a
//! `NonConvergence` error rather than a partial result.

use crate::config::PageRankConfig;
use crate::error::{RecommendError, Result};
use crate::graph::NodeId;
use crate::matrix::TransitionMatrix;
use crate::restart::RestartVector;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

/// Converged stationary scores
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    /// Score per node, indexed by node id
    pub scores: Vec<f64>,
    /// Number of update steps performed
    pub iterations: usize,
    /// L1 change of the final step
    pub residual: f64,
}

impl ScoreVector {
    pub fn score(&self, node: NodeId) -> f64 {
        self.scores.get(node as usize).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Node ids by score descending, ties broken by ascending id
    pub fn ranked(&self) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = (0..self.scores.len() as NodeId).collect();
        order.sort_by(|&a, &b| {
            self.scores[b as usize]
                .total_cmp(&self.scores[a as usize])
                .then(a.cmp(&b))
        });
        order
    }

    /// Top `n` `(node, score)` pairs in ranked order
    pub fn top_n(&self, n: usize) -> Vec<(NodeId, f64)> {
        self.ranked()
            .into_iter()
            .take(n)
            .map(|node| (node, self.scores[node as usize]))
            .collect()
    }
}

/// Personalized PageRank solver
#[derive(Debug, Clone)]
pub struct PersonalizedPageRank {
    config: PageRankConfig,
    parallel_threshold: usize,
}

impl Default for PersonalizedPageRank {
    fn default() -> Self {
        Self::new(PageRankConfig::default())
    }
}

impl PersonalizedPageRank {
    pub fn new(config: PageRankConfig) -> Self {
        Self {
            config,
            parallel_threshold: usize::MAX,
        }
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.config.damping = damping;
        self
    }

    /// Set the maximum iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Use rayon for the matrix product once the graph has this many nodes
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    pub fn config(&self) -> &PageRankConfig {
        &self.config
    }

    pub fn run(&self, matrix: &TransitionMatrix, restart: &RestartVector) -> Result<ScoreVector> {
        self.run_with_observer(matrix, restart, |_, _| {})
    }

    /// Like `run`, but hands every iterate `x_t` (t >= 1) to `on_iteration`,
    /// including those of a run that ends in `NonConvergence`.
    pub fn run_with_observer<F>(
        &self,
        matrix: &TransitionMatrix,
        restart: &RestartVector,
        mut on_iteration: F,
    ) -> Result<ScoreVector>
    where
        F: FnMut(usize, &[f64]),
    {
        self.config.validate()?;
        let n = matrix.num_nodes();
        if n == 0 {
            return Err(RecommendError::InvalidParameter(
                "cannot rank an empty graph".to_string(),
            ));
        }
        if restart.len() != n {
            return Err(RecommendError::InvalidParameter(format!(
                "restart length must equal node count (len={} node_count={})",
                restart.len(),
                n
            )));
        }

        let damping = self.config.damping;
        let parallel = n >= self.parallel_threshold;
        let v = restart.as_slice();

        let mut scores = vec![1.0 / n as f64; n];
        let mut new_scores = vec![0.0; n];
        let mut residual = f64::INFINITY;

        for iteration in 1..=self.config.max_iterations {
            let sink_mass: f64 = matrix.sinks().iter().map(|&s| scores[s as usize]).sum();

            matrix.left_multiply(&scores, &mut new_scores, parallel);
            let step = |(x, &restart_i): (&mut f64, &f64)| {
                *x = damping * (*x + sink_mass * restart_i) + (1.0 - damping) * restart_i;
            };
            if parallel {
                new_scores.par_iter_mut().zip(v.par_iter()).for_each(step);
            } else {
                new_scores.iter_mut().zip(v.iter()).for_each(step);
            }

            residual = scores
                .iter()
                .zip(new_scores.iter())
                .map(|(old, new)| (old - new).abs())
                .sum();
            std::mem::swap(&mut scores, &mut new_scores);
            trace!(iteration, residual, sink_mass, "power iteration step");
            on_iteration(iteration, &scores);

            if residual < self.config.tolerance {
                debug!(iterations = iteration, residual, "personalized pagerank converged");
                return Ok(ScoreVector {
                    scores,
                    iterations: iteration,
                    residual,
                });
            }
        }

        warn!(
            iterations = self.config.max_iterations,
            residual, "personalized pagerank did not converge"
        );
        Err(RecommendError::NonConvergence {
            iterations: self.config.max_iterations,
            residual,
        })
    }
}
