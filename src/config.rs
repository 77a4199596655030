use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Graph construction settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Only keep similarity edges with weight >= threshold (0.0-1.0)
    pub min_similarity: f64,
}

impl GraphConfig {
    pub fn new(min_similarity: f64) -> Self {
        Self { min_similarity }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(RecommendError::InvalidParameter(
                "min_similarity must be in [0,1]".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.6,
        }
    }
}

/// Power iteration settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    /// Probability of following an edge instead of restarting
    pub damping: f64,
    /// Iteration cap before giving up
    pub max_iterations: usize,
    /// L1 residual below which the iteration has converged
    pub tolerance: f64,
}

impl PageRankConfig {
    pub fn new(damping: f64, max_iterations: usize, tolerance: f64) -> Self {
        Self {
            damping,
            max_iterations,
            tolerance,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.damping.is_finite() || self.damping <= 0.0 || self.damping >= 1.0 {
            return Err(RecommendError::InvalidParameter(
                "damping must be in (0,1)".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(RecommendError::InvalidParameter(
                "max_iterations must be > 0".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(RecommendError::InvalidParameter(
                "tolerance must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Weights used when building the restart distribution.
///
/// With `discover_rate = r` and `n` nodes, every node starts at
/// `r * background_scale / n`, members of a seed's community are raised to
/// `community_weight / n` and each seed gets
/// `seed_weight * |community(seed)| / n` before the vector is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartWeights {
    pub background_scale: f64,
    pub community_weight: f64,
    pub seed_weight: f64,
}

impl RestartWeights {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("background_scale", self.background_scale),
            ("community_weight", self.community_weight),
            ("seed_weight", self.seed_weight),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(RecommendError::InvalidParameter(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if self.seed_weight == 0.0 {
            return Err(RecommendError::InvalidParameter(
                "seed_weight must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RestartWeights {
    fn default() -> Self {
        Self {
            background_scale: 0.01,
            community_weight: 1.0,
            seed_weight: 1.0,
        }
    }
}

/// Top-level recommender configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    pub graph: GraphConfig,
    pub pagerank: PageRankConfig,
    pub restart: RestartWeights,
    /// Node count at which the matrix-vector product switches to rayon
    pub parallel_threshold: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            graph: GraphConfig::default(),
            pagerank: PageRankConfig::default(),
            restart: RestartWeights::default(),
            parallel_threshold: 4096,
        }
    }
}

impl RecommenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RecommendError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path)?;
        Self::from_json_str(&contents)
    }

    /// Apply `SEEDMIX_*` environment variables on top of the loaded values.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SEEDMIX_DAMPING") {
            self.pagerank.damping = parse_override("SEEDMIX_DAMPING", &value)?;
        }
        if let Some(value) = lookup("SEEDMIX_MAX_ITERATIONS") {
            self.pagerank.max_iterations = parse_override("SEEDMIX_MAX_ITERATIONS", &value)?;
        }
        if let Some(value) = lookup("SEEDMIX_TOLERANCE") {
            self.pagerank.tolerance = parse_override("SEEDMIX_TOLERANCE", &value)?;
        }
        if let Some(value) = lookup("SEEDMIX_BACKGROUND_SCALE") {
            self.restart.background_scale = parse_override("SEEDMIX_BACKGROUND_SCALE", &value)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.graph.validate()?;
        self.pagerank.validate()?;
        self.restart.validate()
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RecommendError::Config(format!("{key}: cannot parse '{value}'")))
}
