//! Engine configuration: the heuristic thresholds of the pipeline as named,
//! overridable values.
//!
//! The numeric defaults are tuning constants with no derivation beyond
//! observed behavior; they are configuration, not invariants.

use serde::{Deserialize, Serialize};

/// Thresholds and limits for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Domain-fit score below which an entity counts as a misfit
    pub fit_threshold: f64,
    /// Max closure/scope delta for two misfits to share a cluster
    pub cluster_band: f64,
    /// Minimum misfit cluster size to report a domain-misfit gap
    pub min_cluster_size: usize,
    /// Occurrences of an unknown relation kind before it becomes a gap
    pub relation_min_occurrences: usize,
    /// Occurrences of an unknown capability name before it becomes a gap
    pub capability_min_occurrences: usize,
    /// Closure/scope level above which both-high counts as tension
    pub tension_threshold: f64,
    /// Cells per axis of the (closure, scope) grid
    pub grid_resolution: usize,
    /// Minimum members for a grid bucket to be an anomaly
    pub grid_min_bucket: usize,
    /// A bucket must span more than this many domains to be cross-cutting
    pub grid_min_domains: usize,
    /// Grid cluster size at which a coherent cluster proposes a new domain
    /// instead of manual review
    pub grid_generate_size: usize,
    /// Dice bigram similarity above which a name draws a minimality warning
    pub similarity_threshold: f64,
    /// Maximum pending review items before the capacity policy expires the
    /// oldest low-priority ones
    pub max_pending: usize,
    /// Days a review item stays pending before the sweep expires it
    pub review_ttl_days: i64,
    /// Whether the integrator takes a backup before modifying a target
    pub backups_enabled: bool,
    /// Seed for the confidence jitter strategy
    pub jitter_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fit_threshold: 0.6,
            cluster_band: 0.15,
            min_cluster_size: 3,
            relation_min_occurrences: 3,
            capability_min_occurrences: 3,
            tension_threshold: 0.7,
            grid_resolution: 5,
            grid_min_bucket: 3,
            grid_min_domains: 2,
            grid_generate_size: 5,
            similarity_threshold: 0.7,
            max_pending: 100,
            review_ttl_days: 14,
            backups_enabled: true,
            jitter_seed: 0,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fit_threshold(mut self, value: f64) -> Self {
        self.fit_threshold = value;
        self
    }

    pub fn with_tension_threshold(mut self, value: f64) -> Self {
        self.tension_threshold = value;
        self
    }

    pub fn with_min_cluster_size(mut self, value: usize) -> Self {
        self.min_cluster_size = value;
        self
    }

    pub fn with_relation_min_occurrences(mut self, value: usize) -> Self {
        self.relation_min_occurrences = value;
        self
    }

    pub fn with_similarity_threshold(mut self, value: f64) -> Self {
        self.similarity_threshold = value;
        self
    }

    pub fn with_max_pending(mut self, value: usize) -> Self {
        self.max_pending = value;
        self
    }

    pub fn with_review_ttl_days(mut self, value: i64) -> Self {
        self.review_ttl_days = value;
        self
    }

    pub fn with_backups_enabled(mut self, value: bool) -> Self {
        self.backups_enabled = value;
        self
    }

    pub fn with_jitter_seed(mut self, value: u64) -> Self {
        self.jitter_seed = value;
        self
    }
}
