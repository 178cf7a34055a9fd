//! Dispatch metadata carried by handler descriptors.

use std::collections::BTreeMap;

/// Ranking given to handlers registered directly (not declaratively).
pub const DEFAULT_RANKING: i32 = 0;

/// Metadata describing one registered servlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServletInfo {
    /// Unique id of the registration within its context.
    pub service_id: i64,
    /// Human-readable servlet name.
    pub name: String,
    /// Path patterns the servlet answers.
    pub patterns: Vec<String>,
    /// Higher ranking wins when patterns collide.
    pub ranking: i32,
    pub init_params: BTreeMap<String, String>,
}

impl ServletInfo {
    /// Metadata for a servlet served under a single alias.
    pub fn new(service_id: i64, name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            service_id,
            name: name.into(),
            patterns: vec![alias.into()],
            ranking: DEFAULT_RANKING,
            init_params: BTreeMap::new(),
        }
    }

    pub fn with_ranking(mut self, ranking: i32) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn with_init_params(mut self, init_params: BTreeMap<String, String>) -> Self {
        self.init_params = init_params;
        self
    }
}

/// Metadata describing one registered filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInfo {
    pub service_id: i64,
    pub name: String,
    pub patterns: Vec<String>,
    pub ranking: i32,
    pub init_params: BTreeMap<String, String>,
}

impl FilterInfo {
    pub fn new(service_id: i64, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            service_id,
            name: name.into(),
            patterns: vec![pattern.into()],
            ranking: DEFAULT_RANKING,
            init_params: BTreeMap::new(),
        }
    }

    pub fn with_ranking(mut self, ranking: i32) -> Self {
        self.ranking = ranking;
        self
    }
}
