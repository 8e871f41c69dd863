//! Linkage configuration: per-pairing similarity thresholds.
//!
//! Loaded once per batch (optionally from a TOML file) and passed
//! explicitly into each linking call — no process-wide state, so
//! per-document runs stay deterministic and independently testable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, BatchResult};
use crate::link::fuzzy::{DEFAULT_THRESHOLD, STRICT_THRESHOLD};

/// Similarity thresholds for the five fuzzy pairings, in [0,100].
///
/// A candidate must score *strictly above* its pairing's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// claim ↔ attribution (the mandatory pairing).
    pub claim_attribution: f64,
    /// attribution ↔ predicate (role attachment).
    pub attribution_predicate: f64,
    /// attribution ↔ entity (source entity resolution).
    pub attribution_entity: f64,
    /// predicate ↔ opinion (opinion attachment).
    pub predicate_opinion: f64,
    /// claim ↔ opinion (argument sentiment).
    pub claim_opinion: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            claim_attribution: DEFAULT_THRESHOLD,
            attribution_predicate: STRICT_THRESHOLD,
            attribution_entity: STRICT_THRESHOLD,
            predicate_opinion: DEFAULT_THRESHOLD,
            claim_opinion: DEFAULT_THRESHOLD,
        }
    }
}

impl LinkConfig {
    /// Load thresholds from a TOML file; keys not present keep defaults.
    pub fn from_path(path: &Path) -> BatchResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| BatchError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| BatchError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
