//! Pipeline stage definitions for analyzer categorization.
//!
//! Analyzers are organized into stages matching the strictly staged
//! pipeline: each stage is a pure function of its input and runs to
//! completion before the next begins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage an analyzer belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Stage {
    /// Graph construction: node set, adjacency, transaction lists, degrees
    #[default]
    GraphConstruction,

    /// Pattern detection: cycles, smurfing hubs, layered shell chains
    PatternDetection,

    /// Ring consolidation: near-duplicate merging by member overlap
    Consolidation,

    /// Account scoring: role-aware suspicion scores from best rings
    Scoring,

    /// Output assembly: canonical ring ids, filtering, report document
    Assembly,
}

impl Stage {
    /// All pipeline stages, in execution order.
    pub const ALL: &'static [Stage] = &[
        Stage::GraphConstruction,
        Stage::PatternDetection,
        Stage::Consolidation,
        Stage::Scoring,
        Stage::Assembly,
    ];

    /// Returns the stage name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Stage::GraphConstruction => "GraphConstruction",
            Stage::PatternDetection => "PatternDetection",
            Stage::Consolidation => "Consolidation",
            Stage::Scoring => "Scoring",
            Stage::Assembly => "Assembly",
        }
    }

    /// Parse a stage from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GraphConstruction" => Some(Stage::GraphConstruction),
            "PatternDetection" => Some(Stage::PatternDetection),
            "Consolidation" => Some(Stage::Consolidation),
            "Scoring" => Some(Stage::Scoring),
            "Assembly" => Some(Stage::Assembly),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
