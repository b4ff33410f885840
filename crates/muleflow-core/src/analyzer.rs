//! Analyzer metadata.
//!
//! Every pipeline component carries metadata describing its identity and
//! the stage it runs in, used for catalog listing and logging context.

use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata describing a pipeline analyzer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyzerMetadata {
    /// Unique analyzer identifier (e.g., "detect/cycle").
    pub id: String,

    /// Pipeline stage this analyzer runs in.
    pub stage: Stage,

    /// Human-readable description.
    pub description: String,

    /// Version of the analyzer implementation.
    pub version: u32,
}

impl AnalyzerMetadata {
    /// Create new analyzer metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, stage: Stage) -> Self {
        Self {
            id: id.into(),
            stage,
            description: String::new(),
            version: 1,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

impl Default for AnalyzerMetadata {
    fn default() -> Self {
        Self::new("unnamed", Stage::default())
    }
}

impl fmt::Display for AnalyzerMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.id, self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let meta = AnalyzerMetadata::new("detect/cycle", Stage::PatternDetection)
            .with_description("Directed cycle detection")
            .with_version(2);

        assert_eq!(meta.id, "detect/cycle");
        assert_eq!(meta.stage, Stage::PatternDetection);
        assert_eq!(meta.description, "Directed cycle detection");
        assert_eq!(meta.version, 2);
    }

    #[test]
    fn test_metadata_display() {
        let meta = AnalyzerMetadata::new("graph/builder", Stage::GraphConstruction);
        assert_eq!(meta.to_string(), "graph/builder [GraphConstruction]");
    }
}
