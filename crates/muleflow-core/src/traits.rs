//! Core analyzer trait.
//!
//! Every pipeline component implements `Analyzer`, giving the catalog and
//! the logging layer a uniform view of the pipeline. Execution entry
//! points stay on the concrete types: the pipeline is single-threaded and
//! synchronous, so there is no dispatch layer between stages.

use crate::analyzer::AnalyzerMetadata;
use crate::error::Result;
use crate::stage::Stage;
use std::fmt::Debug;

/// Base trait for all pipeline analyzers.
pub trait Analyzer: Send + Sync + Debug {
    /// Returns the analyzer metadata.
    fn metadata(&self) -> &AnalyzerMetadata;

    /// Validate analyzer configuration.
    ///
    /// Called before a pipeline run to ensure configuration is valid.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Returns the analyzer ID.
    fn id(&self) -> &str {
        &self.metadata().id
    }

    /// Returns the stage this analyzer runs in.
    fn stage(&self) -> Stage {
        self.metadata().stage
    }
}
