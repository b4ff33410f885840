//! # Muleflow
//!
//! Deterministic money-mule ring detection over directed, time-stamped
//! transaction logs.
//!
//! The engine ingests a parsed transaction sequence and emits a
//! reproducible report of suspected muling structures: rings of
//! colluding accounts plus per-account suspicion scores with explanatory
//! evidence tags. Its consumer is a fraud analyst who needs explainable
//! flags rather than black-box scores.
//!
//! ## Pipeline
//!
//! Strictly staged; each stage is a pure function of its input:
//!
//! 1. **Graph construction** - node set, sorted adjacency, time-ascending
//!    transaction lists, degree totals
//! 2. **Detectors** - short directed cycles (3-5), smurfing fan-in/fan-out
//!    hubs inside a 72-hour window, layered shell chains (3-6 hops)
//! 3. **Ring consolidation** - near-duplicate merging by member overlap
//! 4. **Account scoring** - role-aware scores from each account's best ring
//! 5. **Output assembly** - canonical ring ids and the report document
//!
//! ## Quick Start
//!
//! ```rust
//! use muleflow::prelude::*;
//!
//! let transactions = vec![
//!     Transaction::new("A", "B", 50.0, 1_700_000_000),
//!     Transaction::new("B", "C", 49.0, 1_700_000_600),
//!     Transaction::new("C", "A", 48.0, 1_700_001_200),
//! ];
//!
//! let report = MuleFlowPipeline::new().run(transactions);
//! assert_eq!(report.summary.fraud_rings_detected, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export the pipeline crates
pub use muleflow_core as core;
pub use muleflow_detect as detect;
pub use muleflow_graph as graph;
pub use muleflow_report as report;

/// Prelude for convenient imports.
pub mod prelude {
    pub use muleflow_core::prelude::*;
    pub use muleflow_detect::prelude::*;
    pub use muleflow_graph::prelude::*;
    pub use muleflow_report::prelude::*;
}

/// Pipeline catalog: stages and their analyzers.
pub mod catalog {
    use muleflow_core::{Analyzer, Stage};

    /// Summary of one pipeline stage.
    #[derive(Debug)]
    pub struct StageInfo {
        /// The stage.
        pub stage: Stage,
        /// Short description.
        pub description: &'static str,
        /// Number of analyzers running in this stage.
        pub analyzer_count: usize,
    }

    /// Instantiate every pipeline analyzer.
    #[must_use]
    pub fn analyzers() -> Vec<Box<dyn Analyzer>> {
        vec![
            Box::new(muleflow_graph::builder::GraphBuilder::new()),
            Box::new(muleflow_detect::CycleDetector::new()),
            Box::new(muleflow_detect::SmurfingDetector::new()),
            Box::new(muleflow_detect::ShellChainDetector::new()),
            Box::new(muleflow_detect::RingMerger::new()),
            Box::new(muleflow_report::AccountScorer::new()),
            Box::new(muleflow_report::OutputAssembler::new()),
        ]
    }

    /// Total number of pipeline analyzers.
    #[must_use]
    pub fn total_analyzer_count() -> usize {
        analyzers().len()
    }

    /// All stages in execution order with their analyzer counts.
    #[must_use]
    pub fn stages() -> Vec<StageInfo> {
        let analyzers = analyzers();
        Stage::ALL
            .iter()
            .map(|&stage| StageInfo {
                stage,
                description: describe(stage),
                analyzer_count: analyzers.iter().filter(|a| a.stage() == stage).count(),
            })
            .collect()
    }

    fn describe(stage: Stage) -> &'static str {
        match stage {
            Stage::GraphConstruction => "Directed transaction graph construction",
            Stage::PatternDetection => "Cycle, smurfing, and shell-chain detectors",
            Stage::Consolidation => "Near-duplicate ring merging by member overlap",
            Stage::Scoring => "Role-aware per-account suspicion scores",
            Stage::Assembly => "Canonical ring ids and report document",
            _ => "",
        }
    }
}
