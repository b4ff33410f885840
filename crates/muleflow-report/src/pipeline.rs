//! Pipeline wiring.
//!
//! Strictly staged, single-threaded, synchronous: graph construction,
//! the three detectors, ring consolidation, account scoring, output
//! assembly. Each stage is a pure function of its input, so identical
//! input yields identical rings and accounts.

use crate::assemble::OutputAssembler;
use crate::document::AnalysisReport;
use crate::score::AccountScorer;
use muleflow_detect::merge::MERGE_JACCARD;
use muleflow_detect::{
    CycleDetector, EvidenceMap, RingMerger, ShellChainDetector, SmurfingDetector,
};
use muleflow_graph::{builder::GraphBuilder, Transaction};
use std::time::Instant;

/// The batch detection pipeline.
///
/// Single-shot per input; construct once and feed it a parsed
/// transaction sequence.
#[derive(Debug, Clone)]
pub struct MuleFlowPipeline {
    merge_threshold: f64,
}

impl Default for MuleFlowPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MuleFlowPipeline {
    /// Create a pipeline with the standard wiring.
    #[must_use]
    pub fn new() -> Self {
        Self {
            merge_threshold: MERGE_JACCARD,
        }
    }

    /// Override the ring-merge Jaccard threshold.
    #[must_use]
    pub fn with_merge_threshold(mut self, threshold: f64) -> Self {
        self.merge_threshold = threshold;
        self
    }

    /// Run the full pipeline over a parsed transaction sequence.
    #[must_use]
    pub fn run(&self, transactions: Vec<Transaction>) -> AnalysisReport {
        let started = Instant::now();

        let graph = GraphBuilder::build(transactions);

        let cycle = CycleDetector::detect(&graph);
        let smurfing = SmurfingDetector::detect(&graph);
        let shell = ShellChainDetector::detect(&graph);

        let mut evidence = EvidenceMap::new();
        let mut candidates = Vec::new();
        for detection in [cycle, smurfing, shell] {
            candidates.extend(detection.candidates);
            evidence.merge(detection.evidence);
        }

        let rings = RingMerger::merge_with_threshold(&candidates, self.merge_threshold);
        let states = AccountScorer::score(&graph, &rings, &evidence);

        OutputAssembler::assemble(&graph, &rings, &states, started.elapsed().as_secs_f64())
    }
}
