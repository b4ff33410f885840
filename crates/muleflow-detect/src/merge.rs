//! Ring consolidation by member overlap.
//!
//! Near-duplicate rings of the same pattern collapse into one
//! representative when their member sets overlap at Jaccard similarity
//! 0.6 or above. Rings of different patterns never merge here; the
//! output assembler separately dedups by strict (pattern, member-set).

use crate::types::RingCandidate;
use muleflow_core::{analyzer::AnalyzerMetadata, stage::Stage, traits::Analyzer};
use std::collections::BTreeSet;

/// Jaccard similarity threshold for merging.
pub const MERGE_JACCARD: f64 = 0.6;

// ============================================================================
// Ring Merger
// ============================================================================

/// Same-pattern ring consolidation.
#[derive(Debug, Clone)]
pub struct RingMerger {
    metadata: AnalyzerMetadata,
}

impl Default for RingMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl RingMerger {
    /// Create a new ring merger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new("consolidate/ring-merger", Stage::Consolidation)
                .with_description("Jaccard consolidation of near-duplicate rings"),
        }
    }

    /// Merge near-duplicate rings at the pipeline threshold.
    #[must_use]
    pub fn merge(rings: &[RingCandidate]) -> Vec<RingCandidate> {
        Self::merge_with_threshold(rings, MERGE_JACCARD)
    }

    /// Merge near-duplicate rings at an explicit Jaccard threshold.
    ///
    /// Rings are processed in input order. Each unconsumed ring anchors
    /// an equivalence class; later rings of the same pattern join the
    /// class when their member overlap reaches the threshold, and the
    /// representative takes the risk and member order of the class's
    /// highest-risk ring.
    #[must_use]
    pub fn merge_with_threshold(rings: &[RingCandidate], threshold: f64) -> Vec<RingCandidate> {
        let mut consumed = vec![false; rings.len()];
        let mut merged = Vec::new();

        for i in 0..rings.len() {
            if consumed[i] {
                continue;
            }
            consumed[i] = true;

            let mut representative = rings[i].clone();
            let anchor_set = rings[i].member_set();

            for j in (i + 1)..rings.len() {
                if consumed[j] || rings[j].pattern != rings[i].pattern {
                    continue;
                }
                if Self::jaccard(&anchor_set, &rings[j].member_set()) >= threshold {
                    consumed[j] = true;
                    if rings[j].risk_score > representative.risk_score {
                        representative.risk_score = rings[j].risk_score;
                        representative.members = rings[j].members.clone();
                    }
                }
            }

            merged.push(representative);
        }

        tracing::debug!(
            input = rings.len(),
            output = merged.len(),
            "ring consolidation complete"
        );
        merged
    }

    /// Jaccard similarity of two member sets.
    fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
        let union = a.union(b).count();
        if union == 0 {
            return 0.0;
        }
        let intersection = a.intersection(b).count();
        intersection as f64 / union as f64
    }
}

impl Analyzer for RingMerger {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }
}
