//! Short directed cycle detection.
//!
//! Enumerates directed simple cycles of length 3-5 and emits each exactly
//! once via canonical-start pruning: a DFS from each start node only
//! visits nodes ranking at or above the start, so every cycle is
//! discovered through its lexicographically smallest member.

use crate::evidence::{self, EvidenceMap};
use crate::types::{Detection, PatternType, RingCandidate};
use muleflow_core::{analyzer::AnalyzerMetadata, round_dp, stage::Stage, traits::Analyzer};
use muleflow_graph::TransactionGraph;
use std::collections::{BTreeMap, BTreeSet};

/// Minimum cycle length.
pub const MIN_CYCLE_LEN: usize = 3;
/// Maximum cycle length.
pub const MAX_CYCLE_LEN: usize = 5;

// ============================================================================
// Cycle Detector
// ============================================================================

/// Directed cycle detector.
///
/// Cycle rings carry the canonical rotation of their members; the output
/// assembler re-sorts them ascending because cycles have no meaningful
/// head.
#[derive(Debug, Clone)]
pub struct CycleDetector {
    metadata: AnalyzerMetadata,
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleDetector {
    /// Create a new cycle detector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new("detect/cycle", Stage::PatternDetection)
                .with_description("Directed simple cycles of length 3-5"),
        }
    }

    /// Enumerate cycle rings and per-member evidence.
    #[must_use]
    pub fn detect(graph: &TransactionGraph) -> Detection {
        let nodes: Vec<&str> = graph.nodes().collect();
        let rank: BTreeMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(position, &node)| (node, position))
            .collect();

        let mut detection = Detection::default();
        let mut seen = BTreeSet::new();

        for &start in &nodes {
            let mut path = vec![start];
            let mut on_path: BTreeSet<&str> = BTreeSet::new();
            on_path.insert(start);
            Self::search(
                graph,
                &rank,
                start,
                &mut path,
                &mut on_path,
                &mut seen,
                &mut detection,
            );
        }

        tracing::debug!(cycles = detection.candidates.len(), "cycle detection complete");
        detection
    }

    fn search<'g>(
        graph: &'g TransactionGraph,
        rank: &BTreeMap<&'g str, usize>,
        start: &'g str,
        path: &mut Vec<&'g str>,
        on_path: &mut BTreeSet<&'g str>,
        seen: &mut BTreeSet<String>,
        out: &mut Detection,
    ) {
        let current = path[path.len() - 1];
        for next in graph.out_neighbors(current) {
            if next == start && path.len() >= MIN_CYCLE_LEN {
                Self::emit(graph, path, seen, out);
                continue;
            }
            if path.len() < MAX_CYCLE_LEN && !on_path.contains(next) && rank[next] > rank[start] {
                path.push(next);
                on_path.insert(next);
                Self::search(graph, rank, start, path, on_path, seen, out);
                path.pop();
                on_path.remove(next);
            }
        }
    }

    fn emit(graph: &TransactionGraph, path: &[&str], seen: &mut BTreeSet<String>, out: &mut Detection) {
        let canonical = Self::canonical_rotation(path);
        let signature = canonical.join("|");
        if !seen.insert(signature) {
            return;
        }

        let len = canonical.len();
        let span = Self::temporal_span(graph, &canonical);
        let base = match len {
            3 => 89.3,
            4 => 87.7,
            _ => 85.0,
        };
        let bonus = Self::tightness_bonus(span);
        let risk = round_dp((base + bonus).clamp(0.0, 100.0), 1);

        let members: Vec<String> = canonical.iter().map(ToString::to_string).collect();
        let length_tag = evidence::cycle_length_tag(len);
        for member in &members {
            out.evidence.tag(member, &length_tag);
            out.evidence.tag(member, evidence::CYCLE);
        }

        out.candidates.push(RingCandidate {
            pattern: PatternType::Cycle,
            members,
            risk_score: risk,
        });
    }

    /// Lexicographically smallest rotation of the cycle's node sequence.
    fn canonical_rotation<'a>(path: &[&'a str]) -> Vec<&'a str> {
        let n = path.len();
        let mut best: Vec<&str> = path.to_vec();
        for shift in 1..n {
            let rotated: Vec<&str> = (0..n).map(|i| path[(i + shift) % n]).collect();
            if rotated < best {
                best = rotated;
            }
        }
        best
    }

    /// Span between the earliest first-tx and the latest last-tx across
    /// the cycle's edges. An edge with no recorded transactions simply
    /// contributes nothing.
    fn temporal_span(graph: &TransactionGraph, cycle: &[&str]) -> i64 {
        let mut earliest: Option<i64> = None;
        let mut latest: Option<i64> = None;

        for i in 0..cycle.len() {
            let list = graph.edge_list(cycle[i], cycle[(i + 1) % cycle.len()]);
            if let (Some(&first), Some(&last)) = (list.first(), list.last()) {
                let first_ts = graph.tx(first).timestamp;
                let last_ts = graph.tx(last).timestamp;
                earliest = Some(earliest.map_or(first_ts, |t| t.min(first_ts)));
                latest = Some(latest.map_or(last_ts, |t| t.max(last_ts)));
            }
        }

        match (earliest, latest) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }

    fn tightness_bonus(span: i64) -> f64 {
        if span <= 3_600 {
            10.0
        } else if span <= 6 * 3_600 {
            6.0
        } else if span <= 24 * 3_600 {
            3.0
        } else {
            0.0
        }
    }
}

impl Analyzer for CycleDetector {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }
}
