//! Layered shell chain detection.
//!
//! Detects multi-hop chains `v0 -> v1 -> ... -> vL` (3-6 edges) whose
//! intermediate accounts are low-activity pass-throughs and whose edges
//! propagate funds with consistent timing and amounts. Chains run from a
//! non-shell source through shell accounts only; a chain closes when it
//! reaches a non-shell successor, the cash-out terminal.

use crate::evidence;
use crate::stats::median;
use crate::types::{Detection, PatternType, RingCandidate};
use muleflow_core::{analyzer::AnalyzerMetadata, round_dp, stage::Stage, traits::Analyzer};
use muleflow_graph::TransactionGraph;
use std::collections::BTreeSet;

/// Minimum chain length in edges.
pub const MIN_CHAIN_EDGES: usize = 3;
/// Maximum chain length in edges.
pub const MAX_CHAIN_EDGES: usize = 6;
/// Cap on accepted chains per start node.
pub const MAX_PATHS_PER_START: usize = 25;
/// Total-degree bounds for the low-activity shell set.
pub const SHELL_DEGREE: std::ops::RangeInclusive<usize> = 2..=3;
/// Allowed backward reordering between consecutive hops.
pub const BACKWARD_SLACK_SECS: i64 = 3_600;
/// Maximum gap between consecutive hops.
pub const MAX_HOP_GAP_SECS: i64 = 24 * 3_600;
/// Largest allowed ratio between neighboring edge medians.
pub const AMOUNT_RATIO_LIMIT: f64 = 1.35;

// ============================================================================
// Shell Chain Detector
// ============================================================================

/// Layered shell chain detector.
///
/// Shell rings keep their members in chain order, source first and
/// cash-out terminal last.
#[derive(Debug, Clone)]
pub struct ShellChainDetector {
    metadata: AnalyzerMetadata,
}

impl Default for ShellChainDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellChainDetector {
    /// Create a new shell chain detector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new("detect/shell-chain", Stage::PatternDetection)
                .with_description("Layered chains through low-activity pass-through accounts"),
        }
    }

    /// Enumerate layered shell chains and per-member evidence.
    #[must_use]
    pub fn detect(graph: &TransactionGraph) -> Detection {
        let shells: BTreeSet<&str> = graph
            .nodes()
            .filter(|node| SHELL_DEGREE.contains(&graph.degree(node)))
            .collect();

        let mut detection = Detection::default();
        let mut seen = BTreeSet::new();

        // Shell accounts are walked through, never chain endpoints, so
        // suffixes of a chain are not re-discovered from its shells.
        for start in graph.nodes().filter(|node| !shells.contains(node)) {
            let mut path = vec![start];
            let mut visited: BTreeSet<&str> = BTreeSet::new();
            visited.insert(start);
            let mut accepted = 0;
            Self::search(
                graph,
                &shells,
                &mut path,
                &mut visited,
                &mut seen,
                &mut accepted,
                &mut detection,
            );
        }

        tracing::debug!(
            chains = detection.candidates.len(),
            shells = shells.len(),
            "shell chain detection complete"
        );
        detection
    }

    fn search<'g>(
        graph: &'g TransactionGraph,
        shells: &BTreeSet<&'g str>,
        path: &mut Vec<&'g str>,
        visited: &mut BTreeSet<&'g str>,
        seen: &mut BTreeSet<String>,
        accepted: &mut usize,
        out: &mut Detection,
    ) {
        if *accepted >= MAX_PATHS_PER_START {
            return;
        }
        let depth = path.len() - 1;
        if depth >= MAX_CHAIN_EDGES {
            return;
        }

        let current = path[path.len() - 1];
        let successors: Vec<&str> = graph.out_neighbors(current).collect();
        for next in successors {
            if visited.contains(next) {
                continue;
            }
            let new_depth = depth + 1;

            // Beyond the first hop only shell accounts are passed through;
            // a non-shell successor can only terminate a chain.
            if new_depth >= 2 && !shells.contains(next) {
                if new_depth >= MIN_CHAIN_EDGES {
                    path.push(next);
                    if Self::accept(graph, shells, path, seen, out) {
                        *accepted += 1;
                    }
                    path.pop();
                    if *accepted >= MAX_PATHS_PER_START {
                        return;
                    }
                }
                continue;
            }

            path.push(next);
            visited.insert(next);
            Self::search(graph, shells, path, visited, seen, accepted, out);
            path.pop();
            visited.remove(next);
        }
    }

    /// Validate a candidate chain and emit it if it holds up.
    fn accept(
        graph: &TransactionGraph,
        shells: &BTreeSet<&str>,
        path: &[&str],
        seen: &mut BTreeSet<String>,
        out: &mut Detection,
    ) -> bool {
        let edges = path.len() - 1;

        // Strict single-in/single-out topology on every intermediate.
        for &node in &path[1..edges] {
            if !shells.contains(node) || graph.in_degree(node) != 1 || graph.out_degree(node) != 1
            {
                return false;
            }
        }

        let mut edge_times = Vec::with_capacity(edges);
        let mut edge_medians = Vec::with_capacity(edges);
        let mut earliest: Option<i64> = None;
        let mut latest: Option<i64> = None;

        for i in 0..edges {
            let list = graph.edge_list(path[i], path[i + 1]);
            let (Some(&first), Some(&last)) = (list.first(), list.last()) else {
                return false;
            };
            let first_ts = graph.tx(first).timestamp;
            let last_ts = graph.tx(last).timestamp;
            edge_times.push(first_ts);
            earliest = Some(earliest.map_or(first_ts, |t| t.min(first_ts)));
            latest = Some(latest.map_or(last_ts, |t| t.max(last_ts)));

            let amounts: Vec<f64> = list.iter().map(|&index| graph.tx(index).amount).collect();
            edge_medians.push(median(&amounts));
        }

        for i in 1..edges {
            // Minor reordering within one hour is tolerated.
            if edge_times[i] + BACKWARD_SLACK_SECS < edge_times[i - 1] {
                return false;
            }
            if (edge_times[i] - edge_times[i - 1]).abs() > MAX_HOP_GAP_SECS {
                return false;
            }
        }

        for i in 1..edges {
            let (previous, current) = (edge_medians[i - 1], edge_medians[i]);
            if previous > 0.0 && current > 0.0 {
                let ratio = if previous > current {
                    previous / current
                } else {
                    current / previous
                };
                if ratio > AMOUNT_RATIO_LIMIT {
                    return false;
                }
            }
        }

        let signature = path.join("|");
        if !seen.insert(signature) {
            return false;
        }

        let span = match (earliest, latest) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        };
        let base = 78.0 + 3.5 * (edges - MIN_CHAIN_EDGES) as f64;
        let risk = round_dp((base + Self::tightness_bonus(span)).clamp(0.0, 100.0), 1);

        let members: Vec<String> = path.iter().map(ToString::to_string).collect();

        out.evidence.tag(&members[0], evidence::LAYERED_SHELL_CHAIN);
        out.evidence.tag(&members[0], evidence::SOURCE_FUNDS);
        for member in &members[1..edges - 1] {
            out.evidence.tag(member, evidence::LAYERED_SHELL_CHAIN);
            out.evidence.tag(member, evidence::LOW_ACTIVITY_SHELL);
        }
        out.evidence.tag(&members[edges - 1], evidence::LAYERED_SHELL_CHAIN);
        out.evidence.tag(&members[edges - 1], evidence::PRE_CASHOUT);
        out.evidence.tag(&members[edges], evidence::LAYERED_SHELL_CHAIN);
        out.evidence.tag(&members[edges], evidence::CASH_OUT);

        out.candidates.push(RingCandidate {
            pattern: PatternType::LayeredShell,
            members,
            risk_score: risk,
        });
        true
    }

    fn tightness_bonus(span: i64) -> f64 {
        if span <= 2 * 3_600 {
            10.0
        } else if span <= 12 * 3_600 {
            6.0
        } else if span <= 48 * 3_600 {
            3.0
        } else {
            0.0
        }
    }
}

impl Analyzer for ShellChainDetector {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }
}
