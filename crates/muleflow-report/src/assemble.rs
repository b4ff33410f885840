//! Output assembly.
//!
//! Canonicalizes rings by (pattern, member-set), assigns dense stable
//! identifiers, filters accounts by the score cutoff, and produces the
//! final report. The assembler never fails: an empty graph yields an
//! empty report.

use crate::document::{AnalysisReport, FraudRing, ReportSummary, SuspiciousAccount};
use crate::score::AccountScoreState;
use muleflow_core::{analyzer::AnalyzerMetadata, round_dp, stage::Stage, traits::Analyzer};
use muleflow_detect::{evidence, PatternType, RingCandidate};
use muleflow_graph::TransactionGraph;
use std::collections::{BTreeMap, BTreeSet};

/// Minimum final score for a suspicious account to be emitted.
pub const SCORE_CUTOFF: f64 = 60.0;

// ============================================================================
// Output Assembler
// ============================================================================

/// Deterministic report assembly.
#[derive(Debug, Clone)]
pub struct OutputAssembler {
    metadata: AnalyzerMetadata,
}

impl Default for OutputAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputAssembler {
    /// Create a new output assembler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new("assemble/report", Stage::Assembly)
                .with_description("Canonical ring ids, account filtering, report document"),
        }
    }

    /// Assemble the canonical report.
    #[must_use]
    pub fn assemble(
        graph: &TransactionGraph,
        rings: &[RingCandidate],
        states: &BTreeMap<String, AccountScoreState>,
        elapsed_seconds: f64,
    ) -> AnalysisReport {
        let fraud_rings = Self::canonical_rings(rings);
        let best_ring = Self::best_ring_per_member(&fraud_rings);

        let mut suspicious: Vec<SuspiciousAccount> = states
            .iter()
            .filter(|(_, state)| state.score >= SCORE_CUTOFF && !state.patterns.is_empty())
            .map(|(account, state)| SuspiciousAccount {
                account_id: account.clone(),
                suspicion_score: state.score,
                detected_patterns: evidence::sorted_tags(&state.patterns),
                ring_id: best_ring.get(account.as_str()).map(|&(_, id)| id.to_string()),
            })
            .collect();
        suspicious.sort_by(|a, b| {
            b.suspicion_score
                .total_cmp(&a.suspicion_score)
                .then_with(|| a.account_id.cmp(&b.account_id))
        });

        let summary = ReportSummary {
            total_accounts_analyzed: graph.node_count(),
            suspicious_accounts_flagged: suspicious.len(),
            fraud_rings_detected: fraud_rings.len(),
            processing_time_seconds: round_dp(elapsed_seconds, 3),
        };

        tracing::info!(
            accounts = summary.total_accounts_analyzed,
            flagged = summary.suspicious_accounts_flagged,
            rings = summary.fraud_rings_detected,
            "report assembled"
        );

        AnalysisReport {
            summary,
            fraud_rings,
            suspicious_accounts: suspicious,
        }
    }

    /// Deduplicate rings by signature, order them, and assign ids.
    fn canonical_rings(rings: &[RingCandidate]) -> Vec<FraudRing> {
        // Highest-risk ring per (pattern, member-set) signature.
        let mut kept: BTreeMap<String, usize> = BTreeMap::new();
        for (index, ring) in rings.iter().enumerate() {
            let signature = ring.signature();
            let replace = kept
                .get(&signature)
                .map_or(true, |&held| ring.risk_score > rings[held].risk_score);
            if replace {
                kept.insert(signature, index);
            }
        }

        // Pattern priority, then ascending sorted-member signature.
        let mut ordered: Vec<(u8, String, usize)> = kept
            .into_values()
            .map(|index| {
                let ring = &rings[index];
                let members: Vec<&str> = ring.member_set().into_iter().collect();
                (ring.pattern.priority(), members.join(","), index)
            })
            .collect();
        ordered.sort();

        ordered
            .into_iter()
            .enumerate()
            .map(|(position, (_, _, index))| {
                let ring = &rings[index];
                FraudRing {
                    ring_id: format!("RING_{:03}", position + 1),
                    pattern_type: ring.pattern,
                    member_accounts: Self::emitted_members(ring),
                    risk_score: ring.risk_score,
                }
            })
            .collect()
    }

    /// Cycle members sort ascending (rotationally symmetric); other
    /// patterns keep detector order with duplicates dropped by first
    /// occurrence.
    fn emitted_members(ring: &RingCandidate) -> Vec<String> {
        match ring.pattern {
            PatternType::Cycle => ring
                .member_set()
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            PatternType::Smurfing | PatternType::LayeredShell => {
                let mut seen = BTreeSet::new();
                ring.members
                    .iter()
                    .filter(|member| seen.insert(member.as_str()))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Highest-risk ring per member; ties go to the smaller ring id.
    fn best_ring_per_member(rings: &[FraudRing]) -> BTreeMap<&str, (f64, &str)> {
        let mut best: BTreeMap<&str, (f64, &str)> = BTreeMap::new();
        for ring in rings {
            for member in &ring.member_accounts {
                let replace = best
                    .get(member.as_str())
                    .map_or(true, |&(risk, _)| ring.risk_score > risk);
                if replace {
                    best.insert(member, (ring.risk_score, &ring.ring_id));
                }
            }
        }
        best
    }
}

impl Analyzer for OutputAssembler {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }
}
