//! Role-aware account scoring.
//!
//! Every graph node starts at score 0 with an empty pattern set. An
//! account's score derives from its best ring (highest risk, earlier
//! pipeline order on ties) with a role adjustment per pattern and a
//! deterministic FNV-1a jitter that keeps equal-role scores from
//! colliding without sacrificing reproducibility.

use muleflow_core::{analyzer::AnalyzerMetadata, round_dp, stage::Stage, traits::Analyzer};
use muleflow_detect::{evidence, EvidenceMap, PatternType, RingCandidate};
use muleflow_graph::TransactionGraph;
use std::collections::{BTreeMap, BTreeSet};

/// FNV-1a 32-bit offset basis.
const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
/// FNV-1a 32-bit prime.
const FNV_PRIME: u32 = 16_777_619;

/// Per-account score state.
///
/// The ring id stays `None` after scoring; the output assembler owns the
/// final ring-id assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountScoreState {
    /// Suspicion score in [0,100], one decimal.
    pub score: f64,
    /// Evidence tags unioned across detectors.
    pub patterns: BTreeSet<String>,
    /// Final ring id; assigned at output assembly.
    pub ring: Option<String>,
}

// ============================================================================
// Account Scorer
// ============================================================================

/// Role-aware account scorer.
#[derive(Debug, Clone)]
pub struct AccountScorer {
    metadata: AnalyzerMetadata,
}

impl Default for AccountScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountScorer {
    /// Create a new account scorer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new("score/accounts", Stage::Scoring)
                .with_description("Role-aware suspicion scores from each account's best ring"),
        }
    }

    /// Score every graph node against the consolidated rings.
    ///
    /// Accounts outside every ring keep score 0 and an empty pattern set;
    /// the assembler filters them out.
    #[must_use]
    pub fn score(
        graph: &TransactionGraph,
        rings: &[RingCandidate],
        evidence_map: &EvidenceMap,
    ) -> BTreeMap<String, AccountScoreState> {
        let mut states: BTreeMap<String, AccountScoreState> = graph
            .nodes()
            .map(|node| (node.to_string(), AccountScoreState::default()))
            .collect();

        // Best ring per account: highest risk, earlier ring on ties.
        let mut best: BTreeMap<&str, usize> = BTreeMap::new();
        for (index, ring) in rings.iter().enumerate() {
            for member in &ring.members {
                let replace = best
                    .get(member.as_str())
                    .map_or(true, |&held| ring.risk_score > rings[held].risk_score);
                if replace {
                    best.insert(member, index);
                }
            }
        }

        for (account, state) in &mut states {
            let Some(&ring_index) = best.get(account.as_str()) else {
                continue;
            };
            let ring = &rings[ring_index];

            if let Some(tags) = evidence_map.tags_for(account) {
                state.patterns = tags.clone();
            }

            let raw = Self::role_score(account, state, ring);
            state.score = round_dp(raw, 1).clamp(0.0, 100.0);
        }

        states
    }

    fn role_score(account: &str, state: &AccountScoreState, ring: &RingCandidate) -> f64 {
        let risk = ring.risk_score;
        let jitter = deterministic_jitter(account, ring.pattern);
        let has = |tag: &str| state.patterns.contains(tag);

        match ring.pattern {
            PatternType::Cycle => risk - 3.1 + jitter,
            PatternType::Smurfing => {
                if ring.members.first().map(String::as_str) == Some(account) {
                    risk + 2.8
                } else if has(evidence::CASH_OUT) {
                    risk + 1.7
                } else if has(evidence::SMURFING_FAN_OUT) {
                    risk - 5.9 + jitter
                } else if has(evidence::SMURFING_FAN_IN) {
                    risk - 16.4 + jitter
                } else {
                    risk - 10.0 + jitter
                }
            }
            PatternType::LayeredShell => {
                if has(evidence::CASH_OUT) {
                    risk + 2.2
                } else if has(evidence::LOW_ACTIVITY_SHELL) {
                    risk + 0.4 + jitter
                } else if has(evidence::PRE_CASHOUT) {
                    risk - 1.7 + jitter
                } else if has(evidence::SOURCE_FUNDS) {
                    risk - 5.4 + jitter
                } else {
                    risk - 1.0 + jitter
                }
            }
        }
    }
}

impl Analyzer for AccountScorer {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }
}

/// Deterministic jitter in [-0.4, +0.4) from the account id and pattern.
///
/// `(fnv1a32(account | "|" | pattern) / 2^32 - 0.5) * 0.8`, with 32-bit
/// wrapping arithmetic.
#[must_use]
pub fn deterministic_jitter(account: &str, pattern: PatternType) -> f64 {
    let hash = fnv1a32(&format!("{account}|{pattern}"));
    (f64::from(hash) / 4_294_967_296.0 - 0.5) * 0.8
}

fn fnv1a32(input: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in input.as_bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use muleflow_graph::{builder::GraphBuilder, Transaction};

    fn cycle_fixture() -> (TransactionGraph, Vec<RingCandidate>, EvidenceMap) {
        let graph = GraphBuilder::build(vec![
            Transaction::new("A", "B", 50.0, 0),
            Transaction::new("B", "C", 49.0, 600),
            Transaction::new("C", "A", 48.0, 1_200),
        ]);
        let rings = vec![RingCandidate {
            pattern: PatternType::Cycle,
            members: vec!["A".into(), "B".into(), "C".into()],
            risk_score: 99.3,
        }];
        let mut evidence_map = EvidenceMap::new();
        for member in ["A", "B", "C"] {
            evidence_map.tag(member, "cycle");
            evidence_map.tag(member, "cycle_length_3");
        }
        (graph, rings, evidence_map)
    }

    #[test]
    fn test_fnv1a32_reference_values() {
        // Published FNV-1a 32-bit test vectors.
        assert_eq!(fnv1a32(""), 0x811c_9dc5);
        assert_eq!(fnv1a32("a"), 0xe40c_292c);
        assert_eq!(fnv1a32("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_jitter_bounds_and_determinism() {
        for account in ["A", "mule-7", "acct_42", ""] {
            let jitter = deterministic_jitter(account, PatternType::Cycle);
            assert!((-0.4..0.4).contains(&jitter), "{account}: {jitter}");
            assert_eq!(jitter, deterministic_jitter(account, PatternType::Cycle));
        }
        // Pattern participates in the hash.
        assert_ne!(
            deterministic_jitter("A", PatternType::Cycle),
            deterministic_jitter("A", PatternType::Smurfing)
        );
    }

    #[test]
    fn test_cycle_members_scored() {
        let (graph, rings, evidence_map) = cycle_fixture();
        let states = AccountScorer::score(&graph, &rings, &evidence_map);

        for member in ["A", "B", "C"] {
            let state = &states[member];
            let expected =
                round_dp(99.3 - 3.1 + deterministic_jitter(member, PatternType::Cycle), 1);
            assert_eq!(state.score, expected);
            assert!(state.patterns.contains("cycle"));
            assert!(state.ring.is_none());
        }
    }

    #[test]
    fn test_unringed_account_stays_zero() {
        let graph = GraphBuilder::build(vec![
            Transaction::new("A", "B", 50.0, 0),
            Transaction::new("B", "C", 49.0, 600),
            Transaction::new("C", "A", 48.0, 1_200),
            Transaction::new("D", "A", 10.0, 2_000),
        ]);
        let (_, rings, evidence_map) = cycle_fixture();
        let states = AccountScorer::score(&graph, &rings, &evidence_map);

        assert_eq!(states["D"].score, 0.0);
        assert!(states["D"].patterns.is_empty());
    }

    #[test]
    fn test_smurfing_roles() {
        let graph = GraphBuilder::build(vec![
            Transaction::new("S", "H", 100.0, 0),
            Transaction::new("H", "R", 100.0, 60),
            Transaction::new("R", "K", 95.0, 120),
        ]);
        let rings = vec![RingCandidate {
            pattern: PatternType::Smurfing,
            members: vec!["H".into(), "S".into(), "R".into(), "K".into()],
            risk_score: 90.0,
        }];
        let mut evidence_map = EvidenceMap::new();
        evidence_map.tag("H", evidence::SMURFING_FAN_IN);
        evidence_map.tag("H", evidence::SMURFING_FAN_OUT);
        evidence_map.tag("S", evidence::SMURFING_FAN_IN);
        evidence_map.tag("R", evidence::SMURFING_FAN_OUT);
        evidence_map.tag("K", evidence::CASH_OUT);

        let states = AccountScorer::score(&graph, &rings, &evidence_map);

        // Hub and cash-out branches are jitter-free.
        assert_eq!(states["H"].score, round_dp(90.0 + 2.8, 1));
        assert_eq!(states["K"].score, round_dp(90.0 + 1.7, 1));

        let r_expected =
            round_dp(90.0 - 5.9 + deterministic_jitter("R", PatternType::Smurfing), 1);
        assert_eq!(states["R"].score, r_expected);

        let s_expected =
            round_dp(90.0 - 16.4 + deterministic_jitter("S", PatternType::Smurfing), 1);
        assert_eq!(states["S"].score, s_expected);
    }

    #[test]
    fn test_best_ring_wins() {
        let graph = GraphBuilder::build(vec![
            Transaction::new("A", "B", 50.0, 0),
            Transaction::new("B", "A", 49.0, 600),
        ]);
        let rings = vec![
            RingCandidate {
                pattern: PatternType::LayeredShell,
                members: vec!["A".into(), "B".into()],
                risk_score: 82.0,
            },
            RingCandidate {
                pattern: PatternType::Cycle,
                members: vec!["A".into(), "B".into()],
                risk_score: 95.0,
            },
        ];
        let mut evidence_map = EvidenceMap::new();
        evidence_map.tag("A", evidence::CYCLE);
        evidence_map.tag("B", evidence::CYCLE);

        let states = AccountScorer::score(&graph, &rings, &evidence_map);

        // Scored through the cycle branch of the higher-risk ring.
        let expected = round_dp(95.0 - 3.1 + deterministic_jitter("A", PatternType::Cycle), 1);
        assert_eq!(states["A"].score, expected);
    }

    #[test]
    fn test_scorer_metadata() {
        let scorer = AccountScorer::new();
        assert_eq!(scorer.id(), "score/accounts");
        assert_eq!(scorer.stage(), Stage::Scoring);
    }
}
