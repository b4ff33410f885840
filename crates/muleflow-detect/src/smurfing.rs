//! Smurfing (fan-in/fan-out hub) detection.
//!
//! A hub shows at least ten unique senders and ten unique receivers whose
//! activity clusters inside a 72-hour window, with amount-similarity
//! evidence on at least one side and an optional downstream cash-out sink
//! collecting from the hub's receivers.

use crate::evidence;
use crate::stats::median;
use crate::types::{Detection, PatternType, RingCandidate};
use muleflow_core::{analyzer::AnalyzerMetadata, round_dp, stage::Stage, traits::Analyzer};
use muleflow_graph::{Transaction, TransactionGraph};
use std::collections::{BTreeMap, BTreeSet};

/// Clustering window: 72 hours.
pub const WINDOW_SECS: i64 = 72 * 3_600;
/// Minimum unique counterparties on each side.
pub const MIN_UNIQUE: usize = 10;
/// Relative tolerance around the median for amount consistency.
pub const AMOUNT_TOLERANCE: f64 = 0.08;
/// Consistency threshold on the fan-in side.
pub const STRONG_FAN_IN: f64 = 0.50;
/// Consistency threshold on the fan-out side.
pub const STRONG_FAN_OUT: f64 = 0.45;
/// A cash-out sink forwards to at most this many counterparties.
pub const SINK_MAX_OUT: usize = 2;

/// Best unique-counterparty window on one side of a hub.
#[derive(Debug, Clone)]
struct SideWindow {
    counterparties: BTreeSet<String>,
    amounts: Vec<f64>,
    min_t: i64,
    max_t: i64,
}

// ============================================================================
// Smurfing Detector
// ============================================================================

/// Fan-in/fan-out hub detector.
///
/// Smurfing rings are ordered `[hub, senders ascending, receivers
/// ascending, cashout?]` with duplicates removed by first occurrence; the
/// hub is always the first member.
#[derive(Debug, Clone)]
pub struct SmurfingDetector {
    metadata: AnalyzerMetadata,
}

impl Default for SmurfingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SmurfingDetector {
    /// Create a new smurfing detector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new("detect/smurfing", Stage::PatternDetection)
                .with_description("Concurrent fan-in/fan-out hubs within a 72-hour window"),
        }
    }

    /// Scan all hub candidates and emit smurfing rings.
    #[must_use]
    pub fn detect(graph: &TransactionGraph) -> Detection {
        let mut detection = Detection::default();

        for hub in graph.nodes() {
            if graph.in_list(hub).len() >= MIN_UNIQUE && graph.out_list(hub).len() >= MIN_UNIQUE {
                Self::analyze_hub(graph, hub, &mut detection);
            }
        }

        tracing::debug!(
            rings = detection.candidates.len(),
            "smurfing detection complete"
        );
        detection
    }

    fn analyze_hub(graph: &TransactionGraph, hub: &str, out: &mut Detection) {
        let Some(inbound) = Self::best_window(graph, graph.in_list(hub), |tx| tx.sender.as_str())
        else {
            return;
        };
        let Some(outbound) =
            Self::best_window(graph, graph.out_list(hub), |tx| tx.receiver.as_str())
        else {
            return;
        };

        let min_t = inbound.min_t.min(outbound.min_t);
        let max_t = inbound.max_t.max(outbound.max_t);
        if max_t - min_t > WINDOW_SECS {
            return;
        }

        let in_consistency = Self::amount_consistency(&inbound.amounts);
        let out_consistency = Self::amount_consistency(&outbound.amounts);
        if in_consistency < STRONG_FAN_IN && out_consistency < STRONG_FAN_OUT {
            return;
        }

        let cashout = Self::find_cashout(graph, &outbound.counterparties, min_t, max_t);

        let mut members = Vec::with_capacity(2 + inbound.counterparties.len() + outbound.counterparties.len());
        members.push(hub.to_string());
        members.extend(inbound.counterparties.iter().cloned());
        members.extend(outbound.counterparties.iter().cloned());
        if let Some(sink) = &cashout {
            members.push(sink.clone());
        }
        let members = Self::dedup_first(members);

        let risk = 70.0
            + 1.2 * inbound.counterparties.len() as f64
            + 1.2 * outbound.counterparties.len() as f64
            + 6.0 * in_consistency.max(out_consistency)
            + if cashout.is_some() { 4.0 } else { 0.0 };
        let risk = round_dp(risk.clamp(0.0, 100.0), 1);

        out.evidence.tag(hub, evidence::SMURFING_FAN_IN);
        out.evidence.tag(hub, evidence::SMURFING_FAN_OUT);
        out.evidence.tag(hub, evidence::TEMPORAL_72H);
        for sender in &inbound.counterparties {
            out.evidence.tag(sender, evidence::SMURFING_FAN_IN);
            out.evidence.tag(sender, evidence::TEMPORAL_72H);
        }
        for receiver in &outbound.counterparties {
            out.evidence.tag(receiver, evidence::SMURFING_FAN_OUT);
            out.evidence.tag(receiver, evidence::TEMPORAL_72H);
        }
        if let Some(sink) = &cashout {
            out.evidence.tag(sink, evidence::SMURFING_FAN_OUT);
            out.evidence.tag(sink, evidence::TEMPORAL_72H);
            out.evidence.tag(sink, evidence::CASH_OUT);
        }

        out.candidates.push(RingCandidate {
            pattern: PatternType::Smurfing,
            members,
            risk_score: risk,
        });
    }

    /// Best 72-hour window over a time-ascending transaction list,
    /// maximizing unique counterparties; ties prefer the tighter span.
    fn best_window<'g, F>(
        graph: &'g TransactionGraph,
        list: &[usize],
        counterparty: F,
    ) -> Option<SideWindow>
    where
        F: Fn(&'g Transaction) -> &'g str,
    {
        if list.len() < MIN_UNIQUE {
            return None;
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut best: Option<(usize, usize, usize, i64)> = None;
        let mut left = 0;

        for right in 0..list.len() {
            let right_ts = graph.tx(list[right]).timestamp;
            *counts.entry(counterparty(graph.tx(list[right]))).or_default() += 1;

            while right_ts - graph.tx(list[left]).timestamp > WINDOW_SECS {
                let dropped = counterparty(graph.tx(list[left]));
                let depleted = counts
                    .get_mut(dropped)
                    .map(|count| {
                        *count -= 1;
                        *count == 0
                    })
                    .unwrap_or(false);
                if depleted {
                    counts.remove(dropped);
                }
                left += 1;
            }

            let unique = counts.len();
            if unique >= MIN_UNIQUE {
                let span = right_ts - graph.tx(list[left]).timestamp;
                let better = best.map_or(true, |(_, _, best_unique, best_span)| {
                    unique > best_unique || (unique == best_unique && span < best_span)
                });
                if better {
                    best = Some((left, right, unique, span));
                }
            }
        }

        best.map(|(left, right, _, _)| {
            let mut counterparties = BTreeSet::new();
            let mut amounts = Vec::with_capacity(right - left + 1);
            for &index in &list[left..=right] {
                let tx = graph.tx(index);
                counterparties.insert(counterparty(tx).to_string());
                amounts.push(tx.amount);
            }
            SideWindow {
                counterparties,
                amounts,
                min_t: graph.tx(list[left]).timestamp,
                max_t: graph.tx(list[right]).timestamp,
            }
        })
    }

    /// Fraction of amounts within the relative tolerance of the median.
    ///
    /// Lists shorter than six amounts cannot be assessed and score 0.
    fn amount_consistency(amounts: &[f64]) -> f64 {
        if amounts.len() < 6 {
            return 0.0;
        }
        let center = median(amounts);
        if center <= 0.0 {
            return 0.0;
        }
        let tolerance = AMOUNT_TOLERANCE * center;
        let within = amounts
            .iter()
            .filter(|&&amount| (amount - center).abs() <= tolerance)
            .count();
        within as f64 / amounts.len() as f64
    }

    /// Sink-like node collecting from the hub's receivers inside the
    /// combined window: at least ten unique such senders and an out-list
    /// of at most two. The candidate with the most unique senders wins;
    /// ties go to the lexicographically smaller id.
    fn find_cashout(
        graph: &TransactionGraph,
        receivers: &BTreeSet<String>,
        min_t: i64,
        max_t: i64,
    ) -> Option<String> {
        let mut best: Option<(String, usize)> = None;

        for node in graph.nodes() {
            if graph.out_list(node).len() > SINK_MAX_OUT {
                continue;
            }

            let mut unique: BTreeSet<&str> = BTreeSet::new();
            for &index in graph.in_list(node) {
                let tx = graph.tx(index);
                if tx.timestamp >= min_t
                    && tx.timestamp <= max_t
                    && receivers.contains(tx.sender.as_str())
                {
                    unique.insert(tx.sender.as_str());
                }
            }

            if unique.len() >= MIN_UNIQUE
                && best.as_ref().map_or(true, |(_, count)| unique.len() > *count)
            {
                best = Some((node.to_string(), unique.len()));
            }
        }

        best.map(|(node, _)| node)
    }

    fn dedup_first(members: Vec<String>) -> Vec<String> {
        let mut seen = BTreeSet::new();
        members
            .into_iter()
            .filter(|member| seen.insert(member.clone()))
            .collect()
    }
}

impl Analyzer for SmurfingDetector {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }
}
