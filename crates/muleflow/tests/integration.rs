//! End-to-end pipeline tests.
//!
//! These exercise the documented boundary scenarios and the universal
//! report invariants across the full pipeline.

use muleflow::prelude::*;

fn tx(sender: &str, receiver: &str, amount: f64, timestamp: i64) -> Transaction {
    Transaction::new(sender, receiver, amount, timestamp)
}

/// Ten senders fund the hub inside an hour; the hub pays ten receivers
/// over the following hour.
fn smurfing_scenario() -> Vec<Transaction> {
    let base = 1_700_000_000;
    let mut txs = Vec::new();
    for i in 0..10 {
        txs.push(tx(
            &format!("S{i:02}"),
            "HUB",
            100.0 + i as f64 * 0.4,
            base + i as i64 * 60,
        ));
    }
    for i in 0..10 {
        txs.push(tx(
            "HUB",
            &format!("R{i:02}"),
            100.0 - i as f64 * 0.4,
            base + 3_600 + i as i64 * 60,
        ));
    }
    txs
}

fn shell_scenario() -> Vec<Transaction> {
    let base = 1_700_000_000;
    vec![
        tx("S", "X", 1_000.0, base),
        tx("X", "Y", 1_020.0, base + 3_600),
        tx("Y", "Z", 980.0, base + 7_200),
        tx("Z", "C", 1_010.0, base + 10_800),
    ]
}

fn assert_report_invariants(report: &AnalysisReport) {
    assert_eq!(report.summary.fraud_rings_detected, report.fraud_rings.len());
    assert_eq!(
        report.summary.suspicious_accounts_flagged,
        report.suspicious_accounts.len()
    );

    for ring in &report.fraud_rings {
        assert!(!ring.member_accounts.is_empty());
        assert!((0.0..=100.0).contains(&ring.risk_score));
        // At most one decimal place.
        let scaled = ring.risk_score * 10.0;
        assert!((scaled - scaled.round()).abs() < 1e-9, "{}", ring.risk_score);
    }

    for account in &report.suspicious_accounts {
        assert!(account.suspicion_score >= 60.0);
        assert!(!account.detected_patterns.is_empty());
        if let Some(ring_id) = &account.ring_id {
            let ring = report
                .fraud_rings
                .iter()
                .find(|r| &r.ring_id == ring_id)
                .expect("ring id must resolve");
            assert!(ring.member_accounts.contains(&account.account_id));
        }
    }
}

// ============================================================================
// Boundary Scenarios
// ============================================================================

#[test]
fn test_pure_three_cycle() {
    let report = MuleFlowPipeline::new().run(vec![
        tx("A", "B", 50.0, 1_700_000_000),
        tx("B", "C", 49.0, 1_700_000_600),
        tx("C", "A", 48.0, 1_700_001_200),
    ]);

    assert_eq!(report.fraud_rings.len(), 1);
    let ring = &report.fraud_rings[0];
    assert_eq!(ring.ring_id, "RING_001");
    assert_eq!(ring.pattern_type, PatternType::Cycle);
    assert_eq!(ring.member_accounts, vec!["A", "B", "C"]);
    assert!(ring.risk_score >= 99.0);

    // Each member scores risk - 3.1 plus a bounded jitter.
    assert_eq!(report.suspicious_accounts.len(), 3);
    for account in &report.suspicious_accounts {
        let expected = 99.3 - 3.1;
        assert!((account.suspicion_score - expected).abs() <= 0.5);
        assert_eq!(account.ring_id.as_deref(), Some("RING_001"));
        assert!(account.detected_patterns.contains(&"cycle".to_string()));
    }

    assert_report_invariants(&report);
}

#[test]
fn test_empty_graph() {
    let report = MuleFlowPipeline::new().run(Vec::new());

    assert_eq!(report.summary.total_accounts_analyzed, 0);
    assert_eq!(report.summary.suspicious_accounts_flagged, 0);
    assert_eq!(report.summary.fraud_rings_detected, 0);
    assert!(report.fraud_rings.is_empty());
    assert!(report.suspicious_accounts.is_empty());
}

#[test]
fn test_hub_smurfing() {
    let report = MuleFlowPipeline::new().run(smurfing_scenario());

    assert_eq!(report.fraud_rings.len(), 1);
    let ring = &report.fraud_rings[0];
    assert_eq!(ring.pattern_type, PatternType::Smurfing);
    assert!(ring.risk_score >= 94.0);

    // Hub first, then sorted senders, then sorted receivers.
    assert_eq!(ring.member_accounts[0], "HUB");
    assert_eq!(&ring.member_accounts[1..11], &(0..10).map(|i| format!("S{i:02}")).collect::<Vec<_>>()[..]);
    assert_eq!(&ring.member_accounts[11..21], &(0..10).map(|i| format!("R{i:02}")).collect::<Vec<_>>()[..]);

    // The hub tops the account list at risk + 2.8, clamped to 100.
    let hub = report
        .suspicious_accounts
        .iter()
        .find(|a| a.account_id == "HUB")
        .expect("hub must be flagged");
    assert_eq!(
        hub.suspicion_score,
        (ring.risk_score + 2.8).clamp(0.0, 100.0)
    );

    assert_report_invariants(&report);
}

#[test]
fn test_shell_chain() {
    let report = MuleFlowPipeline::new().run(shell_scenario());

    assert_eq!(report.fraud_rings.len(), 1);
    let ring = &report.fraud_rings[0];
    assert_eq!(ring.pattern_type, PatternType::LayeredShell);
    // Members stay in chain order.
    assert_eq!(ring.member_accounts, vec!["S", "X", "Y", "Z", "C"]);
    // 78 base + 3.5 for the fourth edge + 6 for the tight span.
    assert_eq!(ring.risk_score, 87.5);

    let sink = report
        .suspicious_accounts
        .iter()
        .find(|a| a.account_id == "C")
        .expect("cash-out must be flagged");
    assert!(sink.detected_patterns.contains(&"cash_out".to_string()));
    assert_eq!(sink.suspicion_score, 87.5 + 2.2);

    assert_report_invariants(&report);
}

#[test]
fn test_sub_threshold_scores_suppressed() {
    // The cycle members score well above 60; the stray counterparty D
    // belongs to no ring and must stay suppressed at score zero.
    let report = MuleFlowPipeline::new().run(vec![
        tx("A", "B", 50.0, 1_700_000_000),
        tx("B", "C", 49.0, 1_700_000_600),
        tx("C", "A", 48.0, 1_700_001_200),
        tx("D", "A", 10.0, 1_700_002_000),
    ]);

    assert_eq!(report.summary.total_accounts_analyzed, 4);
    assert!(report
        .suspicious_accounts
        .iter()
        .all(|a| a.account_id != "D"));
    assert_report_invariants(&report);
}

#[test]
fn test_overlapping_detectors_prefer_higher_risk_ring() {
    let base = 1_700_000_000;
    let mut txs = shell_scenario();
    // S also closes a tight cycle with A and B...
    txs.push(tx("A", "B", 60.0, base + 600));
    txs.push(tx("B", "S", 59.0, base + 1_200));
    txs.push(tx("S", "A", 58.0, base + 1_800));
    // ...and keeps one more outgoing transfer so it stays a busy,
    // non-shell account.
    txs.push(tx("S", "W", 25.0, base + 9_000));

    let report = MuleFlowPipeline::new().run(txs);

    assert_eq!(report.fraud_rings.len(), 2);
    let cycle_ring = &report.fraud_rings[0];
    assert_eq!(cycle_ring.pattern_type, PatternType::Cycle);
    assert_eq!(cycle_ring.ring_id, "RING_001");
    let shell_ring = &report.fraud_rings[1];
    assert_eq!(shell_ring.pattern_type, PatternType::LayeredShell);

    // S sits in both rings; the higher-risk cycle wins its ring id and
    // score branch.
    assert!(cycle_ring.risk_score > shell_ring.risk_score);
    let s = report
        .suspicious_accounts
        .iter()
        .find(|a| a.account_id == "S")
        .expect("S must be flagged");
    assert_eq!(s.ring_id.as_deref(), Some("RING_001"));
    let expected = cycle_ring.risk_score - 3.1;
    assert!((s.suspicion_score - expected).abs() <= 0.5);
    // Evidence from both detectors is unioned.
    assert!(s.detected_patterns.contains(&"cycle".to_string()));
    assert!(s
        .detected_patterns
        .contains(&"layered_shell_chain".to_string()));

    assert_report_invariants(&report);
}

// ============================================================================
// Determinism and Idempotence
// ============================================================================

#[test]
fn test_identical_input_identical_output() {
    let mut txs = smurfing_scenario();
    txs.extend(shell_scenario());
    txs.sort_by(|a, b| {
        (a.timestamp, &a.sender, &a.receiver).cmp(&(b.timestamp, &b.sender, &b.receiver))
    });

    let first = MuleFlowPipeline::new().run(txs.clone());
    let second = MuleFlowPipeline::new().run(txs);

    assert_eq!(first.fraud_rings, second.fraud_rings);
    assert_eq!(first.suspicious_accounts, second.suspicious_accounts);
    assert_eq!(
        first.summary.total_accounts_analyzed,
        second.summary.total_accounts_analyzed
    );
}

#[test]
fn test_resorted_input_identical_output() {
    let mut txs = shell_scenario();
    txs.extend(vec![
        tx("A", "B", 60.0, 1_700_000_600),
        tx("B", "A", 59.0, 1_700_001_200),
    ]);

    let baseline = MuleFlowPipeline::new().run(txs.clone());

    // Any stable sort consistent with (timestamp, sender, receiver).
    txs.sort_by(|a, b| {
        (a.timestamp, &a.sender, &a.receiver).cmp(&(b.timestamp, &b.sender, &b.receiver))
    });
    let resorted = MuleFlowPipeline::new().run(txs);

    assert_eq!(baseline.fraud_rings, resorted.fraud_rings);
    assert_eq!(baseline.suspicious_accounts, resorted.suspicious_accounts);
}

#[test]
fn test_merge_idempotent_end_to_end() {
    let mut txs = smurfing_scenario();
    txs.extend(shell_scenario());

    let report = MuleFlowPipeline::new().run(txs);

    // No two emitted rings of the same pattern may share a member set.
    for (i, a) in report.fraud_rings.iter().enumerate() {
        for b in report.fraud_rings.iter().skip(i + 1) {
            if a.pattern_type == b.pattern_type {
                let mut left = a.member_accounts.clone();
                let mut right = b.member_accounts.clone();
                left.sort();
                right.sort();
                assert_ne!(left, right);
            }
        }
    }
}

#[test]
fn test_report_serializes_to_contract_shape() {
    let report = MuleFlowPipeline::new().run(shell_scenario());
    let json = serde_json::to_value(&report).expect("report serializes");

    assert!(json.get("summary").is_some());
    assert!(json["summary"].get("processing_time_seconds").is_some());
    assert_eq!(json["fraud_rings"][0]["pattern_type"], "layered_shell");
    assert_eq!(json["fraud_rings"][0]["ring_id"], "RING_001");
    assert!(json["suspicious_accounts"][0].get("ring_id").is_some());
}

#[test]
fn test_graph_export_projection() {
    let graph = muleflow::graph::builder::GraphBuilder::build(shell_scenario());
    let export = GraphExport::project(&graph);

    assert_eq!(export.nodes.len(), 5);
    assert_eq!(export.edges.len(), 4);
    assert_eq!(export.edges[0].id, "S__X");
    assert_eq!(export.edges[0].tx_count, 1);
}
