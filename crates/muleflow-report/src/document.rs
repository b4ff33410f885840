//! Report document types.
//!
//! The canonical output consumed by UI and export layers. Scores carry
//! one decimal, processing time three.

use muleflow_detect::PatternType;
use serde::{Deserialize, Serialize};

/// Aggregate counters for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of nodes in the transaction graph.
    pub total_accounts_analyzed: usize,
    /// Number of emitted suspicious accounts.
    pub suspicious_accounts_flagged: usize,
    /// Number of emitted fraud rings.
    pub fraud_rings_detected: usize,
    /// Wall-clock pipeline time in seconds, three decimals.
    pub processing_time_seconds: f64,
}

/// An emitted fraud ring with its stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRing {
    /// Stable identifier, `RING_NNN`, dense from 001.
    pub ring_id: String,
    /// Pattern type.
    pub pattern_type: PatternType,
    /// Member accounts: sorted for cycles, detector order otherwise.
    pub member_accounts: Vec<String>,
    /// Risk score in [0,100], one decimal.
    pub risk_score: f64,
}

/// An emitted suspicious account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    /// Account ID.
    pub account_id: String,
    /// Suspicion score, at least 60, one decimal.
    pub suspicion_score: f64,
    /// Evidence tags in fixed rank order (non-empty).
    pub detected_patterns: Vec<String>,
    /// Best ring the account belongs to, if any.
    pub ring_id: Option<String>,
}

/// The full analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Run counters.
    pub summary: ReportSummary,
    /// Rings ordered by pattern priority, then member signature.
    pub fraud_rings: Vec<FraudRing>,
    /// Accounts ordered by score descending, then id ascending.
    pub suspicious_accounts: Vec<SuspiciousAccount>,
}
