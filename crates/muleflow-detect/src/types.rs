//! Detection types: pattern taxonomy, ring candidates, detector output.

use crate::evidence::EvidenceMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Mule-ring pattern taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Directed cycle of length 3-5.
    Cycle,
    /// Fan-in/fan-out hub within the 72-hour window.
    Smurfing,
    /// Multi-hop chain through low-activity shells.
    LayeredShell,
}

impl PatternType {
    /// Pattern name as emitted in the report.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            PatternType::Cycle => "cycle",
            PatternType::Smurfing => "smurfing",
            PatternType::LayeredShell => "layered_shell",
        }
    }

    /// Emission priority: cycles first, then smurfing, then shell chains.
    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            PatternType::Cycle => 1,
            PatternType::Smurfing => 2,
            PatternType::LayeredShell => 3,
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate ring of colluding accounts.
///
/// Member ordering semantics depend on the pattern: cycles carry the
/// canonical rotation, smurfing rings are `[hub, senders, receivers,
/// cashout?]`, shell chains keep chain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingCandidate {
    /// Pattern type.
    pub pattern: PatternType,
    /// Ordered member accounts (non-empty).
    pub members: Vec<String>,
    /// Risk score in [0,100], one decimal.
    pub risk_score: f64,
}

impl RingCandidate {
    /// The member set, ignoring order and duplicates.
    #[must_use]
    pub fn member_set(&self) -> BTreeSet<&str> {
        self.members.iter().map(String::as_str).collect()
    }

    /// Canonical signature: `<pattern>|<sorted-unique-members-joined-by-comma>`.
    #[must_use]
    pub fn signature(&self) -> String {
        let members: Vec<&str> = self.member_set().into_iter().collect();
        format!("{}|{}", self.pattern, members.join(","))
    }
}

/// Output of one detector: ring candidates plus per-account evidence.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Ring candidates in discovery order.
    pub candidates: Vec<RingCandidate>,
    /// Per-account evidence tags.
    pub evidence: EvidenceMap,
}
