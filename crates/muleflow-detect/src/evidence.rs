//! Evidence tag vocabulary and per-account evidence map.
//!
//! Tags are drawn from a closed vocabulary with a fixed rank order used
//! when a suspicious account's detected patterns are emitted. Unknown
//! tags sort after known ones, then alphabetically.

use std::collections::{BTreeMap, BTreeSet};

/// Cycle membership.
pub const CYCLE: &str = "cycle";
/// Fan-in side of a smurfing hub.
pub const SMURFING_FAN_IN: &str = "smurfing_fan_in";
/// Fan-out side of a smurfing hub.
pub const SMURFING_FAN_OUT: &str = "smurfing_fan_out";
/// Activity clustered within the 72-hour smurfing window.
pub const TEMPORAL_72H: &str = "temporal_72h";
/// Membership in a layered shell chain.
pub const LAYERED_SHELL_CHAIN: &str = "layered_shell_chain";
/// Chain origin supplying the funds.
pub const SOURCE_FUNDS: &str = "source_funds";
/// Low-activity pass-through account.
pub const LOW_ACTIVITY_SHELL: &str = "low_activity_shell";
/// Last hop before the cash-out terminal.
pub const PRE_CASHOUT: &str = "pre_cashout";
/// Cash-out terminal.
pub const CASH_OUT: &str = "cash_out";

/// Tag vocabulary in emission rank order.
pub const TAG_RANK_ORDER: &[&str] = &[
    "cycle_length_3",
    "cycle_length_4",
    "cycle_length_5",
    CYCLE,
    SMURFING_FAN_IN,
    SMURFING_FAN_OUT,
    TEMPORAL_72H,
    LAYERED_SHELL_CHAIN,
    SOURCE_FUNDS,
    LOW_ACTIVITY_SHELL,
    PRE_CASHOUT,
    CASH_OUT,
];

/// Rank of a tag for emission ordering; unknown tags rank last.
#[must_use]
pub fn tag_rank(tag: &str) -> usize {
    TAG_RANK_ORDER
        .iter()
        .position(|&known| known == tag)
        .unwrap_or(TAG_RANK_ORDER.len())
}

/// Cycle-length tag for a cycle of `len` members.
#[must_use]
pub fn cycle_length_tag(len: usize) -> String {
    format!("cycle_length_{len}")
}

/// Sort a tag set into emission order: rank, then alphabetical.
#[must_use]
pub fn sorted_tags(tags: &BTreeSet<String>) -> Vec<String> {
    let mut ordered: Vec<String> = tags.iter().cloned().collect();
    ordered.sort_by(|a, b| tag_rank(a).cmp(&tag_rank(b)).then_with(|| a.cmp(b)));
    ordered
}

/// Per-account evidence tags.
///
/// Each detector produces its own map; maps are unioned before scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceMap {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl EvidenceMap {
    /// Create an empty evidence map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a tag to an account.
    pub fn tag(&mut self, account: &str, tag: &str) {
        self.entries
            .entry(account.to_string())
            .or_default()
            .insert(tag.to_string());
    }

    /// Tags attached to an account, if any.
    #[must_use]
    pub fn tags_for(&self, account: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(account)
    }

    /// Union another evidence map into this one.
    pub fn merge(&mut self, other: EvidenceMap) {
        for (account, tags) in other.entries {
            self.entries.entry(account).or_default().extend(tags);
        }
    }

    /// Iterate accounts and their tag sets in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of tagged accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no account carries evidence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
