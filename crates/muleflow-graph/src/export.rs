//! Graph export projection.
//!
//! Pure view of the built graph for visualization front ends; not part of
//! detection. Edge amounts are rounded to two decimals.

use crate::builder::TransactionGraph;
use muleflow_core::round_dp;
use serde::{Deserialize, Serialize};

/// Exported node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
    /// Account ID.
    pub id: String,
}

/// Exported directed edge with aggregate volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeView {
    /// Edge ID in `<source>__<target>` form.
    pub id: String,
    /// Sender account ID.
    pub source: String,
    /// Receiver account ID.
    pub target: String,
    /// Number of transactions on the edge.
    pub tx_count: usize,
    /// Total transferred amount, rounded to two decimals.
    pub total_amount: f64,
}

/// Graph projection for visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    /// All nodes, lexicographic.
    pub nodes: Vec<NodeView>,
    /// All directed edges, sorted by source then target.
    pub edges: Vec<EdgeView>,
}

impl GraphExport {
    /// Project a built graph into its export view.
    #[must_use]
    pub fn project(graph: &TransactionGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|id| NodeView { id: id.to_string() })
            .collect();

        let edges = graph
            .edges()
            .map(|(source, target, txs)| {
                let total: f64 = txs.iter().map(|&i| graph.tx(i).amount).sum();
                EdgeView {
                    id: format!("{source}__{target}"),
                    source: source.to_string(),
                    target: target.to_string(),
                    tx_count: txs.len(),
                    total_amount: round_dp(total, 2),
                }
            })
            .collect();

        Self { nodes, edges }
    }
}
