//! Transaction graph construction.
//!
//! The builder is the only writer: it ingests a time-ordered transaction
//! sequence and produces a `TransactionGraph` that every downstream stage
//! borrows read-only. Adjacency and transaction lists are materialized in
//! sorted order so that traversal is deterministic across runs.

use crate::types::Transaction;
use muleflow_core::{analyzer::AnalyzerMetadata, stage::Stage, traits::Analyzer};
use std::collections::{BTreeMap, BTreeSet};

/// Directed transaction graph.
///
/// Every transaction contributes exactly one entry to the sender's
/// out-list, the receiver's in-list, and the `(sender, receiver)` edge
/// list; both endpoints' degree totals are incremented by one. All lists
/// are time-ascending with original input index as the stable tiebreak.
#[derive(Debug, Clone, Default)]
pub struct TransactionGraph {
    transactions: Vec<Transaction>,
    nodes: BTreeSet<String>,
    out_adjacency: BTreeMap<String, BTreeSet<String>>,
    in_adjacency: BTreeMap<String, BTreeSet<String>>,
    out_lists: BTreeMap<String, Vec<usize>>,
    in_lists: BTreeMap<String, Vec<usize>>,
    edge_lists: BTreeMap<String, BTreeMap<String, Vec<usize>>>,
    degrees: BTreeMap<String, usize>,
}

impl TransactionGraph {
    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of ingested transactions.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate node IDs in lexicographic order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Check whether a node is present.
    #[must_use]
    pub fn contains_node(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    /// Look up a transaction by its list index.
    #[must_use]
    pub fn tx(&self, index: usize) -> &Transaction {
        &self.transactions[index]
    }

    /// Iterate a node's out-neighbors in lexicographic order.
    pub fn out_neighbors(&self, node: &str) -> impl Iterator<Item = &str> {
        self.out_adjacency
            .get(node)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Iterate a node's in-neighbors in lexicographic order.
    pub fn in_neighbors(&self, node: &str) -> impl Iterator<Item = &str> {
        self.in_adjacency
            .get(node)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Number of distinct out-neighbors.
    #[must_use]
    pub fn out_degree(&self, node: &str) -> usize {
        self.out_adjacency.get(node).map_or(0, BTreeSet::len)
    }

    /// Number of distinct in-neighbors.
    #[must_use]
    pub fn in_degree(&self, node: &str) -> usize {
        self.in_adjacency.get(node).map_or(0, BTreeSet::len)
    }

    /// A node's outgoing transactions, time-ascending.
    #[must_use]
    pub fn out_list(&self, node: &str) -> &[usize] {
        self.out_lists.get(node).map_or(&[], Vec::as_slice)
    }

    /// A node's incoming transactions, time-ascending.
    #[must_use]
    pub fn in_list(&self, node: &str) -> &[usize] {
        self.in_lists.get(node).map_or(&[], Vec::as_slice)
    }

    /// Transactions on the `(sender, receiver)` edge, time-ascending.
    ///
    /// Empty when the edge does not exist.
    #[must_use]
    pub fn edge_list(&self, sender: &str, receiver: &str) -> &[usize] {
        self.edge_lists
            .get(sender)
            .and_then(|targets| targets.get(receiver))
            .map_or(&[], Vec::as_slice)
    }

    /// Total degree: count of transactions incident to the node.
    #[must_use]
    pub fn degree(&self, node: &str) -> usize {
        self.degrees.get(node).copied().unwrap_or(0)
    }

    /// Iterate all edges as `(sender, receiver, transaction indices)`,
    /// sorted by sender then receiver.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &[usize])> {
        self.edge_lists.iter().flat_map(|(sender, targets)| {
            targets
                .iter()
                .map(move |(receiver, txs)| (sender.as_str(), receiver.as_str(), txs.as_slice()))
        })
    }

    /// Number of distinct directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_lists.values().map(BTreeMap::len).sum()
    }
}

/// Graph construction analyzer.
///
/// Consumes the parsed transaction sequence and builds the read-only
/// `TransactionGraph` used by every detector.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    metadata: AnalyzerMetadata,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Create a new graph builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: AnalyzerMetadata::new("graph/builder", Stage::GraphConstruction)
                .with_description("Directed transaction graph construction"),
        }
    }

    /// Build the transaction graph from a parsed transaction sequence.
    #[must_use]
    pub fn build(transactions: Vec<Transaction>) -> TransactionGraph {
        let mut graph = TransactionGraph {
            nodes: BTreeSet::new(),
            out_adjacency: BTreeMap::new(),
            in_adjacency: BTreeMap::new(),
            out_lists: BTreeMap::new(),
            in_lists: BTreeMap::new(),
            edge_lists: BTreeMap::new(),
            degrees: BTreeMap::new(),
            transactions,
        };

        for index in 0..graph.transactions.len() {
            let sender = graph.transactions[index].sender.clone();
            let receiver = graph.transactions[index].receiver.clone();

            graph.nodes.insert(sender.clone());
            graph.nodes.insert(receiver.clone());

            graph
                .out_adjacency
                .entry(sender.clone())
                .or_default()
                .insert(receiver.clone());
            graph
                .in_adjacency
                .entry(receiver.clone())
                .or_default()
                .insert(sender.clone());

            graph.out_lists.entry(sender.clone()).or_default().push(index);
            graph.in_lists.entry(receiver.clone()).or_default().push(index);
            graph
                .edge_lists
                .entry(sender.clone())
                .or_default()
                .entry(receiver.clone())
                .or_default()
                .push(index);

            *graph.degrees.entry(sender).or_default() += 1;
            *graph.degrees.entry(receiver).or_default() += 1;
        }

        // Time-ascending with original index as the stable tiebreak.
        let transactions = &graph.transactions;
        let sort = |list: &mut Vec<usize>| {
            list.sort_by_key(|&i| (transactions[i].timestamp, i));
        };
        graph.out_lists.values_mut().for_each(sort);
        graph.in_lists.values_mut().for_each(sort);
        for targets in graph.edge_lists.values_mut() {
            targets.values_mut().for_each(sort);
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            transactions = graph.transaction_count(),
            "transaction graph built"
        );

        graph
    }
}

impl Analyzer for GraphBuilder {
    fn metadata(&self) -> &AnalyzerMetadata {
        &self.metadata
    }
}
