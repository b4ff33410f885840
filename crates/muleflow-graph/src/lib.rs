//! # Muleflow Graph
//!
//! Transaction model and directed transaction graph for mule-ring
//! detection.
//!
//! ## Components
//!
//! - `Transaction` - parsed, validated transaction record
//! - `TransactionGraph` - node set, sorted adjacency, time-ascending
//!   per-node and per-edge transaction lists, degree totals
//! - `GraphExport` - pure projection of the graph for visualization
//!
//! The graph is built once and read-only afterwards; every accessor
//! iterates in a deterministic (lexicographic or time-ascending) order.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod export;
pub mod types;

pub use builder::{GraphBuilder, TransactionGraph};
pub use export::{EdgeView, GraphExport, NodeView};
pub use types::Transaction;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builder::{GraphBuilder, TransactionGraph};
    pub use crate::export::{EdgeView, GraphExport, NodeView};
    pub use crate::types::Transaction;
}
