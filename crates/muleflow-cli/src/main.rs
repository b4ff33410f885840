//! Muleflow CLI tool.
//!
//! Plays the external-parser role of the pipeline contract: reads a JSON
//! array of transactions, validates it, sorts it by (timestamp, sender,
//! receiver), and feeds it to the engine.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use muleflow::prelude::{GraphBuilder, GraphExport, MuleFlowPipeline, Transaction};
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "muleflow")]
#[command(version, about = "Money-mule ring detection over transaction logs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detection pipeline and print the analysis report
    Analyze {
        /// Path to a JSON array of transactions
        input: PathBuf,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Print the graph projection consumed by visualization front ends
    ExportGraph {
        /// Path to a JSON array of transactions
        input: PathBuf,

        /// Pretty-print the projection
        #[arg(long)]
        pretty: bool,
    },

    /// Validate an input file against the transaction contract
    Validate {
        /// Path to a JSON array of transactions
        input: PathBuf,
    },

    /// List pipeline stages and their analyzers
    Stages,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so stdout stays clean JSON.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze { input, pretty } => {
            let transactions = load_transactions(&input)?;
            let report = MuleFlowPipeline::new().run(transactions);
            print_json(&report, pretty)?;
        }

        Commands::ExportGraph { input, pretty } => {
            let transactions = load_transactions(&input)?;
            let graph = GraphBuilder::build(transactions);
            print_json(&GraphExport::project(&graph), pretty)?;
        }

        Commands::Validate { input } => {
            let transactions = load_transactions(&input)?;
            println!("{} transactions satisfy the input contract", transactions.len());
        }

        Commands::Stages => {
            println!("Muleflow Pipeline Stages");
            println!("========================\n");
            for info in muleflow::catalog::stages() {
                println!(
                    "  {} ({} analyzers)\n    {}",
                    info.stage, info.analyzer_count, info.description
                );
            }
            println!("\nTotal: {} analyzers", muleflow::catalog::total_analyzer_count());
        }
    }

    Ok(())
}

/// Read, validate, and contract-sort a transaction file.
fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut transactions: Vec<Transaction> =
        serde_json::from_str(&data).context("parsing transaction JSON")?;

    for (index, transaction) in transactions.iter().enumerate() {
        transaction
            .validate()
            .with_context(|| format!("transaction {index}"))?;
    }

    transactions.sort_by(|a, b| {
        (a.timestamp, &a.sender, &a.receiver).cmp(&(b.timestamp, &b.sender, &b.receiver))
    });
    Ok(transactions)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
