// martgate/src/commands/run.rs
//
// USE CASE: Run the data quality gate.

use std::path::Path;

use anyhow::Context;
use comfy_table::{ContentArrangement, Table};
use martgate_core::application::{GateOutcome, run_gate};
use martgate_core::domain::check::CheckStatus;
use martgate_core::infrastructure::adapters::DuckDbWarehouse;
use martgate_core::infrastructure::config::load_gate_config;
use martgate_core::infrastructure::fs::FsReportSink;
use tracing::info;

use crate::cli::RunArgs;

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (file -> env -> flags)
    println!("⚙️  Loading configuration...");
    let mut config = load_gate_config(args.config.as_deref(), Path::new("."))
        .context("Failed to load gate configuration")?;
    args.apply(&mut config);
    let gate = config.resolve().context("Invalid gate configuration")?;
    println!(
        "   Target: {}.{} (warehouse: {})",
        gate.database, gate.schema, gate.warehouse
    );

    // B. Open the warehouse read-only
    if !gate.db_path.exists() {
        anyhow::bail!("❌ Database not found at: {}", gate.db_path.display());
    }
    let db_path = gate.db_path.to_string_lossy();
    info!(path = %db_path, "Opening DuckDB read-only");
    let warehouse = DuckDbWarehouse::open_read_only(&db_path)
        .with_context(|| format!("Failed to open DuckDB at {}", db_path))?;

    // C. Run the Gate (Application Layer)
    match run_gate(&warehouse, &FsReportSink, &gate).await {
        Ok(outcome) => {
            print_outcome(&outcome);
            if outcome.success() {
                println!("\n✨ SUCCESS! Gate passed in {:.2?}", start.elapsed());
            } else {
                eprintln!(
                    "\n❌ FAILURE. {} checks failed.",
                    outcome.report.summary.fail
                );
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("\n💥 CRITICAL GATE ERROR: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &GateOutcome) {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Check", "Status", "Details"]);

    for check in &outcome.report.checks {
        let status = match check.status() {
            CheckStatus::Pass => "✅ PASS",
            CheckStatus::Fail => "❌ FAIL",
            CheckStatus::Warn => "⚠️  WARN",
        };
        table.add_row(vec![check.name(), status, check.details()]);
    }

    println!("{table}");
    println!("Report written to: {}", outcome.destination.display());
    println!("{}", outcome.report.summary);
}
