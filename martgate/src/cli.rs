// martgate/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use martgate_core::domain::report::ReportFormat;
use martgate_core::infrastructure::config::GateConfig;

#[derive(Parser)]
#[command(name = "martgate")]
#[command(about = "Post-transformation data quality gate for analytics marts", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚦 Validates the mart tables and writes the data quality report
    Run(RunArgs),

    /// 📋 Lists the registered checks without touching the warehouse
    Checks {
        /// Gate configuration file (default: ./martgate.yaml if present)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Gate configuration file (default: ./martgate.yaml if present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// DuckDB database file holding the marts
    #[arg(long)]
    pub db_path: Option<String>,

    /// Database (catalog) of the mart tables
    #[arg(long)]
    pub database: Option<String>,

    /// Mart schema
    #[arg(long)]
    pub schema: Option<String>,

    /// Warehouse label recorded in the report
    #[arg(long)]
    pub warehouse: Option<String>,

    /// Report destination
    #[arg(long)]
    pub report: Option<String>,

    /// Report format: markdown | json
    #[arg(long)]
    pub format: Option<ReportFormat>,
}

impl RunArgs {
    /// Flags win over the file and the environment.
    pub fn apply(&self, config: &mut GateConfig) {
        if let Some(v) = &self.db_path {
            config.db_path = v.clone();
        }
        if let Some(v) = &self.database {
            config.database = Some(v.clone());
        }
        if let Some(v) = &self.schema {
            config.schema = Some(v.clone());
        }
        if let Some(v) = &self.warehouse {
            config.warehouse = Some(v.clone());
        }
        if let Some(v) = &self.report {
            config.report_path = v.clone();
        }
        if let Some(v) = self.format {
            config.format = v;
        }
    }
}
