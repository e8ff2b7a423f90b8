// martgate/src/commands/checks.rs
//
// USE CASE: List the check registry.

use std::path::{Path, PathBuf};

use anyhow::Context;
use comfy_table::Table;
use martgate_core::application::{existence_check_name, rules_for};
use martgate_core::domain::target::GatePlan;
use martgate_core::infrastructure::config::load_gate_config;

pub fn execute(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_gate_config(config_path.as_deref(), Path::new("."))
        .context("Failed to load gate configuration")?;

    // Placeholders keep the listing available before the target is configured.
    let database = config.database.as_deref().unwrap_or("DATABASE");
    let schema = config.schema.as_deref().unwrap_or("SCHEMA");
    let plan = GatePlan::resolve(
        database,
        schema,
        |target| config.tables.get(target).to_string(),
        config.rules.clone(),
        config.max_concurrency,
    )
    .context("Invalid table identifiers in configuration")?;

    let mut table = Table::new();
    table.set_header(vec!["Target", "Table", "Rule", "Check"]);

    for target in &plan.targets {
        let fq = target.table.to_string();
        table.add_row(vec![
            target.target.key().to_string(),
            fq.clone(),
            "exists".to_string(),
            existence_check_name(&target.table),
        ]);
        for rule in rules_for(target.target) {
            table.add_row(vec![
                target.target.key().to_string(),
                fq.clone(),
                rule.slug().to_string(),
                rule.check_name(&target.table),
            ]);
        }
    }

    println!("{table}");
    Ok(())
}
