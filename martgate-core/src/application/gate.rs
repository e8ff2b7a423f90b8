// martgate-core/src/application/gate.rs

use std::collections::HashMap;

use tracing::{info, instrument, warn};

use crate::application::sql::fetch_scalar;
use crate::domain::check::CheckResult;
use crate::domain::table::TableRef;
use crate::domain::target::ResolvedTarget;
use crate::ports::warehouse::Warehouse;

/// Per-table "may run deep checks" flags, filled while probing.
#[derive(Debug, Clone, Default)]
pub struct Eligibility {
    tables: HashMap<TableRef, bool>,
}

impl Eligibility {
    pub fn record(&mut self, table: &TableRef, probe: &CheckResult) {
        self.tables.insert(table.clone(), probe.is_pass());
    }

    /// Unprobed tables are never eligible.
    pub fn is_eligible(&self, table: &TableRef) -> bool {
        self.tables.get(table).copied().unwrap_or(false)
    }
}

pub fn existence_check_name(table: &TableRef) -> String {
    format!("{} exists", table)
}

/// Minimal `count(*)` probe. Any error (connectivity, missing table,
/// permission) becomes a FAIL result instead of propagating.
#[instrument(skip(warehouse), fields(table = %table))]
pub async fn probe(warehouse: &dyn Warehouse, table: &TableRef) -> CheckResult {
    let name = existence_check_name(table);
    let sql = format!("select count(*) from {}", table);

    match fetch_scalar(warehouse, &sql).await {
        Ok(_) => {
            info!("✅ Table is queryable");
            CheckResult::pass(name, "Table is queryable.")
        }
        Err(e) => {
            warn!(error = %e, "❌ Table cannot be queried");
            CheckResult::fail(name, format!("Cannot query table: {}", e))
        }
    }
}

/// Probes every target in order; the returned results double as report items.
pub async fn probe_all(
    warehouse: &dyn Warehouse,
    targets: &[ResolvedTarget],
) -> (Vec<CheckResult>, Eligibility) {
    let mut results = Vec::with_capacity(targets.len());
    let mut eligibility = Eligibility::default();

    for target in targets {
        let result = probe(warehouse, &target.table).await;
        eligibility.record(&target.table, &result);
        results.push(result);
    }

    (results, eligibility)
}
