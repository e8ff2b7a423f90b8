// martgate-core/src/application/runner.rs

use std::path::PathBuf;
use std::time::Instant;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{info, instrument, warn};

use crate::application::gate::probe_all;
use crate::application::rules::{Rule, rules_for};
use crate::domain::check::{CheckResult, CheckStatus};
use crate::domain::report::{Report, ReportMetadata};
use crate::domain::table::TableRef;
use crate::domain::target::GatePlan;
use crate::error::MartGateError;
use crate::infrastructure::config::ResolvedGate;
use crate::ports::sink::ReportSink;
use crate::ports::warehouse::Warehouse;

/// Result of a full gate run.
#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub report: Report,
    /// The rendered document, exactly as persisted.
    pub document: String,
    pub destination: PathBuf,
}

impl GateOutcome {
    /// `false` when at least one check FAILed. WARN never fails the gate.
    pub fn success(&self) -> bool {
        !self.report.has_failures()
    }
}

/// Existence probes for every target, then the deep checks of the reachable ones.
///
/// Results come back in registry order whatever `max_concurrency` is. A query
/// error inside a deep check aborts the whole run.
#[instrument(skip_all, fields(targets = plan.targets.len()))]
pub async fn execute_checks(
    warehouse: &dyn Warehouse,
    plan: &GatePlan,
) -> Result<Vec<CheckResult>, MartGateError> {
    let (mut results, eligibility) = probe_all(warehouse, &plan.targets).await;

    let jobs: Vec<(Rule, &TableRef)> = plan
        .targets
        .iter()
        .filter(|t| {
            let eligible = eligibility.is_eligible(&t.table);
            if !eligible {
                warn!(table = %t.table, "⏭️  Skipping deep checks, table not queryable");
            }
            eligible
        })
        .flat_map(|t| rules_for(t.target).iter().map(move |rule| (*rule, &t.table)))
        .collect();

    let settings = &plan.settings;
    let deep: Vec<CheckResult> = stream::iter(jobs)
        .map(|(rule, table)| async move {
            rule.evaluate(warehouse, table, settings)
                .await
                .map_err(|e| MartGateError::aborted(rule.check_name(table), e))
        })
        .buffered(plan.max_concurrency.max(1))
        .try_collect()
        .await?;

    for result in &deep {
        match result.status() {
            CheckStatus::Pass => info!(check = result.name(), "✅ PASS"),
            CheckStatus::Warn => warn!(check = result.name(), details = result.details(), "⚠️  WARN"),
            CheckStatus::Fail => warn!(check = result.name(), details = result.details(), "❌ FAIL"),
        }
    }

    results.extend(deep);
    Ok(results)
}

/// Runs every check, renders the report and hands it to `sink`.
///
/// The document is written whatever the verdict; callers decide the exit
/// status from `GateOutcome::success`.
#[instrument(skip_all, fields(database = %gate.database, schema = %gate.schema))]
pub async fn run_gate(
    warehouse: &dyn Warehouse,
    sink: &dyn ReportSink,
    gate: &ResolvedGate,
) -> Result<GateOutcome, MartGateError> {
    let start = Instant::now();
    info!("🚀 Starting data quality gate...");

    let results = execute_checks(warehouse, &gate.plan).await?;

    let metadata = ReportMetadata {
        generated_utc: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        database: gate.database.clone(),
        schema: gate.schema.clone(),
        warehouse: gate.warehouse.clone(),
        engine: warehouse.engine_name().to_string(),
    };
    let report = Report::new(metadata, results);
    let document = report
        .render(gate.format)
        .map_err(|e| MartGateError::InternalError(format!("Report rendering failed: {}", e)))?;

    sink.write(&gate.destination, &document)?;

    info!(
        summary = %report.summary,
        path = ?gate.destination,
        "🏁 Gate finished in {:.2?}",
        start.elapsed()
    );

    Ok(GateOutcome {
        report,
        document,
        destination: gate.destination.clone(),
    })
}
