// martgate-core/src/application/rules/mod.rs

pub mod cardinality;
pub mod churn;
pub mod kpi;
pub mod reconciliation;
pub mod retention;
pub mod totals;

use tracing::instrument;

use crate::application::sql::fetch_table;
use crate::domain::check::CheckResult;
use crate::domain::columns::ColumnIndex;
use crate::domain::settings::RuleSettings;
use crate::domain::table::TableRef;
use crate::domain::target::MartTarget;
use crate::error::MartGateError;
use crate::ports::warehouse::Warehouse;

/// A named validation rule. Each one yields exactly one result per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    SingleRow,
    KpiConsistency,
    NonNegativeTotals,
    ReconciliationDiff,
    SplitReconciliation,
    ChurnFlagLogic,
    RetentionRateBounds,
}

impl Rule {
    pub fn slug(&self) -> &'static str {
        match self {
            Rule::SingleRow => "single_row",
            Rule::KpiConsistency => "kpi_consistency",
            Rule::NonNegativeTotals => "non_negative_totals",
            Rule::ReconciliationDiff => "reconciliation_diff",
            Rule::SplitReconciliation => "split_reconciliation",
            Rule::ChurnFlagLogic => "churn_flag_logic",
            Rule::RetentionRateBounds => "retention_rate_bounds",
        }
    }

    /// Stable check name as it appears in the report.
    pub fn check_name(&self, table: &TableRef) -> String {
        let suffix = match self {
            Rule::SingleRow => "has 1 row",
            Rule::KpiConsistency => "KPI consistency",
            Rule::NonNegativeTotals => "non-negative totals",
            Rule::ReconciliationDiff => "reconciliation diff",
            Rule::SplitReconciliation => "split reconciliation",
            Rule::ChurnFlagLogic => "churn flag logic",
            Rule::RetentionRateBounds => "retention_rate bounds",
        };
        format!("{} {}", table.label(), suffix)
    }

    /// Business-rule violations come back as FAIL/WARN results; only query
    /// errors surface as `Err`.
    pub async fn evaluate(
        &self,
        warehouse: &dyn Warehouse,
        table: &TableRef,
        settings: &RuleSettings,
    ) -> Result<CheckResult, MartGateError> {
        let name = self.check_name(table);
        match self {
            Rule::SingleRow => cardinality::check_single_row(warehouse, table, name).await,
            Rule::KpiConsistency => {
                kpi::check_kpi_consistency(warehouse, table, name, settings).await
            }
            Rule::NonNegativeTotals => {
                totals::check_non_negative(warehouse, table, name, settings).await
            }
            Rule::ReconciliationDiff => {
                reconciliation::check_reconciliation_diff(warehouse, table, name, settings).await
            }
            Rule::SplitReconciliation => {
                reconciliation::check_split_reconciliation(warehouse, table, name, settings).await
            }
            Rule::ChurnFlagLogic => {
                churn::check_flag_consistency(warehouse, table, name, settings).await
            }
            Rule::RetentionRateBounds => {
                retention::check_bounded(warehouse, table, name, settings).await
            }
        }
    }
}

/// Deep checks per target, in execution order.
pub fn rules_for(target: MartTarget) -> &'static [Rule] {
    match target {
        MartTarget::KpiSummary => &[Rule::SingleRow, Rule::KpiConsistency],
        MartTarget::MonthlyRevenue => &[Rule::NonNegativeTotals, Rule::ReconciliationDiff],
        MartTarget::MonthlyRevenueChurn => &[Rule::SplitReconciliation],
        MartTarget::CustomerChurn => &[Rule::ChurnFlagLogic],
        MartTarget::CustomerRetention => &[Rule::RetentionRateBounds],
    }
}

// --- SHARED HELPERS ---

/// Header of `table`, read once per check.
#[instrument(skip(warehouse), fields(table = %table))]
pub(crate) async fn read_header(
    warehouse: &dyn Warehouse,
    table: &TableRef,
) -> Result<ColumnIndex, MartGateError> {
    let sql = format!("select * from {} limit 1", table);
    let header = fetch_table(warehouse, &sql).await?;
    Ok(ColumnIndex::from_columns(&header.columns))
}

/// Reproduction query: the offending rows of `table`, capped at `limit`.
///
/// The check runs this exact text, so re-running it from the report returns
/// the same kind of rows.
pub(crate) struct SampleQuery<'a> {
    pub select: &'a str,
    pub table: &'a TableRef,
    pub predicate: &'a str,
    pub order_by: Option<&'a str>,
    pub limit: usize,
}

impl SampleQuery<'_> {
    pub fn to_sql(&self) -> String {
        let mut sql = format!(
            "select {}\nfrom {}\nwhere {}\n",
            self.select, self.table, self.predicate
        );
        if let Some(order) = self.order_by {
            sql.push_str(&format!("order by {}\n", order));
        }
        sql.push_str(&format!("limit {}", self.limit));
        sql
    }
}

/// Runs `query`; PASS when it returns nothing, FAIL with the query attached otherwise.
pub(crate) async fn offending_rows<P, F>(
    warehouse: &dyn Warehouse,
    name: String,
    query: SampleQuery<'_>,
    pass_details: P,
    fail_details: F,
) -> Result<CheckResult, MartGateError>
where
    P: FnOnce() -> String,
    F: FnOnce(usize) -> String,
{
    let sql = query.to_sql();
    let bad = fetch_table(warehouse, &sql).await?;
    if bad.is_empty() {
        return Ok(CheckResult::pass(name, pass_details()));
    }
    Ok(CheckResult::fail_with_sample(name, fail_details(bad.len()), sql))
}

/// WARN result for a table whose header lacks `missing`.
pub(crate) fn missing_columns(name: String, missing: &[&str], header: &ColumnIndex) -> CheckResult {
    CheckResult::warn(
        name,
        format!(
            "Missing expected columns: {}. Found: {}",
            format_list(missing),
            header.describe()
        ),
    )
}

pub(crate) fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    let joined: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    format!("[{}]", joined.join(", "))
}
