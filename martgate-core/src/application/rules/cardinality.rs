// martgate-core/src/application/rules/cardinality.rs

use tracing::instrument;

use crate::application::sql::fetch_scalar;
use crate::domain::check::CheckResult;
use crate::domain::table::TableRef;
use crate::error::MartGateError;
use crate::ports::warehouse::Warehouse;

/// Exact-equality rule: a singleton aggregate holds exactly one row.
#[instrument(skip(warehouse, name), fields(table = %table))]
pub async fn check_single_row(
    warehouse: &dyn Warehouse,
    table: &TableRef,
    name: String,
) -> Result<CheckResult, MartGateError> {
    let value = fetch_scalar(warehouse, &format!("select count(*) from {}", table)).await?;

    Ok(match value.as_i64() {
        Some(1) => CheckResult::pass(name, "Row count = 1"),
        Some(n) => CheckResult::fail(name, format!("Row count = {} (expected 1)", n)),
        None => CheckResult::fail(
            name,
            format!("Row count query returned a non-integer value: {}", value),
        ),
    })
}
