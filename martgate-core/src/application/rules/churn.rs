// martgate-core/src/application/rules/churn.rs

use tracing::instrument;

use crate::application::rules::{SampleQuery, missing_columns, offending_rows, read_header};
use crate::domain::check::CheckResult;
use crate::domain::settings::RuleSettings;
use crate::domain::table::{TableRef, quote_identifier};
use crate::error::MartGateError;
use crate::ports::warehouse::Warehouse;

pub const FLAG: &str = "IS_CHURNED_90D";
pub const DAYS: &str = "DAYS_SINCE_LAST_ORDER";

/// A customer is churned exactly when `days_since_last_order >= threshold`.
///
/// The flag is cast to integer so BOOLEAN and 0/1 encodings compare the same.
#[instrument(skip(warehouse, name, settings), fields(table = %table))]
pub async fn check_flag_consistency(
    warehouse: &dyn Warehouse,
    table: &TableRef,
    name: String,
    settings: &RuleSettings,
) -> Result<CheckResult, MartGateError> {
    let header = read_header(warehouse, table).await?;
    let [flag, days] = match header.require([FLAG, DAYS]) {
        Ok(columns) => columns.map(|c| quote_identifier(&c)),
        Err(missing) => return Ok(missing_columns(name, &missing, &header)),
    };

    let threshold = settings.churn_threshold_days;
    let predicate = format!(
        "(cast({f} as integer) = 1 and {d} < {n})\n   or (cast({f} as integer) = 0 and {d} >= {n})",
        f = flag,
        d = days,
        n = threshold
    );
    let limit = settings.sample_limit;

    offending_rows(
        warehouse,
        name,
        SampleQuery {
            select: "*",
            table,
            predicate: &predicate,
            order_by: None,
            limit,
        },
        || "Churn flag aligns with days-since logic.".to_string(),
        |n| {
            format!(
                "Found {} rows where churn flag contradicts days_since_last_order (showing up to {}).",
                n, limit
            )
        },
    )
    .await
}
