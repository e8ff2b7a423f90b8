// martgate-core/src/application/rules/retention.rs

use tracing::instrument;

use crate::application::rules::{SampleQuery, missing_columns, offending_rows, read_header};
use crate::domain::check::CheckResult;
use crate::domain::settings::RuleSettings;
use crate::domain::table::{TableRef, quote_identifier};
use crate::error::MartGateError;
use crate::ports::warehouse::Warehouse;

pub const RETENTION_RATE: &str = "RETENTION_RATE";

/// Retention rates are fractions in the closed interval [0, 1].
#[instrument(skip(warehouse, name, settings), fields(table = %table))]
pub async fn check_bounded(
    warehouse: &dyn Warehouse,
    table: &TableRef,
    name: String,
    settings: &RuleSettings,
) -> Result<CheckResult, MartGateError> {
    let header = read_header(warehouse, table).await?;
    let [rate] = match header.require([RETENTION_RATE]) {
        Ok(columns) => columns.map(|c| quote_identifier(&c)),
        Err(missing) => return Ok(missing_columns(name, &missing, &header)),
    };

    let predicate = format!("{rr} < 0 or {rr} > 1", rr = rate);
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
        || "All retention_rate values within [0, 1].".to_string(),
        |n| {
            format!(
                "Found {} retention_rate values outside [0, 1] (showing up to {}).",
                n, limit
            )
        },
    )
    .await
}
