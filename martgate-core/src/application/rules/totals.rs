// martgate-core/src/application/rules/totals.rs

use tracing::instrument;

use crate::application::rules::{SampleQuery, missing_columns, offending_rows, read_header};
use crate::domain::check::CheckResult;
use crate::domain::settings::RuleSettings;
use crate::domain::table::{TableRef, quote_identifier};
use crate::error::MartGateError;
use crate::ports::warehouse::Warehouse;

pub const TOTAL_PAYMENTS: &str = "TOTAL_PAYMENTS";
pub const TOTAL_GMV: &str = "TOTAL_GMV";

/// Monthly revenue totals must never be negative.
#[instrument(skip(warehouse, name, settings), fields(table = %table))]
pub async fn check_non_negative(
    warehouse: &dyn Warehouse,
    table: &TableRef,
    name: String,
    settings: &RuleSettings,
) -> Result<CheckResult, MartGateError> {
    let header = read_header(warehouse, table).await?;
    let [payments, gmv] = match header.require([TOTAL_PAYMENTS, TOTAL_GMV]) {
        Ok(columns) => columns.map(|c| quote_identifier(&c)),
        Err(missing) => return Ok(missing_columns(name, &missing, &header)),
    };

    let predicate = format!("{} < 0 or {} < 0", payments, gmv);
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
        || "No negative totals found.".to_string(),
        |n| format!("Found {} rows with negative totals (showing up to {}).", n, limit),
    )
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::fixtures;
    use crate::application::sql::fetch_table;
    use crate::domain::check::CheckStatus;

    async fn run(setup: &str) -> CheckResult {
        let wh = fixtures::warehouse(setup);
        check_non_negative(&wh, &fixtures::table("REV"), "rev".into(), &RuleSettings::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_positive_totals_pass() {
        let r = run("CREATE TABLE mart.REV (total_payments DOUBLE, total_gmv DOUBLE);
             INSERT INTO mart.REV VALUES (10, 12), (0, 0);")
        .await;
        assert_eq!(r.status(), CheckStatus::Pass);
        assert_eq!(r.details(), "No negative totals found.");
    }

    #[tokio::test]
    async fn test_negative_total_fails_with_reproducible_sample() {
        let wh = fixtures::warehouse(
            "CREATE TABLE mart.REV (order_month INTEGER, total_payments DOUBLE, total_gmv DOUBLE);
             INSERT INTO mart.REV VALUES (1, 10, 12), (2, -5, 3), (3, 4, -1);",
        );
        let r = check_non_negative(&wh, &fixtures::table("REV"), "rev".into(), &RuleSettings::default())
            .await
            .unwrap();
        assert_eq!(r.status(), CheckStatus::Fail);
        assert_eq!(
            r.details(),
            "Found 2 rows with negative totals (showing up to 10)."
        );

        let rows = fetch_table(&wh, r.sample_query().unwrap()).await.unwrap();
        assert_eq!(rows.len(), 2);
        let months: Vec<i64> = rows
            .rows
            .iter()
            .filter_map(|row| row[0].as_i64())
            .collect();
        assert!(!months.contains(&1));
    }

    #[tokio::test]
    async fn test_sample_limit_caps_rows() {
        let wh = fixtures::warehouse(
            "CREATE TABLE mart.REV (total_payments DOUBLE, total_gmv DOUBLE);
             INSERT INTO mart.REV SELECT -i, 1 FROM range(5) t(i) WHERE i > 0;",
        );
        let settings = RuleSettings {
            sample_limit: 2,
            ..RuleSettings::default()
        };
        let r = check_non_negative(&wh, &fixtures::table("REV"), "rev".into(), &settings)
            .await
            .unwrap();
        assert_eq!(r.status(), CheckStatus::Fail);
        assert!(r.sample_query().unwrap().ends_with("limit 2"));
    }

    #[tokio::test]
    async fn test_missing_column_warns() {
        let r = run("CREATE TABLE mart.REV (total_payments DOUBLE, gmv DOUBLE);").await;
        assert_eq!(r.status(), CheckStatus::Warn);
        assert_eq!(
            r.details(),
            "Missing expected columns: [TOTAL_GMV]. Found: [total_payments, gmv]"
        );
    }
}
