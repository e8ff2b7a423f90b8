// martgate-core/src/application/rules/reconciliation.rs
//
// Revenue reconciliation: the upstream payments-vs-GMV diff column, and the
// churned/active split of monthly payments.

use tracing::{debug, instrument};

use crate::application::rules::{SampleQuery, missing_columns, offending_rows, read_header};
use crate::domain::check::CheckResult;
use crate::domain::columns::ColumnIndex;
use crate::domain::settings::RuleSettings;
use crate::domain::table::{TableRef, quote_identifier};
use crate::error::MartGateError;
use crate::ports::warehouse::Warehouse;

pub const ORDER_MONTH: &str = "ORDER_MONTH";
pub const TOTAL_PAYMENTS: &str = "TOTAL_PAYMENTS";
pub const CHURNED_PAYMENTS: &str = "CHURNED_CUSTOMER_PAYMENTS";
pub const ACTIVE_PAYMENTS: &str = "ACTIVE_CUSTOMER_PAYMENTS";

/// Picks the diff column: the pinned one when configured, otherwise the
/// lexicographically first column carrying a marker.
pub fn select_diff_column<'h>(
    header: &'h ColumnIndex,
    settings: &RuleSettings,
) -> Result<&'h str, String> {
    if let Some(pinned) = settings.recon_column.as_deref() {
        return header.resolve(pinned).ok_or_else(|| {
            format!(
                "Configured recon column {} not found. Columns: {}",
                pinned,
                header.describe()
            )
        });
    }

    header
        .matching(&settings.recon_markers)
        .first()
        .copied()
        .ok_or_else(|| format!("No recon/diff column found. Columns: {}", header.describe()))
}

/// Every `|diff|` must stay within `recon_abs_tolerance`.
#[instrument(skip(warehouse, name, settings), fields(table = %table))]
pub async fn check_reconciliation_diff(
    warehouse: &dyn Warehouse,
    table: &TableRef,
    name: String,
    settings: &RuleSettings,
) -> Result<CheckResult, MartGateError> {
    let header = read_header(warehouse, table).await?;
    let diff_col = match select_diff_column(&header, settings) {
        Ok(col) => col.to_string(),
        Err(details) => return Ok(CheckResult::warn(name, details)),
    };
    debug!(column = %diff_col, "Reconciliation column selected");

    let diff = quote_identifier(&diff_col);
    let select = match header.resolve(ORDER_MONTH) {
        Some(month) => format!("{}, {}", quote_identifier(month), diff),
        None => "*".to_string(),
    };
    let tol = settings.recon_abs_tolerance;
    let predicate = format!("abs({}) > {}", diff, tol);
    let order_by = format!("abs({}) desc", diff);
    let limit = settings.sample_limit;

    offending_rows(
        warehouse,
        name,
        SampleQuery {
            select: &select,
            table,
            predicate: &predicate,
            order_by: Some(&order_by),
            limit,
        },
        || format!("All |{}| <= {}.", diff_col, tol),
        |n| {
            format!(
                "Found {} months with |{}| > {} (showing up to {}).",
                n, diff_col, tol, limit
            )
        },
    )
    .await
}

/// Churned + active payments must add up to the total, and none may be negative.
#[instrument(skip(warehouse, name, settings), fields(table = %table))]
pub async fn check_split_reconciliation(
    warehouse: &dyn Warehouse,
    table: &TableRef,
    name: String,
    settings: &RuleSettings,
) -> Result<CheckResult, MartGateError> {
    let header = read_header(warehouse, table).await?;
    let [total, churned, active] =
        match header.require([TOTAL_PAYMENTS, CHURNED_PAYMENTS, ACTIVE_PAYMENTS]) {
            Ok(columns) => columns.map(|c| quote_identifier(&c)),
            Err(missing) => return Ok(missing_columns(name, &missing, &header)),
        };

    let tol = settings.split_abs_tolerance;
    let predicate = format!(
        "abs(({c} + {a}) - {t}) > {tol}\n   or {t} < 0 or {c} < 0 or {a} < 0",
        c = churned,
        a = active,
        t = total,
        tol = tol
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
        || format!("Split sums + non-negative checks pass (tol={}).", tol),
        |n| {
            format!(
                "Found {} rows failing split/non-negative checks (showing up to {}).",
                n, limit
            )
        },
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

    async fn diff(setup: &str, settings: &RuleSettings) -> CheckResult {
        let wh = fixtures::warehouse(setup);
        check_reconciliation_diff(&wh, &fixtures::table("REV"), "rev".into(), settings)
            .await
            .unwrap()
    }

    async fn split(rows: &str) -> CheckResult {
        let wh = fixtures::warehouse(&format!(
            "CREATE TABLE mart.SPLIT (order_month DATE, total_payments DOUBLE,
                churned_customer_payments DOUBLE, active_customer_payments DOUBLE);
             INSERT INTO mart.SPLIT VALUES {};",
            rows
        ));
        check_split_reconciliation(&wh, &fixtures::table("SPLIT"), "split".into(), &RuleSettings::default())
            .await
            .unwrap()
    }

    #[test]
    fn test_diff_column_tie_break_and_pin() {
        let header = ColumnIndex::from_columns(["order_month", "recon_gap", "payments_gmv_diff"]);
        let settings = RuleSettings::default();
        assert_eq!(select_diff_column(&header, &settings).unwrap(), "payments_gmv_diff");

        let pinned = RuleSettings {
            recon_column: Some("RECON_GAP".into()),
            ..RuleSettings::default()
        };
        assert_eq!(select_diff_column(&header, &pinned).unwrap(), "recon_gap");

        let absent = RuleSettings {
            recon_column: Some("nope".into()),
            ..RuleSettings::default()
        };
        assert!(
            select_diff_column(&header, &absent)
                .unwrap_err()
                .starts_with("Configured recon column nope not found")
        );
    }

    #[tokio::test]
    async fn test_diff_within_tolerance_passes() {
        let r = diff(
            "CREATE TABLE mart.REV (order_month DATE, payments_gmv_diff DOUBLE);
             INSERT INTO mart.REV VALUES ('2025-01-01', 0.5), ('2025-02-01', -1.0);",
            &RuleSettings::default(),
        )
        .await;
        assert_eq!(r.status(), CheckStatus::Pass);
        assert_eq!(r.details(), "All |payments_gmv_diff| <= 1.");
    }

    #[tokio::test]
    async fn test_diff_over_tolerance_fails_ordered_by_magnitude() {
        let wh = fixtures::warehouse(
            "CREATE TABLE mart.REV (order_month DATE, payments_gmv_diff DOUBLE);
             INSERT INTO mart.REV VALUES
                ('2025-01-01', 2.0), ('2025-02-01', -7.5), ('2025-03-01', 0.2);",
        );
        let r = check_reconciliation_diff(&wh, &fixtures::table("REV"), "rev".into(), &RuleSettings::default())
            .await
            .unwrap();
        assert_eq!(r.status(), CheckStatus::Fail);

        let sample = r.sample_query().unwrap();
        assert!(sample.starts_with("select order_month, payments_gmv_diff\n"));
        let rows = fetch_table(&wh, sample).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[0][1].as_f64(), Some(-7.5));
    }

    #[tokio::test]
    async fn test_no_diff_column_warns() {
        let r = diff(
            "CREATE TABLE mart.REV (order_month DATE, total_payments DOUBLE);",
            &RuleSettings::default(),
        )
        .await;
        assert_eq!(r.status(), CheckStatus::Warn);
        assert_eq!(
            r.details(),
            "No recon/diff column found. Columns: [order_month, total_payments]"
        );
    }

    #[tokio::test]
    async fn test_diff_without_order_month_selects_all() {
        let r = diff(
            "CREATE TABLE mart.REV (month_key INTEGER, gmv_recon DOUBLE);
             INSERT INTO mart.REV VALUES (1, 5.0);",
            &RuleSettings::default(),
        )
        .await;
        assert_eq!(r.status(), CheckStatus::Fail);
        assert!(r.sample_query().unwrap().starts_with("select *\n"));
    }

    #[tokio::test]
    async fn test_split_sums_pass() {
        let r = split("('2025-01-01', 100, 40, 60)").await;
        assert_eq!(r.status(), CheckStatus::Pass);
        assert_eq!(r.details(), "Split sums + non-negative checks pass (tol=1).");
    }

    #[tokio::test]
    async fn test_split_mismatch_fails() {
        let r = split("('2025-01-01', 100, 40, 62)").await;
        assert_eq!(r.status(), CheckStatus::Fail);
        assert!(r.sample_query().unwrap().contains("or total_payments < 0"));
    }

    #[tokio::test]
    async fn test_split_negative_part_fails_even_when_balanced() {
        let r = split("('2025-01-01', 100, -10, 110)").await;
        assert_eq!(r.status(), CheckStatus::Fail);
    }

    #[tokio::test]
    async fn test_split_missing_columns_warns() {
        let wh = fixtures::warehouse("CREATE TABLE mart.SPLIT (total_payments DOUBLE);");
        let r = check_split_reconciliation(&wh, &fixtures::table("SPLIT"), "split".into(), &RuleSettings::default())
            .await
            .unwrap();
        assert_eq!(r.status(), CheckStatus::Warn);
        assert!(r.details().contains("[CHURNED_CUSTOMER_PAYMENTS, ACTIVE_CUSTOMER_PAYMENTS]"));
    }

    #[tokio::test]
    async fn test_split_sample_returns_only_offending_rows() {
        let wh = fixtures::warehouse(
            "CREATE TABLE mart.SPLIT (month_no INTEGER, total_payments DOUBLE,
                churned_customer_payments DOUBLE, active_customer_payments DOUBLE);
             INSERT INTO mart.SPLIT VALUES
                (1, 100, 40, 60), (2, 100, 40, 62), (3, 200, 50, 150.5),
                (4, 100, -10, 110), (5, 80, 20, 60);",
        );
        let r = check_split_reconciliation(&wh, &fixtures::table("SPLIT"), "split".into(), &RuleSettings::default())
            .await
            .unwrap();
        assert_eq!(r.status(), CheckStatus::Fail);

        let rows = fetch_table(&wh, r.sample_query().unwrap()).await.unwrap();
        let mut months: Vec<i64> = rows.rows.iter().filter_map(|row| row[0].as_i64()).collect();
        months.sort_unstable();
        assert_eq!(months, vec![2, 4]);
    }
}
