// martgate-core/src/application/rules/kpi.rs

use std::collections::BTreeMap;

use tracing::instrument;

use crate::application::rules::format_list;
use crate::application::sql::{fetch_scalar, fetch_table};
use crate::domain::check::CheckResult;
use crate::domain::settings::RuleSettings;
use crate::domain::table::TableRef;
use crate::error::MartGateError;
use crate::ports::warehouse::{CellValue, Warehouse};

pub const TOTAL: &str = "TOTAL_CUSTOMERS";
pub const ACTIVE: &str = "ACTIVE_CUSTOMERS";
pub const CHURNED: &str = "CHURNED_CUSTOMERS";
pub const CHURN_RATE: &str = "CHURN_RATE_90D";

const REQUIRED: [&str; 4] = [TOTAL, ACTIVE, CHURNED, CHURN_RATE];

/// Cross-column relationships of the single KPI summary row.
#[instrument(skip(warehouse, name, settings), fields(table = %table))]
pub async fn check_kpi_consistency(
    warehouse: &dyn Warehouse,
    table: &TableRef,
    name: String,
    settings: &RuleSettings,
) -> Result<CheckResult, MartGateError> {
    // Two rows are enough to tell "exactly one" apart; the count is only
    // needed for the detail of a malformed table.
    let data = fetch_table(warehouse, &format!("select * from {} limit 2", table)).await?;

    if let (1, Some(values)) = (data.len(), data.row(0)) {
        return Ok(assess_kpi_row(name, &data.columns, values, settings));
    }

    let count = fetch_scalar(warehouse, &format!("select count(*) from {}", table)).await?;
    Ok(CheckResult::fail(
        name,
        format!("Not exactly 1 row (found {}); cannot validate KPIs.", count),
    ))
}

/// Evaluates every invariant and reports all violations together.
///
/// NULL metrics skip the invariants that need them.
pub fn assess_kpi_row(
    name: String,
    columns: &[String],
    values: &[CellValue],
    settings: &RuleSettings,
) -> CheckResult {
    let row: BTreeMap<String, &CellValue> = columns
        .iter()
        .map(|c| c.to_uppercase())
        .zip(values.iter())
        .collect();

    let missing: Vec<&str> = REQUIRED
        .iter()
        .copied()
        .filter(|c| !row.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return CheckResult::warn(
            name,
            format!(
                "Missing expected columns: {}. Found: {}",
                format_list(&missing),
                format_list(columns)
            ),
        );
    }

    let mut issues: Vec<String> = Vec::new();
    let mut metric = |column: &str| -> Option<f64> {
        let value = row.get(column)?;
        if value.is_null() {
            return None;
        }
        let numeric = value.as_f64();
        if numeric.is_none() {
            issues.push(format!("{} is not numeric ({})", column, value));
        }
        numeric
    };

    let total = metric(TOTAL);
    let active = metric(ACTIVE);
    let churned = metric(CHURNED);
    let churn_rate = metric(CHURN_RATE);

    if let (Some(total), Some(active)) = (total, active)
        && active > total
    {
        issues.push(format!("{} ({}) > {} ({})", ACTIVE, active, TOTAL, total));
    }

    if let (Some(total), Some(active), Some(churned)) = (total, active, churned)
        && ((active + churned) - total).abs() > settings.kpi_count_tolerance
    {
        issues.push(format!(
            "ACTIVE + CHURNED != TOTAL ({}+{} != {})",
            active, churned, total
        ));
    }

    if let (Some(total), Some(churned), Some(rate)) = (total, churned, churn_rate)
        && total > 0.0
    {
        let expected = churned / total;
        if (expected - rate).abs() > settings.churn_rate_tolerance {
            issues.push(format!(
                "{} mismatch: expected {:.6}, got {:.6} (tol={})",
                CHURN_RATE, expected, rate, settings.churn_rate_tolerance
            ));
        }
    }

    if issues.is_empty() {
        CheckResult::pass(name, "KPI relationships look consistent.")
    } else {
        CheckResult::fail(name, issues.join("; "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::fixtures;
    use crate::domain::check::CheckStatus;

    fn cols() -> Vec<String> {
        ["total_customers", "active_customers", "churned_customers", "churn_rate_90d"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn kpis(total: i64, active: i64, churned: i64, rate: f64) -> Vec<CellValue> {
        vec![
            CellValue::Int(total),
            CellValue::Int(active),
            CellValue::Int(churned),
            CellValue::Float(rate),
        ]
    }

    fn assess(values: Vec<CellValue>, settings: &RuleSettings) -> CheckResult {
        assess_kpi_row("kpi".into(), &cols(), &values, settings)
    }

    #[test]
    fn test_consistent_kpis_pass() {
        let r = assess(kpis(100, 80, 20, 0.2), &RuleSettings::default());
        assert_eq!(r.status(), CheckStatus::Pass);
    }

    #[test]
    fn test_partition_mismatch_fails() {
        let r = assess(kpis(100, 81, 20, 0.2), &RuleSettings::default());
        assert_eq!(r.status(), CheckStatus::Fail);
        assert!(r.details().contains("ACTIVE + CHURNED != TOTAL"));
        assert_eq!(r.sample_query(), None);
    }

    #[test]
    fn test_churn_rate_tolerance() {
        let r = assess(kpis(100, 80, 20, 0.21), &RuleSettings::default());
        assert_eq!(r.status(), CheckStatus::Fail);
        assert!(r.details().contains("CHURN_RATE_90D mismatch"));

        let loose = RuleSettings {
            churn_rate_tolerance: 0.02,
            ..RuleSettings::default()
        };
        let r = assess(kpis(100, 80, 20, 0.21), &loose);
        assert_eq!(r.status(), CheckStatus::Pass);
    }

    #[test]
    fn test_violations_accumulate() {
        // active > total, the partition is off, and the rate disagrees.
        let r = assess(kpis(100, 120, 20, 0.5), &RuleSettings::default());
        assert_eq!(r.status(), CheckStatus::Fail);
        let details = r.details();
        assert!(details.contains("ACTIVE_CUSTOMERS (120) > TOTAL_CUSTOMERS (100)"));
        assert!(details.contains("ACTIVE + CHURNED != TOTAL (120+20 != 100)"));
        assert!(details.contains("expected 0.200000, got 0.500000"));
        assert_eq!(details.matches("; ").count(), 2);
    }

    #[test]
    fn test_count_tolerance_is_configurable() {
        let fuzzy = RuleSettings {
            kpi_count_tolerance: 1.0,
            ..RuleSettings::default()
        };
        let r = assess(kpis(100, 81, 20, 0.2), &fuzzy);
        assert_eq!(r.status(), CheckStatus::Pass);
    }

    #[test]
    fn test_zero_total_skips_rate_invariant() {
        let r = assess(kpis(0, 0, 0, 0.7), &RuleSettings::default());
        assert_eq!(r.status(), CheckStatus::Pass);
    }

    #[test]
    fn test_missing_column_warns_regardless_of_data() {
        let columns: Vec<String> = vec!["TOTAL_CUSTOMERS".into(), "ACTIVE_CUSTOMERS".into()];
        let values = vec![CellValue::Int(1), CellValue::Int(999)];
        let r = assess_kpi_row("kpi".into(), &columns, &values, &RuleSettings::default());
        assert_eq!(r.status(), CheckStatus::Warn);
        assert_eq!(
            r.details(),
            "Missing expected columns: [CHURNED_CUSTOMERS, CHURN_RATE_90D]. Found: [TOTAL_CUSTOMERS, ACTIVE_CUSTOMERS]"
        );
    }

    #[test]
    fn test_null_and_text_metrics() {
        let mut values = kpis(100, 80, 20, 0.2);
        values[3] = CellValue::Null;
        assert_eq!(
            assess(values, &RuleSettings::default()).status(),
            CheckStatus::Pass
        );

        let mut values = kpis(100, 80, 20, 0.2);
        values[0] = CellValue::Text("n/a".into());
        let r = assess(values, &RuleSettings::default());
        assert_eq!(r.status(), CheckStatus::Fail);
        assert!(r.details().contains("TOTAL_CUSTOMERS is not numeric (n/a)"));
    }

    #[tokio::test]
    async fn test_against_duckdb() {
        let wh = fixtures::healthy();
        let t = fixtures::table("MART_KPI_SUMMARY");
        let r = check_kpi_consistency(&wh, &t, "kpi".into(), &RuleSettings::default())
            .await
            .unwrap();
        assert_eq!(r.status(), CheckStatus::Pass);

        wh.execute_batch("INSERT INTO mart.MART_KPI_SUMMARY VALUES (1, 1, 0, 0.0);")
            .unwrap();
        let r = check_kpi_consistency(&wh, &t, "kpi".into(), &RuleSettings::default())
            .await
            .unwrap();
        assert_eq!(r.status(), CheckStatus::Fail);
        assert!(r.details().starts_with("Not exactly 1 row (found 2)"));
    }

    #[tokio::test]
    async fn test_row_count_detail_reports_full_table_size() {
        let wh = fixtures::warehouse(
            "CREATE TABLE mart.KPI (total_customers BIGINT, active_customers BIGINT,
                churned_customers BIGINT, churn_rate_90d DOUBLE);
             INSERT INTO mart.KPI SELECT 100, 80, 20, 0.2 FROM range(5);",
        );
        let r = check_kpi_consistency(&wh, &fixtures::table("KPI"), "kpi".into(), &RuleSettings::default())
            .await
            .unwrap();
        assert_eq!(r.status(), CheckStatus::Fail);
        assert_eq!(r.details(), "Not exactly 1 row (found 5); cannot validate KPIs.");

        wh.execute_batch("DELETE FROM mart.KPI;").unwrap();
        let r = check_kpi_consistency(&wh, &fixtures::table("KPI"), "kpi".into(), &RuleSettings::default())
            .await
            .unwrap();
        assert_eq!(r.details(), "Not exactly 1 row (found 0); cannot validate KPIs.");
    }
}
