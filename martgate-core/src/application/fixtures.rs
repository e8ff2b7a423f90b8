// martgate-core/src/application/fixtures.rs
//
// In-memory DuckDB marts shared by the rule and runner tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::domain::table::TableRef;
use crate::infrastructure::adapters::DuckDbWarehouse;

/// A mart where every rule passes.
pub const HEALTHY_MART: &str = "
    CREATE SCHEMA mart;

    CREATE TABLE mart.MART_KPI_SUMMARY (
        total_customers BIGINT, active_customers BIGINT,
        churned_customers BIGINT, churn_rate_90d DOUBLE
    );
    INSERT INTO mart.MART_KPI_SUMMARY VALUES (100, 80, 20, 0.2);

    CREATE TABLE mart.MART_MONTHLY_REVENUE (
        order_month DATE, total_payments DECIMAL(18, 2),
        total_gmv DECIMAL(18, 2), payments_gmv_diff DECIMAL(18, 2)
    );
    INSERT INTO mart.MART_MONTHLY_REVENUE VALUES
        ('2025-01-01', 1000.00, 1000.50, -0.50),
        ('2025-02-01', 1200.00, 1200.00, 0.00);

    CREATE TABLE mart.MART_MONTHLY_REVENUE_CHURN (
        order_month DATE, total_payments DOUBLE,
        churned_customer_payments DOUBLE, active_customer_payments DOUBLE
    );
    INSERT INTO mart.MART_MONTHLY_REVENUE_CHURN VALUES
        ('2025-01-01', 100, 40, 60),
        ('2025-02-01', 200, 50, 150.5);

    CREATE TABLE mart.MART_CUSTOMER_CHURN (
        customer_id VARCHAR, is_churned_90d BOOLEAN, days_since_last_order INTEGER
    );
    INSERT INTO mart.MART_CUSTOMER_CHURN VALUES
        ('c1', true, 91), ('c2', false, 30), ('c3', true, 90), ('c4', false, 89);

    CREATE TABLE mart.MART_CUSTOMER_RETENTION (cohort_month DATE, retention_rate DOUBLE);
    INSERT INTO mart.MART_CUSTOMER_RETENTION VALUES
        ('2025-01-01', 1.0), ('2025-02-01', 0.0), ('2025-03-01', 0.42);
";

/// Empty in-memory warehouse with a `mart` schema, plus `setup`.
pub fn warehouse(setup: &str) -> DuckDbWarehouse {
    let wh = DuckDbWarehouse::new(":memory:").expect("in-memory duckdb");
    wh.execute_batch("CREATE SCHEMA IF NOT EXISTS mart;")
        .expect("mart schema");
    if !setup.trim().is_empty() {
        wh.execute_batch(setup).expect("fixture setup");
    }
    wh
}

pub fn healthy() -> DuckDbWarehouse {
    let wh = DuckDbWarehouse::new(":memory:").expect("in-memory duckdb");
    wh.execute_batch(HEALTHY_MART).expect("healthy mart");
    wh
}

/// `memory.mart.<name>`
pub fn table(name: &str) -> TableRef {
    TableRef::new("memory", "mart", name).unwrap()
}
