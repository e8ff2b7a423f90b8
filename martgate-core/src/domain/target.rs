// martgate-core/src/domain/target.rs

use std::fmt;

use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::settings::RuleSettings;
use crate::domain::table::TableRef;

/// The five mart tables the gate knows how to validate, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MartTarget {
    KpiSummary,
    MonthlyRevenue,
    MonthlyRevenueChurn,
    CustomerChurn,
    CustomerRetention,
}

impl MartTarget {
    pub const ALL: [MartTarget; 5] = [
        MartTarget::KpiSummary,
        MartTarget::MonthlyRevenue,
        MartTarget::MonthlyRevenueChurn,
        MartTarget::CustomerChurn,
        MartTarget::CustomerRetention,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MartTarget::KpiSummary => "kpi_summary",
            MartTarget::MonthlyRevenue => "monthly_revenue",
            MartTarget::MonthlyRevenueChurn => "monthly_revenue_churn",
            MartTarget::CustomerChurn => "customer_churn",
            MartTarget::CustomerRetention => "customer_retention",
        }
    }

    pub fn default_table(&self) -> &'static str {
        match self {
            MartTarget::KpiSummary => "MART_KPI_SUMMARY",
            MartTarget::MonthlyRevenue => "MART_MONTHLY_REVENUE",
            MartTarget::MonthlyRevenueChurn => "MART_MONTHLY_REVENUE_CHURN",
            MartTarget::CustomerChurn => "MART_CUSTOMER_CHURN",
            MartTarget::CustomerRetention => "MART_CUSTOMER_RETENTION",
        }
    }
}

impl fmt::Display for MartTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub target: MartTarget,
    pub table: TableRef,
}

/// What a run validates and with which knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct GatePlan {
    pub targets: Vec<ResolvedTarget>,
    pub settings: RuleSettings,
    pub max_concurrency: usize,
}

impl GatePlan {
    /// Resolves every target in `MartTarget::ALL` order under `catalog.schema`.
    pub fn resolve<F>(
        catalog: &str,
        schema: &str,
        table_for: F,
        settings: RuleSettings,
        max_concurrency: usize,
    ) -> Result<Self, DomainError>
    where
        F: Fn(MartTarget) -> String,
    {
        let targets = MartTarget::ALL
            .iter()
            .map(|&target| {
                TableRef::new(catalog, schema, table_for(target))
                    .map(|table| ResolvedTarget { target, table })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            targets,
            settings,
            max_concurrency: max_concurrency.max(1),
        })
    }

    /// Default table names, default settings, sequential execution.
    pub fn standard(catalog: &str, schema: &str) -> Result<Self, DomainError> {
        Self::resolve(
            catalog,
            schema,
            |t| t.default_table().to_string(),
            RuleSettings::default(),
            1,
        )
    }
}
