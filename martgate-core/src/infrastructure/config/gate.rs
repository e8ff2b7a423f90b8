// martgate-core/src/infrastructure/config/gate.rs

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::report::ReportFormat;
use crate::domain::settings::RuleSettings;
use crate::domain::target::{GatePlan, MartTarget};
use crate::error::MartGateError;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["martgate.yaml", "martgate.yml"];

/// Table names of the five mart targets, unqualified.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TableNames {
    pub kpi_summary: String,
    pub monthly_revenue: String,
    pub monthly_revenue_churn: String,
    pub customer_churn: String,
    pub customer_retention: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            kpi_summary: MartTarget::KpiSummary.default_table().to_string(),
            monthly_revenue: MartTarget::MonthlyRevenue.default_table().to_string(),
            monthly_revenue_churn: MartTarget::MonthlyRevenueChurn.default_table().to_string(),
            customer_churn: MartTarget::CustomerChurn.default_table().to_string(),
            customer_retention: MartTarget::CustomerRetention.default_table().to_string(),
        }
    }
}

impl TableNames {
    pub fn get(&self, target: MartTarget) -> &str {
        match target {
            MartTarget::KpiSummary => &self.kpi_summary,
            MartTarget::MonthlyRevenue => &self.monthly_revenue,
            MartTarget::MonthlyRevenueChurn => &self.monthly_revenue_churn,
            MartTarget::CustomerChurn => &self.customer_churn,
            MartTarget::CustomerRetention => &self.customer_retention,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct GateConfig {
    /// Catalog part of every target, also shown in the report.
    pub database: Option<String>,
    /// Mart schema holding the targets.
    pub schema: Option<String>,
    /// Compute warehouse label shown in the report.
    pub warehouse: Option<String>,

    pub db_path: String,
    pub report_path: String,
    pub format: ReportFormat,

    pub tables: TableNames,

    #[validate(nested)]
    pub rules: RuleSettings,

    #[validate(range(min = 1, max = 16))]
    pub max_concurrency: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            database: None,
            schema: None,
            warehouse: None,
            db_path: "warehouse.duckdb".to_string(),
            report_path: "reports/data_quality_report.md".to_string(),
            format: ReportFormat::default(),
            tables: TableNames::default(),
            rules: RuleSettings::default(),
            max_concurrency: 1,
        }
    }
}

/// Everything a run needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGate {
    pub plan: GatePlan,
    pub database: String,
    pub schema: String,
    pub warehouse: String,
    pub db_path: PathBuf,
    pub destination: PathBuf,
    pub format: ReportFormat,
}

impl GateConfig {
    /// Checks required settings and identifiers; this is the startup gate.
    pub fn resolve(&self) -> Result<ResolvedGate, MartGateError> {
        self.validate().map_err(InfrastructureError::InvalidConfig)?;

        let database = required("database", &self.database)?;
        let schema = required("schema", &self.schema)?;
        let warehouse = required("warehouse", &self.warehouse)?;

        let plan = GatePlan::resolve(
            &database,
            &schema,
            |target| self.tables.get(target).to_string(),
            self.rules.clone(),
            self.max_concurrency,
        )?;

        Ok(ResolvedGate {
            plan,
            database,
            schema,
            warehouse,
            db_path: PathBuf::from(&self.db_path),
            destination: PathBuf::from(&self.report_path),
            format: self.format,
        })
    }
}

fn required(name: &'static str, value: &Option<String>) -> Result<String, InfrastructureError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(InfrastructureError::MissingSetting(name)),
    }
}

// --- LOADER ---

/// Layering: file (explicit path, else `martgate.yaml` in `search_dir`, else
/// defaults) then `MARTGATE_*` environment variables. CLI flags go on top.
#[instrument]
pub fn load_gate_config(
    explicit: Option<&Path>,
    search_dir: &Path,
) -> Result<GateConfig, InfrastructureError> {
    let path = match explicit {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => return Err(InfrastructureError::ConfigNotFound(p.display().to_string())),
        None => find_config(search_dir),
    };

    let mut config = match path {
        Some(p) => {
            info!(path = ?p, "Loading gate configuration");
            load_fragment::<GateConfig>(&p)?
        }
        None => {
            info!("No martgate.yaml found, using defaults");
            GateConfig::default()
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Applies `MARTGATE_*` overrides read through `lookup` (usually `std::env::var`).
pub fn apply_env_overrides<F>(config: &mut GateConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(val) = set("MARTGATE_DATABASE") {
        info!(new = %val, "Overriding database via ENV");
        config.database = Some(val);
    }
    if let Some(val) = set("MARTGATE_SCHEMA") {
        info!(new = %val, "Overriding schema via ENV");
        config.schema = Some(val);
    }
    if let Some(val) = set("MARTGATE_WAREHOUSE") {
        info!(new = %val, "Overriding warehouse via ENV");
        config.warehouse = Some(val);
    }
    if let Some(val) = set("MARTGATE_DB_PATH") {
        info!(old = ?config.db_path, new = %val, "Overriding db path via ENV");
        config.db_path = val;
    }
    if let Some(val) = set("MARTGATE_REPORT_PATH") {
        info!(old = ?config.report_path, new = %val, "Overriding report path via ENV");
        config.report_path = val;
    }
}
