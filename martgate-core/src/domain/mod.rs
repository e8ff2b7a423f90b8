// martgate-core/src/domain/mod.rs

pub mod check;
pub mod columns;
pub mod error;
pub mod report;
pub mod settings;
pub mod table;
pub mod target;

// Re-exports
pub use check::{CheckResult, CheckStatus, StatusCounts};
pub use columns::ColumnIndex;
pub use error::DomainError;
pub use report::{Report, ReportFormat, ReportMetadata};
pub use settings::RuleSettings;
pub use table::TableRef;
pub use target::{GatePlan, MartTarget, ResolvedTarget};
