// martgate-core/src/application/sql.rs

use std::time::Instant;

use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use tracing::{debug, error, instrument};

use crate::domain::error::DomainError;
use crate::error::MartGateError;
use crate::ports::warehouse::{CellValue, QueryTable, Warehouse};

/// Accepts exactly one query statement; anything else never reaches the warehouse.
pub fn ensure_read_only(sql: &str) -> Result<(), DomainError> {
    let statements = Parser::parse_sql(&GenericDialect {}, sql)
        .map_err(|e| DomainError::UnsafeStatement(format!("{} ({})", sql.trim(), e)))?;

    match statements.as_slice() {
        [Statement::Query(_)] => Ok(()),
        _ => Err(DomainError::UnsafeStatement(sql.trim().to_string())),
    }
}

/// Guarded, timed `query_table`.
#[instrument(skip(warehouse, sql), fields(query.len = sql.len()))]
pub async fn fetch_table(warehouse: &dyn Warehouse, sql: &str) -> Result<QueryTable, MartGateError> {
    ensure_read_only(sql)?;
    let start = Instant::now();
    debug!("⚡ Executing Query: {}", sql);

    let result = warehouse.query_table(sql).await;
    match &result {
        Ok(table) => debug!(rows = table.len(), "✅ Query finished in {:.2?}", start.elapsed()),
        Err(e) => error!("❌ Query failed after {:.2?}: {}", start.elapsed(), e),
    }
    result
}

/// Guarded, timed `query_scalar`.
#[instrument(skip(warehouse, sql), fields(query.len = sql.len()))]
pub async fn fetch_scalar(warehouse: &dyn Warehouse, sql: &str) -> Result<CellValue, MartGateError> {
    ensure_read_only(sql)?;
    let start = Instant::now();
    debug!("⚡ Executing Query: {}", sql);

    let result = warehouse.query_scalar(sql).await;
    match &result {
        Ok(_) => debug!("✅ Query finished in {:.2?}", start.elapsed()),
        Err(e) => error!("❌ Query failed after {:.2?}: {}", start.elapsed(), e),
    }
    result
}
