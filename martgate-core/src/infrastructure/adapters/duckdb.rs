// martgate-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::types::ValueRef;
use duckdb::{AccessMode, Config, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// Hexagonal imports
use crate::error::MartGateError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::warehouse::{CellValue, QueryTable, Warehouse};

/// DuckDB-backed warehouse. Three-part names resolve as
/// `<file stem>.<schema>.<table>` (`memory.<schema>.<table>` in memory).
pub struct DuckDbWarehouse {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbWarehouse {
    /// Read-write handle, used to seed fixtures. `":memory:"` opens an in-memory database.
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();
        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };
        Ok(Self::from_connection(conn))
    }

    /// Read-only handle for gate runs.
    pub fn open_read_only(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        let conn = Connection::open_with_flags(db_path, config)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs setup statements (DDL, inserts). Not part of the `Warehouse` port.
    pub fn execute_batch(&self, sql: &str) -> Result<(), MartGateError> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(db_error)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, MartGateError> {
        self.conn.lock().map_err(|_| {
            MartGateError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }
}

fn db_error(e: duckdb::Error) -> MartGateError {
    MartGateError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
}

fn cell_from(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Boolean(b) => CellValue::Bool(b),
        ValueRef::TinyInt(v) => CellValue::Int(v.into()),
        ValueRef::SmallInt(v) => CellValue::Int(v.into()),
        ValueRef::Int(v) => CellValue::Int(v.into()),
        ValueRef::BigInt(v) => CellValue::Int(v),
        ValueRef::HugeInt(v) => i64::try_from(v)
            .map(CellValue::Int)
            .unwrap_or(CellValue::Float(v as f64)),
        ValueRef::UTinyInt(v) => CellValue::Int(v.into()),
        ValueRef::USmallInt(v) => CellValue::Int(v.into()),
        ValueRef::UInt(v) => CellValue::Int(v.into()),
        ValueRef::UBigInt(v) => i64::try_from(v)
            .map(CellValue::Int)
            .unwrap_or(CellValue::Float(v as f64)),
        ValueRef::Float(v) => CellValue::Float(v.into()),
        ValueRef::Double(v) => CellValue::Float(v),
        ValueRef::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>()
                .map(CellValue::Float)
                .unwrap_or(CellValue::Text(text))
        }
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        other => CellValue::Text(format!("{:?}", other)),
    }
}

#[async_trait]
impl Warehouse for DuckDbWarehouse {
    async fn query_scalar(&self, sql: &str) -> Result<CellValue, MartGateError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(db_error)?;
        let mut rows = stmt.query([]).map_err(db_error)?;

        match rows.next().map_err(db_error)? {
            Some(row) => Ok(cell_from(row.get_ref(0).map_err(db_error)?)),
            None => Ok(CellValue::Null),
        }
    }

    async fn query_table(&self, sql: &str) -> Result<QueryTable, MartGateError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(db_error)?;
        let mut rows = stmt.query([]).map_err(db_error)?;

        // The header is only known once the statement has run.
        let columns: Vec<String> = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();

        let mut data = Vec::new();
        while let Some(row) = rows.next().map_err(db_error)? {
            let mut cells = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                cells.push(cell_from(row.get_ref(i).map_err(db_error)?));
            }
            data.push(cells);
        }

        Ok(QueryTable::new(columns, data))
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}
