// martgate-core/src/domain/table.rs

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::error::DomainError;

/// `None` only if the literal pattern failed to compile; then no name counts as plain.
fn re_identifier() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").ok())
        .as_ref()
}

/// True when `name` can be interpolated into SQL without quoting.
pub fn is_plain_identifier(name: &str) -> bool {
    re_identifier().is_some_and(|re| re.is_match(name))
}

/// Interpolation form of a column name discovered in a result header.
pub fn quote_identifier(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Fully-qualified `catalog.schema.table` reference.
///
/// The same value is used to probe a table and to key its eligibility, so
/// there is exactly one textual form of every target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableRef {
    catalog: String,
    schema: String,
    table: String,
}

impl TableRef {
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let catalog = validated("catalog", catalog.into())?;
        let schema = validated("schema", schema.into())?;
        let table = validated("table", table.into())?;
        Ok(Self {
            catalog,
            schema,
            table,
        })
    }

    /// Parses `catalog.schema.table`.
    pub fn parse(fq_name: &str) -> Result<Self, DomainError> {
        let parts: Vec<&str> = fq_name.trim().split('.').collect();
        match parts.as_slice() {
            [catalog, schema, table] => Self::new(*catalog, *schema, *table),
            _ => Err(DomainError::InvalidTableRef(fq_name.to_string())),
        }
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Short lowercase label used in check names (`mart_kpi_summary`).
    pub fn label(&self) -> String {
        self.table.to_lowercase()
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.table)
    }
}

fn validated(part: &'static str, value: String) -> Result<String, DomainError> {
    if is_plain_identifier(&value) {
        Ok(value)
    } else {
        Err(DomainError::InvalidIdentifier { part, value })
    }
}
