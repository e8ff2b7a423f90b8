// martgate-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid identifier '{value}' for {part}")]
    #[diagnostic(
        code(martgate::domain::identifier),
        help("Identifiers must match [A-Za-z_][A-Za-z0-9_$]* (no quoting, no dots).")
    )]
    InvalidIdentifier { part: &'static str, value: String },

    #[error("Invalid table reference '{0}': expected catalog.schema.table")]
    #[diagnostic(code(martgate::domain::table_ref))]
    InvalidTableRef(String),

    #[error("Refusing to run non read-only statement: {0}")]
    #[diagnostic(
        code(martgate::domain::unsafe_statement),
        help("Checks may only issue a single SELECT query.")
    )]
    UnsafeStatement(String),
}
