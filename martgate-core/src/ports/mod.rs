// martgate-core/src/ports/mod.rs

pub mod sink;
pub mod warehouse;

pub use sink::ReportSink;
pub use warehouse::{CellValue, QueryTable, Warehouse};
