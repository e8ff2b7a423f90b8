// martgate-core/src/application/mod.rs

#[cfg(test)]
pub(crate) mod fixtures;
pub mod gate;
pub mod rules;
pub mod runner;
pub mod sql;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI write `use martgate_core::application::{run_gate, Rule};`
// without knowing the file layout.

pub use gate::{Eligibility, existence_check_name, probe, probe_all};
pub use rules::{Rule, rules_for};
pub use runner::{GateOutcome, execute_checks, run_gate};
pub use sql::{ensure_read_only, fetch_scalar, fetch_table};
