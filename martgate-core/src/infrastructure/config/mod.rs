// martgate-core/src/infrastructure/config/mod.rs

pub mod gate;

pub use gate::{GateConfig, ResolvedGate, TableNames, apply_env_overrides, load_gate_config};
