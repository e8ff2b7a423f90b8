// martgate/src/commands/mod.rs

pub mod checks;
pub mod run;
