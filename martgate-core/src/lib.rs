// martgate-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// What the gate needs from the outside world: a warehouse and a document sink.
pub mod ports;

// 2. Domain
// Result model, table references, column lookup, report synthesis.
// Depends on nothing but the ports' value types.
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB warehouse, filesystem sink, configuration files.
pub mod infrastructure;

// 4. Application (Use Cases)
// Check registry, existence gate, run coordinator.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::MartGateError;
