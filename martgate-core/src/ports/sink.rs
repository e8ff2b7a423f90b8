// martgate-core/src/ports/sink.rs

use std::path::Path;

use crate::error::MartGateError;

/// Destination for the finished report document.
pub trait ReportSink: Send + Sync {
    /// Persists `content` at `destination`, creating parent directories as needed.
    fn write(&self, destination: &Path, content: &str) -> Result<(), MartGateError>;
}
