// martgate-core/src/infrastructure/fs.rs

use crate::error::MartGateError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::sink::ReportSink;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically using a temporary file.
///
/// The temporary file lives next to the target so the final rename stays on
/// one filesystem; readers see either the old document or the new one.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;

    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Report sink backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReportSink;

impl ReportSink for FsReportSink {
    fn write(&self, destination: &Path, content: &str) -> Result<(), MartGateError> {
        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        atomic_write(destination, content)?;
        tracing::debug!(path = ?destination, bytes = content.len(), "Report persisted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("report.md");

        atomic_write(&file_path, "Initial")?;
        atomic_write(&file_path, "Updated")?;

        assert_eq!(fs::read_to_string(file_path)?, "Updated");
        Ok(())
    }

    #[test]
    fn test_sink_creates_intermediate_directories() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("reports/nightly/data_quality_report.md");

        FsReportSink.write(&target, "# Report\n")?;

        assert_eq!(fs::read_to_string(&target)?, "# Report\n");
        Ok(())
    }
}
