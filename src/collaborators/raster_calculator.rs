use super::{ExternalServiceError, ToolInvocation};
use crate::event;
use async_trait::async_trait;
use std::path::Path;

/// Runs raster tools (`gdal_calc.py`, `gdal_translate`, `gdaldem`, `ogr2ogr`).
#[async_trait(?Send)]
pub trait RasterCalculator {
    /// Runs `invocation` with `workdir` as working directory and waits for it.
    async fn execute(&self, invocation: &ToolInvocation, workdir: &Path)
    -> Result<(), ExternalServiceError>;
}

/// Spawns the tools as child processes.
#[derive(Debug, Default)]
pub struct ProcessRasterCalculator;

/// Number of trailing stderr bytes kept in error messages.
const STDERR_TAIL: usize = 2048;

#[async_trait(?Send)]
impl RasterCalculator for ProcessRasterCalculator {
    async fn execute(
        &self,
        invocation: &ToolInvocation,
        workdir: &Path,
    ) -> Result<(), ExternalServiceError> {
        event!("Running '{invocation}' in {}", workdir.display());
        let output = tokio::process::Command::new(invocation.program())
            .args(invocation.args())
            .current_dir(workdir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ExternalServiceError::Spawn {
                program: invocation.program().to_string(),
                source,
            })?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let start = stderr.len().saturating_sub(STDERR_TAIL);
        let tail = stderr.get(start..).unwrap_or(&stderr).trim().to_string();
        Err(ExternalServiceError::Tool {
            program: invocation.program().to_string(),
            status: output.status.code(),
            stderr: tail,
        })
    }
}
