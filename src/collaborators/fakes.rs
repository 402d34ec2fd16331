use super::{
    BoundingBox, CoverageExtent, CoverageStoreKind, CoverageUpdate, ExternalServiceError, JobInfo,
    MapServerClient, RasterCalculator, ReconstructionJobClient, TaskOption, ToolInvocation,
};
use async_trait::async_trait;
use image::{ImageFormat, Luma, GrayImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

fn failure(what: &str) -> ExternalServiceError {
    ExternalServiceError::InvalidInput(format!("injected failure in {what}"))
}

/// Recording job client; `fail_on` makes the named operation fail.
#[derive(Debug, Default)]
pub(crate) struct FakeJobClient {
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) fail_on: Option<&'static str>,
}

impl FakeJobClient {
    pub(crate) fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }

    fn record(&self, op: &'static str, detail: String) -> Result<(), ExternalServiceError> {
        self.calls.lock().unwrap().push(format!("{op} {detail}"));
        if self.fail_on == Some(op) { Err(failure(op)) } else { Ok(()) }
    }
}

#[async_trait(?Send)]
impl ReconstructionJobClient for FakeJobClient {
    async fn init_job(
        &self,
        job: Uuid,
        name: &str,
        webhook: &str,
        options: &[TaskOption],
    ) -> Result<(), ExternalServiceError> {
        let opts = serde_json::to_string(options).unwrap();
        self.record("init_job", format!("{job} {name} {webhook} {opts}"))
    }

    async fn upload_images(&self, job: Uuid, images: &[PathBuf]) -> Result<(), ExternalServiceError> {
        self.record("upload_images", format!("{job} {}", images.len()))
    }

    async fn commit_job(&self, job: Uuid) -> Result<(), ExternalServiceError> {
        self.record("commit_job", job.to_string())
    }

    async fn job_info(&self, job: Uuid) -> Result<JobInfo, ExternalServiceError> {
        self.record("job_info", job.to_string())?;
        Ok(JobInfo { processing_time: 61_000, progress: 42.5, num_images: 17 })
    }

    async fn remove_job(&self, job: Uuid) -> Result<(), ExternalServiceError> {
        self.record("remove_job", job.to_string())
    }
}

/// Recording map server; `fail_on` makes the named operation fail.
#[derive(Debug, Default)]
pub(crate) struct FakeMapServer {
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) fail_on: Option<&'static str>,
}

impl FakeMapServer {
    pub(crate) fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }

    fn record(&self, op: &'static str, detail: String) -> Result<(), ExternalServiceError> {
        self.calls.lock().unwrap().push(format!("{op} {detail}"));
        if self.fail_on == Some(op) { Err(failure(op)) } else { Ok(()) }
    }
}

#[async_trait(?Send)]
impl MapServerClient for FakeMapServer {
    async fn create_workspace(&self, workspace: &str) -> Result<(), ExternalServiceError> {
        self.record("create_workspace", workspace.to_string())
    }

    async fn delete_workspace(&self, workspace: &str) -> Result<(), ExternalServiceError> {
        self.record("delete_workspace", workspace.to_string())
    }

    async fn create_coverage_store(
        &self,
        workspace: &str,
        store: &str,
        kind: CoverageStoreKind,
        file_url: &str,
    ) -> Result<(), ExternalServiceError> {
        self.record("create_coverage_store", format!("{workspace} {store} {kind} {file_url}"))
    }

    async fn update_coverage(
        &self,
        workspace: &str,
        store: &str,
        coverage: &str,
        update: &CoverageUpdate,
    ) -> Result<(), ExternalServiceError> {
        let body = serde_json::to_string(update).unwrap();
        self.record("update_coverage", format!("{workspace} {store} {coverage} {body}"))
    }

    async fn set_default_style(
        &self,
        workspace: &str,
        layer: &str,
        style: &str,
    ) -> Result<(), ExternalServiceError> {
        self.record("set_default_style", format!("{workspace} {layer} {style}"))
    }

    async fn create_shapefile_store(
        &self,
        workspace: &str,
        store: &str,
        file_url: &str,
    ) -> Result<(), ExternalServiceError> {
        self.record("create_shapefile_store", format!("{workspace} {store} {file_url}"))
    }

    async fn create_feature_type(
        &self,
        workspace: &str,
        store: &str,
        name: &str,
        srs: &str,
    ) -> Result<(), ExternalServiceError> {
        self.record("create_feature_type", format!("{workspace} {store} {name} {srs}"))
    }

    async fn coverage_extent(
        &self,
        workspace: &str,
        store: &str,
        coverage: &str,
    ) -> Result<CoverageExtent, ExternalServiceError> {
        self.record("coverage_extent", format!("{workspace} {store} {coverage}"))?;
        Ok(CoverageExtent {
            bbox: BoundingBox { minx: 1.0, miny: 2.0, maxx: 3.0, maxy: 4.0 },
            srs: String::from("EPSG:32617"),
        })
    }
}

/// Raster tool stand-in that writes small real images for every declared
/// output instead of running the program.
#[derive(Debug, Default)]
pub(crate) struct FakeRasterCalculator {
    pub(crate) calls: Mutex<Vec<(ToolInvocation, PathBuf)>>,
    /// Program whose invocations fail.
    pub(crate) fail_program: Option<&'static str>,
}

impl FakeRasterCalculator {
    pub(crate) fn calls(&self) -> Vec<(ToolInvocation, PathBuf)> { self.calls.lock().unwrap().clone() }

    pub(crate) fn programs(&self) -> Vec<String> {
        self.calls().iter().map(|(inv, _)| inv.program().to_string()).collect()
    }
}

pub(crate) fn write_sample_output(path: &Path) {
    let name = path.to_string_lossy();
    if name.ends_with(".msk") {
        GrayImage::from_pixel(16, 8, Luma([255])).save_with_format(path, ImageFormat::Tiff).unwrap();
    } else if name.ends_with(".png") {
        RgbaImage::from_pixel(16, 8, Rgba([10, 120, 30, 255]))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    } else {
        RgbImage::from_pixel(16, 8, Rgb([200, 100, 50])).save_with_format(path, ImageFormat::Tiff).unwrap();
    }
}

#[async_trait(?Send)]
impl RasterCalculator for FakeRasterCalculator {
    async fn execute(
        &self,
        invocation: &ToolInvocation,
        workdir: &Path,
    ) -> Result<(), ExternalServiceError> {
        self.calls.lock().unwrap().push((invocation.clone(), workdir.to_path_buf()));
        if self.fail_program == Some(invocation.program()) {
            return Err(ExternalServiceError::Tool {
                program: invocation.program().to_string(),
                status: Some(1),
                stderr: String::from("injected failure"),
            });
        }
        for output in invocation.outputs() {
            write_sample_output(&workdir.join(output));
        }
        Ok(())
    }
}
