use super::imaging::{self, ColorRamp};
use super::{Annotation, PipelineError};
use crate::collaborators::{
    CoverageStoreKind, CoverageUpdate, MapServerClient, RasterCalculator, ToolInvocation,
};
use crate::flight_control::{Flight, FlightLocks, FlightState};
use crate::formula::PRIMARY_ORTHOPHOTO;
use crate::util::{Keychain, PipelineConfig};
use crate::{error, info, log, step};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

const RGB_COMPOSITE: &str = "rgb.tif";
const ORTHO_PREVIEW: &str = "odm_orthophoto.png";
const ANNOTATED_PREVIEW: &str = "odm_orthophoto_annotated.png";
const DSM: &str = "dsm.tif";
const DSM_PREVIEW: &str = "dsm_colored_hillshade.png";
const COLORBAR: &str = "colorbar.png";
const RELIEF_TABLE: &str = "color_relief.txt";
/// Coverage store holding a flight's orthophoto on the map server.
pub const FLIGHT_STORE: &str = "ortho";
/// Layer name the multi-band RGB composite is published under.
pub const FLIGHT_COVERAGE: &str = "odm_orthophoto";

/// Derivation steps run after a successful reconstruction, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[derive(serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Thumbnail,
    OrthoPreview,
    ElevationPreview,
    AnnotatedOverlay,
    MapServerPublication,
}

/// Outcome of one step within a run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StepOutcome {
    pub step: PipelineStep,
    /// Failure message, `None` on success.
    pub error: Option<String>,
}

/// Collected outcomes of a pipeline run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PipelineReport {
    pub flight: Uuid,
    pub outcomes: Vec<StepOutcome>,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool { self.outcomes.iter().all(|o| o.error.is_none()) }

    pub fn failed_steps(&self) -> Vec<PipelineStep> {
        self.outcomes.iter().filter(|o| o.error.is_some()).map(|o| o.step).collect()
    }
}

/// Derives previews and publishes a completed flight. Steps are best-effort:
/// each failure is logged and recorded, and the following steps still run.
pub struct ArtifactPipeline {
    config: Arc<PipelineConfig>,
    locks: Arc<FlightLocks>,
    map_server: Arc<dyn MapServerClient>,
    raster: Arc<dyn RasterCalculator>,
    ramp: ColorRamp,
}

impl ArtifactPipeline {
    pub fn new(keychain: &Keychain) -> Self {
        Self {
            config: keychain.config(),
            locks: keychain.locks(),
            map_server: keychain.map_server(),
            raster: keychain.raster(),
            ramp: ColorRamp::default(),
        }
    }

    /// Runs every step in order while holding the flight's token.
    ///
    /// # Errors
    /// [`PipelineError::NotComplete`] if the flight has no finished reconstruction.
    pub async fn run(&self, flight: &Flight) -> Result<PipelineReport, PipelineError> {
        Self::check_complete(flight)?;
        let _token = self.locks.acquire(flight.uuid()).await;
        info!("Starting artifact pipeline for flight {}", flight.uuid());
        let mut outcomes = Vec::new();
        for step in PipelineStep::iter() {
            let error = self.execute_logged(flight, step).await.err().map(|e| e.to_string());
            outcomes.push(StepOutcome { step, error });
        }
        let report = PipelineReport { flight: flight.uuid(), outcomes };
        if report.is_success() {
            info!("Artifact pipeline for flight {} finished", flight.uuid());
        } else {
            log!(
                "Artifact pipeline for flight {} finished with failed steps {:?}",
                flight.uuid(),
                report.failed_steps()
            );
        }
        Ok(report)
    }

    /// Re-runs a single step, e.g. after fixing the cause of a failure.
    ///
    /// # Errors
    /// The step's own failure, or [`PipelineError::NotComplete`].
    pub async fn run_step(&self, flight: &Flight, step: PipelineStep) -> Result<(), PipelineError> {
        Self::check_complete(flight)?;
        let _token = self.locks.acquire(flight.uuid()).await;
        self.execute_logged(flight, step).await
    }

    fn check_complete(flight: &Flight) -> Result<(), PipelineError> {
        match flight.state() {
            FlightState::Complete => Ok(()),
            other => Err(PipelineError::NotComplete(other)),
        }
    }

    async fn execute_logged(&self, flight: &Flight, step: PipelineStep) -> Result<(), PipelineError> {
        let result = match step {
            PipelineStep::Thumbnail => self.thumbnail(flight).await,
            PipelineStep::OrthoPreview => self.ortho_preview(flight).await,
            PipelineStep::ElevationPreview => self.elevation_preview(flight).await,
            PipelineStep::AnnotatedOverlay => self.annotated_overlay(flight).await,
            PipelineStep::MapServerPublication => self.publish(flight).await,
        };
        match &result {
            Ok(()) => step!(flight.uuid(), step, "done"),
            Err(e) => error!("Flight {}: {step} failed: {e}", flight.uuid()),
        }
        result
    }

    fn flights_root(&self) -> PathBuf { self.config.flights_root() }

    async fn thumbnail(&self, flight: &Flight) -> Result<(), PipelineError> {
        let ortho_dir = flight.orthophoto_dir(&self.flights_root());
        let (source, mask) = if flight.camera().is_multiband() {
            let composite = self.derive_rgb_composite(flight).await?;
            let mask = mask_path(&composite);
            (composite, Some(mask))
        } else {
            (ortho_dir.join(PRIMARY_ORTHOPHOTO), None)
        };
        let source = imaging::open_image(&source)?;
        let mask = match mask.filter(|m| m.exists()) {
            Some(m) => Some(imaging::open_image(&m)?),
            None => None,
        };
        let thumbnail = imaging::fit_thumbnail(&source, mask.as_ref());
        imaging::save_png_atomically(
            &DynamicImage::ImageRgba8(thumbnail),
            &flight.thumbnail_path(&self.flights_root()),
        )
    }

    async fn ortho_preview(&self, flight: &Flight) -> Result<(), PipelineError> {
        let ortho_dir = flight.orthophoto_dir(&self.flights_root());
        let source = if flight.camera().is_multiband() {
            self.ensure_rgb_composite(flight).await?;
            RGB_COMPOSITE
        } else {
            PRIMARY_ORTHOPHOTO
        };
        require(&ortho_dir.join(source))?;
        let tmp = tool_temp_name(ORTHO_PREVIEW);
        let args = ["--config", "GDAL_PAM_ENABLED", "NO", "-of", "PNG", "-ot", "Byte", source, tmp.as_str()];
        let invocation = ToolInvocation::new("gdal_translate", to_args(&args)).producing(&tmp);
        self.run_tool(&invocation, &ortho_dir, &[(tmp.as_str(), ORTHO_PREVIEW)]).await
    }

    async fn elevation_preview(&self, flight: &Flight) -> Result<(), PipelineError> {
        let dem_dir = flight.dem_dir(&self.flights_root());
        require(&dem_dir.join(DSM))?;
        super::mosaic::write_atomically(&dem_dir.join(RELIEF_TABLE), self.ramp.relief_table().as_bytes())
            .await?;
        let tmp = tool_temp_name(DSM_PREVIEW);
        let args = ["color-relief", DSM, RELIEF_TABLE, tmp.as_str(), "-alpha", "-of", "PNG"];
        let invocation = ToolInvocation::new("gdaldem", to_args(&args)).producing(&tmp);
        self.run_tool(&invocation, &dem_dir, &[(tmp.as_str(), DSM_PREVIEW)]).await?;
        imaging::save_png_atomically(
            &DynamicImage::ImageRgba8(self.ramp.colorbar()),
            &dem_dir.join(COLORBAR),
        )
    }

    async fn annotated_overlay(&self, flight: &Flight) -> Result<(), PipelineError> {
        let ortho_dir = flight.orthophoto_dir(&self.flights_root());
        let annotations = Annotation::parse_all(flight.annotations())?;
        let mut preview = imaging::open_image(&ortho_dir.join(ORTHO_PREVIEW))?.to_rgba8();
        imaging::draw_annotations(&mut preview, &annotations);
        imaging::save_png_atomically(
            &DynamicImage::ImageRgba8(preview),
            &ortho_dir.join(ANNOTATED_PREVIEW),
        )
    }

    async fn publish(&self, flight: &Flight) -> Result<(), PipelineError> {
        let workspace = flight.map_server_workspace();
        let published = flight.published_orthophoto_name();
        if flight.camera().is_multiband() {
            self.ensure_rgb_composite(flight).await?;
        }
        require(&flight.orthophoto_dir(&self.flights_root()).join(published))?;

        self.map_server.create_workspace(&workspace).await?;
        let file_url = format!(
            "{}/{}/odm_orthophoto/{published}",
            self.config.geoserver_flight_mount,
            flight.uuid()
        );
        self.map_server
            .create_coverage_store(&workspace, FLIGHT_STORE, CoverageStoreKind::GeoTiff, &file_url)
            .await?;
        if flight.camera().is_multiband() {
            let update = CoverageUpdate::enabled()
                .renamed(FLIGHT_COVERAGE)
                .with_time_dimension()
                .with_parameter("InputTransparentColor", "#000000")
                .with_parameter("SUGGESTED_TILE_SIZE", "512,512");
            let coverage = published.trim_end_matches(".tif");
            self.map_server.update_coverage(&workspace, FLIGHT_STORE, coverage, &update).await?;
        }
        Ok(())
    }

    /// Byte RGB composite of a multi-band orthophoto with its validity mask
    /// as `rgb.tif.msk`, regenerated on every call.
    async fn derive_rgb_composite(&self, flight: &Flight) -> Result<PathBuf, PipelineError> {
        let ortho_dir = flight.orthophoto_dir(&self.flights_root());
        require(&ortho_dir.join(PRIMARY_ORTHOPHOTO))?;
        let tmp = tool_temp_name(RGB_COMPOSITE);
        let tmp_mask = format!("{tmp}.msk");
        let final_mask = format!("{RGB_COMPOSITE}.msk");

        let mut args = to_args(&["--config", "GDAL_TIFF_INTERNAL_MASK", "NO", "-of", "GTiff"]);
        for band in flight.camera().rgb_bands() {
            args.extend([String::from("-b"), band.to_string()]);
        }
        let mut invocation_outputs = vec![(tmp.as_str(), RGB_COMPOSITE)];
        if let Some(mask) = flight.camera().mask_band() {
            args.extend([String::from("-mask"), mask.to_string()]);
            invocation_outputs.push((tmp_mask.as_str(), final_mask.as_str()));
        }
        args.extend(to_args(&[
            "-scale", "0", "65535", "-ot", "Byte", "-co", "TILED=YES", PRIMARY_ORTHOPHOTO, tmp.as_str(),
        ]));
        let mut invocation = ToolInvocation::new("gdal_translate", args);
        for (produced, _) in &invocation_outputs {
            invocation = invocation.producing(produced);
        }
        self.run_tool(&invocation, &ortho_dir, &invocation_outputs).await?;
        Ok(ortho_dir.join(RGB_COMPOSITE))
    }

    /// Reuses an existing composite so preview and publication do not depend
    /// on the thumbnail step having succeeded.
    async fn ensure_rgb_composite(&self, flight: &Flight) -> Result<PathBuf, PipelineError> {
        let existing = flight.orthophoto_dir(&self.flights_root()).join(RGB_COMPOSITE);
        if existing.exists() {
            return Ok(existing);
        }
        self.derive_rgb_composite(flight).await
    }

    /// Runs `invocation` and moves each produced temporary file into place.
    async fn run_tool(
        &self,
        invocation: &ToolInvocation,
        workdir: &Path,
        renames: &[(&str, &str)],
    ) -> Result<(), PipelineError> {
        self.raster.execute(invocation, workdir).await?;
        for (produced, target) in renames {
            let produced = workdir.join(produced);
            if !produced.exists() {
                return Err(PipelineError::MissingInput(produced));
            }
            tokio::fs::rename(&produced, workdir.join(target)).await?;
        }
        Ok(())
    }
}

fn require(path: &Path) -> Result<(), PipelineError> {
    if path.exists() { Ok(()) } else { Err(PipelineError::MissingInput(path.to_path_buf())) }
}

fn mask_path(raster: &Path) -> PathBuf {
    let mut name = raster.as_os_str().to_owned();
    name.push(".msk");
    PathBuf::from(name)
}

/// `rgb.tif` becomes `rgb.tmp.tif`; tools pick their output driver by extension.
fn tool_temp_name(file: &str) -> String {
    match file.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}.tmp.{ext}"),
        None => format!("{file}.tmp"),
    }
}

fn to_args(args: &[&str]) -> Vec<String> { args.iter().map(|a| (*a).to_string()).collect() }
