use super::mosaic;
use crate::collaborators::{
    CoverageStoreKind, ExternalServiceError, MapServerClient, RasterCalculator, ToolInvocation,
};
use crate::flight_control::{
    Artifact, ArtifactKind, Flight, FlightLocks, FlightRegistry, FlightState, Project,
    RegistryError,
};
use crate::formula::{CommandCompiler, CompileError, is_reserved_name, sanitize_index_name};
use crate::util::{Keychain, PipelineConfig};
use crate::{info, log};
use chrono::NaiveDate;
use std::{fmt, sync::Arc};
use uuid::Uuid;

/// Default style applied to index layers.
pub const INDEX_STYLE: &str = "gradient";

#[derive(Debug)]
pub enum ProvisionError {
    /// Nothing of the requested name survives sanitization.
    InvalidIndexName(String),
    /// The sanitized name belongs to a product the system writes itself.
    ReservedName(String),
    /// A non-index artifact of the project already uses the name.
    NameInUse(String),
    EmptyProject,
    /// Two flights share an acquisition date and would share a granule.
    DuplicateDate(NaiveDate),
    /// The flight was not captured with a multi-band camera.
    NotMultiband(Uuid),
    /// The flight has no finished reconstruction to compute from.
    FlightNotComplete(Uuid),
    Compile(CompileError),
    External(ExternalServiceError),
    Filesystem(std::io::Error),
    Registry(RegistryError),
}

impl ProvisionError {
    /// `true` for errors raised before any side effect.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ProvisionError::InvalidIndexName(_)
                | ProvisionError::ReservedName(_)
                | ProvisionError::NameInUse(_)
                | ProvisionError::EmptyProject
                | ProvisionError::DuplicateDate(_)
                | ProvisionError::NotMultiband(_)
                | ProvisionError::FlightNotComplete(_)
                | ProvisionError::Compile(_)
        )
    }
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::InvalidIndexName(raw) => write!(f, "invalid index name '{raw}'"),
            ProvisionError::ReservedName(name) => write!(f, "index name '{name}' is reserved"),
            ProvisionError::NameInUse(name) => write!(f, "project already has a layer named '{name}'"),
            ProvisionError::EmptyProject => write!(f, "project has no flights"),
            ProvisionError::DuplicateDate(date) => {
                write!(f, "several flights were captured on {date}")
            }
            ProvisionError::NotMultiband(id) => write!(f, "flight {id} is not multi-band"),
            ProvisionError::FlightNotComplete(id) => write!(f, "flight {id} is not complete"),
            ProvisionError::Compile(e) => write!(f, "{e}"),
            ProvisionError::External(e) => write!(f, "{e}"),
            ProvisionError::Filesystem(e) => write!(f, "filesystem error: {e}"),
            ProvisionError::Registry(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ProvisionError {}

impl From<CompileError> for ProvisionError {
    fn from(value: CompileError) -> Self { ProvisionError::Compile(value) }
}

impl From<ExternalServiceError> for ProvisionError {
    fn from(value: ExternalServiceError) -> Self { ProvisionError::External(value) }
}

impl From<std::io::Error> for ProvisionError {
    fn from(value: std::io::Error) -> Self { ProvisionError::Filesystem(value) }
}

impl From<RegistryError> for ProvisionError {
    fn from(value: RegistryError) -> Self { ProvisionError::Registry(value) }
}

/// Computes an index raster for every flight of a project and publishes them
/// as one time-series mosaic.
pub struct IndexProvisioner {
    config: Arc<PipelineConfig>,
    registry: Arc<FlightRegistry>,
    locks: Arc<FlightLocks>,
    map_server: Arc<dyn MapServerClient>,
    raster: Arc<dyn RasterCalculator>,
    compiler: CommandCompiler,
}

impl IndexProvisioner {
    pub fn new(keychain: &Keychain) -> Self {
        let config = keychain.config();
        Self {
            compiler: CommandCompiler::new(config.index_scaling),
            config,
            registry: keychain.registry(),
            locks: keychain.locks(),
            map_server: keychain.map_server(),
            raster: keychain.raster(),
        }
    }

    /// Creates or refreshes the index artifact `index_name` of `project`.
    ///
    /// Name, camera and formula problems are reported before any raster is
    /// computed or any map-server call is made. An external failure aborts
    /// the remaining steps; rasters staged so far stay in place.
    ///
    /// # Errors
    /// See [`ProvisionError`].
    pub async fn provision(
        &self,
        project: &Project,
        index_name: &str,
        formula: &str,
    ) -> Result<Artifact, ProvisionError> {
        let index = sanitize_index_name(index_name)
            .ok_or_else(|| ProvisionError::InvalidIndexName(index_name.to_string()))?;
        if is_reserved_name(&index) {
            return Err(ProvisionError::ReservedName(index));
        }
        if project.artifacts().iter().any(|a| a.name == index && a.kind != ArtifactKind::Index) {
            return Err(ProvisionError::NameInUse(index));
        }
        let flights = self.registry.project_flights(project).await?;
        if flights.is_empty() {
            return Err(ProvisionError::EmptyProject);
        }
        if let Some(flight) = flights.iter().find(|f| !f.camera().is_multiband()) {
            return Err(ProvisionError::NotMultiband(flight.uuid()));
        }
        if let Some(flight) = flights.iter().find(|f| f.state() != FlightState::Complete) {
            return Err(ProvisionError::FlightNotComplete(flight.uuid()));
        }
        if let Some(date) = mosaic::duplicate_date(flights.iter().map(Flight::date)) {
            return Err(ProvisionError::DuplicateDate(date));
        }
        let invocations = flights
            .iter()
            .map(|f| self.compiler.compile(&index, formula, f.camera()))
            .collect::<Result<Vec<_>, _>>()?;

        let flights_root = self.config.flights_root();
        let folder = project.workspace(&self.config.projects_root()).join(&index);
        for (flight, invocation) in flights.iter().zip(&invocations) {
            let ortho_dir = flight.orthophoto_dir(&flights_root);
            {
                let _token = self.locks.acquire(flight.uuid()).await;
                self.raster.execute(&ToolInvocation::from(invocation), &ortho_dir).await?;
            }
            let staged =
                mosaic::stage_granule(&ortho_dir.join(invocation.outfile()), &folder, flight.date())
                    .await?;
            log!("Staged {index} of flight {} as {}", flight.uuid(), staged.display());
        }
        mosaic::write_properties(&folder).await?;

        let workspace = project.map_server_workspace();
        let file_url =
            format!("{}/{}/{index}/", self.config.geoserver_project_mount, project.uuid());
        self.map_server.create_workspace(&workspace).await?;
        self.map_server
            .create_coverage_store(&workspace, &index, CoverageStoreKind::ImageMosaic, &file_url)
            .await?;
        self.map_server
            .update_coverage(&workspace, &index, &index, &mosaic::time_series_update())
            .await?;
        self.map_server.set_default_style(&workspace, &index, INDEX_STYLE).await?;

        let artifact = Artifact::new(ArtifactKind::Index, &index, &index.to_uppercase());
        let stored = artifact.clone();
        self.registry.update_project(project.uuid(), move |p| p.upsert_artifact(stored)).await?;
        info!("Index {index} provisioned for project {}", project.uuid());
        Ok(artifact)
    }
}
