use super::{PipelineError, mosaic};
use crate::collaborators::{
    CoverageExtent, CoverageStoreKind, CoverageUpdate, MapServerClient, RasterCalculator,
    ToolInvocation,
};
use crate::flight_control::{Artifact, ArtifactKind, FlightRegistry, Project};
use crate::formula::{is_reserved_name, sanitize_index_name};
use crate::util::{Keychain, PipelineConfig};
use crate::{info, log, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Store and coverage name of a project's orthophoto time series.
pub const MAIN_MOSAIC: &str = "mainortho";
const VECTOR_SRS: &str = "EPSG:4326";

/// One entry of a project's layer list.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LayerEntry {
    pub name: String,
    pub title: String,
    pub layer: String,
    pub kind: ArtifactKind,
}

/// Creates project workspaces and registers project artifacts with the map server.
pub struct ProjectPublisher {
    config: Arc<PipelineConfig>,
    registry: Arc<FlightRegistry>,
    map_server: Arc<dyn MapServerClient>,
    raster: Arc<dyn RasterCalculator>,
}

impl ProjectPublisher {
    pub fn new(keychain: &Keychain) -> Self {
        Self {
            config: keychain.config(),
            registry: keychain.registry(),
            map_server: keychain.map_server(),
            raster: keychain.raster(),
        }
    }

    /// Creates a project over the flights of `owner` among `flights`; other
    /// ids are dropped. Sets up the disk and map-server workspaces and the
    /// `mainortho` time-series mosaic.
    ///
    /// # Errors
    /// [`PipelineError::DuplicateDate`] before anything is created if two
    /// member flights share a date, then filesystem, map-server or registry
    /// failures.
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        owner: Option<&str>,
        flights: &[Uuid],
    ) -> Result<Project, PipelineError> {
        let mut members = Vec::new();
        let mut dates = Vec::new();
        for id in flights {
            match self.registry.flight(*id).await {
                Some(f) if f.owner() == owner && !f.is_deleted() => {
                    members.push(*id);
                    dates.push(f.date());
                }
                _ => warn!("Flight {id} does not belong to {owner:?}, leaving it out"),
            }
        }
        if let Some(date) = mosaic::duplicate_date(dates) {
            return Err(PipelineError::DuplicateDate(date));
        }
        let project = Project::new(name, description, owner, members);
        self.registry.insert_project(project.clone()).await;

        let workspace_dir = project.workspace(&self.config.projects_root());
        tokio::fs::create_dir_all(&workspace_dir).await?;
        self.map_server.create_workspace(&project.map_server_workspace()).await?;
        if project.flights().is_empty() {
            log!("Project {} has no flights, skipping {MAIN_MOSAIC}", project.uuid());
        } else {
            self.build_main_mosaic(&project).await?;
        }
        info!("Created project {} ({})", project.uuid(), project.name());
        Ok(project)
    }

    async fn build_main_mosaic(&self, project: &Project) -> Result<(), PipelineError> {
        let folder = project.workspace(&self.config.projects_root()).join(MAIN_MOSAIC);
        let flights_root = self.config.flights_root();
        for flight in self.registry.project_flights(project).await? {
            let source = flight.orthophoto_dir(&flights_root).join(flight.published_orthophoto_name());
            if !source.exists() {
                return Err(PipelineError::MissingInput(source));
            }
            mosaic::stage_granule(&source, &folder, flight.date()).await?;
        }
        mosaic::write_properties(&folder).await?;

        let workspace = project.map_server_workspace();
        let file_url =
            format!("{}/{}/{MAIN_MOSAIC}/", self.config.geoserver_project_mount, project.uuid());
        self.map_server
            .create_coverage_store(&workspace, MAIN_MOSAIC, CoverageStoreKind::ImageMosaic, &file_url)
            .await?;
        self.map_server
            .update_coverage(&workspace, MAIN_MOSAIC, MAIN_MOSAIC, &mosaic::time_series_update())
            .await?;
        Ok(())
    }

    /// Adds an uploaded GeoTIFF as `<name>/<name>.tiff` and publishes it.
    ///
    /// # Errors
    /// Invalid file names and filesystem, map-server or registry failures.
    pub async fn add_orthomosaic(
        &self,
        project_id: Uuid,
        geotiff: &Path,
        title: &str,
    ) -> Result<Artifact, PipelineError> {
        let project = self.project(project_id).await?;
        let artifact = Artifact::new(ArtifactKind::Orthomosaic, &artifact_name(geotiff)?, title);
        ensure_name_free(&project, &artifact)?;
        let target = artifact.disk_path(&project, &self.config.projects_root());
        copy_into_place(geotiff, &target).await?;

        let workspace = project.map_server_workspace();
        self.map_server
            .create_coverage_store(
                &workspace,
                &artifact.name,
                CoverageStoreKind::GeoTiff,
                &self.file_url(&project, &artifact),
            )
            .await?;
        let update = CoverageUpdate::enabled()
            .with_parameter("InputTransparentColor", "#000000")
            .with_parameter("SUGGESTED_TILE_SIZE", "512,512");
        self.map_server.update_coverage(&workspace, &artifact.name, &artifact.name, &update).await?;
        self.store_artifact(project_id, &artifact).await?;
        Ok(artifact)
    }

    /// Adds a vector layer from shapefile parts (`.shp`, `.shx`, `.dbf`, ...)
    /// or a single KML file, which is converted to a shapefile first.
    ///
    /// # Errors
    /// Invalid or missing files and filesystem, tool, map-server or registry failures.
    pub async fn add_vector_layer(
        &self,
        project_id: Uuid,
        files: &[PathBuf],
        title: &str,
    ) -> Result<Artifact, PipelineError> {
        let project = self.project(project_id).await?;
        let first = files.first().ok_or_else(|| PipelineError::InvalidName(String::new()))?;
        let artifact = Artifact::new(ArtifactKind::VectorLayer, &artifact_name(first)?, title);
        ensure_name_free(&project, &artifact)?;
        let folder = project.workspace(&self.config.projects_root()).join(&artifact.name);

        let kml = files.iter().find(|f| extension(f) == "kml");
        match kml {
            Some(kml) => {
                let kml_name = format!("{}.kml", artifact.name);
                copy_into_place(kml, &folder.join(&kml_name)).await?;
                let shp_name = artifact.file_name();
                let invocation = ToolInvocation::new(
                    "ogr2ogr",
                    vec![String::from("-f"), String::from("ESRI Shapefile"), shp_name.clone(), kml_name],
                )
                .producing(&shp_name);
                self.raster.execute(&invocation, &folder).await?;
            }
            None => {
                for part in files {
                    let target = folder.join(format!("{}.{}", artifact.name, extension(part)));
                    copy_into_place(part, &target).await?;
                }
            }
        }
        if !folder.join(artifact.file_name()).exists() {
            return Err(PipelineError::MissingInput(folder.join(artifact.file_name())));
        }

        let workspace = project.map_server_workspace();
        self.map_server
            .create_shapefile_store(&workspace, &artifact.name, &self.file_url(&project, &artifact))
            .await?;
        self.map_server
            .create_feature_type(&workspace, &artifact.name, &artifact.name, VECTOR_SRS)
            .await?;
        self.store_artifact(project_id, &artifact).await?;
        Ok(artifact)
    }

    /// All artifacts of the project with their qualified layer names.
    ///
    /// # Errors
    /// Unknown project.
    pub async fn layers(&self, project_id: Uuid) -> Result<Vec<LayerEntry>, PipelineError> {
        let project = self.project(project_id).await?;
        Ok(project
            .artifacts()
            .iter()
            .map(|a| LayerEntry {
                name: a.name.clone(),
                title: a.title.clone(),
                layer: a.layer_name(&project),
                kind: a.kind,
            })
            .collect())
    }

    /// Index artifacts only.
    ///
    /// # Errors
    /// Unknown project.
    pub async fn indices(&self, project_id: Uuid) -> Result<Vec<LayerEntry>, PipelineError> {
        let mut layers = self.layers(project_id).await?;
        layers.retain(|l| l.kind == ArtifactKind::Index);
        Ok(layers)
    }

    /// Extent of the project's `mainortho` mosaic as reported by the map server.
    ///
    /// # Errors
    /// Unknown project or map-server failure.
    pub async fn bounding_box(&self, project_id: Uuid) -> Result<CoverageExtent, PipelineError> {
        let project = self.project(project_id).await?;
        Ok(self
            .map_server
            .coverage_extent(&project.map_server_workspace(), MAIN_MOSAIC, MAIN_MOSAIC)
            .await?)
    }

    /// First call marks the project deleted; a second call on a deleted
    /// project removes its map-server workspace, its folder and the entry.
    ///
    /// # Errors
    /// Unknown project, filesystem or map-server failure.
    pub async fn delete(&self, project_id: Uuid) -> Result<(), PipelineError> {
        let project = self.project(project_id).await?;
        if !project.is_deleted() {
            self.registry.update_project(project_id, |p| p.set_deleted(true)).await?;
            info!("Project {project_id} moved to deleted");
            return Ok(());
        }
        self.map_server.delete_workspace(&project.map_server_workspace()).await?;
        let dir = project.workspace(&self.config.projects_root());
        if tokio::fs::try_exists(&dir).await? {
            tokio::fs::remove_dir_all(&dir).await?;
        }
        self.registry.remove_project(project_id).await;
        info!("Project {project_id} removed");
        Ok(())
    }

    /// Shares the project and its flights with everyone.
    ///
    /// # Errors
    /// Unknown project or member flight, or a member's name is already
    /// taken among demo flights. No flight changes in that case.
    pub async fn make_demo(&self, project_id: Uuid) -> Result<(), PipelineError> {
        let project = self.project(project_id).await?;
        self.registry.reassign_demo(project.flights(), None).await?;
        self.registry.update_project(project_id, Project::make_demo).await?;
        Ok(())
    }

    /// Hands a demo project and its flights to `admin`.
    ///
    /// # Errors
    /// Unknown project or member flight, or a member's name is already
    /// taken by `admin`. No flight changes in that case.
    pub async fn unmake_demo(&self, project_id: Uuid, admin: &str) -> Result<(), PipelineError> {
        let project = self.project(project_id).await?;
        self.registry.reassign_demo(project.flights(), Some(admin)).await?;
        self.registry.update_project(project_id, |p| p.unmake_demo(admin)).await?;
        Ok(())
    }

    async fn project(&self, id: Uuid) -> Result<Project, PipelineError> {
        self.registry
            .project(id)
            .await
            .ok_or(PipelineError::Registry(crate::flight_control::RegistryError::ProjectNotFound(id)))
    }

    async fn store_artifact(&self, project_id: Uuid, artifact: &Artifact) -> Result<(), PipelineError> {
        let stored = artifact.clone();
        self.registry.update_project(project_id, move |p| p.upsert_artifact(stored)).await?;
        info!("Registered {} artifact {} in project {project_id}", artifact.kind, artifact.name);
        Ok(())
    }

    fn file_url(&self, project: &Project, artifact: &Artifact) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.geoserver_project_mount,
            project.uuid(),
            artifact.name,
            artifact.file_name()
        )
    }
}

/// Artifact name derived from an uploaded file's stem.
fn artifact_name(file: &Path) -> Result<String, PipelineError> {
    let stem = file.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let name = sanitize_index_name(&stem).ok_or(PipelineError::InvalidName(stem))?;
    if is_reserved_name(&name) {
        return Err(PipelineError::ReservedName(name));
    }
    Ok(name)
}

/// Artifacts share the project folder by name; only the same kind may replace one.
fn ensure_name_free(project: &Project, artifact: &Artifact) -> Result<(), PipelineError> {
    if project.artifacts().iter().any(|a| a.name == artifact.name && a.kind != artifact.kind) {
        return Err(PipelineError::NameInUse(artifact.name.clone()));
    }
    Ok(())
}

fn extension(file: &Path) -> String {
    file.extension().map(|e| e.to_string_lossy().to_lowercase()).unwrap_or_default()
}

async fn copy_into_place(source: &Path, target: &Path) -> Result<(), PipelineError> {
    if !source.is_file() {
        return Err(PipelineError::MissingInput(source.to_path_buf()));
    }
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = super::imaging::temp_sibling(target);
    tokio::fs::copy(source, &tmp).await?;
    tokio::fs::rename(&tmp, target).await?;
    Ok(())
}
