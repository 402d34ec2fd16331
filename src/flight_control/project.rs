use std::path::{Path, PathBuf};
use strum_macros::Display;
use uuid::Uuid;

/// Kind of a project artifact.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactKind {
    /// Uploaded GeoTIFF.
    Orthomosaic,
    /// Uploaded shapefile or KML.
    VectorLayer,
    /// Raster derived from a band-math formula.
    Index,
}

/// Typed output attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Sanitized identifier used as folder, file stem and layer name.
    pub name: String,
    pub title: String,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, name: &str, title: &str) -> Self {
        Self { kind, name: name.to_string(), title: title.to_string() }
    }

    pub fn file_name(&self) -> String {
        match self.kind {
            ArtifactKind::Orthomosaic => format!("{}.tiff", self.name),
            ArtifactKind::VectorLayer => format!("{}.shp", self.name),
            ArtifactKind::Index => format!("{}.tif", self.name),
        }
    }

    /// `<project workspace>/<name>/<file name>`.
    pub fn disk_path(&self, project: &Project, projects_root: &Path) -> PathBuf {
        project.workspace(projects_root).join(&self.name).join(self.file_name())
    }

    /// Fully qualified map-server layer, `project_<uuid>:<name>`.
    pub fn layer_name(&self, project: &Project) -> String {
        format!("{}:{}", project.map_server_workspace(), self.name)
    }
}

/// A group of flights of one user (or a shared demo project) with its own
/// disk and map-server workspace.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    uuid: Uuid,
    name: String,
    description: String,
    owner: Option<String>,
    is_demo: bool,
    flights: Vec<Uuid>,
    artifacts: Vec<Artifact>,
    deleted: bool,
}

impl Project {
    pub fn new(name: &str, description: &str, owner: Option<&str>, flights: Vec<Uuid>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            owner: owner.map(str::to_string),
            is_demo: false,
            flights,
            artifacts: Vec::new(),
            deleted: false,
        }
    }

    pub fn uuid(&self) -> Uuid { self.uuid }
    pub fn name(&self) -> &str { &self.name }
    pub fn description(&self) -> &str { &self.description }
    pub fn owner(&self) -> Option<&str> { self.owner.as_deref() }
    pub fn is_demo(&self) -> bool { self.is_demo }
    pub fn flights(&self) -> &[Uuid] { &self.flights }
    pub fn artifacts(&self) -> &[Artifact] { &self.artifacts }
    pub fn is_deleted(&self) -> bool { self.deleted }

    pub fn indices(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(|a| a.kind == ArtifactKind::Index)
    }

    /// Adds `artifact`, replacing an existing one of the same kind and name
    /// so repeated provisioning does not duplicate entries.
    pub fn upsert_artifact(&mut self, artifact: Artifact) {
        match self.artifacts.iter_mut().find(|a| a.kind == artifact.kind && a.name == artifact.name) {
            Some(existing) => *existing = artifact,
            None => self.artifacts.push(artifact),
        }
    }

    pub fn set_deleted(&mut self, deleted: bool) { self.deleted = deleted; }

    pub fn remove_flight(&mut self, flight: Uuid) { self.flights.retain(|f| *f != flight); }

    pub fn make_demo(&mut self) {
        self.is_demo = true;
        self.owner = None;
    }

    pub fn unmake_demo(&mut self, owner: &str) {
        self.is_demo = false;
        self.owner = Some(owner.to_string());
    }

    /// `<root>/projects/<uuid>`, owned exclusively by this project.
    pub fn workspace(&self, projects_root: &Path) -> PathBuf {
        projects_root.join(self.uuid.to_string())
    }

    pub fn map_server_workspace(&self) -> String { format!("project_{}", self.uuid) }
}
