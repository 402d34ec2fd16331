use super::{CameraKind, FlightState};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One drone flight: a set of images reconstructed by a single external job.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Flight {
    uuid: Uuid,
    name: String,
    /// `None` for shared demo flights.
    owner: Option<String>,
    is_demo: bool,
    date: NaiveDate,
    camera: CameraKind,
    /// Annotation markers as JSON, see [`crate::pipeline::Annotation`].
    #[serde(default)]
    annotations: String,
    state: FlightState,
    /// State to return to when an administrator resumes a paused flight.
    #[serde(default)]
    paused_from: Option<FlightState>,
    /// Reconstruction duration in milliseconds as reported by the job service.
    processing_time: u64,
    deleted: bool,
}

impl Flight {
    pub fn new(name: &str, owner: Option<&str>, date: NaiveDate, camera: CameraKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            owner: owner.map(str::to_string),
            is_demo: false,
            date,
            camera,
            annotations: String::new(),
            state: FlightState::Waiting,
            paused_from: None,
            processing_time: 0,
            deleted: false,
        }
    }

    pub fn with_annotations(mut self, annotations: &str) -> Self {
        self.annotations = annotations.to_string();
        self
    }

    pub fn uuid(&self) -> Uuid { self.uuid }
    pub fn name(&self) -> &str { &self.name }
    pub fn owner(&self) -> Option<&str> { self.owner.as_deref() }
    pub fn is_demo(&self) -> bool { self.is_demo }
    pub fn date(&self) -> NaiveDate { self.date }
    pub fn camera(&self) -> CameraKind { self.camera }
    pub fn annotations(&self) -> &str { &self.annotations }
    pub fn state(&self) -> FlightState { self.state }
    pub fn paused_from(&self) -> Option<FlightState> { self.paused_from }
    pub fn processing_time(&self) -> u64 { self.processing_time }
    pub fn is_deleted(&self) -> bool { self.deleted }

    pub(super) fn set_name(&mut self, name: &str) { self.name = name.to_string(); }
    pub(super) fn set_state(&mut self, state: FlightState) { self.state = state; }
    pub(super) fn set_paused_from(&mut self, state: Option<FlightState>) {
        self.paused_from = state;
    }
    pub(super) fn set_processing_time(&mut self, millis: u64) { self.processing_time = millis; }
    pub(super) fn set_deleted(&mut self, deleted: bool) { self.deleted = deleted; }

    /// Turns the flight into a shared demo flight without an owner.
    pub(super) fn make_demo(&mut self) {
        self.is_demo = true;
        self.owner = None;
    }

    /// Hands a demo flight back to `owner`.
    pub(super) fn unmake_demo(&mut self, owner: &str) {
        self.is_demo = false;
        self.owner = Some(owner.to_string());
    }

    /// `<root>/flights/<uuid>`, owned exclusively by this flight.
    pub fn workspace(&self, flights_root: &Path) -> PathBuf {
        flights_root.join(self.uuid.to_string())
    }

    pub fn orthophoto_dir(&self, flights_root: &Path) -> PathBuf {
        self.workspace(flights_root).join("odm_orthophoto")
    }

    pub fn dem_dir(&self, flights_root: &Path) -> PathBuf {
        self.workspace(flights_root).join("odm_dem")
    }

    pub fn thumbnail_path(&self, flights_root: &Path) -> PathBuf {
        self.workspace(flights_root).join("thumbnail.png")
    }

    /// Name of the orthophoto published to the map server: the byte RGB
    /// composite for multi-band flights, the raw orthophoto otherwise.
    pub fn published_orthophoto_name(&self) -> &'static str {
        if self.camera.is_multiband() { "rgb.tif" } else { "odm_orthophoto.tif" }
    }

    pub fn map_server_workspace(&self) -> String { format!("flight_{}", self.uuid) }
}
