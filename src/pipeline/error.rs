use crate::collaborators::ExternalServiceError;
use crate::flight_control::{FlightState, RegistryError};
use chrono::NaiveDate;
use std::{fmt, path::PathBuf};

/// Failure of one derivation step or publisher operation.
#[derive(Debug)]
pub enum PipelineError {
    /// Artifacts are only derived from completed reconstructions.
    NotComplete(FlightState),
    MissingInput(PathBuf),
    External(ExternalServiceError),
    Filesystem(std::io::Error),
    Image(image::ImageError),
    Annotations(serde_json::Error),
    Registry(RegistryError),
    /// Nothing usable remains of a user supplied name.
    InvalidName(String),
    /// The name belongs to a product the system writes itself.
    ReservedName(String),
    /// Another kind of artifact in the project already uses the name.
    NameInUse(String),
    /// Two flights share an acquisition date and would share a granule.
    DuplicateDate(NaiveDate),
    /// Only soft-deleted entries can be removed for good.
    NotSoftDeleted,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::NotComplete(state) => write!(f, "flight is {state}, not Complete"),
            PipelineError::MissingInput(path) => write!(f, "missing input {}", path.display()),
            PipelineError::External(e) => write!(f, "{e}"),
            PipelineError::Filesystem(e) => write!(f, "filesystem error: {e}"),
            PipelineError::Image(e) => write!(f, "image error: {e}"),
            PipelineError::Annotations(e) => write!(f, "malformed annotations: {e}"),
            PipelineError::Registry(e) => write!(f, "{e}"),
            PipelineError::InvalidName(raw) => write!(f, "invalid name '{raw}'"),
            PipelineError::ReservedName(name) => write!(f, "name '{name}' is reserved"),
            PipelineError::NameInUse(name) => write!(f, "project already has a layer named '{name}'"),
            PipelineError::DuplicateDate(date) => write!(f, "several flights were captured on {date}"),
            PipelineError::NotSoftDeleted => write!(f, "entry must be deleted softly first"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ExternalServiceError> for PipelineError {
    fn from(value: ExternalServiceError) -> Self { PipelineError::External(value) }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self { PipelineError::Filesystem(value) }
}

impl From<image::ImageError> for PipelineError {
    fn from(value: image::ImageError) -> Self { PipelineError::Image(value) }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self { PipelineError::Annotations(value) }
}

impl From<RegistryError> for PipelineError {
    fn from(value: RegistryError) -> Self { PipelineError::Registry(value) }
}
