//! Everything derived from finished reconstructions: per-flight previews and
//! publication, project mosaics and index rasters.

mod annotation;
mod artifact_pipeline;
mod error;
mod imaging;
mod index_provisioner;
mod mosaic;
mod project_publisher;

pub use annotation::Annotation;
pub use artifact_pipeline::{ArtifactPipeline, PipelineReport, PipelineStep, StepOutcome};
pub use error::PipelineError;
pub use index_provisioner::{IndexProvisioner, ProvisionError};
pub use project_publisher::{LayerEntry, ProjectPublisher};
