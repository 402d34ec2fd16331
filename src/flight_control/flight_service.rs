use super::{
    CameraKind, Flight, FlightLocks, FlightRegistry, FlightState, FlightStateMachine,
    RegistryError, Transition, TransitionError,
};
use crate::collaborators::{
    CoverageExtent, ExternalServiceError, JobInfo, MapServerClient, ReconstructionJobClient,
    TaskOption,
};
use crate::pipeline::{ArtifactPipeline, PipelineError, PipelineReport};
use crate::util::{Keychain, PipelineConfig};
use crate::{info, log, warn};
use chrono::NaiveDate;
use std::{fmt, path::PathBuf, sync::Arc};
use uuid::Uuid;

/// Store and coverage of a flight's published orthophoto.
const PREVIEW_STORE: &str = "ortho";
const PREVIEW_COVERAGE: &str = "odm_orthophoto";

#[derive(Debug)]
pub enum ServiceError {
    Registry(RegistryError),
    External(ExternalServiceError),
    Transition(TransitionError),
    Pipeline(PipelineError),
    Filesystem(std::io::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Registry(e) => write!(f, "{e}"),
            ServiceError::External(e) => write!(f, "{e}"),
            ServiceError::Transition(e) => write!(f, "{e}"),
            ServiceError::Pipeline(e) => write!(f, "{e}"),
            ServiceError::Filesystem(e) => write!(f, "filesystem error: {e}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<RegistryError> for ServiceError {
    fn from(value: RegistryError) -> Self { ServiceError::Registry(value) }
}

impl From<ExternalServiceError> for ServiceError {
    fn from(value: ExternalServiceError) -> Self { ServiceError::External(value) }
}

impl From<TransitionError> for ServiceError {
    fn from(value: TransitionError) -> Self { ServiceError::Transition(value) }
}

impl From<PipelineError> for ServiceError {
    fn from(value: PipelineError) -> Self { ServiceError::Pipeline(value) }
}

impl From<std::io::Error> for ServiceError {
    fn from(value: std::io::Error) -> Self { ServiceError::Filesystem(value) }
}

/// Body the reconstruction service posts when a job ends.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingCallback {
    pub uuid: Uuid,
    pub status: CallbackStatus,
    #[serde(default)]
    pub processing_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct CallbackStatus {
    pub code: i64,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Deletion {
    /// Hidden from listings, still restorable.
    Soft,
    /// Removed together with its job, map-server workspace and files.
    Hard,
}

/// Drives a flight through its life: job setup, imagery upload, reconstruction
/// callbacks, administrative actions and deletion.
pub struct FlightService {
    config: Arc<PipelineConfig>,
    registry: Arc<FlightRegistry>,
    locks: Arc<FlightLocks>,
    jobs: Arc<dyn ReconstructionJobClient>,
    map_server: Arc<dyn MapServerClient>,
    pipeline: ArtifactPipeline,
}

impl FlightService {
    pub fn new(keychain: &Keychain) -> Self {
        Self {
            config: keychain.config(),
            registry: keychain.registry(),
            locks: keychain.locks(),
            jobs: keychain.jobs(),
            map_server: keychain.map_server(),
            pipeline: ArtifactPipeline::new(keychain),
        }
    }

    /// Registers a flight and sets up its reconstruction job with elevation
    /// models and timing enabled. The job id equals the flight id.
    ///
    /// # Errors
    /// A name clash, or a job service failure, in which case the flight is
    /// not kept.
    pub async fn create_flight(
        &self,
        name: &str,
        owner: Option<&str>,
        date: NaiveDate,
        camera: CameraKind,
        annotations: &str,
    ) -> Result<Flight, ServiceError> {
        let flight = Flight::new(name, owner, date, camera).with_annotations(annotations);
        let id = self.registry.insert_flight(flight.clone()).await?;
        let options = [TaskOption::flag("dsm", true), TaskOption::flag("time", true)];
        if let Err(e) = self.jobs.init_job(id, name, &self.config.webhook_url, &options).await {
            warn!("Job setup for flight {id} failed, dropping it: {e}");
            self.registry.remove_flight(id).await;
            return Err(e.into());
        }
        tokio::fs::create_dir_all(flight.workspace(&self.config.flights_root())).await?;
        info!("Created flight {id} ({name}, {camera})");
        Ok(flight)
    }

    /// Uploads imagery, commits the job and moves the flight to `Processing`.
    ///
    /// # Errors
    /// The flight is not `Waiting`, or the job service fails.
    pub async fn upload_images(&self, id: Uuid, images: &[PathBuf]) -> Result<Transition, ServiceError> {
        let mut probe = self.flight(id).await?;
        FlightStateMachine::commit_upload(&mut probe)?;
        self.jobs.upload_images(id, images).await?;
        self.jobs.commit_job(id).await?;
        let transition = self.registry.update_flight(id, FlightStateMachine::commit_upload).await??;
        info!("Flight {id}: {} images committed", images.len());
        Ok(transition)
    }

    /// Applies a reconstruction callback. Runs the artifact pipeline when
    /// the callback completes the flight, which happens at most once per
    /// processing round.
    ///
    /// # Errors
    /// Unknown flight.
    pub async fn handle_callback(
        &self,
        callback: &ProcessingCallback,
    ) -> Result<Option<PipelineReport>, ServiceError> {
        let processing_time = u64::try_from(callback.processing_time).unwrap_or(0);
        let transition = self
            .registry
            .update_flight(callback.uuid, |f| {
                FlightStateMachine::apply_callback(f, callback.status.code, processing_time)
            })
            .await?;
        let Some(transition) = transition else {
            return Ok(None);
        };
        info!("Flight {} reconstruction ended: {}", callback.uuid, transition.to);
        if !transition.triggers_pipeline() {
            return Ok(None);
        }
        let flight = self.flight(callback.uuid).await?;
        Ok(Some(self.pipeline.run(&flight).await?))
    }

    /// Live job progress; `None` unless the flight is `Processing`.
    ///
    /// # Errors
    /// Unknown flight or job service failure.
    pub async fn job_info(&self, id: Uuid) -> Result<Option<JobInfo>, ServiceError> {
        let flight = self.flight(id).await?;
        if flight.state() != FlightState::Processing {
            return Ok(None);
        }
        Ok(Some(self.jobs.job_info(id).await?))
    }

    /// # Errors
    /// Unknown or already paused flight.
    pub async fn pause(&self, id: Uuid) -> Result<Transition, ServiceError> {
        Ok(self.registry.update_flight(id, FlightStateMachine::pause).await??)
    }

    /// # Errors
    /// Unknown or not paused flight.
    pub async fn resume(&self, id: Uuid) -> Result<Transition, ServiceError> {
        Ok(self.registry.update_flight(id, FlightStateMachine::resume).await??)
    }

    /// Starts a finished flight over with a fresh job, ready for new imagery.
    ///
    /// # Errors
    /// The flight has not ended, or the job service fails.
    pub async fn resubmit(&self, id: Uuid) -> Result<Transition, ServiceError> {
        let mut probe = self.flight(id).await?;
        FlightStateMachine::resubmit(&mut probe)?;
        if let Err(e) = self.jobs.remove_job(id).await {
            log!("Old job of flight {id} could not be removed: {e}");
        }
        let options = [TaskOption::flag("dsm", true), TaskOption::flag("time", true)];
        self.jobs.init_job(id, probe.name(), &self.config.webhook_url, &options).await?;
        Ok(self.registry.update_flight(id, FlightStateMachine::resubmit).await??)
    }

    /// First call hides the flight, a second one removes it for good along
    /// with its job, its map-server workspace and its files.
    ///
    /// # Errors
    /// Unknown flight, map-server or filesystem failure.
    pub async fn delete_flight(&self, id: Uuid) -> Result<Deletion, ServiceError> {
        let flight = self.flight(id).await?;
        if !flight.is_deleted() {
            self.registry.update_flight(id, |f| f.set_deleted(true)).await?;
            info!("Flight {id} moved to deleted");
            return Ok(Deletion::Soft);
        }
        {
            let _token = self.locks.acquire(id).await;
            if let Err(e) = self.jobs.remove_job(id).await {
                log!("Job of flight {id} could not be removed: {e}");
            }
            self.map_server.delete_workspace(&flight.map_server_workspace()).await?;
            let flights_root = self.config.flights_root();
            let thumbnail = flight.thumbnail_path(&flights_root);
            if tokio::fs::try_exists(&thumbnail).await? {
                tokio::fs::remove_file(&thumbnail).await?;
            }
            let workspace = flight.workspace(&flights_root);
            if tokio::fs::try_exists(&workspace).await? {
                tokio::fs::remove_dir_all(&workspace).await?;
            }
            self.registry.remove_flight(id).await;
        }
        self.locks.forget(id);
        info!("Flight {id} removed");
        Ok(Deletion::Hard)
    }

    /// # Errors
    /// Unknown flight, or its name is now taken.
    pub async fn restore_flight(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(self.registry.restore_flight(id).await?)
    }

    /// # Errors
    /// Unknown flight, or the name is taken.
    pub async fn rename_flight(&self, id: Uuid, name: &str) -> Result<(), ServiceError> {
        Ok(self.registry.rename_flight(id, name).await?)
    }

    /// # Errors
    /// Unknown flight, or a demo flight of the same name exists.
    pub async fn make_demo(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(self.registry.reassign_demo(&[id], None).await?)
    }

    /// Hands a demo flight to the acting administrator.
    ///
    /// # Errors
    /// Unknown flight, or `admin` already has a flight of the same name.
    pub async fn unmake_demo(&self, id: Uuid, admin: &str) -> Result<(), ServiceError> {
        Ok(self.registry.reassign_demo(&[id], Some(admin)).await?)
    }

    pub async fn flights(&self, owner: Option<&str>) -> Vec<Flight> {
        self.registry.flights_of(owner, false).await
    }

    pub async fn deleted_flights(&self, owner: Option<&str>) -> Vec<Flight> {
        self.registry.flights_of(owner, true).await
    }

    /// Extent of the published orthophoto, used to frame map previews.
    ///
    /// # Errors
    /// Unknown flight or map-server failure.
    pub async fn preview_extent(&self, id: Uuid) -> Result<CoverageExtent, ServiceError> {
        let flight = self.flight(id).await?;
        Ok(self
            .map_server
            .coverage_extent(&flight.map_server_workspace(), PREVIEW_STORE, PREVIEW_COVERAGE)
            .await?)
    }

    async fn flight(&self, id: Uuid) -> Result<Flight, ServiceError> {
        self.registry.flight(id).await.ok_or(ServiceError::Registry(RegistryError::FlightNotFound(id)))
    }
}
