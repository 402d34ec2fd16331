use super::{ExternalServiceError, TaskOption};
use crate::http_handler::HTTPClient;
use crate::http_handler::http_request::{
    request_common::{
        FormBodyHTTPRequestType, MultipartBodyHTTPRequestType, NoBodyHTTPRequestType,
    },
    task_commit_post::TaskCommitRequest,
    task_info_get::TaskInfoRequest,
    task_init_post::TaskInitRequest,
    task_remove_post::TaskRemoveRequest,
    task_upload_post::TaskUploadRequest,
};
use crate::{event, info};
use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

const SERVICE: &str = "reconstruction job";

/// Progress of a running reconstruction job, as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    /// Milliseconds spent processing so far.
    pub processing_time: i64,
    /// Percentage, 0 to 100.
    pub progress: f64,
    pub num_images: u32,
}

/// The external photogrammetry engine. Job ids equal flight ids.
#[async_trait(?Send)]
pub trait ReconstructionJobClient {
    async fn init_job(
        &self,
        job: Uuid,
        name: &str,
        webhook: &str,
        options: &[TaskOption],
    ) -> Result<(), ExternalServiceError>;
    async fn upload_images(&self, job: Uuid, images: &[PathBuf]) -> Result<(), ExternalServiceError>;
    /// Starts processing; the job reports back through the webhook.
    async fn commit_job(&self, job: Uuid) -> Result<(), ExternalServiceError>;
    async fn job_info(&self, job: Uuid) -> Result<JobInfo, ExternalServiceError>;
    async fn remove_job(&self, job: Uuid) -> Result<(), ExternalServiceError>;
}

/// [`ReconstructionJobClient`] speaking the NodeODM REST API.
#[derive(Debug)]
pub struct NodeOdmClient {
    client: HTTPClient,
}

impl NodeOdmClient {
    pub(crate) fn new(client: HTTPClient) -> Self { Self { client } }
}

#[async_trait(?Send)]
impl ReconstructionJobClient for NodeOdmClient {
    async fn init_job(
        &self,
        job: Uuid,
        name: &str,
        webhook: &str,
        options: &[TaskOption],
    ) -> Result<(), ExternalServiceError> {
        let request = TaskInitRequest {
            uuid: job,
            name: name.to_string(),
            webhook: webhook.to_string(),
            options: options.to_vec(),
        };
        request.send_request(&self.client).await.map_err(ExternalServiceError::http(SERVICE))?;
        info!("Initialized reconstruction job {job}");
        Ok(())
    }

    async fn upload_images(&self, job: Uuid, images: &[PathBuf]) -> Result<(), ExternalServiceError> {
        let request = TaskUploadRequest::new(job, images)
            .map_err(|e| ExternalServiceError::InvalidInput(e.to_string()))?;
        request.send_request(&self.client).await.map_err(ExternalServiceError::http(SERVICE))?;
        event!("Uploaded {} images to job {job}", images.len());
        Ok(())
    }

    async fn commit_job(&self, job: Uuid) -> Result<(), ExternalServiceError> {
        TaskCommitRequest { uuid: job }
            .send_request(&self.client)
            .await
            .map_err(ExternalServiceError::http(SERVICE))?;
        info!("Committed reconstruction job {job}");
        Ok(())
    }

    async fn job_info(&self, job: Uuid) -> Result<JobInfo, ExternalServiceError> {
        let info = TaskInfoRequest { uuid: job }
            .send_request(&self.client)
            .await
            .map_err(ExternalServiceError::http(SERVICE))?;
        Ok(JobInfo {
            processing_time: info.processing_time.max(0),
            progress: info.progress,
            num_images: info.images_count,
        })
    }

    async fn remove_job(&self, job: Uuid) -> Result<(), ExternalServiceError> {
        TaskRemoveRequest { uuid: job }
            .send_request(&self.client)
            .await
            .map_err(ExternalServiceError::http(SERVICE))?;
        info!("Removed reconstruction job {job}");
        Ok(())
    }
}
