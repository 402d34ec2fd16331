use super::request_common::{
    HTTPRequestMethod, HTTPRequestType, MultipartBodyHTTPRequestType, RequestError,
};
use super::task_ack::TaskAckResponse;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Request type for the /task/new/upload/{uuid} endpoint.
#[derive(Debug)]
pub(crate) struct TaskUploadRequest {
    uuid: Uuid,
    images: Vec<PathBuf>,
}

impl TaskUploadRequest {
    /// Checks that every image exists and is a regular file.
    pub(crate) fn new<P: AsRef<Path>>(uuid: Uuid, images: &[P]) -> Result<Self, io::Error> {
        let mut checked = Vec::with_capacity(images.len());
        for image in images {
            let path = image.as_ref();
            if !path.exists() {
                return Err(io::Error::new(io::ErrorKind::NotFound, "File path does not exist"));
            }
            if !path.is_file() {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "Path is not a valid file"));
            }
            checked.push(path.to_path_buf());
        }
        Ok(Self { uuid, images: checked })
    }
}

impl MultipartBodyHTTPRequestType for TaskUploadRequest {
    async fn body(&self) -> Result<reqwest::multipart::Form, RequestError> {
        let parts =
            futures::future::try_join_all(self.images.iter().map(reqwest::multipart::Part::file))
                .await?;
        Ok(parts.into_iter().fold(reqwest::multipart::Form::new(), |form, part| form.part("images", part)))
    }
}

impl HTTPRequestType for TaskUploadRequest {
    type Response = TaskAckResponse;
    fn endpoint(&self) -> String { format!("/task/new/upload/{}", self.uuid) }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
}
