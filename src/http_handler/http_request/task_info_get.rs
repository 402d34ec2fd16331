use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use super::task_info::TaskInfoResponse;
use uuid::Uuid;

/// Request type for the /task/{uuid}/info endpoint.
#[derive(Debug)]
pub(crate) struct TaskInfoRequest {
    pub(crate) uuid: Uuid,
}

impl NoBodyHTTPRequestType for TaskInfoRequest {}

impl HTTPRequestType for TaskInfoRequest {
    type Response = TaskInfoResponse;
    fn endpoint(&self) -> String { format!("/task/{}/info", self.uuid) }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
}
