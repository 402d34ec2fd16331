use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use super::task_ack::TaskAckResponse;
use uuid::Uuid;

/// Request type for the /task/new/commit/{uuid} endpoint; starts processing.
#[derive(Debug)]
pub(crate) struct TaskCommitRequest {
    pub(crate) uuid: Uuid,
}

impl NoBodyHTTPRequestType for TaskCommitRequest {}

impl HTTPRequestType for TaskCommitRequest {
    type Response = TaskAckResponse;
    fn endpoint(&self) -> String { format!("/task/new/commit/{}", self.uuid) }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
}
