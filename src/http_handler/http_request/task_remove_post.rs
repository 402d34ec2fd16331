use super::request_common::{FormBodyHTTPRequestType, HTTPRequestMethod, HTTPRequestType};
use super::task_ack::TaskAckResponse;
use uuid::Uuid;

/// Request type for the /task/remove endpoint.
#[derive(Debug)]
pub(crate) struct TaskRemoveRequest {
    pub(crate) uuid: Uuid,
}

impl FormBodyHTTPRequestType for TaskRemoveRequest {
    fn body(&self) -> Vec<(&'static str, String)> { vec![("uuid", self.uuid.to_string())] }
}

impl HTTPRequestType for TaskRemoveRequest {
    type Response = TaskAckResponse;
    fn endpoint(&self) -> String { String::from("/task/remove") }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
}
