use super::request_common::{
    HTTPRequestMethod, HTTPRequestType, MultipartBodyHTTPRequestType, RequestError,
};
use super::task_ack::TaskAckResponse;
use uuid::Uuid;

/// One processing option of a reconstruction job.
#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct TaskOption {
    pub name: String,
    pub value: serde_json::Value,
}

impl TaskOption {
    pub fn flag(name: &str, value: bool) -> Self {
        Self { name: name.to_string(), value: serde_json::Value::Bool(value) }
    }
}

/// Request type for the /task/new/init endpoint. The job id is chosen by us
/// and handed over through the `set-uuid` header so it equals the flight id.
#[derive(Debug)]
pub(crate) struct TaskInitRequest {
    pub(crate) uuid: Uuid,
    pub(crate) name: String,
    /// Callback URL notified when the job ends.
    pub(crate) webhook: String,
    pub(crate) options: Vec<TaskOption>,
}

impl MultipartBodyHTTPRequestType for TaskInitRequest {
    async fn body(&self) -> Result<reqwest::multipart::Form, RequestError> {
        Ok(reqwest::multipart::Form::new()
            .text("name", self.name.clone())
            .text("webhook", self.webhook.clone())
            .text("options", serde_json::to_string(&self.options)?))
    }
}

impl HTTPRequestType for TaskInitRequest {
    type Response = TaskAckResponse;
    fn endpoint(&self) -> String { String::from("/task/new/init") }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
    fn header_params(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(value) = reqwest::header::HeaderValue::from_str(&self.uuid.to_string()) {
            headers.insert("set-uuid", value);
        }
        headers
    }
}
