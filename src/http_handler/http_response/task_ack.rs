use super::response_common::{HTTPResponseType, JSONBodyHTTPResponseType, ResponseError};

/// Body returned by the job API's write endpoints. The service reports
/// failures as `{"error": "..."}` with a 200 status.
#[derive(serde::Deserialize, Debug)]
pub(crate) struct TaskAck {
    #[serde(default)]
    pub(crate) uuid: Option<String>,
    #[serde(default)]
    pub(crate) success: Option<bool>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

/// Response type for /task/new/init, /task/new/upload, /task/new/commit and /task/remove.
pub(crate) struct TaskAckResponse {}

impl JSONBodyHTTPResponseType for TaskAckResponse {}

impl HTTPResponseType for TaskAckResponse {
    type ParsedResponseType = TaskAck;

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        let resp = Self::unwrap_return_code(response).await?;
        let ack: TaskAck = Self::parse_json_body(resp).await?;
        match (&ack.error, ack.success) {
            (Some(error), _) => Err(ResponseError::Rejected(error.clone())),
            (None, Some(false)) => Err(ResponseError::Rejected(String::from("request not accepted"))),
            _ => Ok(ack),
        }
    }
}
