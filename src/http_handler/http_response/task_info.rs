use super::response_common::SerdeJSONBodyHTTPResponseType;

/// Response type for the /task/{uuid}/info endpoint.
#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskInfoResponse {
    /// Elapsed processing time in milliseconds, `-1` before the job starts.
    #[serde(default)]
    pub(crate) processing_time: i64,
    /// Completion percentage, 0 to 100.
    #[serde(default)]
    pub(crate) progress: f64,
    #[serde(default)]
    pub(crate) images_count: u32,
}

impl SerdeJSONBodyHTTPResponseType for TaskInfoResponse {}
