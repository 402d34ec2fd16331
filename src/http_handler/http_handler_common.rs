use super::http_request::request_common::RequestError;
use super::http_response::response_common::ResponseError;
use strum_macros::Display;

/// Any failure of a typed request: building it, or the service's answer.
#[derive(Debug, Display)]
pub enum HTTPError {
    HTTPRequestError(RequestError),
    HTTPResponseError(ResponseError),
}

impl HTTPError {
    /// `true` if the service rejected a create because the resource exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, HTTPError::HTTPResponseError(e) if e.is_already_exists())
    }
}

impl std::error::Error for HTTPError {}

impl From<RequestError> for HTTPError {
    fn from(value: RequestError) -> Self { HTTPError::HTTPRequestError(value) }
}

impl From<ResponseError> for HTTPError {
    fn from(value: ResponseError) -> Self { HTTPError::HTTPResponseError(value) }
}

impl From<reqwest::Error> for HTTPError {
    fn from(value: reqwest::Error) -> Self { HTTPError::HTTPResponseError(value.into()) }
}
