use super::super::http_client::HTTPClient;
use super::super::http_handler_common::HTTPError;
use super::super::http_response::response_common::HTTPResponseType;
use strum_macros::Display;

/// HTTP verbs used by the typed requests.
#[derive(Debug, Clone, Copy)]
pub(crate) enum HTTPRequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl From<HTTPRequestMethod> for reqwest::Method {
    fn from(value: HTTPRequestMethod) -> Self {
        match value {
            HTTPRequestMethod::Get => reqwest::Method::GET,
            HTTPRequestMethod::Post => reqwest::Method::POST,
            HTTPRequestMethod::Put => reqwest::Method::PUT,
            HTTPRequestMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Common part of every typed request: where it goes and how.
pub(crate) trait HTTPRequestType {
    /// Type of the expected response.
    type Response: HTTPResponseType;
    /// Path below the client's base URL, starting with `/`.
    fn endpoint(&self) -> String;
    /// The corresponding HTTP Request Method.
    fn request_method(&self) -> HTTPRequestMethod;
    fn header_params(&self) -> reqwest::header::HeaderMap { reqwest::header::HeaderMap::new() }
    fn query_params(&self) -> Vec<(&'static str, String)> { Vec::new() }

    /// Builds the request with URL, method, headers, query and credentials,
    /// leaving only the body to the caller.
    fn request_builder(&self, client: &HTTPClient) -> reqwest::RequestBuilder {
        let url = format!("{}{}", client.url(), self.endpoint());
        let mut builder = client
            .client()
            .request(self.request_method().into(), url)
            .headers(self.header_params());
        let query = self.query_params();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some((user, password)) = client.credentials() {
            builder = builder.basic_auth(user, Some(password));
        }
        builder
    }
}

type Parsed<T> = <<T as HTTPRequestType>::Response as HTTPResponseType>::ParsedResponseType;

pub(crate) trait NoBodyHTTPRequestType: HTTPRequestType {
    async fn send_request(&self, client: &HTTPClient) -> Result<Parsed<Self>, HTTPError> {
        let response = self.request_builder(client).send().await?;
        Ok(Self::Response::read_response(response).await?)
    }
}

pub(crate) trait JSONBodyHTTPRequestType: HTTPRequestType {
    /// The type of the json body.
    type Body: serde::Serialize;
    /// Returns the serializable object.
    fn body(&self) -> &Self::Body;

    async fn send_request(&self, client: &HTTPClient) -> Result<Parsed<Self>, HTTPError> {
        let response = self.request_builder(client).json(self.body()).send().await?;
        Ok(Self::Response::read_response(response).await?)
    }
}

/// Requests whose body is a single `text/plain` line, e.g. a file URL.
pub(crate) trait TextBodyHTTPRequestType: HTTPRequestType {
    fn body(&self) -> String;

    async fn send_request(&self, client: &HTTPClient) -> Result<Parsed<Self>, HTTPError> {
        let response = self
            .request_builder(client)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(self.body())
            .send()
            .await?;
        Ok(Self::Response::read_response(response).await?)
    }
}

/// Requests with an `application/x-www-form-urlencoded` body.
pub(crate) trait FormBodyHTTPRequestType: HTTPRequestType {
    fn body(&self) -> Vec<(&'static str, String)>;

    async fn send_request(&self, client: &HTTPClient) -> Result<Parsed<Self>, HTTPError> {
        let response = self.request_builder(client).form(&self.body()).send().await?;
        Ok(Self::Response::read_response(response).await?)
    }
}

pub(crate) trait MultipartBodyHTTPRequestType: HTTPRequestType {
    async fn body(&self) -> Result<reqwest::multipart::Form, RequestError>;

    async fn send_request(&self, client: &HTTPClient) -> Result<Parsed<Self>, HTTPError> {
        let form = self.body().await?;
        let response = self.request_builder(client).multipart(form).send().await?;
        Ok(Self::Response::read_response(response).await?)
    }
}

/// Failure while assembling a request before anything was sent.
#[derive(Debug, Display)]
pub enum RequestError {
    FailedToOpenFile(std::io::Error),
    FailedToSerialize(serde_json::Error),
    InvalidHeader,
}

impl std::error::Error for RequestError {}

impl From<std::io::Error> for RequestError {
    fn from(value: std::io::Error) -> Self { RequestError::FailedToOpenFile(value) }
}

impl From<serde_json::Error> for RequestError {
    fn from(value: serde_json::Error) -> Self { RequestError::FailedToSerialize(value) }
}

impl From<reqwest::header::InvalidHeaderValue> for RequestError {
    fn from(_: reqwest::header::InvalidHeaderValue) -> Self { RequestError::InvalidHeader }
}
