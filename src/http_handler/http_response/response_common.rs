use strum_macros::Display;

pub(crate) trait JSONBodyHTTPResponseType: HTTPResponseType {
    async fn parse_json_body(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError>
    where Self::ParsedResponseType: for<'de> serde::Deserialize<'de> {
        Ok(response.json::<Self::ParsedResponseType>().await?)
    }
}

pub(crate) trait SerdeJSONBodyHTTPResponseType {}

impl<T> JSONBodyHTTPResponseType for T
where
    T: SerdeJSONBodyHTTPResponseType,
    for<'de> T: serde::Deserialize<'de>,
{
}

impl<T> HTTPResponseType for T
where
    T: SerdeJSONBodyHTTPResponseType,
    for<'de> T: serde::Deserialize<'de>,
{
    type ParsedResponseType = T;

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        let resp = Self::unwrap_return_code(response).await?;
        Self::parse_json_body(resp).await
    }
}

pub(crate) trait HTTPResponseType {
    type ParsedResponseType;
    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError>;

    async fn unwrap_return_code(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ResponseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::CONFLICT {
            Err(ResponseError::Conflict(body))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Err(ResponseError::NotFound(body))
        } else if status.is_server_error() {
            Err(ResponseError::InternalServer(body))
        } else if status.is_client_error() {
            Err(ResponseError::BadRequest(body))
        } else {
            Err(ResponseError::Unknown)
        }
    }
}

/// Failure reported by (or while talking to) an external service. Variants
/// carrying a `String` hold the raw response body.
#[derive(Debug, Display)]
pub enum ResponseError {
    InternalServer(String),
    BadRequest(String),
    Conflict(String),
    NotFound(String),
    /// The service answered 2xx but its body carried an error message.
    Rejected(String),
    NoConnection,
    Unknown,
}

impl ResponseError {
    /// The map server answers duplicate creates with 409, or with 500 and an
    /// "already exists" message depending on the resource type.
    pub fn is_already_exists(&self) -> bool {
        match self {
            ResponseError::Conflict(_) => true,
            ResponseError::InternalServer(body) => body.to_lowercase().contains("already exists"),
            _ => false,
        }
    }
}

impl std::error::Error for ResponseError {}
impl From<reqwest::Error> for ResponseError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_request() || value.is_decode() {
            ResponseError::BadRequest(value.to_string())
        } else if value.is_timeout() || value.is_redirect() {
            ResponseError::InternalServer(value.to_string())
        } else if value.is_connect() {
            ResponseError::NoConnection
        } else {
            ResponseError::Unknown
        }
    }
}
