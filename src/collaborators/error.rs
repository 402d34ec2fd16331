use crate::http_handler::HTTPError;
use std::fmt;

/// Failure of a collaborator: a non-success answer from the job API or the
/// map server, or a raster tool that could not run or exited non-zero.
#[derive(Debug)]
pub enum ExternalServiceError {
    Http { service: &'static str, source: HTTPError },
    Tool { program: String, status: Option<i32>, stderr: String },
    Spawn { program: String, source: std::io::Error },
    InvalidInput(String),
}

impl ExternalServiceError {
    pub(crate) fn http(service: &'static str) -> impl FnOnce(HTTPError) -> Self {
        move |source| ExternalServiceError::Http { service, source }
    }
}

impl fmt::Display for ExternalServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalServiceError::Http { service, source } => {
                write!(f, "{service} request failed: {source}")?;
                if let HTTPError::HTTPResponseError(e) = source {
                    write!(f, " ({e:?})")?;
                }
                Ok(())
            }
            ExternalServiceError::Tool { program, status, stderr } => match status {
                Some(code) => write!(f, "{program} exited with {code}: {stderr}"),
                None => write!(f, "{program} terminated by signal: {stderr}"),
            },
            ExternalServiceError::Spawn { program, source } => {
                write!(f, "could not start {program}: {source}")
            }
            ExternalServiceError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for ExternalServiceError {}
