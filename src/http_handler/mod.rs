pub mod http_client;
pub mod http_handler_common;
pub mod http_request;
pub mod http_response;

pub(crate) use http_client::HTTPClient;
pub use http_handler_common::HTTPError;
