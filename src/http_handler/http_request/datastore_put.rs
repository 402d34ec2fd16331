use super::map_server_ack::MapServerAckResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, TextBodyHTTPRequestType};

/// Request type for PUT /rest/workspaces/{ws}/datastores/{store}/external.shp
#[derive(Debug)]
pub(crate) struct ShapefileStorePutRequest {
    pub(crate) workspace: String,
    pub(crate) store: String,
    pub(crate) file_url: String,
}

impl TextBodyHTTPRequestType for ShapefileStorePutRequest {
    fn body(&self) -> String { self.file_url.clone() }
}

impl HTTPRequestType for ShapefileStorePutRequest {
    type Response = MapServerAckResponse;
    fn endpoint(&self) -> String {
        format!("/rest/workspaces/{}/datastores/{}/external.shp", self.workspace, self.store)
    }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
