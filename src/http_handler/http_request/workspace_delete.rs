use super::map_server_ack::MapServerAckResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};

/// Request type for DELETE /rest/workspaces/{workspace}, removing every
/// store and layer inside it.
#[derive(Debug)]
pub(crate) struct WorkspaceDeleteRequest {
    pub(crate) workspace: String,
}

impl NoBodyHTTPRequestType for WorkspaceDeleteRequest {}

impl HTTPRequestType for WorkspaceDeleteRequest {
    type Response = MapServerAckResponse;
    fn endpoint(&self) -> String { format!("/rest/workspaces/{}", self.workspace) }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Delete }
    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![("recurse", String::from("true"))]
    }
}
