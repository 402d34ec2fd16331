use super::map_server_ack::MapServerAckResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};

#[derive(serde::Serialize, Debug)]
pub(crate) struct WorkspaceName {
    pub(crate) name: String,
}

/// Request type for POST /rest/workspaces.
#[derive(serde::Serialize, Debug)]
pub(crate) struct WorkspaceCreateRequest {
    pub(crate) workspace: WorkspaceName,
}

impl WorkspaceCreateRequest {
    pub(crate) fn new(name: &str) -> Self {
        Self { workspace: WorkspaceName { name: name.to_string() } }
    }
}

impl JSONBodyHTTPRequestType for WorkspaceCreateRequest {
    type Body = WorkspaceCreateRequest;
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for WorkspaceCreateRequest {
    type Response = MapServerAckResponse;
    fn endpoint(&self) -> String { String::from("/rest/workspaces") }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
}
