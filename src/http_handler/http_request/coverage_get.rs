use super::coverage::CoverageResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};

/// Request type for GET /rest/workspaces/{ws}/coveragestores/{store}/coverages/{coverage}.json
#[derive(Debug)]
pub(crate) struct CoverageGetRequest {
    pub(crate) workspace: String,
    pub(crate) store: String,
    pub(crate) coverage: String,
}

impl NoBodyHTTPRequestType for CoverageGetRequest {}

impl HTTPRequestType for CoverageGetRequest {
    type Response = CoverageResponse;
    fn endpoint(&self) -> String {
        format!(
            "/rest/workspaces/{}/coveragestores/{}/coverages/{}.json",
            self.workspace, self.store, self.coverage
        )
    }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
}
