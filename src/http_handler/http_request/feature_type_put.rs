use super::map_server_ack::MapServerAckResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};

#[derive(serde::Serialize, Debug)]
pub(crate) struct FeatureType {
    pub(crate) enabled: bool,
    pub(crate) srs: String,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeatureTypeBody {
    pub(crate) feature_type: FeatureType,
}

/// Request type for PUT /rest/workspaces/{ws}/datastores/{store}/featuretypes/{name}.json
#[derive(Debug)]
pub(crate) struct FeatureTypePutRequest {
    pub(crate) workspace: String,
    pub(crate) store: String,
    pub(crate) name: String,
    pub(crate) body: FeatureTypeBody,
}

impl JSONBodyHTTPRequestType for FeatureTypePutRequest {
    type Body = FeatureTypeBody;
    fn body(&self) -> &Self::Body { &self.body }
}

impl HTTPRequestType for FeatureTypePutRequest {
    type Response = MapServerAckResponse;
    fn endpoint(&self) -> String {
        format!(
            "/rest/workspaces/{}/datastores/{}/featuretypes/{}.json",
            self.workspace, self.store, self.name
        )
    }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
