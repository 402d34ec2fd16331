use super::map_server_ack::MapServerAckResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};

#[derive(serde::Serialize, Debug)]
pub(crate) struct StyleRef {
    pub(crate) name: String,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LayerStyle {
    pub(crate) default_style: StyleRef,
}

#[derive(serde::Serialize, Debug)]
pub(crate) struct LayerStyleBody {
    pub(crate) layer: LayerStyle,
}

/// Request type for PUT /rest/layers/{ws}:{layer}.json
#[derive(Debug)]
pub(crate) struct LayerStylePutRequest {
    pub(crate) workspace: String,
    pub(crate) layer: String,
    pub(crate) body: LayerStyleBody,
}

impl LayerStylePutRequest {
    pub(crate) fn new(workspace: &str, layer: &str, style: &str) -> Self {
        Self {
            workspace: workspace.to_string(),
            layer: layer.to_string(),
            body: LayerStyleBody {
                layer: LayerStyle { default_style: StyleRef { name: style.to_string() } },
            },
        }
    }
}

impl JSONBodyHTTPRequestType for LayerStylePutRequest {
    type Body = LayerStyleBody;
    fn body(&self) -> &Self::Body { &self.body }
}

impl HTTPRequestType for LayerStylePutRequest {
    type Response = MapServerAckResponse;
    fn endpoint(&self) -> String { format!("/rest/layers/{}:{}.json", self.workspace, self.layer) }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
