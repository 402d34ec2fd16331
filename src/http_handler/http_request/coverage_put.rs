use super::map_server_ack::MapServerAckResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionInfo {
    pub enabled: bool,
    pub presentation: String,
    pub units: String,
    pub default_value: String,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    #[serde(rename = "@key")]
    pub key: String,
    #[serde(rename = "dimensionInfo")]
    pub dimension_info: DimensionInfo,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct MetadataEntries {
    pub entry: Vec<MetadataEntry>,
}

/// A `{"string": [key, value]}` coverage parameter.
#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct ParameterEntry {
    pub string: [String; 2],
}

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct ParameterEntries {
    pub entry: Vec<ParameterEntry>,
}

/// Partial coverage description; unset fields are left untouched by the map server.
#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct CoverageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataEntries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterEntries>,
}

impl CoverageUpdate {
    pub fn enabled() -> Self {
        Self { name: None, title: None, enabled: true, metadata: None, parameters: None }
    }

    /// Publishes the coverage under `name`, also used as its title.
    pub fn renamed(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self.title = Some(name.to_string());
        self
    }

    /// Enables the list-presented ISO8601 time dimension of a mosaic.
    pub fn with_time_dimension(mut self) -> Self {
        let entry = MetadataEntry {
            key: String::from("time"),
            dimension_info: DimensionInfo {
                enabled: true,
                presentation: String::from("LIST"),
                units: String::from("ISO8601"),
                default_value: String::new(),
            },
        };
        self.metadata.get_or_insert_with(|| MetadataEntries { entry: Vec::new() }).entry.push(entry);
        self
    }

    pub fn with_parameter(mut self, key: &str, value: &str) -> Self {
        let entry = ParameterEntry { string: [key.to_string(), value.to_string()] };
        self.parameters.get_or_insert_with(|| ParameterEntries { entry: Vec::new() }).entry.push(entry);
        self
    }
}

#[derive(serde::Serialize, Debug)]
pub(crate) struct CoverageBody {
    pub(crate) coverage: CoverageUpdate,
}

/// Request type for PUT /rest/workspaces/{ws}/coveragestores/{store}/coverages/{coverage}.json
#[derive(Debug)]
pub(crate) struct CoveragePutRequest {
    pub(crate) workspace: String,
    pub(crate) store: String,
    pub(crate) coverage: String,
    pub(crate) body: CoverageBody,
}

impl JSONBodyHTTPRequestType for CoveragePutRequest {
    type Body = CoverageBody;
    fn body(&self) -> &Self::Body { &self.body }
}

impl HTTPRequestType for CoveragePutRequest {
    type Response = MapServerAckResponse;
    fn endpoint(&self) -> String {
        format!(
            "/rest/workspaces/{}/coveragestores/{}/coverages/{}.json",
            self.workspace, self.store, self.coverage
        )
    }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}

#[cfg(test)]
mod tests {
    use super::CoverageUpdate;

    #[test]
    fn test_time_enabled_mosaic_payload() {
        let update = CoverageUpdate::enabled()
            .with_time_dimension()
            .with_parameter("OutputTransparentColor", "#000000");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "enabled": true,
                "metadata": {"entry": [{
                    "@key": "time",
                    "dimensionInfo": {
                        "enabled": true,
                        "presentation": "LIST",
                        "units": "ISO8601",
                        "defaultValue": ""
                    }
                }]},
                "parameters": {"entry": [{"string": ["OutputTransparentColor", "#000000"]}]}
            })
        );
    }

    #[test]
    fn test_renamed_geotiff_payload_omits_metadata() {
        let update = CoverageUpdate::enabled()
            .renamed("odm_orthophoto")
            .with_parameter("InputTransparentColor", "#000000")
            .with_parameter("SUGGESTED_TILE_SIZE", "512,512");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["name"], "odm_orthophoto");
        assert_eq!(json["title"], "odm_orthophoto");
        assert!(json.get("metadata").is_none());
        assert_eq!(json["parameters"]["entry"][1]["string"][1], "512,512");
    }
}
