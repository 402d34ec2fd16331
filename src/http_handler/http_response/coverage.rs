use super::response_common::SerdeJSONBodyHTTPResponseType;

/// Native extent of a raster coverage.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CoverageDescription {
    pub(crate) native_bounding_box: BoundingBox,
    pub(crate) srs: String,
}

/// Response type for GET .../coveragestores/{store}/coverages/{name}.json
#[derive(serde::Deserialize, Debug, Clone)]
pub(crate) struct CoverageResponse {
    pub(crate) coverage: CoverageDescription,
}

impl SerdeJSONBodyHTTPResponseType for CoverageResponse {}
