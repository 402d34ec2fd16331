use super::map_server_ack::MapServerAckResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, TextBodyHTTPRequestType};
use strum_macros::Display;

/// Raster store backed by files the map server reads in place.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CoverageStoreKind {
    /// A single GeoTIFF file.
    #[strum(serialize = "geotiff")]
    GeoTiff,
    /// A folder of time-stamped granules.
    #[strum(serialize = "imagemosaic")]
    ImageMosaic,
}

/// Request type for PUT /rest/workspaces/{ws}/coveragestores/{store}/external.{kind}.
#[derive(Debug)]
pub(crate) struct CoverageStorePutRequest {
    pub(crate) workspace: String,
    pub(crate) store: String,
    pub(crate) kind: CoverageStoreKind,
    /// `file://` URL of the GeoTIFF or mosaic folder as seen by the map server.
    pub(crate) file_url: String,
}

impl TextBodyHTTPRequestType for CoverageStorePutRequest {
    fn body(&self) -> String { self.file_url.clone() }
}

impl HTTPRequestType for CoverageStorePutRequest {
    type Response = MapServerAckResponse;
    fn endpoint(&self) -> String {
        format!(
            "/rest/workspaces/{}/coveragestores/{}/external.{}",
            self.workspace, self.store, self.kind
        )
    }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
