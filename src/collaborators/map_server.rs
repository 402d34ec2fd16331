use super::{BoundingBox, CoverageStoreKind, CoverageUpdate, ExternalServiceError};
use crate::http_handler::http_request::{
    coverage_get::CoverageGetRequest,
    coverage_put::{CoverageBody, CoveragePutRequest},
    coverage_store_put::CoverageStorePutRequest,
    datastore_put::ShapefileStorePutRequest,
    feature_type_put::{FeatureType, FeatureTypeBody, FeatureTypePutRequest},
    layer_style_put::LayerStylePutRequest,
    request_common::{JSONBodyHTTPRequestType, NoBodyHTTPRequestType, TextBodyHTTPRequestType},
    workspace_delete::WorkspaceDeleteRequest,
    workspace_post::WorkspaceCreateRequest,
};
use crate::http_handler::http_response::response_common::ResponseError;
use crate::http_handler::{HTTPClient, HTTPError};
use crate::{event, log};
use async_trait::async_trait;

const SERVICE: &str = "map server";

/// Native extent and reference system of a published coverage.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CoverageExtent {
    pub bbox: BoundingBox,
    pub srs: String,
}

/// The map-serving backend. Every write is at-least-once: creating a
/// resource that already exists succeeds.
#[async_trait(?Send)]
pub trait MapServerClient {
    async fn create_workspace(&self, workspace: &str) -> Result<(), ExternalServiceError>;
    /// Removes the workspace with all its stores and layers.
    async fn delete_workspace(&self, workspace: &str) -> Result<(), ExternalServiceError>;
    async fn create_coverage_store(
        &self,
        workspace: &str,
        store: &str,
        kind: CoverageStoreKind,
        file_url: &str,
    ) -> Result<(), ExternalServiceError>;
    async fn update_coverage(
        &self,
        workspace: &str,
        store: &str,
        coverage: &str,
        update: &CoverageUpdate,
    ) -> Result<(), ExternalServiceError>;
    async fn set_default_style(
        &self,
        workspace: &str,
        layer: &str,
        style: &str,
    ) -> Result<(), ExternalServiceError>;
    async fn create_shapefile_store(
        &self,
        workspace: &str,
        store: &str,
        file_url: &str,
    ) -> Result<(), ExternalServiceError>;
    async fn create_feature_type(
        &self,
        workspace: &str,
        store: &str,
        name: &str,
        srs: &str,
    ) -> Result<(), ExternalServiceError>;
    async fn coverage_extent(
        &self,
        workspace: &str,
        store: &str,
        coverage: &str,
    ) -> Result<CoverageExtent, ExternalServiceError>;
}

/// [`MapServerClient`] speaking the GeoServer REST API with basic auth.
#[derive(Debug)]
pub struct GeoServerClient {
    client: HTTPClient,
}

impl GeoServerClient {
    pub(crate) fn new(client: HTTPClient) -> Self { Self { client } }
}

/// Treats "already exists" answers as success.
fn tolerate_existing(result: Result<(), HTTPError>, what: &str) -> Result<(), ExternalServiceError> {
    match result {
        Err(e) if e.is_already_exists() => {
            log!("{what} already exists, keeping it");
            Ok(())
        }
        other => other.map_err(ExternalServiceError::http(SERVICE)),
    }
}

#[async_trait(?Send)]
impl MapServerClient for GeoServerClient {
    async fn create_workspace(&self, workspace: &str) -> Result<(), ExternalServiceError> {
        let result = WorkspaceCreateRequest::new(workspace).send_request(&self.client).await;
        tolerate_existing(result, &format!("Workspace {workspace}"))?;
        event!("Map-server workspace {workspace} ready");
        Ok(())
    }

    async fn delete_workspace(&self, workspace: &str) -> Result<(), ExternalServiceError> {
        let request = WorkspaceDeleteRequest { workspace: workspace.to_string() };
        match request.send_request(&self.client).await {
            Err(HTTPError::HTTPResponseError(ResponseError::NotFound(_))) => {
                log!("Workspace {workspace} was already gone");
                Ok(())
            }
            other => other.map_err(ExternalServiceError::http(SERVICE)),
        }
    }

    async fn create_coverage_store(
        &self,
        workspace: &str,
        store: &str,
        kind: CoverageStoreKind,
        file_url: &str,
    ) -> Result<(), ExternalServiceError> {
        let request = CoverageStorePutRequest {
            workspace: workspace.to_string(),
            store: store.to_string(),
            kind,
            file_url: file_url.to_string(),
        };
        tolerate_existing(request.send_request(&self.client).await, &format!("Store {store}"))?;
        event!("Registered {kind} store {workspace}:{store} at {file_url}");
        Ok(())
    }

    async fn update_coverage(
        &self,
        workspace: &str,
        store: &str,
        coverage: &str,
        update: &CoverageUpdate,
    ) -> Result<(), ExternalServiceError> {
        CoveragePutRequest {
            workspace: workspace.to_string(),
            store: store.to_string(),
            coverage: coverage.to_string(),
            body: CoverageBody { coverage: update.clone() },
        }
        .send_request(&self.client)
        .await
        .map_err(ExternalServiceError::http(SERVICE))
    }

    async fn set_default_style(
        &self,
        workspace: &str,
        layer: &str,
        style: &str,
    ) -> Result<(), ExternalServiceError> {
        LayerStylePutRequest::new(workspace, layer, style)
            .send_request(&self.client)
            .await
            .map_err(ExternalServiceError::http(SERVICE))
    }

    async fn create_shapefile_store(
        &self,
        workspace: &str,
        store: &str,
        file_url: &str,
    ) -> Result<(), ExternalServiceError> {
        let request = ShapefileStorePutRequest {
            workspace: workspace.to_string(),
            store: store.to_string(),
            file_url: file_url.to_string(),
        };
        tolerate_existing(request.send_request(&self.client).await, &format!("Datastore {store}"))
    }

    async fn create_feature_type(
        &self,
        workspace: &str,
        store: &str,
        name: &str,
        srs: &str,
    ) -> Result<(), ExternalServiceError> {
        let request = FeatureTypePutRequest {
            workspace: workspace.to_string(),
            store: store.to_string(),
            name: name.to_string(),
            body: FeatureTypeBody {
                feature_type: FeatureType { enabled: true, srs: srs.to_string() },
            },
        };
        tolerate_existing(request.send_request(&self.client).await, &format!("Feature type {name}"))
    }

    async fn coverage_extent(
        &self,
        workspace: &str,
        store: &str,
        coverage: &str,
    ) -> Result<CoverageExtent, ExternalServiceError> {
        let response = CoverageGetRequest {
            workspace: workspace.to_string(),
            store: store.to_string(),
            coverage: coverage.to_string(),
        }
        .send_request(&self.client)
        .await
        .map_err(ExternalServiceError::http(SERVICE))?;
        Ok(CoverageExtent {
            bbox: response.coverage.native_bounding_box,
            srs: response.coverage.srs,
        })
    }
}
