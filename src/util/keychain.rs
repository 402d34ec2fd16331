use super::PipelineConfig;
use crate::collaborators::{
    GeoServerClient, MapServerClient, NodeOdmClient, ProcessRasterCalculator, RasterCalculator,
    ReconstructionJobClient,
};
use crate::flight_control::{FlightLocks, FlightRegistry};
use crate::http_handler::HTTPClient;
use std::sync::Arc;

/// Bundles the shared state and the collaborators every orchestrator needs.
///
/// # Fields
/// - `config`: Runtime configuration.
/// - `registry`: Store of flights and projects.
/// - `locks`: Per-flight tokens serializing artifact runs.
/// - `jobs`: The external reconstruction engine.
/// - `map_server`: The map-serving backend.
/// - `raster`: Runner for raster tools.
#[derive(Clone)]
pub struct Keychain {
    config: Arc<PipelineConfig>,
    registry: Arc<FlightRegistry>,
    locks: Arc<FlightLocks>,
    jobs: Arc<dyn ReconstructionJobClient>,
    map_server: Arc<dyn MapServerClient>,
    raster: Arc<dyn RasterCalculator>,
}

impl Keychain {
    /// Creates the production keychain talking to the configured services.
    ///
    /// # Errors
    /// Fails if an HTTP client cannot be constructed.
    pub fn new(config: PipelineConfig, registry: FlightRegistry) -> Result<Self, reqwest::Error> {
        let jobs = NodeOdmClient::new(HTTPClient::new(&config.nodeodm_url, config.http_timeout)?);
        let map_server = GeoServerClient::new(
            HTTPClient::new(&config.geoserver_url, config.http_timeout)?
                .with_basic_auth(&config.geoserver_user, &config.geoserver_password),
        );
        Ok(Self::with_collaborators(
            config,
            registry,
            Arc::new(jobs),
            Arc::new(map_server),
            Arc::new(ProcessRasterCalculator),
        ))
    }

    /// Creates a keychain around the given collaborators.
    pub fn with_collaborators(
        config: PipelineConfig,
        registry: FlightRegistry,
        jobs: Arc<dyn ReconstructionJobClient>,
        map_server: Arc<dyn MapServerClient>,
        raster: Arc<dyn RasterCalculator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            locks: Arc::new(FlightLocks::new()),
            jobs,
            map_server,
            raster,
        }
    }

    pub fn config(&self) -> Arc<PipelineConfig> { Arc::clone(&self.config) }
    pub fn registry(&self) -> Arc<FlightRegistry> { Arc::clone(&self.registry) }
    pub fn locks(&self) -> Arc<FlightLocks> { Arc::clone(&self.locks) }
    pub fn jobs(&self) -> Arc<dyn ReconstructionJobClient> { Arc::clone(&self.jobs) }
    pub fn map_server(&self) -> Arc<dyn MapServerClient> { Arc::clone(&self.map_server) }
    pub fn raster(&self) -> Arc<dyn RasterCalculator> { Arc::clone(&self.raster) }
}
