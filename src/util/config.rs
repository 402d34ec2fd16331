use std::{env, path::PathBuf, str::FromStr, time::Duration};

/// Byte scaling applied to index rasters: `(ratio + offset) * gain`, written
/// as an 8-bit raster with `nodata` as the sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndexScaling {
    pub offset: f64,
    pub gain: f64,
    pub nodata: i32,
}

impl Default for IndexScaling {
    /// Maps a normalized difference in `[-1, 1]` onto `[0, 254]`, centered at 127.
    fn default() -> Self { Self { offset: 1.0, gain: 127.0, nodata: -1 } }
}

/// Runtime configuration, read from `ORTHOFLOW_*` environment variables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory containing the `flights/` and `projects/` workspaces.
    pub data_root: PathBuf,
    /// Base URL of the reconstruction job service.
    pub nodeodm_url: String,
    /// URL the reconstruction service calls back when a job ends.
    pub webhook_url: String,
    /// Base URL of the map-server REST API (without the trailing `/rest`).
    pub geoserver_url: String,
    pub geoserver_user: String,
    pub geoserver_password: String,
    /// Location of `<root>/flights` as seen by the map server.
    pub geoserver_flight_mount: String,
    /// Location of `<root>/projects` as seen by the map server.
    pub geoserver_project_mount: String,
    pub index_scaling: IndexScaling,
    pub http_timeout: Duration,
    /// Optional JSON catalog snapshot loaded at start and saved after mutations.
    pub catalog_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("/"),
            nodeodm_url: String::from("http://localhost:3000"),
            webhook_url: String::from("http://localhost:8000/api/webhook-processing-complete"),
            geoserver_url: String::from("http://localhost/geoserver/geoserver"),
            geoserver_user: String::from("admin"),
            geoserver_password: String::from("geoserver"),
            geoserver_flight_mount: String::from("file:///media/input"),
            geoserver_project_mount: String::from("file:///media/USB"),
            index_scaling: IndexScaling::default(),
            http_timeout: Duration::from_secs(30),
            catalog_path: None,
        }
    }
}

impl PipelineConfig {
    /// Builds the configuration from the process environment, falling back to
    /// the defaults for every unset or unparsable variable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let scaling = IndexScaling {
            offset: parse_var("ORTHOFLOW_INDEX_OFFSET", defaults.index_scaling.offset),
            gain: parse_var("ORTHOFLOW_INDEX_GAIN", defaults.index_scaling.gain),
            nodata: parse_var("ORTHOFLOW_INDEX_NODATA", defaults.index_scaling.nodata),
        };
        Self {
            data_root: env::var("ORTHOFLOW_DATA_ROOT").map_or(defaults.data_root, PathBuf::from),
            nodeodm_url: string_var("ORTHOFLOW_NODEODM_URL", defaults.nodeodm_url),
            webhook_url: string_var("ORTHOFLOW_WEBHOOK_URL", defaults.webhook_url),
            geoserver_url: string_var("ORTHOFLOW_GEOSERVER_URL", defaults.geoserver_url),
            geoserver_user: string_var("ORTHOFLOW_GEOSERVER_USER", defaults.geoserver_user),
            geoserver_password: string_var(
                "ORTHOFLOW_GEOSERVER_PASSWORD",
                defaults.geoserver_password,
            ),
            geoserver_flight_mount: string_var(
                "ORTHOFLOW_GEOSERVER_FLIGHT_MOUNT",
                defaults.geoserver_flight_mount,
            ),
            geoserver_project_mount: string_var(
                "ORTHOFLOW_GEOSERVER_PROJECT_MOUNT",
                defaults.geoserver_project_mount,
            ),
            index_scaling: scaling,
            http_timeout: Duration::from_secs(parse_var(
                "ORTHOFLOW_HTTP_TIMEOUT_SECS",
                defaults.http_timeout.as_secs(),
            )),
            catalog_path: env::var("ORTHOFLOW_CATALOG").ok().map(PathBuf::from),
        }
    }

    pub fn flights_root(&self) -> PathBuf { self.data_root.join("flights") }

    pub fn projects_root(&self) -> PathBuf { self.data_root.join("projects") }
}

fn string_var(key: &str, default: String) -> String {
    env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            crate::warn!("Ignoring unparsable value '{raw}' for {key}");
            default
        }),
        Err(_) => default,
    }
}
