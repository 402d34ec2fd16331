#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod collaborators;
mod console;
mod flight_control;
mod formula;
mod http_handler;
mod pipeline;
mod util;

use crate::console::{ConsoleEndpoint, ConsoleMessenger};
use crate::flight_control::FlightRegistry;
use crate::util::{Keychain, PipelineConfig};
use tokio::io::{BufReader, stdin, stdout};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = PipelineConfig::from_env();
    info!(
        "Starting orthoflow on {} (jobs: {}, map server: {})",
        config.data_root.display(),
        config.nodeodm_url,
        config.geoserver_url
    );
    let registry = match &config.catalog_path {
        Some(path) => FlightRegistry::load(path)
            .await
            .unwrap_or_else(|e| fatal!("Catalog {} unusable: {e}", path.display())),
        None => FlightRegistry::new(),
    };
    let keychain =
        Keychain::new(config, registry).unwrap_or_else(|e| fatal!("HTTP client setup failed: {e}"));

    let messenger = ConsoleMessenger::new(&keychain);
    match ConsoleEndpoint::new(&messenger).serve(BufReader::new(stdin()), stdout()).await {
        Ok(answered) => info!("Shutting down after {answered} commands"),
        Err(e) => error!("Console stream failed: {e}"),
    }
}
