mod config;
mod keychain;
pub mod logger;

pub use config::{IndexScaling, PipelineConfig};
pub use keychain::Keychain;
