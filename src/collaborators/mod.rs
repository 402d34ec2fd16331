//! Capabilities the orchestration code needs from the outside world.
//!
//! Each trait is narrow and injected through the [`crate::util::Keychain`],
//! so pipeline and service logic can be exercised against in-memory fakes.

mod error;
mod map_server;
mod raster_calculator;
mod reconstruction_job;
mod tool_invocation;

#[cfg(test)]
pub(crate) mod fakes;

pub use error::ExternalServiceError;
pub use map_server::{CoverageExtent, GeoServerClient, MapServerClient};
pub use raster_calculator::{ProcessRasterCalculator, RasterCalculator};
pub use reconstruction_job::{JobInfo, NodeOdmClient, ReconstructionJobClient};
pub use tool_invocation::ToolInvocation;

pub use crate::http_handler::http_request::coverage_put::CoverageUpdate;
pub use crate::http_handler::http_request::coverage_store_put::CoverageStoreKind;
pub use crate::http_handler::http_request::task_init_post::TaskOption;
pub use crate::http_handler::http_response::coverage::BoundingBox;
