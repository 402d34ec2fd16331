//! Flights, projects and their lifecycle: state machine, registry and the
//! service orchestrating reconstruction jobs.

mod camera_kind;
mod flight;
mod flight_locks;
mod flight_service;
mod flight_state;
mod project;
mod registry;
mod state_machine;

#[cfg(test)]
mod tests;

pub use camera_kind::CameraKind;
pub use flight::Flight;
pub use flight_locks::FlightLocks;
pub use flight_service::{CallbackStatus, Deletion, FlightService, ProcessingCallback, ServiceError};
pub use flight_state::{FlightState, JobStatusCode};
pub use project::{Artifact, ArtifactKind, Project};
pub use registry::{FlightRegistry, RegistryError};
pub use state_machine::{FlightStateMachine, Transition, TransitionError};
