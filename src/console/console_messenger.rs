use super::{Command, Response};
use crate::flight_control::{FlightRegistry, FlightService, Transition};
use crate::formula::{CommandCompiler, FormulaValidator};
use crate::pipeline::{ArtifactPipeline, IndexProvisioner, ProjectPublisher};
use crate::util::{Keychain, PipelineConfig};
use crate::{error, event};
use serde_json::json;
use std::fmt::Display;
use std::sync::Arc;
use uuid::Uuid;

/// Dispatches console commands to the orchestrators and saves the catalog
/// after every command that changed it.
pub struct ConsoleMessenger {
    config: Arc<PipelineConfig>,
    registry: Arc<FlightRegistry>,
    flights: FlightService,
    pipeline: ArtifactPipeline,
    provisioner: IndexProvisioner,
    publisher: ProjectPublisher,
}

impl ConsoleMessenger {
    pub fn new(keychain: &Keychain) -> Self {
        Self {
            config: keychain.config(),
            registry: keychain.registry(),
            flights: FlightService::new(keychain),
            pipeline: ArtifactPipeline::new(keychain),
            provisioner: IndexProvisioner::new(keychain),
            publisher: ProjectPublisher::new(keychain),
        }
    }

    /// Parses and executes one input line.
    pub async fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Command>(line) {
            Ok(command) => self.handle(command).await,
            Err(e) => Response::failure(format!("malformed command: {e}")),
        }
    }

    pub async fn handle(&self, command: Command) -> Response {
        event!("Console command {command:?}");
        let mutates = command.mutates();
        let response = self.dispatch(command).await;
        if mutates && response.ok {
            self.save_catalog().await;
        }
        response
    }

    async fn save_catalog(&self) {
        if let Some(path) = &self.config.catalog_path {
            if let Err(e) = self.registry.save(path).await {
                error!("Saving catalog to {} failed: {e}", path.display());
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    async fn dispatch(&self, command: Command) -> Response {
        match command {
            Command::CheckFormula { formula, camera } => match FormulaValidator::check(&formula, camera) {
                Ok(()) => Response::success(json!({ "valid": true })),
                Err(e) => Response::failure(e),
            },
            Command::Compile { index, formula, camera } => respond(
                CommandCompiler::new(self.config.index_scaling)
                    .compile(&index, &formula, camera)
                    .map(|invocation| invocation.to_string()),
            ),
            Command::CreateFlight { name, owner, date, camera, annotations } => respond(
                self.flights
                    .create_flight(&name, owner.as_deref(), date, camera, &annotations)
                    .await,
            ),
            Command::UploadImages { flight, images } => {
                respond_transition(self.flights.upload_images(flight, &images).await)
            }
            Command::Webhook(callback) => respond(self.flights.handle_callback(&callback).await),
            Command::JobInfo { flight } => respond(
                self.flights.job_info(flight).await.map(|info| info.map_or(json!({}), |i| json!(i))),
            ),
            Command::ListFlights { owner, deleted } => {
                let flights = if deleted {
                    self.flights.deleted_flights(owner.as_deref()).await
                } else {
                    self.flights.flights(owner.as_deref()).await
                };
                respond(Ok::<_, std::convert::Infallible>(flights))
            }
            Command::RunPipeline { flight } => match self.registry.flight(flight).await {
                Some(f) => respond(self.pipeline.run(&f).await),
                None => flight_not_found(flight),
            },
            Command::RetryStep { flight, step } => match self.registry.flight(flight).await {
                Some(f) => respond(self.pipeline.run_step(&f, step).await.map(|()| json!({ "step": step }))),
                None => flight_not_found(flight),
            },
            Command::Pause { flight } => respond_transition(self.flights.pause(flight).await),
            Command::Resume { flight } => respond_transition(self.flights.resume(flight).await),
            Command::Resubmit { flight } => respond_transition(self.flights.resubmit(flight).await),
            Command::RenameFlight { flight, name } => respond(self.flights.rename_flight(flight, &name).await),
            Command::DeleteFlight { flight } => respond(self.flights.delete_flight(flight).await),
            Command::RestoreFlight { flight } => respond(self.flights.restore_flight(flight).await),
            Command::MakeDemo { flight } => respond(self.flights.make_demo(flight).await),
            Command::UnmakeDemo { flight, admin } => respond(self.flights.unmake_demo(flight, &admin).await),
            Command::PreviewExtent { flight } => respond(self.flights.preview_extent(flight).await),
            Command::CreateProject { name, description, owner, flights } => respond(
                self.publisher.create(&name, &description, owner.as_deref(), &flights).await,
            ),
            Command::CreateIndex { project, index, formula } => match self.registry.project(project).await {
                Some(p) => respond(self.provisioner.provision(&p, &index, &formula).await),
                None => Response::failure(format!("project {project} not found")),
            },
            Command::AddOrthomosaic { project, file, title } => {
                respond(self.publisher.add_orthomosaic(project, &file, &title).await)
            }
            Command::AddVectorLayer { project, files, title } => {
                respond(self.publisher.add_vector_layer(project, &files, &title).await)
            }
            Command::ProjectLayers { project } => respond(self.publisher.layers(project).await),
            Command::ProjectIndices { project } => respond(self.publisher.indices(project).await),
            Command::ProjectExtent { project } => respond(self.publisher.bounding_box(project).await),
            Command::MakeDemoProject { project } => respond(self.publisher.make_demo(project).await),
            Command::UnmakeDemoProject { project, admin } => {
                respond(self.publisher.unmake_demo(project, &admin).await)
            }
            Command::DeleteProject { project } => respond(self.publisher.delete(project).await),
        }
    }
}

fn respond<T: serde::Serialize, E: Display>(result: Result<T, E>) -> Response {
    match result.map(serde_json::to_value) {
        Ok(Ok(value)) => Response::success(value),
        Ok(Err(e)) => Response::failure(e),
        Err(e) => Response::failure(e),
    }
}

fn respond_transition<E: Display>(result: Result<Transition, E>) -> Response {
    respond(result.map(|t| json!({ "from": t.from, "to": t.to })))
}

fn flight_not_found(flight: Uuid) -> Response { Response::failure(format!("flight {flight} not found")) }
