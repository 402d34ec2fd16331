use crate::flight_control::{CameraKind, ProcessingCallback};
use crate::pipeline::PipelineStep;
use chrono::NaiveDate;
use std::path::PathBuf;
use uuid::Uuid;

/// One console request, tagged by `"command"`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    CheckFormula {
        formula: String,
        #[serde(default = "multiband")]
        camera: CameraKind,
    },
    Compile {
        index: String,
        #[serde(default)]
        formula: String,
        #[serde(default = "multiband")]
        camera: CameraKind,
    },
    CreateFlight {
        name: String,
        owner: Option<String>,
        date: NaiveDate,
        camera: CameraKind,
        #[serde(default)]
        annotations: String,
    },
    UploadImages {
        flight: Uuid,
        images: Vec<PathBuf>,
    },
    /// Reconstruction callback, same body the job service posts.
    Webhook(ProcessingCallback),
    JobInfo {
        flight: Uuid,
    },
    ListFlights {
        owner: Option<String>,
        #[serde(default)]
        deleted: bool,
    },
    RunPipeline {
        flight: Uuid,
    },
    RetryStep {
        flight: Uuid,
        step: PipelineStep,
    },
    Pause {
        flight: Uuid,
    },
    Resume {
        flight: Uuid,
    },
    Resubmit {
        flight: Uuid,
    },
    RenameFlight {
        flight: Uuid,
        name: String,
    },
    DeleteFlight {
        flight: Uuid,
    },
    RestoreFlight {
        flight: Uuid,
    },
    MakeDemo {
        flight: Uuid,
    },
    UnmakeDemo {
        flight: Uuid,
        admin: String,
    },
    PreviewExtent {
        flight: Uuid,
    },
    CreateProject {
        name: String,
        #[serde(default)]
        description: String,
        owner: Option<String>,
        flights: Vec<Uuid>,
    },
    CreateIndex {
        project: Uuid,
        index: String,
        #[serde(default)]
        formula: String,
    },
    AddOrthomosaic {
        project: Uuid,
        file: PathBuf,
        title: String,
    },
    AddVectorLayer {
        project: Uuid,
        files: Vec<PathBuf>,
        title: String,
    },
    ProjectLayers {
        project: Uuid,
    },
    ProjectIndices {
        project: Uuid,
    },
    ProjectExtent {
        project: Uuid,
    },
    MakeDemoProject {
        project: Uuid,
    },
    UnmakeDemoProject {
        project: Uuid,
        admin: String,
    },
    DeleteProject {
        project: Uuid,
    },
}

fn multiband() -> CameraKind { CameraKind::Multiband }

impl Command {
    /// `false` for commands that only read state.
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Command::CheckFormula { .. }
                | Command::Compile { .. }
                | Command::JobInfo { .. }
                | Command::ListFlights { .. }
                | Command::PreviewExtent { .. }
                | Command::ProjectLayers { .. }
                | Command::ProjectIndices { .. }
                | Command::ProjectExtent { .. }
        )
    }
}

/// Answer to one command.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn success(result: serde_json::Value) -> Self { Self { ok: true, result: Some(result), error: None } }

    pub fn failure(error: impl ToString) -> Self {
        Self { ok: false, result: None, error: Some(error.to_string()) }
    }
}
