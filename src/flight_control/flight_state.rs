use strum_macros::{Display, EnumIter};

/// Lifecycle state of a flight.
#[derive(
    Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightState {
    /// Created, waiting for imagery to be uploaded and committed.
    #[strum(serialize = "Waiting for images")]
    Waiting,
    /// Reconstruction job committed and running externally.
    Processing,
    Complete,
    Error,
    Canceled,
    /// Set and cleared by an administrator only.
    Paused,
}

impl FlightState {
    /// `Complete`, `Error` and `Canceled` stay in place until the flight is
    /// re-submitted or deleted.
    pub fn is_terminal(self) -> bool {
        matches!(self, FlightState::Complete | FlightState::Error | FlightState::Canceled)
    }
}

/// Job status codes carried by reconstruction callbacks.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum JobStatusCode {
    Failed,
    Succeeded,
    Canceled,
}

impl JobStatusCode {
    /// Maps a raw callback code; codes other than 30, 40 and 50 carry no
    /// transition and yield `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            30 => Some(JobStatusCode::Failed),
            40 => Some(JobStatusCode::Succeeded),
            50 => Some(JobStatusCode::Canceled),
            _ => None,
        }
    }

    pub fn target_state(self) -> FlightState {
        match self {
            JobStatusCode::Failed => FlightState::Error,
            JobStatusCode::Succeeded => FlightState::Complete,
            JobStatusCode::Canceled => FlightState::Canceled,
        }
    }
}
