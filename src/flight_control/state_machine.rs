use super::{Flight, FlightState, JobStatusCode};
use crate::event;
use std::fmt;

/// An applied state change.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Transition {
    pub from: FlightState,
    pub to: FlightState,
}

impl Transition {
    /// `true` only for the single transition that completes a flight.
    pub fn triggers_pipeline(self) -> bool {
        self.to == FlightState::Complete && self.from == FlightState::Processing
    }
}

/// A requested transition that is not defined for the current state.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TransitionError {
    pub from: FlightState,
    pub requested: FlightState,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no transition from {} to {}", self.from, self.requested)
    }
}

impl std::error::Error for TransitionError {}

/// Central place for every flight state change.
///
/// ```text
/// Waiting ──commit──▶ Processing ──callback 40/30/50──▶ Complete | Error | Canceled
///    ▲                                                            │
///    └──────────────────────── resubmit ──────────────────────────┘
/// ```
/// `Paused` is entered and left through [`FlightStateMachine::pause`] and
/// [`FlightStateMachine::resume`] only.
pub struct FlightStateMachine;

impl FlightStateMachine {
    /// Imagery was uploaded and the reconstruction job committed.
    ///
    /// # Errors
    /// Fails unless the flight is `Waiting`.
    pub fn commit_upload(flight: &mut Flight) -> Result<Transition, TransitionError> {
        Self::expect(flight, &[FlightState::Waiting], FlightState::Processing)?;
        flight.set_processing_time(0);
        Ok(Self::apply(flight, FlightState::Processing))
    }

    /// Applies a reconstruction callback.
    ///
    /// Returns `None` when the code is not one of 30, 40, 50 or the flight is
    /// not `Processing`; callbacks may be redelivered and must not corrupt the
    /// state, so a second success for a completed flight is a no-op.
    pub fn apply_callback(flight: &mut Flight, code: i64, processing_time: u64) -> Option<Transition> {
        let Some(status) = JobStatusCode::from_code(code) else {
            event!("Ignoring callback code {code} for flight {}", flight.uuid());
            return None;
        };
        if flight.state() != FlightState::Processing {
            event!(
                "Ignoring callback code {code} for flight {} in state {}",
                flight.uuid(),
                flight.state()
            );
            return None;
        }
        flight.set_processing_time(processing_time);
        Some(Self::apply(flight, status.target_state()))
    }

    /// New imagery for a flight that already ended; it starts over in `Waiting`.
    ///
    /// # Errors
    /// Fails unless the flight is in a terminal state.
    pub fn resubmit(flight: &mut Flight) -> Result<Transition, TransitionError> {
        Self::expect(
            flight,
            &[FlightState::Complete, FlightState::Error, FlightState::Canceled],
            FlightState::Waiting,
        )?;
        flight.set_processing_time(0);
        Ok(Self::apply(flight, FlightState::Waiting))
    }

    /// Administrative pause, remembering the state to resume to.
    ///
    /// A `Processing` flight cannot be paused: its job keeps running and the
    /// completion callback, which is delivered once, would be lost.
    ///
    /// # Errors
    /// Fails if the flight is paused or `Processing`.
    pub fn pause(flight: &mut Flight) -> Result<Transition, TransitionError> {
        Self::expect(
            flight,
            &[FlightState::Waiting, FlightState::Complete, FlightState::Error, FlightState::Canceled],
            FlightState::Paused,
        )?;
        flight.set_paused_from(Some(flight.state()));
        Ok(Self::apply(flight, FlightState::Paused))
    }

    /// Administrative resume to the state held before pausing.
    ///
    /// # Errors
    /// Fails if the flight is not paused.
    pub fn resume(flight: &mut Flight) -> Result<Transition, TransitionError> {
        let previous = flight.paused_from().unwrap_or(FlightState::Waiting);
        Self::expect(flight, &[FlightState::Paused], previous)?;
        flight.set_paused_from(None);
        Ok(Self::apply(flight, previous))
    }

    fn expect(
        flight: &Flight,
        allowed: &[FlightState],
        requested: FlightState,
    ) -> Result<(), TransitionError> {
        if allowed.contains(&flight.state()) {
            Ok(())
        } else {
            Err(TransitionError { from: flight.state(), requested })
        }
    }

    fn apply(flight: &mut Flight, to: FlightState) -> Transition {
        let transition = Transition { from: flight.state(), to };
        flight.set_state(to);
        event!("Flight {} transitioned {} -> {}", flight.uuid(), transition.from, transition.to);
        transition
    }
}
