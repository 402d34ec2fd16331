use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-flight mutual-exclusion tokens. Two artifact runs for the same flight
/// write to the same files and must never overlap; runs for different
/// flights are independent.
#[derive(Debug, Default)]
pub struct FlightLocks {
    tokens: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl FlightLocks {
    pub fn new() -> Self { Self::default() }

    /// Waits for and returns the token of `flight`. The token is released
    /// when the guard is dropped.
    pub async fn acquire(&self, flight: Uuid) -> OwnedMutexGuard<()> {
        self.token(flight).lock_owned().await
    }

    /// Returns the guard only if no run for `flight` is active.
    pub fn try_acquire(&self, flight: Uuid) -> Option<OwnedMutexGuard<()>> {
        self.token(flight).try_lock_owned().ok()
    }

    /// Drops the token of a deleted flight.
    pub fn forget(&self, flight: Uuid) {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.remove(&flight);
        }
    }

    fn token(&self, flight: Uuid) -> Arc<AsyncMutex<()>> {
        let mut tokens = self.tokens.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(tokens.entry(flight).or_default())
    }
}
