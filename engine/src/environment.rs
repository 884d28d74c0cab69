//! Environment (injected dependencies) for the booking reducer.

use crate::api::LessonApi;
use booking_core::environment::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Dependencies the booking reducer needs.
///
/// Dependency injection via traits: production wires the system clock and
/// the `reqwest` client, tests wire a fixed clock and the in-memory mock.
pub trait BookingEnvironment: Send + Sync {
    /// Clock for timestamps recorded in state
    fn clock(&self) -> &dyn Clock;

    /// Shared handle to the lesson backend, cloned into effects
    fn api(&self) -> Arc<dyn LessonApi>;

    /// Debounce delay for search keystrokes
    fn debounce(&self) -> Duration;
}

/// Production environment for the booking reducer.
#[derive(Clone)]
pub struct ProductionBookingEnvironment {
    clock: Arc<dyn Clock>,
    api: Arc<dyn LessonApi>,
    debounce: Duration,
}

impl ProductionBookingEnvironment {
    /// Create a new environment from its parts.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, api: Arc<dyn LessonApi>, debounce: Duration) -> Self {
        Self {
            clock,
            api,
            debounce,
        }
    }
}

impl BookingEnvironment for ProductionBookingEnvironment {
    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn api(&self) -> Arc<dyn LessonApi> {
        Arc::clone(&self.api)
    }

    fn debounce(&self) -> Duration {
        self.debounce
    }
}
