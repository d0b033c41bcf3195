//! Transition logic between consecutive classifications.
//!
//! ```text
//! CLOSED  --open-->  OPEN   notify ("became available")
//! UNKNOWN --open-->  OPEN   notify ("became available")
//! OPEN    --open-->  OPEN   silent
//! *       --closed-> CLOSED silent
//! *       --unknown->UNKNOWN silent
//! ```

use chrono::{DateTime, Utc};

use crate::models::{AvailabilityState, NotificationIntent, StatusSignal};

pub const REASON_BECAME_AVAILABLE: &str = "became available";
pub const REASON_STILL_AVAILABLE: &str = "still available";
pub const REASON_CLOSED: &str = "closed";
pub const REASON_UNKNOWN: &str = "status unknown";

/// Decide whether the transition `prior → new` warrants a notification.
pub fn decide(
    new_state: AvailabilityState,
    prior_state: AvailabilityState,
    signal: StatusSignal,
    observed_at: DateTime<Utc>,
) -> NotificationIntent {
    use AvailabilityState::*;

    let (should_notify, reason) = match (prior_state, new_state) {
        (Closed | Unknown, Open) => (true, REASON_BECAME_AVAILABLE),
        (Open, Open) => (false, REASON_STILL_AVAILABLE),
        (_, Closed) => (false, REASON_CLOSED),
        (_, Unknown) => (false, REASON_UNKNOWN),
    };

    NotificationIntent {
        should_notify,
        reason: reason.to_string(),
        signal,
        state: new_state,
        observed_at,
    }
}

/// State carried from one cycle to the next.
///
/// Owned by whoever drives the cycles. [`advance`](Self::advance) consumes the
/// previous value and returns the next, so there is exactly one writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorState {
    last: AvailabilityState,
}

impl MonitorState {
    pub fn new(initial: AvailabilityState) -> Self {
        Self { last: initial }
    }

    pub fn last(&self) -> AvailabilityState {
        self.last
    }

    /// Decide against the stored state, then replace it with `new_state`.
    pub fn advance(
        self,
        new_state: AvailabilityState,
        signal: StatusSignal,
        observed_at: DateTime<Utc>,
    ) -> (MonitorState, NotificationIntent) {
        let intent = decide(new_state, self.last, signal, observed_at);
        (MonitorState { last: new_state }, intent)
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new(AvailabilityState::Unknown)
    }
}
