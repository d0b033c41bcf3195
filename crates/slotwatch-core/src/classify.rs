use crate::models::{AvailabilityState, PageMarkers, StatusSignal};

/// Classify one observation. First matching rule wins:
///
/// 1. Unrecognized page → `Unknown`.
/// 2. "Limit reached" phrase present → `Closed`, whatever the counts say.
/// 3. Both counts present → `Open` iff `current < limit`.
/// 4. Recognized page with neither phrase nor counts → `Open`.
pub fn classify(signal: &StatusSignal, markers: &PageMarkers) -> AvailabilityState {
    if !markers.is_expected_page {
        return AvailabilityState::Unknown;
    }

    if markers.limit_reached_phrase_present {
        return AvailabilityState::Closed;
    }

    match signal.counts() {
        Some((current, limit)) if current < limit => AvailabilityState::Open,
        Some(_) => AvailabilityState::Closed,
        None => AvailabilityState::Open,
    }
}
