//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AppError;
use crate::models::{NotificationIntent, Observation, PageMarkers, StatusSignal};
use crate::monitor::{MonitorEvent, MonitorReporter};
use crate::traits::{Extractor, Fetcher, Notifier};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns a configurable response.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    /// URLs passed to `fetch`, in call order.
    pub requested: Arc<Mutex<Vec<String>>>,
    /// Simulated network latency per call.
    delay: Option<Duration>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requested: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// Mock extractor that ignores the content and returns queued observations.
#[derive(Clone)]
pub struct MockExtractor {
    observations: Arc<Mutex<Vec<Observation>>>,
    /// Returned once the queue is drained.
    fallback: Observation,
    /// Raw content passed to `extract`, in call order.
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl MockExtractor {
    /// Returns `observation` on every call.
    pub fn new(observation: Observation) -> Self {
        Self {
            observations: Arc::new(Mutex::new(Vec::new())),
            fallback: observation,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns each observation once, then an unrecognized page.
    pub fn with_observations(observations: Vec<Observation>) -> Self {
        Self {
            observations: Arc::new(Mutex::new(observations)),
            fallback: Observation::default(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Extractor for MockExtractor {
    fn extract(&self, raw: &str) -> Observation {
        self.seen.lock().unwrap().push(raw.to_string());
        let mut observations = self.observations.lock().unwrap();
        if observations.is_empty() {
            self.fallback
        } else {
            observations.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockNotifier
// ---------------------------------------------------------------------------

/// Mock notifier that records every intent it is asked to deliver.
#[derive(Clone)]
pub struct MockNotifier {
    /// Recorded deliveries: (intent, target_url).
    pub sent: Arc<Mutex<Vec<(NotificationIntent, String)>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Notifier whose next delivery fails. Failed deliveries are not recorded.
    pub fn with_error(error: AppError) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for MockNotifier {
    async fn notify(&self, intent: &NotificationIntent, target_url: &str) -> Result<(), AppError> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        self.sent
            .lock()
            .unwrap()
            .push((intent.clone(), target_url.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Mock monitor reporter that records event labels.
#[derive(Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MonitorReporter for MockReporter {
    fn report(&self, event: MonitorEvent<'_>) {
        let label = match &event {
            MonitorEvent::Started { .. } => "Started",
            MonitorEvent::Checking { .. } => "Checking",
            MonitorEvent::FetchFailed { .. } => "FetchFailed",
            MonitorEvent::Classified { .. } => "Classified",
            MonitorEvent::Notified { .. } => "Notified",
            MonitorEvent::NotificationFailed { .. } => "NotificationFailed",
            MonitorEvent::Sleeping { .. } => return,
            MonitorEvent::Stopped => "Stopped",
        };
        self.events.lock().unwrap().push(label.to_string());
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Observation of a recognized page without the "limit reached" phrase.
pub fn recognized_observation(signal: StatusSignal) -> Observation {
    Observation {
        signal,
        markers: PageMarkers {
            is_expected_page: true,
            limit_reached_phrase_present: false,
        },
    }
}
