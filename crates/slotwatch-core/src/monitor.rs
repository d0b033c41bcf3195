use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::classify::classify;
use crate::decision::MonitorState;
use crate::error::AppError;
use crate::models::{AvailabilityState, NotificationIntent, Observation, PageMarkers, StatusSignal};
use crate::traits::{Extractor, Fetcher, Notifier};

/// Default pause between two continuous-mode cycles.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(300);

/// Events emitted by the monitor for monitoring/logging.
#[derive(Debug, Clone)]
pub enum MonitorEvent<'a> {
    /// `interval` is `None` in single-shot mode.
    Started {
        targets: &'a [String],
        interval: Option<Duration>,
    },
    Checking {
        url: &'a str,
    },
    FetchFailed {
        url: &'a str,
        error: &'a AppError,
    },
    Classified {
        state: AvailabilityState,
        signal: &'a StatusSignal,
        markers: &'a PageMarkers,
    },
    Notified {
        reason: &'a str,
    },
    NotificationFailed {
        error: &'a AppError,
    },
    Sleeping {
        interval: Duration,
    },
    Stopped,
}

/// Trait for receiving monitor events (decoupled logging).
pub trait MonitorReporter: Send + Sync {
    fn report(&self, event: MonitorEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
///
/// Produces one heartbeat line per stage, so every cycle leaves a trace in
/// the log whatever its outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMonitorReporter;

impl MonitorReporter for TracingMonitorReporter {
    fn report(&self, event: MonitorEvent<'_>) {
        match event {
            MonitorEvent::Started { targets, interval } => match interval {
                Some(interval) => tracing::info!(
                    ?targets,
                    interval_secs = interval.as_secs(),
                    "Mode: continuous"
                ),
                None => tracing::info!(?targets, "Mode: single-shot"),
            },
            MonitorEvent::Checking { url } => {
                tracing::info!(%url, "Checking");
            }
            MonitorEvent::FetchFailed { url, error } => {
                tracing::error!(%url, status = ?error.status_code(), %error, "Check failed");
            }
            MonitorEvent::Classified {
                state,
                signal,
                markers,
            } => match state {
                AvailabilityState::Open => tracing::info!(%signal, "Open"),
                AvailabilityState::Closed => tracing::info!(
                    %signal,
                    limit_phrase = markers.limit_reached_phrase_present,
                    "Closed"
                ),
                AvailabilityState::Unknown => {
                    tracing::warn!(%signal, "Unknown: page not recognized")
                }
            },
            MonitorEvent::Notified { reason } => {
                tracing::info!(%reason, "Notification sent");
            }
            MonitorEvent::NotificationFailed { error } => {
                tracing::error!(%error, "Notification failed");
            }
            MonitorEvent::Sleeping { interval } => {
                tracing::debug!(interval_secs = interval.as_secs(), "Sleeping");
            }
            MonitorEvent::Stopped => {
                tracing::info!("Monitor stopped");
            }
        }
    }
}

/// What happened to the notification of a completed cycle.
#[derive(Debug)]
pub enum Delivery {
    /// The decision engine did not ask for one.
    Skipped,
    Sent,
    /// Delivery failed; the state transition stays committed.
    Failed(AppError),
}

#[derive(Debug)]
pub enum CycleOutcome {
    /// The fetch failed; the cycle ended before classification.
    FetchFailed(AppError),
    Completed {
        observation: Observation,
        intent: NotificationIntent,
        delivery: Delivery,
    },
}

/// Result of one cycle: the state to hand to the next cycle plus what happened.
#[derive(Debug)]
pub struct CycleReport {
    pub state: MonitorState,
    pub outcome: CycleOutcome,
}

/// Runs the fetch → extract → classify → decide → notify pipeline.
///
/// Generic over all external dependencies via traits, so tests can drive
/// cycles without real HTTP. The service itself holds no mutable state:
/// [`MonitorState`] is passed into each cycle and returned from it.
pub struct MonitorService<F, X, N>
where
    F: Fetcher,
    X: Extractor,
    N: Notifier,
{
    fetcher: F,
    extractor: X,
    notifier: N,
    targets: Vec<String>,
    interval: Duration,
}

impl<F, X, N> MonitorService<F, X, N>
where
    F: Fetcher,
    X: Extractor,
    N: Notifier,
{
    /// `targets` holds one or two URLs (e.g. homepage and registration page).
    /// Their bodies are fetched in order and joined before extraction.
    pub fn new(fetcher: F, extractor: X, notifier: N, targets: Vec<String>) -> Self {
        Self {
            fetcher,
            extractor,
            notifier,
            targets,
            interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// URL shown in notifications.
    fn primary_target(&self) -> &str {
        self.targets.first().map(String::as_str).unwrap_or_default()
    }

    /// Run exactly one cycle, framed by start/stop events.
    pub async fn run_once<R: MonitorReporter>(
        &self,
        state: MonitorState,
        reporter: &R,
    ) -> CycleReport {
        reporter.report(MonitorEvent::Started {
            targets: &self.targets,
            interval: None,
        });
        let report = self.run_cycle(state, reporter).await;
        reporter.report(MonitorEvent::Stopped);
        report
    }

    /// Run cycles until cancellation, sleeping `interval` between them.
    ///
    /// Cancellation interrupts the sleep but never a cycle in progress.
    /// Returns the state left by the last completed cycle.
    pub async fn run<R: MonitorReporter>(
        &self,
        mut state: MonitorState,
        cancel_token: CancellationToken,
        reporter: &R,
    ) -> MonitorState {
        reporter.report(MonitorEvent::Started {
            targets: &self.targets,
            interval: Some(self.interval),
        });

        loop {
            if cancel_token.is_cancelled() {
                break;
            }

            state = self.run_cycle(state, reporter).await.state;

            reporter.report(MonitorEvent::Sleeping {
                interval: self.interval,
            });
            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = cancel_token.cancelled() => break,
            }
        }

        reporter.report(MonitorEvent::Stopped);
        state
    }

    /// Run one cycle against `state` and return the state for the next one.
    ///
    /// A failed fetch hands `state` back untouched. Otherwise the classified
    /// state is committed before the notification is attempted, so a failed
    /// delivery does not roll it back.
    pub async fn run_cycle<R: MonitorReporter>(
        &self,
        state: MonitorState,
        reporter: &R,
    ) -> CycleReport {
        let raw = match self.fetch_targets(reporter).await {
            Ok(raw) => raw,
            Err(error) => {
                return CycleReport {
                    state,
                    outcome: CycleOutcome::FetchFailed(error),
                };
            }
        };

        let observation = self.extractor.extract(&raw);
        let classification = classify(&observation.signal, &observation.markers);
        reporter.report(MonitorEvent::Classified {
            state: classification,
            signal: &observation.signal,
            markers: &observation.markers,
        });

        let (state, intent) = state.advance(classification, observation.signal, Utc::now());

        let delivery = if intent.should_notify {
            match self.notifier.notify(&intent, self.primary_target()).await {
                Ok(()) => {
                    reporter.report(MonitorEvent::Notified {
                        reason: &intent.reason,
                    });
                    Delivery::Sent
                }
                Err(error) => {
                    reporter.report(MonitorEvent::NotificationFailed { error: &error });
                    Delivery::Failed(error)
                }
            }
        } else {
            Delivery::Skipped
        };

        CycleReport {
            state,
            outcome: CycleOutcome::Completed {
                observation,
                intent,
                delivery,
            },
        }
    }

    async fn fetch_targets<R: MonitorReporter>(&self, reporter: &R) -> Result<String, AppError> {
        let mut bodies = Vec::with_capacity(self.targets.len());
        for url in &self.targets {
            reporter.report(MonitorEvent::Checking { url });
            match self.fetcher.fetch(url).await {
                Ok(body) => bodies.push(body),
                Err(error) => {
                    reporter.report(MonitorEvent::FetchFailed { url, error: &error });
                    return Err(error);
                }
            }
        }
        Ok(bodies.join("\n"))
    }
}
