pub mod classify;
pub mod decision;
pub mod error;
pub mod models;
pub mod monitor;
pub mod traits;
pub mod util;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use classify::classify;
pub use decision::{MonitorState, decide};
pub use error::AppError;
pub use models::{AvailabilityState, NotificationIntent, Observation, PageMarkers, StatusSignal};
pub use monitor::{
    CycleOutcome, CycleReport, Delivery, MonitorEvent, MonitorReporter, MonitorService,
    TracingMonitorReporter,
};
pub use traits::{Extractor, Fetcher, Notifier};
pub use util::parse_count;
