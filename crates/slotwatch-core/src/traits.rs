use std::future::Future;

use crate::error::AppError;
use crate::models::{NotificationIntent, Observation};

/// Fetches raw page content from a URL.
///
/// Request headers and the timeout are fixed when the implementation is built.
/// A fetch performs exactly one request; retrying is left to the next cycle.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Reads counts and page markers out of raw content.
///
/// Never fails: anything it cannot find is reported as absent.
pub trait Extractor: Send + Sync + Clone {
    fn extract(&self, raw: &str) -> Observation;
}

/// Delivers a notification for a cycle that decided to alert.
pub trait Notifier: Send + Sync + Clone {
    fn notify(
        &self,
        intent: &NotificationIntent,
        target_url: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}
