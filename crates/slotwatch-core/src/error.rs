use thiserror::Error;

/// Application-wide error types for slotwatch.
#[derive(Error, Debug)]
pub enum AppError {
    /// The target answered with a non-2xx status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// HTTP request failed for a reason other than status, timeout, or connect.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Headless browser failed to launch or navigate.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// Webhook delivery failed.
    #[error("Notification error: {0}")]
    NotificationError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error came from fetching the target page.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            AppError::HttpStatus { .. }
                | AppError::HttpError(_)
                | AppError::Timeout(_)
                | AppError::NetworkError(_)
                | AppError::BrowserError(_)
        )
    }

    /// HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AppError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failures() {
        assert!(
            AppError::HttpStatus {
                status: 503,
                url: "https://example.com".into(),
            }
            .is_fetch_failure()
        );
        assert!(AppError::Timeout(30).is_fetch_failure());
        assert!(AppError::NetworkError("reset".into()).is_fetch_failure());
        assert!(AppError::BrowserError("no chrome".into()).is_fetch_failure());
        assert!(!AppError::NotificationError("500".into()).is_fetch_failure());
        assert!(!AppError::ConfigError("missing".into()).is_fetch_failure());
    }

    #[test]
    fn test_status_code() {
        let err = AppError::HttpStatus {
            status: 503,
            url: "https://example.com".into(),
        };
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.to_string(), "HTTP 503 for https://example.com");
        assert_eq!(AppError::Timeout(15).status_code(), None);
    }
}
