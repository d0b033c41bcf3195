use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use slotwatch_core::error::AppError;
use slotwatch_core::models::NotificationIntent;
use slotwatch_core::traits::Notifier;

pub const DEFAULT_ALERT_LINE: &str = "@everyone 🚨 **Registration is open!**";
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

const EMBED_TITLE: &str = "Slots Available!";
/// Discord green.
const EMBED_COLOR: u32 = 5_763_719;

/// Discord-compatible webhook notifier.
///
/// Posts a plain alert line plus one embed describing the detection. A single
/// attempt is made per call; the caller decides what a failure means.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
    alert_line: String,
    timeout_secs: u64,
}

impl WebhookNotifier {
    pub fn new(webhook_url: &str) -> Result<Self, AppError> {
        Self::with_timeout(webhook_url, DEFAULT_WEBHOOK_TIMEOUT)
    }

    pub fn with_timeout(webhook_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::NotificationError(e.to_string()))?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
            alert_line: DEFAULT_ALERT_LINE.to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn with_alert_line(mut self, line: impl Into<String>) -> Self {
        self.alert_line = line.into();
        self
    }
}

// ---- Discord webhook types ----

#[derive(Debug, Serialize)]
struct WebhookPayload {
    content: String,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    description: String,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

fn describe(intent: &NotificationIntent, target_url: &str) -> String {
    let mut description = format!("Registration {}.\n\n", intent.reason);
    if let Some(current) = intent.signal.current_count {
        description.push_str(&format!("**Current Accounts:** {current}\n"));
    }
    if let Some(limit) = intent.signal.limit_count {
        description.push_str(&format!("**Limit:** {limit}\n"));
    }
    if intent.signal.current_count.is_some() || intent.signal.limit_count.is_some() {
        description.push('\n');
    }
    description.push_str(&format!("[Click here to Register]({target_url})"));
    description
}

fn build_payload(alert_line: &str, intent: &NotificationIntent, target_url: &str) -> WebhookPayload {
    WebhookPayload {
        content: alert_line.to_string(),
        embeds: vec![Embed {
            title: EMBED_TITLE.to_string(),
            description: describe(intent, target_url),
            color: EMBED_COLOR,
            timestamp: Some(intent.observed_at.to_rfc3339()),
        }],
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, intent: &NotificationIntent, target_url: &str) -> Result<(), AppError> {
        let payload = build_payload(&self.alert_line, intent, target_url);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::NotificationError(format!(
                        "Webhook timed out after {} seconds",
                        self.timeout_secs
                    ))
                } else {
                    // The webhook URL embeds its token; keep it out of logs.
                    AppError::NotificationError(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::NotificationError(format!(
                "Webhook returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        Ok(())
    }
}
