use httpmock::prelude::*;
use httpmock::Mock;
use slotwatch_client::{ExtractionRules, HtmlExtractor, ReqwestFetcher, WebhookNotifier};
use slotwatch_core::MonitorService;

pub const LIMIT_PHRASE: &str = "The limit of registered accounts has been reached";

pub type LiveService = MonitorService<ReqwestFetcher, HtmlExtractor, WebhookNotifier>;

/// A fake provider site plus a fake webhook receiver on the same server.
pub struct Harness {
    pub server: MockServer,
}

impl Harness {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start_async().await,
        }
    }

    pub fn target_url(&self) -> String {
        self.server.url("/")
    }

    pub async fn serve_page(&self, status: u16, body: &str) -> Mock<'_> {
        let body = body.to_string();
        self.server
            .mock_async(move |when, then| {
                when.method(GET).path("/");
                then.status(status)
                    .header("content-type", "text/html; charset=utf-8")
                    .body(body);
            })
            .await
    }

    pub async fn accept_webhook(&self) -> Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(POST).path("/webhook");
                then.status(204);
            })
            .await
    }

    pub async fn reject_webhook(&self, status: u16) -> Mock<'_> {
        self.server
            .mock_async(move |when, then| {
                when.method(POST).path("/webhook");
                then.status(status);
            })
            .await
    }

    pub fn service(&self) -> LiveService {
        let fetcher = ReqwestFetcher::new().unwrap();
        let extractor = HtmlExtractor::new(&ExtractionRules::default()).unwrap();
        let notifier = WebhookNotifier::new(&self.server.url("/webhook")).unwrap();
        MonitorService::new(fetcher, extractor, notifier, vec![self.target_url()])
    }
}

pub fn homepage(counters: &str, extra: &str) -> String {
    format!(
        "<!doctype html><html><body>\
         <nav><a href=\"/register\">Register account</a></nav>\
         <section>{counters}</section>{extra}</body></html>"
    )
}
