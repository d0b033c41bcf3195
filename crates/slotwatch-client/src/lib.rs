pub mod extractor;
pub mod fetcher;
pub mod webhook;

#[cfg(feature = "browser")]
pub mod browser_fetcher;

#[cfg(feature = "browser")]
pub use browser_fetcher::BrowserFetcher;
pub use extractor::{CounterSelector, ExtractionRules, HtmlExtractor};
pub use fetcher::ReqwestFetcher;
pub use webhook::WebhookNotifier;
