/// Smoke-test for `BrowserFetcher`.
///
/// Renders the target homepage in headless Chromium, waits for the account
/// counter, and prints what the extractor reads from it.
///
/// Run with:
///   cargo run --example browser_smoke --features browser -- [URL]
use slotwatch_client::{BrowserFetcher, ExtractionRules, HtmlExtractor};
use slotwatch_core::classify;
use slotwatch_core::traits::{Extractor, Fetcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://www.serv00.com/".to_string());

    println!("Launching headless browser…");
    let fetcher = BrowserFetcher::new()
        .await?
        .with_wait_selector(".is--counter--accounts");

    println!("Fetching {url} …");
    let html = fetcher.fetch(&url).await?;
    println!("Got {} bytes of rendered HTML", html.len());

    let extractor = HtmlExtractor::new(&ExtractionRules::default())?;
    let observation = extractor.extract(&html);
    println!("Signal:  {}", observation.signal);
    println!("Markers: {:?}", observation.markers);
    println!(
        "State:   {}",
        classify(&observation.signal, &observation.markers)
    );
    Ok(())
}
