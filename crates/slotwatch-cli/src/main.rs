mod config;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "browser")]
use slotwatch_client::BrowserFetcher;
use slotwatch_client::{HtmlExtractor, ReqwestFetcher, WebhookNotifier};
use slotwatch_core::traits::Fetcher;
use slotwatch_core::{MonitorService, MonitorState, TracingMonitorReporter};

use crate::config::{Cli, Settings, usage_error};

// Cycles never overlap, so a single-threaded runtime is all we need.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("slotwatch=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => return Err(usage_error(e).into()),
    };
    let settings = Settings::from_cli(cli)?;

    let extractor = HtmlExtractor::new(&settings.rules)?;
    let notifier = WebhookNotifier::with_timeout(&settings.webhook_url, settings.webhook_timeout)
        .context("Failed to create webhook client")?
        .with_alert_line(settings.alert_line.clone());

    #[cfg(feature = "browser")]
    if settings.browser {
        let mut fetcher = BrowserFetcher::with_timeout(settings.fetch_timeout)
            .await
            .context("Failed to launch headless browser")?
            .with_user_agent(settings.user_agent.clone());
        if let Some(selector) = &settings.wait_selector {
            fetcher = fetcher.with_wait_selector(selector.clone());
        }
        run(fetcher, extractor, notifier, &settings).await;
        return Ok(());
    }

    let fetcher = ReqwestFetcher::with_options(&settings.user_agent, settings.fetch_timeout)
        .context("Failed to create HTTP client")?;
    run(fetcher, extractor, notifier, &settings).await;

    Ok(())
}

async fn run<F: Fetcher>(
    fetcher: F,
    extractor: HtmlExtractor,
    notifier: WebhookNotifier,
    settings: &Settings,
) {
    let service = MonitorService::new(fetcher, extractor, notifier, settings.targets.clone())
        .with_interval(settings.interval);
    let state = MonitorState::new(settings.initial_state);
    let reporter = TracingMonitorReporter;

    if settings.run_once {
        service.run_once(state, &reporter).await;
        return;
    }

    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));
    service.run(state, cancel_token, &reporter).await;
}

/// Cancel `token` on SIGINT or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received");
    token.cancel();
}
