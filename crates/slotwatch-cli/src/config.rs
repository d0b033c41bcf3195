use std::time::Duration;

use clap::Parser;
use clap::builder::BoolishValueParser;
use slotwatch_client::extractor::{DEFAULT_IDENTITY_PHRASE, DEFAULT_LIMIT_REACHED_PHRASE};
use slotwatch_client::fetcher::DEFAULT_USER_AGENT;
use slotwatch_client::webhook::DEFAULT_ALERT_LINE;
use slotwatch_client::ExtractionRules;
use slotwatch_core::{AppError, AvailabilityState};
use url::Url;

pub const DEFAULT_TARGET_URL: &str = "https://www.serv00.com/";

const FETCH_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 15..=60;
const MAX_TARGETS: usize = 2;

#[derive(Parser, Debug)]
#[command(
    name = "slotwatch",
    version,
    about = "Watch a registration page and alert a webhook when it opens"
)]
pub struct Cli {
    /// Discord-compatible webhook that receives alerts
    #[arg(long, env = "DISCORD_WEBHOOK")]
    pub webhook_url: Option<String>,

    /// Seconds to sleep between checks in continuous mode
    #[arg(long, env = "CHECK_INTERVAL", default_value_t = 300)]
    pub interval: u64,

    /// Run a single check and exit (for external schedulers)
    #[arg(long, env = "ONCE_MODE", value_parser = BoolishValueParser::new())]
    pub once: bool,

    /// Page fetched each cycle; give twice for homepage + registration page
    #[arg(
        long = "target-url",
        env = "TARGET_URL",
        value_delimiter = ',',
        default_value = DEFAULT_TARGET_URL
    )]
    pub target_urls: Vec<String>,

    /// Fetch timeout in seconds (15-60)
    #[arg(long, env = "FETCH_TIMEOUT", default_value_t = 30)]
    pub fetch_timeout: u64,

    /// Webhook delivery timeout in seconds
    #[arg(long, env = "WEBHOOK_TIMEOUT", default_value_t = 10)]
    pub webhook_timeout: u64,

    /// User-Agent sent to the target
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Phrase that proves the fetched page is the target page
    #[arg(long, env = "IDENTITY_PHRASE", default_value = DEFAULT_IDENTITY_PHRASE)]
    pub identity_phrase: String,

    /// Exact sentence the provider shows when registration is closed
    #[arg(long, env = "CLOSED_PHRASE", default_value = DEFAULT_LIMIT_REACHED_PHRASE)]
    pub closed_phrase: String,

    /// Account limit assumed when the page does not publish one
    #[arg(long, env = "FALLBACK_LIMIT")]
    pub fallback_limit: Option<u64>,

    /// State assumed before the first check ("unknown" or "closed")
    #[arg(long, env = "INITIAL_STATE", default_value = "unknown")]
    pub initial_state: String,

    /// Plain-text line posted above the alert embed
    #[arg(long, env = "ALERT_LINE", default_value = DEFAULT_ALERT_LINE)]
    pub alert_line: String,

    /// Render pages in headless Chromium instead of plain HTTP
    #[cfg(feature = "browser")]
    #[arg(long, env = "USE_BROWSER", value_parser = BoolishValueParser::new())]
    pub browser: bool,

    /// CSS selector to wait for before reading a rendered page
    #[cfg(feature = "browser")]
    #[arg(long, env = "WAIT_SELECTOR")]
    pub wait_selector: Option<String>,
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub webhook_url: String,
    pub interval: Duration,
    pub run_once: bool,
    pub targets: Vec<String>,
    pub fetch_timeout: Duration,
    pub webhook_timeout: Duration,
    pub user_agent: String,
    pub rules: ExtractionRules,
    pub initial_state: AvailabilityState,
    pub alert_line: String,
    #[cfg(feature = "browser")]
    pub browser: bool,
    #[cfg(feature = "browser")]
    pub wait_selector: Option<String>,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self, AppError> {
        let webhook_url = cli
            .webhook_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                AppError::ConfigError(
                    "DISCORD_WEBHOOK environment variable is not set (or pass --webhook-url)"
                        .into(),
                )
            })?;
        validate_http_url("webhook URL", &webhook_url)?;

        if cli.interval == 0 {
            return Err(AppError::ConfigError(
                "CHECK_INTERVAL must be at least 1 second".into(),
            ));
        }

        if !FETCH_TIMEOUT_RANGE.contains(&cli.fetch_timeout) {
            return Err(AppError::ConfigError(format!(
                "FETCH_TIMEOUT '{}' must be between {} and {} seconds",
                cli.fetch_timeout,
                FETCH_TIMEOUT_RANGE.start(),
                FETCH_TIMEOUT_RANGE.end()
            )));
        }

        if cli.webhook_timeout == 0 {
            return Err(AppError::ConfigError(
                "WEBHOOK_TIMEOUT must be at least 1 second".into(),
            ));
        }

        if cli.target_urls.is_empty() || cli.target_urls.len() > MAX_TARGETS {
            return Err(AppError::ConfigError(format!(
                "Expected 1 or {MAX_TARGETS} target URLs, got {}",
                cli.target_urls.len()
            )));
        }
        for target in &cli.target_urls {
            validate_http_url("target URL", target)?;
        }

        let initial_state: AvailabilityState =
            cli.initial_state.parse().map_err(AppError::ConfigError)?;
        if initial_state == AvailabilityState::Open {
            return Err(AppError::ConfigError(
                "INITIAL_STATE must be 'unknown' or 'closed'".into(),
            ));
        }

        if cli.identity_phrase.is_empty() || cli.closed_phrase.is_empty() {
            return Err(AppError::ConfigError(
                "IDENTITY_PHRASE and CLOSED_PHRASE must not be empty".into(),
            ));
        }

        let rules = ExtractionRules {
            identity_phrase: cli.identity_phrase,
            limit_reached_phrase: cli.closed_phrase,
            fallback_limit: cli.fallback_limit,
            ..ExtractionRules::default()
        };

        Ok(Self {
            webhook_url,
            interval: Duration::from_secs(cli.interval),
            run_once: cli.once,
            targets: cli.target_urls,
            fetch_timeout: Duration::from_secs(cli.fetch_timeout),
            webhook_timeout: Duration::from_secs(cli.webhook_timeout),
            user_agent: cli.user_agent,
            rules,
            initial_state,
            alert_line: cli.alert_line,
            #[cfg(feature = "browser")]
            browser: cli.browser,
            #[cfg(feature = "browser")]
            wait_selector: cli.wait_selector,
        })
    }
}

fn validate_http_url(what: &str, raw: &str) -> Result<(), AppError> {
    let parsed =
        Url::parse(raw).map_err(|e| AppError::ConfigError(format!("Invalid {what} '{raw}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AppError::ConfigError(format!(
            "{what} scheme '{scheme}' is not allowed (only http/https)"
        ))),
    }
}

/// Malformed flag or environment values fail like any other configuration
/// error, with exit code 1 instead of clap's 2.
pub fn usage_error(err: clap::Error) -> AppError {
    AppError::ConfigError(err.to_string().trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOOK: &str = "https://discord.com/api/webhooks/1/abc";

    /// Parses flags only, then pins every field an ambient env var could set.
    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["slotwatch"];
        argv.extend_from_slice(args);
        let mut cli = Cli::try_parse_from(argv).unwrap();
        if !args.contains(&"--webhook-url") {
            cli.webhook_url = Some(HOOK.to_string());
        }
        cli
    }

    #[test]
    fn test_defaults() {
        let mut parsed = cli(&[]);
        parsed.interval = 300;
        parsed.once = false;
        parsed.target_urls = vec![DEFAULT_TARGET_URL.to_string()];
        parsed.initial_state = "unknown".into();

        let settings = Settings::from_cli(parsed).unwrap();
        assert_eq!(settings.webhook_url, HOOK);
        assert_eq!(settings.interval, Duration::from_secs(300));
        assert!(!settings.run_once);
        assert_eq!(settings.targets, vec![DEFAULT_TARGET_URL.to_string()]);
        assert_eq!(settings.initial_state, AvailabilityState::Unknown);
        assert_eq!(settings.rules.fallback_limit, None);
    }

    #[test]
    fn test_missing_webhook_is_config_error() {
        let mut parsed = cli(&[]);
        parsed.webhook_url = None;
        let err = Settings::from_cli(parsed).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("DISCORD_WEBHOOK"));
    }

    #[test]
    fn test_blank_webhook_is_config_error() {
        let mut parsed = cli(&[]);
        parsed.webhook_url = Some("   ".into());
        assert!(Settings::from_cli(parsed).is_err());
    }

    #[test]
    fn test_webhook_must_be_http() {
        let err = Settings::from_cli(cli(&["--webhook-url", "ftp://example.com/hook"])).unwrap_err();
        assert!(err.to_string().contains("not allowed"));
    }

    #[test]
    fn test_once_flag_and_interval() {
        let settings = Settings::from_cli(cli(&["--once", "--interval", "60"])).unwrap();
        assert!(settings.run_once);
        assert_eq!(settings.interval, Duration::from_secs(60));
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Settings::from_cli(cli(&["--interval", "0"])).is_err());
    }

    #[test]
    fn test_fetch_timeout_range() {
        assert!(Settings::from_cli(cli(&["--fetch-timeout", "14"])).is_err());
        assert!(Settings::from_cli(cli(&["--fetch-timeout", "61"])).is_err());
        let settings = Settings::from_cli(cli(&["--fetch-timeout", "15"])).unwrap();
        assert_eq!(settings.fetch_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_two_targets_allowed_three_rejected() {
        let settings = Settings::from_cli(cli(&[
            "--target-url",
            "https://a.example/",
            "--target-url",
            "https://a.example/register",
        ]))
        .unwrap();
        assert_eq!(settings.targets.len(), 2);

        assert!(
            Settings::from_cli(cli(&[
                "--target-url",
                "https://a.example/,https://b.example/,https://c.example/",
            ]))
            .is_err()
        );
    }

    #[test]
    fn test_initial_state() {
        let settings = Settings::from_cli(cli(&["--initial-state", "closed"])).unwrap();
        assert_eq!(settings.initial_state, AvailabilityState::Closed);
        assert!(Settings::from_cli(cli(&["--initial-state", "open"])).is_err());
        assert!(Settings::from_cli(cli(&["--initial-state", "sideways"])).is_err());
    }

    #[test]
    fn test_phrases_and_fallback_flow_into_rules() {
        let settings = Settings::from_cli(cli(&[
            "--identity-phrase",
            "Create account",
            "--closed-phrase",
            "Sorry, we are full",
            "--fallback-limit",
            "170000",
        ]))
        .unwrap();
        assert_eq!(settings.rules.identity_phrase, "Create account");
        assert_eq!(settings.rules.limit_reached_phrase, "Sorry, we are full");
        assert_eq!(settings.rules.fallback_limit, Some(170_000));
    }

    #[test]
    fn test_empty_phrase_rejected() {
        assert!(Settings::from_cli(cli(&["--identity-phrase", ""])).is_err());
    }

    #[test]
    fn test_malformed_value_is_config_error() {
        let err = Cli::try_parse_from(["slotwatch", "--interval", "abc"])
            .map_err(usage_error)
            .unwrap_err();
        match err {
            AppError::ConfigError(msg) => assert!(msg.contains("abc")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_help_is_not_a_config_error() {
        let err = Cli::try_parse_from(["slotwatch", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
