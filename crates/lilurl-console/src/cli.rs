use clap::{Parser, ValueEnum};
use jiff::SignedDuration;
use lilurl_core::RegistrySettings;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const EXPIRY_ENV: &str = "LILURL_EXPIRY";
pub const BASE_URL_ENV: &str = "LILURL_BASE_URL";
pub const ACCESS_LIMIT_ENV: &str = "LILURL_ACCESS_LIMIT";
pub const SWEEP_INTERVAL_ENV: &str = "LILURL_SWEEP_INTERVAL";
pub const NO_BROWSER_ENV: &str = "LILURL_NO_BROWSER";
pub const LOG_FORMAT_ENV: &str = "LILURL_LOG_FORMAT";

pub const DEFAULT_EXPIRY: &str = "24h";
pub const DEFAULT_BASE_URL: &str = lilurl_core::settings::DEFAULT_BASE_URL;
pub const DEFAULT_ACCESS_LIMIT: u32 = lilurl_core::settings::DEFAULT_ACCESS_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lilurl", about = "Shorten URLs with per-link owners, expiry and access limits")]
pub struct Cli {
    /// How long a new link stays usable, e.g. `24h`, `90m`, `PT2H`. `0s` means never.
    #[arg(long, env = EXPIRY_ENV, default_value = DEFAULT_EXPIRY, value_parser = parse_expiry)]
    pub expiry: SignedDuration,

    /// Prefix prepended to short codes.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Number of times a new link can be opened.
    #[arg(long, env = ACCESS_LIMIT_ENV, default_value_t = DEFAULT_ACCESS_LIMIT)]
    pub access_limit: u32,

    /// Purge expired links in the background at this interval, e.g. `5m`.
    #[arg(long, env = SWEEP_INTERVAL_ENV, value_parser = parse_interval)]
    pub sweep_interval: Option<Duration>,

    /// Print resolved URLs instead of opening them in a browser.
    #[arg(long, env = NO_BROWSER_ENV)]
    pub no_browser: bool,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn settings(&self) -> RegistrySettings {
        RegistrySettings::builder()
            .expiry(self.expiry)
            .base_url(self.base_url.clone())
            .default_access_limit(self.access_limit)
            .build()
    }
}

fn parse_expiry(input: &str) -> Result<SignedDuration, String> {
    let duration: SignedDuration = input.trim().parse().map_err(|e| format!("{}", e))?;
    if duration.is_negative() {
        return Err(format!("expiry must not be negative: {}", input));
    }
    Ok(duration)
}

fn parse_interval(input: &str) -> Result<Duration, String> {
    let duration: SignedDuration = input.trim().parse().map_err(|e| format!("{}", e))?;
    if !duration.is_positive() {
        return Err(format!("sweep interval must be positive: {}", input));
    }
    Duration::try_from(duration).map_err(|e| format!("{}", e))
}
