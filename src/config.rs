use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

pub(crate) const DEFAULT_ENDPOINT: &str = "https://community.plex.tv/api";
const DEFAULT_PLATFORM: &str = "Chrome";
const DEFAULT_PRODUCT: &str = "Plex Web";
const DEFAULT_VERSION: &str = "4.145.1";
const DEFAULT_REQUEST_DELAY_SECS: f64 = 3.0;
const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_RETRY_AFTER_SECS: f64 = 60.0;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identity {
    pub(crate) token: String,
    pub(crate) client_identifier: String,
    pub(crate) platform: String,
    pub(crate) product: String,
    pub(crate) version: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) endpoint: String,
    pub(crate) identity: Identity,
    pub(crate) user_id: Option<String>,
    pub(crate) request_delay: Duration,
    pub(crate) page_size: u32,
    pub(crate) max_rate_limit_retries: Option<u32>,
    pub(crate) default_retry_after: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Duration,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) delay_secs: Option<f64>,
    pub(crate) max_rate_limit_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    endpoint: Option<String>,
    token: Option<String>,
    client_identifier: Option<String>,
    platform: Option<String>,
    product: Option<String>,
    version: Option<String>,
    user_id: Option<String>,
    request_delay_secs: Option<f64>,
    page_size: Option<u32>,
    max_rate_limit_retries: Option<u32>,
    default_retry_after_secs: Option<f64>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
}

impl Settings {
    // CLI overrides > PLEX_* env vars > TOML file > defaults
    pub(crate) fn load(config_path: &Path, overrides: &Overrides) -> Result<Self> {
        let file = read_file_config(config_path)?;
        Self::resolve(file, |key| std::env::var(key).ok(), overrides)
            .with_context(|| format!("invalid configuration (file: {})", config_path.display()))
    }

    fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Self> {
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token = env("PLEX_TOKEN")
            .or(file.token)
            .ok_or_else(|| anyhow!("missing Plex token (set PLEX_TOKEN or `token`)"))?;
        let client_identifier = env("PLEX_CLIENT_IDENTIFIER")
            .or(file.client_identifier)
            .ok_or_else(|| {
                anyhow!("missing client identifier (set PLEX_CLIENT_IDENTIFIER or `client_identifier`)")
            })?;

        let delay_secs = match overrides.delay_secs {
            Some(secs) => secs,
            None => match env("PLEX_REQUEST_DELAY") {
                Some(raw) => raw
                    .parse::<f64>()
                    .with_context(|| format!("PLEX_REQUEST_DELAY is not a number: {raw}"))?,
                None => file.request_delay_secs.unwrap_or(DEFAULT_REQUEST_DELAY_SECS),
            },
        };
        let request_delay = parse_delay_secs(delay_secs)?;

        let page_size = file.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(anyhow!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            ));
        }

        let default_retry_after =
            parse_delay_secs(file.default_retry_after_secs.unwrap_or(DEFAULT_RETRY_AFTER_SECS))
                .context("default_retry_after_secs")?;

        Ok(Self {
            endpoint: env("PLEX_API_URL")
                .or(file.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            identity: Identity {
                token,
                client_identifier,
                platform: file.platform.unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
                product: file.product.unwrap_or_else(|| DEFAULT_PRODUCT.to_string()),
                version: file.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            },
            user_id: env("PLEX_USER_ID").or(file.user_id),
            request_delay,
            page_size,
            max_rate_limit_retries: overrides
                .max_rate_limit_retries
                .or(file.max_rate_limit_retries),
            default_retry_after,
            connect_timeout: Duration::from_secs(
                file.connect_timeout_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
            read_timeout: Duration::from_secs(
                file.read_timeout_secs.unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
            ),
        })
    }
}

pub(crate) fn parse_delay_secs(secs: f64) -> Result<Duration> {
    if secs < 0.0 {
        return Err(anyhow!("delay must not be negative, got {secs}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| anyhow!("delay out of range: {secs}"))
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse config file {}", path.display()))
}
