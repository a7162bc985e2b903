//! Environment configuration, read once at startup.

use std::path::PathBuf;
use std::time::Duration;

use log::LevelFilter;
use showwatch_core::{BookingLinks, ReconcileMode, UrlTemplate, DEFAULT_BOOKING_BASE};
use showwatch_engine::{SelectorConfig, TelegramSettings, DEFAULT_TELEGRAM_API_BASE};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramSettings,
    pub call_webhook: Option<String>,
    pub mode: ReconcileMode,
    pub links: BookingLinks,
    pub selectors: SelectorConfig,
    pub state_file: PathBuf,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub lock_file: PathBuf,
    pub lock_stale_after: Duration,
    pub render_timeout: Duration,
}

impl Config {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let mut telegram = TelegramSettings::new(
            required("TELEGRAM_BOT_TOKEN")?,
            required("TELEGRAM_CHAT_ID")?,
        );
        telegram.api_base =
            get("TELEGRAM_API_BASE").unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string());

        let mode = match get("SHOWWATCH_MODE") {
            Some(raw) => raw.parse().map_err(|err| invalid("SHOWWATCH_MODE", err))?,
            None => ReconcileMode::default(),
        };
        let template: UrlTemplate = match get("SHOWWATCH_URL_TEMPLATE") {
            Some(raw) => raw
                .parse()
                .map_err(|err| invalid("SHOWWATCH_URL_TEMPLATE", err))?,
            None => UrlTemplate::default(),
        };
        let base = get("SHOWWATCH_BOOKING_BASE").unwrap_or_else(|| DEFAULT_BOOKING_BASE.to_string());
        let links = BookingLinks::new(&base, template)
            .map_err(|err| invalid("SHOWWATCH_BOOKING_BASE", err))?;

        let defaults = SelectorConfig::default();
        let selectors = SelectorConfig {
            container: get("SHOWWATCH_CONTAINER_SELECTOR").unwrap_or(defaults.container),
            item: get("SHOWWATCH_ITEM_SELECTOR").unwrap_or(defaults.item),
            name: get("SHOWWATCH_NAME_SELECTOR").unwrap_or(defaults.name),
            count: get("SHOWWATCH_COUNT_SELECTOR").unwrap_or(defaults.count),
        };

        let log_level = match get("SHOWWATCH_LOG_LEVEL") {
            Some(raw) => showwatch_logging::parse_level(&raw)
                .ok_or_else(|| invalid("SHOWWATCH_LOG_LEVEL", format!("unknown level {raw:?}")))?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            telegram,
            call_webhook: get("IFTTT_WEBHOOK_API"),
            mode,
            links,
            selectors,
            state_file: get("SHOWWATCH_STATE_FILE")
                .unwrap_or_else(|| "bms.json".into())
                .into(),
            log_file: get("SHOWWATCH_LOG_FILE")
                .unwrap_or_else(|| "bms.log".into())
                .into(),
            log_level,
            lock_file: get("SHOWWATCH_LOCK_FILE")
                .unwrap_or_else(|| "bms.lock".into())
                .into(),
            lock_stale_after: seconds(&get, "SHOWWATCH_LOCK_STALE_SECS", 900)?,
            render_timeout: seconds(&get, "SHOWWATCH_RENDER_TIMEOUT_SECS", 60)?,
        })
    }
}

fn invalid(key: &'static str, err: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        message: err.to_string(),
    }
}

fn seconds(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let secs = match get(key) {
        Some(raw) => raw.parse::<u64>().map_err(|err| invalid(key, err))?,
        None => default,
    };
    if secs == 0 {
        return Err(invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use log::LevelFilter;
    use showwatch_core::{ReconcileMode, UrlTemplate};

    use super::{Config, ConfigError};

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ("TELEGRAM_CHAT_ID", "-100"),
    ];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = config(&REQUIRED).unwrap();
        assert_eq!(config.mode, ReconcileMode::FirstAvailability);
        assert_eq!(config.links.template(), UrlTemplate::Current);
        assert_eq!(config.state_file.to_str(), Some("bms.json"));
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.render_timeout, Duration::from_secs(60));
        assert_eq!(config.call_webhook, None);
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
    }

    #[test]
    fn missing_credentials_are_reported_by_name() {
        let err = config(&[("TELEGRAM_BOT_TOKEN", "x")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_CHAT_ID"));

        let err = config(&[("TELEGRAM_BOT_TOKEN", "  "), ("TELEGRAM_CHAT_ID", "1")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("SHOWWATCH_MODE", "incremental"),
            ("SHOWWATCH_URL_TEMPLATE", "legacy"),
            ("SHOWWATCH_RENDER_TIMEOUT_SECS", "15"),
            ("SHOWWATCH_ITEM_SELECTOR", "li.list"),
            ("SHOWWATCH_LOG_LEVEL", "debug"),
            ("IFTTT_WEBHOOK_API", "https://maker.ifttt.com/trigger/call/with/key/k"),
        ]);
        let config = config(&pairs).unwrap();
        assert_eq!(config.mode, ReconcileMode::Incremental);
        assert_eq!(config.links.template(), UrlTemplate::Legacy);
        assert_eq!(config.render_timeout, Duration::from_secs(15));
        assert_eq!(config.selectors.item, "li.list");
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.call_webhook.is_some());
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (key, value) in [
            ("SHOWWATCH_MODE", "sometimes"),
            ("SHOWWATCH_URL_TEMPLATE", "v3"),
            ("SHOWWATCH_BOOKING_BASE", "not a url"),
            ("SHOWWATCH_RENDER_TIMEOUT_SECS", "soon"),
            ("SHOWWATCH_LOCK_STALE_SECS", "0"),
            ("SHOWWATCH_LOG_LEVEL", "loud"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push((key, value));
            match config(&pairs) {
                Err(ConfigError::Invalid { key: got, .. }) => assert_eq!(got, key),
                other => panic!("{key}={value}: unexpected {other:?}"),
            }
        }
    }
}
