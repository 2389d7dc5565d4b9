use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TTL_SECONDS: u64 = 3600;
pub const DEFAULT_MAX_SESSIONS: usize = 200;
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 30;

pub const ENV_TTL_SECONDS: &str = "TTL_SECONDS";
pub const ENV_MAX_SESSIONS: &str = "MAX_SESSIONS";
pub const ENV_SWEEP_INTERVAL_SECONDS: &str = "SWEEP_INTERVAL_SECONDS";

/// Session store limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Lifetime of a stored session, counted from insertion
    pub ttl: Duration,
    /// Maximum number of live sessions; the oldest inserted are evicted first
    pub max_sessions: usize,
    /// Period of the background expiry sweep
    pub sweep_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECONDS),
            max_sessions: DEFAULT_MAX_SESSIONS,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECONDS),
        }
    }
}

impl StoreConfig {
    /// Read limits from `TTL_SECONDS`, `MAX_SESSIONS` and `SWEEP_INTERVAL_SECONDS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`StoreConfig::from_env`] but reading through `lookup`.
    /// Missing or unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            ttl: Duration::from_secs(parse_or(
                &lookup,
                ENV_TTL_SECONDS,
                DEFAULT_TTL_SECONDS,
            )),
            max_sessions: parse_or(&lookup, ENV_MAX_SESSIONS, DEFAULT_MAX_SESSIONS).max(1),
            sweep_interval: Duration::from_secs(parse_or(
                &lookup,
                ENV_SWEEP_INTERVAL_SECONDS,
                DEFAULT_SWEEP_INTERVAL_SECONDS,
            )),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    let Some(raw) = lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("{key}={raw:?} is not a valid number; using the default");
            default
        }
    }
}
