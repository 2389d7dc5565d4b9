use playback_store::StoreConfig;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_JSON_LIMIT: &str = "25mb";
pub const DEFAULT_WEB_DIR: &str = "public";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Maximum accepted request body in bytes
    pub json_limit: usize,
    /// Directory holding the browser playback UI
    pub web_dir: PathBuf,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            json_limit: default_json_limit(),
            web_dir: PathBuf::from(DEFAULT_WEB_DIR),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match non_empty("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("PORT={raw:?} is not a valid port; using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let json_limit = match non_empty("JSON_LIMIT") {
            Some(raw) => parse_byte_size(&raw).unwrap_or_else(|| {
                tracing::warn!("JSON_LIMIT={raw:?} is not a valid size; using {DEFAULT_JSON_LIMIT}");
                default_json_limit()
            }),
            None => default_json_limit(),
        };

        let web_dir = non_empty("PLAYBACK_WEB_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WEB_DIR));

        Self {
            port,
            json_limit,
            web_dir,
            store: StoreConfig::from_lookup(&lookup),
        }
    }
}

fn default_json_limit() -> usize {
    parse_byte_size(DEFAULT_JSON_LIMIT).unwrap_or(25 * 1024 * 1024)
}

/// Parse sizes like `25mb`, `512kb`, `1gb` or a plain byte count (1kb = 1024 bytes).
pub fn parse_byte_size(raw: &str) -> Option<usize> {
    let lower = raw.trim().to_ascii_lowercase();
    let (digits, multiplier) = if let Some(n) = lower.strip_suffix("gb") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = lower.strip_suffix("mb") {
        (n, 1024 * 1024)
    } else if let Some(n) = lower.strip_suffix("kb") {
        (n, 1024)
    } else if let Some(n) = lower.strip_suffix('b') {
        (n, 1)
    } else {
        (lower.as_str(), 1)
    };
    let value: usize = digits.trim().parse().ok()?;
    value.checked_mul(multiplier)
}
