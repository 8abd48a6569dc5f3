use std::time::Duration;
use tracing::warn;

/// Credentials for the reference CDN integration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CdnConfig {
    pub zone_id: String,
    pub api_token: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub api_keys: Vec<String>,
    pub webhook_secret: Option<String>,
    pub max_history: usize,
    pub local_enabled: bool,
    pub api_cache_enabled: bool,
    pub cdn: Option<CdnConfig>,
    pub notify_timeout: Duration,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_MAX_HISTORY: usize = 1000;
    const MIN_MAX_HISTORY: usize = 2;
    const DEFAULT_CDN_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
    const DEFAULT_CDN_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 5;

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let parse_u64 = |name: &str, default: u64| -> u64 {
            match var(name) {
                Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                    warn!("{} has invalid value '{}', using {}", name, raw, default);
                    default
                }),
                None => default,
            }
        };

        let parse_bool = |name: &str, default: bool| -> bool {
            match var(name).map(|v| v.trim().to_lowercase()) {
                Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
                Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
                Some(v) => {
                    warn!("{} has invalid value '{}', using {}", name, v, default);
                    default
                }
                None => default,
            }
        };

        let api_keys: Vec<String> = var("PURGE_API_KEYS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let webhook_secret = var("PURGE_WEBHOOK_SECRET");
        if webhook_secret.is_none() {
            warn!("PURGE_WEBHOOK_SECRET not set, webhook signature verification is DISABLED");
        }

        let max_history = (parse_u64("PURGE_MAX_HISTORY", Self::DEFAULT_MAX_HISTORY as u64)
            as usize)
            .max(Self::MIN_MAX_HISTORY);

        let cdn = match (var("PURGE_CDN_ZONE_ID"), var("PURGE_CDN_API_TOKEN")) {
            (Some(zone_id), Some(api_token)) => Some(CdnConfig {
                zone_id,
                api_token,
                base_url: var("PURGE_CDN_BASE_URL")
                    .unwrap_or_else(|| Self::DEFAULT_CDN_BASE_URL.to_string()),
                timeout: Duration::from_secs(parse_u64(
                    "PURGE_CDN_TIMEOUT_SECS",
                    Self::DEFAULT_CDN_TIMEOUT_SECS,
                )),
            }),
            (Some(_), None) | (None, Some(_)) => {
                warn!("CDN needs both PURGE_CDN_ZONE_ID and PURGE_CDN_API_TOKEN, CDN target disabled");
                None
            }
            (None, None) => None,
        };

        Self {
            host: var("PURGE_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port: var("PURGE_HTTP_PORT")
                .and_then(|p| p.trim().parse::<u16>().ok())
                .unwrap_or(Self::DEFAULT_HTTP_PORT),
            api_keys,
            webhook_secret,
            max_history,
            local_enabled: parse_bool("PURGE_LOCAL_ENABLED", true),
            api_cache_enabled: parse_bool("PURGE_API_CACHE_ENABLED", true),
            cdn,
            notify_timeout: Duration::from_secs(parse_u64(
                "PURGE_NOTIFY_TIMEOUT_SECS",
                Self::DEFAULT_NOTIFY_TIMEOUT_SECS,
            )),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            http_port: Self::DEFAULT_HTTP_PORT,
            api_keys: Vec::new(),
            webhook_secret: None,
            max_history: Self::DEFAULT_MAX_HISTORY,
            local_enabled: true,
            api_cache_enabled: true,
            cdn: None,
            notify_timeout: Duration::from_secs(Self::DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }
}
