use std::time::Duration;

use crate::ValidationError;

pub const ENV_CALL_TIMEOUT_MS: &str = "SWIPE_CALL_TIMEOUT_MS";
pub const ENV_HTTP_TIMEOUT_MS: &str = "SWIPE_HTTP_TIMEOUT_MS";
pub const ENV_MAX_PAGE_SIZE: &str = "SWIPE_MAX_PAGE_SIZE";
pub const ENV_USER_AGENT: &str = "SWIPE_USER_AGENT";

/// Process-wide service settings. Read once at startup, then shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeConfig {
    /// Upper bound on any single upstream call as seen by the coordinator.
    pub call_timeout: Duration,
    /// Transport timeout handed to the HTTP client.
    pub http_timeout: Duration,
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// Default window size for music search, which returns longer lists.
    pub music_page_size: usize,
    pub user_agent: String,
    pub default_language: String,
    pub default_region: String,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_millis(15_000),
            http_timeout: Duration::from_millis(10_000),
            default_page_size: 10,
            max_page_size: 100,
            music_page_size: 20,
            user_agent: String::from(concat!("swipe/", env!("CARGO_PKG_VERSION"))),
            default_language: String::from("en"),
            default_region: String::from("US"),
        }
    }
}

impl SwipeConfig {
    /// Defaults overlaid with `SWIPE_*` environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`, keyed by env var name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = parse_u64(&lookup, ENV_CALL_TIMEOUT_MS)? {
            config.call_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_u64(&lookup, ENV_HTTP_TIMEOUT_MS)? {
            config.http_timeout = Duration::from_millis(ms);
        }
        if let Some(max) = parse_u64(&lookup, ENV_MAX_PAGE_SIZE)? {
            config.max_page_size = usize::try_from(max).map_err(|_| ValidationError::InvalidConfig {
                key: ENV_MAX_PAGE_SIZE,
                value: max.to_string(),
            })?;
        }
        if let Some(agent) = lookup(ENV_USER_AGENT).filter(|value| !value.trim().is_empty()) {
            config.user_agent = agent;
        }

        config.default_page_size = config.default_page_size.min(config.max_page_size);
        config.music_page_size = config.music_page_size.min(config.max_page_size);
        Ok(config)
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

fn parse_u64<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ValidationError::InvalidConfig { key, value: raw }),
    }
}
