//! Adapter config: access token, API endpoint and version, long poll wait, optional logger.
//! Loaded from env (VK_TOKEN or BOT_TOKEN, VK_API_URL, VK_API_VERSION, VK_LONGPOLL_WAIT) or built in code.

use std::env;
use std::fmt;

use tracing::Dispatch;

use crate::error::{Result, VkError};

pub const DEFAULT_API_URL: &str = "https://api.vk.com";
pub const DEFAULT_API_VERSION: &str = "5.131";
/// Seconds the long poll server holds a request open.
pub const DEFAULT_LONG_POLL_WAIT: u64 = 25;

/// Configuration of a [`crate::VkAdapter`]. Build it before construction; the adapter copies what it needs.
#[derive(Clone)]
pub struct VkConfig {
    pub token: String,
    pub api_url: String,
    pub api_version: String,
    pub long_poll_wait: u64,
    /// Log sink for the adapter. `None` means the ambient default dispatcher at construction time.
    pub logger: Option<Dispatch>,
}

impl VkConfig {
    /// Builds config with the given token and defaults for everything else.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            long_poll_wait: DEFAULT_LONG_POLL_WAIT,
            logger: None,
        }
    }

    /// Loads from env: VK_TOKEN (or BOT_TOKEN) required; VK_API_URL, VK_API_VERSION and VK_LONGPOLL_WAIT optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`VkConfig::from_env`] with variables read through `lookup`.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("VK_TOKEN")
            .or_else(|| lookup("BOT_TOKEN"))
            .ok_or_else(|| VkError::Config("VK_TOKEN not set".to_string()))?;
        let mut config = Self::new(token);
        if let Some(url) = lookup("VK_API_URL") {
            config.api_url = url;
        }
        if let Some(version) = lookup("VK_API_VERSION") {
            config.api_version = version;
        }
        if let Some(wait) = lookup("VK_LONGPOLL_WAIT") {
            config.long_poll_wait = wait.parse().map_err(|_| {
                VkError::Config(format!("VK_LONGPOLL_WAIT must be a number of seconds, got {}", wait))
            })?;
        }
        Ok(config)
    }

    /// Injects a different logger for the adapter.
    pub fn with_logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    /// Overrides the API base URL (e.g. a local mock server).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_long_poll_wait(mut self, seconds: u64) -> Self {
        self.long_poll_wait = seconds;
        self
    }

    /// Logger the adapter should use: the configured one, or the current default dispatcher.
    pub(crate) fn dispatch(&self) -> Dispatch {
        match &self.logger {
            Some(dispatch) => dispatch.clone(),
            None => tracing::dispatcher::get_default(|d| d.clone()),
        }
    }
}

impl fmt::Debug for VkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VkConfig")
            .field("token", &mask_token(&self.token))
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("long_poll_wait", &self.long_poll_wait)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Masks an access token for logging: first 4 + "***" + last 4; 11 chars or fewer become "***".
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}
