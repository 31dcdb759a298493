//! Error types for the VK adapter.
//!
//! [`VkError::GetBotInfo`] and [`VkError::LongPollInit`] are construction failures; everything
//! else comes from individual API or long poll calls.

use thiserror::Error;

/// Errors produced by the VK client, the long poll session and the adapter.
#[derive(Error, Debug)]
pub enum VkError {
    /// Identity lookup failed or returned no groups. Carries the cause text when the call failed.
    #[error("failed to get bot info{}", cause_suffix(.0))]
    GetBotInfo(Option<String>),

    #[error("failed to init longpolling: {0}")]
    LongPollInit(#[source] Box<VkError>),

    /// Error object returned by the VK API.
    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Long poll error: {0}")]
    LongPoll(String),

    #[error("Config error: {0}")]
    Config(String),
}

fn cause_suffix(cause: &Option<String>) -> String {
    cause.as_ref().map(|c| format!(": {}", c)).unwrap_or_default()
}

/// Result type for the VK adapter; uses [`VkError`].
pub type Result<T> = std::result::Result<T, VkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bot_info_display() {
        assert_eq!(VkError::GetBotInfo(None).to_string(), "failed to get bot info");
        assert_eq!(
            VkError::GetBotInfo(Some("VK API error 5: User authorization failed".to_string()))
                .to_string(),
            "failed to get bot info: VK API error 5: User authorization failed"
        );
    }

    #[test]
    fn test_long_poll_init_wraps_cause() {
        let err = VkError::LongPollInit(Box::new(VkError::Api {
            code: 100,
            message: "One of the parameters specified was missing or invalid".to_string(),
        }));
        assert_eq!(
            err.to_string(),
            "failed to init longpolling: VK API error 100: One of the parameters specified was missing or invalid"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
