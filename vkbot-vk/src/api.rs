//! VK API access: the [`VkApi`] trait the adapter depends on and its HTTP implementation [`VkClient`].
//!
//! Methods are called as `POST {api_url}/method/{name}` with form parameters plus `access_token`
//! and `v`. Responses are either `{"response": ...}` or `{"error": {"error_code", "error_msg"}}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::VkConfig;
use crate::error::{Result, VkError};
use crate::object::{Group, LongPollServer};

/// Target of an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Internal peer id (user, community or `2000000000 + chat id`).
    PeerId(i64),
    /// Short name of a user or community.
    Domain(String),
}

/// Parameters of `messages.send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendParams {
    pub destination: Destination,
    pub message: String,
    /// Anti-duplicate token. 0 disables deduplication.
    pub random_id: i64,
}

impl SendParams {
    fn to_form(&self) -> Vec<(&'static str, String)> {
        let target = match &self.destination {
            Destination::PeerId(id) => ("peer_id", id.to_string()),
            Destination::Domain(domain) => ("domain", domain.clone()),
        };
        vec![
            target,
            ("message", self.message.clone()),
            ("random_id", self.random_id.to_string()),
        ]
    }
}

/// The subset of the VK API the adapter uses. Implemented over HTTP by [`VkClient`]; tests substitute fakes.
#[async_trait]
pub trait VkApi: Send + Sync {
    /// `groups.getById` without parameters: the community the token belongs to.
    async fn groups_get_by_id(&self) -> Result<Vec<Group>>;
    /// `messages.send`; returns the id of the sent message.
    async fn messages_send(&self, params: &SendParams) -> Result<i64>;
    /// `groups.getLongPollServer` for the given community.
    async fn groups_get_long_poll_server(&self, group_id: i64) -> Result<LongPollServer>;
}

/// reqwest-based [`VkApi`].
#[derive(Clone)]
pub struct VkClient {
    client: Client,
    token: String,
    api_url: String,
    version: String,
}

#[derive(Deserialize)]
struct ApiEnvelope<T> {
    response: Option<T>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error_code: i64,
    error_msg: String,
}

/// `groups.getById` returns a bare array up to 5.193 and `{"groups": [...]}` since 5.194.
#[derive(Deserialize)]
#[serde(untagged)]
enum GroupsResponse {
    List(Vec<Group>),
    Wrapped { groups: Vec<Group> },
}

impl VkClient {
    /// Creates a client from the adapter config (token, API URL, version).
    pub fn new(config: &VkConfig) -> Self {
        Self {
            client: Client::new(),
            token: config.token.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            version: config.api_version.clone(),
        }
    }

    /// Calls a VK API method and decodes its `response`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/method/{}", self.api_url, method);
        debug!(method = %method, "VK API request");

        let mut form: Vec<(&str, String)> = params.to_vec();
        form.push(("access_token", self.token.clone()));
        form.push(("v", self.version.clone()));

        let envelope: ApiEnvelope<T> = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (envelope.response, envelope.error) {
            (_, Some(err)) => Err(VkError::Api {
                code: err.error_code,
                message: err.error_msg,
            }),
            (Some(response), None) => Ok(response),
            (None, None) => Err(VkError::Api {
                code: 0,
                message: format!("{} returned neither response nor error", method),
            }),
        }
    }
}

#[async_trait]
impl VkApi for VkClient {
    async fn groups_get_by_id(&self) -> Result<Vec<Group>> {
        let groups = match self.call::<GroupsResponse>("groups.getById", &[]).await? {
            GroupsResponse::List(groups) => groups,
            GroupsResponse::Wrapped { groups } => groups,
        };
        Ok(groups)
    }

    async fn messages_send(&self, params: &SendParams) -> Result<i64> {
        self.call("messages.send", &params.to_form()).await
    }

    async fn groups_get_long_poll_server(&self, group_id: i64) -> Result<LongPollServer> {
        self.call(
            "groups.getLongPollServer",
            &[("group_id", group_id.to_string())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_params_peer_id_form() {
        let params = SendParams {
            destination: Destination::PeerId(12345),
            message: "hi".to_string(),
            random_id: 0,
        };
        assert_eq!(
            params.to_form(),
            vec![
                ("peer_id", "12345".to_string()),
                ("message", "hi".to_string()),
                ("random_id", "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_send_params_domain_form() {
        let params = SendParams {
            destination: Destination::Domain("club999".to_string()),
            message: "hi".to_string(),
            random_id: 0,
        };
        assert_eq!(params.to_form()[0], ("domain", "club999".to_string()));
    }

    #[test]
    fn test_groups_response_shapes() {
        let list: GroupsResponse = serde_json::from_str(r#"[{"id": 42, "name": "TestBot"}]"#).unwrap();
        assert!(matches!(list, GroupsResponse::List(g) if g[0].id == 42));

        let wrapped: GroupsResponse =
            serde_json::from_str(r#"{"groups": [{"id": 42, "name": "TestBot"}], "profiles": []}"#)
                .unwrap();
        assert!(matches!(wrapped, GroupsResponse::Wrapped { groups } if groups[0].name == "TestBot"));
    }
}
