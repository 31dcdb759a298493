//! Bots Long Poll session.
//!
//! [`LongPollSession`] is what the adapter drives: register `message_new` handlers, run the loop,
//! shut it down. [`BotsLongPoll`] implements it against the VK Bots Long Poll API:
//! `GET {server}?act=a_check&key=..&ts=..&wait=..` in a loop, with `failed` codes handled as
//! documented (1: new ts, 2: new key keeping ts, 3: new key and ts).

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::VkApi;
use crate::error::{Result, VkError};
use crate::object::{string_or_number, MessageNewObject};

/// Callback for `message_new` updates: the payload and the id of the community it came from.
pub type MessageNewHandler = Arc<dyn Fn(MessageNewObject, i64) + Send + Sync>;

/// Long polling session the adapter drives.
#[async_trait]
pub trait LongPollSession: Send + Sync {
    /// Registers a handler called for every `message_new` update, in arrival order.
    fn on_message_new(&self, handler: MessageNewHandler);

    /// Polls until [`LongPollSession::shutdown`] or a fatal error.
    async fn run(&self) -> Result<()>;

    /// Stops the loop. Idempotent; no handler is called for updates not dispatched yet.
    fn shutdown(&self);
}

#[derive(Debug, Clone)]
struct ServerState {
    server: String,
    key: String,
    ts: String,
}

#[derive(Debug, Deserialize)]
struct PollResponse {
    #[serde(default, deserialize_with = "optional_ts")]
    ts: Option<String>,
    #[serde(default)]
    updates: Vec<Update>,
    failed: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Update {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    object: serde_json::Value,
    #[serde(default)]
    group_id: i64,
}

fn optional_ts<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    string_or_number(deserializer).map(Some)
}

/// [`LongPollSession`] over the VK Bots Long Poll API.
pub struct BotsLongPoll {
    api: Arc<dyn VkApi>,
    client: Client,
    group_id: i64,
    wait: u64,
    state: Mutex<ServerState>,
    handlers: RwLock<Vec<MessageNewHandler>>,
    shutdown_tx: watch::Sender<bool>,
}

impl BotsLongPoll {
    /// Fetches the long poll server for `group_id` and prepares a session. Does not start polling.
    pub async fn init(api: Arc<dyn VkApi>, group_id: i64, wait: u64) -> Result<Self> {
        let server = api.groups_get_long_poll_server(group_id).await?;
        // The server holds the request up to `wait` seconds; leave room for the response.
        let client = Client::builder()
            .timeout(Duration::from_secs(wait.saturating_add(10)))
            .build()?;
        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            api,
            client,
            group_id,
            wait,
            state: Mutex::new(ServerState {
                server: server.server,
                key: server.key,
                ts: server.ts,
            }),
            handlers: RwLock::new(Vec::new()),
            shutdown_tx,
        })
    }

    pub fn group_id(&self) -> i64 {
        self.group_id
    }

    fn state(&self) -> ServerState {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update_state(&self, f: impl FnOnce(&mut ServerState)) {
        match self.state.lock() {
            Ok(mut state) => f(&mut state),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    fn is_shutdown(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    async fn check(&self) -> Result<PollResponse> {
        let state = self.state();
        let wait = self.wait.to_string();
        let response = self
            .client
            .get(&state.server)
            .query(&[
                ("act", "a_check"),
                ("key", state.key.as_str()),
                ("ts", state.ts.as_str()),
                ("wait", wait.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }

    /// Fetches a new server and key. The current `ts` is kept unless `update_ts` is set.
    async fn refresh_server(&self, update_ts: bool) -> Result<()> {
        let server = self.api.groups_get_long_poll_server(self.group_id).await?;
        self.update_state(|state| {
            state.server = server.server;
            state.key = server.key;
            if update_ts {
                state.ts = server.ts;
            }
        });
        Ok(())
    }

    async fn handle_response(&self, response: PollResponse) -> Result<()> {
        match response.failed {
            None => {}
            Some(1) => {
                debug!(ts = ?response.ts, "Long poll history outdated, continuing from new ts");
                if let Some(ts) = response.ts {
                    self.update_state(|state| state.ts = ts);
                }
                return Ok(());
            }
            Some(2) => {
                info!("Long poll key expired, requesting new key");
                return self.refresh_server(false).await;
            }
            Some(3) => {
                info!("Long poll history lost, requesting new key and ts");
                return self.refresh_server(true).await;
            }
            Some(code) => {
                return Err(VkError::LongPoll(format!("unexpected failed code {}", code)));
            }
        }

        if let Some(ts) = response.ts {
            self.update_state(|state| state.ts = ts);
        }
        for update in response.updates {
            if self.is_shutdown() {
                break;
            }
            self.dispatch(update);
        }
        Ok(())
    }

    fn dispatch(&self, update: Update) {
        if update.kind != "message_new" {
            debug!(kind = %update.kind, "Skipping long poll update");
            return;
        }
        let object: MessageNewObject = match serde_json::from_value(update.object) {
            Ok(object) => object,
            Err(e) => {
                warn!(error = %e, "Malformed message_new update");
                return;
            }
        };
        let handlers = match self.handlers.read() {
            Ok(handlers) => handlers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for handler in &handlers {
            handler(object.clone(), update.group_id);
        }
    }
}

#[async_trait]
impl LongPollSession for BotsLongPoll {
    fn on_message_new(&self, handler: MessageNewHandler) {
        match self.handlers.write() {
            Ok(mut handlers) => handlers.push(handler),
            Err(poisoned) => poisoned.into_inner().push(handler),
        }
    }

    async fn run(&self) -> Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        info!(group_id = self.group_id, "Long poll started");
        while !*shutdown_rx.borrow_and_update() {
            tokio::select! {
                _ = shutdown_rx.changed() => break,
                response = self.check() => self.handle_response(response?).await?,
            }
        }
        info!(group_id = self.group_id, "Long poll stopped");
        Ok(())
    }

    fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}
