//! [`VkAdapter`]: connects to VK, emits classified long poll events into the framework's event bus,
//! and sends text messages to a peer id or a domain.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;
use tracing::{error, info, warn, Dispatch};
use vkbot_core::{Adapter, EventBus};

use crate::api::{Destination, SendParams, VkApi, VkClient};
use crate::config::VkConfig;
use crate::error::{Result, VkError};
use crate::events::{classify, VkEvent};
use crate::longpoll::{BotsLongPoll, LongPollSession};
use crate::object::Group;

/// State of the background long poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// `register_at` has not been called.
    Idle,
    Running,
    /// The loop ended after shutdown.
    Stopped,
    /// The loop ended with an error.
    Failed(String),
}

/// VK implementation of [`vkbot_core::Adapter`].
pub struct VkAdapter {
    api: Arc<dyn VkApi>,
    longpoll: Arc<dyn LongPollSession>,
    group: Group,
    logger: Dispatch,
    /// Set by the first `register_at`; never cleared, so the loop starts at most once.
    started: AtomicBool,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    status: Arc<Mutex<PollStatus>>,
}

impl VkAdapter {
    /// Connects to VK with the configured token: resolves the bot's community and prepares long polling.
    pub async fn new(config: VkConfig) -> Result<Self> {
        if config.token.is_empty() {
            return Err(VkError::Config("access token is empty".to_string()));
        }
        let api: Arc<dyn VkApi> = Arc::new(VkClient::new(&config));
        Self::connect(api, &config).await
    }

    /// Like [`VkAdapter::new`] but with a caller-provided API implementation.
    pub async fn connect(api: Arc<dyn VkApi>, config: &VkConfig) -> Result<Self> {
        let logger = config.dispatch();
        async {
            let groups = api
                .groups_get_by_id()
                .await
                .map_err(|e| VkError::GetBotInfo(Some(e.to_string())))?;
            let group = groups.into_iter().next().ok_or(VkError::GetBotInfo(None))?;
            info!(group_id = group.id, name = %group.name, "Got group info");

            let longpoll = BotsLongPoll::init(api.clone(), group.id, config.long_poll_wait)
                .await
                .map_err(|e| VkError::LongPollInit(Box::new(e)))?;

            Ok::<Self, VkError>(Self::from_parts(
                api.clone(),
                Arc::new(longpoll),
                group,
                logger.clone(),
            ))
        }
        .with_subscriber(logger.clone())
        .await
    }

    /// Assembles an adapter from ready collaborators without any network calls.
    pub fn from_parts(
        api: Arc<dyn VkApi>,
        longpoll: Arc<dyn LongPollSession>,
        group: Group,
        logger: Dispatch,
    ) -> Self {
        Self {
            api,
            longpoll,
            group,
            logger,
            started: AtomicBool::new(false),
            poll_task: Mutex::new(None),
            status: Arc::new(Mutex::new(PollStatus::Idle)),
        }
    }

    /// Community the bot acts as.
    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Current state of the background long poll loop.
    pub fn poll_status(&self) -> PollStatus {
        lock(&self.status).clone()
    }

    async fn send_to(&self, text: &str, destination: Destination) -> Result<()> {
        tracing::dispatcher::with_default(&self.logger, || match &destination {
            Destination::PeerId(peer_id) => info!(peer_id = *peer_id, "Sending message to chat"),
            Destination::Domain(domain) => info!(domain = %domain, "Sending message to chat"),
        });

        let params = SendParams {
            destination,
            message: text.to_string(),
            random_id: 0,
        };
        self.api
            .messages_send(&params)
            .with_subscriber(self.logger.clone())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Adapter for VkAdapter {
    type Event = VkEvent;
    type Error = VkError;

    /// Registers the event handler and starts the long poll loop in the background. Only the first call has effect.
    fn register_at(&self, bus: Arc<dyn EventBus<VkEvent>>) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::dispatcher::with_default(&self.logger, || {
                warn!("Long poll already started, ignoring register_at")
            });
            return;
        }

        let logger = self.logger.clone();
        self.longpoll.on_message_new(Arc::new(move |object, _group_id| {
            tracing::dispatcher::with_default(&logger, || {
                info!(peer_id = object.message.peer_id, "Message received");
            });
            bus.emit(classify(object));
        }));

        *lock(&self.status) = PollStatus::Running;
        let longpoll = self.longpoll.clone();
        let status = self.status.clone();
        let handle = tokio::spawn(
            async move {
                let result = longpoll.run().await;
                let mut current = lock(&status);
                match result {
                    Ok(()) => *current = PollStatus::Stopped,
                    Err(e) => {
                        error!(error = %e, "Long poll run failed");
                        *current = PollStatus::Failed(e.to_string());
                    }
                }
            }
            .with_subscriber(self.logger.clone()),
        );
        *lock(&self.poll_task) = Some(handle);
    }

    /// Sends `text` to `channel`: a decimal channel is a peer id, anything else a domain.
    async fn send(&self, text: &str, channel: &str) -> Result<()> {
        let destination = match channel.parse::<i64>() {
            Ok(peer_id) => Destination::PeerId(peer_id),
            Err(_) => Destination::Domain(channel.to_string()),
        };
        self.send_to(text, destination).await
    }

    /// Shuts the long poll down and waits for the loop to exit. Always succeeds; safe to call twice.
    async fn close(&self) -> Result<()> {
        self.longpoll.shutdown();
        let handle = lock(&self.poll_task).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::dispatcher::with_default(&self.logger, || {
                    warn!(error = %e, "Long poll task did not finish cleanly")
                });
            }
        }
        Ok(())
    }
}

impl Drop for VkAdapter {
    fn drop(&mut self) {
        self.longpoll.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
