//! Fake [`VkApi`] and [`LongPollSession`] for adapter tests.
//!
//! `FakeApi` records every `messages.send` call; `FakeLongPoll` lets a test push `message_new`
//! payloads into the registered handlers without any network.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use vkbot_vk::{
    Group, LongPollServer, LongPollSession, Message, MessageAction, MessageNewHandler,
    MessageNewObject, Result, SendParams, VkApi, VkError,
};

/// Fake VK API. Defaults: one group {42, "TestBot"}, every call succeeds.
pub struct FakeApi {
    pub groups: Vec<Group>,
    /// When set, `groups_get_by_id` fails with this message.
    pub groups_error: Option<String>,
    pub long_poll_server: LongPollServer,
    pub long_poll_error: bool,
    pub send_error: bool,
    pub sent: Mutex<Vec<SendParams>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            groups: vec![Group {
                id: 42,
                name: "TestBot".to_string(),
                screen_name: "testbot".to_string(),
            }],
            groups_error: None,
            long_poll_server: LongPollServer {
                server: "http://127.0.0.1:9/lp".to_string(),
                key: "key".to_string(),
                ts: "1".to_string(),
            },
            long_poll_error: false,
            send_error: false,
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl FakeApi {
    pub fn sent(&self) -> Vec<SendParams> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl VkApi for FakeApi {
    async fn groups_get_by_id(&self) -> Result<Vec<Group>> {
        match &self.groups_error {
            Some(message) => Err(VkError::Api {
                code: 5,
                message: message.clone(),
            }),
            None => Ok(self.groups.clone()),
        }
    }

    async fn messages_send(&self, params: &SendParams) -> Result<i64> {
        if self.send_error {
            return Err(VkError::Api {
                code: 901,
                message: "Can't send messages for users without permission".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(params.clone());
        Ok(sent.len() as i64)
    }

    async fn groups_get_long_poll_server(&self, _group_id: i64) -> Result<LongPollServer> {
        if self.long_poll_error {
            return Err(VkError::Api {
                code: 100,
                message: "Long Poll is disabled".to_string(),
            });
        }
        Ok(self.long_poll_server.clone())
    }
}

/// Fake long poll: `run` waits for `shutdown` (or fails immediately if `run_error` is set).
pub struct FakeLongPoll {
    handlers: Mutex<Vec<MessageNewHandler>>,
    shutdown_tx: watch::Sender<bool>,
    run_error: Mutex<Option<VkError>>,
    pub run_calls: AtomicUsize,
    pub delivered: AtomicUsize,
}

impl FakeLongPoll {
    pub fn new() -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);
        Arc::new(Self {
            handlers: Mutex::new(Vec::new()),
            shutdown_tx,
            run_error: Mutex::new(None),
            run_calls: AtomicUsize::new(0),
            delivered: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: VkError) -> Arc<Self> {
        let longpoll = Self::new();
        *longpoll.run_error.lock().unwrap() = Some(error);
        longpoll
    }

    /// Passes `object` to every handler unless shut down. Returns whether it was delivered.
    pub fn deliver(&self, object: MessageNewObject) -> bool {
        if *self.shutdown_tx.borrow() {
            return false;
        }
        let handlers = self.handlers.lock().unwrap().clone();
        for handler in &handlers {
            handler(object.clone(), 42);
        }
        self.delivered.fetch_add(1, Ordering::SeqCst);
        true
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }
}

#[async_trait]
impl LongPollSession for FakeLongPoll {
    fn on_message_new(&self, handler: MessageNewHandler) {
        self.handlers.lock().unwrap().push(handler);
    }

    async fn run(&self) -> Result<()> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        let error = self.run_error.lock().unwrap().take();
        if let Some(error) = error {
            return Err(error);
        }
        let mut rx = self.shutdown_tx.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                break;
            }
        }
        Ok(())
    }

    fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

/// `message_new` payload with the given action tag in conversation `peer_id`.
pub fn action_object(kind: &str, member_id: i64, peer_id: i64) -> MessageNewObject {
    MessageNewObject {
        message: Message {
            peer_id,
            from_id: 1,
            action: Some(MessageAction {
                kind: kind.to_string(),
                member_id,
                ..Default::default()
            }),
            ..Default::default()
        },
        client_info: None,
    }
}

/// Plain text message.
pub fn text_object(id: i64, from_id: i64, peer_id: i64, text: &str) -> MessageNewObject {
    MessageNewObject {
        message: Message {
            id,
            from_id,
            peer_id,
            text: text.to_string(),
            ..Default::default()
        },
        client_info: None,
    }
}
