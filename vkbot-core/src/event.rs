//! Core events and the event bus adapters emit into.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::{CoreError, Result};

/// A plain text message received by an adapter.
///
/// `data` keeps the platform's original payload for handlers that need fields not surfaced here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiveMessageEvent<D> {
    /// Message text.
    pub text: String,
    /// Platform message id.
    pub id: String,
    /// Id of the author.
    pub author_id: String,
    /// The channel over which the message was received.
    pub channel: String,
    /// Original payload.
    pub data: D,
}

/// Sink for events produced by adapters.
pub trait EventBus<E>: Send + Sync {
    fn emit(&self, event: E);
}

/// [`EventBus`] backed by an unbounded tokio channel. Events are received in emit order.
pub struct ChannelBus<E> {
    tx: mpsc::UnboundedSender<E>,
}

impl<E: Send> ChannelBus<E> {
    /// Creates a bus and the receiver the framework consumes events from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<E>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Like [`EventBus::emit`] but reports a dropped receiver instead of logging it.
    pub fn try_emit(&self, event: E) -> Result<()> {
        self.tx.send(event).map_err(|_| CoreError::BusClosed)
    }
}

impl<E: Send> EventBus<E> for ChannelBus<E> {
    fn emit(&self, event: E) {
        if let Err(e) = self.try_emit(event) {
            warn!(error = %e, "Dropping event");
        }
    }
}

impl<E> Clone for ChannelBus<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}
