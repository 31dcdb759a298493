//! Adapter abstraction between the framework and a chat platform.
//!
//! An [`Adapter`] feeds platform events into an [`EventBus`] and sends text back to the platform.

use std::sync::Arc;

use async_trait::async_trait;

use crate::event::EventBus;

/// Connects the framework to one chat platform. Implementations map to a transport (e.g. VK).
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Event type this adapter emits into the bus.
    type Event: Send + 'static;
    /// Transport error returned by `send` and `close`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Starts receiving platform events and emitting them into `bus`.
    fn register_at(&self, bus: Arc<dyn EventBus<Self::Event>>);

    /// Sends `text` to `channel`. The channel format is platform-specific.
    async fn send(&self, text: &str, channel: &str) -> Result<(), Self::Error>;

    /// Disconnects from the platform; no events are emitted once it returns.
    async fn close(&self) -> Result<(), Self::Error>;
}
