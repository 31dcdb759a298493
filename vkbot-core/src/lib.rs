//! # vkbot-core
//!
//! Core types and traits of the bot framework: [`Adapter`], [`EventBus`] and the channel-backed
//! [`ChannelBus`], the generic [`ReceiveMessageEvent`], and tracing initialization.
//! Transport-agnostic; platform adapters (e.g. vkbot-vk) build on it.

pub mod adapter;
pub mod error;
pub mod event;
pub mod logger;

pub use adapter::Adapter;
pub use error::{CoreError, Result};
pub use event::{ChannelBus, EventBus, ReceiveMessageEvent};
pub use logger::init_tracing;
