//! # vkbot-vk
//!
//! VK adapter for the bot framework: [`VkAdapter`] implements [`vkbot_core::Adapter`] on top of the
//! VK API ([`VkClient`]) and Bots Long Poll ([`BotsLongPoll`]).
//! Inbound `message_new` updates are classified into [`VkEvent`]s; outbound text goes to a peer id or a domain.
//! No persistence, retries or message interpretation.

pub mod adapter;
pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod longpoll;
pub mod object;

pub use adapter::{PollStatus, VkAdapter};
pub use api::{Destination, SendParams, VkApi, VkClient};
pub use config::{mask_token, VkConfig};
pub use error::{Result, VkError};
pub use events::{
    classify, ChatCreateEvent, ChatPhotoUpdateEvent, ChatPinUpdateEvent, ChatTitleUpdateEvent,
    UserEnteredChatEvent, UserLeavedChatEvent, VkEvent,
};
pub use longpoll::{BotsLongPoll, LongPollSession, MessageNewHandler};
pub use object::{ActionPhoto, Group, LongPollServer, Message, MessageAction, MessageNewObject};
