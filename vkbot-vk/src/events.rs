//! Events the VK adapter emits, and [`classify`], which maps a raw `message_new` payload to one of them.
//!
//! Conversation service actions (chat created, title/photo changed, pins, members joining or
//! leaving) get their own variants; everything else is a plain [`ReceiveMessageEvent`].
//! Every variant keeps the original payload in `data`.

use serde::Serialize;
use vkbot_core::ReceiveMessageEvent;

use crate::object::{ActionPhoto, MessageNewObject};

/// A conversation was created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCreateEvent {
    /// The id of the created channel.
    pub channel: String,
    /// Chat title.
    pub text: String,
    pub data: MessageNewObject,
}

/// The chat title was changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTitleUpdateEvent {
    pub channel: String,
    /// New chat title.
    pub new_text: String,
    pub data: MessageNewObject,
}

/// The chat cover photo was changed or removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatPhotoUpdateEvent {
    pub channel: String,
    /// New cover photo URLs; `None` when VK sends none (e.g. on removal).
    pub new_photo: Option<ActionPhoto>,
    /// true if the cover photo was removed.
    pub removed: bool,
    pub data: MessageNewObject,
}

/// A message was pinned or unpinned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatPinUpdateEvent {
    pub channel: String,
    /// User who changed the pin.
    pub user_id: String,
    /// Conversation message id of the (un)pinned message.
    pub message_id: String,
    /// true if the message was unpinned.
    pub unpinned: bool,
    pub data: MessageNewObject,
}

/// A user joined the chat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserEnteredChatEvent {
    pub channel: String,
    /// The new member.
    pub user_id: String,
    /// true if the user joined through an invite link.
    pub by_link: bool,
    pub data: MessageNewObject,
}

/// A user left or was removed from the chat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserLeavedChatEvent {
    pub channel: String,
    /// The member who left.
    pub user_id: String,
    pub data: MessageNewObject,
}

/// Everything the VK adapter emits into the event bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VkEvent {
    MessageReceived(ReceiveMessageEvent<MessageNewObject>),
    ChatCreate(ChatCreateEvent),
    ChatTitleUpdate(ChatTitleUpdateEvent),
    ChatPhotoUpdate(ChatPhotoUpdateEvent),
    ChatPinUpdate(ChatPinUpdateEvent),
    UserEnteredChat(UserEnteredChatEvent),
    UserLeavedChat(UserLeavedChatEvent),
}

impl VkEvent {
    /// Channel (peer id) the event belongs to.
    pub fn channel(&self) -> &str {
        match self {
            VkEvent::MessageReceived(e) => &e.channel,
            VkEvent::ChatCreate(e) => &e.channel,
            VkEvent::ChatTitleUpdate(e) => &e.channel,
            VkEvent::ChatPhotoUpdate(e) => &e.channel,
            VkEvent::ChatPinUpdate(e) => &e.channel,
            VkEvent::UserEnteredChat(e) => &e.channel,
            VkEvent::UserLeavedChat(e) => &e.channel,
        }
    }

    /// Original `message_new` payload.
    pub fn data(&self) -> &MessageNewObject {
        match self {
            VkEvent::MessageReceived(e) => &e.data,
            VkEvent::ChatCreate(e) => &e.data,
            VkEvent::ChatTitleUpdate(e) => &e.data,
            VkEvent::ChatPhotoUpdate(e) => &e.data,
            VkEvent::ChatPinUpdate(e) => &e.data,
            VkEvent::UserEnteredChat(e) => &e.data,
            VkEvent::UserLeavedChat(e) => &e.data,
        }
    }
}

/// Maps a `message_new` payload to exactly one [`VkEvent`] by its action tag.
/// Messages without an action, or with a tag not listed here, become [`VkEvent::MessageReceived`].
pub fn classify(object: MessageNewObject) -> VkEvent {
    let message = &object.message;
    let channel = message.peer_id.to_string();
    let Some(action) = message.action.clone() else {
        return message_received(object);
    };

    match action.kind.as_str() {
        "chat_create" => VkEvent::ChatCreate(ChatCreateEvent {
            channel,
            text: action.text,
            data: object,
        }),
        "chat_title_update" => VkEvent::ChatTitleUpdate(ChatTitleUpdateEvent {
            channel,
            new_text: action.text,
            data: object,
        }),
        "chat_photo_update" | "chat_photo_remove" => VkEvent::ChatPhotoUpdate(ChatPhotoUpdateEvent {
            channel,
            removed: action.kind == "chat_photo_remove",
            new_photo: action.photo,
            data: object,
        }),
        "chat_pin_message" | "chat_unpin_message" => VkEvent::ChatPinUpdate(ChatPinUpdateEvent {
            channel,
            user_id: action.member_id.to_string(),
            message_id: action.conversation_message_id.to_string(),
            unpinned: action.kind == "chat_unpin_message",
            data: object,
        }),
        "chat_invite_user" | "chat_invite_user_by_link" => {
            VkEvent::UserEnteredChat(UserEnteredChatEvent {
                channel,
                user_id: action.member_id.to_string(),
                by_link: action.kind == "chat_invite_user_by_link",
                data: object,
            })
        }
        "chat_kick_user" => VkEvent::UserLeavedChat(UserLeavedChatEvent {
            channel,
            user_id: action.member_id.to_string(),
            data: object,
        }),
        _ => message_received(object),
    }
}

fn message_received(object: MessageNewObject) -> VkEvent {
    let message = &object.message;
    VkEvent::MessageReceived(ReceiveMessageEvent {
        text: message.text.clone(),
        id: message.id.to_string(),
        author_id: message.from_id.to_string(),
        channel: message.peer_id.to_string(),
        data: object,
    })
}
