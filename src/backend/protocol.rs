//! JSON wire protocol of the realtime channel.
//!
//! Every frame is `{"event": "<name>", "data": {...}}`. Event payloads use
//! camelCase keys; message records use the server's snake_case columns.
//! Local echo identifiers travel as `"local-<n>"` strings so the server can
//! mirror them back verbatim in delivery confirmations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    events::{ClientAction, ServerEvent},
    message::{DeliveryStatus, LocalEchoId, Message, MessageId, MessageKind, Reaction},
};

const TEMP_ID_PREFIX: &str = "local-";

pub fn temp_id(echo_id: LocalEchoId) -> String {
    format!("{TEMP_ID_PREFIX}{}", echo_id.value())
}

pub fn parse_temp_id(raw: &str) -> Option<LocalEchoId> {
    raw.strip_prefix(TEMP_ID_PREFIX)
        .and_then(|value| value.parse().ok())
        .map(LocalEchoId::from_value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireReaction {
    pub user_id: i64,
    pub emoji: String,
}

/// A message record as the server serializes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: i64,
    pub sender_id: i64,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub recipient_id: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_message_type")]
    pub message_type: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub voice_duration: Option<u32>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reply_to: Option<i64>,
    #[serde(default)]
    pub reactions: Vec<WireReaction>,
}

fn default_message_type() -> String {
    "text".to_owned()
}

impl WireMessage {
    pub fn into_domain(self) -> Message {
        Message {
            id: MessageId::Server(self.id),
            sender_id: self.sender_id,
            sender_name: self.sender_name,
            recipient_id: self.recipient_id,
            body: self.message,
            kind: kind_from_wire(&self.message_type),
            media_url: self.media_url,
            voice_duration_secs: self.voice_duration,
            sent_at: self.created_at,
            edited_at: self.edited_at,
            reply_to: self.reply_to,
            status: DeliveryStatus::Sent,
            reactions: self
                .reactions
                .into_iter()
                .map(|reaction| Reaction {
                    user_id: reaction.user_id,
                    emoji: reaction.emoji,
                })
                .collect(),
        }
    }
}

pub fn kind_from_wire(message_type: &str) -> MessageKind {
    match message_type {
        "image" => MessageKind::Image,
        "file" => MessageKind::File,
        "voice" => MessageKind::Voice,
        // Unknown types render as plain text rather than being dropped.
        _ => MessageKind::Text,
    }
}

pub fn kind_to_wire(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Text => "text",
        MessageKind::Image => "image",
        MessageKind::File => "file",
        MessageKind::Voice => "voice",
    }
}

/// Server-pushed frames.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum InboundFrame {
    NewMessage(WireMessage),
    MessageDelivered {
        #[serde(rename = "tempId")]
        temp_id: String,
        #[serde(rename = "messageId")]
        message_id: i64,
    },
    MessageDeleted {
        #[serde(rename = "messageId")]
        message_id: i64,
    },
    MessageEdited {
        id: i64,
        body: String,
        #[serde(rename = "editedAt")]
        edited_at: DateTime<Utc>,
    },
    ReactionAdded {
        #[serde(rename = "messageId")]
        message_id: i64,
        reactions: Vec<WireReaction>,
    },
    UserTyping {
        #[serde(rename = "userId")]
        user_id: i64,
        username: String,
        typing: bool,
    },
    UserStatusChange {
        #[serde(rename = "userId")]
        user_id: i64,
        status: String,
    },
    MessageError {
        error: String,
        #[serde(rename = "tempId", default)]
        temp_id: Option<String>,
    },
}

impl InboundFrame {
    pub fn into_event(self) -> ServerEvent {
        match self {
            InboundFrame::NewMessage(message) => ServerEvent::NewMessage(message.into_domain()),
            InboundFrame::MessageDelivered {
                temp_id,
                message_id,
            } => match parse_temp_id(&temp_id) {
                Some(echo_id) => ServerEvent::Delivered {
                    echo_id,
                    message_id,
                },
                // A confirmation we cannot correlate still carries a valid
                // record; surface it as an error so the user can refresh.
                None => ServerEvent::ActionRejected {
                    error: format!("unrecognized delivery id {temp_id}"),
                    echo_id: None,
                },
            },
            InboundFrame::MessageDeleted { message_id } => ServerEvent::Deleted { message_id },
            InboundFrame::MessageEdited {
                id,
                body,
                edited_at,
            } => ServerEvent::Edited {
                message_id: id,
                body,
                edited_at,
            },
            InboundFrame::ReactionAdded {
                message_id,
                reactions,
            } => ServerEvent::ReactionSnapshot {
                message_id,
                reactions: reactions
                    .into_iter()
                    .map(|reaction| Reaction {
                        user_id: reaction.user_id,
                        emoji: reaction.emoji,
                    })
                    .collect(),
            },
            InboundFrame::UserTyping {
                user_id,
                username,
                typing,
            } => ServerEvent::Typing {
                user_id,
                username,
                typing,
            },
            InboundFrame::UserStatusChange { user_id, status } => ServerEvent::StatusChange {
                user_id,
                online: status == "online",
            },
            InboundFrame::MessageError { error, temp_id } => ServerEvent::ActionRejected {
                error,
                echo_id: temp_id.as_deref().and_then(parse_temp_id),
            },
        }
    }
}

/// Client-emitted frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum OutboundFrame {
    SendMessage {
        #[serde(rename = "tempId")]
        temp_id: String,
        #[serde(rename = "recipientId", skip_serializing_if = "Option::is_none")]
        recipient_id: Option<i64>,
        message: String,
        #[serde(rename = "messageType")]
        message_type: &'static str,
        #[serde(rename = "mediaUrl", skip_serializing_if = "Option::is_none")]
        media_url: Option<String>,
        #[serde(rename = "voiceDuration", skip_serializing_if = "Option::is_none")]
        voice_duration: Option<u32>,
        #[serde(rename = "replyTo", skip_serializing_if = "Option::is_none")]
        reply_to: Option<i64>,
    },
    EditMessage {
        #[serde(rename = "messageId")]
        message_id: i64,
        #[serde(rename = "newMessage")]
        new_message: String,
    },
    DeleteMessage {
        #[serde(rename = "messageId")]
        message_id: i64,
    },
    AddReaction {
        #[serde(rename = "messageId")]
        message_id: i64,
        emoji: String,
    },
    TypingStart {
        #[serde(rename = "recipientId", skip_serializing_if = "Option::is_none")]
        recipient_id: Option<i64>,
    },
    TypingStop {
        #[serde(rename = "recipientId", skip_serializing_if = "Option::is_none")]
        recipient_id: Option<i64>,
    },
    UserOnline {
        #[serde(rename = "userId")]
        user_id: i64,
    },
}

impl OutboundFrame {
    pub fn from_action(action: ClientAction) -> Self {
        match action {
            ClientAction::SendMessage {
                echo_id,
                recipient_id,
                body,
                kind,
                media_url,
                voice_duration_secs,
                reply_to,
            } => OutboundFrame::SendMessage {
                temp_id: temp_id(echo_id),
                recipient_id,
                message: body,
                message_type: kind_to_wire(kind),
                media_url,
                voice_duration: voice_duration_secs,
                reply_to,
            },
            ClientAction::EditMessage { message_id, body } => OutboundFrame::EditMessage {
                message_id,
                new_message: body,
            },
            ClientAction::DeleteMessage { message_id } => {
                OutboundFrame::DeleteMessage { message_id }
            }
            ClientAction::AddReaction { message_id, emoji } => {
                OutboundFrame::AddReaction { message_id, emoji }
            }
            ClientAction::TypingStart { recipient_id } => {
                OutboundFrame::TypingStart { recipient_id }
            }
            ClientAction::TypingStop { recipient_id } => {
                OutboundFrame::TypingStop { recipient_id }
            }
            ClientAction::Announce { user_id } => OutboundFrame::UserOnline { user_id },
        }
    }
}
