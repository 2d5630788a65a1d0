//! Use case for sending a text message with an optimistic local echo.
//!
//! The optimistic record is appended synchronously before the network emit;
//! if the channel refuses the emit the record is rolled back immediately and
//! the failure surfaces to the caller. No automatic retry.

use chrono::{DateTime, Utc};

use crate::domain::{
    chat_state::ChatState,
    conversation::Conversation,
    events::ClientAction,
    message::{DeliveryStatus, LocalEchoId, Message, MessageId, MessageKind},
    session::User,
};

use super::contracts::{EmitError, OutboundChannel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// Message text is empty after trimming whitespace.
    EmptyMessage,
    /// Channel not connected; the optimistic record was rolled back.
    Disconnected,
    /// Channel worker is gone; the optimistic record was rolled back.
    ChannelClosed,
}

pub fn send_text(
    chat: &mut ChatState,
    channel: &dyn OutboundChannel,
    sender: &User,
    active: Conversation,
    text: &str,
    reply_to: Option<i64>,
    sent_at: DateTime<Utc>,
) -> Result<LocalEchoId, SendMessageError> {
    let body = text.trim();
    if body.is_empty() {
        return Err(SendMessageError::EmptyMessage);
    }

    let recipient_id = active.peer();
    let echo_id = chat.append_optimistic(Message {
        id: MessageId::Server(0), // placeholder, rewritten by append_optimistic
        sender_id: sender.id,
        sender_name: sender.username.clone(),
        recipient_id,
        body: body.to_owned(),
        kind: MessageKind::Text,
        media_url: None,
        voice_duration_secs: None,
        sent_at,
        edited_at: None,
        reply_to,
        status: DeliveryStatus::Sending,
        reactions: Vec::new(),
    });

    let action = ClientAction::SendMessage {
        echo_id,
        recipient_id,
        body: body.to_owned(),
        kind: MessageKind::Text,
        media_url: None,
        voice_duration_secs: None,
        reply_to,
    };

    if let Err(error) = channel.emit(action) {
        chat.rollback_local(echo_id);
        return Err(map_emit_error(error));
    }

    Ok(echo_id)
}

fn map_emit_error(error: EmitError) -> SendMessageError {
    match error {
        EmitError::NotConnected => SendMessageError::Disconnected,
        EmitError::Closed => SendMessageError::ChannelClosed,
    }
}
