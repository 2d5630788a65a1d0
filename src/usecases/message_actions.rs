//! Edit, delete and reaction actions on existing messages.
//!
//! Edits and deletes are not optimistic: the authoritative mutation arrives
//! as a server event. Reaction toggles are optimistic and superseded by the
//! next server snapshot.

use crate::domain::{chat_state::ChatState, events::ClientAction};

use super::contracts::{EmitError, OutboundChannel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageActionError {
    EmptyMessage,
    Disconnected,
    ChannelClosed,
}

/// Requests an edit of an own, server-confirmed message. The local record
/// is mutated later, by the resulting `message-edited` event.
pub fn edit_message(
    channel: &dyn OutboundChannel,
    message_id: i64,
    body: &str,
) -> Result<(), MessageActionError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(MessageActionError::EmptyMessage);
    }

    channel
        .emit(ClientAction::EditMessage {
            message_id,
            body: body.to_owned(),
        })
        .map_err(map_emit_error)
}

/// Requests a delete; the record is removed by the `message-deleted` event.
pub fn delete_message(
    channel: &dyn OutboundChannel,
    message_id: i64,
) -> Result<(), MessageActionError> {
    channel
        .emit(ClientAction::DeleteMessage { message_id })
        .map_err(map_emit_error)
}

/// Toggles a (user, emoji) reaction optimistically and emits the action.
/// If the emit fails the toggle is reverted; otherwise the next server
/// snapshot becomes the ground truth.
pub fn toggle_reaction(
    chat: &mut ChatState,
    channel: &dyn OutboundChannel,
    message_id: i64,
    user_id: i64,
    emoji: &str,
) -> Result<(), MessageActionError> {
    chat.toggle_reaction(message_id, user_id, emoji);

    let result = channel.emit(ClientAction::AddReaction {
        message_id,
        emoji: emoji.to_owned(),
    });

    if let Err(error) = result {
        chat.toggle_reaction(message_id, user_id, emoji);
        return Err(map_emit_error(error));
    }

    Ok(())
}

fn map_emit_error(error: EmitError) -> MessageActionError {
    match error {
        EmitError::NotConnected => MessageActionError::Disconnected,
        EmitError::Closed => MessageActionError::ChannelClosed,
    }
}
