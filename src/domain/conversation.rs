use std::collections::HashMap;

use super::message::Message;

/// The active conversation: the shared broadcast channel, or a one-to-one
/// chat identified by the peer's user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Conversation {
    #[default]
    Broadcast,
    Direct(i64),
}

impl Conversation {
    pub fn peer(&self) -> Option<i64> {
        match self {
            Conversation::Broadcast => None,
            Conversation::Direct(peer) => Some(*peer),
        }
    }

    /// Membership test: does `message` belong to this conversation, as seen
    /// by `current_user`? Broadcast accepts only messages with no recipient;
    /// a direct chat accepts messages whose (sender, recipient) unordered
    /// pair equals {current_user, peer}.
    pub fn accepts(&self, message: &Message, current_user: i64) -> bool {
        match (self, message.recipient_id) {
            (Conversation::Broadcast, None) => true,
            (Conversation::Broadcast, Some(_)) => false,
            (Conversation::Direct(_), None) => false,
            (Conversation::Direct(peer), Some(recipient)) => {
                (message.sender_id == current_user && recipient == *peer)
                    || (message.sender_id == *peer && recipient == current_user)
            }
        }
    }

    /// Classifies a message into the conversation it belongs to, as seen by
    /// `current_user`. Used for unread accounting of messages that miss the
    /// active conversation.
    pub fn of_message(message: &Message, current_user: i64) -> Conversation {
        match message.recipient_id {
            None => Conversation::Broadcast,
            Some(recipient) if message.sender_id == current_user => Conversation::Direct(recipient),
            Some(_) => Conversation::Direct(message.sender_id),
        }
    }
}

/// Per-conversation unread counters. Incremented only for inbound messages
/// that do not belong to the active conversation; zeroed on switch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnreadCounters {
    counts: HashMap<Conversation, u32>,
}

impl UnreadCounters {
    pub fn record(&mut self, conversation: Conversation) {
        *self.counts.entry(conversation).or_insert(0) += 1;
    }

    pub fn count(&self, conversation: Conversation) -> u32 {
        self.counts.get(&conversation).copied().unwrap_or(0)
    }

    pub fn clear(&mut self, conversation: Conversation) {
        self.counts.remove(&conversation);
    }
}
