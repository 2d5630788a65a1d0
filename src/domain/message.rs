use chrono::{DateTime, Utc};

/// Client-local identifier for an optimistic record awaiting server
/// confirmation. Allocated from a monotonic counter, never reused, so rapid
/// sends within the same instant cannot collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalEchoId(u64);

impl LocalEchoId {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Reconstructs an id received back from the server (e.g. in a delivery
    /// acknowledgement or a rejection event).
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }
}

/// Allocator for [`LocalEchoId`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalEchoIds {
    next: u64,
}

impl LocalEchoIds {
    pub fn allocate(&mut self) -> LocalEchoId {
        let id = LocalEchoId(self.next);
        self.next += 1;
        id
    }
}

/// Message identifier: client-local until the server confirms delivery,
/// server-assigned afterwards. The two are distinct types on purpose so an
/// unconfirmed record can never be mistaken for a confirmed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    Local(LocalEchoId),
    Server(i64),
}

impl MessageId {
    pub fn server(self) -> Option<i64> {
        match self {
            MessageId::Server(id) => Some(id),
            MessageId::Local(_) => None,
        }
    }

    pub fn is_local(self) -> bool {
        matches!(self, MessageId::Local(_))
    }
}

/// Payload kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    File,
    Voice,
}

impl MessageKind {
    /// Returns a display label for media kinds, or None for plain text.
    pub fn display_label(&self) -> Option<&'static str> {
        match self {
            MessageKind::Text => None,
            MessageKind::Image => Some("[Image]"),
            MessageKind::File => Some("[File]"),
            MessageKind::Voice => Some("[Voice]"),
        }
    }
}

/// Delivery progress of an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryStatus {
    #[default]
    Sending,
    Sent,
    Delivered,
    Seen,
}

impl DeliveryStatus {
    /// Tick marks shown next to own messages.
    pub fn tick(&self) -> &'static str {
        match self {
            DeliveryStatus::Sending => "~",
            DeliveryStatus::Sent => "v",
            DeliveryStatus::Delivered | DeliveryStatus::Seen => "vv",
        }
    }
}

/// A single (user, emoji) reaction. The server guarantees at most one record
/// per pair; the client upholds the same rule for optimistic toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub user_id: i64,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: i64,
    pub sender_name: String,
    /// None for broadcast messages.
    pub recipient_id: Option<i64>,
    pub body: String,
    pub kind: MessageKind,
    pub media_url: Option<String>,
    pub voice_duration_secs: Option<u32>,
    pub sent_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    /// Server id of the message this one replies to.
    pub reply_to: Option<i64>,
    pub status: DeliveryStatus,
    pub reactions: Vec<Reaction>,
}

impl Message {
    /// Returns the display content: media label + body, or just the body.
    pub fn display_content(&self) -> String {
        match (self.kind.display_label(), self.body.is_empty()) {
            (Some(label), true) => label.to_owned(),
            (Some(label), false) => format!("{} {}", label, self.body),
            (None, _) => self.body.clone(),
        }
    }

    pub fn has_reaction(&self, user_id: i64, emoji: &str) -> bool {
        self.reactions
            .iter()
            .any(|reaction| reaction.user_id == user_id && reaction.emoji == emoji)
    }

    pub fn is_own(&self, current_user_id: i64) -> bool {
        self.sender_id == current_user_id
    }
}
