//! Event types flowing through the single app queue, plus the outbound
//! action vocabulary of the realtime channel.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::{
    conversation::Conversation,
    message::{LocalEchoId, Message, MessageKind, Reaction},
    session::User,
};

/// Realtime channel health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// Keyboard input, decoupled from the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Tab,
    Esc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }
}

/// Typed inbound events pushed by the server over the realtime channel,
/// processed strictly in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    NewMessage(Message),
    Delivered {
        echo_id: LocalEchoId,
        message_id: i64,
    },
    Deleted {
        message_id: i64,
    },
    Edited {
        message_id: i64,
        body: String,
        edited_at: DateTime<Utc>,
    },
    ReactionSnapshot {
        message_id: i64,
        reactions: Vec<Reaction>,
    },
    Typing {
        user_id: i64,
        username: String,
        typing: bool,
    },
    StatusChange {
        user_id: i64,
        online: bool,
    },
    /// Server-reported business error; a present echo id rolls back the
    /// associated optimistic record.
    ActionRejected {
        error: String,
        echo_id: Option<LocalEchoId>,
    },
}

/// Outbound user actions emitted on the realtime channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    SendMessage {
        echo_id: LocalEchoId,
        recipient_id: Option<i64>,
        body: String,
        kind: MessageKind,
        media_url: Option<String>,
        voice_duration_secs: Option<u32>,
        reply_to: Option<i64>,
    },
    EditMessage {
        message_id: i64,
        body: String,
    },
    DeleteMessage {
        message_id: i64,
    },
    AddReaction {
        message_id: i64,
        emoji: String,
    },
    TypingStart {
        recipient_id: Option<i64>,
    },
    TypingStop {
        recipient_id: Option<i64>,
    },
    /// Presence announcement, sent on every (re)connect.
    Announce {
        user_id: i64,
    },
}

/// Failure surfaced by a background fetch worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Unauthorized,
    Unavailable,
    InvalidData,
}

/// What to do with a downloaded media file once it is on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaIntent {
    Open,
    Play,
}

/// Everything the shell loop reacts to. Background workers re-enter the
/// single-threaded loop exclusively through these.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Tick,
    QuitRequested,
    Input(KeyInput),
    Connection(ConnectionStatus),
    Server(ServerEvent),
    /// Bulk history result, tagged with the conversation it was fetched
    /// for so stale responses can be discarded.
    HistoryLoaded {
        conversation: Conversation,
        result: Result<Vec<Message>, FetchError>,
    },
    ContactsLoaded {
        result: Result<Vec<User>, FetchError>,
    },
    UploadFinished {
        conversation: Conversation,
        result: Result<Message, FetchError>,
    },
    MediaReady {
        message_id: i64,
        intent: MediaIntent,
        result: Result<PathBuf, FetchError>,
    },
}
