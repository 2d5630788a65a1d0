//! Trait seams between the shell orchestrator and the outside world.
//! Backend adapters implement these; tests use stubs.

use anyhow::Result;

use crate::domain::{
    conversation::Conversation,
    events::{AppEvent, ClientAction, ConnectionStatus, MediaIntent},
    message::MessageKind,
    session::Session,
    shell_state::ShellState,
};

pub trait AppEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>>;
}

pub trait ShellOrchestrator {
    fn state(&self) -> &ShellState;
    /// Mutable access for the renderer, which owns scroll bookkeeping.
    fn state_mut(&mut self) -> &mut ShellState;
    fn handle_event(&mut self, event: AppEvent) -> Result<()>;
}

/// Why an outbound emit did not go out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    /// The channel is not currently connected; the caller must roll back
    /// any optimistic state. No automatic retry.
    NotConnected,
    /// The channel worker is gone.
    Closed,
}

/// Outbound side of the realtime channel.
pub trait OutboundChannel {
    fn status(&self) -> ConnectionStatus;
    fn emit(&self, action: ClientAction) -> Result<(), EmitError>;
}

impl<T: OutboundChannel + ?Sized> OutboundChannel for &T {
    fn status(&self) -> ConnectionStatus {
        (*self).status()
    }

    fn emit(&self, action: ClientAction) -> Result<(), EmitError> {
        (*self).emit(action)
    }
}

/// Requests a bulk history fetch for a conversation. The result re-enters
/// the app queue as `AppEvent::HistoryLoaded`, tagged with the conversation
/// so stale responses can be discarded.
pub trait HistoryFetcher {
    fn request(&self, conversation: Conversation);
}

/// Requests the contact list; resolves as `AppEvent::ContactsLoaded`.
pub trait ContactsFetcher {
    fn request(&self);
}

/// Dispatches a multipart upload; resolves as `AppEvent::UploadFinished`.
pub trait UploadDispatcher {
    fn dispatch(
        &self,
        conversation: Conversation,
        recipient_id: Option<i64>,
        kind: MessageKind,
        path: std::path::PathBuf,
    );
}

/// Downloads a media resource to the local cache; resolves as
/// `AppEvent::MediaReady` carrying the intent (open or play).
pub trait MediaFetcher {
    fn request(&self, message_id: i64, media_url: &str, intent: MediaIntent);
}

/// Opens a local file with the platform handler.
pub trait ExternalOpener {
    fn open(&self, path: &std::path::Path) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    Unavailable(String),
}

impl std::fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(details) => write!(f, "session store unavailable: {details}"),
        }
    }
}

impl std::error::Error for SessionStoreError {}

/// Persisted session state (user, token, theme). Survives restarts and is
/// cleared on logout.
pub trait SessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError>;
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;
    /// Returns true when something was actually removed.
    fn clear(&self) -> Result<bool, SessionStoreError>;
}
