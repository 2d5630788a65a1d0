//! Aggregate state owned by the shell orchestrator. All mutation happens on
//! the UI thread, one event at a time.

use std::time::Duration;

use super::{
    chat_state::ChatState,
    composer::ComposerState,
    contact_list::ContactListState,
    conversation::{Conversation, UnreadCounters},
    events::ConnectionStatus,
    notice::NoticeBoard,
    presence::{PresenceSet, TypingTracker},
    session::{Theme, User},
};

const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Sidebar,
    Messages,
    #[default]
    Composer,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Sidebar => Focus::Messages,
            Focus::Messages => Focus::Composer,
            Focus::Composer => Focus::Sidebar,
        }
    }
}

#[derive(Debug)]
pub struct ShellState {
    running: bool,
    connection: ConnectionStatus,
    focus: Focus,
    user: User,
    theme: Theme,
    active: Conversation,
    pub chat: ChatState,
    pub sidebar: ContactListState,
    pub presence: PresenceSet,
    pub typing: TypingTracker,
    pub composer: ComposerState,
    pub unread: UnreadCounters,
    pub notices: NoticeBoard,
}

impl ShellState {
    pub fn new(user: User, theme: Theme, typing_ttl: Duration, typing_idle: Duration) -> Self {
        Self {
            running: true,
            connection: ConnectionStatus::Connecting,
            focus: Focus::default(),
            user,
            theme,
            active: Conversation::Broadcast,
            chat: ChatState::default(),
            sidebar: ContactListState::default(),
            presence: PresenceSet::default(),
            typing: TypingTracker::new(typing_ttl),
            composer: ComposerState::new(typing_idle),
            unread: UnreadCounters::default(),
            notices: NoticeBoard::new(NOTICE_TTL),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn set_connection(&mut self, status: ConnectionStatus) {
        self.connection = status;
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_composer(&mut self) {
        self.focus = Focus::Composer;
    }

    pub fn active_conversation(&self) -> Conversation {
        self.active
    }

    pub fn set_active_conversation(&mut self, conversation: Conversation) {
        self.active = conversation;
    }
}
