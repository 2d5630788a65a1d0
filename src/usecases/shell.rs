//! The shell orchestrator: owns the aggregate state and reduces every
//! `AppEvent` into it, one at a time on the UI thread. Background workers
//! never touch state directly; they only enqueue events.

use std::time::Instant;

use anyhow::Result;
use chrono::Utc;

use crate::domain::{
    chat_state::ChatLoadState,
    composer::{AttachmentCommand, ComposerMode, TypingSignal},
    conversation::Conversation,
    events::{
        AppEvent, ClientAction, ConnectionStatus, FetchError, Key, KeyInput, MediaIntent,
        ServerEvent,
    },
    message::MessageKind,
    notice::NoticeLevel,
    session::Session,
    shell_state::{Focus, ShellState},
};

use super::{
    contracts::{
        ContactsFetcher, ExternalOpener, HistoryFetcher, MediaFetcher, OutboundChannel,
        SessionStore, ShellOrchestrator, UploadDispatcher,
    },
    message_actions::{delete_message, edit_message, toggle_reaction},
    playback::{AudioBackend, VoicePlayer},
    send_message::{send_text, SendMessageError},
    switch_conversation::{apply_history, switch},
    upload::{apply_upload_result, request_upload, UploadRequestError},
};

/// Quick-reaction palette bound to the 1..4 keys in the message pane.
const REACTION_PALETTE: [&str; 4] = ["👍", "❤️", "😂", "😮"];

/// Backend adapters the orchestrator drives. Boxed trait objects so tests
/// can swap in stubs piecemeal.
pub struct ShellServices {
    pub channel: Box<dyn OutboundChannel>,
    pub history: Box<dyn HistoryFetcher>,
    pub contacts: Box<dyn ContactsFetcher>,
    pub uploads: Box<dyn UploadDispatcher>,
    pub media: Box<dyn MediaFetcher>,
    pub opener: Box<dyn ExternalOpener>,
    pub sessions: Box<dyn SessionStore>,
}

pub struct DefaultShellOrchestrator<B: AudioBackend> {
    state: ShellState,
    services: ShellServices,
    voice: VoicePlayer<B>,
    token: String,
    saw_disconnect: bool,
}

impl<B: AudioBackend> DefaultShellOrchestrator<B> {
    /// Builds the orchestrator and kicks off the initial contact and
    /// broadcast-history fetches.
    pub fn new(
        session: Session,
        typing_ttl: std::time::Duration,
        typing_idle: std::time::Duration,
        services: ShellServices,
        voice_backend: B,
    ) -> Self {
        let Session { user, token, theme } = session;
        let state = ShellState::new(user, theme, typing_ttl, typing_idle);

        services.contacts.request();
        services.history.request(Conversation::Broadcast);

        Self {
            state,
            services,
            voice: VoicePlayer::new(voice_backend),
            token,
            saw_disconnect: false,
        }
    }

    fn handle_tick(&mut self) {
        let now = Instant::now();
        self.state.typing.expire(now);
        self.state.notices.expire(now);
        if let Some(signal) = self.state.composer.idle_tick(now) {
            self.emit_typing(signal);
        }
    }

    fn handle_input(&mut self, input: KeyInput) {
        if input.ctrl {
            match input.key {
                Key::Char('c') | Key::Char('q') => {
                    self.quit();
                    return;
                }
                Key::Char('t') => {
                    self.toggle_theme();
                    return;
                }
                _ => {}
            }
        }

        if input.key == Key::Tab {
            self.state.cycle_focus();
            return;
        }

        match self.state.focus() {
            Focus::Sidebar => self.handle_sidebar_key(input.key),
            Focus::Messages => self.handle_messages_key(input.key),
            Focus::Composer => self.handle_composer_key(input.key),
        }
    }

    fn handle_sidebar_key(&mut self, key: Key) {
        match key {
            Key::Up | Key::Char('k') => self.state.sidebar.select_previous(),
            Key::Down | Key::Char('j') => self.state.sidebar.select_next(),
            Key::Enter => {
                let target = self.state.sidebar.selected_entry().conversation;
                switch(&mut self.state, self.services.history.as_ref(), target);
                self.state.focus_composer();
            }
            _ => {}
        }
    }

    fn handle_messages_key(&mut self, key: Key) {
        match key {
            Key::Up | Key::Char('k') => self.state.chat.select_previous(),
            Key::Down | Key::Char('j') => self.state.chat.select_next(),
            Key::Char('e') => self.begin_edit_selected(),
            Key::Char('d') => self.delete_selected(),
            Key::Char('r') => self.begin_reply_selected(),
            Key::Char('o') => self.request_selected_media(MediaIntent::Open),
            Key::Char('p') => self.request_selected_media(MediaIntent::Play),
            Key::Char('s') => self.voice.stop(),
            Key::Char(digit @ '1'..='4') => self.react_to_selected(digit),
            Key::Esc => self.state.focus_composer(),
            _ => {}
        }
    }

    fn handle_composer_key(&mut self, key: Key) {
        let now = Instant::now();
        match key {
            Key::Char(ch) => {
                if let Some(signal) = self.state.composer.insert_char(ch, now) {
                    self.emit_typing(signal);
                }
            }
            Key::Backspace => {
                if let Some(signal) = self.state.composer.delete_char_before(now) {
                    self.emit_typing(signal);
                }
            }
            Key::Delete => self.state.composer.delete_char_at(),
            Key::Left => self.state.composer.move_cursor_left(),
            Key::Right => self.state.composer.move_cursor_right(),
            Key::Home => self.state.composer.move_cursor_home(),
            Key::End => self.state.composer.move_cursor_end(),
            Key::Enter => self.submit_composer(),
            Key::Esc => {
                self.state.notices.dismiss_latest();
                if let Some(signal) = self.state.composer.cancel_mode() {
                    self.emit_typing(signal);
                }
            }
            _ => {}
        }
    }

    fn submit_composer(&mut self) {
        if let Some(command) = self.state.composer.attachment_command() {
            self.dispatch_attachment(command);
            return;
        }

        let (text, mode, signal) = self.state.composer.take_submission();
        if let Some(signal) = signal {
            self.emit_typing(signal);
        }
        if text.trim().is_empty() {
            return;
        }

        match mode {
            ComposerMode::Compose => self.send_composed(&text, None),
            ComposerMode::Reply { message_id } => self.send_composed(&text, Some(message_id)),
            ComposerMode::Edit { message_id } => {
                if let Err(error) =
                    edit_message(self.services.channel.as_ref(), message_id, &text)
                {
                    self.notice(NoticeLevel::Error, format!("Edit failed: {error:?}"));
                }
            }
        }
    }

    fn send_composed(&mut self, text: &str, reply_to: Option<i64>) {
        let sender = self.state.user().clone();
        let active = self.state.active_conversation();
        let result = send_text(
            &mut self.state.chat,
            self.services.channel.as_ref(),
            &sender,
            active,
            text,
            reply_to,
            Utc::now(),
        );

        match result {
            Ok(_) | Err(SendMessageError::EmptyMessage) => {}
            Err(SendMessageError::Disconnected) => {
                self.notice(NoticeLevel::Error, "Not connected; message not sent.");
            }
            Err(SendMessageError::ChannelClosed) => {
                self.notice(NoticeLevel::Error, "Connection lost; message not sent.");
            }
        }
    }

    fn dispatch_attachment(&mut self, command: AttachmentCommand) {
        let (kind, path) = match command {
            AttachmentCommand::File(path) => (MessageKind::File, path),
            AttachmentCommand::Voice(path) => (MessageKind::Voice, path),
        };

        match request_upload(&self.state, self.services.uploads.as_ref(), kind, &path) {
            Ok(()) => {
                let (_, _, signal) = self.state.composer.take_submission();
                if let Some(signal) = signal {
                    self.emit_typing(signal);
                }
            }
            Err(UploadRequestError::MissingFile) => {
                self.notice(
                    NoticeLevel::Error,
                    format!("No such file: {}", path.display()),
                );
            }
        }
    }

    fn begin_edit_selected(&mut self) {
        let user_id = self.state.user().id;
        let Some(message) = self.state.chat.selected_message() else {
            return;
        };
        let Some(message_id) = message.id.server() else {
            return;
        };
        if !message.is_own(user_id) || message.kind != MessageKind::Text {
            return;
        }

        let body = message.body.clone();
        self.state.composer.begin_edit(message_id, &body);
        self.state.focus_composer();
    }

    fn begin_reply_selected(&mut self) {
        let Some(message_id) = self.state.chat.selected_message().and_then(|m| m.id.server())
        else {
            return;
        };
        self.state.composer.begin_reply(message_id);
        self.state.focus_composer();
    }

    fn delete_selected(&mut self) {
        let user_id = self.state.user().id;
        let Some(message) = self.state.chat.selected_message() else {
            return;
        };
        if !message.is_own(user_id) {
            return;
        }
        let Some(message_id) = message.id.server() else {
            return;
        };

        if let Err(error) = delete_message(self.services.channel.as_ref(), message_id) {
            self.notice(NoticeLevel::Error, format!("Delete failed: {error:?}"));
        }
    }

    fn react_to_selected(&mut self, digit: char) {
        let index = (digit as usize) - ('1' as usize);
        let emoji = REACTION_PALETTE[index];
        let user_id = self.state.user().id;
        let Some(message_id) = self.state.chat.selected_message().and_then(|m| m.id.server())
        else {
            return;
        };

        if let Err(error) = toggle_reaction(
            &mut self.state.chat,
            self.services.channel.as_ref(),
            message_id,
            user_id,
            emoji,
        ) {
            self.notice(NoticeLevel::Error, format!("Reaction failed: {error:?}"));
        }
    }

    fn request_selected_media(&mut self, intent: MediaIntent) {
        let Some(message) = self.state.chat.selected_message() else {
            return;
        };
        let Some(message_id) = message.id.server() else {
            return;
        };
        if intent == MediaIntent::Play && message.kind != MessageKind::Voice {
            return;
        }
        let Some(media_url) = message.media_url.as_deref() else {
            return;
        };

        self.services.media.request(message_id, media_url, intent);
    }

    fn handle_connection(&mut self, status: ConnectionStatus) {
        let previous = self.state.connection();
        self.state.set_connection(status);

        match status {
            ConnectionStatus::Disconnected | ConnectionStatus::Error => {
                self.saw_disconnect = true;
                if previous == ConnectionStatus::Connected {
                    self.notice(NoticeLevel::Warn, "Connection lost. Reconnecting...");
                }
            }
            ConnectionStatus::Connected if self.saw_disconnect => {
                // Catch up on anything missed while offline.
                self.saw_disconnect = false;
                self.services.contacts.request();
                self.state.chat.set_loading();
                self.services.history.request(self.state.active_conversation());
                self.notice(NoticeLevel::Info, "Reconnected.");
            }
            _ => {}
        }
    }

    fn handle_server_event(&mut self, event: ServerEvent) {
        let user_id = self.state.user().id;
        match event {
            ServerEvent::NewMessage(message) => {
                let conversation = Conversation::of_message(&message, user_id);
                if self.state.active_conversation().accepts(&message, user_id) {
                    self.state.chat.apply_inbound(message);
                } else if message.sender_id != user_id {
                    self.state.unread.record(conversation);
                }
            }
            ServerEvent::Delivered { echo_id, message_id } => {
                self.state.chat.confirm_delivery(echo_id, message_id);
            }
            ServerEvent::Deleted { message_id } => self.state.chat.apply_delete(message_id),
            ServerEvent::Edited {
                message_id,
                body,
                edited_at,
            } => self.state.chat.apply_edit(message_id, body, edited_at),
            ServerEvent::ReactionSnapshot {
                message_id,
                reactions,
            } => self.state.chat.apply_reaction_snapshot(message_id, reactions),
            ServerEvent::Typing {
                user_id: typist,
                username,
                typing,
            } => self.handle_typing(typist, &username, typing),
            ServerEvent::StatusChange { user_id, online } => {
                self.state.presence.apply_status(user_id, online);
            }
            ServerEvent::ActionRejected { error, echo_id } => {
                if let Some(echo_id) = echo_id {
                    self.state.chat.rollback_local(echo_id);
                }
                self.notice(NoticeLevel::Error, error);
            }
        }
    }

    /// Typing indicators are scoped to the active conversation: broadcast
    /// shows every peer, a direct chat only its counterpart, and the user's
    /// own echo is never shown.
    fn handle_typing(&mut self, typist: i64, username: &str, typing: bool) {
        if typist == self.state.user().id {
            return;
        }
        let relevant = match self.state.active_conversation() {
            Conversation::Broadcast => true,
            Conversation::Direct(peer) => typist == peer,
        };
        if !relevant {
            return;
        }

        if typing {
            self.state.typing.start(username, Instant::now());
        } else {
            self.state.typing.stop(username);
        }
    }

    fn handle_media_ready(
        &mut self,
        intent: MediaIntent,
        result: Result<std::path::PathBuf, FetchError>,
    ) {
        let path = match result {
            Ok(path) => path,
            Err(error) => {
                self.notice(NoticeLevel::Error, fetch_error_text(&error));
                return;
            }
        };

        let outcome = match intent {
            MediaIntent::Open => self.services.opener.open(&path),
            MediaIntent::Play => self
                .voice
                .play(&path)
                .map_err(|error| anyhow::anyhow!("{error:?}")),
        };
        if let Err(error) = outcome {
            self.notice(NoticeLevel::Error, format!("Could not open media: {error}"));
        }
    }

    fn toggle_theme(&mut self) {
        let theme = self.state.toggle_theme();
        let session = Session {
            user: self.state.user().clone(),
            token: self.token.clone(),
            theme,
        };
        if let Err(error) = self.services.sessions.save(&session) {
            tracing::warn!(%error, "could not persist theme preference");
        }
    }

    fn quit(&mut self) {
        // Best effort; the peer will expire the indicator anyway.
        if let Some(signal) = self.state.composer.cancel_mode() {
            self.emit_typing(signal);
        }
        self.voice.stop();
        self.state.stop();
    }

    fn emit_typing(&mut self, signal: TypingSignal) {
        let recipient_id = self.state.active_conversation().peer();
        let action = match signal {
            TypingSignal::Start => ClientAction::TypingStart { recipient_id },
            TypingSignal::Stop => ClientAction::TypingStop { recipient_id },
        };
        if let Err(error) = self.services.channel.emit(action) {
            tracing::debug!(?error, "typing signal dropped");
        }
    }

    fn notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.state.notices.post(level, text, Instant::now());
    }
}

impl<B: AudioBackend> ShellOrchestrator for DefaultShellOrchestrator<B> {
    fn state(&self) -> &ShellState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Tick => self.handle_tick(),
            AppEvent::QuitRequested => self.quit(),
            AppEvent::Input(input) => self.handle_input(input),
            AppEvent::Connection(status) => self.handle_connection(status),
            AppEvent::Server(event) => self.handle_server_event(event),
            AppEvent::HistoryLoaded {
                conversation,
                result,
            } => {
                let failed = result.is_err();
                apply_history(&mut self.state, conversation, result);
                if failed && self.state.chat.load_state() == ChatLoadState::Error {
                    self.notice(NoticeLevel::Error, "Could not load messages.");
                }
            }
            AppEvent::ContactsLoaded { result } => match result {
                Ok(contacts) => self.state.sidebar.set_ready(contacts),
                Err(error) => {
                    self.state.sidebar.set_error();
                    self.notice(NoticeLevel::Error, fetch_error_text(&error));
                }
            },
            AppEvent::UploadFinished {
                conversation,
                result,
            } => {
                if let Err(error) = apply_upload_result(&mut self.state, conversation, result) {
                    self.notice(NoticeLevel::Error, fetch_error_text(&error));
                }
            }
            AppEvent::MediaReady { intent, result, .. } => self.handle_media_ready(intent, result),
        }
        Ok(())
    }
}

fn fetch_error_text(error: &FetchError) -> &'static str {
    match error {
        FetchError::Unauthorized => "Session expired. Please sign in again.",
        FetchError::Unavailable => "The server is unavailable right now.",
        FetchError::InvalidData => "The server sent an unexpected response.",
    }
}
