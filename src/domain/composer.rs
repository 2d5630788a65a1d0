//! State for the message composer: cursor-aware text input, edit/reply
//! modes, and typing-burst detection for the typing-start/stop signals.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

/// Maximum allowed input length in characters.
const MAX_INPUT_LENGTH: usize = 2000;

/// What the composed text will become on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposerMode {
    #[default]
    Compose,
    /// Editing an own, server-confirmed message.
    Edit {
        message_id: i64,
    },
    /// Replying to a server-confirmed message.
    Reply {
        message_id: i64,
    },
}

/// Signal the composer asks the caller to emit on the realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    Start,
    Stop,
}

/// Attachment command parsed from the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentCommand {
    File(PathBuf),
    Voice(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ComposerState {
    text: String,
    cursor_position: usize,
    mode: ComposerMode,
    last_keystroke: Option<Instant>,
    burst_active: bool,
    idle: Duration,
}

impl ComposerState {
    pub fn new(idle: Duration) -> Self {
        Self {
            text: String::new(),
            cursor_position: 0,
            mode: ComposerMode::default(),
            last_keystroke: None,
            burst_active: false,
            idle,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn mode(&self) -> ComposerMode {
        self.mode
    }

    /// Inserts a character at the cursor and reports whether a typing-start
    /// should be emitted (first keystroke of a burst). Input beyond the
    /// length cap is dropped silently.
    pub fn insert_char(&mut self, ch: char, now: Instant) -> Option<TypingSignal> {
        if self.text.chars().count() >= MAX_INPUT_LENGTH {
            return None;
        }
        let byte_idx = self.char_to_byte_index(self.cursor_position);
        self.text.insert(byte_idx, ch);
        self.cursor_position += 1;
        self.note_keystroke(now)
    }

    /// Deletes the character before the cursor (backspace).
    pub fn delete_char_before(&mut self, now: Instant) -> Option<TypingSignal> {
        if self.cursor_position == 0 {
            return None;
        }
        self.cursor_position -= 1;
        let byte_idx = self.char_to_byte_index(self.cursor_position);
        let next_byte_idx = self.char_to_byte_index(self.cursor_position + 1);
        self.text.drain(byte_idx..next_byte_idx);
        self.note_keystroke(now)
    }

    /// Deletes the character at the cursor (delete key).
    pub fn delete_char_at(&mut self) {
        if self.cursor_position < self.text.chars().count() {
            let byte_idx = self.char_to_byte_index(self.cursor_position);
            let next_byte_idx = self.char_to_byte_index(self.cursor_position + 1);
            self.text.drain(byte_idx..next_byte_idx);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let count = self.text.chars().count();
        if self.cursor_position < count {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.text.chars().count();
    }

    /// Fires a typing-stop once the user has paused for the idle duration.
    /// Called from the shell tick.
    pub fn idle_tick(&mut self, now: Instant) -> Option<TypingSignal> {
        let last = self.last_keystroke?;
        if self.burst_active && now.duration_since(last) >= self.idle {
            self.burst_active = false;
            self.last_keystroke = None;
            return Some(TypingSignal::Stop);
        }
        None
    }

    /// Takes the composed text and resets the input. Ends the typing burst:
    /// the returned signal (if any) must be emitted by the caller.
    pub fn take_submission(&mut self) -> (String, ComposerMode, Option<TypingSignal>) {
        let text = std::mem::take(&mut self.text);
        let mode = self.mode;
        self.cursor_position = 0;
        self.mode = ComposerMode::Compose;
        let signal = self.end_burst();
        (text, mode, signal)
    }

    /// Enters edit mode prefilled with the message's current body.
    pub fn begin_edit(&mut self, message_id: i64, body: &str) {
        self.text = body.to_owned();
        self.cursor_position = self.text.chars().count();
        self.mode = ComposerMode::Edit { message_id };
    }

    /// Enters reply mode; the input keeps whatever was typed.
    pub fn begin_reply(&mut self, message_id: i64) {
        self.mode = ComposerMode::Reply { message_id };
    }

    /// Cancels edit/reply mode. Editing discards the prefilled text;
    /// replying keeps the draft. Returns the typing signal to emit.
    pub fn cancel_mode(&mut self) -> Option<TypingSignal> {
        if matches!(self.mode, ComposerMode::Edit { .. }) {
            self.text.clear();
            self.cursor_position = 0;
        }
        self.mode = ComposerMode::Compose;
        self.end_burst()
    }

    /// Parses `/file <path>` and `/voice <path>` attachment commands.
    pub fn attachment_command(&self) -> Option<AttachmentCommand> {
        let trimmed = self.text.trim();
        if let Some(path) = trimmed.strip_prefix("/file ") {
            let path = path.trim();
            if !path.is_empty() {
                return Some(AttachmentCommand::File(PathBuf::from(path)));
            }
        }
        if let Some(path) = trimmed.strip_prefix("/voice ") {
            let path = path.trim();
            if !path.is_empty() {
                return Some(AttachmentCommand::Voice(PathBuf::from(path)));
            }
        }
        None
    }

    fn note_keystroke(&mut self, now: Instant) -> Option<TypingSignal> {
        self.last_keystroke = Some(now);
        if self.burst_active {
            None
        } else {
            self.burst_active = true;
            Some(TypingSignal::Start)
        }
    }

    fn end_burst(&mut self) -> Option<TypingSignal> {
        self.last_keystroke = None;
        if self.burst_active {
            self.burst_active = false;
            Some(TypingSignal::Stop)
        } else {
            None
        }
    }

    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.text.len())
    }
}
