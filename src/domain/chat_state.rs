//! Reconciliation state for the visible message list.
//!
//! Three independent writers feed this state: optimistic local sends,
//! inbound realtime pushes, and bulk history loads on conversation switch.
//! All mutation happens on the UI thread, one event at a time; the rules
//! below keep the list consistent across their races.

use chrono::{DateTime, Utc};

use super::message::{DeliveryStatus, LocalEchoId, LocalEchoIds, Message, MessageId, Reaction};

/// Scroll margin - number of items to keep visible above/below cursor before scrolling.
const SCROLL_MARGIN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatLoadState {
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatState {
    messages: Vec<Message>,
    load_state: ChatLoadState,
    local_ids: LocalEchoIds,
    selected_index: Option<usize>,
    /// True while the view sticks to the newest message. Local sends and
    /// bulk loads force it; inbound pushes and edits never do.
    follow_latest: bool,
    scroll_offset: usize,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            load_state: ChatLoadState::Loading,
            local_ids: LocalEchoIds::default(),
            selected_index: None,
            follow_latest: true,
            scroll_offset: 0,
        }
    }
}

impl ChatState {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn load_state(&self) -> ChatLoadState {
        self.load_state.clone()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected_message(&self) -> Option<&Message> {
        self.selected_index.and_then(|index| self.messages.get(index))
    }

    pub fn follow_latest(&self) -> bool {
        self.follow_latest
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Marks the list as loading and clears it. Called before a history
    /// fetch on conversation switch; stale contents must not linger.
    pub fn set_loading(&mut self) {
        self.messages.clear();
        self.load_state = ChatLoadState::Loading;
        self.selected_index = None;
        self.follow_latest = true;
        self.scroll_offset = 0;
    }

    pub fn set_error(&mut self) {
        self.load_state = ChatLoadState::Error;
    }

    /// Replaces the entire list with fetched history, preserving the
    /// server's order, and snaps the view to the latest message.
    pub fn replace_all(&mut self, records: Vec<Message>) {
        self.selected_index = last_index(&records);
        self.messages = records;
        self.load_state = ChatLoadState::Ready;
        self.follow_latest = true;
    }

    /// Appends an optimistic record for a local send and returns its
    /// allocated local id. The record is shown immediately with status
    /// `Sending`; the send itself happens after this call.
    pub fn append_optimistic(&mut self, mut message: Message) -> LocalEchoId {
        let echo_id = self.local_ids.allocate();
        message.id = MessageId::Local(echo_id);
        message.status = DeliveryStatus::Sending;
        self.messages.push(message);
        self.selected_index = last_index(&self.messages);
        self.follow_latest = true;
        echo_id
    }

    /// Rewrites the optimistic record's identifier and status in place once
    /// the server acknowledges delivery. No duplicate entry is created; a
    /// missing record (e.g. removed by a racing delete) is a logged no-op.
    /// When the created record was already pushed to us before the ack, the
    /// pushed copy wins and the local echo is dropped so the server id stays
    /// unique in the list.
    pub fn confirm_delivery(&mut self, echo_id: LocalEchoId, server_id: i64) {
        if self.contains_server_id(server_id) {
            tracing::debug!(
                echo_id = echo_id.value(),
                server_id,
                "delivery ack arrived after the push, dropping local echo"
            );
            self.messages
                .retain(|message| message.id != MessageId::Local(echo_id));
            self.clamp_selection();
            return;
        }

        match self.find_local_mut(echo_id) {
            Some(message) => {
                message.id = MessageId::Server(server_id);
                message.status = DeliveryStatus::Delivered;
            }
            None => {
                tracing::debug!(
                    echo_id = echo_id.value(),
                    server_id,
                    "delivery confirmation for unknown local record ignored"
                );
            }
        }
    }

    /// Removes an optimistic record after a failed or rejected send.
    /// Idempotent.
    pub fn rollback_local(&mut self, echo_id: LocalEchoId) {
        let before = self.messages.len();
        self.messages
            .retain(|message| message.id != MessageId::Local(echo_id));
        if self.messages.len() == before {
            tracing::debug!(echo_id = echo_id.value(), "rollback of unknown local record ignored");
        }
        self.clamp_selection();
    }

    /// Applies an inbound push. Idempotent on server id; the record is
    /// appended only when it already carries a server id. Does not force the
    /// view to the latest message - only local sends do that.
    ///
    /// Returns true when the record was appended.
    pub fn apply_inbound(&mut self, message: Message) -> bool {
        let Some(server_id) = message.id.server() else {
            tracing::debug!("inbound message without server id dropped");
            return false;
        };

        if self.contains_server_id(server_id) {
            tracing::debug!(server_id, "duplicate inbound message ignored");
            return false;
        }

        self.messages.push(message);
        if self.follow_latest {
            self.selected_index = last_index(&self.messages);
        }
        true
    }

    /// Mutates the matching record's body and edit timestamp. A missing
    /// record (deleted by a race) is a logged no-op.
    pub fn apply_edit(&mut self, server_id: i64, body: String, edited_at: DateTime<Utc>) {
        match self.find_server_mut(server_id) {
            Some(message) => {
                message.body = body;
                message.edited_at = Some(edited_at);
            }
            None => {
                tracing::debug!(server_id, "edit for unknown message ignored");
            }
        }
    }

    /// Removes the matching record. Idempotent.
    pub fn apply_delete(&mut self, server_id: i64) {
        let before = self.messages.len();
        self.messages
            .retain(|message| message.id != MessageId::Server(server_id));
        if self.messages.len() == before {
            tracing::debug!(server_id, "delete for unknown message ignored");
        }
        self.clamp_selection();
    }

    /// Replaces the reaction set with the server's authoritative snapshot,
    /// overriding any optimistic toggle. The toggle is a latency-hiding
    /// guess; the snapshot is ground truth and always wins.
    pub fn apply_reaction_snapshot(&mut self, server_id: i64, reactions: Vec<Reaction>) {
        match self.find_server_mut(server_id) {
            Some(message) => message.reactions = reactions,
            None => {
                tracing::debug!(server_id, "reaction snapshot for unknown message ignored");
            }
        }
    }

    /// Optimistic (user, emoji) toggle, superseded by the next snapshot.
    pub fn toggle_reaction(&mut self, server_id: i64, user_id: i64, emoji: &str) {
        let Some(message) = self.find_server_mut(server_id) else {
            tracing::debug!(server_id, "reaction toggle for unknown message ignored");
            return;
        };

        let existing = message
            .reactions
            .iter()
            .position(|reaction| reaction.user_id == user_id && reaction.emoji == emoji);

        match existing {
            Some(index) => {
                message.reactions.remove(index);
            }
            None => message.reactions.push(Reaction {
                user_id,
                emoji: emoji.to_owned(),
            }),
        }
    }

    /// Selects the next message (moves down). Reaching the end re-enables
    /// follow-latest.
    pub fn select_next(&mut self) {
        if self.messages.is_empty() {
            return;
        }

        let last = self.messages.len() - 1;
        self.selected_index = match self.selected_index {
            None => Some(0),
            Some(index) => Some(index.saturating_add(1).min(last)),
        };
        if self.selected_index == Some(last) {
            self.follow_latest = true;
        }
    }

    /// Selects the previous message (moves up) and stops following the
    /// latest message.
    pub fn select_previous(&mut self) {
        if self.messages.is_empty() {
            return;
        }

        self.selected_index = match self.selected_index {
            None => Some(self.messages.len() - 1),
            Some(index) => Some(index.saturating_sub(1)),
        };
        self.follow_latest = false;
    }

    /// Updates the scroll offset so the cursor stays visible with
    /// SCROLL_MARGIN rows of context. `element_index` is the visual row
    /// (date separators included), `viewport_height` the visible row count.
    pub fn update_scroll_offset(&mut self, element_index: usize, viewport_height: usize) {
        if viewport_height == 0 {
            return;
        }

        let margin = SCROLL_MARGIN.min(viewport_height / 2);

        if element_index < self.scroll_offset + margin {
            self.scroll_offset = element_index.saturating_sub(margin);
        }

        let visible_bottom = self.scroll_offset + viewport_height;
        if element_index + margin >= visible_bottom {
            self.scroll_offset = (element_index + margin + 1).saturating_sub(viewport_height);
        }
    }

    fn contains_server_id(&self, server_id: i64) -> bool {
        self.messages
            .iter()
            .any(|message| message.id == MessageId::Server(server_id))
    }

    fn find_server_mut(&mut self, server_id: i64) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|message| message.id == MessageId::Server(server_id))
    }

    fn find_local_mut(&mut self, echo_id: LocalEchoId) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|message| message.id == MessageId::Local(echo_id))
    }

    fn clamp_selection(&mut self) {
        self.selected_index = match last_index(&self.messages) {
            None => None,
            Some(last) => self.selected_index.map(|index| index.min(last)),
        };
    }
}

fn last_index(messages: &[Message]) -> Option<usize> {
    if messages.is_empty() {
        None
    } else {
        Some(messages.len() - 1)
    }
}
