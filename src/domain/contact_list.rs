use super::{conversation::Conversation, session::User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactListUiState {
    Loading,
    Ready,
    Error,
}

/// One selectable sidebar row: the broadcast channel or a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub conversation: Conversation,
    pub label: String,
}

/// Sidebar state. The broadcast channel is always the first entry; contacts
/// follow in server order. Selection is preserved across refreshes by
/// conversation, not by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactListState {
    ui_state: ContactListUiState,
    entries: Vec<SidebarEntry>,
    selected_index: usize,
}

impl Default for ContactListState {
    fn default() -> Self {
        Self {
            ui_state: ContactListUiState::Loading,
            entries: vec![broadcast_entry()],
            selected_index: 0,
        }
    }
}

impl ContactListState {
    pub fn ui_state(&self) -> ContactListUiState {
        self.ui_state.clone()
    }

    pub fn entries(&self) -> &[SidebarEntry] {
        &self.entries
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected_entry(&self) -> &SidebarEntry {
        // Index 0 (broadcast) always exists.
        &self.entries[self.selected_index.min(self.entries.len() - 1)]
    }

    pub fn set_ready(&mut self, contacts: Vec<User>) {
        let previous = self.selected_entry().conversation;

        self.entries = std::iter::once(broadcast_entry())
            .chain(contacts.into_iter().map(|user| SidebarEntry {
                conversation: Conversation::Direct(user.id),
                label: user.username,
            }))
            .collect();
        self.ui_state = ContactListUiState::Ready;
        self.selected_index = self
            .entries
            .iter()
            .position(|entry| entry.conversation == previous)
            .unwrap_or(0);
    }

    pub fn set_error(&mut self) {
        self.ui_state = ContactListUiState::Error;
    }

    pub fn select_next(&mut self) {
        let last = self.entries.len() - 1;
        self.selected_index = (self.selected_index + 1).min(last);
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Label of a conversation's counterpart, for headers and typing lines.
    pub fn label_of(&self, conversation: Conversation) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.conversation == conversation)
            .map(|entry| entry.label.as_str())
    }
}

fn broadcast_entry() -> SidebarEntry {
    SidebarEntry {
        conversation: Conversation::Broadcast,
        label: "general".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.to_owned(),
            email: format!("{username}@example.com"),
        }
    }

    #[test]
    fn default_state_selects_broadcast() {
        let state = ContactListState::default();

        assert_eq!(state.ui_state(), ContactListUiState::Loading);
        assert_eq!(state.selected_entry().conversation, Conversation::Broadcast);
    }

    #[test]
    fn set_ready_keeps_broadcast_first() {
        let mut state = ContactListState::default();

        state.set_ready(vec![user(7, "ana"), user(9, "bo")]);

        assert_eq!(state.ui_state(), ContactListUiState::Ready);
        assert_eq!(state.entries().len(), 3);
        assert_eq!(state.entries()[0].conversation, Conversation::Broadcast);
        assert_eq!(state.entries()[1].conversation, Conversation::Direct(7));
    }

    #[test]
    fn selection_is_preserved_by_conversation_across_refresh() {
        let mut state = ContactListState::default();
        state.set_ready(vec![user(7, "ana"), user(9, "bo")]);
        state.select_next();
        state.select_next();
        assert_eq!(state.selected_entry().conversation, Conversation::Direct(9));

        // Contact order changes; selection follows the conversation.
        state.set_ready(vec![user(9, "bo"), user(7, "ana"), user(11, "cy")]);

        assert_eq!(state.selected_entry().conversation, Conversation::Direct(9));
        assert_eq!(state.selected_index(), 1);
    }

    #[test]
    fn selection_falls_back_to_broadcast_when_contact_disappears() {
        let mut state = ContactListState::default();
        state.set_ready(vec![user(7, "ana")]);
        state.select_next();

        state.set_ready(vec![user(9, "bo")]);

        assert_eq!(state.selected_entry().conversation, Conversation::Broadcast);
    }

    #[test]
    fn selection_moves_within_bounds() {
        let mut state = ContactListState::default();
        state.set_ready(vec![user(7, "ana")]);

        state.select_previous();
        assert_eq!(state.selected_index(), 0);

        state.select_next();
        state.select_next();
        assert_eq!(state.selected_index(), 1);
    }

    #[test]
    fn label_lookup_by_conversation() {
        let mut state = ContactListState::default();
        state.set_ready(vec![user(7, "ana")]);

        assert_eq!(state.label_of(Conversation::Direct(7)), Some("ana"));
        assert_eq!(state.label_of(Conversation::Broadcast), Some("general"));
        assert_eq!(state.label_of(Conversation::Direct(99)), None);
    }
}
