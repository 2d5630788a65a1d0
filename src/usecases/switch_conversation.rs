//! Conversation switching and history application.
//!
//! Switching must, in order: clear the typing set (it belongs to the
//! previous conversation), mark the list loading and request the history
//! fetch, and zero the unread counter. History results are tagged with the
//! conversation they were fetched for; a result arriving after another
//! switch is stale and must be dropped.

use crate::domain::{
    conversation::Conversation,
    events::FetchError,
    message::Message,
    shell_state::ShellState,
};

use super::contracts::HistoryFetcher;

pub fn switch(state: &mut ShellState, fetcher: &dyn HistoryFetcher, target: Conversation) {
    if target == state.active_conversation() {
        return;
    }

    state.typing.clear();
    state.set_active_conversation(target);
    state.chat.set_loading();
    fetcher.request(target);
    state.unread.clear(target);

    tracing::debug!(conversation = ?target, "conversation switched, history requested");
}

/// Applies a history result, discarding it when the user has switched away
/// since the request was issued.
///
/// Returns true when the result was applied.
pub fn apply_history(
    state: &mut ShellState,
    conversation: Conversation,
    result: Result<Vec<Message>, FetchError>,
) -> bool {
    if conversation != state.active_conversation() {
        tracing::debug!(
            requested = ?conversation,
            active = ?state.active_conversation(),
            "stale history response discarded"
        );
        return false;
    }

    match result {
        Ok(messages) => {
            state.chat.replace_all(messages);
            true
        }
        Err(error) => {
            tracing::warn!(conversation = ?conversation, error = ?error, "history fetch failed");
            state.chat.set_error();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, time::Duration};

    use chrono::DateTime;

    use super::*;
    use crate::domain::{
        chat_state::ChatLoadState,
        message::{DeliveryStatus, MessageId, MessageKind},
        session::{Theme, User},
    };

    #[derive(Default)]
    struct StubFetcher {
        requests: RefCell<Vec<Conversation>>,
    }

    impl HistoryFetcher for StubFetcher {
        fn request(&self, conversation: Conversation) {
            self.requests.borrow_mut().push(conversation);
        }
    }

    fn state() -> ShellState {
        ShellState::new(
            User {
                id: 1,
                username: "me".to_owned(),
                email: "me@example.com".to_owned(),
            },
            Theme::Dark,
            Duration::from_secs(4),
            Duration::from_secs(2),
        )
    }

    fn broadcast_message(id: i64) -> Message {
        Message {
            id: MessageId::Server(id),
            sender_id: 7,
            sender_name: "ana".to_owned(),
            recipient_id: None,
            body: "hi".to_owned(),
            kind: MessageKind::Text,
            media_url: None,
            voice_duration_secs: None,
            sent_at: DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
            edited_at: None,
            reply_to: None,
            status: DeliveryStatus::Sent,
            reactions: Vec::new(),
        }
    }

    #[test]
    fn switch_clears_typing_and_unread_and_requests_history() {
        let mut state = state();
        let fetcher = StubFetcher::default();
        state.typing.start("Alice", std::time::Instant::now());
        state.unread.record(Conversation::Direct(7));

        switch(&mut state, &fetcher, Conversation::Direct(7));

        assert!(state.typing.is_empty());
        assert_eq!(state.unread.count(Conversation::Direct(7)), 0);
        assert_eq!(state.active_conversation(), Conversation::Direct(7));
        assert_eq!(state.chat.load_state(), ChatLoadState::Loading);
        assert_eq!(*fetcher.requests.borrow(), vec![Conversation::Direct(7)]);
    }

    #[test]
    fn switching_to_the_active_conversation_is_a_no_op() {
        let mut state = state();
        let fetcher = StubFetcher::default();
        state.chat.replace_all(vec![broadcast_message(1)]);

        switch(&mut state, &fetcher, Conversation::Broadcast);

        assert!(fetcher.requests.borrow().is_empty());
        assert_eq!(state.chat.messages().len(), 1);
    }

    #[test]
    fn stale_history_for_previous_conversation_is_dropped() {
        let mut state = state();
        let fetcher = StubFetcher::default();

        // Broadcast fetch still pending; user switches to the chat with 7.
        switch(&mut state, &fetcher, Conversation::Direct(7));

        let applied = apply_history(
            &mut state,
            Conversation::Broadcast,
            Ok(vec![broadcast_message(1), broadcast_message(2)]),
        );

        assert!(!applied);
        assert!(state.chat.messages().is_empty());
        assert_eq!(state.chat.load_state(), ChatLoadState::Loading);
    }

    #[test]
    fn matching_history_is_applied() {
        let mut state = state();

        let applied = apply_history(
            &mut state,
            Conversation::Broadcast,
            Ok(vec![broadcast_message(1)]),
        );

        assert!(applied);
        assert_eq!(state.chat.load_state(), ChatLoadState::Ready);
        assert_eq!(state.chat.messages().len(), 1);
    }

    #[test]
    fn failed_history_marks_the_list_errored() {
        let mut state = state();

        let applied = apply_history(
            &mut state,
            Conversation::Broadcast,
            Err(FetchError::Unavailable),
        );

        assert!(!applied);
        assert_eq!(state.chat.load_state(), ChatLoadState::Error);
    }
}
