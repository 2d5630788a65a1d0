//! File and voice attachment uploads.
//!
//! Uploads run on a background worker and resolve as
//! `AppEvent::UploadFinished`. The server also pushes the created record as
//! a `new-message` event; applying the upload result through the idempotent
//! inbound path keeps the two from duplicating.

use std::path::Path;

use crate::domain::{
    conversation::Conversation,
    events::FetchError,
    message::{Message, MessageKind},
    shell_state::ShellState,
};

use super::contracts::UploadDispatcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRequestError {
    MissingFile,
}

/// Validates and dispatches an attachment upload for the active
/// conversation.
pub fn request_upload(
    state: &ShellState,
    dispatcher: &dyn UploadDispatcher,
    kind: MessageKind,
    path: &Path,
) -> Result<(), UploadRequestError> {
    if !path.is_file() {
        return Err(UploadRequestError::MissingFile);
    }

    let conversation = state.active_conversation();
    dispatcher.dispatch(conversation, conversation.peer(), kind, path.to_path_buf());
    tracing::debug!(?conversation, ?kind, path = %path.display(), "upload dispatched");
    Ok(())
}

/// Applies an upload result. Successful records go through the inbound
/// reconciliation path (membership-gated, idempotent against the follow-up
/// push event); the active conversation may have changed since dispatch.
///
/// Returns the error to surface, if any.
pub fn apply_upload_result(
    state: &mut ShellState,
    conversation: Conversation,
    result: Result<Message, FetchError>,
) -> Result<(), FetchError> {
    let message = result?;

    if conversation != state.active_conversation() {
        // The record will appear via history fetch when the user returns.
        tracing::debug!(?conversation, "upload finished for an inactive conversation");
        state.unread.record(conversation);
        return Ok(());
    }

    state.chat.apply_inbound(message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, path::PathBuf, time::Duration};

    use chrono::DateTime;

    use super::*;
    use crate::domain::{
        message::{DeliveryStatus, MessageId},
        session::{Theme, User},
    };

    #[derive(Default)]
    struct StubDispatcher {
        dispatched: RefCell<Vec<(Conversation, Option<i64>, MessageKind, PathBuf)>>,
    }

    impl UploadDispatcher for StubDispatcher {
        fn dispatch(
            &self,
            conversation: Conversation,
            recipient_id: Option<i64>,
            kind: MessageKind,
            path: PathBuf,
        ) {
            self.dispatched
                .borrow_mut()
                .push((conversation, recipient_id, kind, path));
        }
    }

    fn state() -> ShellState {
        let mut state = ShellState::new(
            User {
                id: 1,
                username: "me".to_owned(),
                email: "me@example.com".to_owned(),
            },
            Theme::Dark,
            Duration::from_secs(4),
            Duration::from_secs(2),
        );
        state.chat.replace_all(vec![]);
        state
    }

    fn uploaded_message(id: i64) -> Message {
        Message {
            id: MessageId::Server(id),
            sender_id: 1,
            sender_name: "me".to_owned(),
            recipient_id: None,
            body: "report.pdf".to_owned(),
            kind: MessageKind::File,
            media_url: Some("/uploads/report.pdf".to_owned()),
            voice_duration_secs: None,
            sent_at: DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
            edited_at: None,
            reply_to: None,
            status: DeliveryStatus::Sent,
            reactions: Vec::new(),
        }
    }

    #[test]
    fn rejects_a_missing_file() {
        let state = state();
        let dispatcher = StubDispatcher::default();

        let result = request_upload(
            &state,
            &dispatcher,
            MessageKind::File,
            Path::new("/definitely/not/here.bin"),
        );

        assert_eq!(result, Err(UploadRequestError::MissingFile));
        assert!(dispatcher.dispatched.borrow().is_empty());
    }

    #[test]
    fn dispatches_with_the_active_conversation_recipient() {
        let mut state = state();
        state.set_active_conversation(Conversation::Direct(7));
        let dispatcher = StubDispatcher::default();
        let file = tempfile::NamedTempFile::new().expect("temp file");

        request_upload(&state, &dispatcher, MessageKind::Voice, file.path())
            .expect("upload should dispatch");

        let dispatched = dispatcher.dispatched.borrow();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].0, Conversation::Direct(7));
        assert_eq!(dispatched[0].1, Some(7));
        assert_eq!(dispatched[0].2, MessageKind::Voice);
    }

    #[test]
    fn applies_result_to_the_active_conversation_once() {
        let mut state = state();

        apply_upload_result(&mut state, Conversation::Broadcast, Ok(uploaded_message(42)))
            .expect("apply should succeed");
        // The follow-up push event carries the same server id.
        state.chat.apply_inbound(uploaded_message(42));

        assert_eq!(state.chat.messages().len(), 1);
    }

    #[test]
    fn result_for_an_inactive_conversation_counts_as_unread() {
        let mut state = state();
        state.set_active_conversation(Conversation::Direct(9));

        apply_upload_result(&mut state, Conversation::Broadcast, Ok(uploaded_message(42)))
            .expect("apply should succeed");

        assert!(state.chat.messages().is_empty());
        assert_eq!(state.unread.count(Conversation::Broadcast), 1);
    }

    #[test]
    fn propagates_upload_failure() {
        let mut state = state();

        let result =
            apply_upload_result(&mut state, Conversation::Broadcast, Err(FetchError::Unavailable));

        assert_eq!(result, Err(FetchError::Unavailable));
        assert!(state.chat.messages().is_empty());
    }
}
