//! Logout: drop the persisted session so the next start requires auth.

use super::contracts::{SessionStore, SessionStoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub session_removed: bool,
}

pub fn logout(store: &dyn SessionStore) -> Result<LogoutOutcome, SessionStoreError> {
    let session_removed = store.clear()?;
    if session_removed {
        tracing::info!("persisted session removed");
    }
    Ok(LogoutOutcome { session_removed })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::domain::session::Session;

    struct CountingStore {
        present: RefCell<bool>,
    }

    impl SessionStore for CountingStore {
        fn load(&self) -> Result<Option<Session>, SessionStoreError> {
            Ok(None)
        }

        fn save(&self, _session: &Session) -> Result<(), SessionStoreError> {
            Ok(())
        }

        fn clear(&self) -> Result<bool, SessionStoreError> {
            Ok(self.present.replace(false))
        }
    }

    #[test]
    fn reports_whether_a_session_was_removed() {
        let store = CountingStore {
            present: RefCell::new(true),
        };

        assert_eq!(
            logout(&store),
            Ok(LogoutOutcome {
                session_removed: true
            })
        );
        assert_eq!(
            logout(&store),
            Ok(LogoutOutcome {
                session_removed: false
            })
        );
    }
}
