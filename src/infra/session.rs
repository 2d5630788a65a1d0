//! TOML-backed session persistence, guarded by an advisory file lock so
//! concurrent invocations (a running client plus `parley logout`) cannot
//! interleave reads and writes.

use std::{
    fs::{self, File, OpenOptions},
    path::PathBuf,
};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::{
    domain::session::{Session, Theme, User},
    infra::storage_layout::StorageLayout,
    usecases::contracts::{SessionStore, SessionStoreError},
};

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    user_id: i64,
    username: String,
    email: String,
    token: String,
    theme: String,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user.id,
            username: session.user.username.clone(),
            email: session.user.email.clone(),
            token: session.token.clone(),
            theme: session.theme.as_str().to_owned(),
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Session {
            user: User {
                id: stored.user_id,
                username: stored.username,
                email: stored.email,
            },
            token: stored.token,
            theme: Theme::from_str(&stored.theme),
        }
    }
}

pub struct FileSessionStore {
    session_file: PathBuf,
    lock_file: PathBuf,
}

impl FileSessionStore {
    pub fn new(layout: &StorageLayout) -> Self {
        Self {
            session_file: layout.session_file(),
            lock_file: layout.session_lock_file(),
        }
    }

    #[cfg(test)]
    fn at(session_file: PathBuf, lock_file: PathBuf) -> Self {
        Self {
            session_file,
            lock_file,
        }
    }

    /// The lock is released when the returned handle is dropped.
    fn acquire_lock(&self) -> Result<File, SessionStoreError> {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_file)
            .map_err(unavailable)?;
        lock.lock_exclusive().map_err(unavailable)?;
        Ok(lock)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        let _lock = self.acquire_lock()?;

        if !self.session_file.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.session_file).map_err(unavailable)?;
        let stored: StoredSession = toml::from_str(&raw).map_err(unavailable)?;
        Ok(Some(stored.into()))
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let _lock = self.acquire_lock()?;

        let raw = toml::to_string_pretty(&StoredSession::from(session)).map_err(unavailable)?;
        fs::write(&self.session_file, raw).map_err(unavailable)?;
        restrict_permissions(&self.session_file)?;
        Ok(())
    }

    fn clear(&self) -> Result<bool, SessionStoreError> {
        let _lock = self.acquire_lock()?;

        if !self.session_file.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.session_file).map_err(unavailable)?;
        Ok(true)
    }
}

// The session file holds a bearer token.
#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<(), SessionStoreError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(unavailable)
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<(), SessionStoreError> {
    Ok(())
}

fn unavailable(error: impl std::fmt::Display) -> SessionStoreError {
    SessionStoreError::Unavailable(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &std::path::Path) -> FileSessionStore {
        FileSessionStore::at(dir.join("session.toml"), dir.join("session.lock"))
    }

    fn session() -> Session {
        let mut session = Session::new(
            User {
                id: 3,
                username: "me".to_owned(),
                email: "me@example.com".to_owned(),
            },
            "tok".to_owned(),
        );
        session.theme = Theme::Light;
        session
    }

    #[test]
    fn round_trips_a_session_including_theme() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());

        store.save(&session()).expect("save");
        let loaded = store.load().expect("load");

        assert_eq!(loaded, Some(session()));
    }

    #[test]
    fn empty_store_loads_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());

        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn clear_reports_whether_a_session_existed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        store.save(&session()).expect("save");

        assert!(store.clear().expect("first clear"));
        assert!(!store.clear().expect("second clear"));
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn corrupt_session_file_surfaces_as_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        fs::write(dir.path().join("session.toml"), "not [valid toml").expect("seed");

        assert!(matches!(
            store.load(),
            Err(SessionStoreError::Unavailable(_))
        ));
    }
}
