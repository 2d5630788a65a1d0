//! Guided CLI authentication: login and signup against the auth endpoints,
//! persisting the session on success.

use anyhow::Result;

use crate::domain::session::{Session, User};

use super::contracts::SessionStore;

/// Errors reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSourceError {
    /// Server-reported business error (wrong credentials, taken email...),
    /// carrying the server's message.
    Rejected(String),
    /// Endpoint unreachable or responded with garbage.
    Unavailable,
}

/// Domain-level authentication errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A required field is empty.
    MissingFields,
    /// Signup password and confirmation differ.
    PasswordMismatch,
    Rejected(String),
    TemporarilyUnavailable,
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            AuthError::MissingFields => "All fields are required.".to_owned(),
            AuthError::PasswordMismatch => "Passwords do not match. Please try again.".to_owned(),
            AuthError::Rejected(message) => message.clone(),
            AuthError::TemporarilyUnavailable => {
                "The server is unavailable right now. Please try again.".to_owned()
            }
        }
    }
}

pub trait Authenticator {
    fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthSourceError>;
    fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthSourceError>;
}

pub fn login(
    authenticator: &dyn Authenticator,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let (user, token) = authenticator
        .login(email, password)
        .map_err(map_source_error)?;
    Ok(Session::new(user, token))
}

pub fn signup(
    authenticator: &dyn Authenticator,
    username: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<Session, AuthError> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    if password != confirm_password {
        return Err(AuthError::PasswordMismatch);
    }

    let (user, token) = authenticator
        .signup(username, email, password)
        .map_err(map_source_error)?;
    Ok(Session::new(user, token))
}

fn map_source_error(error: AuthSourceError) -> AuthError {
    match error {
        AuthSourceError::Rejected(message) => AuthError::Rejected(message),
        AuthSourceError::Unavailable => AuthError::TemporarilyUnavailable,
    }
}

/// Terminal interaction seam for the guided flow.
pub trait AuthTerminal {
    fn show(&mut self, text: &str) -> Result<()>;
    fn prompt_line(&mut self, label: &str) -> Result<String>;
    fn prompt_secret(&mut self, label: &str) -> Result<String>;
}

/// Stdin/stdout terminal; passwords via rpassword, never echoed.
pub struct StdTerminal;

impl AuthTerminal for StdTerminal {
    fn show(&mut self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }

    fn prompt_line(&mut self, label: &str) -> Result<String> {
        use std::io::Write;

        print!("{label}: ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_owned())
    }

    fn prompt_secret(&mut self, label: &str) -> Result<String> {
        Ok(rpassword::prompt_password(format!("{label}: "))?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuidedAuthOutcome {
    Authenticated(Session),
    Aborted,
}

/// Runs the login/signup dialogue until success, abort, or the retry
/// budget is exhausted. A successful session is persisted before returning.
pub fn run_guided_auth(
    terminal: &mut dyn AuthTerminal,
    authenticator: &dyn Authenticator,
    store: &dyn SessionStore,
    policy: &RetryPolicy,
) -> Result<GuidedAuthOutcome> {
    for attempt in 1..=policy.max_attempts {
        let choice = terminal.prompt_line("Sign [i]n, sign [u]p, or [q]uit")?;
        let result = match choice.as_str() {
            "i" | "I" => {
                let email = terminal.prompt_line("Email")?;
                let password = terminal.prompt_secret("Password")?;
                login(authenticator, &email, &password)
            }
            "u" | "U" => {
                let username = terminal.prompt_line("Username")?;
                let email = terminal.prompt_line("Email")?;
                let password = terminal.prompt_secret("Password")?;
                let confirm = terminal.prompt_secret("Confirm password")?;
                signup(authenticator, &username, &email, &password, &confirm)
            }
            "q" | "Q" => return Ok(GuidedAuthOutcome::Aborted),
            _ => {
                terminal.show("Please answer i, u or q.")?;
                continue;
            }
        };

        match result {
            Ok(session) => {
                store.save(&session)?;
                terminal.show(&format!("Welcome, {}.", session.user.username))?;
                return Ok(GuidedAuthOutcome::Authenticated(session));
            }
            Err(error) => {
                tracing::warn!(attempt, error = ?error_kind(&error), "authentication attempt failed");
                terminal.show(&error.user_message())?;
            }
        }
    }

    terminal.show("Too many failed attempts.")?;
    Ok(GuidedAuthOutcome::Aborted)
}

// Log the error shape, never its contents (may echo user input).
fn error_kind(error: &AuthError) -> &'static str {
    match error {
        AuthError::MissingFields => "missing_fields",
        AuthError::PasswordMismatch => "password_mismatch",
        AuthError::Rejected(_) => "rejected",
        AuthError::TemporarilyUnavailable => "unavailable",
    }
}
