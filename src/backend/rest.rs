//! Blocking HTTP client for the server's REST surface: auth, contacts,
//! history, uploads and media downloads. Runs only on background worker
//! threads, never on the UI thread.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{
    domain::{
        events::FetchError,
        message::{Message, MessageKind},
        session::User,
    },
    usecases::auth::{AuthSourceError, Authenticator},
};

use super::protocol::{kind_to_wire, WireMessage};

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct WireUser {
    id: i64,
    username: String,
    email: String,
}

impl From<WireUser> for User {
    fn from(wire: WireUser) -> Self {
        User {
            id: wire.id,
            username: wire.username,
            email: wire.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: WireUser,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct RestClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
    media_dir: PathBuf,
}

impl RestClient {
    pub fn new(base_url: &str, media_dir: PathBuf) -> Self {
        Self {
            http: reqwest::blocking::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: None,
            media_dir,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_owned());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub fn contacts(&self) -> Result<Vec<User>, FetchError> {
        let response = self
            .authed(self.http.get(self.url("/users")))
            .send()
            .map_err(|_| FetchError::Unavailable)?;
        let users: Vec<WireUser> = decode(response)?;
        Ok(users.into_iter().map(User::from).collect())
    }

    pub fn broadcast_history(&self) -> Result<Vec<Message>, FetchError> {
        self.history(self.url("/messages"))
    }

    pub fn direct_history(&self, peer_id: i64) -> Result<Vec<Message>, FetchError> {
        self.history(self.url(&format!("/messages/{peer_id}")))
    }

    fn history(&self, url: String) -> Result<Vec<Message>, FetchError> {
        let response = self
            .authed(self.http.get(url))
            .send()
            .map_err(|_| FetchError::Unavailable)?;
        let records: Vec<WireMessage> = decode(response)?;
        Ok(records
            .into_iter()
            .map(WireMessage::into_domain)
            .collect())
    }

    /// Uploads an attachment; the server stores it and returns the created
    /// message record. The matching push event is deduplicated client-side.
    pub fn upload(
        &self,
        recipient_id: Option<i64>,
        kind: MessageKind,
        path: &Path,
    ) -> Result<Message, FetchError> {
        let mut form = reqwest::blocking::multipart::Form::new()
            .text("messageType", kind_to_wire(kind))
            .file("file", path)
            .map_err(|_| FetchError::Unavailable)?;
        if let Some(recipient_id) = recipient_id {
            form = form.text("recipientId", recipient_id.to_string());
        }

        let response = self
            .authed(self.http.post(self.url("/upload")))
            .multipart(form)
            .send()
            .map_err(|_| FetchError::Unavailable)?;
        let record: WireMessage = decode(response)?;
        Ok(record.into_domain())
    }

    /// Downloads a media resource into the local cache, keyed by its server
    /// path, and returns the cached file. An existing cache entry is reused.
    pub fn download_media(&self, media_url: &str) -> Result<PathBuf, FetchError> {
        let file_name = media_url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or(FetchError::InvalidData)?;
        let target = self.media_dir.join(file_name);
        if target.is_file() {
            return Ok(target);
        }

        let response = self
            .authed(self.http.get(self.url(media_url)))
            .send()
            .map_err(|_| FetchError::Unavailable)?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(FetchError::Unavailable);
        }
        let bytes = response.bytes().map_err(|_| FetchError::Unavailable)?;

        fs::create_dir_all(&self.media_dir).map_err(|_| FetchError::Unavailable)?;
        fs::write(&target, &bytes).map_err(|_| FetchError::Unavailable)?;
        Ok(target)
    }

    fn auth_request(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<(User, String), AuthSourceError> {
        let response = self
            .http
            .post(self.url(path))
            .json(&body)
            .send()
            .map_err(|_| AuthSourceError::Unavailable)?;

        if response.status().is_success() {
            let auth: AuthResponse = response.json().map_err(|_| AuthSourceError::Unavailable)?;
            return Ok((auth.user.into(), auth.token));
        }

        match response.json::<ErrorBody>() {
            Ok(body) => Err(AuthSourceError::Rejected(body.error)),
            Err(_) => Err(AuthSourceError::Unavailable),
        }
    }
}

impl Authenticator for RestClient {
    fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthSourceError> {
        self.auth_request(
            "/auth/login",
            serde_json::json!({"email": email, "password": password}),
        )
    }

    fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthSourceError> {
        self.auth_request(
            "/auth/signup",
            serde_json::json!({"username": username, "email": email, "password": password}),
        )
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<T, FetchError> {
    if response.status() == reqwest::StatusCode::UNAUTHORIZED {
        return Err(FetchError::Unauthorized);
    }
    if !response.status().is_success() {
        return Err(FetchError::Unavailable);
    }
    response.json().map_err(|_| FetchError::InvalidData)
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        net::TcpListener,
        thread,
    };

    use super::*;

    /// Serves one canned HTTP response and returns the raw request.
    fn one_shot_server(status_line: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base_url = format!("http://{}", listener.local_addr().expect("addr"));
        let response = format!(
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut request = Vec::new();
            let mut buffer = [0u8; 4096];
            loop {
                let n = stream.read(&mut buffer).expect("read");
                request.extend_from_slice(&buffer[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).expect("write");
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    #[test]
    fn login_parses_user_and_token() {
        let (base_url, server) = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"{"user": {"id": 3, "username": "me", "email": "me@example.com"}, "token": "tok"}"#,
        );
        let client = RestClient::new(&base_url, PathBuf::from("/tmp"));

        let (user, token) = client.login("me@example.com", "pw").expect("login");

        assert_eq!(user.id, 3);
        assert_eq!(user.username, "me");
        assert_eq!(token, "tok");
        let request = server.join().expect("server");
        assert!(request.starts_with("POST /auth/login"));
    }

    #[test]
    fn login_rejection_carries_the_server_message() {
        let (base_url, server) =
            one_shot_server("HTTP/1.1 401 Unauthorized", r#"{"error": "Invalid credentials"}"#);
        let client = RestClient::new(&base_url, PathBuf::from("/tmp"));

        let result = client.login("me@example.com", "bad");

        assert_eq!(
            result.err(),
            Some(AuthSourceError::Rejected("Invalid credentials".to_owned()))
        );
        server.join().expect("server");
    }

    #[test]
    fn contacts_attach_the_bearer_token() {
        let (base_url, server) = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"[{"id": 7, "username": "ana", "email": "ana@example.com"}]"#,
        );
        let client = RestClient::new(&base_url, PathBuf::from("/tmp")).with_token("tok");

        let contacts = client.contacts().expect("contacts");

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].username, "ana");
        let request = server.join().expect("server");
        assert!(request.starts_with("GET /users"));
        assert!(request.to_lowercase().contains("authorization: bearer tok"));
    }

    #[test]
    fn expired_token_maps_to_unauthorized() {
        let (base_url, server) =
            one_shot_server("HTTP/1.1 401 Unauthorized", r#"{"error": "jwt expired"}"#);
        let client = RestClient::new(&base_url, PathBuf::from("/tmp")).with_token("stale");

        assert_eq!(client.contacts(), Err(FetchError::Unauthorized));
        server.join().expect("server");
    }

    #[test]
    fn history_decodes_wire_records() {
        let (base_url, server) = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"[{
                "id": 42,
                "sender_id": 7,
                "sender_name": "ana",
                "message": "hi",
                "message_type": "text",
                "created_at": "2024-05-01T12:00:00Z"
            }]"#,
        );
        let client = RestClient::new(&base_url, PathBuf::from("/tmp")).with_token("tok");

        let history = client.broadcast_history().expect("history");

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].body, "hi");
        let request = server.join().expect("server");
        assert!(request.starts_with("GET /messages "));
    }

    #[test]
    fn malformed_history_maps_to_invalid_data() {
        let (base_url, server) = one_shot_server("HTTP/1.1 200 OK", r#"{"not": "a list"}"#);
        let client = RestClient::new(&base_url, PathBuf::from("/tmp")).with_token("tok");

        assert_eq!(client.broadcast_history(), Err(FetchError::InvalidData));
        server.join().expect("server");
    }

    #[test]
    fn cached_media_is_reused_without_a_request() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("memo.ogg"), b"audio").expect("seed cache");
        // No server behind this URL; a network hit would fail the test.
        let client = RestClient::new("http://127.0.0.1:9", dir.path().to_path_buf());

        let path = client.download_media("/uploads/memo.ogg").expect("cache hit");

        assert_eq!(path, dir.path().join("memo.ogg"));
    }
}
