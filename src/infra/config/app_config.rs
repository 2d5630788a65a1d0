use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub server: ServerConfig,
    pub realtime: RealtimeConfig,
    pub composer: ComposerConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3001".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeConfig {
    pub socket_url: String,
    pub reconnect_attempts: u32,
    pub reconnect_backoff_ms: u64,
    /// How long a typing indicator survives without a stop event.
    pub typing_ttl_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            socket_url: "ws://127.0.0.1:3001/ws".to_owned(),
            reconnect_attempts: 5,
            reconnect_backoff_ms: 2_000,
            typing_ttl_ms: 4_000,
        }
    }
}

impl RealtimeConfig {
    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }

    pub fn typing_ttl(&self) -> Duration {
        Duration::from_millis(self.typing_ttl_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Keyboard pause after which a typing-stop is emitted.
    pub typing_idle_ms: u64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            typing_idle_ms: 2_000,
        }
    }
}

impl ComposerConfig {
    pub fn typing_idle(&self) -> Duration {
        Duration::from_millis(self.typing_idle_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaConfig {
    /// External command used to play voice messages.
    pub player_command: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            player_command: "mpv --no-video".to_owned(),
        }
    }
}
