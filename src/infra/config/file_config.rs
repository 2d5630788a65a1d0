use serde::Deserialize;

use crate::infra::config::{
    AppConfig, ComposerConfig, LogConfig, MediaConfig, RealtimeConfig, ServerConfig,
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub server: Option<FileServerConfig>,
    pub realtime: Option<FileRealtimeConfig>,
    pub composer: Option<FileComposerConfig>,
    pub media: Option<FileMediaConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(server) = self.server {
            server.merge_into(&mut config.server);
        }

        if let Some(realtime) = self.realtime {
            realtime.merge_into(&mut config.realtime);
        }

        if let Some(composer) = self.composer {
            composer.merge_into(&mut config.composer);
        }

        if let Some(media) = self.media {
            media.merge_into(&mut config.media);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileServerConfig {
    pub base_url: Option<String>,
}

impl FileServerConfig {
    fn merge_into(self, config: &mut ServerConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileRealtimeConfig {
    pub socket_url: Option<String>,
    pub reconnect_attempts: Option<u32>,
    pub reconnect_backoff_ms: Option<u64>,
    pub typing_ttl_ms: Option<u64>,
}

impl FileRealtimeConfig {
    fn merge_into(self, config: &mut RealtimeConfig) {
        if let Some(socket_url) = self.socket_url {
            config.socket_url = socket_url;
        }

        if let Some(attempts) = self.reconnect_attempts {
            config.reconnect_attempts = attempts;
        }

        if let Some(backoff_ms) = self.reconnect_backoff_ms {
            config.reconnect_backoff_ms = backoff_ms;
        }

        if let Some(ttl_ms) = self.typing_ttl_ms {
            config.typing_ttl_ms = ttl_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileComposerConfig {
    pub typing_idle_ms: Option<u64>,
}

impl FileComposerConfig {
    fn merge_into(self, config: &mut ComposerConfig) {
        if let Some(idle_ms) = self.typing_idle_ms {
            config.typing_idle_ms = idle_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileMediaConfig {
    pub player_command: Option<String>,
}

impl FileMediaConfig {
    fn merge_into(self, config: &mut MediaConfig) {
        if let Some(player_command) = self.player_command {
            config.player_command = player_command;
        }
    }
}
