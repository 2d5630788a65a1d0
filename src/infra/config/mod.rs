mod app_config;
mod file_config;
mod loader;

pub use app_config::{
    AppConfig, ComposerConfig, LogConfig, MediaConfig, RealtimeConfig, ServerConfig,
};
pub use loader::load;
