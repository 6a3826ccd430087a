//! Configuration: TOML settings plus a manager for load/save.
//!
//! The config file lives at `~/.config/recap/config.toml` by default and is
//! created with commented defaults on first run.

mod manager;
mod settings;

pub use manager::{default_config_path, ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    DesktopSettings, EmailSettings, LoggingSettings, PathSettings, Settings, SummarizerBackend,
    SummarizerSettings, TelegramSettings, ToolSettings,
};
