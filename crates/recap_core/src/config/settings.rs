//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Credentials resolve config-value-first, then environment, so the file
//! never has to hold secrets.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::manager::{ConfigError, ConfigResult};
use crate::logging::{LogConfig, LogLevel};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// External tool settings.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Summarizer backend settings.
    #[serde(default)]
    pub summarizer: SummarizerSettings,

    /// Email delivery settings.
    #[serde(default)]
    pub email: EmailSettings,

    /// Telegram delivery settings.
    #[serde(default)]
    pub telegram: TelegramSettings,

    /// Desktop notification settings.
    #[serde(default)]
    pub desktop: DesktopSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paths: PathSettings::default(),
            tools: ToolSettings::default(),
            summarizer: SummarizerSettings::default(),
            email: EmailSettings::default(),
            telegram: TelegramSettings::default(),
            desktop: DesktopSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Root directory for per-job state directories.
    pub fn state_root(&self) -> PathBuf {
        PathBuf::from(&self.paths.state_root)
    }
}

/// Path configuration for job state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder for per-job state directories.
    #[serde(default = "default_state_root")]
    pub state_root: String,
}

fn default_state_root() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("recap").join("jobs"))
        .unwrap_or_else(|| PathBuf::from(".recap/jobs"))
        .display()
        .to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            state_root: default_state_root(),
        }
    }
}

/// External tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Path or name of the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,

    /// Path or name of the uvx runner used for the transcription engine.
    #[serde(default = "default_uvx_path")]
    pub uvx_path: String,

    /// Package spec for the whisper engine run through uvx.
    #[serde(default = "default_whisper_package")]
    pub whisper_package: String,

    /// Whisper model identifier.
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_uvx_path() -> String {
    "uvx".to_string()
}

fn default_whisper_package() -> String {
    "mlx_whisper".to_string()
}

fn default_whisper_model() -> String {
    "mlx-community/whisper-large-v3-turbo".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            uvx_path: default_uvx_path(),
            whisper_package: default_whisper_package(),
            whisper_model: default_whisper_model(),
        }
    }
}

/// Which summarizer backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerBackend {
    /// CLI agent subprocess (default).
    #[default]
    Codex,
    /// OpenAI-compatible chat-completions HTTP API.
    Openai,
}

/// Summarizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerSettings {
    /// Backend selection.
    #[serde(default)]
    pub backend: SummarizerBackend,

    /// Summarization prompt prepended to the transcript.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Runner for the CLI agent backend.
    #[serde(default = "default_codex_runner")]
    pub codex_runner: String,

    /// Package spec passed to the runner.
    #[serde(default = "default_codex_package")]
    pub codex_package: String,

    /// Model for the CLI agent backend.
    #[serde(default = "default_codex_model")]
    pub codex_model: String,

    /// Base URL for the HTTP backend.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Model for the HTTP backend.
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// API key for the HTTP backend. Prefer the environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is unset.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_prompt() -> String {
    "\
* **Core insights:** Bullet point the key ideas, focusing on what's actionable for investment decisions (market signals, timing, risks, opportunities)
* **Non-consensus views:** What contrarian, surprising, or non-obvious points were made? Include specific quotes if striking
* **Alpha signals:** Any mentions of emerging trends, inefficiencies, or insights that aren't yet priced in by markets?
"
    .to_string()
}

fn default_codex_runner() -> String {
    "bunx".to_string()
}

fn default_codex_package() -> String {
    "@openai/codex@latest".to_string()
}

fn default_codex_model() -> String {
    "gpt-5.2-codex".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            backend: SummarizerBackend::default(),
            prompt: default_prompt(),
            codex_runner: default_codex_runner(),
            codex_package: default_codex_package(),
            codex_model: default_codex_model(),
            openai_base_url: default_openai_base_url(),
            openai_model: default_openai_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl SummarizerSettings {
    /// Resolve the HTTP backend API key: config value first, then the
    /// configured environment variable.
    pub fn resolve_api_key(&self) -> ConfigResult<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        std::env::var(&self.api_key_env).map_err(|_| ConfigError::MissingCredential {
            what: "summarizer API key".to_string(),
            env_var: self.api_key_env.clone(),
        })
    }
}

/// Email delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    /// Whether the email channel is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Recipient address. Falls back to `EMAIL_RECIPIENT`, then the local user.
    #[serde(default)]
    pub recipient: Option<String>,

    /// Sender address. Falls back to `EMAIL_SENDER`, then the local user.
    #[serde(default)]
    pub sender: Option<String>,

    /// Path to a sendmail-compatible binary.
    #[serde(default = "default_sendmail_path")]
    pub sendmail_path: String,
}

fn default_sendmail_path() -> String {
    "/usr/sbin/sendmail".to_string()
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            recipient: None,
            sender: None,
            sendmail_path: default_sendmail_path(),
        }
    }
}

impl EmailSettings {
    /// Resolve the recipient address with environment and local-user fallbacks.
    pub fn resolved_recipient(&self) -> String {
        resolve_address(self.recipient.as_deref(), "EMAIL_RECIPIENT")
    }

    /// Resolve the sender address with environment and local-user fallbacks.
    pub fn resolved_sender(&self) -> String {
        resolve_address(self.sender.as_deref(), "EMAIL_SENDER")
    }
}

fn resolve_address(configured: Option<&str>, env_var: &str) -> String {
    if let Some(addr) = configured {
        if !addr.is_empty() {
            return addr.to_string();
        }
    }
    if let Ok(addr) = std::env::var(env_var) {
        if !addr.is_empty() {
            return addr;
        }
    }
    let user = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
    format!("{}@localhost", user)
}

/// Telegram delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    /// Whether the Telegram channel is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bot token. Falls back to `TELEGRAM_BOT_TOKEN`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat ID. Falls back to `TELEGRAM_CHAT_ID`.
    #[serde(default)]
    pub chat_id: Option<String>,

    /// Bot API base URL.
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: None,
            chat_id: None,
            api_base: default_telegram_api_base(),
        }
    }
}

impl TelegramSettings {
    /// Resolve the bot token: config value first, then `TELEGRAM_BOT_TOKEN`.
    pub fn resolve_bot_token(&self) -> ConfigResult<String> {
        resolve_secret(self.bot_token.as_deref(), "Telegram bot token", "TELEGRAM_BOT_TOKEN")
    }

    /// Resolve the chat ID: config value first, then `TELEGRAM_CHAT_ID`.
    pub fn resolve_chat_id(&self) -> ConfigResult<String> {
        resolve_secret(self.chat_id.as_deref(), "Telegram chat ID", "TELEGRAM_CHAT_ID")
    }
}

fn resolve_secret(
    configured: Option<&str>,
    what: &str,
    env_var: &str,
) -> ConfigResult<String> {
    if let Some(value) = configured {
        if !value.is_empty() {
            return Ok(value.to_string());
        }
    }
    std::env::var(env_var).map_err(|_| ConfigError::MissingCredential {
        what: what.to_string(),
        env_var: env_var.to_string(),
    })
}

/// Desktop notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesktopSettings {
    /// Whether the desktop channel is enabled.
    #[serde(default)]
    pub enabled: bool,
}

impl Default for DesktopSettings {
    fn default() -> Self {
        Self { enabled: false }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of error lines to show in tail.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Show timestamps in log output.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

impl LoggingSettings {
    /// Build a [`LogConfig`] from these settings.
    pub fn to_log_config(&self, verbose: bool) -> LogConfig {
        LogConfig {
            level: if verbose { LogLevel::Debug } else { LogLevel::Info },
            compact: self.compact && !verbose,
            progress_step: self.progress_step,
            error_tail: self.error_tail as usize,
            show_timestamps: self.show_timestamps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.summarizer.backend, SummarizerBackend::Codex);
        assert_eq!(settings.tools.ytdlp_path, "yt-dlp");
        assert!(settings.email.enabled);
        assert!(!settings.desktop.enabled);
    }

    #[test]
    fn backend_parses_lowercase() {
        let settings: Settings = toml::from_str("[summarizer]\nbackend = \"openai\"\n").unwrap();
        assert_eq!(settings.summarizer.backend, SummarizerBackend::Openai);
    }

    #[test]
    fn config_api_key_takes_precedence() {
        let mut settings = SummarizerSettings::default();
        settings.api_key = Some("sk-from-config".to_string());
        settings.api_key_env = "RECAP_TEST_UNSET_KEY_VAR".to_string();
        assert_eq!(settings.resolve_api_key().unwrap(), "sk-from-config");
    }

    #[test]
    fn missing_api_key_names_the_env_var() {
        let mut settings = SummarizerSettings::default();
        settings.api_key_env = "RECAP_TEST_DEFINITELY_UNSET".to_string();
        let err = settings.resolve_api_key().unwrap_err();
        assert!(err.to_string().contains("RECAP_TEST_DEFINITELY_UNSET"));
    }

    #[test]
    fn telegram_token_resolves_from_env() {
        std::env::set_var("RECAP_TEST_TG_TOKEN", "123:abc");
        let settings = TelegramSettings {
            bot_token: None,
            ..TelegramSettings::default()
        };
        let resolved = resolve_secret(
            settings.bot_token.as_deref(),
            "Telegram bot token",
            "RECAP_TEST_TG_TOKEN",
        );
        assert_eq!(resolved.unwrap(), "123:abc");
        std::env::remove_var("RECAP_TEST_TG_TOKEN");
    }

    #[test]
    fn email_falls_back_to_local_user() {
        let settings = EmailSettings {
            recipient: Some(String::new()),
            ..EmailSettings::default()
        };
        // Empty config value falls through to env, then to <user>@localhost.
        std::env::remove_var("EMAIL_RECIPIENT");
        let addr = settings.resolved_recipient();
        assert!(addr.ends_with("@localhost"));
    }

    #[test]
    fn log_config_verbose_disables_compact() {
        let settings = LoggingSettings::default();
        let config = settings.to_log_config(true);
        assert_eq!(config.level, LogLevel::Debug);
        assert!(!config.compact);
    }
}
