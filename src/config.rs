//! Configuration management

use crate::error::{BridgeError, Result};
use std::path::PathBuf;

/// Default seconds a single CLI invocation may run
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,

    /// The only chat allowed to talk to the bot
    pub chat_id: i64,

    /// Path or name of the Claude Code binary
    pub claude_path: String,

    /// Working directory used until `/cd` changes it
    pub working_dir: PathBuf,

    /// Initial per-invocation timeout in seconds
    pub timeout_secs: u64,

    /// Where uploaded documents and photos are stored
    pub download_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BridgeError::Config("TELEGRAM_BOT_TOKEN must be set".into()))?;

        let chat_id = lookup("TELEGRAM_CHAT_ID")
            .ok_or_else(|| BridgeError::Config("TELEGRAM_CHAT_ID must be set".into()))?
            .trim()
            .parse::<i64>()
            .map_err(|e| BridgeError::Config(format!("TELEGRAM_CHAT_ID is not a number: {}", e)))?;

        let claude_path = lookup("CLAUDE_PATH").unwrap_or_else(|| "claude".to_string());

        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        let working_dir = lookup("CLAUDE_WORKING_DIR")
            .map(|p| expand_path(&p))
            .unwrap_or_else(|| home.clone());

        let timeout_secs = match lookup("CLAUDE_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw).ok_or_else(|| {
                BridgeError::Config(format!("CLAUDE_TIMEOUT_SECS must be a positive integer, got {:?}", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let download_dir = lookup("CLAUDE_DOWNLOAD_DIR")
            .map(|p| expand_path(&p))
            .unwrap_or_else(|| home.join("Downloads").join("telegram"));

        Ok(Self {
            bot_token,
            chat_id,
            claude_path,
            working_dir,
            timeout_secs,
            download_dir,
        })
    }
}

/// Parse a timeout value; only positive integers are accepted
pub fn parse_timeout(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}

/// Expand `~` and environment references in a user supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}
