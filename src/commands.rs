//! Bot command parsing
//!
//! `/name[@bot] [args]` → [`BotCommand`]. Names are case-insensitive and the
//! rest of the line, trimmed, is the argument.

/// Commands understood by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Help,
    New,
    Session,
    Pwd,
    Cd(Option<String>),
    Timeout(Option<String>),
    Downloads,
    Unknown(String),
}

pub const HELP_TEXT: &str = "Claude Code Bot - Commands:\n\n\
    /help - Show this help\n\
    /new - Start a new conversation (clear context)\n\
    /session - Show current session ID\n\
    /pwd - Show current working directory\n\
    /cd <path> - Change working directory\n\
    /timeout <seconds> - Set command timeout\n\
    /downloads - Show downloads folder\n\n\
    Send any file or photo to save it.\n\
    Any other text is sent to Claude Code.";

impl BotCommand {
    /// Parse a message starting with `/`; returns `None` for anything else
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let body = text.strip_prefix('/')?;

        let (name, args) = match body.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (body, ""),
        };
        let name = name.split('@').next().unwrap_or(name).to_lowercase();
        let arg = (!args.is_empty()).then(|| args.to_string());

        let cmd = match name.as_str() {
            "help" | "start" => Self::Help,
            "new" => Self::New,
            "session" => Self::Session,
            "pwd" => Self::Pwd,
            "cd" => Self::Cd(arg),
            "timeout" => Self::Timeout(arg),
            "downloads" => Self::Downloads,
            _ => Self::Unknown(name),
        };

        Some(cmd)
    }
}
