//! Claude Telegram Bridge - Entry Point
//!
//! Configuration comes from the environment (and `.env`), see [`Config`].

use claude_telegram_bridge::Config;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let json_logs = args.iter().any(|a| a == "--json-logs");
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");

    if help_mode {
        println!("Claude Telegram Bridge v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: claude-telegram-bridge [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --json-logs        Log as JSON instead of plain text");
        println!("  --help, -h         Show this help");
        println!();
        println!("Environment variables:");
        println!("  TELEGRAM_BOT_TOKEN   Telegram bot token (required)");
        println!("  TELEGRAM_CHAT_ID     The only chat allowed to use the bot (required)");
        println!("  CLAUDE_PATH          Claude Code binary (default: claude)");
        println!("  CLAUDE_WORKING_DIR   Initial working directory (default: $HOME)");
        println!("  CLAUDE_TIMEOUT_SECS  Per-prompt timeout (default: 120)");
        println!("  CLAUDE_DOWNLOAD_DIR  Upload folder (default: ~/Downloads/telegram)");
        println!("  RUST_LOG             trace, debug, info, warn or error");
        return Ok(());
    }

    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    if json_logs {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    info!("Claude Telegram Bridge v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    claude_telegram_bridge::telegram::run_telegram_bot(config).await?;

    Ok(())
}
