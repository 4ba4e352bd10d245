//! Telegram transport
//!
//! Forwards messages from the single allowed chat to the [`Bridge`] and sends
//! the replies back, split to Telegram's message size. Documents and photos
//! are saved to the download directory and turned into a prompt that points
//! Claude at the saved file.
//!
//! Uses explicit Dispatcher pattern for reliable message polling.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    net::Download,
    prelude::*,
    types::{ChatAction, FileMeta, Update},
};

use crate::attachments;
use crate::bridge::Bridge;
use crate::chunking::{split_message, TELEGRAM_MAX_LENGTH};
use crate::commands::{BotCommand, HELP_TEXT};
use crate::config::{parse_timeout, Config};
use crate::error::BridgeError;
use crate::preflight::PreflightChecker;

/// Shared handler state
pub struct BotData {
    pub chat_id: i64,
    pub download_dir: PathBuf,
    pub bridge: Arc<Bridge>,
}

impl BotData {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chat_id: config.chat_id,
            download_dir: config.download_dir.clone(),
            bridge: Arc::new(Bridge::from_config(config)),
        }
    }

    pub fn is_allowed(&self, chat_id: i64) -> bool {
        chat_id == self.chat_id
    }
}

/// Run Telegram bot with explicit Dispatcher for reliable polling
pub async fn run_telegram_bot(config: Config) -> Result<()> {
    tracing::info!("===========================================");
    tracing::info!("  Claude Telegram Bridge - Starting...");
    tracing::info!("===========================================");
    tracing::info!("Allowed chat: {}", config.chat_id);
    tracing::info!("Claude binary: {}", config.claude_path);
    tracing::info!("Working directory: {:?}", config.working_dir);
    tracing::info!("Download directory: {:?}", config.download_dir);
    tracing::info!("Timeout: {}s", config.timeout_secs);

    let preflight = PreflightChecker::new(config.claude_path.clone())
        .check_claude_cli()
        .await;
    if preflight.is_ready() {
        tracing::info!("{}", preflight.describe());
    } else {
        tracing::error!("{}", preflight.describe());
    }

    let bot = Bot::new(config.bot_token.clone());

    tracing::info!("Verifying bot token...");
    match bot.get_me().await {
        Ok(me) => {
            tracing::info!(
                "Bot authenticated: @{} (ID: {})",
                me.username.as_deref().unwrap_or("unknown"),
                me.id
            );
        }
        Err(e) => {
            tracing::error!("Failed to authenticate bot: {}", e);
            anyhow::bail!("Bot authentication failed: {}", e);
        }
    }

    tracing::info!("Clearing webhook (if any)...");
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    let handler_data = Arc::new(BotData::from_config(&config));

    let handler = dptree::entry().branch(Update::filter_message().endpoint(message_handler));

    tracing::info!("Starting dispatcher with long polling...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![handler_data])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in message handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::warn!("Dispatcher stopped");
    Ok(())
}

/// Message handler endpoint for the dispatcher
async fn message_handler(bot: Bot, msg: Message, data: Arc<BotData>) -> ResponseResult<()> {
    if let Err(e) = handle_message(bot, msg, data).await {
        tracing::error!("Error handling message: {:#}", e);
    }
    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, data: Arc<BotData>) -> Result<()> {
    let chat_id = msg.chat.id;

    if !data.is_allowed(chat_id.0) {
        tracing::warn!("Unauthorized access attempt from chat {}", chat_id.0);
        return Ok(());
    }

    if let Some(doc) = msg.document() {
        let file_name = attachments::sanitize_file_name(doc.file_name.as_deref());
        return handle_upload(
            &bot,
            chat_id,
            &data,
            &doc.file,
            &file_name,
            msg.caption(),
            Upload::Document,
        )
        .await;
    }

    if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        let file_name = attachments::photo_file_name(chrono::Utc::now());
        return handle_upload(
            &bot,
            chat_id,
            &data,
            &photo.file,
            &file_name,
            msg.caption(),
            Upload::Photo,
        )
        .await;
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };
    let text = text.trim();
    tracing::info!("Message from {}: {}", chat_id.0, text.chars().take(100).collect::<String>());

    match BotCommand::parse(text) {
        Some(cmd) => {
            let reply = command_reply(&cmd, &data.bridge, &data.download_dir);
            send(&bot, chat_id, &reply).await;
        }
        None => dispatch_prompt(&bot, chat_id, &data, text.to_string()).await,
    }

    Ok(())
}

/// Reply text for a bot command, applying its effect on the bridge
pub fn command_reply(cmd: &BotCommand, bridge: &Bridge, download_dir: &Path) -> String {
    match cmd {
        BotCommand::Help => HELP_TEXT.to_string(),

        BotCommand::New => {
            bridge.session().reset();
            "New session started. Next message will begin a fresh conversation.".to_string()
        }

        BotCommand::Session => match bridge.session().session_id() {
            Some(id) => format!("Session: `{}`", id),
            None => "No active session. Next message will start a new one.".to_string(),
        },

        BotCommand::Pwd => format!(
            "Working directory: `{}`",
            bridge.session().working_dir().display()
        ),

        BotCommand::Downloads => format!("Downloads folder: `{}`", download_dir.display()),

        BotCommand::Cd(None) => "Usage: /cd <path>".to_string(),
        BotCommand::Cd(Some(path)) => match bridge.session().change_directory(path) {
            Ok(dir) => format!("Changed to: `{}`", dir.display()),
            Err(e) => e.to_string(),
        },

        BotCommand::Timeout(None) => format!(
            "Current timeout: {}s\nUsage: /timeout <seconds>",
            bridge.timeout_secs()
        ),
        BotCommand::Timeout(Some(raw)) => match parse_timeout(raw) {
            Some(secs) => {
                bridge.set_timeout_secs(secs);
                format!("Timeout set to {}s", secs)
            }
            None => format!("Invalid number: {}", raw),
        },

        BotCommand::Unknown(_) => "Unknown command. Use /help for available commands.".to_string(),
    }
}

/// Hand a prompt to the bridge without blocking the dispatcher
async fn dispatch_prompt(bot: &Bot, chat_id: ChatId, data: &BotData, prompt: String) {
    send(bot, chat_id, "Processing...").await;
    if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
        tracing::debug!("Failed to send typing action: {}", e);
    }

    let task = data.bridge.spawn_execute(prompt);
    let bot = bot.clone();
    tokio::spawn(async move {
        match task.await {
            Ok(reply) => send_long_message(&bot, chat_id, &reply).await,
            Err(e) => {
                tracing::error!("Error executing Claude command: {}", e);
                send(&bot, chat_id, &format!("Error: {}", e)).await;
            }
        }
    });
}

#[derive(Debug, Clone, Copy)]
enum Upload {
    Document,
    Photo,
}

async fn handle_upload(
    bot: &Bot,
    chat_id: ChatId,
    data: &BotData,
    file: &FileMeta,
    file_name: &str,
    caption: Option<&str>,
    kind: Upload,
) -> Result<()> {
    let target = attachments::download_target(&data.download_dir, file_name);

    if let Err(e) = download(bot, file, &target).await {
        tracing::error!("Failed to download {:?}: {:#}", kind, e);
        send(bot, chat_id, &format!("Failed to download file: {:#}", e)).await;
        return Ok(());
    }

    let prompt = match kind {
        Upload::Document => {
            tracing::info!("Document saved: {:?}", target);
            send(bot, chat_id, &format!("File saved: `{}`", target.display())).await;
            attachments::document_prompt(caption, &target)
        }
        Upload::Photo => {
            tracing::info!("Photo saved: {:?}", target);
            send(bot, chat_id, &format!("Photo saved: `{}`", target.display())).await;
            attachments::photo_prompt(caption, &target)
        }
    };

    dispatch_prompt(bot, chat_id, data, prompt).await;
    Ok(())
}

async fn download(bot: &Bot, file: &FileMeta, target: &Path) -> Result<()> {
    let mut dst = create_target(target).await?;

    let remote = bot
        .get_file(&file.id)
        .await
        .map_err(|e| BridgeError::Download(e.to_string()))
        .context("resolving file")?;
    bot.download_file(&remote.path, &mut dst)
        .await
        .map_err(|e| BridgeError::Download(e.to_string()))
        .context("downloading file")?;

    Ok(())
}

/// Create the download directory and open the target file for writing
async fn create_target(target: &Path) -> Result<tokio::fs::File> {
    if let Some(dir) = target.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating download directory {:?}", dir))?;
    }

    tokio::fs::File::create(target)
        .await
        .with_context(|| format!("creating {:?}", target))
}

/// Send `text`, split into Telegram sized chunks
async fn send_long_message(bot: &Bot, chat_id: ChatId, text: &str) {
    for chunk in split_message(text, TELEGRAM_MAX_LENGTH) {
        if chunk.is_empty() {
            continue;
        }
        send(bot, chat_id, &chunk).await;
    }
}

async fn send(bot: &Bot, chat_id: ChatId, text: &str) {
    if let Err(e) = bot.send_message(chat_id, text).await {
        tracing::error!("Failed to send message to chat {}: {}", chat_id.0, e);
    }
}
