//! Claude Telegram Bridge
//!
//! Bridges a Telegram chat to a local Claude Code CLI.
//!
//! # Features
//!
//! - **Session continuity**: the `session_id` from each JSON reply is passed
//!   back with `--resume` on the next prompt
//! - **Bounded runs**: every CLI process is killed once it exceeds the timeout
//! - **Chunked replies**: long answers are split on line boundaries to fit
//!   Telegram's 4096 character limit
//! - **Uploads**: documents and photos are saved locally and handed to Claude
//!   by path
//!
//! # Architecture
//!
//! ```text
//! Telegram ──► telegram ──► Bridge ──► Invoker ──► claude -p ... --output-format json
//!                 ▲            │                        │
//!                 │            ├── SessionState ◄── parser
//!                 └── chunking ◄───────────────────────┘
//! ```

pub mod attachments;
pub mod bridge;
pub mod chunking;
pub mod commands;
pub mod config;
pub mod error;
pub mod invoker;
pub mod parser;
pub mod preflight;
pub mod session;
pub mod telegram;

pub use bridge::Bridge;
pub use chunking::{split_message, TELEGRAM_MAX_LENGTH};
pub use commands::BotCommand;
pub use config::Config;
pub use error::{BridgeError, DirectoryError};
pub use invoker::{ClaudeCli, InvocationRequest, InvocationResult, Invoker};
pub use parser::{parse, ParsedResponse};
pub use preflight::{PreflightChecker, PreflightResult};
pub use session::SessionState;
