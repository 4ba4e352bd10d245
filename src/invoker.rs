//! Claude Code CLI Invoker
//!
//! Runs one `claude -p` process per request in print mode with JSON output.
//! stdin is closed, stdout and stderr are merged into one capture, and the
//! whole run is bounded by the request timeout. On Unix the CLI runs in its
//! own process group, so a run that outlives the timeout is killed together
//! with everything it started, and its partial output is discarded.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::{BridgeError, Result};

/// Environment prefixes stripped from the child so it never attaches to an
/// outer Claude Code session
pub const FILTERED_ENV_PREFIXES: &[&str] = &["CLAUDE", "ANTHROPIC"];

/// One CLI run, built fresh from session state for every prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub prompt: String,
    pub resume_session_id: Option<String>,
    pub working_dir: PathBuf,
    pub timeout_secs: u64,
}

impl InvocationRequest {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Raw outcome of a finished (or killed) CLI run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub exit_code: i32,
    pub raw_output: String,
    pub timed_out: bool,
}

impl InvocationResult {
    pub fn completed(exit_code: i32, raw_output: impl Into<String>) -> Self {
        Self {
            exit_code,
            raw_output: raw_output.into(),
            timed_out: false,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            exit_code: -1,
            raw_output: String::new(),
            timed_out: true,
        }
    }
}

/// Something that can execute an invocation request
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResult>;
}

/// Invoker backed by the real `claude` binary
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    binary: String,
}

impl ClaudeCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.claude_path.clone())
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Arguments passed after the binary name
    pub fn build_args(request: &InvocationRequest) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            request.prompt.clone(),
            "--output-format".to_string(),
            "json".to_string(),
            "--dangerously-skip-permissions".to_string(),
        ];

        if let Some(ref session_id) = request.resume_session_id {
            args.push("--resume".to_string());
            args.push(session_id.clone());
        }

        args
    }

    fn command(&self, request: &InvocationRequest) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::build_args(request))
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        for (key, _) in std::env::vars_os() {
            if key.to_str().is_some_and(is_filtered_env) {
                cmd.env_remove(&key);
            }
        }

        cmd
    }
}

#[async_trait]
impl Invoker for ClaudeCli {
    async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResult> {
        let start = Instant::now();
        tracing::info!(
            "Executing claude in {:?} (session={:?})",
            request.working_dir,
            request.resume_session_id
        );
        tracing::debug!(
            "claude args: {:?}",
            Self::build_args(request)
                .iter()
                .map(|arg| arg.chars().take(200).collect::<String>())
                .collect::<Vec<_>>()
        );

        let mut child = self
            .command(request)
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx.clone()));
        }
        drop(tx);

        let run = async {
            let mut output = String::new();
            while let Some(line) = rx.recv().await {
                output.push_str(&line);
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, output))
        };

        let outcome = tokio::time::timeout(request.timeout(), run).await;

        match outcome {
            Ok(Ok((status, output))) => {
                let exit_code = status.code().unwrap_or(-1);
                tracing::debug!(
                    "Claude CLI completed in {:?} with exit code {} ({} bytes)",
                    start.elapsed(),
                    exit_code,
                    output.len()
                );
                Ok(InvocationResult::completed(exit_code, output))
            }
            Ok(Err(e)) => Err(BridgeError::Io(e)),
            Err(_) => {
                tracing::warn!(
                    "Claude CLI exceeded {}s, killing pid {:?}",
                    request.timeout_secs,
                    child.id()
                );
                #[cfg(unix)]
                if let Some(pid) = child.id() {
                    kill_process_group(pid);
                }
                if let Err(e) = child.kill().await {
                    tracing::error!("Failed to kill claude CLI: {}", e);
                }
                Ok(InvocationResult::timed_out())
            }
        }
    }
}

/// SIGKILL every process in the group led by `pid`
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        tracing::warn!("Failed to kill process group {}: {}", raw, e);
    }
}

/// Whether an inherited variable belongs to an outer assistant session
pub fn is_filtered_env(key: &str) -> bool {
    FILTERED_ENV_PREFIXES
        .iter()
        .any(|prefix| key.starts_with(prefix))
}

/// Pump one pipe into the shared output channel, line by line
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let mut line = String::from_utf8_lossy(&buf).into_owned();
                if !line.ends_with('\n') {
                    line.push('\n');
                }
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Pipe read error: {}", e);
                break;
            }
        }
    }
}
